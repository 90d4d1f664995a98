pub mod toml_config;

use crate::config::toml_config::FileConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_bitrate, validate_extension, validate_non_empty_string, validate_path,
    validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_ICON_INPUT: &str = "icon.svg";
pub const DEFAULT_ICON_SIZES: [u32; 3] = [16, 48, 128];
/// 每個尺寸各配置一張 RGBA 畫布（2048² ≈ 16 MB），並行時記憶體隨 worker 數倍增
pub const MAX_ICON_SIZE: u32 = 2048;

pub const DEFAULT_AUDIO_BITRATE: &str = "24k";
pub const DEFAULT_INPUT_EXTENSION: &str = "mp4";
pub const DEFAULT_OUTPUT_EXTENSION: &str = "opus";
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// libopus 的 `-application` 模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OpusApplication {
    /// 語音優化
    #[default]
    Voip,
    /// 一般音樂／混合內容
    Audio,
    /// 最低延遲
    Lowdelay,
}

impl OpusApplication {
    pub fn as_str(self) -> &'static str {
        match self {
            OpusApplication::Voip => "voip",
            OpusApplication::Audio => "audio",
            OpusApplication::Lowdelay => "lowdelay",
        }
    }
}

impl std::fmt::Display for OpusApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 預設 worker 數量：CPU 核心數
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSettings {
    pub input: PathBuf,
    pub sizes: Vec<u32>,
    pub output_dir: Option<PathBuf>,
    pub workers: usize,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_ICON_INPUT),
            sizes: DEFAULT_ICON_SIZES.to_vec(),
            output_dir: None,
            workers: default_workers(),
        }
    }
}

impl Validate for IconSettings {
    fn validate(&self) -> Result<()> {
        validate_path("icons.input", &self.input.to_string_lossy())?;
        validate_positive_number("icons.sizes", self.sizes.len(), 1)?;
        for &size in &self.sizes {
            validate_range("icons.sizes", size, 1, MAX_ICON_SIZE)?;
        }
        if let Some(dir) = &self.output_dir {
            validate_path("icons.output_dir", &dir.to_string_lossy())?;
        }
        validate_positive_number("icons.workers", self.workers, 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    pub root: PathBuf,
    pub bitrate: String,
    pub application: OpusApplication,
    pub input_extension: String,
    pub output_extension: String,
    pub encoder: String,
    pub workers: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            application: OpusApplication::default(),
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            encoder: DEFAULT_ENCODER.to_string(),
            workers: default_workers(),
        }
    }
}

impl Validate for AudioSettings {
    fn validate(&self) -> Result<()> {
        validate_path("audio.root", &self.root.to_string_lossy())?;
        validate_bitrate("audio.bitrate", &self.bitrate)?;
        validate_extension("audio.extension", &self.input_extension)?;
        validate_extension("audio.output_extension", &self.output_extension)?;
        if self
            .input_extension
            .eq_ignore_ascii_case(&self.output_extension)
        {
            return Err(crate::utils::error::MediaError::InvalidConfigValueError {
                field: "audio.output_extension".to_string(),
                value: self.output_extension.clone(),
                reason: "Output extension must differ from the input extension".to_string(),
            });
        }
        validate_non_empty_string("audio.encoder", &self.encoder)?;
        validate_positive_number("audio.workers", self.workers, 1)?;
        Ok(())
    }
}

/// 讀取 `--config` 指定的設定檔；未指定時回傳空設定
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            FileConfig::from_file(path)
        }
        None => Ok(FileConfig::default()),
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "svg-to-png")]
#[command(about = "Render an SVG icon into several square PNG sizes")]
pub struct IconArgs {
    /// Input SVG file [default: icon.svg]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Comma-separated output sizes in pixels [default: 16,48,128]
    #[arg(short, long, value_delimiter = ',')]
    pub sizes: Vec<u32>,

    /// Write PNGs here instead of next to the input
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of parallel workers [default: CPU cores]
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Log process CPU and memory usage
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl IconArgs {
    /// 命令列 > 設定檔 > 預設值
    pub fn resolve(&self, file: &FileConfig) -> IconSettings {
        let section = file.icons.clone().unwrap_or_default();
        let defaults = IconSettings::default();

        IconSettings {
            input: self
                .input
                .clone()
                .or(section.input)
                .unwrap_or(defaults.input),
            sizes: if self.sizes.is_empty() {
                section.sizes.unwrap_or(defaults.sizes)
            } else {
                self.sizes.clone()
            },
            output_dir: self.output_dir.clone().or(section.output_dir),
            workers: self
                .workers
                .or(section.workers)
                .unwrap_or(defaults.workers),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "extract-audio")]
#[command(about = "Convert every video under a directory into a compact Opus audio file")]
pub struct AudioArgs {
    /// Root directory to scan [default: .]
    pub root: Option<PathBuf>,

    /// Audio bitrate passed to the encoder [default: 24k]
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// Opus application mode [default: voip]
    #[arg(short, long, value_enum)]
    pub application: Option<OpusApplication>,

    /// Input file extension to look for [default: mp4]
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Extension of the produced audio files [default: opus]
    #[arg(long)]
    pub output_extension: Option<String>,

    /// Encoder program [default: ffmpeg]
    #[arg(long, env = "MEDIA_KIT_ENCODER")]
    pub encoder: Option<String>,

    /// Number of parallel workers [default: CPU cores]
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Log process CPU and memory usage
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl AudioArgs {
    /// 命令列 > 設定檔 > 預設值
    pub fn resolve(&self, file: &FileConfig) -> AudioSettings {
        let section = file.audio.clone().unwrap_or_default();
        let defaults = AudioSettings::default();

        AudioSettings {
            root: self.root.clone().or(section.root).unwrap_or(defaults.root),
            bitrate: self
                .bitrate
                .clone()
                .or(section.bitrate)
                .unwrap_or(defaults.bitrate),
            application: self
                .application
                .or(section.application)
                .unwrap_or(defaults.application),
            input_extension: self
                .extension
                .clone()
                .or(section.extension)
                .unwrap_or(defaults.input_extension),
            output_extension: self
                .output_extension
                .clone()
                .or(section.output_extension)
                .unwrap_or(defaults.output_extension),
            encoder: self
                .encoder
                .clone()
                .or(section.encoder)
                .unwrap_or(defaults.encoder),
            workers: self
                .workers
                .or(section.workers)
                .unwrap_or(defaults.workers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_defaults() {
        let settings = IconSettings::default();
        assert_eq!(settings.input, PathBuf::from("icon.svg"));
        assert_eq!(settings.sizes, vec![16, 48, 128]);
        assert!(settings.workers >= 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_audio_defaults() {
        let settings = AudioSettings::default();
        assert_eq!(settings.root, PathBuf::from("."));
        assert_eq!(settings.bitrate, "24k");
        assert_eq!(settings.application, OpusApplication::Voip);
        assert_eq!(settings.input_extension, "mp4");
        assert_eq!(settings.output_extension, "opus");
        assert_eq!(settings.encoder, "ffmpeg");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_icon_validation() {
        let mut settings = IconSettings::default();
        settings.sizes = vec![];
        assert!(settings.validate().is_err());

        settings.sizes = vec![16, 0];
        assert!(settings.validate().is_err());

        settings.sizes = vec![16, MAX_ICON_SIZE + 1];
        assert!(settings.validate().is_err());

        settings.sizes = vec![8192];
        assert!(settings.validate().is_err());

        settings.sizes = vec![MAX_ICON_SIZE];
        assert!(settings.validate().is_ok());

        settings.sizes = vec![32];
        settings.workers = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_audio_validation() {
        let mut settings = AudioSettings::default();
        settings.bitrate = "loud".to_string();
        assert!(settings.validate().is_err());

        let mut settings = AudioSettings::default();
        settings.output_extension = "MP4".to_string();
        assert!(settings.validate().is_err());

        let mut settings = AudioSettings::default();
        settings.encoder = " ".to_string();
        assert!(settings.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_icon_args_precedence() {
        let file = FileConfig::from_toml_str(
            r#"
[icons]
input = "brand.svg"
sizes = [32, 64]
workers = 3
"#,
        )
        .unwrap();

        let args = IconArgs {
            sizes: vec![256],
            ..IconArgs::default()
        };
        let settings = args.resolve(&file);

        assert_eq!(settings.input, PathBuf::from("brand.svg"));
        assert_eq!(settings.sizes, vec![256]);
        assert_eq!(settings.workers, 3);
        assert_eq!(settings.output_dir, None);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_icon_args_without_flags_match_defaults() {
        let settings = IconArgs::default().resolve(&FileConfig::default());
        assert_eq!(settings, IconSettings::default());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_audio_args_parse_positional_root() {
        let args = AudioArgs::try_parse_from(["extract-audio", "videos", "-a", "audio"]).unwrap();
        assert_eq!(args.root, Some(PathBuf::from("videos")));
        assert_eq!(args.application, Some(OpusApplication::Audio));

        let settings = args.resolve(&FileConfig::default());
        assert_eq!(settings.root, PathBuf::from("videos"));
        assert_eq!(settings.bitrate, "24k");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_audio_args_precedence() {
        let file = FileConfig::from_toml_str(
            r#"
[audio]
root = "from-file"
bitrate = "48k"
encoder = "/opt/ffmpeg"
"#,
        )
        .unwrap();

        let args = AudioArgs {
            bitrate: Some("16k".to_string()),
            ..AudioArgs::default()
        };
        let settings = args.resolve(&file);

        assert_eq!(settings.root, PathBuf::from("from-file"));
        assert_eq!(settings.bitrate, "16k");
        assert_eq!(settings.encoder, "/opt/ffmpeg");
        assert_eq!(settings.application, OpusApplication::Voip);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_icon_args_parse_sizes_list() {
        let args = IconArgs::try_parse_from(["svg-to-png", "--sizes", "16,32,64"]).unwrap();
        assert_eq!(args.sizes, vec![16, 32, 64]);
        assert!(args.input.is_none());
    }
}
