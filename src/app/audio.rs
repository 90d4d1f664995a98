//! Video → Opus audio extraction through an external encoder (FFmpeg).

use crate::config::{AudioSettings, OpusApplication};
use crate::core::discovery::discover_files;
use crate::core::{Converter, Job, JobKind};
use crate::utils::error::{MediaError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// 錯誤訊息中保留的 stderr 行數
const STDERR_TAIL_LINES: usize = 5;

/// 執行 `<program> -version` 確認編碼器可用，回傳版本資訊第一行
pub async fn probe_encoder(program: &str) -> Result<String> {
    let output = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| MediaError::EncoderNotFound {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(MediaError::EncoderNotFound {
            program: program.to_string(),
            reason: format!("'-version' exited with {}", output.status),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(version)
}

/// 以絕對路徑搜尋 `settings.root`，每個符合的影片產生一個工作
pub fn plan_audio_jobs(settings: &AudioSettings) -> Result<Vec<Job>> {
    let root = absolute_root(&settings.root)?;
    let files = discover_files(&root, &settings.input_extension)?;

    let jobs = files
        .into_iter()
        .enumerate()
        .map(|(index, input)| Job {
            index,
            output: input.with_extension(&settings.output_extension),
            input,
            kind: JobKind::Audio,
        })
        .collect();

    Ok(jobs)
}

pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        Ok(root.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(root))
    }
}

/// 呼叫外部編碼器，將影片的音軌轉為 Opus
#[derive(Debug, Clone)]
pub struct OpusExtractor {
    encoder: String,
    bitrate: String,
    application: OpusApplication,
}

impl OpusExtractor {
    pub fn new(
        encoder: impl Into<String>,
        bitrate: impl Into<String>,
        application: OpusApplication,
    ) -> Self {
        Self {
            encoder: encoder.into(),
            bitrate: bitrate.into(),
            application,
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(&settings.encoder, &settings.bitrate, settings.application)
    }

    pub fn encoder_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
        args.extend(
            [
                "-vn",
                "-c:a",
                "libopus",
                "-b:a",
                self.bitrate.as_str(),
                "-application",
                self.application.as_str(),
                "-y",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(output.into());
        args
    }
}

#[async_trait::async_trait]
impl Converter for OpusExtractor {
    fn name(&self) -> &str {
        &self.encoder
    }

    async fn convert(&self, job: &Job) -> Result<u64> {
        let args = self.encoder_args(&job.input, &job.output);
        tracing::debug!("Running {} {:?}", self.encoder, args);

        let output = Command::new(&self.encoder)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MediaError::EncoderNotFound {
                program: self.encoder.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr, STDERR_TAIL_LINES);
            tracing::debug!("Encoder stderr for {}:\n{}", job.input.display(), stderr);
            return Err(MediaError::EncoderFailed {
                exit_code: output.status.code(),
                stderr,
            });
        }

        let metadata = tokio::fs::metadata(&job.output).await?;
        Ok(metadata.len())
    }
}

fn stderr_tail(stderr: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    kept[kept.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(root: PathBuf) -> AudioSettings {
        AudioSettings {
            root,
            ..AudioSettings::default()
        }
    }

    #[test]
    fn test_encoder_args_match_ffmpeg_invocation() {
        let extractor = OpusExtractor::new("ffmpeg", "24k", OpusApplication::Voip);
        let args = extractor.encoder_args(Path::new("in/talk.mp4"), Path::new("in/talk.opus"));

        let expected: Vec<OsString> = [
            "-i",
            "in/talk.mp4",
            "-vn",
            "-c:a",
            "libopus",
            "-b:a",
            "24k",
            "-application",
            "voip",
            "-y",
            "in/talk.opus",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_plan_replaces_extension_next_to_input() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("week1")).unwrap();
        std::fs::write(root.join("week1/Intro.MP4"), b"v").unwrap();
        std::fs::write(root.join("outro.mp4"), b"v").unwrap();
        std::fs::write(root.join("cover.png"), b"i").unwrap();

        let jobs = plan_audio_jobs(&settings(root.to_path_buf())).unwrap();

        assert_eq!(jobs.len(), 2);
        let outputs: Vec<PathBuf> = jobs.iter().map(|j| j.output.clone()).collect();
        assert!(outputs.contains(&root.join("week1/Intro.opus")));
        assert!(outputs.contains(&root.join("outro.opus")));
        assert!(jobs.iter().all(|j| j.kind == JobKind::Audio));
        assert!(jobs.iter().all(|j| j.input.is_absolute()));
    }

    #[test]
    fn test_plan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let jobs = plan_audio_jobs(&settings(temp_dir.path().to_path_buf())).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_absolute_root() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_root(Path::new("videos")).unwrap(), cwd.join("videos"));
        let abs = cwd.join("x");
        assert_eq!(absolute_root(&abs).unwrap(), abs);
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr = b"line1\nline2\n\nline3\nline4\n";
        assert_eq!(stderr_tail(stderr, 2), "line3\nline4");
        assert_eq!(stderr_tail(stderr, 10), "line1\nline2\nline3\nline4");
        assert_eq!(stderr_tail(b"", 3), "");
    }

    #[tokio::test]
    async fn test_probe_missing_encoder() {
        let err = probe_encoder("media-kit-no-such-encoder-binary")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EncoderNotFound { .. }));
        assert_eq!(err.severity().exit_code(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_failing_encoder() {
        let err = probe_encoder("false").await.unwrap_err();
        assert!(matches!(err, MediaError::EncoderNotFound { .. }));
    }

    #[tokio::test]
    async fn test_convert_with_missing_encoder_fails_job() {
        let temp_dir = TempDir::new().unwrap();
        let job = Job {
            index: 0,
            input: temp_dir.path().join("a.mp4"),
            output: temp_dir.path().join("a.opus"),
            kind: JobKind::Audio,
        };
        let extractor =
            OpusExtractor::new("media-kit-no-such-encoder-binary", "24k", OpusApplication::Voip);

        assert!(extractor.convert(&job).await.is_err());
        assert!(!job.output.exists());
    }
}
