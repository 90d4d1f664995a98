//! SVG → PNG icon rasterizing.
//!
//! One job per requested size. Output files are named after the input with
//! the size appended, e.g. `icon.svg` → `icon16.png`, `icon48.png`.

use crate::config::IconSettings;
use crate::core::{Converter, Job, JobKind};
use crate::utils::error::{MediaError, Result};
use resvg::tiny_skia;
use resvg::usvg;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 規劃每個尺寸的轉換工作；輸入檔不存在時不產生任何工作
pub fn plan_icon_jobs(settings: &IconSettings) -> Result<Vec<Job>> {
    if !settings.input.is_file() {
        return Err(MediaError::InputNotFound {
            path: settings.input.clone(),
        });
    }

    let mut seen = HashSet::new();
    let jobs = settings
        .sizes
        .iter()
        .copied()
        .filter(|size| seen.insert(*size))
        .enumerate()
        .map(|(index, size)| Job {
            index,
            input: settings.input.clone(),
            output: icon_output_path(&settings.input, size, settings.output_dir.as_deref()),
            kind: JobKind::Raster {
                width: size,
                height: size,
            },
        })
        .collect();

    Ok(jobs)
}

/// `dir/icon.svg` + 16 → `dir/icon16.png`（或 `output_dir/icon16.png`）
pub fn icon_output_path(input: &Path, size: u32, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{}{}.png", stem, size);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// 以 resvg 將 SVG 繪製成指定像素尺寸的 PNG
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgRasterizer {
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!("Loaded {} font face(s)", fontdb.len());

        Self {
            fontdb: Arc::new(fontdb),
        }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Converter for SvgRasterizer {
    fn name(&self) -> &str {
        "resvg"
    }

    async fn convert(&self, job: &Job) -> Result<u64> {
        let JobKind::Raster { width, height } = job.kind else {
            return Err(MediaError::render(format!(
                "cannot rasterize a '{}' job",
                job.kind
            )));
        };

        let fontdb = Arc::clone(&self.fontdb);
        let input = job.input.clone();
        let output = job.output.clone();

        // 繪製屬 CPU 密集工作，移到 blocking 執行緒
        tokio::task::spawn_blocking(move || -> Result<u64> {
            // 相對路徑的外部圖片以 SVG 所在目錄為基準
            let options = usvg::Options {
                resources_dir: input.parent().map(Path::to_path_buf),
                fontdb,
                ..usvg::Options::default()
            };
            let data = std::fs::read(&input)?;
            let png = render_png(&data, width, height, &options)?;

            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&output, &png)?;
            Ok(png.len() as u64)
        })
        .await
        .map_err(|e| MediaError::TaskError {
            message: e.to_string(),
        })?
    }
}

/// 將整份 SVG 縮放填滿 `width`×`height`，x、y 各自縮放
pub fn render_png(
    data: &[u8],
    width: u32,
    height: u32,
    options: &usvg::Options,
) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_data(data, options).map_err(|e| MediaError::render(e.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        MediaError::render(format!("cannot allocate a {}x{} canvas", width, height))
    })?;

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| MediaError::render(format!("PNG encoding failed: {}", e)))
}
