pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{AudioArgs, IconArgs};

pub use app::{
    audio::{plan_audio_jobs, probe_encoder, OpusExtractor},
    icons::{plan_icon_jobs, SvgRasterizer},
};
pub use config::{AudioSettings, IconSettings, OpusApplication};
pub use core::{engine::BatchEngine, report::RunReport};
pub use domain::model::{BatchSummary, Job, JobKind, JobOutcome, JobStatus};
pub use utils::error::{MediaError, Result};
