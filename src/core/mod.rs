pub mod discovery;
pub mod engine;
pub mod report;

pub use crate::domain::model::{BatchSummary, Job, JobKind, JobOutcome, JobStatus};
pub use crate::domain::ports::Converter;
pub use crate::utils::error::Result;
