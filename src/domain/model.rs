use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 單一轉換工作：一個輸入檔對應一個輸出檔
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: JobKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    Raster { width: u32, height: u32 },
    Audio,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Raster { width, height } => write!(f, "{}x{}", width, height),
            JobKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded { output_bytes: u64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job: Job,
    pub status: JobStatus,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<JobOutcome>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl BatchSummary {
    /// 依 job index 排序後彙總；total 一定等於 succeeded + failed
    pub fn from_outcomes(mut outcomes: Vec<JobOutcome>, elapsed: Duration) -> Self {
        outcomes.sort_by_key(|o| o.job.index);
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
            elapsed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, status: JobStatus) -> JobOutcome {
        JobOutcome {
            job: Job {
                index,
                input: PathBuf::from(format!("in{}.mp4", index)),
                output: PathBuf::from(format!("in{}.opus", index)),
                kind: JobKind::Audio,
            },
            status,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_summary_counts_and_orders_outcomes() {
        let outcomes = vec![
            outcome(2, JobStatus::Failed {
                reason: "exit 1".to_string(),
            }),
            outcome(0, JobStatus::Succeeded { output_bytes: 10 }),
            outcome(1, JobStatus::Succeeded { output_bytes: 20 }),
        ];

        let summary = BatchSummary::from_outcomes(outcomes, Duration::from_secs(1));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        let order: Vec<usize> = summary.outcomes.iter().map(|o| o.job.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn test_job_kind_display() {
        assert_eq!(
            JobKind::Raster {
                width: 48,
                height: 48
            }
            .to_string(),
            "48x48"
        );
        assert_eq!(JobKind::Audio.to_string(), "audio");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(outcome(0, JobStatus::Succeeded { output_bytes: 7 }))
            .unwrap();
        assert_eq!(json["status"]["status"], "succeeded");
        assert_eq!(json["status"]["output_bytes"], 7);
        assert_eq!(json["elapsed"], 5);
        assert_eq!(json["job"]["kind"]["type"], "audio");
    }
}
