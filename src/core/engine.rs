use crate::core::{BatchSummary, Converter, Job, JobKind, JobOutcome, JobStatus};
use crate::utils::monitor::ProcessMonitor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

/// 以固定數量的 worker 並行執行轉換工作
///
/// 每個工作彼此獨立；單一工作失敗（或 panic）只會記錄為失敗結果，
/// 不會中斷整批處理。
pub struct BatchEngine<C: Converter> {
    converter: Arc<C>,
    workers: usize,
    monitor: ProcessMonitor,
}

impl<C: Converter> BatchEngine<C> {
    pub fn new(converter: C, workers: usize) -> Self {
        Self::new_with_monitoring(converter, workers, false)
    }

    pub fn new_with_monitoring(converter: C, workers: usize, monitor_enabled: bool) -> Self {
        Self {
            converter: Arc::new(converter),
            workers: workers.max(1),
            monitor: ProcessMonitor::new(monitor_enabled),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn run(&self, jobs: Vec<Job>) -> BatchSummary {
        let started = Instant::now();
        let total = jobs.len();

        if total == 0 {
            tracing::debug!("No jobs to run");
            return BatchSummary::from_outcomes(Vec::new(), started.elapsed());
        }

        tracing::info!(
            "🚀 Running {} job(s) with {} worker(s) [{}]",
            total,
            self.workers,
            self.converter.name()
        );
        self.monitor.log_stats("Before batch");

        let sem = Arc::new(Semaphore::new(self.workers));
        let mut join_set = JoinSet::new();
        let mut outcomes = Vec::with_capacity(total);
        // 任務 id → 工作，用來回補 panic 的任務
        let mut pending: HashMap<task::Id, Job> = HashMap::with_capacity(total);

        for job in jobs {
            let permit = match sem.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    outcomes.push(failed(job, format!("worker pool closed: {}", e)));
                    continue;
                }
            };

            let converter = Arc::clone(&self.converter);
            let task_job = job.clone();
            let handle = join_set.spawn(async move {
                let _permit = permit;
                run_job(converter.as_ref(), task_job, total).await
            });
            pending.insert(handle.id(), job);
        }

        while let Some(res) = join_set.join_next_with_id().await {
            match res {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    tracing::error!("❌ Conversion task aborted: {}", e);
                    if let Some(job) = pending.remove(&e.id()) {
                        outcomes.push(failed(job, "conversion task panicked".to_string()));
                    }
                }
            }
        }

        let summary = BatchSummary::from_outcomes(outcomes, started.elapsed());

        tracing::info!(
            "Batch finished: {} succeeded, {} failed, {:?}",
            summary.succeeded,
            summary.failed,
            summary.elapsed
        );
        self.monitor.log_final_stats();

        summary
    }
}

async fn run_job<C: Converter + ?Sized>(converter: &C, job: Job, total: usize) -> JobOutcome {
    let label = format!("[{}/{}]", job.index + 1, total);
    let started = Instant::now();
    tracing::info!("{} ▶️  Start: {}", label, display_name(&job));

    let status = match converter.convert(&job).await {
        Ok(output_bytes) => {
            tracing::info!(
                "{} ✅ Done: {} ({})",
                label,
                file_name(&job.output),
                describe_output(&job, output_bytes)
            );
            JobStatus::Succeeded { output_bytes }
        }
        Err(e) => {
            tracing::error!("{} ❌ Failed: {}: {}", label, display_name(&job), e);
            JobStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    JobOutcome {
        job,
        status,
        elapsed: started.elapsed(),
    }
}

fn failed(job: Job, reason: String) -> JobOutcome {
    JobOutcome {
        job,
        status: JobStatus::Failed { reason },
        elapsed: std::time::Duration::ZERO,
    }
}

fn display_name(job: &Job) -> String {
    match job.kind {
        JobKind::Raster { .. } => format!("{} -> {}", file_name(&job.input), job.kind),
        JobKind::Audio => file_name(&job.input),
    }
}

fn describe_output(job: &Job, output_bytes: u64) -> String {
    match job.kind {
        JobKind::Raster { .. } => job.kind.to_string(),
        JobKind::Audio => format!("{:.2} MB", output_bytes as f64 / (1024.0 * 1024.0)),
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
