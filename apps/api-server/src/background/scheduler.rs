//! Interval job scheduler using tokio-cron-scheduler.

use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Job scheduler wrapper. Registered jobs run as soon as it is started.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new() -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner })
    }

    /// Add a job that runs every `every`.
    pub async fn add_repeated<F, Fut>(
        &self,
        every: Duration,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_repeated_async(every, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(interval_ms = every.as_millis() as u64, job_id = %id, "Repeated job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_repeated_job_runs_after_start() {
        let runs = Arc::new(AtomicUsize::new(0));
        let scheduler = Scheduler::new().await.unwrap();

        let counter = runs.clone();
        scheduler
            .add_repeated(Duration::from_secs(1), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(runs.load(Ordering::SeqCst) >= 1);
    }
}
