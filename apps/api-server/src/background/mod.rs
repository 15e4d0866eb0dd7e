//! Background maintenance jobs.

#[cfg(feature = "scheduler")]
pub mod scheduler;

use std::time::Duration;

use formguard_infra::RateLimitGateway;

/// Drop idle rate limit windows and report how many went.
pub fn sweep_once(gateway: &RateLimitGateway) -> usize {
    gateway.sweep()
}

/// Run the sweep on a plain interval for builds without the scheduler.
#[cfg(not(feature = "scheduler"))]
pub fn spawn_sweeper(gateway: RateLimitGateway, every: Duration) {
    actix_rt::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&gateway);
        }
    });
    tracing::info!(interval_ms = every.as_millis() as u64, "Rate limit sweeper started");
}

/// Register the sweep as a repeated scheduler job.
#[cfg(feature = "scheduler")]
pub async fn register_sweeper(
    scheduler: &scheduler::Scheduler,
    gateway: RateLimitGateway,
    every: Duration,
) -> Result<uuid::Uuid, tokio_cron_scheduler::JobSchedulerError> {
    scheduler
        .add_repeated(every, move || {
            let gateway = gateway.clone();
            async move {
                sweep_once(&gateway);
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use formguard_core::domain::ClientIdentifier;
    use formguard_core::ports::ManualClock;
    use formguard_infra::BucketRegistry;

    #[actix_web::test]
    async fn test_sweep_once_drops_idle_windows() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let gateway = RateLimitGateway::in_memory(BucketRegistry::standard().unwrap(), clock.clone());

        gateway.limit("contact", &ClientIdentifier::sanitize("1.1.1.1")).await;
        gateway.limit("subscribe", &ClientIdentifier::sanitize("2.2.2.2")).await;
        assert_eq!(sweep_once(&gateway), 0);

        clock.advance(61_000);
        assert_eq!(sweep_once(&gateway), 2);
    }

    #[cfg(feature = "scheduler")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_registered_sweeper_runs_once_started() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let gateway = RateLimitGateway::in_memory(BucketRegistry::standard().unwrap(), clock.clone());
        gateway.limit("contact", &ClientIdentifier::sanitize("1.1.1.1")).await;
        clock.advance(61_000);

        let scheduler = scheduler::Scheduler::new().await.unwrap();
        register_sweeper(&scheduler, gateway.clone(), Duration::from_secs(1))
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        // The job already removed the idle window
        assert_eq!(sweep_once(&gateway), 0);
    }
}
