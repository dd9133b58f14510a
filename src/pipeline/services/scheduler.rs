use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Source of the per-stage suspension. Swapping the implementation lets tests
/// drive a run without real delays.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn wait(&self, delay: Duration);

    fn name(&self) -> &'static str;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    fn name(&self) -> &'static str {
        "TokioScheduler"
    }
}

/// Ignores the delay and only yields back to the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

#[async_trait]
impl Scheduler for ImmediateScheduler {
    async fn wait(&self, _delay: Duration) {
        tokio::task::yield_now().await;
    }

    fn name(&self) -> &'static str {
        "ImmediateScheduler"
    }
}

/// Each `wait` blocks until a tick has been released with `advance`.
/// Clones share the same tick pool.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    ticks: Arc<Semaphore>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            ticks: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn advance(&self, ticks: usize) {
        self.ticks.add_permits(ticks);
    }

    pub fn pending_ticks(&self) -> usize {
        self.ticks.available_permits()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    async fn wait(&self, _delay: Duration) {
        // The semaphore is never closed, so acquire only fails on shutdown.
        if let Ok(permit) = self.ticks.acquire().await {
            permit.forget();
        }
    }

    fn name(&self) -> &'static str {
        "ManualScheduler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_waits_for_the_delay() {
        let start = tokio::time::Instant::now();
        TokioScheduler.wait(Duration::from_millis(600)).await;
        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_scheduler_skips_the_delay() {
        let start = tokio::time::Instant::now();
        ImmediateScheduler.wait(Duration::from_secs(60)).await;
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn manual_scheduler_releases_one_wait_per_tick() {
        let scheduler = ManualScheduler::new();
        let waiter = scheduler.clone();
        let task = tokio::spawn(async move {
            waiter.wait(Duration::ZERO).await;
            waiter.wait(Duration::ZERO).await;
        });

        scheduler.advance(1);
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        scheduler.advance(1);
        task.await.unwrap();
        assert_eq!(scheduler.pending_ticks(), 0);
    }
}
