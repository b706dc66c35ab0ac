//! Fire-and-forget background helpers built on the tokio runtime
//!
//! All of these must be called from within a runtime.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Shortest delay or period accepted by the timers
pub(crate) const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a delayed or repeating action
///
/// Dropping the handle leaves the timer running; call
/// [`cancel`](Self::cancel) to stop it.
#[derive(Debug)]
pub struct TimerHandle {
    handle: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Run a blocking closure on the blocking thread pool
pub fn run_in_background<F, T>(action: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(action)
}

/// Run `action` once after `delay`
pub fn run_after<F>(delay: Duration, action: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let delay = delay.max(MIN_PERIOD);
    TimerHandle {
        handle: tokio::spawn(async move {
            time::sleep(delay).await;
            action();
        }),
    }
}

/// Run `action` every `period`, first after one period
pub fn run_every<F>(period: Duration, mut action: F) -> TimerHandle
where
    F: FnMut() + Send + 'static,
{
    let period = period.max(MIN_PERIOD);
    TimerHandle {
        handle: tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                action();
            }
        }),
    }
}

/// Call `action` on the blocking pool while `condition` holds, then `on_end`
pub fn loop_until<A, C, E>(mut action: A, mut condition: C, on_end: Option<E>) -> JoinHandle<()>
where
    A: FnMut() + Send + 'static,
    C: FnMut() -> bool + Send + 'static,
    E: FnOnce() + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        while condition() {
            action();
        }
        if let Some(on_end) = on_end {
            on_end();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_run_after_fires_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let timer = run_after(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_every_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let timer = run_every(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // fires at 100, 200, 300
        sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        timer.cancel();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = run_after(Duration::from_millis(100), move || flag.store(true, Ordering::SeqCst));
        timer.cancel();

        sleep(Duration::from_millis(500)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_loop_until_runs_end_action() {
        let count = Arc::new(AtomicUsize::new(0));
        let ended = Arc::new(AtomicBool::new(false));

        let action_count = count.clone();
        let condition_count = count.clone();
        let flag = ended.clone();

        loop_until(
            move || {
                action_count.fetch_add(1, Ordering::SeqCst);
            },
            move || condition_count.load(Ordering::SeqCst) < 5,
            Some(move || flag.store(true, Ordering::SeqCst)),
        )
        .await
        .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert!(ended.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_in_background_returns_value() {
        let value = run_in_background(|| 6 * 7).await.unwrap();
        assert_eq!(value, 42);
    }
}
