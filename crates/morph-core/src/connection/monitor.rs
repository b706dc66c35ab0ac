use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{ConnectionState, Probe};
use crate::tasks::MIN_PERIOD;

type ConnectedCallback = Box<dyn FnOnce(ConnectionState) + Send>;

/// Periodically probes connectivity and publishes state changes
pub struct ConnectionMonitor {
    probe: Arc<dyn Probe>,
    interval: Duration,
    state_tx: watch::Sender<ConnectionState>,
    last_changed: Mutex<Option<DateTime<Utc>>>,
    on_connected: Mutex<Vec<ConnectedCallback>>,
}

impl ConnectionMonitor {
    /// Create a monitor; the initial state is `Disconnected` until the
    /// first check. The interval is at least 1ms.
    pub fn new(probe: Arc<dyn Probe>, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            probe,
            interval: interval.max(MIN_PERIOD),
            state_tx,
            last_changed: Mutex::new(None),
            on_connected: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Receiver notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// When the state last changed, if it ever did
    pub fn last_changed(&self) -> Option<DateTime<Utc>> {
        *self.last_changed.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `callback` once the connection is up
    ///
    /// Fires immediately if already connected, otherwise on the first
    /// check that observes `Connected`. Each callback fires only once.
    pub fn on_connected<F>(&self, callback: F)
    where
        F: FnOnce(ConnectionState) + Send + 'static,
    {
        if self.state().is_connected() {
            callback(ConnectionState::Connected);
            return;
        }
        self.on_connected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(callback));
    }

    /// Probe once and publish the result
    pub async fn check_now(&self) -> ConnectionState {
        let state = self.probe.check().await;

        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });

        if changed {
            *self.last_changed.lock().unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());
            info!(state = %state, "Connection state changed");
        }

        if state.is_connected() {
            let callbacks =
                std::mem::take(&mut *self.on_connected.lock().unwrap_or_else(|e| e.into_inner()));
            for callback in callbacks {
                callback(state);
            }
        }

        state
    }

    /// Check immediately, then every interval until shutdown
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = self.interval.as_millis() as u64, "Connection monitor started");

        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Connection monitor received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    debug!("Running connection check");
                    self.check_now().await;
                }
            }
        }

        info!("Connection monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, timeout};

    /// Probe that replays a scripted sequence, repeating the last answer
    struct ScriptedProbe {
        answers: Mutex<VecDeque<ConnectionState>>,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(answers: &[ConnectionState]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        async fn check(&self) -> ConnectionState {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop_front().unwrap()
            } else {
                *answers.front().unwrap()
            }
        }
    }

    use crate::connection::ConnectionState::{Connected, Disconnected};

    #[tokio::test]
    async fn test_check_now_publishes_changes_only() {
        let probe = ScriptedProbe::new(&[Disconnected, Connected, Connected, Disconnected]);
        let monitor = ConnectionMonitor::new(probe, Duration::from_secs(5));
        let mut rx = monitor.subscribe();

        assert_eq!(monitor.check_now().await, Disconnected);
        assert!(!rx.has_changed().unwrap());
        assert!(monitor.last_changed().is_none());

        assert_eq!(monitor.check_now().await, Connected);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Connected);
        assert!(monitor.last_changed().is_some());

        assert_eq!(monitor.check_now().await, Connected);
        assert!(!rx.has_changed().unwrap());

        assert_eq!(monitor.check_now().await, Disconnected);
        assert_eq!(*rx.borrow_and_update(), Disconnected);
    }

    #[tokio::test]
    async fn test_on_connected_fires_once() {
        let probe = ScriptedProbe::new(&[Disconnected, Connected, Disconnected, Connected]);
        let monitor = ConnectionMonitor::new(probe, Duration::from_secs(5));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        monitor.on_connected(move |state| {
            assert_eq!(state, Connected);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.check_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        monitor.check_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        monitor.check_now().await;
        monitor.check_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // registering while connected fires right away
        let immediate = Arc::new(AtomicUsize::new(0));
        let counter = immediate.clone();
        monitor.on_connected(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(immediate.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let probe = ScriptedProbe::new(&[Connected]);
        let monitor = Arc::new(ConnectionMonitor::new(probe.clone(), Duration::ZERO));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(monitor.clone().run(shutdown_rx));

        // immediate check plus one per millisecond
        sleep(Duration::from_micros(5500)).await;
        assert_eq!(probe.calls.load(Ordering::SeqCst), 6);

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_checks_periodically_until_shutdown() {
        let probe = ScriptedProbe::new(&[Connected]);
        let monitor = Arc::new(ConnectionMonitor::new(probe.clone(), Duration::from_secs(5)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(monitor.clone().run(shutdown_rx));

        // immediate check plus ticks at 5s and 10s
        sleep(Duration::from_secs(12)).await;
        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        assert_eq!(monitor.state(), Connected);

        shutdown_tx.send(true).unwrap();
        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    }
}
