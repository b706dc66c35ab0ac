//! Molecular layer: the animation handler
//!
//! Owns one periodic tokio timer, hands each tick to the target's owner
//! through a [`Dispatcher`], and guarantees the completion callback fires
//! at most once.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};
use uuid::Uuid;

use super::dispatch::{run_on_owner, Dispatcher, Job};
use super::geometry::Size;
use super::stepper;
use super::target::AnimatedTarget;
use crate::config::AnimationOptions;
use crate::{Error, Result};

/// Lifecycle of an [`AnimationHandler`]
///
/// `Constructed → Running ⇄ Paused → Disposed`. Stopping disposes; there
/// is no way back from `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Constructed,
    Running,
    Paused,
    Disposed,
}

/// What the timer task should be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerControl {
    Running,
    Paused,
    Stopped,
}

type ProgressListener = Arc<dyn Fn(f64) + Send + Sync>;
type EndListener = Arc<dyn Fn() + Send + Sync>;
type CompleteAction = Box<dyn FnOnce() + Send>;

struct Inner {
    target: Option<Arc<dyn AnimatedTarget>>,
    target_size: Size,
    options: AnimationOptions,
    state: AnimationState,
    on_complete: Option<CompleteAction>,
    progress_listeners: Vec<ProgressListener>,
    end_listeners: Vec<EndListener>,
}

struct Shared {
    id: Uuid,
    original_size: Size,
    inner: Mutex<Inner>,
    dispatcher: Arc<dyn Dispatcher>,
    control: watch::Sender<TimerControl>,
    /// Set while a tick job is waiting on the owner
    tick_pending: AtomicBool,
}

/// Everything a release detaches from [`Inner`]
///
/// Dropped by the caller after the lock is released, since a callback may
/// own the last handler clone.
#[must_use]
struct Detached {
    _target: Option<Arc<dyn AnimatedTarget>>,
    _on_complete: Option<CompleteAction>,
    _progress_listeners: Vec<ProgressListener>,
    _end_listeners: Vec<EndListener>,
}

/// Shared by every user-facing clone; the timer task never holds one
struct HandleGuard {
    shared: Arc<Shared>,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.shared.release_orphan();
    }
}

/// Converges an element's size toward a target size over time
///
/// Cloning yields another handle to the same animation, so callbacks can
/// hold one to retarget or stop it. Dropping the last handle lets a
/// running animation finish; a paused or unstarted one is disposed, as
/// nothing could resume it.
#[derive(Clone)]
pub struct AnimationHandler {
    shared: Arc<Shared>,
    _guard: Arc<HandleGuard>,
}

impl AnimationHandler {
    /// Create a handler; captures the target's current size as the origin
    ///
    /// No timer is created until [`start`](Self::start).
    pub fn new(
        target: Arc<dyn AnimatedTarget>,
        target_size: Size,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self> {
        let original_size = target.size()?;
        let (control, _) = watch::channel(TimerControl::Paused);

        let shared = Shared {
            id: Uuid::new_v4(),
            original_size,
            inner: Mutex::new(Inner {
                target: Some(target),
                target_size,
                options: AnimationOptions::default(),
                state: AnimationState::Constructed,
                on_complete: None,
                progress_listeners: Vec::new(),
                end_listeners: Vec::new(),
            }),
            dispatcher,
            control,
            tick_pending: AtomicBool::new(false),
        };

        debug!(id = %shared.id, from = %original_size, to = %target_size, "animation created");

        let shared = Arc::new(shared);
        Ok(Self {
            _guard: Arc::new(HandleGuard {
                shared: Arc::clone(&shared),
            }),
            shared,
        })
    }

    /// Replace the default options (builder style)
    pub fn with_options(self, options: AnimationOptions) -> Result<Self> {
        self.set_options(options)?;
        Ok(self)
    }

    /// Replace the options; only allowed before the animation starts
    pub fn set_options(&self, options: AnimationOptions) -> Result<()> {
        options.validate()?;

        let mut inner = self.shared.lock();
        match inner.state {
            AnimationState::Constructed => {
                inner.options = options;
                Ok(())
            }
            AnimationState::Disposed => Err(Error::Disposed),
            AnimationState::Running | AnimationState::Paused => Err(Error::AlreadyStarted),
        }
    }

    /// Start ticking with no completion action
    pub fn start(&self) -> Result<()> {
        self.start_inner(None)
    }

    /// Start ticking; `on_complete` runs once on the owner when the
    /// target size is reached (never on `stop`)
    pub fn start_with<F>(&self, on_complete: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.start_inner(Some(Box::new(on_complete)))
    }

    fn start_inner(&self, on_complete: Option<CompleteAction>) -> Result<()> {
        let mut inner = self.shared.lock();

        match inner.state {
            AnimationState::Disposed => return Err(Error::Disposed),
            AnimationState::Running | AnimationState::Paused => {
                debug!(id = %self.shared.id, "start ignored, animation already started");
                return Ok(());
            }
            AnimationState::Constructed => {}
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let period = inner.options.interval();

        inner.state = AnimationState::Running;
        inner.on_complete = on_complete;

        // Control changes happen under the lock so a concurrent stop()
        // cannot be overwritten by this Running.
        self.shared.control.send_replace(TimerControl::Running);
        let control = self.shared.control.subscribe();
        runtime.spawn(run_timer(Arc::clone(&self.shared), control, period));

        debug!(
            id = %self.shared.id,
            interval_ms = inner.options.interval_ms,
            speed_divisor = inner.options.speed_divisor,
            "animation started"
        );
        Ok(())
    }

    /// Stop and dispose; the completion action does not run. Idempotent.
    pub fn stop(&self) {
        self.shared.dispose();
    }

    /// Halt ticking without releasing the timer
    pub fn pause(&self) {
        let mut inner = self.shared.lock();
        if inner.state == AnimationState::Running {
            inner.state = AnimationState::Paused;
            self.shared.control.send_replace(TimerControl::Paused);
            debug!(id = %self.shared.id, "animation paused");
        }
    }

    /// Continue a paused animation; no-op in any other state
    pub fn resume(&self) {
        let mut inner = self.shared.lock();
        if inner.state == AnimationState::Paused {
            inner.state = AnimationState::Running;
            self.shared.control.send_replace(TimerControl::Running);
            debug!(id = %self.shared.id, "animation resumed");
        }
    }

    /// Change the destination without resetting progress
    pub fn retarget(&self, size: Size) -> Result<()> {
        let mut inner = self.shared.lock();
        if inner.state == AnimationState::Disposed {
            return Err(Error::Disposed);
        }
        inner.target_size = size;
        debug!(id = %self.shared.id, to = %size, "animation retargeted");
        Ok(())
    }

    /// Register a listener for each tick's completion percentage
    pub fn on_progress<F>(&self, listener: F)
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let mut inner = self.shared.lock();
        if inner.state != AnimationState::Disposed {
            inner.progress_listeners.push(Arc::new(listener));
        }
    }

    /// Register a listener for natural completion
    pub fn on_end<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut inner = self.shared.lock();
        if inner.state != AnimationState::Disposed {
            inner.end_listeners.push(Arc::new(listener));
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn state(&self) -> AnimationState {
        self.shared.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == AnimationState::Disposed
    }

    pub fn original_size(&self) -> Size {
        self.shared.original_size
    }

    pub fn target_size(&self) -> Size {
        self.shared.lock().target_size
    }

    pub fn options(&self) -> AnimationOptions {
        self.shared.lock().options
    }
}

impl fmt::Debug for AnimationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("AnimationHandler")
            .field("id", &self.shared.id)
            .field("state", &inner.state)
            .field("original_size", &self.shared.original_size)
            .field("target_size", &inner.target_size)
            .field("options", &inner.options)
            .finish()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Detach the target and callbacks and tell the timer to exit.
    /// Caller holds the lock.
    fn release(&self, inner: &mut Inner) -> Detached {
        inner.state = AnimationState::Disposed;
        self.control.send_replace(TimerControl::Stopped);
        Detached {
            _target: inner.target.take(),
            _on_complete: inner.on_complete.take(),
            _progress_listeners: std::mem::take(&mut inner.progress_listeners),
            _end_listeners: std::mem::take(&mut inner.end_listeners),
        }
    }

    fn dispose(&self) {
        let detached = {
            let mut inner = self.lock();
            if inner.state == AnimationState::Disposed {
                return;
            }
            self.release(&mut inner)
        };
        debug!(id = %self.id, "animation disposed");
        drop(detached);
    }

    /// The last handle is gone
    fn release_orphan(&self) {
        let detached = {
            let mut inner = self.lock();
            let state = inner.state;
            match state {
                AnimationState::Constructed | AnimationState::Paused => self.release(&mut inner),
                AnimationState::Running | AnimationState::Disposed => return,
            }
        };
        debug!(id = %self.id, "animation dropped while idle, disposed");
        drop(detached);
    }

    /// Hand a tick to the owner, dropping it if the last one has not run yet
    fn schedule_tick(self: &Arc<Self>) {
        if self.tick_pending.swap(true, Ordering::AcqRel) {
            trace!(id = %self.id, "previous tick still pending, dropping this one");
            return;
        }

        let shared = Arc::clone(self);
        let job: Job = Box::new(move || {
            shared.tick_pending.store(false, Ordering::Release);
            shared.tick();
        });

        if let Err(e) = run_on_owner(self.dispatcher.as_ref(), job) {
            self.tick_pending.store(false, Ordering::Release);
            trace!(id = %self.id, error = %e, "tick dispatch failed");
        }
    }

    /// One animation step; runs on the owner thread
    fn tick(&self) {
        let (target, target_size, options) = {
            let inner = self.lock();
            if inner.state != AnimationState::Running {
                return;
            }
            let Some(target) = inner.target.clone() else {
                return;
            };
            (target, inner.target_size, inner.options)
        };

        if !target.is_alive() {
            debug!(id = %self.id, "animation target is gone, stopping");
            self.dispose();
            return;
        }

        let current = match target.size() {
            Ok(size) => size,
            Err(e) => {
                trace!(id = %self.id, error = %e, "could not read target size, skipping tick");
                return;
            }
        };

        let next = stepper::next_size(current, target_size, &options);
        if let Err(e) = apply(target.as_ref(), current, next, &options) {
            trace!(id = %self.id, error = %e, "could not resize target, skipping tick");
            return;
        }

        let percentage = stepper::progress(self.original_size, next, target_size, &options);
        trace!(id = %self.id, size = %next, percentage, "animation tick");
        self.notify_progress(percentage);

        if !stepper::is_complete(next, target_size, &options) {
            return;
        }

        let exact = stepper::snap(next, target_size, &options);
        if let Err(e) = apply(target.as_ref(), next, exact, &options) {
            trace!(id = %self.id, error = %e, "could not snap target to final size");
            return;
        }
        if percentage < 100.0 {
            self.notify_progress(100.0);
        }

        self.complete(target_size);
    }

    fn notify_progress(&self, percentage: f64) {
        let listeners = self.lock().progress_listeners.clone();
        for listener in &listeners {
            listener(percentage);
        }
    }

    /// Single-shot transition to `Disposed` followed by the end callbacks
    fn complete(&self, reached: Size) {
        let (on_complete, end_listeners, detached) = {
            let mut inner = self.lock();
            // Stopped or retargeted by a progress listener in the meantime
            if inner.state == AnimationState::Disposed || inner.target_size != reached {
                return;
            }
            let on_complete = inner.on_complete.take();
            let end_listeners = std::mem::take(&mut inner.end_listeners);
            let detached = self.release(&mut inner);
            (on_complete, end_listeners, detached)
        };
        drop(detached);

        debug!(id = %self.id, size = %reached, "animation complete");

        for listener in &end_listeners {
            listener();
        }
        if let Some(action) = on_complete {
            action();
        }
    }
}

/// Write `next` to the target touching only the active axes
fn apply(
    target: &dyn AnimatedTarget,
    current: Size,
    next: Size,
    options: &AnimationOptions,
) -> Result<()> {
    match (options.ignore_width, options.ignore_height) {
        (false, false) if next != current => target.set_size(next),
        (false, true) if next.width != current.width => target.set_width(next.width),
        (true, false) if next.height != current.height => target.set_height(next.height),
        _ => Ok(()),
    }
}

async fn run_timer(
    shared: Arc<Shared>,
    mut control: watch::Receiver<TimerControl>,
    period: Duration,
) {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let mode = *control.borrow_and_update();
        match mode {
            TimerControl::Stopped => break,
            TimerControl::Paused => {
                if control.changed().await.is_err() {
                    break;
                }
                interval.reset();
                continue;
            }
            TimerControl::Running => {}
        }

        tokio::select! {
            changed = control.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = interval.tick() => {
                shared.schedule_tick();
            }
        }
    }

    trace!(id = %shared.id, "animation timer stopped");
}
