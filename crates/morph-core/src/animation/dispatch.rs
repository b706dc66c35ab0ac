//! Atomic layer: execute-on-owner capability
//!
//! UI elements may only be mutated on the thread that owns them. The
//! animation timer runs elsewhere, so it hands every mutation to a
//! [`Dispatcher`] which either runs it in place (already on the owner) or
//! posts it to the owner's event loop.

use std::thread::{self, ThreadId};

use tokio::sync::mpsc;

use crate::{Error, Result};

/// A unit of work to run on the owner thread
pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Dispatcher: Send + Sync {
    /// True when the calling thread may mutate the target directly
    fn is_owner(&self) -> bool;

    /// Queue a job for the owner thread without waiting for it to run
    fn post(&self, job: Job) -> Result<()>;
}

/// Run `job` now if on the owner thread, otherwise post it
pub fn run_on_owner(dispatcher: &dyn Dispatcher, job: Job) -> Result<()> {
    if dispatcher.is_owner() {
        job();
        Ok(())
    } else {
        dispatcher.post(job)
    }
}

/// Dispatcher for targets with no thread affinity
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn is_owner(&self) -> bool {
        true
    }

    fn post(&self, job: Job) -> Result<()> {
        job();
        Ok(())
    }
}

/// Create a dispatcher whose owner is the calling thread
///
/// The owner's event loop must call [`OwnerQueue::drain`] regularly
/// (typically once per frame) to run posted jobs.
pub fn owner_queue() -> (QueueDispatcher, OwnerQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let owner = thread::current().id();
    (QueueDispatcher { tx, owner }, OwnerQueue { rx })
}

/// Sending half of an owner queue
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    tx: mpsc::UnboundedSender<Job>,
    owner: ThreadId,
}

impl Dispatcher for QueueDispatcher {
    fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    fn post(&self, job: Job) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| Error::Dispatch("owner queue closed".to_string()))
    }
}

/// Receiving half of an owner queue, held by the owner's event loop
#[derive(Debug)]
pub struct OwnerQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl OwnerQueue {
    /// Run every job posted so far without blocking; returns how many ran
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next posted job and run it
    ///
    /// Returns false once every dispatcher has been dropped.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}
