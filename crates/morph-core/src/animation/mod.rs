//! Timer-driven size animation for UI elements
//!
//! An [`AnimationHandler`] converges the size of an [`AnimatedTarget`]
//! toward a target size. Each timer tick moves every active axis by a step
//! proportional to the remaining distance, so the motion decelerates as it
//! approaches the target.
//!
//! # Layers
//!
//! ## Atomic
//! - `geometry` - `Size` and `Axis`
//! - `stepper` - pure stepping, completion and progress math
//! - `target` - the capability the animated element provides
//! - `dispatch` - execute-on-owner capability (UI thread affinity)
//!
//! ## Molecular
//! - `handler` - the timer, lifecycle and callbacks
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use morph_core::animation::{owner_queue, AnimationHandler, Size, SizeCell};
//!
//! let panel = SizeCell::new(Size::new(100, 100));
//! let (dispatcher, mut queue) = owner_queue();
//!
//! let handler = AnimationHandler::new(panel.clone(), Size::new(200, 100), Arc::new(dispatcher))?;
//! handler.on_progress(|percentage| println!("{percentage:.0}%"));
//! handler.start_with(|| println!("done"))?;
//!
//! // In the UI loop, run the size changes posted by the timer
//! queue.drain();
//! ```

// Atomic layer
pub mod dispatch;
pub mod geometry;
pub mod stepper;
pub mod target;

// Molecular layer
pub mod handler;

pub use dispatch::{owner_queue, run_on_owner, Dispatcher, InlineDispatcher, Job, OwnerQueue, QueueDispatcher};
pub use geometry::{Axis, Size};
pub use handler::{AnimationHandler, AnimationState};
pub use target::{AnimatedTarget, SizeCell};
