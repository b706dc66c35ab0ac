use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::geometry::Size;
use crate::{Error, Result};

/// A sizeable UI element an [`AnimationHandler`](super::AnimationHandler) can drive
///
/// The handler only calls the setters from the owner thread its dispatcher
/// routes to. Any error is taken to mean the element is gone for the
/// current tick.
pub trait AnimatedTarget: Send + Sync {
    fn size(&self) -> Result<Size>;

    fn set_size(&self, size: Size) -> Result<()>;

    /// Change only the width, leaving the height at its current value
    fn set_width(&self, width: i32) -> Result<()> {
        let current = self.size()?;
        self.set_size(Size::new(width, current.height))
    }

    /// Change only the height, leaving the width at its current value
    fn set_height(&self, height: i32) -> Result<()> {
        let current = self.size()?;
        self.set_size(Size::new(current.width, height))
    }

    /// False once the element has been destroyed
    fn is_alive(&self) -> bool {
        true
    }
}

/// Shared, thread-safe size slot
///
/// The simplest possible target: a widget's layout reads it every frame,
/// the animation writes it. Share it through the returned `Arc`.
#[derive(Debug)]
pub struct SizeCell {
    size: Mutex<Size>,
    alive: AtomicBool,
}

impl SizeCell {
    pub fn new(size: Size) -> Arc<Self> {
        Arc::new(Self {
            size: Mutex::new(size),
            alive: AtomicBool::new(true),
        })
    }

    /// Mark the element destroyed; later reads and writes fail
    pub fn destroy(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Current size, ignoring whether the cell is still alive
    pub fn get(&self) -> Size {
        *self.size.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AnimatedTarget for SizeCell {
    fn size(&self) -> Result<Size> {
        if !self.is_alive() {
            return Err(Error::TargetGone);
        }
        Ok(self.get())
    }

    fn set_size(&self, size: Size) -> Result<()> {
        if !self.is_alive() {
            return Err(Error::TargetGone);
        }
        *self.size.lock().unwrap_or_else(|e| e.into_inner()) = size;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_axis_setters() {
        let cell = SizeCell::new(Size::new(10, 20));
        cell.set_width(30).unwrap();
        assert_eq!(cell.get(), Size::new(30, 20));
        cell.set_height(5).unwrap();
        assert_eq!(cell.get(), Size::new(30, 5));
    }

    #[test]
    fn test_destroyed_cell_rejects_access() {
        let cell = SizeCell::new(Size::new(10, 20));
        cell.destroy();
        assert!(!cell.is_alive());
        assert!(matches!(cell.size(), Err(Error::TargetGone)));
        assert!(matches!(cell.set_size(Size::new(1, 1)), Err(Error::TargetGone)));
        assert_eq!(cell.get(), Size::new(10, 20));
    }
}
