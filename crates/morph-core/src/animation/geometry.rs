use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A 2D integer size in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// One dimension of a [`Size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Width, Axis::Height];
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    /// Copy of this size with one axis replaced
    #[inline]
    pub fn with(self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::Width => Self { width: value, ..self },
            Axis::Height => Self { height: value, ..self },
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `"WIDTHxHEIGHT"`, e.g. `"200x100"`
impl FromStr for Size {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidOption(format!("expected WIDTHxHEIGHT, got '{}'", s));

        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: i32 = width.trim().parse().map_err(|_| invalid())?;
        let height: i32 = height.trim().parse().map_err(|_| invalid())?;

        if width < 0 || height < 0 {
            return Err(invalid());
        }

        Ok(Self::new(width, height))
    }
}
