pub mod animation;
pub mod config;
pub mod connection;
pub mod error;
pub mod tasks;

pub use animation::{AnimationHandler, AnimationState, Size};
pub use config::{AnimationOptions, AppConfig};
pub use connection::{ConnectionMonitor, ConnectionState};
pub use error::{Error, Result};
