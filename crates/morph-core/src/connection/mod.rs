//! Internet connectivity monitoring
//!
//! A [`ConnectionMonitor`] periodically runs a [`Probe`] and publishes
//! changes of [`ConnectionState`] through a watch channel.

mod monitor;
mod probe;

pub use monitor::ConnectionMonitor;
pub use probe::{HttpProbe, Probe};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    #[default]
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}
