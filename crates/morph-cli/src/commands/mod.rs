pub mod config;
pub mod demo;
pub mod simulate;
pub mod watch;
