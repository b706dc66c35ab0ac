mod background;
mod one_way;

pub use background::{loop_until, run_after, run_every, run_in_background, TimerHandle};
pub use one_way::OneWayTask;

pub(crate) use background::MIN_PERIOD;
