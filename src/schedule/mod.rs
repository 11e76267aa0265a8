//! Scheduling of drains: throttle/debounce timing and the replaceable
//! strategy used to switch to immediate delivery on unload.

mod policy;
mod strategy;
mod worker;

pub use policy::{DEFAULT_THROTTLE, DEFAULT_THROTTLE_MS, SchedulingPolicy};
pub use strategy::{ImmediateSend, ScheduledSend, SendStrategy, StrategySlot};
pub use worker::DrainFn;
