//! Background loops: two idle-user re-engagement timers and an optional
//! liveness ping.
//!
//! Each timer tick is set-based and bounded: select candidates, claim each
//! one with a conditional update, send only after the claim sticks. Claims
//! make the ticks idempotent, so overlapping ticks or a second replica never
//! double-send.

pub mod config;
pub mod keepalive;
pub mod runner;

pub use config::SchedulerConfig;
pub use runner::{Scheduler, SchedulerHandles};
