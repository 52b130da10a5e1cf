//! Redis-backed packaging queue.
//!
//! This crate provides:
//! - The [`Broker`] seam the worker polls against
//! - A Redis sorted-set implementation with blocking pops
//! - Re-enqueueing for the manual retry path

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{Broker, QueueConfig, RedisBroker};
