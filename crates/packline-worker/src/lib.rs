//! Packaging queue worker.
//!
//! This crate provides:
//! - The bounded-concurrency polling loop against the broker
//! - Per-message parsing, lifecycle events and failure isolation
//! - Graceful, cooperative shutdown

pub mod config;
pub mod worker;

pub use config::WorkerConfig;
pub use worker::{JobProcessor, QueueWorker};
