//! Core packaging logic.
//!
//! This crate provides:
//! - Template resolution for stream keys, paths and manifest names
//! - Stream selection (encoder outputs -> typed package inputs)
//! - Destination resolution (job -> local path or object-store URL)
//! - Encode job fetching over HTTP
//! - The packaging engine seam and the shaka subprocess adapter
//! - Lifecycle notifications with an optional HTTP callback listener
//! - SMIL playlist generation

pub mod config;
pub mod destination;
pub mod error;
pub mod fetch;
pub mod listener;
pub mod packager;
pub mod shaka;
pub mod smil;
pub mod streams;
pub mod template;

pub use config::{CallbackConfig, PackagingConfig};
pub use destination::resolve_destination;
pub use error::{CoreError, CoreResult};
pub use fetch::JobFetcher;
pub use listener::{
    CallbackListener, ListenerError, ListenerEvent, NotificationDispatcher, PackageListener,
};
pub use packager::{JobPackager, PackageEngine, PackageFormatOptions, PackageSpec};
pub use shaka::ShakaPackager;
pub use streams::select_inputs;
