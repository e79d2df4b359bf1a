//! filstat core: runtime-free measurement primitives, parsing, and error types.
//!
//! This crate defines the measure definitions, the fixed latency bucket set,
//! and the configuration parsers shared by the exporter and by host code that
//! only wants to name its measures. It intentionally carries no runtime or
//! HTTP dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed configuration surfaces as `FilstatError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod endpoint;
pub mod error;
pub mod interval;
pub mod measure;

/// Shared result type.
pub use error::{Result, FilstatError};

pub use endpoint::{parse_endpoint, Endpoint};
pub use interval::{parse_interval, round_to_millis};
pub use measure::{MeasureDef, APPLY_MESSAGE, LATENCY_BUCKETS_MS};
