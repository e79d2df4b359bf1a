//! Top-level facade crate for filstat.
//!
//! Re-exports core types and the exporter library so users can depend on a single crate.

pub mod core {
    pub use filstat_core::*;
}

pub mod exporter {
    pub use filstat_exporter::*;
}
