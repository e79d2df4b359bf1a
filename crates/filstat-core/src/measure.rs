//! Measure definitions and the fixed latency bucket set.
//!
//! A [`MeasureDef`] names a float quantity (a latency in milliseconds in
//! every current use) together with its description and unit. The exporter
//! binds each definition to exactly one histogram view built from
//! [`LATENCY_BUCKETS_MS`].

use std::borrow::Cow;

use crate::error::{FilstatError, Result};

/// Unit string for milliseconds.
pub const UNIT_MILLISECONDS: &str = "ms";

/// Latency buckets in milliseconds:
/// [>=0ms, >=25ms, >=50ms, >=75ms, >=100ms, >=200ms, >=400ms, >=600ms, >=800ms, >=1s, >=2s, >=4s, >=8s]
pub const LATENCY_BUCKETS_MS: [f64; 12] = [
    25.0, 50.0, 75.0, 100.0, 200.0, 400.0, 600.0, 800.0, 1000.0, 2000.0, 4000.0, 8000.0,
];

/// Duration of applying a single message during block validation.
pub const APPLY_MESSAGE: MeasureDef = MeasureDef::from_static(
    "consensus/apply_message",
    "The duration in milliseconds of ApplyMessage",
    UNIT_MILLISECONDS,
);

const MAX_NAME_LEN: usize = 255;

/// Immutable definition of a float measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureDef {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    unit: Cow<'static, str>,
}

impl MeasureDef {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            description: Cow::Owned(description.into()),
            unit: Cow::Owned(unit.into()),
        }
    }

    /// Const constructor for predefined measures.
    pub const fn from_static(
        name: &'static str,
        description: &'static str,
        unit: &'static str,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            description: Cow::Borrowed(description),
            unit: Cow::Borrowed(unit),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Reject names the stats backend cannot carry: empty, longer than 255
    /// bytes, or containing non-printable / non-ASCII characters.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FilstatError::Registration("measure name must not be empty".into()));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(FilstatError::Registration(format!(
                "measure name longer than {MAX_NAME_LEN} bytes: {}",
                self.name
            )));
        }
        if !self.name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
            return Err(FilstatError::Registration(format!(
                "measure name must be printable ASCII: {:?}",
                self.name
            )));
        }
        Ok(())
    }

    /// Exported metric name (namespace not included).
    pub fn metric_name(&self) -> String {
        sanitize_metric_name(&self.name)
    }
}

/// Map an arbitrary measure name onto the `[A-Za-z_][A-Za-z0-9_]*` metric
/// name alphabet. `consensus/apply_message` becomes `consensus_apply_message`.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
