//! Per-call timer handle.

use std::sync::Arc;
use tokio::time::Instant;

use filstat_core::interval::round_to_millis;

use crate::registry::Measurement;

/// Captures a start instant and reports elapsed time against a shared
/// measurement. Dropping a timer without recording reports nothing.
pub struct Timer {
    measurement: Arc<Measurement>,
    start: Instant,
}

impl Timer {
    pub(crate) fn start(measurement: Arc<Measurement>) -> Self {
        Self {
            measurement,
            start: Instant::now(),
        }
    }

    pub fn measurement(&self) -> &Arc<Measurement> {
        &self.measurement
    }

    /// Report the time since this timer was created, rounded to whole
    /// milliseconds. Each call is an independent sample; returns the value
    /// that was reported.
    ///
    /// Takes no reporting context: views carry no tag keys, so there is
    /// nothing a context could attach to the sample.
    pub fn record(&self) -> f64 {
        let ms = round_to_millis(self.start.elapsed());
        self.measurement.observe_ms(ms);
        ms
    }
}
