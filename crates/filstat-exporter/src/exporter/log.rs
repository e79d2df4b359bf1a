use crate::registry::ViewData;

use super::ViewExporter;

/// Logs a one-line summary per view at debug level.
#[derive(Debug, Default)]
pub struct LogExporter;

impl ViewExporter for LogExporter {
    fn name(&self) -> &'static str {
        "log"
    }

    fn export(&self, views: &[ViewData]) {
        for v in views {
            tracing::debug!(
                view = %v.name,
                unit = %v.unit,
                count = v.count,
                sum = v.sum,
                mean = v.mean(),
                "view report"
            );
        }
    }
}
