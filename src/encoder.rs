//! Drift report encoding
//!
//! Packages the identity × period share matrix into the JSON payload the
//! external rendering stage consumes: rows ordered by identity, columns by
//! period sequence order, plus producer metadata and a percentage view.

use crate::error::AnalysisError;
use crate::types::{DriftReport, PeriodId, ReportProducer};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for drift reports
pub struct DriftReportEncoder {
    instance_id: String,
}

impl Default for DriftReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Assemble the report payload from the tracked share matrix
    pub fn encode(&self, periods: &[PeriodId], shares: Vec<Vec<f64>>) -> DriftReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let shares_pct = shares
            .iter()
            .map(|row| row.iter().map(|&v| round_pct(v)).collect())
            .collect();

        DriftReport {
            schema_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            periods: periods.iter().map(PeriodId::to_string).collect(),
            cluster_count: shares.len(),
            shares,
            shares_pct,
        }
    }

    /// Encode directly to a JSON string
    pub fn encode_to_json(
        &self,
        periods: &[PeriodId],
        shares: Vec<Vec<f64>>,
    ) -> Result<String, AnalysisError> {
        let report = self.encode(periods, shares);
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

/// Fraction → percentage rounded to one decimal, the shape the renderer
/// labels its bars with
fn round_pct(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}
