//! Run configuration
//!
//! The configuration is an explicit value threaded through every component
//! call. Nothing in the pipeline reads ambient state: the period list, the
//! cluster count K, and the session length L all travel in [`AnalysisConfig`].

use crate::error::AnalysisError;
use crate::types::PeriodId;
use serde::{Deserialize, Serialize};

/// Configuration for one drift-tracking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Periods to process, in chronological order
    pub periods: Vec<PeriodId>,
    /// Number of clusters K, fixed across the whole sequence
    pub cluster_count: usize,
    /// Length L of every session feature vector
    pub session_length: usize,
}

impl AnalysisConfig {
    /// Create a configuration for the given period sequence
    pub fn new(periods: Vec<PeriodId>, cluster_count: usize, session_length: usize) -> Self {
        Self {
            periods,
            cluster_count,
            session_length,
        }
    }

    /// Validate the configuration before a run.
    ///
    /// Matching requires at least one adjacent pair of distinct periods, so
    /// fewer than 2 supplied periods is an error. A zero cluster count or
    /// session length can never produce a well-formed profile set.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.periods.len() < 2 {
            return Err(AnalysisError::EmptySequence(self.periods.len()));
        }
        if self.cluster_count == 0 {
            return Err(AnalysisError::DimensionMismatch(
                "cluster_count must be at least 1".to_string(),
            ));
        }
        if self.session_length == 0 {
            return Err(AnalysisError::DimensionMismatch(
                "session_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
