//! Core data types for the drift-tracking pipeline
//!
//! This module defines the types that flow through the pipeline: period
//! identifiers, labeled session vectors, cluster correspondences, and the
//! final report handed to the external renderer.

use serde::{Deserialize, Serialize};

/// Identifier of one independently-clustered period (e.g. a calendar day
/// such as `"20180715"`, or an experiment variant).
///
/// Period identifiers sort lexicographically into chronological order; the
/// pipeline never interprets them beyond ordering and display.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(pub String);

impl PeriodId {
    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeriodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeriodId {
    fn from(s: &str) -> Self {
        PeriodId(s.to_string())
    }
}

impl From<String> for PeriodId {
    fn from(s: String) -> Self {
        PeriodId(s)
    }
}

/// One session vector together with the local cluster label assigned by the
/// external clustering step.
///
/// The vector has fixed length L for every session in a period; entries are
/// per-position skip-intensity codes from a small ordinal range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledSession {
    /// Fixed-length session feature vector
    pub vector: Vec<f64>,
    /// Local cluster label in `[0, K)`; numbering has no cross-period meaning
    pub label: usize,
}

/// Stored form of one period: its cluster count and labeled sessions.
///
/// This is the wire format the JSON directory store reads; the in-memory
/// store holds the same records directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Number of clusters K used when the labels were produced
    pub cluster_count: usize,
    /// All labeled sessions of the period
    pub sessions: Vec<LabeledSession>,
}

/// Nearest-profile mapping from one period's local cluster indices to the
/// next period's.
///
/// Entry `i` is the target-period cluster whose profile is nearest to source
/// cluster `i`. The mapping is total over `0..K` but not necessarily a
/// bijection: two source clusters may share a target, and some targets may
/// receive no mapping. Collisions are preserved exactly as computed because
/// identity chaining depends on this exact mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    targets: Vec<usize>,
}

impl Correspondence {
    /// Build a correspondence from a dense target list (entry i = target of
    /// source cluster i)
    pub fn from_targets(targets: Vec<usize>) -> Self {
        Self { targets }
    }

    /// The identity correspondence `i -> i` over `0..k`.
    ///
    /// Used for the reflexive terminal pair, where distance-based
    /// self-matching would only coincidentally recover the identity mapping.
    pub fn identity(k: usize) -> Self {
        Self {
            targets: (0..k).collect(),
        }
    }

    /// Number of source clusters (K)
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when the correspondence has no entries
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Target cluster of source cluster `source`
    pub fn target_of(&self, source: usize) -> usize {
        self.targets[source]
    }

    /// Dense view of the mapping, indexed by source cluster
    pub fn as_slice(&self) -> &[usize] {
        &self.targets
    }

    /// True when every target index is hit exactly once
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.targets.len()];
        for &t in &self.targets {
            if t >= seen.len() || seen[t] {
                return false;
            }
            seen[t] = true;
        }
        true
    }
}

/// One entry of the processing sequence: a period plus a flag marking the
/// reflexive terminal duplicate.
///
/// The final real period is appended a second time before matching so that
/// it appears as a match target under its own identity instead of being
/// dropped as "only a source, never a target". The duplicate is flagged
/// rather than re-loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStep {
    /// The period this step refers to
    pub period: PeriodId,
    /// True for the appended duplicate of the final period
    pub reflexive_terminal: bool,
}

/// Producer metadata stamped on every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// Final output of the pipeline: the identity × period share matrix plus
/// the metadata the external renderer needs.
///
/// Rows are ordered by identity `0..K-1`, columns by period sequence order.
/// Entries are fractions in `[0, 1]`; in the bijective case each column sums
/// to 1.0 within floating tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// Report schema version
    pub schema_version: String,
    /// Producer metadata
    pub producer: ReportProducer,
    /// When the report was computed (RFC3339)
    pub computed_at_utc: String,
    /// Period identifiers in sequence order (one per matrix column)
    pub periods: Vec<String>,
    /// Number of tracked identities K (one per matrix row)
    pub cluster_count: usize,
    /// Share matrix: `shares[identity][period]`, fractions in `[0, 1]`
    pub shares: Vec<Vec<f64>>,
    /// Rendering view of `shares`: percentages rounded to one decimal
    pub shares_pct: Vec<Vec<f64>>,
}
