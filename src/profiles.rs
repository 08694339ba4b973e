//! Per-period cluster profiles and label shares
//!
//! A period is represented downstream by K mean vectors, one per local
//! cluster in increasing label order, plus the fraction of sessions carrying
//! each label. Both are recomputed from storage on every load and never
//! mutated.

use crate::error::AnalysisError;
use crate::storage::PeriodStore;
use crate::types::{LabeledSession, PeriodId};

/// Profiles and shares of one period, produced in a single storage pass
#[derive(Debug, Clone)]
pub struct PeriodSnapshot {
    /// Mean feature vector per local cluster, ordered by cluster id
    pub profiles: Vec<Vec<f64>>,
    /// Fraction of sessions per local cluster, ordered by cluster id
    pub shares: Vec<f64>,
}

/// Load the K mean profile vectors of a period, ordered by local cluster id.
///
/// Fails with [`AnalysisError::MissingCluster`] if any cluster id in
/// `[0, K)` has no member sessions: downstream matching assumes exactly K
/// rows in fixed position order, so an incomplete profile set must abort the
/// run rather than be padded.
pub fn load_profiles(
    store: &dyn PeriodStore,
    period: &PeriodId,
    cluster_count: usize,
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    Ok(load_snapshot(store, period, cluster_count)?.profiles)
}

/// Load the per-cluster session shares of a period.
///
/// The K returned fractions sum to 1.0 within floating tolerance. A cluster
/// with zero members fails with [`AnalysisError::MissingCluster`], same as
/// profile loading: a share distribution with a structurally absent cluster
/// would corrupt the identity chain for every later period.
pub fn load_label_shares(
    store: &dyn PeriodStore,
    period: &PeriodId,
    cluster_count: usize,
) -> Result<Vec<f64>, AnalysisError> {
    Ok(load_snapshot(store, period, cluster_count)?.shares)
}

/// Load profiles and shares together, reading the period once
pub fn load_snapshot(
    store: &dyn PeriodStore,
    period: &PeriodId,
    cluster_count: usize,
) -> Result<PeriodSnapshot, AnalysisError> {
    let sessions = store.session_vectors_with_labels(period)?;
    snapshot_from_sessions(period, &sessions, cluster_count)
}

fn snapshot_from_sessions(
    period: &PeriodId,
    sessions: &[LabeledSession],
    cluster_count: usize,
) -> Result<PeriodSnapshot, AnalysisError> {
    let vector_len = match sessions.first() {
        Some(first) => first.vector.len(),
        None => {
            return Err(AnalysisError::MissingCluster {
                period: period.to_string(),
                cluster: 0,
            })
        }
    };

    let mut sums = vec![vec![0.0; vector_len]; cluster_count];
    let mut counts = vec![0usize; cluster_count];

    for session in sessions {
        if session.label >= cluster_count {
            return Err(AnalysisError::InvalidSession(format!(
                "period {period}: label {} outside [0, {cluster_count})",
                session.label
            )));
        }
        if session.vector.len() != vector_len {
            return Err(AnalysisError::DimensionMismatch(format!(
                "period {period}: session vector length {} != {vector_len}",
                session.vector.len()
            )));
        }
        let sum = &mut sums[session.label];
        for (acc, value) in sum.iter_mut().zip(&session.vector) {
            *acc += value;
        }
        counts[session.label] += 1;
    }

    // Every cluster id must have members; the mean of an empty cluster is
    // undefined and zero-filling it would silently corrupt the chain.
    for (cluster, &count) in counts.iter().enumerate() {
        if count == 0 {
            return Err(AnalysisError::MissingCluster {
                period: period.to_string(),
                cluster,
            });
        }
    }

    let total = sessions.len() as f64;
    let profiles = sums
        .into_iter()
        .zip(&counts)
        .map(|(sum, &count)| sum.into_iter().map(|v| v / count as f64).collect())
        .collect();
    let shares = counts.iter().map(|&count| count as f64 / total).collect();

    Ok(PeriodSnapshot { profiles, shares })
}
