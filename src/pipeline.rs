//! Pipeline orchestration
//!
//! This module provides the public API for drift tracking. It orchestrates
//! the full run: profile loading per period → adjacent-pair matching →
//! identity chaining → distribution assembly → report encoding.
//!
//! Periods are processed strictly in sequence because each correspondence
//! consumes the previous period's profiles; profile loading itself has no
//! ordering requirement and happens once per supplied period.

use crate::chain::IdentityChain;
use crate::config::AnalysisConfig;
use crate::distribution::build_distribution;
use crate::encoder::DriftReportEncoder;
use crate::error::AnalysisError;
use crate::matching::match_clusters;
use crate::profiles::{load_snapshot, PeriodSnapshot};
use crate::storage::PeriodStore;
use crate::types::{Correspondence, DriftReport, PeriodId, SequenceStep};

/// Run the full drift-tracking pipeline (stateless, one-shot).
///
/// # Arguments
/// * `config` - explicit run configuration (periods, K, L)
/// * `store` - per-period storage collaborator
///
/// # Returns
/// The encoded [`DriftReport`] for the external renderer.
pub fn track_drift(
    config: &AnalysisConfig,
    store: &dyn PeriodStore,
) -> Result<DriftReport, AnalysisError> {
    DriftTracker::new(config.clone()).run(store)
}

/// Drift tracker owning a run configuration and a report encoder.
///
/// Use this form when several runs should share one producer instance id in
/// their reports.
pub struct DriftTracker {
    config: AnalysisConfig,
    encoder: DriftReportEncoder,
}

impl DriftTracker {
    /// Create a tracker for the given configuration
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            encoder: DriftReportEncoder::new(),
        }
    }

    /// Create a tracker with a specific report encoder
    pub fn with_encoder(config: AnalysisConfig, encoder: DriftReportEncoder) -> Self {
        Self { config, encoder }
    }

    /// The configuration this tracker runs with
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Execute the pipeline against the given store
    pub fn run(&self, store: &dyn PeriodStore) -> Result<DriftReport, AnalysisError> {
        // Stage 1: Validate the configuration
        self.config.validate()?;
        let k = self.config.cluster_count;

        // Stage 2: Build the processing sequence with the reflexive terminal
        let sequence = build_sequence(&self.config.periods);

        // Stage 3: Load profiles and shares once per supplied period
        let snapshots = self.load_snapshots(store)?;

        // Stage 4: Match consecutive pairs in sequence order
        let correspondences = build_correspondences(&sequence, &snapshots, k)?;

        // Stage 5: Chain correspondences into persistent identities. The
        // trailing reflexive correspondence sits past the final readable
        // column, so the chain covers exactly the supplied periods.
        let chain = IdentityChain::build(k, &correspondences[..correspondences.len() - 1]);

        // Stage 6: Assemble the identity × period share matrix
        let shares: Vec<Vec<f64>> = snapshots.iter().map(|s| s.shares.clone()).collect();
        let matrix = build_distribution(&shares, &chain)?;

        // Stage 7: Encode the report
        Ok(self.encoder.encode(&self.config.periods, matrix))
    }

    fn load_snapshots(
        &self,
        store: &dyn PeriodStore,
    ) -> Result<Vec<PeriodSnapshot>, AnalysisError> {
        let k = self.config.cluster_count;
        let mut snapshots = Vec::with_capacity(self.config.periods.len());

        for period in &self.config.periods {
            // Every period must have been clustered with the same K
            let stored_k = store.cluster_count(period)?;
            if stored_k != k {
                return Err(AnalysisError::DimensionMismatch(format!(
                    "period {period} was clustered with K={stored_k}, run expects K={k}"
                )));
            }

            let snapshot = load_snapshot(store, period, k)?;
            let vector_len = snapshot.profiles[0].len();
            if vector_len != self.config.session_length {
                return Err(AnalysisError::DimensionMismatch(format!(
                    "period {period}: session length {vector_len} != configured {}",
                    self.config.session_length
                )));
            }
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }
}

/// Append the reflexive terminal duplicate to the supplied period sequence.
///
/// Without it the final period would only ever be the source of a matching
/// step, never a target, and its standalone distribution would be dropped.
pub fn build_sequence(periods: &[PeriodId]) -> Vec<SequenceStep> {
    let mut sequence: Vec<SequenceStep> = periods
        .iter()
        .map(|period| SequenceStep {
            period: period.clone(),
            reflexive_terminal: false,
        })
        .collect();

    if let Some(last) = periods.last() {
        sequence.push(SequenceStep {
            period: last.clone(),
            reflexive_terminal: true,
        });
    }

    sequence
}

/// One correspondence per consecutive sequence pair.
///
/// The self-pair at the end is an explicit identity mapping: nearest-profile
/// matching of a profile set against itself only recovers the identity when
/// all K profiles are pairwise distinct, so it is never relied upon.
fn build_correspondences(
    sequence: &[SequenceStep],
    snapshots: &[PeriodSnapshot],
    k: usize,
) -> Result<Vec<Correspondence>, AnalysisError> {
    let mut correspondences = Vec::with_capacity(sequence.len() - 1);

    for (t, pair) in sequence.windows(2).enumerate() {
        if pair[1].reflexive_terminal {
            correspondences.push(Correspondence::identity(k));
        } else {
            let profiles_a = &snapshots[t].profiles;
            let profiles_b = &snapshots[t + 1].profiles;
            correspondences.push(match_clusters(profiles_a, profiles_b)?);
        }
    }

    Ok(correspondences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryPeriodStore;
    use crate::types::{LabeledSession, PeriodId, PeriodRecord};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Build a period whose cluster means and shares are exact: for each
    /// `(profile, weight)` pair, `weight` copies of the profile vector are
    /// labeled with that cluster id (weights out of 10 sessions).
    fn period_record(profile_weights: &[(Vec<f64>, usize)]) -> PeriodRecord {
        let mut sessions = Vec::new();
        for (label, (profile, weight)) in profile_weights.iter().enumerate() {
            for _ in 0..*weight {
                sessions.push(LabeledSession {
                    vector: profile.clone(),
                    label,
                });
            }
        }
        PeriodRecord {
            cluster_count: profile_weights.len(),
            sessions,
        }
    }

    /// The cyclic-shift scenario: K = 4, three periods, the third identical
    /// to the second.
    fn scenario_store() -> (InMemoryPeriodStore, AnalysisConfig) {
        let mut store = InMemoryPeriodStore::new();

        // Period 0: profiles [1,1],[2,2],[3,3],[4,4], shares .4/.3/.2/.1
        store.insert(
            "day0".into(),
            period_record(&[
                (vec![1.0, 1.0], 4),
                (vec![2.0, 2.0], 3),
                (vec![3.0, 3.0], 2),
                (vec![4.0, 4.0], 1),
            ]),
        );
        // Period 1: cyclic shift of the profiles, shares shifted to match
        let shifted = period_record(&[
            (vec![4.0, 4.0], 1),
            (vec![1.0, 1.0], 4),
            (vec![2.0, 2.0], 3),
            (vec![3.0, 3.0], 2),
        ]);
        store.insert("day1".into(), shifted.clone());
        // Period 2: day1 unchanged (duplicated last period)
        store.insert("day2".into(), shifted);

        let config = AnalysisConfig::new(
            vec!["day0".into(), "day1".into(), "day2".into()],
            4,
            2,
        );
        (store, config)
    }

    #[test]
    fn test_cyclic_shift_scenario() {
        let (store, config) = scenario_store();
        let report = track_drift(&config, &store).unwrap();

        assert_eq!(report.cluster_count, 4);
        assert_eq!(report.periods, vec!["day0", "day1", "day2"]);

        // Identity i keeps its population share across the whole sequence
        assert_eq!(report.shares[0], vec![0.4, 0.4, 0.4]);
        assert_eq!(report.shares[1], vec![0.3, 0.3, 0.3]);
        assert_eq!(report.shares[2], vec![0.2, 0.2, 0.2]);
        assert_eq!(report.shares[3], vec![0.1, 0.1, 0.1]);

        // Bijective matching: every column sums to 1.0
        for t in 0..3 {
            let column_sum: f64 = (0..4).map(|i| report.shares[i][t]).sum();
            assert!((column_sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sequence_has_reflexive_terminal() {
        let periods: Vec<PeriodId> = vec!["a".into(), "b".into()];
        let sequence = build_sequence(&periods);

        assert_eq!(sequence.len(), 3);
        assert!(!sequence[0].reflexive_terminal);
        assert!(!sequence[1].reflexive_terminal);
        assert!(sequence[2].reflexive_terminal);
        assert_eq!(sequence[2].period, sequence[1].period);
    }

    #[test]
    fn test_too_few_periods_aborts() {
        let (store, mut config) = scenario_store();
        config.periods.truncate(1);

        let err = track_drift(&config, &store).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySequence(1)));
    }

    #[test]
    fn test_cluster_count_disagreement_aborts() {
        let (mut store, config) = scenario_store();
        // Re-cluster day1 with K=3
        store.insert(
            "day1".into(),
            period_record(&[
                (vec![1.0, 1.0], 5),
                (vec![2.0, 2.0], 3),
                (vec![3.0, 3.0], 2),
            ]),
        );

        let err = track_drift(&config, &store).unwrap_err();
        assert!(matches!(err, AnalysisError::DimensionMismatch(_)));
    }

    #[test]
    fn test_session_length_disagreement_aborts() {
        let (store, mut config) = scenario_store();
        config.session_length = 20;

        let err = track_drift(&config, &store).unwrap_err();
        assert!(matches!(err, AnalysisError::DimensionMismatch(_)));
    }

    #[test]
    fn test_missing_cluster_aborts() {
        let (mut store, config) = scenario_store();
        // day2 loses every cluster-3 session
        store.insert(
            "day2".into(),
            period_record(&[
                (vec![4.0, 4.0], 1),
                (vec![1.0, 1.0], 4),
                (vec![2.0, 2.0], 3),
                (vec![3.0, 3.0], 0),
            ]),
        );

        let err = track_drift(&config, &store).unwrap_err();
        match err {
            AnalysisError::MissingCluster { period, cluster } => {
                assert_eq!(period, "day2");
                assert_eq!(cluster, 3);
            }
            other => panic!("expected MissingCluster, got {other:?}"),
        }
    }

    /// Store wrapper counting reads per period
    struct CountingStore {
        inner: InMemoryPeriodStore,
        reads: RefCell<HashMap<String, usize>>,
    }

    impl PeriodStore for CountingStore {
        fn session_vectors_with_labels(
            &self,
            period: &PeriodId,
        ) -> Result<Vec<LabeledSession>, AnalysisError> {
            *self
                .reads
                .borrow_mut()
                .entry(period.to_string())
                .or_insert(0) += 1;
            self.inner.session_vectors_with_labels(period)
        }

        fn cluster_count(&self, period: &PeriodId) -> Result<usize, AnalysisError> {
            self.inner.cluster_count(period)
        }
    }

    #[test]
    fn test_final_period_is_loaded_once() {
        let (inner, config) = scenario_store();
        let store = CountingStore {
            inner,
            reads: RefCell::new(HashMap::new()),
        };

        track_drift(&config, &store).unwrap();

        let reads = store.reads.borrow();
        // The reflexive duplicate must not trigger a second load of day2
        for day in ["day0", "day1", "day2"] {
            assert_eq!(reads.get(day), Some(&1), "period {day} loaded more than once");
        }
    }

    #[test]
    fn test_collision_run_double_counts() {
        // Two periods, K = 3. Period 1's cluster 0 profile is near both of
        // period 0's clusters 0 and 1, so both identities collapse onto it.
        let mut store = InMemoryPeriodStore::new();
        store.insert(
            "day0".into(),
            period_record(&[
                (vec![0.0, 0.0], 5),
                (vec![1.0, 1.0], 3),
                (vec![9.0, 9.0], 2),
            ]),
        );
        store.insert(
            "day1".into(),
            period_record(&[
                (vec![0.5, 0.5], 5),
                (vec![20.0, 20.0], 1),
                (vec![9.0, 9.0], 4),
            ]),
        );

        let config = AnalysisConfig::new(vec!["day0".into(), "day1".into()], 3, 2);
        let report = track_drift(&config, &store).unwrap();

        // Identities 0 and 1 both read day1 cluster 0's share of 0.5;
        // cluster 1's 0.1 becomes unreachable
        assert_eq!(report.shares[0], vec![0.5, 0.5]);
        assert_eq!(report.shares[1], vec![0.3, 0.5]);
        assert_eq!(report.shares[2], vec![0.2, 0.4]);

        let column_sum: f64 = (0..3).map(|i| report.shares[i][1]).sum();
        // 1.0 + duplicated(0.5) - unreachable(0.1)
        assert!((column_sum - 1.4).abs() < 1e-6);
        assert!(column_sum > 1.0);
    }
}
