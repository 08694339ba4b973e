//! Identity chaining across the period sequence
//!
//! Cluster numbering is local to each period, so "the same archetype" needs
//! a persistent handle. Identity `i` is seeded from period 0's local cluster
//! `i`; for every later period its current local index is obtained by
//! following the chain of pairwise correspondences forward.
//!
//! The chain is materialized once as a K×T table (T·K resolutions total), so
//! `resolve` is a plain lookup afterwards.

use crate::types::Correspondence;
use serde::{Deserialize, Serialize};

/// Memoized identity → local-cluster-index table over the period sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityChain {
    /// `table[identity][period] = local cluster index`
    table: Vec<Vec<usize>>,
}

impl IdentityChain {
    /// Build the chain from the ordered pairwise correspondences.
    ///
    /// `correspondences[t]` maps period `t`'s local clusters to period
    /// `t + 1`'s; the resulting table covers `correspondences.len() + 1`
    /// periods. Forward table fill: `resolve(i, 0) = i` and
    /// `resolve(i, t) = c_t(resolve(i, t - 1))`.
    pub fn build(cluster_count: usize, correspondences: &[Correspondence]) -> Self {
        let period_count = correspondences.len() + 1;
        let mut table = vec![vec![0usize; period_count]; cluster_count];

        for (identity, row) in table.iter_mut().enumerate() {
            row[0] = identity;
            for (t, correspondence) in correspondences.iter().enumerate() {
                row[t + 1] = correspondence.target_of(row[t]);
            }
        }

        Self { table }
    }

    /// Local cluster index representing `identity` at period `period`
    pub fn resolve(&self, identity: usize, period: usize) -> usize {
        self.table[identity][period]
    }

    /// Number of tracked identities (K)
    pub fn identity_count(&self) -> usize {
        self.table.len()
    }

    /// Number of periods covered by the chain (T)
    pub fn period_count(&self) -> usize {
        self.table.first().map_or(0, Vec::len)
    }
}
