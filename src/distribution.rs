//! Longitudinal distribution assembly
//!
//! Re-indexes each period's per-cluster session shares by persistent
//! identity, producing one population-share time series per identity.

use crate::chain::IdentityChain;
use crate::error::AnalysisError;

/// Build the identity × period share matrix.
///
/// `shares[t]` holds period `t`'s complete share distribution indexed by
/// local cluster id; the result satisfies
/// `matrix[i][t] = shares[t][chain.resolve(i, t)]`.
///
/// When the chain is injective at a period, that column is a permutation of
/// the period's shares and sums to 1.0. When two identities have collapsed
/// onto the same local cluster, both rows read the same share and the column
/// sum exceeds 1.0. The double count is inherited from the matching design
/// and is deliberately not corrected here.
pub fn build_distribution(
    shares: &[Vec<f64>],
    chain: &IdentityChain,
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    if shares.len() != chain.period_count() {
        return Err(AnalysisError::DimensionMismatch(format!(
            "{} share tables for a chain covering {} periods",
            shares.len(),
            chain.period_count()
        )));
    }
    for (t, table) in shares.iter().enumerate() {
        if table.len() != chain.identity_count() {
            return Err(AnalysisError::DimensionMismatch(format!(
                "period {t}: {} shares for {} identities",
                table.len(),
                chain.identity_count()
            )));
        }
    }

    let matrix = (0..chain.identity_count())
        .map(|identity| {
            (0..chain.period_count())
                .map(|t| shares[t][chain.resolve(identity, t)])
                .collect()
        })
        .collect();

    Ok(matrix)
}
