//! Cross-period cluster matching
//!
//! Given the profile sets of two adjacent periods, computes the full K×K
//! Euclidean distance matrix and derives the nearest-profile correspondence
//! from each source cluster to a target cluster.
//!
//! The correspondence is the per-row argmin of the distance matrix with ties
//! broken toward the lowest target index. No global bijection constraint is
//! enforced: two source clusters may legitimately map to the same target.
//! That lossiness is a documented property of the design and is preserved
//! exactly, because identity chaining consumes this mapping as-is.

use crate::error::AnalysisError;
use crate::types::Correspondence;

/// Compute the K×K Euclidean distance matrix between two profile sets.
///
/// Entry `(i, j)` is `‖a[i] − b[j]‖₂`. Fails with
/// [`AnalysisError::DimensionMismatch`] if the sets differ in row count or
/// any two vectors differ in length.
pub fn distance_matrix(
    profiles_a: &[Vec<f64>],
    profiles_b: &[Vec<f64>],
) -> Result<Vec<Vec<f64>>, AnalysisError> {
    check_dimensions(profiles_a, profiles_b)?;

    let matrix = profiles_a
        .iter()
        .map(|row_a| {
            profiles_b
                .iter()
                .map(|row_b| euclidean_distance(row_a, row_b))
                .collect()
        })
        .collect();

    Ok(matrix)
}

/// Derive the nearest-profile correspondence from period A's clusters to
/// period B's.
///
/// For each row of the distance matrix the smallest entry wins; on ties the
/// lowest target index is selected, so repeated calls on the same inputs
/// always return the identical mapping.
pub fn match_clusters(
    profiles_a: &[Vec<f64>],
    profiles_b: &[Vec<f64>],
) -> Result<Correspondence, AnalysisError> {
    let matrix = distance_matrix(profiles_a, profiles_b)?;

    let targets = matrix.iter().map(|row| argmin(row)).collect();
    Ok(Correspondence::from_targets(targets))
}

/// Index of the first minimum of a non-empty row
fn argmin(row: &[f64]) -> usize {
    let mut best = 0;
    for (j, &value) in row.iter().enumerate().skip(1) {
        if value < row[best] {
            best = j;
        }
    }
    best
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn check_dimensions(
    profiles_a: &[Vec<f64>],
    profiles_b: &[Vec<f64>],
) -> Result<(), AnalysisError> {
    if profiles_a.len() != profiles_b.len() {
        return Err(AnalysisError::DimensionMismatch(format!(
            "profile sets have {} and {} clusters",
            profiles_a.len(),
            profiles_b.len()
        )));
    }
    if profiles_a.is_empty() {
        return Err(AnalysisError::DimensionMismatch(
            "profile sets are empty".to_string(),
        ));
    }

    let vector_len = profiles_a[0].len();
    for profile in profiles_a.iter().chain(profiles_b) {
        if profile.len() != vector_len {
            return Err(AnalysisError::DimensionMismatch(format!(
                "profile vector length {} != {vector_len}",
                profile.len()
            )));
        }
    }
    Ok(())
}
