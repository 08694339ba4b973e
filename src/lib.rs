//! Skipdrift - longitudinal tracker for listening-session archetype distributions
//!
//! Each period (a day, or an experiment variant) is clustered independently,
//! so cluster numbering carries no meaning across periods. Skipdrift
//! establishes a consistent cross-period identity for "the same behavioral
//! archetype" and tracks its population share as a time series:
//! profile loading → nearest-profile matching → identity chaining →
//! distribution assembly → report encoding.
//!
//! ## Modules
//!
//! - **profiles**: per-cluster mean profiles and session shares of a period
//! - **matching**: Euclidean distance matrix and cluster correspondences
//! - **chain**: transitive identity propagation across the sequence
//! - **distribution**: identity × period share matrix
//! - **pipeline**: orchestration of a full run

pub mod chain;
pub mod config;
pub mod distribution;
pub mod encoder;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod profiles;
pub mod storage;
pub mod types;

pub use chain::IdentityChain;
pub use config::AnalysisConfig;
pub use distribution::build_distribution;
pub use encoder::DriftReportEncoder;
pub use error::AnalysisError;
pub use matching::{distance_matrix, match_clusters};
pub use pipeline::{track_drift, DriftTracker};
pub use profiles::{load_label_shares, load_profiles, load_snapshot};
pub use storage::{InMemoryPeriodStore, JsonDirectoryStore, PeriodStore};
pub use types::{Correspondence, DriftReport, LabeledSession, PeriodId, PeriodRecord};

/// Skipdrift version embedded in all report payloads
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "skipdrift";
