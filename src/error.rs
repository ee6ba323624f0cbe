//! Error types for tree construction and querying.

use thiserror::Error;

/// Errors reported by [`crate::BallTree`] operations.
///
/// All variants are terminal for the call that produced them: a failed
/// `build` leaves the tree unbuilt, and a failed `query` returns no partial
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BallTreeError {
    /// A parameter was outside its valid range (`leaf_size` of 0, `k` of 0,
    /// or a negative search radius).
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },

    /// `build` was given no points, or points with no coordinates.
    #[error("point set is empty")]
    EmptyInput,

    /// A point's dimensionality did not match the rest of the data set, or a
    /// query point did not match the indexed dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// `query` was called before a successful `build`.
    #[error("tree has not been built")]
    NotBuilt,
}

/// Result alias for ball tree operations.
pub type Result<T> = std::result::Result<T, BallTreeError>;
