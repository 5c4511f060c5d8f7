//! Error taxonomy for query operations.

use std::time::Duration;

use restaurant_safety_database::DbError;

/// What a [`QueryError::NotFound`] failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// The restaurant id does not exist.
    Restaurant,
    /// The restaurant has no inspections matching the filter.
    Inspections,
    /// No crime matched inside the search radius.
    CrimesInArea,
    /// The crime id does not exist.
    Crime,
    /// No crime rank row matches the crime's key.
    CrimeRank,
}

/// Coarse classification of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied malformed or out-of-range parameters.
    Client,
    /// The entity or result set is absent.
    NotFound,
    /// The data store failed or did not answer in time.
    Fatal,
}

/// Errors returned by query operations.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// `sortType` is not one of the supported sort keys.
    #[error("Invalid sortType '{0}'")]
    InvalidSortType(String),

    /// `sortOrder` is neither `asc` nor `desc`.
    #[error("Invalid sortOrder '{0}'")]
    InvalidSortOrder(String),

    /// A numeric parameter is out of range.
    #[error("Invalid parameter '{name}'")]
    InvalidParameter {
        /// Wire name of the parameter.
        name: &'static str,
    },

    /// The requested entity or result set does not exist.
    #[error("{0:?} not found")]
    NotFound(Missing),

    /// The operation did not complete within the request timeout.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The data store failed.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl QueryError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSortType(_)
            | Self::InvalidSortOrder(_)
            | Self::InvalidParameter { .. } => ErrorKind::Client,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout(_) | Self::Store(_) => ErrorKind::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert_eq!(
            QueryError::InvalidSortType("x".to_string()).kind(),
            ErrorKind::Client
        );
        assert_eq!(
            QueryError::InvalidParameter { name: "page" }.kind(),
            ErrorKind::Client
        );
        assert_eq!(
            QueryError::NotFound(Missing::Restaurant).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            QueryError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Fatal
        );
        assert_eq!(
            QueryError::from(DbError::Conversion {
                message: "bad".to_string()
            })
            .kind(),
            ErrorKind::Fatal
        );
    }
}
