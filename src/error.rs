//! Error type shared by every table operation.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors reported by `ChainHashMap` and its cursors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A configuration value or argument was rejected.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// Backing storage could not be reserved.
    #[error("allocation failed while reserving {what}")]
    AllocationFailed {
        /// The storage being reserved
        what: &'static str,
        /// Allocator error
        #[source]
        source: TryReserveError,
    },

    /// `remove` was called with a key that is not stored.
    #[error("key not found: {key:?}")]
    NotFound {
        /// The missing key
        key: String,
    },

    /// The table was structurally mutated after the cursor was created.
    #[error("stale cursor: created at generation {created}, table is at generation {current}")]
    StaleCursor {
        /// Generation captured when the cursor was created
        created: u64,
        /// Generation of the table at the failed call
        current: u64,
    },

    /// The cursor was created by a different table.
    #[error("cursor belongs to a different table")]
    ForeignCursor,
}

impl TableError {
    pub(crate) fn invalid_argument<S: Into<String>>(reason: S) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_owned(),
        }
    }

    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Self::AllocationFailed { what, source }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = TableError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = TableError::not_found("missing");
        assert_eq!(e.to_string(), "key not found: \"missing\"");

        let e = TableError::StaleCursor {
            created: 1,
            current: 4,
        };
        assert!(e.to_string().contains("generation 1"));
        assert!(e.to_string().contains("generation 4"));
    }

    #[test]
    fn allocation_error_keeps_source() {
        use std::error::Error as _;

        let mut v: Vec<u8> = Vec::new();
        let source = v.try_reserve_exact(usize::MAX).unwrap_err();
        let e = TableError::allocation("key copy")(source);
        assert!(matches!(e, TableError::AllocationFailed { what: "key copy", .. }));
        assert!(e.source().is_some());
    }
}
