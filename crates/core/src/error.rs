//! Error types for the device directory
//!
//! Every fallible operation of the store returns [`Error`]. Callers branch on
//! [`Error::kind`] rather than on message text:
//!
//! | Kind | Meaning |
//! |------|---------|
//! | `DuplicateId` | create rejected, id already stored |
//! | `DuplicateName` | create/update rejected, name already taken |
//! | `NotFound` | lookup or delete target does not exist |
//! | `ContractInvalid` | a record could not be encoded or decoded |
//! | `InvalidInput` | caller-supplied arguments are malformed |
//! | `DatabaseError` | substrate I/O or batch commit failure |
//!
//! "Not found" is a legitimate negative result; "database error" is an
//! infrastructural fault. The two never collapse into each other.

use std::fmt;
use thiserror::Error;

/// Boxed cause carried by wrapped errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for device directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Discriminant for [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A record with the same id is already stored
    DuplicateId,
    /// A record with the same name is already stored
    DuplicateName,
    /// The requested record does not exist
    NotFound,
    /// Encode/decode failure of a record
    ContractInvalid,
    /// Malformed caller arguments
    InvalidInput,
    /// Substrate I/O or batch commit failure
    DatabaseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::DuplicateId => "DuplicateId",
            ErrorKind::DuplicateName => "DuplicateName",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ContractInvalid => "ContractInvalid",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::DatabaseError => "DatabaseError",
        };
        f.write_str(s)
    }
}

/// Device directory error
///
/// Variants that wrap a lower-layer failure keep it reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum Error {
    /// Create rejected: id already exists
    #[error("device id {id} already exists")]
    DuplicateId {
        /// The conflicting id
        id: String,
    },

    /// Create or rename rejected: name already exists
    #[error("device name {name} already exists")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// Resolution by id or name failed
    #[error("{message}")]
    NotFound {
        /// Human-readable description
        message: String,
    },

    /// Record encoding or decoding failed
    #[error("{message}: {source}")]
    ContractInvalid {
        /// Human-readable description
        message: String,
        /// Codec failure
        #[source]
        source: BoxError,
    },

    /// Caller arguments rejected before touching the substrate
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Why the input was rejected
        reason: String,
    },

    /// Substrate access failed
    #[error("{message}: {source}")]
    Database {
        /// Human-readable description
        message: String,
        /// Underlying substrate or decode failure
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateId { .. } => ErrorKind::DuplicateId,
            Error::DuplicateName { .. } => ErrorKind::DuplicateName,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::ContractInvalid { .. } => ErrorKind::ContractInvalid,
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Database { .. } => ErrorKind::DatabaseError,
        }
    }

    /// Build a `NotFound` error
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    /// Build an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Wrap a codec failure as `ContractInvalid`
    pub fn contract_invalid(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::ContractInvalid {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Wrap a substrate failure as `DatabaseError`
    pub fn database(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Database {
            message: message.into(),
            source: source.into(),
        }
    }

    /// True if this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
