//! Error types for the freqcache library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when eviction bookkeeping and the key/value
//!   map disagree (`check_invariants` methods).
//! - [`ConfigError`]: Returned by strict constructors when the capacity is
//!   invalid.
//! - [`OpLogError`]: I/O failure while reading or writing an operation log or
//!   snapshot file.
//!
//! Inconsistencies detected during normal operation (touching an untracked
//! key, for example) are not errors: they are reported through `tracing` and
//! counted, and the operation becomes a no-op.
//!
//! ## Example Usage
//!
//! ```
//! use freqcache::error::ConfigError;
//! use freqcache::store::CacheStore;
//!
//! // Strict constructor for user-supplied capacities
//! let store: Result<CacheStore<String, i32>, ConfigError> = CacheStore::try_new(Some(100));
//! assert!(store.is_ok());
//!
//! // Zero capacity is rejected instead of silently meaning "unlimited"
//! let bad = CacheStore::<String, i32>::try_new(Some(0));
//! assert!(bad.is_err());
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`EvictionManager::check_invariants`](crate::eviction::EvictionManager::check_invariants)
/// and [`CacheStore::check_invariants`](crate::store::CacheStore::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use freqcache::store::CacheStore;
///
/// let err = CacheStore::<u64, u64>::try_new(Some(0)).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// OpLogError
// ---------------------------------------------------------------------------

/// I/O error on an operation log or snapshot file, tagged with its path.
#[derive(Debug)]
pub struct OpLogError {
    path: PathBuf,
    source: io::Error,
}

impl OpLogError {
    pub fn new(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl fmt::Display for OpLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for OpLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
