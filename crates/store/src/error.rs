//! Error types for hindcast-store.

use std::path::PathBuf;

/// Error type for fatal record-store failures.
///
/// Data-quality problems inside individual records are not errors: they are
/// logged and skipped by the reader. Only conditions that make a partition
/// unreadable or unwritable surface here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O operation on a store path failed for a reason other than the
    /// path not existing.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialised for writing.
    #[error("failed to encode record for {}: {reason}", path.display())]
    Encode {
        /// Partition file the record was destined for.
        path: PathBuf,
        /// Description of the serialisation failure.
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
