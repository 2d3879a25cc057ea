use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading the library, counting reads or building tables.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed library {}: {reason}", path.display())]
    MalformedLibrary { path: PathBuf, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The compressed container of a read file could not be decoded.
    #[error("corrupt input {}: {source}", path.display())]
    CorruptInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A count result could not be traced back to the library it was derived from.
    #[error("aggregation invariant violated: {0}")]
    Aggregation(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("worker thread panicked while counting {}", path.display())]
    WorkerPanicked { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed_library(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedLibrary {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
