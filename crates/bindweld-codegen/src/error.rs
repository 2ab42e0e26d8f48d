//! Generation failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use bindweld_core::DescriptionError;
use bindweld_registry::LookupError;

/// Anything that aborts a backend run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The model carries a construct the target cannot express.
    #[error(transparent)]
    Description(#[from] DescriptionError),

    /// Dispatch found no handler for a node.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// An artifact could not be written.
    #[error("failed to write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    /// Wrap an I/O failure with the artifact path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }
}
