//! Submodule defining the errors used across the crate.

use std::path::PathBuf;

/// Errors raised at the I/O boundary while loading migrations.
///
/// Compiling migration text never fails; only reading it can.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The migrations directory could not be listed.
    #[error("Cannot read migrations directory {}: {source}", .path.display())]
    ReadDir {
        /// The directory that was listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A migration file could not be read as UTF-8 text.
    #[error("Cannot read migration file {}: {source}", .path.display())]
    ReadFile {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
