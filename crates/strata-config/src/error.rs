//! Error type for the configuration layer.

use std::path::PathBuf;

/// Failure while loading, saving, or hot-reloading `config.ron`.
///
/// Read, write, and parse variants carry the file they tripped over so a
/// log line is actionable without extra context.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("could not read config {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file (or its directory) could not be written.
    #[error("could not write config {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid RON for this schema.
    #[error("invalid config {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config failed to serialize to RON.
    #[error("could not serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}
