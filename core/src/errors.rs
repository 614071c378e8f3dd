//! Error types for session setup and the protocol exchange.

use std::io;

use thiserror::Error;

/// Invalid pattern generation settings, caught before the session starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("min_pattern_size ({min}) exceeds max_pattern_size ({max})")]
    InvertedSizeRange { min: usize, max: usize },
    #[error("max_pattern_size ({0}) exceeds the 28 available segments")]
    SizeTooLarge(usize),
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("peer I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The count line of a mutated-pattern query had no usable integer, so
    /// the number of segment lines to consume is unknown.
    #[error("query {query}: expected a segment count, got {line:?}")]
    MalformedCount { query: usize, line: String },
    #[error("no unused pattern signature found after {attempts} attempts")]
    GeneratorExhausted { attempts: u32 },
}
