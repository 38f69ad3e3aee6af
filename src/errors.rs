/*!
 * Error types for the subass conversion engine.
 *
 * This module contains custom error types for the different stages of a
 * conversion job, using the thiserror crate for ergonomic error definitions.
 * Only `LoadError`, `InjectionError` and `SaveError` are fatal to a job; the
 * remaining types are absorbed where they occur and surface as log lines or
 * as the degraded note of a successful result.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a subtitle file into a document
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file extension is not one of .srt, .vtt or .ass
    #[error("unsupported format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The file could not be read
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// Path of the source file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file content is not valid for its format
    #[error("Failed to parse '{path}' at line {line}: {message}")]
    Parse {
        /// Path of the source file
        path: PathBuf,
        /// 1-indexed line number
        line: usize,
        /// What went wrong
        message: String,
    },
}

/// Errors that can occur while writing the ASS output
#[derive(Error, Debug)]
pub enum SaveError {
    /// The destination (or its parent directory) could not be written
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Errors that can occur while injecting configured caption blocks
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InjectionError {
    /// A configured timestamp does not follow the HH:MM:SS.mmm layout
    #[error("Invalid timestamp '{value}' in subtitle config '{config}'")]
    InvalidTimestamp {
        /// Name of the offending subtitle config
        config: String,
        /// The raw timestamp text
        value: String,
    },
}

/// Errors raised by a single network transport of the remote tier
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP request could not be sent or timed out
    #[error("Request through {transport} failed: {message}")]
    RequestFailed {
        /// Transport label
        transport: String,
        /// Error description
        message: String,
    },

    /// The service answered with a non-200 status
    #[error("{transport} returned HTTP {status}")]
    HttpStatus {
        /// Transport label
        transport: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body is not the expected JSON shape
    #[error("Failed to parse response from {transport}: {message}")]
    ParseError {
        /// Transport label
        transport: String,
        /// Error description
        message: String,
    },

    /// The service reported an error code in its JSON body
    #[error("{transport} responded with error code {code}")]
    ServiceError {
        /// Transport label
        transport: String,
        /// Service status code
        code: i64,
    },

    /// The service returned an empty conversion result
    #[error("{transport} returned an empty result")]
    EmptyResult {
        /// Transport label
        transport: String,
    },

    /// The transport itself could not be constructed (bad proxy URL, TLS setup)
    #[error("Transport {transport} is unavailable: {message}")]
    Unavailable {
        /// Transport label
        transport: String,
        /// Error description
        message: String,
    },
}

/// Errors reported by a script variant conversion tier
#[derive(Error, Debug)]
pub enum VariantError {
    /// Every configured transport of the remote tier failed
    #[error("All {attempts} transports failed, last error: {last_error}")]
    AllTransportsFailed {
        /// Number of attempted transports
        attempts: usize,
        /// Display text of the last transport error
        last_error: String,
    },

    /// The tier has no transports or no table to work with
    #[error("Converter '{0}' is unavailable")]
    Unavailable(String),

    /// The conversion lookup itself failed
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),
}

/// Error raised when the source file cannot be removed after a successful save
#[derive(Error, Debug)]
#[error("Failed to remove source '{path}': {source}")]
pub struct CleanupError {
    /// Source path that was kept
    pub path: PathBuf,
    /// Underlying I/O error
    pub source: std::io::Error,
}

/// Job-fatal errors; any of these turns a job's result into an error
#[derive(Error, Debug)]
pub enum JobError {
    /// Load stage failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Inject stage failed
    #[error(transparent)]
    Injection(#[from] InjectionError),

    /// Save stage failed
    #[error(transparent)]
    Save(#[from] SaveError),

    /// The worker running the job stopped before reporting
    #[error("Job aborted: {0}")]
    Aborted(String),
}
