/*!
 * Error types for the scriptcast application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while extracting text from a script document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Error reading the source file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file being read
        path: PathBuf,
        /// Underlying I/O cause
        source: std::io::Error,
    },

    /// The extraction tool reported a failure
    #[error("pdftotext failed: {0}")]
    Tool(String),

    /// The extraction tool did not finish in time
    #[error("pdftotext timed out after {0} seconds")]
    Timeout(u64),

    /// The extraction tool is not installed or not on PATH
    #[error("pdftotext is not available: {0}")]
    ToolMissing(String),

    /// The file is not a supported script format
    #[error("Unsupported script format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur during speech synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// No voice reference is registered for a character
    #[error("No voice assigned for character: {0}")]
    MissingVoice(String),

    /// Error writing generated audio to disk
    #[error("Failed to write audio: {0}")]
    AudioWrite(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error extracting script text
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from speech synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
