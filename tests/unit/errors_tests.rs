/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use scriptcast::errors::{ProviderError, ExtractionError, SynthesisError, AppError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection timeout".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection timeout"));
}

#[test]
fn test_providerError_parseError_shouldDisplayCorrectly() {
    let error = ProviderError::ParseError("Invalid JSON".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Failed to parse API response"));
    assert!(display.contains("Invalid JSON"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_connectionError_shouldDisplayCorrectly() {
    let error = ProviderError::ConnectionError("Host unreachable".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Connection error"));
    assert!(display.contains("Host unreachable"));
}

#[test]
fn test_providerError_rateLimitExceeded_shouldDisplayCorrectly() {
    let error = ProviderError::RateLimitExceeded("Retry after 60s".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Rate limit exceeded"));
    assert!(display.contains("Retry after 60s"));
}

#[test]
fn test_providerError_authenticationError_shouldDisplayCorrectly() {
    let error = ProviderError::AuthenticationError("Invalid API key".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Authentication error"));
    assert!(display.contains("Invalid API key"));
}

#[test]
fn test_extractionError_io_shouldDisplayPathAndCause() {
    let error = ExtractionError::Io {
        path: PathBuf::from("/tmp/script.pdf"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "underlying cause"),
    };
    let display = format!("{}", error);
    assert!(display.contains("Failed to read"));
    assert!(display.contains("/tmp/script.pdf"));
    assert!(display.contains("underlying cause"));
}

#[test]
fn test_extractionError_tool_shouldDisplayCorrectly() {
    let error = ExtractionError::Tool("exit code 1".to_string());
    let display = format!("{}", error);
    assert!(display.contains("pdftotext failed"));
    assert!(display.contains("exit code 1"));
}

#[test]
fn test_extractionError_timeout_shouldDisplaySeconds() {
    let error = ExtractionError::Timeout(60);
    let display = format!("{}", error);
    assert!(display.contains("timed out after 60 seconds"));
}

#[test]
fn test_extractionError_toolMissing_shouldDisplayCorrectly() {
    let error = ExtractionError::ToolMissing("No such file or directory".to_string());
    let display = format!("{}", error);
    assert!(display.contains("pdftotext is not available"));
}

#[test]
fn test_extractionError_unsupportedFormat_shouldDisplayCorrectly() {
    let error = ExtractionError::UnsupportedFormat("/tmp/image.png".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Unsupported script format"));
    assert!(display.contains("/tmp/image.png"));
}

#[test]
fn test_synthesisError_fromProviderError_shouldWrapCorrectly() {
    let provider_error = ProviderError::RequestFailed("Test error".to_string());
    let synthesis_error: SynthesisError = provider_error.into();
    let display = format!("{}", synthesis_error);
    assert!(display.contains("Provider error"));
}

#[test]
fn test_synthesisError_missingVoice_shouldDisplayCharacter() {
    let error = SynthesisError::MissingVoice("JOHN".to_string());
    let display = format!("{}", error);
    assert!(display.contains("No voice assigned for character"));
    assert!(display.contains("JOHN"));
}

#[test]
fn test_synthesisError_audioWrite_shouldDisplayCorrectly() {
    let error = SynthesisError::AudioWrite("disk full".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Failed to write audio"));
    assert!(display.contains("disk full"));
}

#[test]
fn test_appError_fromProviderError_shouldWrapCorrectly() {
    let provider_error = ProviderError::ConnectionError("Network down".to_string());
    let app_error: AppError = provider_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Provider error"));
}

#[test]
fn test_appError_fromExtractionError_shouldWrapCorrectly() {
    let extraction_error = ExtractionError::Tool("boom".to_string());
    let app_error: AppError = extraction_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Extraction error"));
    assert!(display.contains("pdftotext failed"));
}

#[test]
fn test_appError_fromSynthesisError_shouldWrapCorrectly() {
    let synthesis_error = SynthesisError::MissingVoice("MARY".to_string());
    let app_error: AppError = synthesis_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Synthesis error"));
    assert!(display.contains("MARY"));
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}

#[test]
fn test_appError_fromAnyhowError_shouldWrapAsUnknown() {
    let anyhow_error = anyhow::anyhow!("Something went wrong");
    let app_error: AppError = anyhow_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Unknown error"));
    assert!(display.contains("Something went wrong"));
}

#[test]
fn test_appError_file_shouldDisplayCorrectly() {
    let error = AppError::File("Permission denied".to_string());
    let display = format!("{}", error);
    assert!(display.contains("File error"));
    assert!(display.contains("Permission denied"));
}

#[test]
fn test_appError_unknown_shouldDisplayCorrectly() {
    let error = AppError::Unknown("Unexpected state".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Unknown error"));
    assert!(display.contains("Unexpected state"));
}

#[test]
fn test_providerError_debug_shouldBeImplemented() {
    let error = ProviderError::RequestFailed("test".to_string());
    let debug = format!("{:?}", error);
    assert!(debug.contains("RequestFailed"));
}

#[test]
fn test_extractionError_debug_shouldBeImplemented() {
    let error = ExtractionError::Timeout(60);
    let debug = format!("{:?}", error);
    assert!(debug.contains("Timeout"));
}

#[test]
fn test_appError_debug_shouldBeImplemented() {
    let error = AppError::File("test".to_string());
    let debug = format!("{:?}", error);
    assert!(debug.contains("File"));
}
