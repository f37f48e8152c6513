use std::fs;
use std::path::Path;
use log::{error, warn, debug};
use tokio::process::Command;

use crate::errors::ExtractionError;
use crate::file_utils::{FileManager, ScriptFileType};

// @module: Script text extraction from source documents

/// Extract the raw text of a script document.
///
/// PDF sources go through the pdftotext command line tool; plain text and
/// Fountain sources are read directly. Extraction failures surface as
/// `ExtractionError` and are never retried. Empty extracted text is a normal
/// outcome and is left to the parser, which maps it to an empty result.
pub async fn extract_text<P: AsRef<Path>>(path: P) -> Result<String, ExtractionError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExtractionError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    let file_type = FileManager::detect_script_type(path)
        .map_err(|e| ExtractionError::UnsupportedFormat(e.to_string()))?;

    let text = match file_type {
        ScriptFileType::Pdf => extract_pdf_text(path).await?,
        ScriptFileType::PlainText | ScriptFileType::Fountain => read_text_file(path)?,
        ScriptFileType::Unknown => {
            return Err(ExtractionError::UnsupportedFormat(
                path.display().to_string(),
            ));
        }
    };

    if text.trim().is_empty() {
        warn!("No text extracted from {:?}", path);
    }

    Ok(text)
}

/// Run pdftotext on a PDF, capturing the extracted text from stdout
async fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    debug!("Extracting text from PDF: {:?}", path);

    // Add timeout to prevent hanging on problematic files
    let pdftotext_future = Command::new("pdftotext")
        .args([
            "-enc", "UTF-8",            // Force UTF-8 output
            path.to_str().unwrap_or_default(),
            "-",                        // Extracted text to stdout
        ])
        .output();

    let timeout_duration = std::time::Duration::from_secs(60); // 1 minute timeout
    let result = tokio::select! {
        result = pdftotext_future => {
            result.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractionError::ToolMissing(e.to_string()),
                _ => ExtractionError::Tool(e.to_string()),
            })?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(ExtractionError::Timeout(60));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_pdftotext_stderr(&stderr);
        error!("Script text extraction failed: {}", filtered);
        return Err(ExtractionError::Tool(filtered));
    }

    Ok(String::from_utf8_lossy(&result.stdout).to_string())
}

/// Read a plain text or Fountain source directly
fn read_text_file(path: &Path) -> Result<String, ExtractionError> {
    fs::read_to_string(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Filter pdftotext stderr to only show meaningful error lines, stripping
/// the per-page syntax warning noise.
fn filter_pdftotext_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "Syntax Warning",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !noise_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown pdftotext error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
