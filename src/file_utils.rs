use anyhow::{Result, Context};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use std::fs::OpenOptions;
use std::io::Write;
use chrono::Local;

// @module: File and directory utilities

// Extensions recognized as script sources
const PDF_EXTENSIONS: [&str; 1] = ["pdf"];
const PLAIN_TEXT_EXTENSIONS: [&str; 2] = ["txt", "text"];
const FOUNTAIN_EXTENSIONS: [&str; 2] = ["fountain", "spmd"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path with a label suffix
    // @params: input_file, output_dir, label, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        label: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let output_dir = output_dir.as_ref();

        // Get the file stem (filename without extension)
        let stem = input_file.file_stem().unwrap_or_default();

        // Create the output filename with label and extension
        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(label);
        output_filename.push('.');
        output_filename.push_str(extension);

        // Join with the output directory
        output_dir.join(output_filename)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(&normalized_ext[1..]) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Find all script source files (PDF, plain text, Fountain) in a directory
    pub fn find_script_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    let ext_str = ext.to_string_lossy().to_lowercase();
                    if Self::is_script_extension(&ext_str) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        // Stable order for reproducible folder runs
        result.sort();
        Ok(result)
    }

    /// Check whether an extension belongs to a supported script format
    fn is_script_extension(ext: &str) -> bool {
        PDF_EXTENSIONS.contains(&ext)
            || PLAIN_TEXT_EXTENSIONS.contains(&ext)
            || FOUNTAIN_EXTENSIONS.contains(&ext)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Get current timestamp
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        // Write content with timestamp
        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect the script format of a file from its extension, falling back
    /// to a content probe for extensionless files
    pub fn detect_script_type<P: AsRef<Path>>(path: P) -> Result<ScriptFileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        // Check file extension
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();

            if PDF_EXTENSIONS.contains(&ext_str.as_str()) {
                return Ok(ScriptFileType::Pdf);
            }
            if PLAIN_TEXT_EXTENSIONS.contains(&ext_str.as_str()) {
                return Ok(ScriptFileType::PlainText);
            }
            if FOUNTAIN_EXTENSIONS.contains(&ext_str.as_str()) {
                return Ok(ScriptFileType::Fountain);
            }
        }

        // Probe the leading bytes for the PDF magic number
        let mut header = [0u8; 5];
        if let Ok(mut file) = fs::File::open(path) {
            if file.read_exact(&mut header).is_ok() && &header == b"%PDF-" {
                return Ok(ScriptFileType::Pdf);
            }
        }

        // Anything that reads as UTF-8 text is treated as plain text
        if fs::read_to_string(path).is_ok() {
            return Ok(ScriptFileType::PlainText);
        }

        Ok(ScriptFileType::Unknown)
    }
}

/// Enum representing supported script source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFileType {
    /// PDF document, extracted through pdftotext
    Pdf,
    /// Plain text file, read directly
    PlainText,
    /// Fountain-marked screenplay, read directly
    Fountain,
    /// Unknown file type
    Unknown,
}
