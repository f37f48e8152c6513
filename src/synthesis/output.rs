/*!
 * Audio file and manifest writing.
 *
 * Synthesized lines land in one directory per character, named
 * `{CHARACTER}_line_{NNN}.wav` with a 1-based line number, next to a
 * `manifest.json` describing the whole run.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

use super::batch::SynthesizedLine;

/// Manifest describing a completed synthesis run
#[derive(Debug, Clone, Serialize)]
pub struct AudioManifest {
    /// Provider that produced the audio
    pub provider: String,

    /// Generation timestamp
    pub generated_at: String,

    /// Total number of audio files written
    pub total_files: usize,

    /// Number of files left untouched because they already existed
    pub skipped_existing: usize,

    /// Per character entries, in script order
    pub characters: Vec<CharacterManifest>,
}

/// Manifest entries for one character
#[derive(Debug, Clone, Serialize)]
pub struct CharacterManifest {
    /// Character name
    pub name: String,

    /// Files in script order
    pub files: Vec<ManifestEntry>,
}

/// Manifest entry for one audio file
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// Path of the audio file relative to the output directory
    pub file: String,

    /// The dialogue text behind the file
    pub text: String,

    /// Sample rate reported by the provider, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

/// Writer for synthesized audio files and run manifests
pub struct AudioWriter;

impl AudioWriter {
    /// Build the file name for a dialogue line
    // Line numbers are 1-based to match how actors count their lines
    pub fn audio_file_name(character: &str, line_index: usize) -> String {
        format!("{}_line_{:03}.wav", character, line_index + 1)
    }

    /// Write every synthesized line plus a manifest under the output directory
    pub fn write_script_audio(
        lines: &[SynthesizedLine],
        output_dir: &Path,
        provider: &str,
        force_overwrite: bool,
    ) -> Result<AudioManifest> {
        FileManager::ensure_dir(output_dir)?;

        let mut characters: Vec<CharacterManifest> = Vec::new();
        let mut total_files = 0;
        let mut skipped_existing = 0;

        for line in lines {
            let character_dir = output_dir.join(&line.character);
            FileManager::ensure_dir(&character_dir)?;

            let file_name = Self::audio_file_name(&line.character, line.line_index);
            let file_path = character_dir.join(&file_name);

            if file_path.exists() && !force_overwrite {
                warn!("Skipping existing file {:?} (use force overwrite to replace)", file_path);
                skipped_existing += 1;
            } else {
                fs::write(&file_path, &line.audio.audio)
                    .with_context(|| format!("Failed to write audio file: {:?}", file_path))?;
                debug!("Wrote {} bytes to {:?}", line.audio.audio.len(), file_path);
                total_files += 1;
            }

            let relative = PathBuf::from(&line.character).join(&file_name);
            let entry = ManifestEntry {
                file: relative.to_string_lossy().to_string(),
                text: line.text.clone(),
                sample_rate: line.audio.sample_rate,
            };

            match characters.iter_mut().find(|c| c.name == line.character) {
                Some(existing) => existing.files.push(entry),
                None => characters.push(CharacterManifest {
                    name: line.character.clone(),
                    files: vec![entry],
                }),
            }
        }

        let manifest = AudioManifest {
            provider: provider.to_string(),
            generated_at: chrono::Local::now().to_rfc3339(),
            total_files,
            skipped_existing,
            characters,
        };

        Self::write_manifest(&manifest, output_dir)?;

        Ok(manifest)
    }

    /// Serialize the manifest as pretty JSON next to the audio files
    fn write_manifest(manifest: &AudioManifest, output_dir: &Path) -> Result<()> {
        let manifest_path = output_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(manifest)
            .context("Failed to serialize audio manifest")?;
        FileManager::write_to_file(&manifest_path, &json)?;
        Ok(())
    }
}
