/*!
 * Tests for audio file output and manifest generation
 */

use std::fs;
use anyhow::Result;
use bytes::Bytes;
use serde_json::Value;

use scriptcast::providers::SynthesizedAudio;
use scriptcast::synthesis::{AudioWriter, SynthesizedLine};
use crate::common;

/// Build a synthesized line for output tests
fn rendered_line(character: &str, line_index: usize, text: &str, payload: &'static [u8]) -> SynthesizedLine {
    SynthesizedLine {
        character: character.to_string(),
        line_index,
        text: text.to_string(),
        audio: SynthesizedAudio {
            audio: Bytes::from_static(payload),
            sample_rate: Some(24_000),
        },
    }
}

/// Test the 1-based zero-padded audio file naming
#[test]
fn test_audio_file_name_withVariousIndexes_shouldPadToThreeDigits() {
    assert_eq!(AudioWriter::audio_file_name("JOHN", 0), "JOHN_line_001.wav");
    assert_eq!(AudioWriter::audio_file_name("JOHN", 9), "JOHN_line_010.wav");
    assert_eq!(AudioWriter::audio_file_name("MARY", 99), "MARY_line_100.wav");
    assert_eq!(AudioWriter::audio_file_name("MARY", 999), "MARY_line_1000.wav");
}

/// Test that lines are written per character with a manifest alongside
#[test]
fn test_write_script_audio_withMultipleCharacters_shouldWriteFilesAndManifest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("audio");

    let mut lines = vec![
        rendered_line("JOHN", 0, "Hello there.", b"john one"),
        rendered_line("JOHN", 1, "Goodbye now.", b"john two"),
    ];
    // One line without a reported sample rate
    lines.push(SynthesizedLine {
        character: "MARY".to_string(),
        line_index: 0,
        text: "Hi John.".to_string(),
        audio: SynthesizedAudio {
            audio: Bytes::from_static(b"mary one"),
            sample_rate: None,
        },
    });

    let manifest = AudioWriter::write_script_audio(&lines, &output_dir, "Chatterbox", false)?;

    assert_eq!(manifest.total_files, 3);
    assert_eq!(manifest.skipped_existing, 0);
    assert_eq!(manifest.characters.len(), 2);
    assert_eq!(manifest.characters[0].name, "JOHN");
    assert_eq!(manifest.characters[0].files.len(), 2);
    assert_eq!(manifest.characters[1].name, "MARY");
    assert_eq!(manifest.characters[1].files.len(), 1);

    // Audio lands in one directory per character
    assert_eq!(fs::read(output_dir.join("JOHN").join("JOHN_line_001.wav"))?, b"john one");
    assert_eq!(fs::read(output_dir.join("JOHN").join("JOHN_line_002.wav"))?, b"john two");
    assert_eq!(fs::read(output_dir.join("MARY").join("MARY_line_001.wav"))?, b"mary one");

    // The manifest on disk mirrors the returned value
    let json = fs::read_to_string(output_dir.join("manifest.json"))?;
    let value: Value = serde_json::from_str(&json)?;
    assert_eq!(value["provider"], "Chatterbox");
    assert_eq!(value["total_files"], 3);
    assert_eq!(value["skipped_existing"], 0);
    assert_eq!(value["characters"][0]["name"], "JOHN");
    assert_eq!(value["characters"][0]["files"][0]["file"], "JOHN/JOHN_line_001.wav");
    assert_eq!(value["characters"][0]["files"][0]["text"], "Hello there.");
    assert_eq!(value["characters"][0]["files"][0]["sample_rate"], 24_000);
    assert!(value["generated_at"].as_str().is_some());

    // Absent sample rates are omitted rather than serialized as null
    assert!(value["characters"][1]["files"][0].get("sample_rate").is_none());

    Ok(())
}

/// Test that existing files are left untouched without force overwrite
#[test]
fn test_write_script_audio_withoutForce_shouldSkipExistingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("audio");

    let first = vec![rendered_line("JOHN", 0, "Hello there.", b"original audio")];
    AudioWriter::write_script_audio(&first, &output_dir, "Chatterbox", false)?;

    let second = vec![rendered_line("JOHN", 0, "Hello there.", b"replacement audio")];
    let manifest = AudioWriter::write_script_audio(&second, &output_dir, "Chatterbox", false)?;

    assert_eq!(manifest.total_files, 0);
    assert_eq!(manifest.skipped_existing, 1);

    // Skipped files still appear in the manifest
    assert_eq!(manifest.characters[0].files.len(), 1);

    let audio_path = output_dir.join("JOHN").join("JOHN_line_001.wav");
    assert_eq!(fs::read(&audio_path)?, b"original audio");

    Ok(())
}

/// Test that force overwrite replaces existing files
#[test]
fn test_write_script_audio_withForce_shouldOverwriteExistingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("audio");

    let first = vec![rendered_line("JOHN", 0, "Hello there.", b"original audio")];
    AudioWriter::write_script_audio(&first, &output_dir, "Chatterbox", false)?;

    let second = vec![rendered_line("JOHN", 0, "Hello there.", b"replacement audio")];
    let manifest = AudioWriter::write_script_audio(&second, &output_dir, "Chatterbox", true)?;

    assert_eq!(manifest.total_files, 1);
    assert_eq!(manifest.skipped_existing, 0);

    let audio_path = output_dir.join("JOHN").join("JOHN_line_001.wav");
    assert_eq!(fs::read(&audio_path)?, b"replacement audio");

    Ok(())
}

/// Test that an empty run still produces a manifest
#[test]
fn test_write_script_audio_withNoLines_shouldStillWriteManifest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("audio");

    let manifest = AudioWriter::write_script_audio(&[], &output_dir, "Tortoise", false)?;

    assert_eq!(manifest.total_files, 0);
    assert!(manifest.characters.is_empty());

    let json = fs::read_to_string(output_dir.join("manifest.json"))?;
    let value: Value = serde_json::from_str(&json)?;
    assert_eq!(value["provider"], "Tortoise");
    assert!(value["characters"].as_array().is_some_and(|c| c.is_empty()));

    Ok(())
}
