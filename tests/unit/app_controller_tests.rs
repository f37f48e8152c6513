/*!
 * Tests for application controller functionality
 */

use std::fs;
use anyhow::Result;
use scriptcast::app_config::{Config, LogLevel, SynthesisProvider};
use scriptcast::app_controller::Controller;
use scriptcast::file_utils::{FileManager, ScriptFileType};
use scriptcast::synthesis::LogEntry;
use crate::common;

/// Test creating a controller with the default configuration
#[test]
fn test_new_with_default_config_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config.synthesis.provider, SynthesisProvider::Chatterbox);
    assert!(!controller.config.synthesis.available_providers.is_empty());
    Ok(())
}

/// Test creating a controller with a specific configuration
#[test]
fn test_with_config_withValidConfig_shouldCreateController() -> Result<()> {
    let mut config = Config::default();
    config.log_level = LogLevel::Debug;
    config.voices.insert("JOHN".to_string(), "voices/john.wav".to_string());

    let controller = Controller::with_config(config)?;
    assert_eq!(controller.config.log_level, LogLevel::Debug);
    assert_eq!(controller.config.voices.len(), 1);
    Ok(())
}

/// Test creating a controller for testing
#[test]
fn test_new_for_test_shouldCreateController() -> Result<()> {
    let _controller = Controller::new_for_test()?;
    Ok(())
}

/// Test the initialization check against the provider list
#[test]
fn test_is_initialized_withDefaultConfig_shouldBeTrue() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert!(controller.is_initialized());
    Ok(())
}

/// Test that a configuration without providers counts as uninitialized
#[test]
fn test_is_initialized_withoutProviders_shouldReturnFalse() -> Result<()> {
    let mut config = Config::default();
    config.synthesis.available_providers.clear();

    let controller = Controller::with_config(config)?;
    assert!(!controller.is_initialized());
    Ok(())
}

/// Test writing logs to file
#[test]
fn test_write_synthesis_logs_withValidLogs_shouldWriteFormattedLogs() -> Result<()> {
    // Create test controller
    let controller = Controller::new_for_test()?;

    // Create a temporary directory for testing
    let temp_dir = common::create_temp_dir()?;
    let test_log_file = temp_dir.path().join("test_controller_issues.log");

    // Create test logs
    let logs = vec![
        LogEntry { level: "ERROR".to_string(), message: "Connection refused".to_string() },
        LogEntry { level: "WARN".to_string(), message: "Retrying line 3".to_string() },
        LogEntry { level: "INFO".to_string(), message: "Voicing complete".to_string() },
    ];

    // Write logs to file
    controller.write_synthesis_logs(&logs, test_log_file.to_str().unwrap(), "Test Run")?;

    // Read the file content
    let content = fs::read_to_string(&test_log_file)?;

    // Verify format
    assert!(content.contains("Synthesis Log - "));
    assert!(content.contains("Context: Test Run"));
    assert!(content.contains("[ERROR] Connection refused"));
    assert!(content.contains("[WARN] Retrying line 3"));
    assert!(content.contains("[INFO] Voicing complete"));

    Ok(())
}

/// Test that an empty log run still writes the header
#[test]
fn test_write_synthesis_logs_withEmptyLogs_shouldWriteHeaderOnly() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let temp_dir = common::create_temp_dir()?;
    let test_log_file = temp_dir.path().join("empty_issues.log");

    controller.write_synthesis_logs(&[], test_log_file.to_str().unwrap(), "Empty Run")?;

    let content = fs::read_to_string(&test_log_file)?;
    assert!(content.contains("Synthesis Log - "));
    assert!(content.contains("Context: Empty Run"));
    assert!(!content.contains('['));

    Ok(())
}

/// Test direct plain text script processing
#[test]
fn test_analyze_input_withPlainTextScript_shouldDetectScriptType() -> Result<()> {
    // This is a minimal test that doesn't actually run the async code,
    // but ensures the file type detection and direct-read path exists

    // Create a temporary test directory and files
    let temp_dir = common::create_temp_dir()?;
    let input_file = common::create_test_script(&temp_dir.path().to_path_buf(), "test.txt")?;

    // We don't actually run the async code, just ensure the code path exists
    // and basic file operations work
    assert!(FileManager::detect_script_type(&input_file)? == ScriptFileType::PlainText);

    Ok(())
}
