/*!
 * Integration tests for the script analysis workflow
 */

use std::path::PathBuf;
use anyhow::Result;
use tokio_test;

use scriptcast::app_controller::Controller;
use scriptcast::extraction;
use scriptcast::file_utils::FileManager;
use scriptcast::script_parser::ScriptParser;
use crate::common;

/// Test that we can extract, classify, and summarize a script in a full workflow
#[test]
fn test_script_workflow_withFullProcess_shouldSucceed() -> Result<()> {
    // Create a temporary directory for testing
    let temp_dir = common::create_temp_dir()?;

    // Create a plain text script file
    let script_path = common::create_test_script(&temp_dir.path().to_path_buf(), "coffee_shop.txt")?;

    // 1. Extract the raw text from the script file
    let raw_text = tokio_test::block_on(extraction::extract_text(&script_path))?;
    assert!(raw_text.contains("INT. COFFEE SHOP - DAY"), "Extracted text should keep scene headings");

    // 2. Classify and segment the dialogue by character
    let dialogue = ScriptParser::parse(&raw_text);
    assert_eq!(dialogue.len(), 3, "Should have 3 speaking characters");
    assert_eq!(dialogue.character_names(), vec!["JOHN", "BARISTA", "MARY"]);

    // 3. Verify the per character line counts
    assert_eq!(dialogue.get("JOHN").map(|c| c.lines.len()), Some(4));
    assert_eq!(dialogue.get("BARISTA").map(|c| c.lines.len()), Some(1));
    assert_eq!(dialogue.get("MARY").map(|c| c.lines.len()), Some(2));
    assert_eq!(dialogue.total_line_count(), 7);

    // 4. Derive the summary statistics
    let summary = dialogue.summary();
    assert_eq!(summary.character_count, 3);
    assert_eq!(summary.total_dialogue_lines, 7);
    assert_eq!(summary.characters[0].name, "JOHN");
    assert_eq!(summary.characters[0].line_count, 4);
    assert_eq!(summary.characters[0].total_words, 26);

    // 5. Save the analysis to a file
    let output_path = temp_dir.path().join("coffee_shop.analysis.json");
    let json = serde_json::to_string_pretty(&dialogue)?;
    FileManager::write_to_file(&output_path, &json)?;

    // 6. Verify the new file exists and has the expected content
    assert!(output_path.exists(), "Analysis file should exist");

    // 7. Load the analysis file and verify its structure
    let content = FileManager::read_to_string(&output_path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let entries = value.as_array().expect("analysis should serialize as an array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "JOHN");
    assert_eq!(entries[0]["lines"].as_array().map(|l| l.len()), Some(4));

    Ok(())
}

/// Test that the controller analysis matches a direct parse of the same text
#[test]
fn test_script_workflow_withControllerAnalyze_shouldMatchDirectParse() -> Result<()> {
    let controller = Controller::new_for_test()?;

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_script(&temp_dir.path().to_path_buf(), "coffee_shop.txt")?;

    let analyzed = tokio_test::block_on(controller.analyze(&script_path))?;
    let parsed = ScriptParser::parse(common::sample_script_text());

    assert_eq!(analyzed.characters, parsed.characters);

    Ok(())
}

/// Test that structural lines never survive the workflow as dialogue
#[test]
fn test_script_workflow_withStructuralLines_shouldDropThem() -> Result<()> {
    let controller = Controller::new_for_test()?;

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "short_scene.txt",
        "INT. HOUSE - NIGHT\n\nJOHN\nI hope she shows up.\n\nSARAH\nSorry I'm late.\n\nTHE END\n",
    )?;

    let dialogue = tokio_test::block_on(controller.analyze(&script_path))?;

    assert_eq!(dialogue.len(), 2);
    assert_eq!(dialogue.get("JOHN").map(|c| c.lines.as_slice()), Some(&["I hope she shows up.".to_string()][..]));
    assert_eq!(dialogue.get("SARAH").map(|c| c.lines.as_slice()), Some(&["Sorry I'm late.".to_string()][..]));

    // Closing markers are structure, not a speaking character
    assert!(dialogue.get("THE END").is_none());

    Ok(())
}

/// Test discovery and analysis of scripts across nested folders
#[test]
fn test_script_workflow_withNestedFolders_shouldAnalyzeAllScripts() -> Result<()> {
    let controller = Controller::new_for_test()?;

    let temp_dir = common::create_temp_dir()?;
    let nested_dir = temp_dir.path().join("season_one");
    FileManager::ensure_dir(&nested_dir)?;

    common::create_test_script(&temp_dir.path().to_path_buf(), "pilot.txt")?;
    common::create_test_script(&nested_dir, "episode_two.txt")?;

    // 1. Discover every script under the directory
    let script_files = FileManager::find_script_files(temp_dir.path())?;
    assert_eq!(script_files.len(), 2, "Should find scripts in nested folders");

    // 2. Analyze each discovered script
    for script_file in &script_files {
        let dialogue = tokio_test::block_on(controller.analyze(script_file))?;
        assert_eq!(dialogue.len(), 3);
        assert_eq!(dialogue.total_line_count(), 7);
    }

    Ok(())
}

/// Test that an empty script file yields an empty dialogue
#[test]
fn test_script_workflow_withEmptyFile_shouldProduceEmptyDialogue() -> Result<()> {
    let controller = Controller::new_for_test()?;

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_file(&temp_dir.path().to_path_buf(), "empty.txt", "")?;

    let dialogue = tokio_test::block_on(controller.analyze(&script_path))?;

    assert!(dialogue.is_empty());
    assert_eq!(dialogue.summary().character_count, 0);

    Ok(())
}

/// Test that we can handle errors correctly in the workflow
#[test]
fn test_script_workflow_withInvalidInput_shouldHandleErrors() -> Result<()> {
    let controller = Controller::new_for_test()?;

    // Try to analyze a non-existent file
    let non_existent_path = PathBuf::from("non_existent_script.txt");
    let result = tokio_test::block_on(controller.analyze(&non_existent_path));

    // Verify proper error handling
    assert!(result.is_err(), "Analyzing non-existent file should return error");
    assert!(result.unwrap_err().to_string().contains("Input file does not exist"));

    Ok(())
}
