use anyhow::Result;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use crate::app_config::Config;
use crate::extraction;
use crate::script_parser::{ScriptDialogue, ScriptParser};
use crate::synthesis::{AudioWriter, BatchSynthesizer, SynthesisService, VoiceRegistry};
use crate::synthesis::core::LogEntry;
use crate::file_utils;
use std::sync::Once;
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use crate::file_utils::FileManager;

// @module: Application controller for script processing

/// Manifest file name that marks a completed voicing run
const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Issues log file name written next to generated output
const ISSUES_LOG_FILE_NAME: &str = "scriptcast.issues.log";

/// Main application controller for script analysis and voicing
pub struct Controller {
    // @field: App configuration
    pub config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let controller = Self {
            config,
        };

        Ok(controller)
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.synthesis.available_providers.is_empty()
    }

    /// Public method to write logs to a file for testing purposes
    pub fn write_synthesis_logs(&self, logs: &[LogEntry], file_path: &str, run_context: &str) -> Result<()> {
        self.write_logs_to_file(logs, file_path, run_context)
    }

    /// Test version of the voice run that simulates the process without provider calls
    pub async fn test_run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        // For testing purposes, just validate the configuration and simulate success
        info!("Test run initiated for file: {:?}", input_file);
        info!("Output directory: {:?}", output_dir);
        info!("Force overwrite: {}", force_overwrite);

        // Validate that we have a proper configuration
        if !self.is_initialized() {
            return Err(anyhow::anyhow!("Controller not properly initialized"));
        }

        // Simulate successful completion
        Ok(())
    }

    /// Test version of the folder run that simulates folder processing
    pub async fn test_run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        // For testing purposes, just validate the configuration and simulate success
        info!("Test run folder initiated for directory: {:?}", input_dir);
        info!("Force overwrite: {}", force_overwrite);

        // Validate that we have a proper configuration
        if !self.is_initialized() {
            return Err(anyhow::anyhow!("Controller not properly initialized"));
        }

        // Simulate successful completion
        Ok(())
    }

    /// Extract and classify a script file into per character dialogue
    pub async fn analyze(&self, input_file: &Path) -> Result<ScriptDialogue> {
        // Check if the input file exists
        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        // Extract the raw text from the script file
        let raw_text = extraction::extract_text(input_file).await?;

        // Classify lines and segment dialogue by character
        let dialogue = ScriptParser::parse(&raw_text);

        debug!("Parsed {} characters with {} dialogue lines from {:?}",
              dialogue.len(), dialogue.total_line_count(), input_file);

        Ok(dialogue)
    }

    /// Run the analyze workflow for a single script file
    pub async fn run_analyze(
        &self,
        input_file: PathBuf,
        output: Option<PathBuf>,
        as_json: bool,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        let dialogue = self.analyze(&input_file).await?;
        let summary = dialogue.summary();

        // Print the analysis to stdout, JSON when requested
        if as_json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{}", summary);
        }

        // Write the full dialogue next to the summary when an output path was given
        if let Some(output_path) = output {
            if output_path.exists() && !force_overwrite {
                warn!("Skipping write, analysis already exists (use -f to force overwrite)");
            } else {
                let json = serde_json::to_string_pretty(&dialogue)?;
                FileManager::write_to_file(&output_path, &json)?;
                info!("Success: {}", output_path.display());
            }
        }

        info!("Analysis completed in {}.", Self::format_duration(start_time.elapsed()));

        Ok(())
    }

    /// Run the analyze workflow for every script file in a directory
    /// With an output directory, one analysis file is written per script
    pub async fn run_analyze_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        as_json: bool,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        // Check if the input directory exists
        if !input_dir.exists() {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Find all script files in the directory (recursive)
        let script_files = FileManager::find_script_files(&input_dir)?;

        // If no script files found, return error
        if script_files.is_empty() {
            return Err(anyhow::anyhow!("No script files found in directory: {:?}", input_dir));
        }

        // Create a progress bar for folder processing
        let folder_pb = ProgressBar::new(script_files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Analyzing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;

        // Collect per file summaries for the JSON output mode
        let mut json_reports = Vec::new();

        // Process each script file
        for script_file in script_files.iter() {
            // Get the file name for display
            let file_name = script_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            // Update the folder progress bar to show current file
            folder_pb.set_message(format!("Analyzing: {}", file_name));

            match self.analyze(script_file).await {
                Ok(dialogue) => {
                    let summary = dialogue.summary();

                    if as_json {
                        json_reports.push(serde_json::json!({
                            "file": script_file.to_string_lossy(),
                            "summary": summary,
                        }));
                    } else {
                        println!("{}:", file_name);
                        println!("{}", summary);
                        println!();
                    }

                    // Write the full dialogue into the output directory when requested
                    if let Some(out_dir) = &output_dir {
                        let output_path = file_utils::FileManager::generate_output_path(
                            script_file, out_dir, "analysis", "json");

                        if output_path.exists() && !force_overwrite {
                            warn!("Skipping write, analysis already exists (use -f to force overwrite)");
                        } else {
                            let json = serde_json::to_string_pretty(&dialogue)?;
                            FileManager::write_to_file(&output_path, &json)?;
                        }
                    }

                    success_count += 1;
                },
                Err(e) => {
                    error!("Error analyzing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            // Update the folder progress bar
            folder_pb.inc(1);
        }

        // Finish the folder progress bar
        folder_pb.finish_with_message("Folder analysis complete");

        // Emit one JSON document covering the whole folder
        if as_json {
            println!("{}", serde_json::to_string_pretty(&json_reports)?);
        }

        // Give summary results - important for batch operations
        info!("Folder analysis completed: {} analyzed, {} errors in {}",
             success_count, error_count, Self::format_duration(start_time.elapsed()));

        Ok(())
    }

    /// Run the voicing workflow with input script file and output directory
    pub async fn run_voice(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        characters: &[String],
        force_overwrite: bool,
    ) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_voice_with_progress(input_file, output_dir, characters, &multi_progress, force_overwrite).await
    }

    /// Run the voicing workflow with progress reporting
    async fn run_voice_with_progress(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        characters: &[String],
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        // Check if the input file exists
        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        // Ensure the output directory exists
        file_utils::FileManager::ensure_dir(&output_dir)?;

        // Check if audio already exists
        let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
        if manifest_path.exists() && !force_overwrite {
            // Skip if audio already exists and no force flag
            warn!("Skipping file, audio already exists (use -f to force overwrite)");
            return Ok(());
        }

        // Extract and classify the script
        let mut dialogue = self.analyze(&input_file).await?;

        // Keep only the requested characters when a filter was given
        if !characters.is_empty() {
            let requested: Vec<String> = characters.iter()
                .map(|name| name.trim().to_uppercase())
                .collect();

            let known: Vec<String> = dialogue.characters.iter()
                .map(|c| c.name.to_uppercase())
                .collect();

            for name in &requested {
                if !known.contains(name) {
                    warn!("Character '{}' has no dialogue in {:?}", name, input_file);
                }
            }

            dialogue.characters.retain(|c| requested.contains(&c.name.to_uppercase()));
        }

        if dialogue.is_empty() {
            warn!("No dialogue to voice in {:?}", input_file);
            return Ok(());
        }

        // Build the voice registry and surface characters without a voice
        let voices = VoiceRegistry::from_map(&self.config.voices);
        let names: Vec<&str> = dialogue.characters.iter().map(|c| c.name.as_str()).collect();
        let missing = voices.missing_voices(&names);
        if !missing.is_empty() {
            info!("No voice assigned to {}, provider default will be used", missing.join(", "));
        }

        // Initialize connection testing once per run
        static INIT_TEST: Once = Once::new();
        INIT_TEST.call_once(|| {
            // Run test in a background task using tokio::spawn
            let synthesis_config = self.config.synthesis.clone();
            tokio::spawn(async move {
                if let Ok(synthesis_service) = SynthesisService::new(synthesis_config) {
                    let _ = synthesis_service.test_connection(None).await;
                }
            });
        });

        // Voice the dialogue
        let (rendered, synthesis_elapsed) = self.synthesize_with_progress(&dialogue, &voices, multi_progress, &output_dir).await?;

        // Save the audio files and the manifest
        let manifest = AudioWriter::write_script_audio(
            &rendered,
            &output_dir,
            self.config.synthesis.provider.display_name(),
            force_overwrite,
        )?;

        info!("Success: {} ({} files)", manifest_path.display(), manifest.total_files);

        // Calculate and display the elapsed time
        let elapsed = start_time.elapsed();

        // Calculate extraction time (subtract synthesis time from total time)
        let extraction_time = elapsed.checked_sub(synthesis_elapsed).unwrap_or_default();

        // Log completion time metrics
        info!(
            "Voicing complete. Extraction: {} - Synthesis: {}",
            Self::format_duration(extraction_time),
            Self::format_duration(synthesis_elapsed)
        );

        Ok(())
    }

    /// Internal method to voice dialogue with a progress bar from the provided MultiProgress
    async fn synthesize_with_progress(
        &self,
        dialogue: &ScriptDialogue,
        voices: &VoiceRegistry,
        multi_progress: &MultiProgress,
        output_dir: &Path,
    ) -> Result<(Vec<crate::synthesis::SynthesizedLine>, std::time::Duration)> {
        // Start timing the synthesis process
        let synthesis_start_time = std::time::Instant::now();

        // Log the number of lines we're about to voice
        let total_lines_count = dialogue.total_line_count();

        // Create a progress bar for synthesis tracking
        let progress_bar = multi_progress.add(ProgressBar::new(total_lines_count as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        // Log that we're starting synthesis with provider and endpoint info
        info!("🚀 ScriptCast: {} - {}",
            self.config.synthesis.provider.display_name(),
            self.config.synthesis.get_endpoint());

        // Log that we're voicing
        info!("Voicing, please wait…");
        progress_bar.set_message("Voicing");

        // Create log capture for storing warnings during synthesis
        let log_capture = Arc::new(StdMutex::new(Vec::new()));
        let log_capture_clone = Arc::clone(&log_capture);

        // Use the synthesis service to voice all lines
        let synthesis_service = SynthesisService::new(self.config.synthesis.clone())?;
        let batch_synthesizer = BatchSynthesizer::new(synthesis_service);

        // Clone the progress_bar for use in the callback
        let pb = progress_bar.clone();

        // Pass a callback to update the progress bar for each completed line
        let (rendered, stats) = batch_synthesizer.synthesize_script(
            dialogue,
            voices,
            log_capture_clone,
            move |completed, _total| {
                pb.set_position(completed as u64);
            }
        ).await?;

        // Finish and clear the progress bar instead of just finishing it
        // This ensures only the folder progress bar remains visible when processing multiple files
        progress_bar.finish_and_clear();

        // Now that the progress bar is finished, print any captured logs
        let logs = {
            match log_capture.lock() {
                Ok(logs_guard) => logs_guard.clone(),
                Err(_) => Vec::new(),
            }
        };

        // Display captured logs if we're in debug mode or there were errors
        let error_logs = logs.iter().filter(|log| log.level == "ERROR").count();
        let warning_logs = logs.iter().filter(|log| log.level == "WARN").count();

        if error_logs > 0 || warning_logs > 0 {
            info!("Synthesis completed with {} errors and {} warnings.", error_logs, warning_logs);

            // In debug mode, or if explicitly requested, show all logs
            if log::max_level() >= log::LevelFilter::Debug {
                for log in &logs {
                    match log.level.as_str() {
                        "ERROR" => error!("{}", log.message),
                        "WARN" => warn!("{}", log.message),
                        "INFO" => info!("{}", log.message),
                        "DEBUG" => debug!("{}", log.message),
                        _ => info!("{}", log.message),
                    }
                }
            }

            // Write logs to the issues log file
            let log_file_path = output_dir.join(ISSUES_LOG_FILE_NAME).to_string_lossy().to_string();
            let context = format!("{} - {} ({})",
                self.config.synthesis.provider.display_name(),
                self.config.synthesis.get_endpoint(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

            if let Err(e) = self.write_logs_to_file(&logs, &log_file_path, &context) {
                warn!("Failed to write logs to file: {}", e);
            } else {
                info!("Logs written to {}", log_file_path);
            }
        }

        // Log the number of lines after synthesis
        if stats.lines_skipped > 0 {
            warn!("Voiced {} of {} dialogue lines, {} skipped after repeated failures",
                  rendered.len(), total_lines_count, stats.lines_skipped);
        } else {
            info!("Successfully voiced all {} dialogue lines", rendered.len());
        }

        // Log synthesis metrics
        let synthesis_elapsed = synthesis_start_time.elapsed();

        // Only log the stats summary at the end of the synthesis process
        if stats.lines_synthesized > 0 {
            info!("🔢 {}", stats.summary());
        }

        Ok((rendered, synthesis_elapsed))
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the voicing workflow in folder mode, processing all script files in a directory
    /// Files that already have generated audio will be skipped
    pub async fn run_voice_folder(
        &self,
        input_dir: PathBuf,
        characters: &[String],
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        // Check if the input directory exists
        if !input_dir.exists() {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Find all script files in the directory (recursive)
        let script_files = file_utils::FileManager::find_script_files(&input_dir)?;

        // If no script files found, return error
        if script_files.is_empty() {
            return Err(anyhow::anyhow!("No script files found in directory: {:?}", input_dir));
        }

        // Create multi-progress instance for multiple file processing
        let multi_progress = MultiProgress::new();

        // Create a progress bar for folder processing
        let folder_pb = multi_progress.add(ProgressBar::new(script_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        // Process each script file
        for script_file in script_files.iter() {
            // Get the file name for display
            let file_name = script_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            // Update the folder progress bar to show current file
            folder_pb.set_message(format!("Processing: {}", file_name));

            // Audio lands in a sibling directory named after the script
            let output_dir = Self::folder_output_dir(script_file, &input_dir);

            // Check if audio already exists
            if output_dir.join(MANIFEST_FILE_NAME).exists() && !force_overwrite {
                // Skip if audio already exists and no force flag
                warn!("Skipping file, audio already exists (use -f to force overwrite)");
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            // Run the voicing for this file
            match self.run_voice_with_progress(script_file.clone(), output_dir, characters, &multi_progress, force_overwrite).await {
                Ok(_) => {
                    success_count += 1;
                },
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            // Update the folder progress bar
            folder_pb.inc(1);
        }

        // Finish the folder progress bar
        folder_pb.finish_with_message("Folder processing complete");

        // Calculate and display the total elapsed time
        let duration = start_time.elapsed();

        // Give summary results - important for batch operations
        let summary_message = format!("Folder processing completed: {} processed, {} skipped, {} errors",
             success_count, skip_count, error_count);
        info!("{}", summary_message);

        // Write summary to log file
        let log_file_path = input_dir.join(ISSUES_LOG_FILE_NAME).to_string_lossy().to_string();
        let context = format!("Folder Processing: {} ({})",
            input_dir.display(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        let folder_log_entry = LogEntry {
            level: "INFO".to_string(),
            message: format!("{} - Duration: {}", summary_message, Self::format_duration(duration))
        };

        // Create a vector with just the summary log entry for folder processing
        let folder_logs = vec![folder_log_entry];

        if let Err(e) = self.write_logs_to_file(&folder_logs, &log_file_path, &context) {
            warn!("Failed to write folder logs to file: {}", e);
        } else {
            info!("Folder processing logs written to {}", log_file_path);
        }

        Ok(())
    }

    /// Get the audio output directory for a script processed in folder mode
    fn folder_output_dir(script_file: &Path, input_dir: &Path) -> PathBuf {
        let stem = script_file.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        let parent = script_file.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| input_dir.to_path_buf());

        parent.join(format!("{}_audio", stem))
    }

    /// Write synthesis logs to a log file
    fn write_logs_to_file(&self, logs: &[LogEntry], file_path: &str, run_context: &str) -> Result<()> {
        let mut log_content = String::new();

        // Add header
        log_content.push_str(&format!("Synthesis Log - {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        log_content.push_str(&format!("Context: {}\n\n", run_context));

        // Add each log entry
        for entry in logs {
            log_content.push_str(&format!("[{}] {}\n", entry.level, entry.message));
        }

        // Write to file
        FileManager::write_to_file(file_path, &log_content)?;

        Ok(())
    }
}
