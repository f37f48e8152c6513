/*!
 * Batch synthesis processing.
 *
 * This module contains functionality for voicing dialogue lines in
 * parallel, with support for concurrency, progress tracking, and error
 * handling.
 */

use anyhow::{Result, anyhow};
use log::error;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use futures::stream::{self, StreamExt};
use std::time::Instant;

use crate::providers::SynthesizedAudio;
use crate::script_parser::ScriptDialogue;

use super::core::{LogEntry, SynthesisService, SynthesisStats};
use super::voices::{VoiceReference, VoiceRegistry};

/// A dialogue line with its synthesized audio
#[derive(Debug, Clone)]
pub struct SynthesizedLine {
    /// Character who speaks the line
    pub character: String,

    /// Zero-based index of the line within the character's dialogue
    pub line_index: usize,

    /// The dialogue text
    pub text: String,

    /// The synthesized audio
    pub audio: SynthesizedAudio,
}

/// Single line of dialogue queued for synthesis
struct WorkItem {
    character: String,
    line_index: usize,
    text: String,
    voice: Option<VoiceReference>,
}

/// Batch synthesizer for voicing dialogue lines concurrently
pub struct BatchSynthesizer {
    /// The synthesis service to use
    service: SynthesisService,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,

    /// Whether to keep going when a single line fails
    skip_failed_lines: bool,
}

impl BatchSynthesizer {
    /// Create a new batch synthesizer
    pub fn new(service: SynthesisService) -> Self {
        Self {
            max_concurrent_requests: service.options.max_concurrent_requests,
            skip_failed_lines: service.options.skip_failed_lines,
            service,
        }
    }

    /// Voice every dialogue line in the script
    /// Results are returned in script order regardless of completion order
    pub async fn synthesize_script(
        &self,
        dialogue: &ScriptDialogue,
        voices: &VoiceRegistry,
        log_capture: Arc<StdMutex<Vec<LogEntry>>>,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<(Vec<SynthesizedLine>, SynthesisStats)> {
        // Flatten the dialogue into individual work items
        let mut tasks = Vec::new();
        for character in &dialogue.characters {
            let voice = voices.resolve(&character.name);
            for (line_index, text) in character.lines.iter().enumerate() {
                tasks.push(WorkItem {
                    character: character.name.clone(),
                    line_index,
                    text: text.clone(),
                    voice: voice.clone(),
                });
            }
        }

        // Initialize synthesis stats
        let mut stats = SynthesisStats::with_provider_info(
            self.service.provider_name().to_string(),
            self.service.config.get_preset(),
        );

        if tasks.is_empty() {
            // Return early if there is nothing to voice
            return Ok((Vec::new(), stats));
        }

        // Create a semaphore to limit concurrent requests
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));

        // Track progress
        let total_lines = tasks.len();
        let processed_lines = Arc::new(AtomicUsize::new(0));

        // Process lines concurrently
        let results = stream::iter(tasks.into_iter().enumerate())
            .map(|(task_index, task)| {
                let service = self.service.clone();
                let semaphore = semaphore.clone();
                let log_capture = log_capture.clone();
                let processed_lines = processed_lines.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    // Acquire a permit from the semaphore
                    let _permit = semaphore.acquire().await.expect("Semaphore should not be closed");

                    // Sleep for rate limit delay to avoid overwhelming the server
                    if task_index > 0 {
                        let delay_ms = service.config.common.rate_limit_delay_ms;
                        if delay_ms > 0 {
                            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                        }
                    }

                    // Log line processing start
                    {
                        if let Ok(mut logs) = log_capture.lock() {
                            logs.push(LogEntry {
                                level: "INFO".to_string(),
                                message: format!("Voicing line {} of {} ({})",
                                                task_index + 1, total_lines, task.character),
                            });
                        }
                    }

                    // Synthesize the line
                    let start_time = Instant::now();
                    let result = service.synthesize_line_with_usage(
                        &task.text,
                        task.voice.as_ref(),
                        Some(log_capture.clone()),
                    ).await;

                    // Update progress
                    let current = processed_lines.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_lines);

                    // Log line processing completion
                    {
                        if let Ok(mut logs) = log_capture.lock() {
                            let duration = start_time.elapsed();
                            match &result {
                                Ok(_) => {
                                    logs.push(LogEntry {
                                        level: "INFO".to_string(),
                                        message: format!("Line {} completed in {:?}",
                                                        task_index + 1, duration),
                                    });
                                },
                                Err(e) => {
                                    logs.push(LogEntry {
                                        level: "ERROR".to_string(),
                                        message: format!("Line {} failed: {}", task_index + 1, e),
                                    });
                                }
                            }
                        }
                    }

                    (task_index, task, result)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort results by task index to maintain script order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(idx, _, _)| *idx);

        // Process results
        let mut rendered = Vec::with_capacity(total_lines);
        let mut failures = Vec::new();

        for (task_index, task, result) in sorted_results {
            match result {
                Ok((audio, duration)) => {
                    stats.record_line(audio.audio.len() as u64, duration);
                    rendered.push(SynthesizedLine {
                        character: task.character,
                        line_index: task.line_index,
                        text: task.text,
                        audio,
                    });
                },
                Err(e) => {
                    if self.skip_failed_lines {
                        stats.record_skip();
                        failures.push(format!(
                            "{} line {}: {}",
                            task.character, task.line_index + 1, e
                        ));
                    } else {
                        let error_message = format!("Failed to voice line {}: {}", task_index + 1, e);
                        error!("{}", error_message);
                        return Err(anyhow!(error_message));
                    }
                }
            }
        }

        // Surface skipped lines without failing the whole run
        if !failures.is_empty() {
            if let Ok(mut logs) = log_capture.lock() {
                logs.push(LogEntry {
                    level: "WARN".to_string(),
                    message: format!("Skipped {} lines after repeated failures: {}",
                                    failures.len(), failures.join("; ")),
                });
            }
        }

        Ok((rendered, stats))
    }
}
