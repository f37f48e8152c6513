/*!
 * Core synthesis functionality.
 *
 * This module defines the main synthesis service that dispatches dialogue
 * lines to the configured TTS provider, along with statistics tracking
 * and log capture types shared by the batch layer.
 */

use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{SynthesisConfig, SynthesisProvider};
use crate::providers::SynthesizedAudio;
use crate::providers::chatterbox::{Chatterbox, SynthesisRequest};
use crate::providers::tortoise::{Tortoise, TortoiseRequest};

use super::cache::AudioCache;
use super::voices::VoiceReference;

/// Statistics about a synthesis run
#[derive(Debug, Clone)]
pub struct SynthesisStats {
    /// Number of lines turned into audio
    pub lines_synthesized: u64,

    /// Number of lines served from the cache
    pub lines_cached: u64,

    /// Number of lines skipped after failures
    pub lines_skipped: u64,

    /// Total bytes of audio produced
    pub audio_bytes: u64,

    /// Start time of stats tracking
    pub start_time: Instant,

    /// Total time spent on TTS requests
    pub request_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Quality preset, empty when the provider has none
    pub preset: String,
}

impl Default for SynthesisStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisStats {
    /// Create a new empty stats instance
    pub fn new() -> Self {
        Self {
            lines_synthesized: 0,
            lines_cached: 0,
            lines_skipped: 0,
            audio_bytes: 0,
            start_time: Instant::now(),
            request_duration: Duration::from_secs(0),
            provider: String::new(),
            preset: String::new(),
        }
    }

    /// Create new stats with provider info
    pub fn with_provider_info(provider: String, preset: String) -> Self {
        Self {
            lines_synthesized: 0,
            lines_cached: 0,
            lines_skipped: 0,
            audio_bytes: 0,
            start_time: Instant::now(),
            request_duration: Duration::from_secs(0),
            provider,
            preset,
        }
    }

    /// Record a synthesized line
    /// A line without a request duration was served from the cache
    pub fn record_line(&mut self, audio_bytes: u64, duration: Option<Duration>) {
        self.lines_synthesized += 1;
        self.audio_bytes += audio_bytes;

        match duration {
            Some(d) => self.request_duration += d,
            None => self.lines_cached += 1,
        }
    }

    /// Record a line skipped after repeated failures
    pub fn record_skip(&mut self) {
        self.lines_skipped += 1;
    }

    /// Calculate lines per minute rate
    pub fn lines_per_minute(&self) -> f64 {
        // Use the request duration for rate calculation, with fallback to elapsed time
        let duration_minutes = if self.request_duration.as_secs_f64() > 0.0 {
            self.request_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.lines_synthesized as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of the synthesis run
    pub fn summary(&self) -> String {
        let elapsed = self.start_time.elapsed();
        let elapsed_minutes = elapsed.as_secs_f64() / 60.0;
        let request_minutes = self.request_duration.as_secs_f64() / 60.0;
        let preset = if self.preset.is_empty() { "default" } else { &self.preset };

        format!(
            "Synthesis Summary:\n\
             Provider: {}\n\
             Preset: {}\n\
             Lines synthesized: {}\n\
             Served from cache: {}\n\
             Lines skipped: {}\n\
             Audio produced: {} bytes\n\
             Elapsed time: {:.2} minutes\n\
             Request time: {:.2} minutes\n\
             Lines per minute: {:.2}",
            self.provider,
            preset,
            self.lines_synthesized,
            self.lines_cached,
            self.lines_skipped,
            self.audio_bytes,
            elapsed_minutes,
            request_minutes,
            self.lines_per_minute()
        )
    }
}

/// Parse an endpoint string into host and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?
        .to_string();

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((host, port))
}

/// Speech provider implementation variants
enum SpeechProviderImpl {
    /// Chatterbox TTS server
    Chatterbox {
        /// Client instance
        client: Chatterbox,
    },

    /// Tortoise TTS server
    Tortoise {
        /// Client instance
        client: Tortoise,
    },
}

/// Synthesis options for customizing the synthesis process
pub struct SynthesisOptions {
    /// Maximum number of concurrent requests
    pub max_concurrent_requests: usize,

    /// Whether to keep going when a single line fails
    pub skip_failed_lines: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 2,
            skip_failed_lines: true,
        }
    }
}

/// Log entry for capturing synthesis process logs
#[derive(Clone)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

/// Main synthesis service for voicing dialogue lines
pub struct SynthesisService {
    /// Provider implementation
    provider: SpeechProviderImpl,

    /// Configuration for the synthesis service
    pub config: SynthesisConfig,

    /// Synthesis options
    pub options: SynthesisOptions,

    /// Audio cache for storing and retrieving synthesized lines
    pub cache: AudioCache,
}

impl SynthesisService {
    /// Create a new synthesis service with the given configuration
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let provider = match config.provider {
            SynthesisProvider::Chatterbox => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                let timeout_secs = config.get_timeout_secs();
                let retry_count = config.common.retry_count;
                let retry_backoff_ms = config.common.retry_backoff_ms;
                let rate_limit = config.get_rate_limit();

                SpeechProviderImpl::Chatterbox {
                    client: Chatterbox::new_with_config(
                        &host,
                        port,
                        timeout_secs,
                        retry_count,
                        retry_backoff_ms,
                        rate_limit,
                    ),
                }
            },
            SynthesisProvider::Tortoise => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                let timeout_secs = config.get_timeout_secs();
                let retry_count = config.common.retry_count;
                let retry_backoff_ms = config.common.retry_backoff_ms;
                let rate_limit = config.get_rate_limit();

                SpeechProviderImpl::Tortoise {
                    client: Tortoise::new_with_config(
                        &host,
                        port,
                        timeout_secs,
                        retry_count,
                        retry_backoff_ms,
                        rate_limit,
                    ),
                }
            },
        };

        // Create options that use config-driven concurrency settings
        let options = SynthesisOptions {
            max_concurrent_requests: config.optimal_concurrent_requests(),
            skip_failed_lines: true,
        };

        Ok(Self {
            provider,
            config,
            options,
            cache: AudioCache::new(true), // Enable cache by default
        })
    }

    /// Get the display name of the active provider
    pub fn provider_name(&self) -> &str {
        self.config.provider.display_name()
    }

    /// Test the connection to the synthesis provider
    pub async fn test_connection(
        &self,
        log_capture: Option<Arc<StdMutex<Vec<LogEntry>>>>,
    ) -> Result<()> {
        // Log the test attempt
        if let Some(log) = &log_capture {
            if let Ok(mut logs) = log.lock() {
                logs.push(LogEntry {
                    level: "INFO".to_string(),
                    message: format!("Testing connection to {} at {}",
                                    self.config.provider.display_name(),
                                    self.config.get_endpoint()),
                });
            }
        }

        let result = match &self.provider {
            SpeechProviderImpl::Chatterbox { client } => client.health().await,
            SpeechProviderImpl::Tortoise { client } => client.health().await,
        };

        match result {
            Ok(status) => {
                if let Some(log) = &log_capture {
                    if let Ok(mut logs) = log.lock() {
                        logs.push(LogEntry {
                            level: "INFO".to_string(),
                            message: format!("Successfully connected to {} (status: {})",
                                            self.config.provider.display_name(), status),
                        });
                    }
                }
                Ok(())
            },
            Err(e) => {
                if let Some(log) = &log_capture {
                    if let Ok(mut logs) = log.lock() {
                        logs.push(LogEntry {
                            level: "ERROR".to_string(),
                            message: format!("Failed to connect to {}: {}",
                                            self.config.provider.display_name(), e),
                        });
                    }
                }
                Err(anyhow!("Failed to connect to {}: {}",
                           self.config.provider.display_name(), e))
            }
        }
    }

    /// Synthesize a single dialogue line
    pub async fn synthesize_line(
        &self,
        text: &str,
        voice: Option<&VoiceReference>,
    ) -> Result<SynthesizedAudio> {
        let (audio, _) = self.synthesize_line_with_usage(text, voice, None).await?;
        Ok(audio)
    }

    /// Synthesize a dialogue line with request duration tracking
    /// Returns the audio and the request duration, which is None for cache hits
    pub async fn synthesize_line_with_usage(
        &self,
        text: &str,
        voice: Option<&VoiceReference>,
        log_capture: Option<Arc<StdMutex<Vec<LogEntry>>>>,
    ) -> Result<(SynthesizedAudio, Option<Duration>)> {
        let start_time = Instant::now();

        // Refuse empty lines, the parser never emits them
        if text.trim().is_empty() {
            return Err(anyhow!("Cannot synthesize an empty line"));
        }

        let voice_path = voice.map(|v| v.audio_path.as_str()).unwrap_or("");
        let provider_str = self.config.provider.to_lowercase_string();

        // Check cache first
        if let Some(cached) = self.cache.get(text, voice_path, &provider_str) {
            if let Some(log) = &log_capture {
                if let Ok(mut logs) = log.lock() {
                    logs.push(LogEntry {
                        level: "INFO".to_string(),
                        message: format!("Cache hit for line '{}'", text),
                    });
                }
            }
            return Ok((cached, None)); // No request duration for cached results
        }

        match &self.provider {
            SpeechProviderImpl::Chatterbox { client } => {
                // Create synthesis request
                let mut request = SynthesisRequest::new(text)
                    .exaggeration(self.config.common.exaggeration)
                    .temperature(self.config.common.temperature);

                if !voice_path.is_empty() {
                    request = request.audio_prompt_path(voice_path);
                }

                // Send request
                let result = client.synthesize(request).await;

                match result {
                    Ok(audio) => {
                        let duration = start_time.elapsed();

                        // Log the response if requested
                        if let Some(log) = &log_capture {
                            if let Ok(mut logs) = log.lock() {
                                logs.push(LogEntry {
                                    level: "INFO".to_string(),
                                    message: format!("Chatterbox returned {} bytes in {:?}",
                                                    audio.audio.len(), duration),
                                });
                            }
                        }

                        // Store in cache
                        self.cache.store(text, voice_path, &provider_str, &audio);

                        Ok((audio, Some(duration)))
                    },
                    Err(e) => {
                        // Log the error if requested
                        if let Some(log) = &log_capture {
                            if let Ok(mut logs) = log.lock() {
                                logs.push(LogEntry {
                                    level: "ERROR".to_string(),
                                    message: format!("Chatterbox synthesis error: {}", e),
                                });
                            }
                        }

                        Err(anyhow!("Chatterbox synthesis error: {}", e))
                    }
                }
            },
            SpeechProviderImpl::Tortoise { client } => {
                // Create generation request
                let mut request = TortoiseRequest::new(text)
                    .preset(self.config.get_preset());

                if !voice_path.is_empty() {
                    request = request.voice_path(voice_path);
                }

                // Send request
                let result = client.generate(request).await;

                match result {
                    Ok(audio) => {
                        let duration = start_time.elapsed();

                        // Log the response if requested
                        if let Some(log) = &log_capture {
                            if let Ok(mut logs) = log.lock() {
                                logs.push(LogEntry {
                                    level: "INFO".to_string(),
                                    message: format!("Tortoise returned {} bytes in {:?}",
                                                    audio.audio.len(), duration),
                                });
                            }
                        }

                        // Store in cache
                        self.cache.store(text, voice_path, &provider_str, &audio);

                        Ok((audio, Some(duration)))
                    },
                    Err(e) => {
                        // Log the error if requested
                        if let Some(log) = &log_capture {
                            if let Ok(mut logs) = log.lock() {
                                logs.push(LogEntry {
                                    level: "ERROR".to_string(),
                                    message: format!("Tortoise synthesis error: {}", e),
                                });
                            }
                        }

                        Err(anyhow!("Tortoise synthesis error: {}", e))
                    }
                }
            }
        }
    }
}

impl Clone for SynthesisService {
    fn clone(&self) -> Self {
        // Create a new instance with the same config
        // This should not fail if the original instance was created successfully
        let mut service = SynthesisService::new(self.config.clone())
            .expect("Failed to clone SynthesisService - this indicates a serious configuration issue");

        // Share the cache store so concurrent clones benefit from each other's hits
        service.cache = self.cache.clone();
        service
    }
}
