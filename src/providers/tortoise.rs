use anyhow::{Result, anyhow, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::error;

use super::SynthesizedAudio;

// @const: Sample rate assumed when the server does not report one
pub const FALLBACK_SAMPLE_RATE: u32 = 24_000;

// @const: Quality presets accepted by the Tortoise server
pub const SUPPORTED_PRESETS: [&str; 6] = [
    "high_quality",
    "standard",
    "fast",
    "very_fast",
    "ultra_fast",
    "ultra_fast_old",
];

/// Default quality preset
pub const DEFAULT_PRESET: &str = "high_quality";

/// Check whether a preset name is accepted by the Tortoise server
pub fn is_supported_preset(preset: &str) -> bool {
    SUPPORTED_PRESETS.contains(&preset)
}

/// Tortoise client for interacting with a local Tortoise TTS server
pub struct Tortoise {
    /// Base URL of the Tortoise API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
}

/// Generation request for the Tortoise API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TortoiseRequest {
    /// Text to synthesize
    text: String,
    /// Path to a voice sample clip
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_path: Option<String>,
    /// Quality preset name
    preset: String,
}

/// Builder methods for TortoiseRequest - API surface for library consumers
#[allow(dead_code)]
impl TortoiseRequest {
    /// Create a new generation request with the default preset
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_path: None,
            preset: DEFAULT_PRESET.to_string(),
        }
    }

    /// Set the voice sample clip
    pub fn voice_path(mut self, path: impl Into<String>) -> Self {
        self.voice_path = Some(path.into());
        self
    }

    /// Set the quality preset
    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /// Text carried by this request
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Tortoise client implementation - some methods are API surface for library consumers
#[allow(dead_code)]
impl Tortoise {
    /// Create a new Tortoise client with the specified base URL
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            base_url: Self::build_base_url(host.into(), port),
            client: Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
        }
    }

    /// Create a new Tortoise client with configuration
    pub fn new_with_config(
        host: impl Into<String>,
        port: u16,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        rate_limit: Option<u32>,
    ) -> Self {
        Self {
            base_url: Self::build_base_url(host.into(), port),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(20)
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
            rate_limit,
        }
    }

    /// Construct a proper URL with scheme and port from a host string
    fn build_base_url(host: String, port: u16) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            let url_parts: Vec<&str> = host.split("://").collect();
            if url_parts.len() == 2 {
                let scheme = url_parts[0];
                let host_part = url_parts[1];

                if host_part.contains(":") {
                    host
                } else {
                    format!("{}://{}:{}", scheme, host_part, port)
                }
            } else {
                format!("http://localhost:{}", port)
            }
        } else {
            format!("http://{}:{}", host, port)
        }
    }

    /// Generate speech from the Tortoise API with retry logic
    ///
    /// Tortoise generations on the slower presets can take minutes per line,
    /// so the client timeout is expected to be generous.
    pub async fn generate(&self, request: TortoiseRequest) -> Result<SynthesizedAudio> {
        let url = format!("{}/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            // Add rate limiting if configured
            if let Some(rate_limit) = self.rate_limit {
                let delay_ms = 60_000 / rate_limit as u64; // Convert requests per minute to milliseconds
                if attempt > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }

            let response_result = self.client.post(&url)
                .json(&request)
                .send()
                .await;

            match response_result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let sample_rate = response.headers()
                            .get("x-sample-rate")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u32>().ok())
                            .or(Some(FALLBACK_SAMPLE_RATE));

                        let audio = response.bytes().await
                            .map_err(|e| anyhow!("Failed to read audio bytes from Tortoise API: {}", e))?;

                        if audio.is_empty() {
                            last_error = Some(anyhow!("Tortoise API returned an empty audio body"));
                            error!("Tortoise API returned an empty audio body - attempt {}/{}",
                                   attempt + 1, self.max_retries + 1);
                        } else {
                            return Ok(SynthesizedAudio { audio, sample_rate });
                        }
                    } else if status.is_server_error() {
                        // Server error - can retry
                        let error_text = response.text().await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        last_error = Some(anyhow!("Tortoise API error ({}): {}", status, error_text));
                        error!("Tortoise API error ({}): {} - attempt {}/{}", status, error_text, attempt + 1, self.max_retries + 1);
                    } else {
                        // Client error - don't retry
                        let error_text = response.text().await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!("Tortoise API error ({}): {}", status, error_text);
                        return Err(anyhow!("Tortoise API error ({}): {}", status, error_text));
                    }
                },
                Err(e) => {
                    // Network error - can retry
                    last_error = Some(anyhow!("Failed to send request to Tortoise API: {}", e));
                    error!("Tortoise API network error: {} - attempt {}/{}", last_error.as_ref().unwrap(), attempt + 1, self.max_retries + 1);
                }
            }

            attempt += 1;

            // If we have more retries left, wait with exponential backoff
            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        // If we get here, all retries failed
        Err(last_error.unwrap_or_else(|| anyhow!("Tortoise API request failed after {} attempts", self.max_retries + 1)))
    }

    /// Get the Tortoise server health status
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base_url);
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .context("Failed to connect to Tortoise")?
            .json()
            .await
            .context("Failed to parse Tortoise health response")?;

        let status = response["status"].as_str()
            .ok_or_else(|| anyhow!("Invalid status format in health response"))?
            .to_string();

        Ok(status)
    }
}
