use anyhow::{Result, anyhow, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::error;

use super::SynthesizedAudio;

/// Chatterbox client for interacting with a local Chatterbox TTS server
pub struct Chatterbox {
    /// Base URL of the Chatterbox API
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

/// Synthesis request for the Chatterbox API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to synthesize
    text: String,
    /// Path to a reference audio clip for voice cloning
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_prompt_path: Option<String>,
    /// Expressiveness of the generated speech (default: 0.5)
    #[serde(skip_serializing_if = "Option::is_none")]
    exaggeration: Option<f32>,
    /// Sampling temperature (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Builder methods for SynthesisRequest - API surface for library consumers
#[allow(dead_code)]
impl SynthesisRequest {
    /// Create a new synthesis request
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audio_prompt_path: None,
            exaggeration: None,
            temperature: None,
        }
    }

    /// Set the reference audio clip for voice cloning
    pub fn audio_prompt_path(mut self, path: impl Into<String>) -> Self {
        self.audio_prompt_path = Some(path.into());
        self
    }

    /// Set the exaggeration level
    pub fn exaggeration(mut self, exaggeration: f32) -> Self {
        self.exaggeration = Some(exaggeration);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text carried by this request
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Chatterbox client implementation - some methods are API surface for library consumers
#[allow(dead_code)]
impl Chatterbox {
    /// Create a new Chatterbox client with the specified base URL
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            base_url: Self::build_base_url(host.into(), port),
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
        }
    }

    /// Create a new Chatterbox client with configuration
    ///
    /// Uses connection pooling for better performance with concurrent requests.
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
                // Local TTS servers speak HTTP/1.1
                .http1_only()
                // Keep connections alive for better performance
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

    /// Create a new Chatterbox client from a complete URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            base_url: url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
        }
    }

    /// Construct a proper URL with scheme and port from a host string
    fn build_base_url(host: String, port: u16) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            let url_parts: Vec<&str> = host.split("://").collect();
            if url_parts.len() == 2 {
                let scheme = url_parts[0];
                let host_part = url_parts[1];

                // Keep an existing port, otherwise append the configured one
                if host_part.contains(":") {
                    host
                } else {
                    format!("{}://{}:{}", scheme, host_part, port)
                }
            } else {
                // Malformed URL, fallback to safe default
                format!("http://localhost:{}", port)
            }
        } else {
            // No scheme, add http:// and port
            format!("http://{}:{}", host, port)
        }
    }

    /// Synthesize speech from the Chatterbox API with retry logic
    ///
    /// The response body is the raw WAV payload; the sample rate travels in
    /// the x-sample-rate header when the server reports one.
    pub async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesizedAudio> {
        let url = format!("{}/synthesize", self.base_url);

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
                            .and_then(|v| v.parse::<u32>().ok());

                        let audio = response.bytes().await
                            .map_err(|e| anyhow!("Failed to read audio bytes from Chatterbox API: {}", e))?;

                        if audio.is_empty() {
                            // An empty body on a 200 means the server dropped the generation
                            last_error = Some(anyhow!("Chatterbox API returned an empty audio body"));
                            error!("Chatterbox API returned an empty audio body - attempt {}/{}",
                                   attempt + 1, self.max_retries + 1);
                        } else {
                            return Ok(SynthesizedAudio { audio, sample_rate });
                        }
                    } else if status.is_server_error() {
                        // Server error - can retry
                        let error_text = response.text().await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        last_error = Some(anyhow!("Chatterbox API error ({}): {}", status, error_text));
                        error!("Chatterbox API error ({}): {} - attempt {}/{}", status, error_text, attempt + 1, self.max_retries + 1);
                    } else {
                        // Client error - don't retry
                        let error_text = response.text().await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!("Chatterbox API error ({}): {}", status, error_text);
                        return Err(anyhow!("Chatterbox API error ({}): {}", status, error_text));
                    }
                },
                Err(e) => {
                    // Network error - can retry
                    last_error = Some(anyhow!("Failed to send request to Chatterbox API: {}", e));
                    error!("Chatterbox API network error: {} - attempt {}/{}", last_error.as_ref().unwrap(), attempt + 1, self.max_retries + 1);
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
        Err(last_error.unwrap_or_else(|| anyhow!("Chatterbox API request failed after {} attempts", self.max_retries + 1)))
    }

    /// Get the Chatterbox server health status
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base_url);
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .context("Failed to connect to Chatterbox")?
            .json()
            .await
            .context("Failed to parse Chatterbox health response")?;

        let status = response["status"].as_str()
            .ok_or_else(|| anyhow!("Invalid status format in health response"))?
            .to_string();

        Ok(status)
    }
}
