use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Speech synthesis config
    pub synthesis: SynthesisConfig,

    /// Character voice assignments, mapping character names to reference audio clips
    #[serde(default)]
    pub voices: HashMap<String, String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProvider {
    // @provider: Chatterbox
    #[default]
    Chatterbox,
    // @provider: Tortoise
    Tortoise,
}

impl SynthesisProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Chatterbox => "Chatterbox",
            Self::Tortoise => "Tortoise",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Chatterbox => "chatterbox".to_string(),
            Self::Tortoise => "tortoise".to_string(),
        }
    }
}

// Implement Display trait for SynthesisProvider
impl std::fmt::Display for SynthesisProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SynthesisProvider
impl std::str::FromStr for SynthesisProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chatterbox" => Ok(Self::Chatterbox),
            "tortoise" => Ok(Self::Tortoise),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Quality preset (Tortoise only)
    #[serde(default = "String::new")]
    pub preset: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: SynthesisProvider) -> Self {
        match provider_type {
            SynthesisProvider::Chatterbox => Self {
                provider_type: "chatterbox".to_string(),
                endpoint: default_chatterbox_endpoint(),
                preset: String::new(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_local_rate_limit(),
            },
            SynthesisProvider::Tortoise => Self {
                provider_type: "tortoise".to_string(),
                endpoint: default_tortoise_endpoint(),
                preset: default_tortoise_preset(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_tortoise_timeout_secs(),
                rate_limit: default_local_rate_limit(),
            },
        }
    }
}

/// Speech synthesis service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Synthesis provider to use
    #[serde(default)]
    pub provider: SynthesisProvider,

    /// Available synthesis providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common synthesis settings
    #[serde(default)]
    pub common: SynthesisCommonConfig,
}

/// Common synthesis settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisCommonConfig {
    /// Expressiveness of generated speech, 0.0 to 1.0 (Chatterbox)
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,

    /// Sampling temperature for generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more varied
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Rate limit delay in milliseconds between consecutive requests
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SynthesisCommonConfig {
    fn default() -> Self {
        Self {
            exaggeration: default_exaggeration(),
            temperature: default_temperature(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_concurrent_requests() -> usize {
    2 // TTS servers are GPU-bound; keep parallelism low by default
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_tortoise_timeout_secs() -> u64 {
    600 // Slow presets can take minutes per line
}

fn default_rate_limit_delay_ms() -> u64 {
    500 // 500ms default delay between requests
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_exaggeration() -> f32 {
    0.5
}

fn default_temperature() -> f32 {
    0.8
}

fn default_chatterbox_endpoint() -> String {
    "http://localhost:7860".to_string()
}

fn default_tortoise_endpoint() -> String {
    "http://localhost:7862".to_string()
}

fn default_tortoise_preset() -> String {
    crate::providers::tortoise::DEFAULT_PRESET.to_string()
}

// Local TTS servers; do not enforce rate limiting by default
fn default_local_rate_limit() -> Option<u32> {
    None
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate the preset when Tortoise is the active provider
        if self.synthesis.provider == SynthesisProvider::Tortoise {
            let preset = self.synthesis.get_preset();
            if !crate::providers::tortoise::is_supported_preset(&preset) {
                return Err(anyhow!(
                    "Unsupported Tortoise preset: '{}'. Supported presets: {}",
                    preset,
                    crate::providers::tortoise::SUPPORTED_PRESETS.join(", ")
                ));
            }
        }

        // Voice assignments must carry a reference path
        for (character, voice_path) in &self.voices {
            if character.trim().is_empty() {
                return Err(anyhow!("Voice assignment with an empty character name"));
            }
            if voice_path.trim().is_empty() {
                return Err(anyhow!(
                    "Voice reference path for character '{}' is empty",
                    character
                ));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            synthesis: SynthesisConfig::default(),
            voices: HashMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl SynthesisConfig {
    pub fn optimal_concurrent_requests(&self) -> usize {
        // Check if the provider exists in the available_providers
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.concurrent_requests;
        }

        // Default fallback
        default_concurrent_requests()
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a specific provider configuration by type for testing
    pub fn get_provider_config(&self, provider_type: &SynthesisProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            SynthesisProvider::Chatterbox => default_chatterbox_endpoint(),
            SynthesisProvider::Tortoise => default_tortoise_endpoint(),
        }
    }

    /// Get the quality preset for the active provider
    pub fn get_preset(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.preset.is_empty() {
                return provider_config.preset.clone();
            }
        }

        // Default fallback - only Tortoise uses presets
        match self.provider {
            SynthesisProvider::Chatterbox => String::new(),
            SynthesisProvider::Tortoise => default_tortoise_preset(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        // Default fallback based on provider type
        match self.provider {
            SynthesisProvider::Chatterbox => default_timeout_secs(),
            SynthesisProvider::Tortoise => default_tortoise_timeout_secs(),
        }
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        // Default fallback
        default_local_rate_limit()
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: SynthesisProvider::default(),
            available_providers: Vec::new(),
            common: SynthesisCommonConfig::default(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(SynthesisProvider::Chatterbox));
        config.available_providers.push(ProviderConfig::new(SynthesisProvider::Tortoise));

        config
    }
}
