/*!
 * Provider implementations for different speech synthesis services.
 *
 * This module contains client implementations for local TTS servers:
 * - Chatterbox: reference-audio voice cloning server
 * - Tortoise: multi-voice server with quality presets
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Synthesized audio returned by a speech provider
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Raw WAV payload, opaque above the provider layer
    pub audio: Bytes,

    /// Sample rate reported by the server, when available
    pub sample_rate: Option<u32>,
}

/// Common trait for all speech providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the synthesis service.
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Synthesize speech for a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to synthesize
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn synthesize(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract the audio payload from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `Bytes` - The raw audio bytes
    fn extract_audio(response: &Self::Response) -> Bytes;
}

pub mod chatterbox;
pub mod tortoise;
