/*!
 * Speech synthesis service for voicing script dialogue with TTS providers.
 *
 * This module contains the core functionality for turning classified
 * dialogue lines into audio using local TTS servers. It is split into
 * several submodules:
 *
 * - `core`: Core synthesis functionality and service definition
 * - `batch`: Batch processing of dialogue lines
 * - `cache`: Caching mechanisms for synthesized audio
 * - `voices`: Character to voice reference mapping
 * - `output`: Audio file and manifest writing
 */

// Re-export main types for easier usage
pub use self::batch::{BatchSynthesizer, SynthesizedLine};
pub use self::core::{LogEntry, SynthesisService, SynthesisStats};

// Re-export voice mapping types
pub use self::voices::{VoiceReference, VoiceRegistry};

// Re-export output types
pub use self::output::{AudioManifest, AudioWriter};

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
pub mod output;
pub mod voices;
