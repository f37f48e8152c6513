/*!
 * Synthesized audio caching functionality.
 *
 * This module provides caching mechanisms for synthesized audio to avoid
 * redundant TTS requests. Scripts repeat short lines surprisingly often,
 * and every repeat saved is seconds of GPU time.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;

use crate::providers::SynthesizedAudio;

/// Cache key combining line text, voice reference, and provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Dialogue line text
    text: String,

    /// Voice reference path, empty when the provider default voice is used
    voice_path: String,

    /// Provider identifier
    provider: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(text: &str, voice_path: &str, provider: &str) -> Self {
        Self {
            text: text.to_string(),
            voice_path: voice_path.to_string(),
            provider: provider.to_string(),
        }
    }
}

/// Audio cache for storing and retrieving synthesized lines
pub struct AudioCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, SynthesizedAudio>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,
}

impl AudioCache {
    /// Create a new audio cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Get a synthesized line from the cache
    pub fn get(&self, text: &str, voice_path: &str, provider: &str) -> Option<SynthesizedAudio> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(text, voice_path, provider);
        let cache = self.cache.read();

        match cache.get(&key) {
            Some(audio) => {
                // Increment hit counter
                let mut hits = self.hits.write();
                *hits += 1;

                debug!("Cache hit for '{}' (voice: {})",
                       truncate_text(text, 30),
                       if voice_path.is_empty() { "default" } else { voice_path });

                Some(audio.clone())
            },
            None => {
                // Increment miss counter
                let mut misses = self.misses.write();
                *misses += 1;

                debug!("Cache miss for '{}' (voice: {})",
                       truncate_text(text, 30),
                       if voice_path.is_empty() { "default" } else { voice_path });

                None
            }
        }
    }

    /// Store a synthesized line in the cache
    pub fn store(&self, text: &str, voice_path: &str, provider: &str, audio: &SynthesizedAudio) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(text, voice_path, provider);
        let mut cache = self.cache.write();

        cache.insert(key, audio.clone());

        debug!("Cached {} bytes of audio for '{}'",
               audio.audio.len(),
               truncate_text(text, 30));
    }

    /// Get cache statistics
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.clear();

        let mut hits = self.hits.write();
        *hits = 0;

        let mut misses = self.misses.write();
        *misses = 0;

        debug!("Audio cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Enable or disable the cache
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for AudioCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for AudioCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            enabled: self.enabled,
        }
    }
}

/// Truncate text to a maximum number of characters with ellipsis
// PDF extraction produces curly quotes, so slice on char boundaries
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_length).collect();
        format!("{}...", truncated)
    }
}
