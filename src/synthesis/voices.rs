/*!
 * Character to voice reference mapping.
 *
 * This module maps script character names to reference audio clips used
 * for voice cloning. Lookups are case insensitive so that "John", "JOHN"
 * and "john" in config all resolve to the same voice.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::{debug, warn};

/// Reference audio clip assigned to a character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReference {
    /// Character name as it appears in the script
    pub character: String,

    /// Path to the reference audio clip
    pub audio_path: String,
}

impl VoiceReference {
    /// Create a new voice reference
    pub fn new(character: &str, audio_path: &str) -> Self {
        Self {
            character: character.to_string(),
            audio_path: audio_path.to_string(),
        }
    }
}

/// Registry of character voice assignments
pub struct VoiceRegistry {
    /// Internal voice storage, keyed by normalized character name
    voices: Arc<RwLock<HashMap<String, VoiceReference>>>,
}

impl VoiceRegistry {
    /// Create an empty voice registry
    pub fn new() -> Self {
        Self {
            voices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build a registry from a character to path mapping
    pub fn from_map(assignments: &HashMap<String, String>) -> Self {
        let registry = Self::new();

        for (character, audio_path) in assignments {
            registry.assign(character, audio_path);
        }

        registry
    }

    /// Assign a reference clip to a character
    pub fn assign(&self, character: &str, audio_path: &str) {
        let key = normalize_name(character);

        if key.is_empty() {
            warn!("Ignoring voice assignment with an empty character name");
            return;
        }

        let mut voices = self.voices.write();
        if voices.insert(key, VoiceReference::new(character, audio_path)).is_some() {
            debug!("Replaced voice assignment for '{}'", character);
        } else {
            debug!("Assigned voice '{}' to '{}'", audio_path, character);
        }
    }

    /// Resolve the voice assigned to a character
    pub fn resolve(&self, character: &str) -> Option<VoiceReference> {
        let key = normalize_name(character);
        let voices = self.voices.read();

        match voices.get(&key) {
            Some(voice) => Some(voice.clone()),
            None => {
                debug!("No voice assigned to '{}', provider default will be used", character);
                None
            }
        }
    }

    /// List characters from the given set that have no voice assigned
    pub fn missing_voices(&self, characters: &[&str]) -> Vec<String> {
        let voices = self.voices.read();

        characters.iter()
            .filter(|name| !voices.contains_key(&normalize_name(name)))
            .map(|name| name.to_string())
            .collect()
    }

    /// Get the number of voice assignments
    pub fn len(&self) -> usize {
        self.voices.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.voices.read().is_empty()
    }
}

impl Default for VoiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VoiceRegistry {
    fn clone(&self) -> Self {
        Self {
            voices: self.voices.clone(),
        }
    }
}

/// Normalize a character name for case insensitive lookup
fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}
