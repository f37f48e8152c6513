use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use serde::Serialize;
use log::{debug, warn};

// @module: Screenplay text classification and dialogue segmentation

// @const: Structural noise patterns, checked before cue matching, first match wins
static IGNORE_PATTERNS: Lazy<[Regex; 5]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^\s*(INT\.|EXT\.)").unwrap(),
        Regex::new(r"(?i)^\s*(FADE IN|FADE OUT|CUT TO)").unwrap(),
        Regex::new(r"(?i)^\s*\([^)]*\)$").unwrap(),
        Regex::new(r"^\s*[0-9]+\.$").unwrap(),
        Regex::new(r"(?i)^\s*(CONTINUED|CONT'D)").unwrap(),
    ]
});

// @const: Character cue shape: all-caps token run, optionally colon-terminated
static CHARACTER_CUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Z\s.'-]*:?$").unwrap()
});

// @const: Parenthetical spans stripped from dialogue text
static PARENTHETICAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^)]*\)").unwrap()
});

// @enum: Classification of a single script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    // @variant: Structural noise, contributes nothing downstream
    Ignorable,

    // @variant: Character cue with the normalized speaker name
    CharacterCue { name: String },

    // @variant: Dialogue or action text, cleaned
    Content { text: String },
}

/// Line-by-line screenplay classifier and segmentation driver.
///
/// Stateless: all state lives inside a single `parse` call, so the parser
/// can be shared freely across threads.
pub struct ScriptParser;

impl ScriptParser {
    /// Classify one raw script line.
    ///
    /// Precedence is strict: empty, ignore rules, cue shape (length-gated,
    /// validator-checked), then content cleaning. A cue candidate rejected by
    /// the validator falls through to content handling, it is never retried,
    /// except denylisted names which are structural markup and never count
    /// as dialogue either.
    pub fn classify_line(line: &str) -> LineClass {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineClass::Ignorable;
        }

        if IGNORE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
            return LineClass::Ignorable;
        }

        // Cue candidates are short lines; anything outside the window is
        // dialogue or prose, never a speaker name
        let length = trimmed.chars().count();
        if (2..=50).contains(&length) {
            if let Some(name) = Self::extract_cue_name(trimmed) {
                if Self::is_valid_character_name(&name) {
                    return LineClass::CharacterCue { name };
                }

                // Denylisted cue shapes like THE END are markup the ignore
                // rules missed, not dialogue spoken by the active character
                if Self::is_false_positive_cue(&name.to_uppercase()) {
                    return LineClass::Ignorable;
                }
            }
        }

        match Self::clean_dialogue_line(trimmed) {
            Some(text) => LineClass::Content { text },
            None => LineClass::Ignorable,
        }
    }

    // @returns: Normalized cue candidate when the line has the cue shape
    fn extract_cue_name(line: &str) -> Option<String> {
        if !CHARACTER_CUE_REGEX.is_match(line) {
            return None;
        }

        let without_colon = line.strip_suffix(':').unwrap_or(line);
        let name = without_colon
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        Some(name)
    }

    /// Validate a normalized cue as a plausible character name.
    ///
    /// Pure predicate over the name alone; no document context is consulted.
    pub fn is_valid_character_name(name: &str) -> bool {
        let length = name.chars().count();
        if !(2..=30).contains(&length) {
            return false;
        }

        if Self::is_false_positive_cue(&name.to_uppercase()) {
            return false;
        }

        // Must contain at least one letter
        name.chars().any(|c| c.is_ascii_alphabetic())
    }

    /// Check if an uppercased cue is a known structural marker rather than a name
    fn is_false_positive_cue(name: &str) -> bool {
        matches!(
            name,
            "THE END"
                | "TITLE CARD"
                | "MONTAGE"
                | "SERIES OF SHOTS"
                | "LATER"
                | "MEANWHILE"
                | "SAME TIME"
                | "MOMENTS LATER"
                | "FLASHBACK"
                | "DREAM SEQUENCE"
                | "VOICE OVER"
                | "V.O."
                | "O.S."
                | "OFF SCREEN"
                | "NARRATION"
        )
    }

    // @returns: Cleaned dialogue text, or None for degenerate leftovers
    fn clean_dialogue_line(line: &str) -> Option<String> {
        let without_parens = PARENTHETICAL_REGEX.replace_all(line, "");
        let cleaned = without_parens
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        // Shorter than 3 chars after cleaning is a formatting artifact
        if cleaned.chars().count() < 3 {
            None
        } else {
            Some(cleaned)
        }
    }

    /// Segment raw script text into per-character dialogue.
    ///
    /// Single forward pass. Content lines accumulate under the most recent
    /// valid cue; a new cue or the end of input flushes the buffer. Content
    /// seen before any cue is dropped. Empty or malformed text yields an
    /// empty mapping, never an error.
    pub fn parse(raw_text: &str) -> ScriptDialogue {
        let mut dialogue = ScriptDialogue::new();

        // State variables for segmentation
        let mut current_character: Option<String> = None;
        let mut pending_lines: Vec<String> = Vec::new();

        // Helper to flush the accumulated buffer into the mapping
        let mut flush_pending = |character: &Option<String>, lines: &mut Vec<String>| {
            if let Some(name) = character {
                if lines.is_empty() {
                    debug!("Character cue '{}' had no dialogue before the next cue", name);
                } else {
                    dialogue.add_lines(name, std::mem::take(lines));
                }
            }
        };

        for raw_line in raw_text.lines() {
            match Self::classify_line(raw_line) {
                LineClass::CharacterCue { name } => {
                    flush_pending(&current_character, &mut pending_lines);
                    current_character = Some(name);
                    pending_lines.clear();
                }
                LineClass::Content { text } => {
                    if current_character.is_some() {
                        pending_lines.push(text);
                    } else {
                        debug!("Dropping unattributed line before first cue: {}", text);
                    }
                }
                LineClass::Ignorable => {}
            }
        }

        // Flush the last character's buffer
        flush_pending(&current_character, &mut pending_lines);

        // Entries with an empty name or no lines carry nothing downstream
        dialogue.characters.retain(|c| {
            let keep = !c.name.is_empty() && !c.lines.is_empty();
            if !keep {
                warn!("Dropping degenerate dialogue entry for '{}'", c.name);
            }
            keep
        });

        if dialogue.is_empty() {
            warn!("No character dialogue found in script text");
        }

        dialogue
    }
}

// @struct: One character's dialogue in script order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterDialogue {
    // @field: Normalized character name
    pub name: String,

    // @field: Cleaned dialogue lines, in order of appearance
    pub lines: Vec<String>,
}

/// Mapping from characters to their dialogue, ordered by first appearance.
///
/// Backed by a vector so serialization keeps the appearance order a JSON
/// object would lose. Names are unique; every entry holds at least one line.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ScriptDialogue {
    pub characters: Vec<CharacterDialogue>,
}

impl ScriptDialogue {
    /// Create an empty mapping
    pub fn new() -> Self {
        ScriptDialogue {
            characters: Vec::new(),
        }
    }

    /// Append lines to a character, creating the entry on first appearance
    pub fn add_lines(&mut self, name: &str, lines: Vec<String>) {
        if let Some(existing) = self.characters.iter_mut().find(|c| c.name == name) {
            existing.lines.extend(lines);
        } else {
            self.characters.push(CharacterDialogue {
                name: name.to_string(),
                lines,
            });
        }
    }

    /// Look up one character's dialogue by exact name
    pub fn get(&self, name: &str) -> Option<&CharacterDialogue> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Character names in order of first appearance - used by tests and external consumers
    #[allow(dead_code)]
    pub fn character_names(&self) -> Vec<&str> {
        self.characters.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of speaking characters
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// True when no character survived segmentation
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Total dialogue lines across all characters
    pub fn total_line_count(&self) -> usize {
        self.characters.iter().map(|c| c.lines.len()).sum()
    }

    /// Derive summary statistics; recomputed on every call
    pub fn summary(&self) -> ScriptSummary {
        let characters = self
            .characters
            .iter()
            .map(|c| CharacterStats {
                name: c.name.clone(),
                line_count: c.lines.len(),
                total_words: c.lines.iter().map(|l| l.split_whitespace().count()).sum(),
                sample_line: c.lines.first().cloned().unwrap_or_default(),
            })
            .collect();

        ScriptSummary {
            character_count: self.characters.len(),
            total_dialogue_lines: self.total_line_count(),
            characters,
        }
    }
}

impl fmt::Display for ScriptDialogue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Script Dialogue")?;
        writeln!(f, "Characters: {}", self.characters.len())?;
        writeln!(f, "Lines: {}", self.total_line_count())?;
        Ok(())
    }
}

// @struct: Per-character summary statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterStats {
    // @field: Character name
    pub name: String,

    // @field: Retained dialogue lines
    pub line_count: usize,

    // @field: Whitespace-separated words across all lines
    pub total_words: usize,

    // @field: First retained line, empty when none
    pub sample_line: String,
}

/// Summary statistics for a parsed script
#[derive(Debug, Clone, Serialize)]
pub struct ScriptSummary {
    /// Number of speaking characters
    pub character_count: usize,

    /// Dialogue lines across all characters
    pub total_dialogue_lines: usize,

    /// Per-character statistics, in order of first appearance
    pub characters: Vec<CharacterStats>,
}

impl fmt::Display for ScriptSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Found {} characters with {} total dialogue lines",
            self.character_count, self.total_dialogue_lines
        )?;
        for stats in &self.characters {
            writeln!(
                f,
                "{}: {} lines ({} words)",
                stats.name, stats.line_count, stats.total_words
            )?;
            if !stats.sample_line.is_empty() {
                writeln!(f, "  Sample: \"{}\"", stats.sample_line)?;
            }
        }
        Ok(())
    }
}
