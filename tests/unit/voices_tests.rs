/*!
 * Tests for character voice registry functionality
 */

use std::collections::HashMap;
use scriptcast::synthesis::{VoiceReference, VoiceRegistry};

#[test]
fn test_registry_new_shouldStartEmpty() {
    let registry = VoiceRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[test]
fn test_registry_assign_withValidEntry_shouldResolve() {
    let registry = VoiceRegistry::new();
    registry.assign("JOHN", "voices/john.wav");

    let voice = registry.resolve("JOHN").unwrap();
    assert_eq!(voice, VoiceReference::new("JOHN", "voices/john.wav"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_resolve_withDifferentCase_shouldFindSameVoice() {
    let registry = VoiceRegistry::new();
    registry.assign("John", "voices/john.wav");

    // Lookups normalize the name before matching
    assert!(registry.resolve("JOHN").is_some());
    assert!(registry.resolve("john").is_some());
    assert!(registry.resolve("  John  ").is_some());

    // The stored reference keeps the original spelling
    assert_eq!(registry.resolve("JOHN").unwrap().character, "John");
}

#[test]
fn test_registry_resolve_withUnknownCharacter_shouldReturnNone() {
    let registry = VoiceRegistry::new();
    registry.assign("JOHN", "voices/john.wav");

    assert!(registry.resolve("MARY").is_none());
}

#[test]
fn test_registry_assign_withSameCharacter_shouldReplaceVoice() {
    let registry = VoiceRegistry::new();
    registry.assign("JOHN", "voices/john_old.wav");
    registry.assign("john", "voices/john_new.wav");

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.resolve("JOHN").unwrap().audio_path, "voices/john_new.wav");
}

#[test]
fn test_registry_assign_withEmptyName_shouldIgnoreAssignment() {
    let registry = VoiceRegistry::new();
    registry.assign("", "voices/unnamed.wav");
    registry.assign("   ", "voices/blank.wav");

    assert!(registry.is_empty());
}

#[test]
fn test_registry_from_map_withConfigAssignments_shouldLoadAll() {
    let mut assignments = HashMap::new();
    assignments.insert("JOHN".to_string(), "voices/john.wav".to_string());
    assignments.insert("Mary".to_string(), "voices/mary.wav".to_string());

    let registry = VoiceRegistry::from_map(&assignments);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.resolve("MARY").unwrap().audio_path, "voices/mary.wav");
}

#[test]
fn test_registry_missing_voices_withPartialCoverage_shouldListUncoveredInOrder() {
    let registry = VoiceRegistry::new();
    registry.assign("JOHN", "voices/john.wav");

    let missing = registry.missing_voices(&["JOHN", "BARISTA", "MARY"]);
    assert_eq!(missing, vec!["BARISTA", "MARY"]);

    // Case differences do not count as missing
    let missing = registry.missing_voices(&["john"]);
    assert!(missing.is_empty());
}

#[test]
fn test_registry_clone_shouldShareAssignments() {
    let registry1 = VoiceRegistry::new();
    let registry2 = registry1.clone();

    registry1.assign("JOHN", "voices/john.wav");

    // Both handles see the same storage
    assert!(registry2.resolve("JOHN").is_some());
    assert_eq!(registry2.len(), 1);
}
