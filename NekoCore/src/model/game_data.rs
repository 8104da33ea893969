//! Extracted game text and bulk editing over it

use super::context::{BlockKind, ContextLabel};
use super::unit::TranslationUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Everything an engine extracted from one game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Units in extraction order.
    pub units: Vec<TranslationUnit>,
    /// Non-command text assets, carried through untouched.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

/// Result of a bulk replace over human translations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceResult {
    /// Number of units modified
    pub units_modified: usize,
    /// Total number of replacements made
    pub replacements: usize,
}

/// Translation progress for one block kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub total: usize,
    pub translated: usize,
}

/// Translation progress for a whole game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    pub total: usize,
    pub translated: usize,
    pub machine_only: usize,
    pub by_kind: BTreeMap<BlockKind, KindStats>,
    pub files: usize,
}

impl GameData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit for text found in `file`.
    pub fn push(&mut self, file: &str, kind: BlockKind, text: impl Into<String>) {
        let label = ContextLabel::new(file, kind);
        self.units.push(TranslationUnit::new(text, &label));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units whose label names `file`, in extraction order.
    pub fn units_for_file<'a>(
        &'a self,
        file: &'a str,
    ) -> impl Iterator<Item = &'a TranslationUnit> {
        self.units.iter().filter(move |unit| unit.file() == file)
    }

    /// Other units with the same original text as unit `id`.
    pub fn duplicates_of(&self, id: Uuid) -> impl Iterator<Item = &TranslationUnit> {
        let original = self
            .units
            .iter()
            .find(|unit| unit.id == id)
            .map(|unit| unit.original_text.as_str());
        self.units
            .iter()
            .filter(move |unit| unit.id != id && Some(unit.original_text.as_str()) == original)
    }

    /// Copy the human translation of unit `id` to every unit with the same
    /// original text. Returns the number of units changed.
    ///
    /// Units that already have a human translation are skipped unless
    /// `overwrite` is set. Nothing happens if unit `id` is untranslated.
    pub fn apply_to_duplicates(&mut self, id: Uuid, overwrite: bool) -> usize {
        let Some(source) = self.units.iter().find(|unit| unit.id == id) else {
            return 0;
        };
        if source.human_translation.is_empty() {
            return 0;
        }
        let original = source.original_text.clone();
        let translation = source.human_translation.clone();

        let mut changed = 0;
        for unit in &mut self.units {
            if unit.id == id || unit.original_text != original {
                continue;
            }
            if !overwrite && !unit.human_translation.is_empty() {
                continue;
            }
            if unit.human_translation != translation {
                unit.set_human_translation(translation.as_str());
                changed += 1;
            }
        }
        changed
    }

    /// Replace `find` with `replace` in every human translation, ignoring case.
    ///
    /// Units without a human translation are left alone.
    pub fn replace_in_translations(&mut self, find: &str, replace: &str) -> ReplaceResult {
        let mut result = ReplaceResult::default();
        if find.is_empty() {
            return result;
        }

        for unit in &mut self.units {
            if unit.human_translation.is_empty() {
                continue;
            }
            let (new_text, count) =
                replace_case_insensitive_counting(&unit.human_translation, find, replace);
            if count > 0 && new_text != unit.human_translation {
                unit.set_human_translation(new_text);
                result.units_modified += 1;
                result.replacements += count;
            }
        }

        result
    }

    #[must_use]
    pub fn stats(&self) -> TranslationStats {
        let mut stats = TranslationStats::default();
        let mut files = std::collections::BTreeSet::new();

        for unit in &self.units {
            stats.total += 1;
            files.insert(unit.file());
            let translated = unit.is_translated();
            if translated {
                stats.translated += 1;
            } else if !unit.machine_translation.trim().is_empty() {
                stats.machine_only += 1;
            }
            if let Some(kind) = unit.kind() {
                let entry = stats.by_kind.entry(kind).or_default();
                entry.total += 1;
                if translated {
                    entry.translated += 1;
                }
            }
        }

        stats.files = files.len();
        stats
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Case-insensitive replace with counting, safe for non-ASCII text
fn replace_case_insensitive_counting(text: &str, find: &str, replace: &str) -> (String, usize) {
    let mut result = String::with_capacity(text.len());
    let mut count = 0;
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(len) = match_prefix_ignore_case(rest, find) {
            result.push_str(replace);
            rest = &rest[len..];
            count += 1;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                result.push(c);
            }
            rest = chars.as_str();
        }
    }

    (result, count)
}

/// Byte length of the prefix of `text` matching `pattern` case-insensitively.
fn match_prefix_ignore_case(text: &str, pattern: &str) -> Option<usize> {
    let mut text_chars = text.char_indices();
    for p in pattern.chars() {
        let (_, t) = text_chars.next()?;
        if !t.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
    }
    Some(text_chars.next().map_or(text.len(), |(i, _)| i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> GameData {
        let mut data = GameData::new();
        data.push("Map001.json", BlockKind::ShowText, "Hello");
        data.push("Map001.json", BlockKind::Choice, "Yes");
        data.push("Actors.json", BlockKind::Name, "Harold");
        data
    }

    #[test]
    fn test_units_for_file() {
        let data = sample();
        let texts: Vec<_> = data
            .units_for_file("Map001.json")
            .map(|u| u.original_text.as_str())
            .collect();
        assert_eq!(texts, vec!["Hello", "Yes"]);
    }

    #[test]
    fn test_replace_in_translations() {
        let mut data = sample();
        data.units[0].set_human_translation("Hello HERO, hello world");
        data.units[1].set_human_translation("Hero? Ja");

        let result = data.replace_in_translations("hero", "Héroïne");
        assert_eq!(result, ReplaceResult { units_modified: 2, replacements: 2 });
        assert_eq!(data.units[0].human_translation, "Hello Héroïne, hello world");
        assert_eq!(data.units[1].human_translation, "Héroïne? Ja");
        assert_eq!(data.units[2].human_translation, "");
    }

    #[test]
    fn test_replace_non_ascii_pattern() {
        let (text, count) =
            replace_case_insensitive_counting("ÄPFEL und äpfel", "äpfel", "Birnen");
        assert_eq!(text, "Birnen und Birnen");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_stats() {
        let mut data = sample();
        data.units[0].set_human_translation("Salut");
        data.units[2].machine_translation = "Harald".to_string();

        let stats = data.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.translated, 1);
        assert_eq!(stats.machine_only, 1);
        assert_eq!(stats.files, 2);
        assert_eq!(
            stats.by_kind.get(&BlockKind::ShowText),
            Some(&KindStats { total: 1, translated: 1 })
        );
    }

    fn with_duplicates() -> GameData {
        let mut data = GameData::new();
        data.push("Map001.json", BlockKind::Choice, "Yes");
        data.push("Map002.json", BlockKind::Choice, "Yes");
        data.push("Map003.json", BlockKind::ShowText, "Yes");
        data.push("Map003.json", BlockKind::Choice, "No");
        data
    }

    #[test]
    fn test_apply_to_duplicates_skips_translated() {
        let mut data = with_duplicates();
        data.units[2].set_human_translation("Oui.");
        data.units[0].set_human_translation("Oui");
        let id = data.units[0].id;

        assert_eq!(data.duplicates_of(id).count(), 2);
        assert_eq!(data.apply_to_duplicates(id, false), 1);
        assert_eq!(data.units[1].human_translation, "Oui");
        assert!(data.units[1].translated_at.is_some());
        assert_eq!(data.units[2].human_translation, "Oui.");
        assert_eq!(data.units[3].human_translation, "");
    }

    #[test]
    fn test_apply_to_duplicates_overwrites() {
        let mut data = with_duplicates();
        data.units[2].set_human_translation("Oui.");
        data.units[0].set_human_translation("Oui");
        let id = data.units[0].id;

        assert_eq!(data.apply_to_duplicates(id, true), 2);
        assert_eq!(data.units[2].human_translation, "Oui");
        // Already matching units are not counted again
        assert_eq!(data.apply_to_duplicates(id, true), 0);
    }

    #[test]
    fn test_apply_to_duplicates_needs_translation() {
        let mut data = with_duplicates();
        let id = data.units[0].id;
        assert_eq!(data.apply_to_duplicates(id, true), 0);
        assert_eq!(data.apply_to_duplicates(Uuid::new_v4(), true), 0);
        assert_eq!(data.duplicates_of(Uuid::new_v4()).count(), 0);
    }
}
