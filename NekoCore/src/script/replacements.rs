//! Replacement lookup used during reinjection
//!
//! Keys are the block kind plus the original text. Each key holds one slot per
//! extracted occurrence, in extraction order, so a text that appears several
//! times in a file can be translated differently at each place. The re-scan
//! during apply consumes slots in the same order.

use crate::model::{BlockKind, TranslationUnit};
use std::collections::HashMap;

type Key = (BlockKind, String);

#[derive(Debug, Clone, Default)]
pub struct Replacements {
    slots: HashMap<Key, Vec<Option<String>>>,
    cursors: HashMap<Key, usize>,
}

impl Replacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup from units in extraction order.
    ///
    /// Units with an unparseable label are skipped.
    pub fn from_units<'a, I>(units: I, use_machine: bool) -> Self
    where
        I: IntoIterator<Item = &'a TranslationUnit>,
    {
        let mut replacements = Replacements::new();
        for unit in units {
            let Some(kind) = unit.kind() else {
                tracing::debug!("Skipping unit with bad context label {:?}", unit.context);
                continue;
            };
            replacements.push(kind, &unit.original_text, unit.replacement(use_machine));
        }
        replacements
    }

    /// Register the next occurrence of `original`.
    ///
    /// A missing replacement, or one identical to the original, still takes a
    /// slot so later occurrences keep their positions, but it is never
    /// returned.
    pub fn push(&mut self, kind: BlockKind, original: &str, replacement: Option<&str>) {
        let replacement = replacement
            .filter(|text| *text != original)
            .map(str::to_string);
        self.slots
            .entry((kind, original.to_string()))
            .or_default()
            .push(replacement);
    }

    /// Whether nothing would be rewritten.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.values().flatten().all(Option::is_none)
    }

    /// Replacement for the next occurrence of `original`.
    ///
    /// Occurrences past the registered ones (the file changed since
    /// extraction) fall back to the last registered replacement.
    pub fn take(&mut self, kind: BlockKind, original: &str) -> Option<String> {
        let key = (kind, original.to_string());
        let slots = self.slots.get(&key)?;
        let cursor = self.cursors.entry(key).or_insert(0);
        let slot = match slots.get(*cursor) {
            Some(slot) => slot.clone(),
            None => slots.iter().rev().find_map(Clone::clone),
        };
        *cursor += 1;
        slot
    }
}
