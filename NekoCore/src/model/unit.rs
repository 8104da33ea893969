//! Translation units

use super::context::{BlockKind, ContextLabel};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One extracted block of text and its translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub original_text: String,
    #[serde(default)]
    pub machine_translation: String,
    #[serde(default)]
    pub human_translation: String,
    /// `"<file> (<kind>)"` label.
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_at: Option<DateTime<Utc>>,
}

impl TranslationUnit {
    #[must_use]
    pub fn new(original_text: impl Into<String>, label: &ContextLabel) -> Self {
        TranslationUnit {
            id: Uuid::new_v4(),
            project_id: None,
            original_text: original_text.into(),
            machine_translation: String::new(),
            human_translation: String::new(),
            context: label.to_string(),
            translated_at: None,
        }
    }

    pub fn label(&self) -> Result<ContextLabel> {
        ContextLabel::parse(&self.context)
    }

    /// Source file name taken from the context label.
    #[must_use]
    pub fn file(&self) -> &str {
        ContextLabel::file_of(&self.context)
    }

    /// Set the human translation and stamp the edit time.
    pub fn set_human_translation(&mut self, text: impl Into<String>) {
        self.human_translation = text.into();
        self.translated_at = Some(Utc::now());
    }

    #[must_use]
    pub fn is_translated(&self) -> bool {
        !self.human_translation.trim().is_empty()
    }

    /// Text to reinject: human if present, then machine when allowed.
    #[must_use]
    pub fn replacement(&self, use_machine: bool) -> Option<&str> {
        if !self.human_translation.trim().is_empty() {
            Some(&self.human_translation)
        } else if use_machine && !self.machine_translation.trim().is_empty() {
            Some(&self.machine_translation)
        } else {
            None
        }
    }

    /// Kind parsed from the label, if the label is well-formed.
    #[must_use]
    pub fn kind(&self) -> Option<BlockKind> {
        self.label().ok().map(|label| label.kind)
    }
}
