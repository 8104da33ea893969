//! Context labels correlating extracted text with its source file

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of text block a translation unit was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "Show Text")]
    ShowText,
    Choice,
    #[serde(rename = "Map Name")]
    MapName,
    Name,
    Description,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::ShowText,
        BlockKind::Choice,
        BlockKind::MapName,
        BlockKind::Name,
        BlockKind::Description,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::ShowText => "Show Text",
            BlockKind::Choice => "Choice",
            BlockKind::MapName => "Map Name",
            BlockKind::Name => "Name",
            BlockKind::Description => "Description",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BlockKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| Error::InvalidContextLabel(s.to_string()))
    }
}

/// A parsed `"<file> (<kind>)"` label.
///
/// The file part is the token before the first space, so source file names
/// are expected not to contain spaces (RPG Maker data files never do).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextLabel {
    pub file: String,
    pub kind: BlockKind,
}

impl ContextLabel {
    #[must_use]
    pub fn new(file: impl Into<String>, kind: BlockKind) -> Self {
        ContextLabel {
            file: file.into(),
            kind,
        }
    }

    /// Parse a label string.
    pub fn parse(label: &str) -> Result<Self> {
        let invalid = || Error::InvalidContextLabel(label.to_string());
        let (file, rest) = label.split_once(' ').ok_or_else(invalid)?;
        let kind = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(invalid)?;
        if file.is_empty() {
            return Err(invalid());
        }
        Ok(ContextLabel::new(file, kind.parse()?))
    }

    /// File name token of a label, without validating the kind.
    #[must_use]
    pub fn file_of(label: &str) -> &str {
        label.split(' ').next().unwrap_or(label)
    }
}

impl fmt::Display for ContextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.kind)
    }
}

impl FromStr for ContextLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ContextLabel::parse(s)
    }
}
