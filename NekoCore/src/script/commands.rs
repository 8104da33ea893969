//! Event command list abstraction

use crate::error::Result;

/// "Show Text" continuation line; consecutive ones form a text block.
pub const CODE_SHOW_TEXT: i64 = 401;
/// "Show Choices"; parameter 0 is the list of choice strings.
pub const CODE_SHOW_CHOICES: i64 = 102;

/// An ordered, resizable list of `{code, parameters}` event commands.
///
/// Indices are positions in the list at the time of the call. Readers return
/// `None` for commands that lack the requested shape; writers fail with
/// [`crate::Error::MalformedCommand`] instead.
pub trait CommandList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn code(&self, index: usize) -> Option<i64>;

    /// `parameters[0]` as a string.
    fn text(&self, index: usize) -> Option<String>;

    fn set_text(&mut self, index: usize, text: &str) -> Result<()>;

    /// `parameters[0]` as a list of strings; non-string entries are `None`.
    fn choices(&self, index: usize) -> Option<Vec<Option<String>>>;

    fn set_choice(&mut self, index: usize, choice: usize, text: &str) -> Result<()>;

    /// Insert a deep copy of the command at `template` so it lands at `at`.
    fn insert_clone(&mut self, template: usize, at: usize) -> Result<()>;

    fn remove(&mut self, index: usize) -> Result<()>;
}
