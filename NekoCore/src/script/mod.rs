//! Event command text extraction and reinjection
//!
//! The algorithm is written once against [`CommandList`] and runs over both
//! JSON command arrays (MV/MZ) and Marshal command arrays (VX/VX Ace).

mod commands;
mod graph_list;
mod json_list;
mod reconcile;
mod replacements;

pub use commands::{CODE_SHOW_CHOICES, CODE_SHOW_TEXT, CommandList};
pub use graph_list::GraphCommandList;
pub use reconcile::{apply_commands, extract_commands};
pub use replacements::Replacements;
