//! Translation data model shared by every engine

mod context;
mod game_data;
mod unit;

pub use context::{BlockKind, ContextLabel};
pub use game_data::{GameData, KindStats, ReplaceResult, TranslationStats};
pub use unit::TranslationUnit;
