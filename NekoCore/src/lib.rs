//! # NekoCore
//!
//! A pure-Rust library for pulling translatable text out of RPG Maker games
//! and writing translations back in.
//!
//! ## Supported Engines
//!
//! - **RPG Maker MV/MZ** - JSON data files under `www/data` or `data`
//! - **RPG Maker VX/VX Ace** - Ruby Marshal 4.8 data files (`.rvdata`, `.rvdata2`)
//!   unpacked from the game archive into a staging directory
//!
//! ## Quick Start
//!
//! ### Extracting and Reinjecting Text
//!
//! ```no_run
//! use nekocore::engines::EngineRegistry;
//! use std::path::Path;
//!
//! let registry = EngineRegistry::default();
//! let engine = registry.resolve(Path::new("MyGame"), None)?;
//!
//! let mut data = engine.load(Path::new("MyGame"))?;
//! data.units[0].set_human_translation("Hello!");
//!
//! let report = engine.apply(&data, Path::new("MyGame"), Path::new("out"))?;
//! println!("{} file(s) rewritten", report.rewritten.len());
//! # Ok::<(), nekocore::Error>(())
//! ```
//!
//! ### Reading Marshal Files
//!
//! ```no_run
//! use nekocore::formats::marshal::{read_marshal, write_marshal};
//!
//! let doc = read_marshal("Data/Map001.rvdata2")?;
//! write_marshal(&doc, "Map001.copy.rvdata2")?;
//! # Ok::<(), nekocore::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `nekocore` command-line binary

pub mod converter;
pub mod engines;
pub mod error;
pub mod formats;
pub mod model;
pub mod script;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::marshal::{
        Graph, MarshalDocument, Node, NodeId, Symbol, Value, read_marshal, write_marshal,
    };

    pub use crate::engines::{
        ApplyOptions, ApplyReport, EngineAdapter, EngineRegistry, JsonStyle, RpgMakerMv,
        RpgMakerVx, VxOptions,
    };
    pub use crate::model::{
        BlockKind, ContextLabel, GameData, ReplaceResult, TranslationStats, TranslationUnit,
    };
    pub use crate::script::{CommandList, Replacements, apply_commands, extract_commands};

    pub use crate::converter;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
