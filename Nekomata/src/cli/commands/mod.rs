use clap::Subcommand;
use std::path::PathBuf;

use uuid::Uuid;

use crate::Toolkit;

pub mod apply;
pub mod new;
pub mod propagate;
pub mod replace;
pub mod status;

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a game's text into a new project file
    New {
        /// Game directory (or executable for VX/VX Ace)
        game: PathBuf,

        /// Engine name to use when detection fails
        #[arg(short, long)]
        engine: Option<String>,

        /// Project file to create
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write translated data files for a project
    Apply {
        /// Project file
        project: PathBuf,

        /// Output directory for the rewritten data files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Find and replace text in human translations (case-insensitive)
    Replace {
        /// Project file
        project: PathBuf,

        /// Text to find
        #[arg(long)]
        find: String,

        /// Replacement text
        #[arg(long)]
        replace: String,
    },

    /// Copy one unit's translation to every unit with the same original text
    Propagate {
        /// Project file
        project: PathBuf,

        /// Id of the translated unit to copy from
        #[arg(long)]
        unit: Uuid,

        /// Also replace translations that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// Show translation progress for a project
    Status {
        /// Project file
        project: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self, toolkit: &Toolkit) -> anyhow::Result<()> {
        match self {
            Commands::New {
                game,
                engine,
                output,
            } => new::execute(toolkit, game, engine.as_deref(), output),
            Commands::Apply { project, output } => apply::execute(toolkit, project, output),
            Commands::Replace {
                project,
                find,
                replace,
            } => replace::execute(project, find, replace),
            Commands::Propagate {
                project,
                unit,
                overwrite,
            } => propagate::execute(project, *unit, *overwrite),
            Commands::Status { project } => status::execute(project),
        }
    }
}
