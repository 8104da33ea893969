use clap::Subcommand;
use std::path::PathBuf;

pub mod detect;
pub mod dump;
pub mod extract;
pub mod roundtrip;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the engine that would handle a game directory
    Detect {
        /// Game directory (or executable for VX/VX Ace)
        path: PathBuf,

        /// Engine name to fall back to when detection fails
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// Extract translation units from a game
    Extract {
        /// Game directory (or executable for VX/VX Ace)
        path: PathBuf,

        /// Engine name to fall back to when detection fails
        #[arg(short, long)]
        engine: Option<String>,

        /// Write the units as JSON instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Dump a Marshal data file as JSON
    Dump {
        /// Marshal file (.rvdata2, .rvdata, .rxdata)
        file: PathBuf,

        /// Output JSON file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode and re-encode Marshal files, reporting whether they survive
    Roundtrip {
        /// Marshal file, or a directory of them
        path: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Detect { path, engine } => detect::execute(path, engine.as_deref()),
            Commands::Extract {
                path,
                engine,
                output,
            } => extract::execute(path, engine.as_deref(), output.as_deref()),
            Commands::Dump { file, output } => dump::execute(file, output.as_deref()),
            Commands::Roundtrip { path } => roundtrip::execute(path),
        }
    }
}
