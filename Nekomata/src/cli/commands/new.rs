//! CLI command for creating a project

use std::path::Path;
use std::time::Instant;

use nekocore::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step};

use crate::Toolkit;

pub fn execute(
    toolkit: &Toolkit,
    game: &Path,
    engine: Option<&str>,
    output: &Path,
) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 2, LOOKING_GLASS, &format!("Extracting text from {}...", game.display()));
    let project = toolkit.create_project(game, engine)?;
    println!(
        "Found {} unit(s) with {}",
        project.data.len(),
        project.engine
    );

    print_step(2, 2, DISK, &format!("Saving {}...", output.display()));
    project.save(output)?;

    print_done(started.elapsed());
    Ok(())
}
