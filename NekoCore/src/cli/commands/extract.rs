//! CLI command for text extraction

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step};
use crate::engines::EngineRegistry;

pub fn execute(path: &Path, engine: Option<&str>, output: Option<&Path>) -> anyhow::Result<()> {
    let started = Instant::now();
    let registry = EngineRegistry::default();
    let adapter = registry.resolve(path, engine)?;

    let steps = if output.is_some() { 2 } else { 1 };
    print_step(1, steps, LOOKING_GLASS, &format!("Reading {} data...", adapter.name()));
    let data = adapter.load(path)?;

    if let Some(output) = output {
        print_step(2, steps, DISK, &format!("Writing {}...", output.display()));
        std::fs::write(output, serde_json::to_string_pretty(&data)?)?;
    } else {
        let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();
        for unit in &data.units {
            *per_file.entry(unit.file()).or_default() += 1;
        }
        for (file, count) in &per_file {
            println!("{count:>6}  {file}");
        }
    }

    println!("{} unit(s) extracted", data.len());
    print_done(started.elapsed());
    Ok(())
}
