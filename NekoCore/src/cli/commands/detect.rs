//! CLI command for engine detection

use std::path::Path;

use crate::engines::EngineRegistry;

pub fn execute(path: &Path, engine: Option<&str>) -> anyhow::Result<()> {
    let registry = EngineRegistry::default();
    let detected = registry.detect(path);
    let adapter = registry.resolve(path, engine)?;

    if detected.is_some() {
        println!("{}", adapter.name());
    } else {
        println!("{} (by name, not detected)", adapter.name());
    }
    Ok(())
}
