//! CLI command for checking that Marshal files survive a decode/encode cycle

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::cli::progress::simple_bar;
use crate::formats::marshal::{parse_marshal_bytes, serialize_marshal};

const MARSHAL_EXTENSIONS: [&str; 3] = ["rvdata2", "rvdata", "rxdata"];

/// How a file came through decode, encode, decode, encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Re-encoding reproduced the input bytes.
    Identical,
    /// Bytes differ from the input, but a second cycle reproduces the first.
    Stable,
    /// The second cycle produced different bytes again.
    Unstable,
}

/// Run one file's bytes through two decode/encode cycles.
pub fn check(bytes: &[u8]) -> crate::Result<Outcome> {
    let first = serialize_marshal(&parse_marshal_bytes(bytes)?)?;
    if first == bytes {
        return Ok(Outcome::Identical);
    }
    let second = serialize_marshal(&parse_marshal_bytes(&first)?)?;
    Ok(if second == first {
        Outcome::Stable
    } else {
        Outcome::Unstable
    })
}

fn collect_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let is_marshal = entry.path().extension().is_some_and(|ext| {
            MARSHAL_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
        if entry.file_type().is_file() && is_marshal {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn execute(path: &Path) -> anyhow::Result<()> {
    let files = collect_files(path)?;
    let pb = simple_bar(files.len() as u64, "Checking");
    let mut results = Vec::with_capacity(files.len());

    for file in &files {
        let bytes = std::fs::read(file)?;
        results.push((file, check(&bytes)));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut failed = 0;
    for (file, result) in &results {
        let name = file.file_name().map_or_else(
            || file.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        match result {
            Ok(Outcome::Identical) => println!("identical  {name}"),
            Ok(Outcome::Stable) => println!("stable     {name}"),
            Ok(Outcome::Unstable) => {
                failed += 1;
                println!("UNSTABLE   {name}");
            }
            Err(err) => {
                failed += 1;
                println!("ERROR      {name}: {err}");
            }
        }
    }

    println!("{} file(s) checked, {} problem(s)", results.len(), failed);
    if failed > 0 {
        anyhow::bail!("{failed} file(s) did not survive a round trip");
    }
    Ok(())
}
