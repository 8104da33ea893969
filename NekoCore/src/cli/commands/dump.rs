//! CLI command for dumping Marshal files as JSON

use std::path::Path;

use crate::converter::{convert_marshal_to_json, marshal_to_json};
use crate::formats::marshal::read_marshal;

pub fn execute(file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output) = output {
        convert_marshal_to_json(file, output)?;
        println!("Wrote {}", output.display());
    } else {
        let doc = read_marshal(file)?;
        println!("{}", serde_json::to_string_pretty(&marshal_to_json(&doc)?)?);
    }
    Ok(())
}
