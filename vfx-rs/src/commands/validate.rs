//! Definition validation command

use anyhow::{Context, Result};
use std::path::Path;

use crate::loader::load_definition;

pub fn execute(path: &Path) -> Result<()> {
    let definition = load_definition(path)?;

    definition
        .validate()
        .with_context(|| format!("{} is not a valid particle definition", path.display()))?;

    println!("✓ {} is valid", path.display());
    Ok(())
}
