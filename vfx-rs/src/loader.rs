//! Reading particle definitions from disk

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use vfx_particles::ParticleDefinition;

/// Encodings a definition file can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
}

impl DefinitionFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some(other) => bail!(
                "Unsupported definition format '.{other}' for {} (expected .json, .yaml or .yml)",
                path.display()
            ),
            None => bail!(
                "Cannot tell the format of {} without a file extension",
                path.display()
            ),
        }
    }
}

/// Parse a definition from text in the given format
pub fn parse_definition(text: &str, format: DefinitionFormat) -> Result<ParticleDefinition> {
    match format {
        DefinitionFormat::Json => {
            serde_json::from_str(text).context("Failed to parse JSON particle definition")
        }
        DefinitionFormat::Yaml => {
            serde_yaml_ng::from_str(text).context("Failed to parse YAML particle definition")
        }
    }
}

/// Load a definition from `path` without validating it
pub fn load_definition(path: &Path) -> Result<ParticleDefinition> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }

    let format = DefinitionFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    log::debug!("Parsing {} as {format:?}", path.display());
    parse_definition(&text, format).with_context(|| format!("Invalid file: {}", path.display()))
}

/// Name of the effect defined by `path` (its file stem)
pub fn effect_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "effect".to_string(), |stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DefinitionFormat::from_path(Path::new("fx/sparks.json")).unwrap(),
            DefinitionFormat::Json
        );
        assert_eq!(
            DefinitionFormat::from_path(Path::new("fx/sparks.YML")).unwrap(),
            DefinitionFormat::Yaml
        );
        assert!(DefinitionFormat::from_path(Path::new("fx/sparks.toml")).is_err());
        assert!(DefinitionFormat::from_path(Path::new("fx/sparks")).is_err());
    }

    #[test]
    fn test_parse_yaml_definition() {
        let yaml = "system:\n  max_particles: 12\nshape:\n  kind: circle\n  size: [2.0, 2.0, 2.0]\n";
        let def = parse_definition(yaml, DefinitionFormat::Yaml).unwrap();
        assert_eq!(def.system.max_particles, 12);
        assert_eq!(def.shape, vfx_particles::Shape::Circle { radius: 2.0 });
    }

    #[test]
    fn test_effect_name() {
        assert_eq!(effect_name(Path::new("assets/smoke.yaml")), "smoke");
    }
}
