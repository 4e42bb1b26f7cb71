//! Project manifest (`tiledport.yaml`) parsing.
//!
//! The manifest names where the editor files live, where imported output
//! goes, and the import options applied to every file in the project.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};
use crate::import::ImportOptions;

/// Project manifest loaded from `tiledport.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Directories to scan for sources. Defaults to the project root.
    pub sources: Vec<String>,

    /// Output directory for scenes and resources.
    pub output: PathBuf,

    /// Extension of scene files written by `build`.
    pub format: String,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,

    /// Import options for every file in the project.
    pub options: ImportOptions,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: PathBuf::from("dist"),
            format: "json".to_string(),
            excludes: vec![],
            options: ImportOptions::default(),
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ImportError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;
        Self::parse(&content).map_err(|message| ImportError::Manifest {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse manifest YAML. An empty document gives the defaults.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.excludes
            .iter()
            .any(|pattern| matches_pattern(&path, pattern))
    }

    /// Source directories, defaulting to the project root.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }
}

/// Minimal glob matching: `**/dir/*`, `*.ext`, `dir/*`, or a plain substring.
fn matches_pattern(path: &str, pattern: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix("**/") {
        if let Some(dir) = suffix.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
        }
        return path.ends_with(suffix) || path.contains(&format!("/{}", suffix));
    }

    if let Some(suffix) = pattern.strip_prefix('*').filter(|_| !pattern.contains('/')) {
        return path.ends_with(suffix);
    }

    if let Some(dir) = pattern.strip_suffix("/*") {
        return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
    }

    path.contains(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_manifest() {
        let yaml = r#"
sources:
  - levels/
output: build/scenes
format: yaml
excludes:
  - "*.bak"
  - "**/drafts/*"
options:
  room_width_in_tiles: 16
  tileset_resource: build/tilesets.json
  prefabs:
    Chest: scenes/chest.scene
"#;
        let manifest = Manifest::parse(yaml).unwrap();

        assert_eq!(manifest.sources, vec!["levels/"]);
        assert_eq!(manifest.output, PathBuf::from("build/scenes"));
        assert_eq!(manifest.format, "yaml");
        assert_eq!(manifest.excludes, vec!["*.bak", "**/drafts/*"]);
        assert_eq!(manifest.options.room_width_in_tiles, 16);
        assert_eq!(manifest.options.room_height_in_tiles, 12);
        assert_eq!(
            manifest.options.tileset_resource,
            Some(PathBuf::from("build/tilesets.json"))
        );
    }

    #[test]
    fn test_empty_manifest_is_default() {
        assert_eq!(Manifest::parse("").unwrap(), Manifest::default());
        assert_eq!(Manifest::parse("output: out").unwrap().format, "json");
    }

    #[test]
    fn test_bad_manifest() {
        assert!(Manifest::parse("options: [1, 2]").is_err());
    }

    #[test]
    fn test_effective_sources() {
        let mut manifest = Manifest::default();
        assert_eq!(manifest.effective_sources(), vec!["."]);

        manifest.sources = vec!["maps/".to_string()];
        assert_eq!(manifest.effective_sources(), vec!["maps/"]);
    }

    #[test]
    fn test_excludes() {
        let manifest = Manifest {
            excludes: vec![
                "*.bak".to_string(),
                "**/drafts/*".to_string(),
                "old".to_string(),
            ],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("levels/cave.tmx.bak")));
        assert!(manifest.is_excluded(Path::new("drafts/cave.tmx")));
        assert!(manifest.is_excluded(Path::new("levels/drafts/cave.tmx")));
        assert!(manifest.is_excluded(Path::new("levels/old/cave.tmx")));
        assert!(!manifest.is_excluded(Path::new("levels/cave.tmx")));
    }
}
