//! # Configuration
//!
//! Jobs are described in a YAML file, discovered in the working directory
//! unless a path is given explicitly. JSON documents are valid YAML, so a
//! `config.json` parses the same way.
//!
//! ```yaml
//! files:
//!   - baseimg: templates/card.png
//!     items:
//!       - type: 0
//!         value: Ada
//!         size: 48
//!         point: { x: 40, y: 30 }
//!         rgb: [20, 20, 20]
//!         font: fonts/Sans.ttf
//!       - type: 1
//!         value: https://example.com/ada
//!         size: 160
//!         point: { x: 600, y: 400 }
//!         apoint: { x: 1, y: 1 }
//!       - type: 2
//!         value: logo.png
//!         point: { x: 20, y: 400 }
//!         scale: { x: 0.5, y: 0.5 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{ConfigError, StampError};
use crate::job::JobDescriptor;

/// File names tried by [`Config::discover`], first match wins.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

/// The full batch description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub files: Vec<JobDescriptor>,
}

impl Config {
    /// Parse a YAML (or JSON) configuration document. `origin` names it in
    /// errors.
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(origin.clone())
            } else {
                ConfigError::Read {
                    path: origin.clone(),
                    source,
                }
            }
        })?;

        let config = Self::parse(&text, &origin)?;
        info!(path = %origin, jobs = config.files.len(), "loaded config");
        Ok(config)
    }

    /// Load the first of [`CONFIG_FILE_NAMES`] present in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
        {
            Some(path) => Self::load(path),
            None => Err(ConfigError::NotFound(format!(
                "{} (tried {})",
                dir.display(),
                CONFIG_FILE_NAMES.join(", ")
            ))),
        }
    }

    /// Validate every job in order. The first failing job aborts the check.
    pub fn check_params(&self) -> Result<(), StampError> {
        for (job, file) in self.files.iter().enumerate() {
            file.check_params()
                .map_err(|source| StampError::Validation { job, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::item::{Coords, ItemKind};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "files": [
            {
                "baseimg": "bg.jpg",
                "items": [
                    { "type": 0, "value": "Hi", "size": 32, "point": { "x": 10, "y": 20 },
                      "apoint": { "x": 0.5, "y": 0 }, "rgb": [1, 2, 3], "font": "a.ttf" },
                    { "type": 1, "value": "payload", "size": 100 },
                    { "type": 2, "value": "logo.png", "scale": { "x": 0.5, "y": 2 } },
                    { "type": 9, "value": "?" }
                ]
            },
            { "baseimg": "other.png" }
        ]
    }"#;

    const SAMPLE_YAML: &str = "\
files:
  - baseimg: bg.jpg
    items:
      - type: 0
        value: Hi
        size: 32
        point: { x: 10, y: 20 }
        apoint: { x: 0.5, y: 0 }
        rgb: [1, 2, 3]
        font: a.ttf
      - { type: 1, value: payload, size: 100 }
      - type: 2
        value: logo.png
        scale: { x: 0.5, y: 2 }
      - { type: 9, value: '?' }
  - baseimg: other.png
";

    fn scratch_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("imgstamp-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE, "sample").unwrap();
        assert_eq!(config.files.len(), 2);

        let job = &config.files[0];
        assert_eq!(job.base_image, "bg.jpg");
        assert_eq!(
            job.items.iter().map(|i| i.kind).collect::<Vec<_>>(),
            vec![
                ItemKind::Text,
                ItemKind::QrCode,
                ItemKind::SubImage,
                ItemKind::Unknown(9)
            ]
        );
        assert_eq!(job.items[0].anchor_point, Coords::new(10.0, 20.0));
        assert_eq!(job.items[0].anchor_fraction, Coords::new(0.5, 0.0));
        assert_eq!(job.items[0].rgb, vec![1, 2, 3]);
        assert_eq!(job.items[0].font, "a.ttf");
        assert_eq!(job.items[1].size, 100.0);
        assert_eq!(job.items[2].scale, Coords::new(0.5, 2.0));
        assert!(config.files[1].items.is_empty());
    }

    #[test]
    fn test_malformed_config() {
        let err = Config::parse("{ \"files\": [ { \"items\": 3 } ] }", "bad.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "bad.json"));
    }

    #[test]
    fn test_discover_missing() {
        let dir = scratch_dir();
        std::fs::write(dir.join("config.toml"), "files = []").unwrap();
        assert!(matches!(
            Config::discover(&dir),
            Err(ConfigError::NotFound(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parse_yaml_matches_json() {
        let yaml = Config::parse(SAMPLE_YAML, "sample.yaml").unwrap();
        assert_eq!(yaml, Config::parse(SAMPLE, "sample.json").unwrap());
    }

    #[test]
    fn test_discover_json_fallback() {
        let dir = scratch_dir();
        std::fs::write(dir.join("config.json"), SAMPLE).unwrap();

        let config = Config::discover(&dir).unwrap();
        assert_eq!(config, Config::parse(SAMPLE, "sample").unwrap());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_discover_yaml() {
        let dir = scratch_dir();
        std::fs::write(dir.join("config.yaml"), SAMPLE_YAML).unwrap();

        let config = Config::discover(&dir).unwrap();
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.files[0].items[0].font, "a.ttf");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_discover_prefers_yaml_over_json() {
        let dir = scratch_dir();
        std::fs::write(dir.join("config.json"), r#"{ "files": [] }"#).unwrap();
        std::fs::write(dir.join("config.yml"), "files:\n  - baseimg: from-yml.png\n").unwrap();

        let config = Config::discover(&dir).unwrap();
        assert_eq!(config.files.len(), 1);
        assert_eq!(config.files[0].base_image, "from-yml.png");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_check_params_reports_job_index() {
        let config = Config::parse(SAMPLE, "sample").unwrap();
        match config.check_params() {
            Err(StampError::Validation { job, source }) => {
                assert_eq!(job, 0);
                assert_eq!(source, ValidationError::MissingBaseImage("bg.jpg".into()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
