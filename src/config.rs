use std::fs;
use std::path::{Path, PathBuf};

use image::Rgba;
use log::{debug, info};
use serde::Deserialize;

use crate::colors::parse_color;
use crate::errors::ConfigError;

// Default values for configuration
pub const DEFAULT_CLASSES_YAML: &str = "eg_dataset.yaml";
pub const LABEL_EXTENSION: &str = "txt";
pub const BOX_STROKE_WIDTH: i32 = 3;
pub const MIN_FONT_SIZE: u32 = 12;      // smallest readable class name
pub const TEXT_OFFSET: i32 = 2;         // gap between text bottom and box top

/// Class section of a dataset YAML. Other keys (`path`, `train`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
struct ClassConfigFile {
    nc: usize,
    names: Vec<String>,
    class_clrs: Vec<String>,
}

/// Validated class names and colors, indexed by class id.
#[derive(Debug, Clone)]
pub struct ClassConfig {
    names: Vec<String>,
    colors: Vec<Rgba<u8>>,
}

impl ClassConfig {
    /// Load and validate the class config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml_str(&contents, path)?;
        info!("Loaded {} class(es) from {}", config.class_count(), path.display());
        Ok(config)
    }

    /// Parse and validate YAML content. `path` is only used in error messages.
    pub fn from_yaml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: ClassConfigFile =
            serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::validate(raw, path)
    }

    fn validate(raw: ClassConfigFile, path: &Path) -> Result<Self, ConfigError> {
        let mismatch = |what, left, right| ConfigError::Mismatch {
            path: PathBuf::from(path),
            what,
            left,
            right,
        };

        if raw.nc != raw.names.len() {
            return Err(mismatch(
                "number of classes (nc) does not match number of class names",
                raw.nc,
                raw.names.len(),
            ));
        }
        if raw.class_clrs.len() != raw.names.len() {
            return Err(mismatch(
                "number of colors does not match number of class names",
                raw.class_clrs.len(),
                raw.names.len(),
            ));
        }

        let colors = raw
            .class_clrs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                parse_color(spec).ok_or_else(|| ConfigError::InvalidColor {
                    path: path.to_path_buf(),
                    index,
                    value: spec.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (name, color) in raw.names.iter().zip(&colors) {
            debug!("class {:?} -> {:?}", name, color.0);
        }

        Ok(Self {
            names: raw.names,
            colors,
        })
    }

    pub fn class_count(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, class_id: usize) -> &str {
        &self.names[class_id]
    }

    pub fn color(&self, class_id: usize) -> Rgba<u8> {
        self.colors[class_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<ClassConfig, ConfigError> {
        ClassConfig::from_yaml_str(yaml, Path::new("test.yaml"))
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            "path: ../datasets/eg\nnc: 2\nnames: [car, person]\nclass_clrs: [red, '#00ff00']\n",
        )
        .unwrap();

        assert_eq!(config.class_count(), 2);
        assert_eq!(config.name(1), "person");
        assert_eq!(config.color(0), Rgba([255, 0, 0, 255]));
        assert_eq!(config.color(1), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_class_count_mismatch() {
        let err = parse("nc: 3\nnames: [a, b]\nclass_clrs: [red, blue]\n").unwrap_err();
        match err {
            ConfigError::Mismatch { left, right, .. } => assert_eq!((left, right), (3, 2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_color_count_mismatch() {
        let err = parse("nc: 2\nnames: [a, b]\nclass_clrs: [red]\n").unwrap_err();
        match err {
            ConfigError::Mismatch { left, right, .. } => assert_eq!((left, right), (1, 2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_color() {
        let err = parse("nc: 2\nnames: [a, b]\nclass_clrs: [red, notacolor]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { index: 1, .. }));
    }

    #[test]
    fn test_missing_key() {
        let err = parse("nc: 1\nnames: [a]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ClassConfig::load(Path::new("/nonexistent/classes.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
