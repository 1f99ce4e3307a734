use std::path::PathBuf;
use thiserror::Error;

use crate::label::LabelParseError;

/// Errors raised while loading the class configuration. All of them are fatal
/// and are reported before any image is opened.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read class config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse class config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `nc`, `names` and `class_clrs` disagree on the number of classes.
    #[error("class config {}: {what} ({left} vs {right})", .path.display())]
    Mismatch {
        path: PathBuf,
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("class config {}: invalid color {value:?} for class {index}", .path.display())]
    InvalidColor {
        path: PathBuf,
        index: usize,
        value: String,
    },
}

/// Why a single image was skipped. The batch logs these and moves on.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("cannot read file as image: {0}")]
    NotAnImage(#[source] image::ImageError),

    #[error("failed to open image: {0}")]
    Io(#[source] std::io::Error),

    #[error("label not found at {}", .0.display())]
    LabelMissing(PathBuf),

    #[error(transparent)]
    LabelParse(#[from] LabelParseError),

    #[error("failed to save annotated image to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl ImageError {
    /// Short tag used in the run summary.
    pub fn reason(&self) -> SkipReason {
        match self {
            ImageError::NotAnImage(_) | ImageError::Io(_) => SkipReason::OpenFailed,
            ImageError::LabelMissing(_) => SkipReason::NoLabel,
            ImageError::LabelParse(_) => SkipReason::BadLabel,
            ImageError::Save { .. } => SkipReason::SaveFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OpenFailed,
    NoLabel,
    BadLabel,
    SaveFailed,
}

/// Errors that abort the whole run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to list images directory {}: {source}", .path.display())]
    ImagesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font error: {0}")]
    Font(String),
}
