//! YOLO label file parsing
//!
//! One file per image, `<stem>.txt`, one box per line:
//! `<class_id> <center_x> <center_y> <width> <height>` with the geometry
//! normalized to the image size.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::LABEL_EXTENSION;

/// One box from a label file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRecord {
    pub class_id: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Error, Debug)]
pub enum LabelParseError {
    #[error("failed to read label file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {kind}", .path.display())]
    Line {
        path: PathBuf,
        line: usize,
        kind: LineError,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid class id {0:?}")]
    ClassId(String),

    #[error("invalid number {0:?}")]
    Number(String),

    #[error("class id {id} is out of range for {count} class(es)")]
    ClassOutOfRange { id: usize, count: usize },

    #[error("{field} {value} is outside [0, 1]")]
    OutOfUnitRange { field: &'static str, value: f64 },
}

const GEOMETRY_FIELDS: [&str; 4] = ["center_x", "center_y", "width", "height"];

impl LabelRecord {
    /// Parse one non-empty line against a config with `class_count` classes
    pub fn parse_line(line: &str, class_count: usize) -> Result<Self, LineError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [class_id, rest @ ..] = fields.as_slice() else {
            return Err(LineError::FieldCount(0));
        };
        if rest.len() != GEOMETRY_FIELDS.len() {
            return Err(LineError::FieldCount(fields.len()));
        }

        let class_id = parse_class_id(class_id)
            .ok_or_else(|| LineError::ClassId(class_id.to_string()))?;
        if class_id >= class_count {
            return Err(LineError::ClassOutOfRange { id: class_id, count: class_count });
        }

        let mut geometry = [0.0f64; 4];
        for ((slot, raw), field) in geometry.iter_mut().zip(rest).zip(GEOMETRY_FIELDS) {
            let value: f64 = raw.parse().map_err(|_| LineError::Number(raw.to_string()))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(LineError::OutOfUnitRange { field, value });
            }
            *slot = value;
        }

        let [center_x, center_y, width, height] = geometry;
        Ok(Self { class_id, center_x, center_y, width, height })
    }
}

/// Class ids are integers, but exporters that write every column as a float
/// (`2.0`) are accepted too.
fn parse_class_id(raw: &str) -> Option<usize> {
    if let Ok(id) = raw.parse::<usize>() {
        return Some(id);
    }
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as usize)
}

/// Parse a whole label file's text. Blank lines are skipped, order is kept.
/// `path` is only used to locate errors.
pub fn parse_labels(
    content: &str,
    path: &Path,
    class_count: usize,
) -> Result<Vec<LabelRecord>, LabelParseError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            LabelRecord::parse_line(line, class_count).map_err(|kind| LabelParseError::Line {
                path: path.to_path_buf(),
                line: index + 1,
                kind,
            })
        })
        .collect()
}

/// `<labels_dir>/<image stem>.txt`
pub fn label_path_for(image_path: &Path, labels_dir: &Path) -> PathBuf {
    // Push the extension instead of with_extension so dotted stems survive.
    let mut file_name = image_path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(".");
    file_name.push(LABEL_EXTENSION);
    labels_dir.join(file_name)
}

/// Read the labels at `path`. `Ok(None)` means there is no label file.
pub fn read_labels(
    path: &Path,
    class_count: usize,
) -> Result<Option<Vec<LabelRecord>>, LabelParseError> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| LabelParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_labels(&content, path, class_count).map(Some)
}
