//! Batch driver: one pass over the images directory.
//!
//! Per image: open, find labels, orient, draw, save. Any per-image failure is
//! logged and counted; only setup problems (listing the images directory,
//! creating the output directory) abort the run.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, info, warn};

use crate::annotate::Annotator;
use crate::errors::{AppError, ImageError, SkipReason};
use crate::exif_utils::open_image;
use crate::geometry::BoxExtent;
use crate::label::{label_path_for, read_labels};

/// Input and output locations for a run.
#[derive(Debug, Clone)]
pub struct BatchPaths {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// An image the batch left out of the output directory, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub name: String,
    pub reason: SkipReason,
    pub message: String,
}

impl SkippedImage {
    fn new(name: &str, err: &ImageError) -> Self {
        Self {
            name: name.to_string(),
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for SkippedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Counts per outcome plus the largest box seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub saved: usize,
    pub open_failed: usize,
    pub no_label: usize,
    pub bad_label: usize,
    pub save_failed: usize,
    pub extent: BoxExtent,
    /// In processing order, one entry per warning logged
    pub skips: Vec<SkippedImage>,
}

impl RunReport {
    fn record_saved(&mut self, extent: BoxExtent) {
        self.saved += 1;
        self.extent = self.extent.merge(extent);
    }

    fn record_skip(&mut self, skip: SkippedImage) {
        match skip.reason {
            SkipReason::OpenFailed => self.open_failed += 1,
            SkipReason::NoLabel => self.no_label += 1,
            SkipReason::BadLabel => self.bad_label += 1,
            SkipReason::SaveFailed => self.save_failed += 1,
        }
        self.skips.push(skip);
    }

    pub fn skipped(&self) -> usize {
        self.open_failed + self.no_label + self.bad_label + self.save_failed
    }

    pub fn total(&self) -> usize {
        self.saved + self.skipped()
    }
}

/// Regular files in `dir`, in natural filename order.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir).map_err(|source| AppError::ImagesDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            let is_file = path.is_file();
            if !is_file {
                debug!("Ignoring non-file entry {}", path.display());
            }
            is_file
        })
        .collect();

    // Sort paths like a file manager would, `sort()` puts img10 before img2
    alphanumeric_sort::sort_path_slice(&mut paths);
    Ok(paths)
}

/// Annotates one image and writes it to the output directory.
pub fn process_image(
    image_path: &Path,
    paths: &BatchPaths,
    annotator: &Annotator,
    class_count: usize,
) -> Result<BoxExtent, ImageError> {
    let opened = open_image(image_path)?;

    let label_path = label_path_for(image_path, &paths.labels_dir);
    let records = read_labels(&label_path, class_count)?
        .ok_or(ImageError::LabelMissing(label_path))?;

    debug!("{} box(es), orientation {:?}", records.len(), opened.orientation());
    let format = opened.format();
    let img = opened.into_oriented();
    let color_type = img.color();

    let mut canvas = img.into_rgba8();
    let extent = annotator.annotate(&mut canvas, &records);

    // Write back in the input's channel layout so the encoder still accepts it.
    // Grayscale inputs get their box colors reduced to luma.
    let canvas = DynamicImage::ImageRgba8(canvas);
    let annotated = match (color_type.has_color(), color_type.has_alpha()) {
        (true, true) => canvas,
        (true, false) => DynamicImage::ImageRgb8(canvas.into_rgb8()),
        (false, true) => DynamicImage::ImageLumaA8(canvas.into_luma_alpha8()),
        (false, false) => DynamicImage::ImageLuma8(canvas.into_luma8()),
    };

    let file_name = image_path.file_name().unwrap_or_default();
    let output_path = paths.output_dir.join(file_name);
    let saved = match format {
        Some(format) => annotated.save_with_format(&output_path, format),
        None => annotated.save(&output_path),
    };
    saved.map_err(|source| ImageError::Save {
        path: output_path,
        source,
    })?;

    Ok(extent)
}

/// Runs the whole batch. Per-image failures are logged and counted in the report.
pub fn run(
    paths: &BatchPaths,
    annotator: &Annotator,
    class_count: usize,
) -> Result<RunReport, AppError> {
    fs::create_dir_all(&paths.output_dir).map_err(|source| AppError::OutputDir {
        path: paths.output_dir.clone(),
        source,
    })?;

    let images = list_images(&paths.images_dir)?;
    info!("Found {} file(s) in {}", images.len(), paths.images_dir.display());

    let mut report = RunReport::default();
    for (index, image_path) in images.iter().enumerate() {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("[{}/{}] {}", index + 1, images.len(), name);

        match process_image(image_path, paths, annotator, class_count) {
            Ok(extent) => report.record_saved(extent),
            Err(err) => {
                let skip = SkippedImage::new(&name, &err);
                warn!("Skipping {}", skip);
                report.record_skip(skip);
            }
        }
    }

    info!(
        "Processed {} image(s): saved {}, skipped {} (unreadable {}, no label {}, bad label {}, save failed {})",
        report.total(),
        report.saved,
        report.skipped(),
        report.open_failed,
        report.no_label,
        report.bad_label,
        report.save_failed
    );
    Ok(report)
}
