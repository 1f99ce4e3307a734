//! Image opening with EXIF orientation support.
//!
//! Opening and orienting are split so the batch can check for a label file
//! between the two steps without holding anything but the decoded pixels.

use std::path::Path;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use log::debug;

use crate::errors::ImageError;

/// A decoded image whose EXIF orientation has not been applied yet.
pub struct OpenedImage {
    image: DynamicImage,
    orientation: Orientation,
    format: Option<ImageFormat>,
}

impl OpenedImage {
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Format detected from the file content or extension
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Rotates/flips the pixels so the image displays upright.
    pub fn into_oriented(self) -> DynamicImage {
        let mut img = self.image;
        if self.orientation != Orientation::NoTransforms {
            debug!("Applying EXIF orientation transformation {:?}", self.orientation);
            img.apply_orientation(self.orientation);
        }
        img
    }
}

/// Opens and decodes `path`, reading its EXIF orientation.
///
/// The file handle is closed when this returns, on every path.
pub fn open_image(path: &Path) -> Result<OpenedImage, ImageError> {
    let reader = ImageReader::open(path)
        .map_err(ImageError::Io)?
        .with_guessed_format()
        .map_err(ImageError::Io)?;

    let format = reader.format();
    let mut decoder = reader.into_decoder().map_err(classify)?;

    // Defaults to NoTransforms if not present or unsupported format
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);

    if orientation != Orientation::NoTransforms {
        debug!("EXIF orientation detected: {:?}", orientation);
    }

    let image = DynamicImage::from_decoder(decoder).map_err(classify)?;
    Ok(OpenedImage { image, orientation, format })
}

/// Separates plain I/O failures from "this is not an image we can decode".
fn classify(err: image::ImageError) -> ImageError {
    match err {
        image::ImageError::IoError(io) => ImageError::Io(io),
        other => ImageError::NotAnImage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(8, 4, Rgb([1, 2, 3])).save(&path).unwrap();

        let opened = open_image(&path).unwrap();
        assert_eq!(opened.orientation(), Orientation::NoTransforms);
        assert_eq!(opened.format(), Some(ImageFormat::Png));
        let img = opened.into_oriented();
        assert_eq!((img.width(), img.height()), (8, 4));
    }

    #[test]
    fn test_text_file_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, "definitely not a jpeg").unwrap();

        assert!(matches!(open_image(&path), Err(ImageError::NotAnImage(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        assert!(matches!(open_image(&path), Err(ImageError::Io(_))));
    }
}
