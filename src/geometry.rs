//! Normalized-to-pixel box conversion and the run-wide box extent.

use crate::label::LabelRecord;

/// Box corners in pixel coordinates. Not clamped to the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl PixelRect {
    /// Convert a normalized center/size label to corners for a `width` x `height` image
    pub fn from_label(record: &LabelRecord, width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);

        Self {
            x_min: w * record.center_x - w * record.width / 2.0,
            x_max: w * record.center_x + w * record.width / 2.0,
            y_min: h * record.center_y - h * record.height / 2.0,
            y_max: h * record.center_y + h * record.height / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Largest box width and height seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxExtent {
    pub max_width: f64,
    pub max_height: f64,
}

impl BoxExtent {
    pub fn include(&mut self, rect: &PixelRect) {
        self.max_width = self.max_width.max(rect.width());
        self.max_height = self.max_height.max(rect.height());
    }

    /// Combine two extents; order does not matter.
    pub fn merge(self, other: BoxExtent) -> BoxExtent {
        BoxExtent {
            max_width: self.max_width.max(other.max_width),
            max_height: self.max_height.max(other.max_height),
        }
    }
}
