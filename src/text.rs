//! Text rendering for class names.
//!
//! Drawing code only sees [`TextRenderer`]; where the font comes from is
//! decided once at startup by [`FontTextRenderer::load`].

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use log::{debug, info};

use crate::errors::AppError;

// Bold sans-serif first, then regular faces.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws a single line of text onto an RGBA canvas.
pub trait TextRenderer {
    /// Where the glyphs come from, for logging.
    fn source(&self) -> &str;

    /// Draws `text` with its top-left corner at `(x, y)`. `font_size` is the
    /// em size in pixels. Parts outside the canvas are clipped.
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Rgba<u8>,
    );
}

/// [`TextRenderer`] backed by a TrueType/OpenType font file.
pub struct FontTextRenderer {
    font: FontVec,
    source: String,
}

impl FontTextRenderer {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let data = std::fs::read(path)
            .map_err(|e| AppError::Font(format!("failed to read {}: {}", path.display(), e)))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| AppError::Font(format!("failed to parse font file {}", path.display())))?;

        Ok(Self {
            font,
            source: path.display().to_string(),
        })
    }

    /// Uses `font_path` when given, otherwise the first usable system font.
    pub fn load(font_path: Option<&Path>) -> Result<Self, AppError> {
        let renderer = match font_path {
            Some(path) => Self::from_path(path)?,
            None => Self::find_system_font().ok_or_else(|| {
                AppError::Font("no system font found, pass one with --font".to_string())
            })?,
        };

        info!("using font from {}", renderer.source());
        Ok(renderer)
    }

    fn find_system_font() -> Option<Self> {
        FONT_CANDIDATES.iter().map(PathBuf::from).find_map(|path| {
            match Self::from_path(&path) {
                Ok(renderer) => Some(renderer),
                Err(e) => {
                    debug!("{}", e);
                    None
                }
            }
        })
    }

    /// Pixel scale whose em square is `font_size` pixels tall.
    fn em_scale(&self, font_size: u32) -> PxScale {
        let size = font_size as f32;
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(size * self.font.height_unscaled() / units_per_em)
            }
            _ => PxScale::from(size),
        }
    }
}

impl TextRenderer for FontTextRenderer {
    fn source(&self) -> &str {
        &self.source
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Rgba<u8>,
    ) {
        let scale = self.em_scale(font_size);
        draw_text_mut(canvas, color, x, y, scale, &self.font, text);
    }
}
