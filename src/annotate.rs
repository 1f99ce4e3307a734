//! Box and class-name drawing for one image.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use log::trace;

use crate::config::{ClassConfig, BOX_STROKE_WIDTH, MIN_FONT_SIZE, TEXT_OFFSET};
use crate::geometry::{BoxExtent, PixelRect};
use crate::label::LabelRecord;
use crate::text::TextRenderer;

/// Draws label boxes, and optionally class names, in class colors.
pub struct Annotator<'a> {
    classes: &'a ClassConfig,
    text: Option<&'a dyn TextRenderer>,
}

impl<'a> Annotator<'a> {
    /// `text` enables class name rendering
    pub fn new(classes: &'a ClassConfig, text: Option<&'a dyn TextRenderer>) -> Self {
        Self { classes, text }
    }

    /// Draws every record in order and returns the largest box extent drawn.
    pub fn annotate(&self, canvas: &mut RgbaImage, records: &[LabelRecord]) -> BoxExtent {
        let (width, height) = canvas.dimensions();
        let mut extent = BoxExtent::default();

        for record in records {
            let rect = PixelRect::from_label(record, width, height);
            self.draw_box(canvas, &rect, record.class_id);
            extent.include(&rect);
        }

        extent
    }

    fn draw_box(&self, canvas: &mut RgbaImage, rect: &PixelRect, class_id: usize) {
        let color = self.classes.color(class_id);
        trace!("class {} box {:?}", class_id, rect);
        draw_outline(canvas, rect, BOX_STROKE_WIDTH, color);

        if let Some(text) = self.text {
            let name = self.classes.name(class_id);
            let font_size = font_size_for(rect.width(), name);
            let x = rect.x_min as i32;
            let y = (rect.y_min - f64::from(font_size) - f64::from(TEXT_OFFSET)) as i32;
            text.draw_text(canvas, name, x, y, font_size, color);
        }
    }
}

/// Font size that roughly spreads `name` over the box width, never below
/// [`MIN_FONT_SIZE`].
pub fn font_size_for(box_width: f64, name: &str) -> u32 {
    let chars = name.chars().count();
    if chars == 0 {
        return MIN_FONT_SIZE;
    }
    let fill = (box_width / chars as f64).floor() as u32;
    fill.max(MIN_FONT_SIZE)
}

/// Outline of `stroke` pixels growing inward from the rect edges. Corners are
/// truncated to whole pixels; anything off-canvas is clipped.
fn draw_outline(canvas: &mut RgbaImage, rect: &PixelRect, stroke: i32, color: Rgba<u8>) {
    let (x0, y0) = (rect.x_min as i32, rect.y_min as i32);
    let (x1, y1) = (rect.x_max as i32, rect.y_max as i32);

    for i in 0..stroke {
        let (left, top) = (x0.saturating_add(i), y0.saturating_add(i));
        let (right, bottom) = (x1.saturating_sub(i), y1.saturating_sub(i));
        if right < left || bottom < top {
            break;
        }
        let width = (i64::from(right) - i64::from(left) + 1) as u32;
        let height = (i64::from(bottom) - i64::from(top) + 1) as u32;
        draw_hollow_rect_mut(canvas, Rect::at(left, top).of_size(width, height), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[derive(Default)]
    struct RecordingRenderer {
        calls: RefCell<Vec<(String, i32, i32, u32, Rgba<u8>)>>,
    }

    impl TextRenderer for RecordingRenderer {
        fn source(&self) -> &str {
            "recording"
        }

        fn draw_text(
            &self,
            _canvas: &mut RgbaImage,
            text: &str,
            x: i32,
            y: i32,
            font_size: u32,
            color: Rgba<u8>,
        ) {
            self.calls.borrow_mut().push((text.to_string(), x, y, font_size, color));
        }
    }

    fn classes() -> ClassConfig {
        ClassConfig::from_yaml_str(
            "nc: 2\nnames: [car, bicycle]\nclass_clrs: [red, blue]\n",
            Path::new("test.yaml"),
        )
        .unwrap()
    }

    fn car_box() -> LabelRecord {
        LabelRecord { class_id: 0, center_x: 0.5, center_y: 0.5, width: 0.2, height: 0.4 }
    }

    #[test]
    fn test_font_size_rule() {
        assert_eq!(font_size_for(100.0, "abcd"), 25);
        assert_eq!(font_size_for(20.0, "abcd"), 12);
        assert_eq!(font_size_for(103.9, "abcd"), 25);
        assert_eq!(font_size_for(50.0, ""), MIN_FONT_SIZE);
    }

    #[test]
    fn test_box_outline_pixels() {
        let classes = classes();
        let annotator = Annotator::new(&classes, None);
        let mut canvas = RgbaImage::from_pixel(100, 100, BLACK);

        let extent = annotator.annotate(&mut canvas, &[car_box()]);

        // x 40..=60, y 30..=70, three pixels wide, growing inward
        for &(x, y) in &[(40, 30), (60, 70), (40, 50), (42, 50), (58, 50), (50, 32), (50, 68)] {
            assert_eq!(*canvas.get_pixel(x, y), RED, "({x}, {y})");
        }
        for &(x, y) in &[(39, 50), (43, 50), (57, 50), (61, 50), (50, 33), (50, 50), (50, 71)] {
            assert_eq!(*canvas.get_pixel(x, y), BLACK, "({x}, {y})");
        }
        assert!((extent.max_width - 20.0).abs() < 1e-9);
        assert!((extent.max_height - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_above_box() {
        let classes = classes();
        let renderer = RecordingRenderer::default();
        let annotator = Annotator::new(&classes, Some(&renderer));
        let mut canvas = RgbaImage::from_pixel(100, 100, BLACK);

        annotator.annotate(&mut canvas, &[car_box()]);

        let calls = renderer.calls.borrow();
        assert_eq!(calls.len(), 1);
        // 20 px wide box / 3 chars rounds below the minimum of 12
        assert_eq!(calls[0], ("car".to_string(), 40, 30 - 12 - 2, 12, RED));
    }

    #[test]
    fn test_text_uses_class_name_and_color() {
        let classes = classes();
        let renderer = RecordingRenderer::default();
        let annotator = Annotator::new(&classes, Some(&renderer));
        let mut canvas = RgbaImage::from_pixel(1000, 1000, BLACK);
        let wide = LabelRecord { class_id: 1, center_x: 0.5, center_y: 0.5, width: 0.7, height: 0.5 };

        annotator.annotate(&mut canvas, &[wide]);

        let calls = renderer.calls.borrow();
        // 700 px / 7 chars
        assert_eq!(calls[0], ("bicycle".to_string(), 150, 250 - 100 - 2, 100, Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_box_partly_outside_canvas() {
        let classes = classes();
        let annotator = Annotator::new(&classes, None);
        let mut canvas = RgbaImage::from_pixel(100, 100, BLACK);
        let corner = LabelRecord { class_id: 0, center_x: 0.0, center_y: 0.0, width: 0.5, height: 0.5 };

        let extent = annotator.annotate(&mut canvas, &[corner]);

        assert_eq!(*canvas.get_pixel(25, 10), RED);
        assert_eq!(*canvas.get_pixel(10, 25), RED);
        assert_eq!(*canvas.get_pixel(10, 10), BLACK);
        assert_eq!(extent.max_width, 50.0);
    }

    #[test]
    fn test_no_records_leaves_canvas_untouched() {
        let classes = classes();
        let annotator = Annotator::new(&classes, None);
        let mut canvas = RgbaImage::from_pixel(16, 16, BLACK);

        let extent = annotator.annotate(&mut canvas, &[]);

        assert!(canvas.pixels().all(|p| *p == BLACK));
        assert_eq!(extent, BoxExtent::default());
    }
}
