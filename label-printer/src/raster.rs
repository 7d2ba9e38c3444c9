//! Raster label canvas
//!
//! White RGB canvas with black text (TrueType via `ab_glyph`), pasted
//! RGBA images and barcode bars. Text placement follows the usual label
//! layout options: centred on an axis, or measured from the right/bottom
//! edge instead of the left/top.

use crate::error::{PrintError, PrintResult};
use ab_glyph::{Font, FontVec, OutlinedGlyph, PxScale, ScaleFont, point};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use std::path::Path;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Placement options for [`LabelCanvas::draw_text`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    /// Add half the free horizontal space to `x`
    pub center_x: bool,
    /// Add half the free vertical space to `y`
    pub center_y: bool,
    /// `x` is the distance from the right edge
    pub rev_x: bool,
    /// `y` is the distance from the bottom edge
    pub rev_y: bool,
}

/// Label image being composed
pub struct LabelCanvas {
    image: RgbImage,
    font: Option<FontVec>,
}

impl LabelCanvas {
    /// White canvas without a font; text drawing needs [`with_font`](Self::with_font)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Read a TrueType/OpenType font file
    pub fn load_font(path: &Path) -> PrintResult<FontVec> {
        let data = std::fs::read(path)?;
        FontVec::try_from_vec(data)
            .map_err(|e| PrintError::Font(format!("{}: {}", path.display(), e)))
    }

    /// Read an image as RGBA, optionally resized to a `size`×`size` square
    pub fn load_image(path: &Path, size: Option<u32>) -> PrintResult<RgbaImage> {
        let image = image::open(path)?.to_rgba8();
        Ok(match size {
            Some(size) => imageops::resize(&image, size, size, FilterType::Lanczos3),
            None => image,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Ink bounding box size of `text` at `size` px per em
    pub fn measure_text(&self, text: &str, size: f32) -> PrintResult<(u32, u32)> {
        let glyphs = self.layout(text, size, 0.0, 0.0)?;
        Ok(ink_bounds(&glyphs).map_or((0, 0), |(x0, y0, x1, y1)| {
            ((x1 - x0).ceil() as u32, (y1 - y0).ceil() as u32)
        }))
    }

    /// Draw black text and return its ink size
    ///
    /// The line origin (top of the ascent) lands on the resolved `(x, y)`.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        style: TextStyle,
    ) -> PrintResult<(u32, u32)> {
        let (width, height) = self.measure_text(text, size)?;
        let (x, y) = self.place(x, y, width, height, style);

        for glyph in self.layout(text, size, x as f32, y as f32)? {
            let bounds = glyph.px_bounds();
            let image = &mut self.image;
            glyph.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px < 0 || py < 0 || px as u32 >= image.width() || py as u32 >= image.height() {
                    return;
                }
                let pixel = image.get_pixel_mut(px as u32, py as u32);
                let keep = 1.0 - coverage.clamp(0.0, 1.0);
                for channel in pixel.0.iter_mut() {
                    *channel = (*channel as f32 * keep).round() as u8;
                }
            });
        }

        Ok((width, height))
    }

    /// Resolve a text position against the canvas size
    pub fn place(&self, x: i32, y: i32, width: u32, height: u32, style: TextStyle) -> (i32, i32) {
        let (cw, ch) = (self.width() as i32, self.height() as i32);
        let (w, h) = (width as i32, height as i32);
        let mut x = x;
        let mut y = y;

        if style.center_x {
            x += (cw - w).div_euclid(2);
        }
        if style.center_y {
            y += (ch - h).div_euclid(2);
        }
        if style.rev_x {
            x = cw - w - x;
        }
        if style.rev_y {
            y = ch - h - y;
        }
        (x, y)
    }

    /// Alpha-composite `overlay` with its top-left corner at `(x, y)`
    pub fn paste(&mut self, overlay: &RgbaImage, x: i32, y: i32) {
        for (ox, oy, src) in overlay.enumerate_pixels() {
            let px = x + ox as i32;
            let py = y + oy as i32;
            if px < 0 || py < 0 || px as u32 >= self.width() || py as u32 >= self.height() {
                continue;
            }
            let alpha = src.0[3] as f32 / 255.0;
            let dst = self.image.get_pixel_mut(px as u32, py as u32);
            for c in 0..3 {
                let blended = src.0[c] as f32 * alpha + dst.0[c] as f32 * (1.0 - alpha);
                dst.0[c] = blended.round() as u8;
            }
        }
    }

    /// Draw barcode modules as black bars; returns the drawn width
    pub fn draw_barcode(
        &mut self,
        modules: &[bool],
        module_width: u32,
        height: u32,
        x: i32,
        y: i32,
    ) -> u32 {
        let black = RgbaImage::from_pixel(module_width, height, image::Rgba([0, 0, 0, 255]));
        for (i, bar) in modules.iter().enumerate() {
            if *bar {
                self.paste(&black, x + (i as u32 * module_width) as i32, y);
            }
        }
        modules.len() as u32 * module_width
    }

    pub fn save_jpeg(&self, path: &Path) -> PrintResult<()> {
        self.image.save_with_format(path, ImageFormat::Jpeg)?;
        Ok(())
    }

    fn layout(&self, text: &str, size: f32, x: f32, y: f32) -> PrintResult<Vec<OutlinedGlyph>> {
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| PrintError::Font("No font loaded".to_string()))?;

        // `size` is the em size; PxScale is the ascent-to-descent height
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(size * font.height_unscaled() / units_per_em);
        let scaled = font.as_scaled(scale);

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let mut glyph = scaled.scaled_glyph(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, glyph.id);
            }
            glyph.position = point(x + caret, y + scaled.ascent());
            caret += scaled.h_advance(glyph.id);
            previous = Some(glyph.id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                glyphs.push(outlined);
            }
        }
        Ok(glyphs)
    }
}

fn ink_bounds(glyphs: &[OutlinedGlyph]) -> Option<(f32, f32, f32, f32)> {
    glyphs.iter().map(OutlinedGlyph::px_bounds).fold(None, |acc, b| {
        Some(match acc {
            None => (b.min.x, b.min.y, b.max.x, b.max.y),
            Some((x0, y0, x1, y1)) => (
                x0.min(b.min.x),
                y0.min(b.min.y),
                x1.max(b.max.x),
                y1.max(b.max.y),
            ),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// A system font if one is installed; text tests are skipped otherwise
    fn system_font() -> Option<FontVec> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
        .iter()
        .find_map(|p| LabelCanvas::load_font(Path::new(p)).ok())
    }

    #[test]
    fn test_new_canvas_is_white() {
        let canvas = LabelCanvas::new(580, 400);
        assert_eq!((canvas.width(), canvas.height()), (580, 400));
        assert!(canvas.image().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_place_options() {
        let canvas = LabelCanvas::new(100, 50);
        let plain = TextStyle::default();
        assert_eq!(canvas.place(5, 6, 20, 10, plain), (5, 6));

        let centered = TextStyle {
            center_x: true,
            center_y: true,
            ..Default::default()
        };
        assert_eq!(canvas.place(0, 0, 20, 10, centered), (40, 20));

        let reversed = TextStyle {
            rev_x: true,
            rev_y: true,
            ..Default::default()
        };
        assert_eq!(canvas.place(5, 6, 20, 10, reversed), (75, 34));

        // centred then measured from the bottom, as the product id line is
        let bottom_center = TextStyle {
            center_x: true,
            rev_y: true,
            ..Default::default()
        };
        assert_eq!(canvas.place(0, 4, 20, 10, bottom_center), (40, 36));
    }

    #[test]
    fn test_paste_blends_alpha_and_clips() {
        let mut canvas = LabelCanvas::new(4, 4);
        let mut overlay = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        overlay.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        overlay.put_pixel(1, 0, Rgba([0, 0, 0, 128]));

        canvas.paste(&overlay, 2, 2);
        canvas.paste(&overlay, -10, -10);

        assert_eq!(*canvas.image().get_pixel(2, 2), WHITE);
        assert_eq!(canvas.image().get_pixel(3, 2).0[0], 127);
        assert_eq!(*canvas.image().get_pixel(3, 3), Rgb([0, 0, 0]));
        assert_eq!(*canvas.image().get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_draw_barcode() {
        let mut canvas = LabelCanvas::new(20, 10);
        let width = canvas.draw_barcode(&[true, false, true], 2, 5, 1, 1);
        assert_eq!(width, 6);
        assert_eq!(*canvas.image().get_pixel(1, 1), Rgb([0, 0, 0]));
        assert_eq!(*canvas.image().get_pixel(3, 1), WHITE);
        assert_eq!(*canvas.image().get_pixel(5, 5), Rgb([0, 0, 0]));
        assert_eq!(*canvas.image().get_pixel(5, 6), WHITE);
    }

    #[test]
    fn test_text_needs_font() {
        let mut canvas = LabelCanvas::new(100, 50);
        let err = canvas
            .draw_text("12", 0, 0, 20.0, TextStyle::default())
            .unwrap_err();
        assert!(matches!(err, PrintError::Font(_)));
    }

    #[test]
    fn test_load_font_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            LabelCanvas::load_font(&path),
            Err(PrintError::Font(_))
        ));
        assert!(matches!(
            LabelCanvas::load_font(&dir.path().join("missing.ttf")),
            Err(PrintError::Io(_))
        ));
    }

    #[test]
    fn test_draw_text_inks_canvas() {
        let Some(font) = system_font() else {
            return;
        };
        let mut canvas = LabelCanvas::new(200, 100).with_font(font);

        let (w, h) = canvas
            .draw_text("8800", 0, 0, 40.0, TextStyle::default())
            .unwrap();
        assert!(w > 0 && h > 0);
        assert!(canvas.image().pixels().any(|p| p.0[0] < 128));

        let (wider, _) = canvas.measure_text("8800000", 40.0).unwrap();
        assert!(wider > w);
    }

    #[test]
    fn test_save_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.jpg");
        LabelCanvas::new(58, 40).save_jpeg(&path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (58, 40));
    }
}
