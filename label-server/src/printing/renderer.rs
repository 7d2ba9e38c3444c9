//! Product label layout
//!
//! 580×400 white label:
//! - shop logo top right
//! - `Size: ..` and the wrapped title top left
//! - sale price centred, with the currency sign at its right shoulder
//! - product id above a Code 128 barcode of the same id at the bottom
//!
//! Every rendered product is appended to the printed log as
//! `product_id,title,source_url`.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use label_printer::{Code128, LabelCanvas, PrintError, TextStyle};
use shared::{ErrorCode, ProductRecord};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::Config;
use crate::pipeline::LabelRenderer;

pub const LABEL_WIDTH: u32 = 580;
pub const LABEL_HEIGHT: u32 = 400;

pub const FONT_FILE: &str = "montserrat-bold.ttf";
pub const LOGO_FILE: &str = "logo.png";
pub const CURRENCY_FILE: &str = "amd.png";

const PAD: i32 = 20;
const LOGO_SIZE: u32 = 60;
const CURRENCY_SIZE: u32 = 25;
const BARCODE_HEIGHT: u32 = 45;
const MAX_MODULE_WIDTH: u32 = 6;
const ID_SIZE: f32 = 40.0;
const SIZE_LINE_SIZE: f32 = 32.0;
const TITLE_SIZE: f32 = 24.0;
const TITLE_WRAP: usize = 33;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Asset missing: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("Label drawing failed: {0}")]
    Canvas(#[from] PrintError),

    #[error("Could not write printed log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render task failed: {0}")]
    Task(String),
}

impl RenderError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::AssetMissing(_) => ErrorCode::AssetMissing,
            _ => ErrorCode::RenderFailed,
        }
    }
}

/// Renders labels from the font and images in the assets directory
#[derive(Debug, Clone)]
pub struct ImageLabelRenderer {
    assets_dir: PathBuf,
    printed_log: PathBuf,
}

impl ImageLabelRenderer {
    pub fn new(assets_dir: impl Into<PathBuf>, printed_log: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            printed_log: printed_log.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.assets_path(), config.printed_log_path())
    }
}

#[async_trait]
impl LabelRenderer for ImageLabelRenderer {
    #[instrument(skip(self, record), fields(product_id = record.product_id))]
    async fn render(&self, record: &ProductRecord, out: &Path) -> Result<(), RenderError> {
        let record = record.clone();
        let out = out.to_path_buf();
        let assets = self.assets_dir.clone();
        let printed_log = self.printed_log.clone();

        let task = tokio::task::spawn_blocking(move || {
            let canvas = draw_label(&record, &assets)?;
            canvas.save_jpeg(&out)?;
            append_printed_log(&printed_log, &record)?;
            debug!(path = %out.display(), "Label rendered");
            Ok::<(), RenderError>(())
        });

        match task.await {
            Ok(result) => result,
            // keep panics panics, the job runner reports them
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(RenderError::Task(e.to_string())),
        }
    }
}

fn asset(dir: &Path, name: &str) -> Result<PathBuf, RenderError> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(RenderError::AssetMissing(path))
    }
}

/// Compose the label for `record`
pub fn draw_label(record: &ProductRecord, assets: &Path) -> Result<LabelCanvas, RenderError> {
    let font = LabelCanvas::load_font(&asset(assets, FONT_FILE)?)?;
    let logo = LabelCanvas::load_image(&asset(assets, LOGO_FILE)?, Some(LOGO_SIZE))?;
    let currency = LabelCanvas::load_image(&asset(assets, CURRENCY_FILE)?, Some(CURRENCY_SIZE))?;

    let mut canvas = LabelCanvas::new(LABEL_WIDTH, LABEL_HEIGHT).with_font(font);
    let (width, height) = (LABEL_WIDTH as i32, LABEL_HEIGHT as i32);

    canvas.paste(&logo, width - LOGO_SIZE as i32 - PAD, PAD);

    let id = record.product_id.to_string();
    let modules = Code128::encode(&id)?.modules();
    let module_width =
        ((LABEL_WIDTH - 2 * PAD as u32) / modules.len() as u32).clamp(1, MAX_MODULE_WIDTH);
    let barcode_width = modules.len() as u32 * module_width;
    canvas.draw_barcode(
        &modules,
        module_width,
        BARCODE_HEIGHT,
        (width - barcode_width as i32) / 2,
        height - BARCODE_HEIGHT as i32,
    );
    let barcode_height = BARCODE_HEIGHT as i32;

    let from_bottom = TextStyle {
        center_x: true,
        rev_y: true,
        ..Default::default()
    };
    let (_, id_height) = canvas.draw_text(&id, 0, barcode_height + 2, ID_SIZE, from_bottom)?;
    let id_height = id_height as i32;

    let (symbol_width, symbol_height) = (currency.width() as i32, currency.height() as i32);
    let (price_width, _) = canvas.draw_text(
        &record.price_sale,
        (-symbol_width).div_euclid(2),
        barcode_height + id_height + 30,
        price_font_size(&record.price_sale),
        from_bottom,
    )?;
    canvas.paste(
        &currency,
        (width + price_width as i32 - symbol_width) / 2,
        height - barcode_height - id_height - symbol_height - 25,
    );

    let mut size_height = 0;
    if record.has_size() {
        let line = format!("Size: {}", record.size.trim());
        let (_, h) = canvas.draw_text(&line, PAD, PAD, SIZE_LINE_SIZE, TextStyle::default())?;
        size_height = h as i32;
    }

    let mut offset = 5;
    for line in wrap_text(&record.title, TITLE_WRAP) {
        let (_, h) = canvas.draw_text(
            &line,
            PAD,
            PAD + size_height + offset,
            TITLE_SIZE,
            TextStyle::default(),
        )?;
        offset += h as i32;
    }

    Ok(canvas)
}

/// Shorter prices get bigger digits
pub fn price_font_size(price: &str) -> f32 {
    match price.chars().count() {
        0..=5 => 165.0,
        6 => 138.0,
        _ => 115.0,
    }
}

/// Greedy word wrap; words longer than `width` are split
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let len = current.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn append_printed_log(path: &Path, record: &ProductRecord) -> Result<(), RenderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(log, "{}", record.printed_log_line())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn record() -> ProductRecord {
        ProductRecord {
            title: "PUMA Women's Classic X Barbie No Doll Suede Sneakers".to_string(),
            price_original: "59,000".to_string(),
            price_sale: "35,400".to_string(),
            product_id: 21264,
            size: "38".to_string(),
            brand_asset_path: None,
            promo_tag_paths: vec![],
            source_url: "https://topsale.am/product/puma-classic/21264/".to_string(),
        }
    }

    fn system_font() -> Option<PathBuf> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
    }

    fn write_assets(dir: &Path, font: &Path) {
        std::fs::copy(font, dir.join(FONT_FILE)).unwrap();
        RgbaImage::from_pixel(120, 120, Rgba([200, 0, 0, 255]))
            .save(dir.join(LOGO_FILE))
            .unwrap();
        RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 128]))
            .save(dir.join(CURRENCY_FILE))
            .unwrap();
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("PUMA Women's Classic X Barbie No Doll Suede Sneakers", 33),
            vec!["PUMA Women's Classic X Barbie No", "Doll Suede Sneakers"]
        );
        assert_eq!(wrap_text("  short  ", 33), vec!["short"]);
        assert!(wrap_text("   ", 33).is_empty());
        assert_eq!(wrap_text("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn test_price_font_size() {
        assert_eq!(price_font_size("9,900"), 165.0);
        assert_eq!(price_font_size("19,900"), 138.0);
        assert_eq!(price_font_size("129,900"), 115.0);
    }

    #[test]
    fn test_missing_assets() {
        let assets = tempfile::tempdir().unwrap();
        let err = draw_label(&record(), assets.path()).err().unwrap();
        match err {
            RenderError::AssetMissing(path) => assert!(path.ends_with(FONT_FILE)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_printed_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs/written.csv");

        append_printed_log(&log, &record()).unwrap();
        append_printed_log(&log, &record()).unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        let line = "21264,PUMA Women's Classic X Barbie No Doll Suede Sneakers,https://topsale.am/product/puma-classic/21264/";
        assert_eq!(content, format!("{line}\n{line}\n"));
    }

    #[tokio::test]
    async fn test_render_writes_jpeg_and_log() {
        let Some(font) = system_font() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path(), &font);
        let out = dir.path().join("label.jpg");
        let log = dir.path().join("written.csv");

        let renderer = ImageLabelRenderer::new(dir.path(), &log);
        renderer.render(&record(), &out).await.unwrap();

        let label = image::open(&out).unwrap();
        assert_eq!((label.width(), label.height()), (LABEL_WIDTH, LABEL_HEIGHT));
        // barcode bars reach the bottom edge
        let bottom = label.to_rgb8();
        assert!((0..LABEL_WIDTH).any(|x| bottom.get_pixel(x, LABEL_HEIGHT - 1).0[0] < 64));
        assert!(std::fs::read_to_string(&log).unwrap().starts_with("21264,"));
    }
}
