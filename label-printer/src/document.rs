//! PDF document builder
//!
//! Produces the single-page documents the spooler prints: a label image
//! embedded as a JPEG (`DCTDecode`), or an empty page of the same size.
//! Page size is the image size in points, so one pixel maps to 1/72 inch.

use crate::error::PrintResult;
use image::codecs::jpeg::JpegEncoder;
use std::path::Path;
use tracing::instrument;

const JPEG_QUALITY: u8 = 92;

/// Low-level PDF object writer
///
/// Objects are numbered from 1 in the order they are added; `build`
/// writes the cross-reference table and trailer.
pub struct PdfBuilder {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(16 * 1024);
        buf.extend_from_slice(b"%PDF-1.4\n");
        // Binary marker so transfer tools treat the file as binary
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Number the next object will get
    pub fn next_id(&self) -> usize {
        self.offsets.len() + 1
    }

    /// Add a dictionary object
    pub fn object(&mut self, dict: &str) -> usize {
        let id = self.begin_object();
        self.buf.extend_from_slice(dict.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
        id
    }

    /// Add a stream object; `/Length` is appended to `dict_entries`
    pub fn stream(&mut self, dict_entries: &str, data: &[u8]) -> usize {
        let id = self.begin_object();
        let header = format!("<< {} /Length {} >>\nstream\n", dict_entries, data.len());
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        id
    }

    fn begin_object(&mut self) -> usize {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        id
    }

    /// Finish the document with `root` as the catalog object
    pub fn build(mut self, root: usize) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;

        self.buf
            .extend_from_slice(format!("xref\n0 {}\n", size).as_bytes());
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &self.offsets {
            self.buf
                .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                size, root, xref_offset
            )
            .as_bytes(),
        );
        self.buf
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog, page tree and one page whose contents are `content`
fn single_page(width: u32, height: u32, resources: &str, content: &[u8], pdf: &mut PdfBuilder) -> usize {
    let catalog = pdf.next_id();
    let pages = catalog + 1;
    let page = catalog + 2;
    let contents = catalog + 3;

    pdf.object(&format!("<< /Type /Catalog /Pages {} 0 R >>", pages));
    pdf.object(&format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page));
    pdf.object(&format!(
        "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} /Contents {} 0 R >>",
        pages, width, height, resources, contents
    ));
    pdf.stream("", content);
    catalog
}

/// One page showing a baseline RGB JPEG stretched over the whole page
pub fn jpeg_page_pdf(jpeg: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut pdf = PdfBuilder::new();
    let image_id = pdf.next_id() + 4;
    let draw = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", width, height);
    let root = single_page(
        width,
        height,
        &format!("<< /XObject << /Im0 {} 0 R >> >>", image_id),
        draw.as_bytes(),
        &mut pdf,
    );
    pdf.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
            width, height
        ),
        jpeg,
    );
    pdf.build(root)
}

/// One empty page
pub fn blank_page_pdf(width: u32, height: u32) -> Vec<u8> {
    let mut pdf = PdfBuilder::new();
    let root = single_page(width, height, "<< >>", b"", &mut pdf);
    pdf.build(root)
}

/// Convert a label image file into a one-page PDF sized to the image
///
/// Returns the document and the page size.
#[instrument]
pub fn image_to_pdf(path: &Path) -> PrintResult<(Vec<u8>, (u32, u32))> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;

    Ok((jpeg_page_pdf(&jpeg, width, height), (width, height)))
}
