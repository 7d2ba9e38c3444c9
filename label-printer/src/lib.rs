//! # label-printer
//!
//! Label printing library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Raster label canvas (text, pasted images, barcodes)
//! - Code 128 barcode encoding
//! - Single-page PDF documents from a JPEG, and blank pages
//! - Network printing (raw TCP port 9100)
//! - Spooler command printing (`lp`, `lpr`, a vendor tool)
//! - Label dispatch with an optional trailing blank page
//!
//! Business logic (WHAT goes on the label) stays in `label-server`.
//!
//! ## Example
//!
//! ```ignore
//! use label_printer::{AnyPrinter, CommandPrinter, LabelDispatcher};
//!
//! let printer = AnyPrinter::Command(CommandPrinter::parse("lp -d Zebra")?);
//! let dispatcher = LabelDispatcher::new(printer, "/var/lib/labels");
//! dispatcher.print_label("/var/lib/labels/label.jpg".as_ref(), true).await?;
//! ```

mod barcode;
mod dispatcher;
mod document;
mod error;
mod printer;
mod raster;

// Re-exports
pub use barcode::Code128;
pub use dispatcher::{DEFAULT_BLANK_DELAY, LABEL_PDF_FILE, LabelDispatcher};
pub use document::{PdfBuilder, blank_page_pdf, image_to_pdf, jpeg_page_pdf};
pub use error::{PrintError, PrintResult};
pub use printer::{
    AnyPrinter, CommandPrinter, FILE_PLACEHOLDER, NetworkPrinter, Printer, RAW_PORT,
};
pub use raster::{LabelCanvas, TextStyle};
