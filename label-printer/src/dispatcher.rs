//! Label dispatch: image → PDF → printer, with an optional blank page

use crate::document::{blank_page_pdf, image_to_pdf};
use crate::error::PrintResult;
use crate::printer::Printer;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// File name of the converted label inside the work directory
pub const LABEL_PDF_FILE: &str = "label.pdf";

/// Pause between the label and the trailing blank page
pub const DEFAULT_BLANK_DELAY: Duration = Duration::from_millis(750);

/// Sends finished label images to a printer
///
/// The converted document is kept as `label.pdf` in the work directory so
/// the last printed label can be reprinted by hand.
pub struct LabelDispatcher<P: Printer> {
    printer: P,
    work_dir: PathBuf,
    blank_page: Option<PathBuf>,
    blank_delay: Duration,
}

impl<P: Printer> LabelDispatcher<P> {
    pub fn new(printer: P, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            printer,
            work_dir: work_dir.into(),
            blank_page: None,
            blank_delay: DEFAULT_BLANK_DELAY,
        }
    }

    /// Use a pre-made document for the trailing blank instead of a generated page
    pub fn with_blank_page(mut self, path: Option<PathBuf>) -> Self {
        self.blank_page = path;
        self
    }

    pub fn with_blank_delay(mut self, delay: Duration) -> Self {
        self.blank_delay = delay;
        self
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    pub fn label_pdf_path(&self) -> PathBuf {
        self.work_dir.join(LABEL_PDF_FILE)
    }

    /// Print the label image, then a blank page if `trailing_blank`
    #[instrument(skip(self))]
    pub async fn print_label(&self, image_path: &Path, trailing_blank: bool) -> PrintResult<()> {
        let (pdf, (width, height)) = image_to_pdf(image_path)?;
        let pdf_path = self.label_pdf_path();
        tokio::fs::write(&pdf_path, &pdf).await?;
        debug!(path = %pdf_path.display(), width, height, "Label document written");

        self.printer.print(&pdf).await?;
        info!("Label sent to printer");

        if trailing_blank {
            tokio::time::sleep(self.blank_delay).await;

            let blank = match &self.blank_page {
                Some(path) => tokio::fs::read(path).await?,
                None => blank_page_pdf(width, height),
            };
            self.printer.print(&blank).await?;
            info!("Trailing blank page sent");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrintError;
    use image::{Rgb, RgbImage};
    use std::sync::{Arc, Mutex};

    /// Records every document it is asked to print
    #[derive(Clone, Default)]
    struct RecordingPrinter {
        jobs: Arc<Mutex<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl Printer for RecordingPrinter {
        async fn print(&self, data: &[u8]) -> PrintResult<()> {
            if self.fail {
                return Err(PrintError::Connection("printer offline".to_string()));
            }
            self.jobs.lock().unwrap().push(data.to_vec());
            Ok(())
        }
    }

    fn write_label(dir: &Path) -> PathBuf {
        let path = dir.join("label.jpg");
        RgbImage::from_pixel(58, 40, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_label_only() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_label(dir.path());
        let printer = RecordingPrinter::default();
        let dispatcher = LabelDispatcher::new(printer.clone(), dir.path());

        dispatcher.print_label(&image, false).await.unwrap();

        let jobs = printer.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(String::from_utf8_lossy(&jobs[0]).contains("/DCTDecode"));
        assert_eq!(std::fs::read(dir.path().join(LABEL_PDF_FILE)).unwrap(), jobs[0]);
    }

    #[tokio::test]
    async fn test_trailing_blank_follows_label() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_label(dir.path());
        let printer = RecordingPrinter::default();
        let dispatcher = LabelDispatcher::new(printer.clone(), dir.path())
            .with_blank_delay(Duration::from_millis(1));

        dispatcher.print_label(&image, true).await.unwrap();

        let jobs = printer.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(String::from_utf8_lossy(&jobs[0]).contains("/Im0 Do"));
        assert_eq!(jobs[1], blank_page_pdf(58, 40));
    }

    #[tokio::test]
    async fn test_configured_blank_page() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_label(dir.path());
        let blank = dir.path().join("blank.pdf");
        std::fs::write(&blank, b"%PDF-1.4 blank").unwrap();

        let printer = RecordingPrinter::default();
        let dispatcher = LabelDispatcher::new(printer.clone(), dir.path())
            .with_blank_page(Some(blank))
            .with_blank_delay(Duration::ZERO);

        dispatcher.print_label(&image, true).await.unwrap();

        let jobs = printer.jobs.lock().unwrap();
        assert_eq!(jobs[1], b"%PDF-1.4 blank");
    }

    #[tokio::test]
    async fn test_printer_failure_skips_blank() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_label(dir.path());
        let printer = RecordingPrinter {
            fail: true,
            ..Default::default()
        };
        let dispatcher = LabelDispatcher::new(printer.clone(), dir.path());

        let err = dispatcher.print_label(&image, true).await.unwrap_err();
        assert!(err.is_unreachable());
        assert!(printer.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = LabelDispatcher::new(RecordingPrinter::default(), dir.path());
        assert!(
            dispatcher
                .print_label(&dir.path().join("nope.jpg"), false)
                .await
                .is_err()
        );
        assert!(!dir.path().join(LABEL_PDF_FILE).exists());
    }
}
