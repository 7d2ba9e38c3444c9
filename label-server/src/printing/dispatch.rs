use std::path::{Path, PathBuf};

use async_trait::async_trait;
use label_printer::{
    AnyPrinter, CommandPrinter, LabelDispatcher, NetworkPrinter, PrintError,
    Printer,
};
use shared::ErrorCode;
use thiserror::Error;
use tracing::info;

use crate::core::config::{Config, PrinterMode};
use crate::pipeline::PrintDispatcher;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Label image not found: {}", .0.display())]
    DocumentMissing(PathBuf),

    #[error("Printing failed: {0}")]
    Print(#[from] PrintError),
}

impl DispatchError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Print(e) if e.is_unreachable() => ErrorCode::PrinterNotAvailable,
            _ => ErrorCode::PrintFailed,
        }
    }
}

/// Build the printer described by the configuration
///
/// Spooler commands get the document path as their last argument unless
/// they place [`label_printer::FILE_PLACEHOLDER`] themselves.
pub fn printer_from_config(config: &Config) -> Result<AnyPrinter, PrintError> {
    match config.printer_mode {
        PrinterMode::Command => {
            let printer = CommandPrinter::parse(&config.printer_command)?;
            info!(command = %config.printer_command.trim(), "Using spooler command printer");
            Ok(AnyPrinter::Command(printer))
        }
        PrinterMode::Network => {
            info!(addr = %config.printer_addr, "Using network printer");
            Ok(AnyPrinter::Network(NetworkPrinter::from_addr(
                &config.printer_addr,
            )?))
        }
    }
}

pub fn dispatcher_from_config(config: &Config) -> Result<LabelDispatcher<AnyPrinter>, PrintError> {
    Ok(LabelDispatcher::new(printer_from_config(config)?, &config.work_dir)
        .with_blank_page(config.blank_page_path())
        .with_blank_delay(config.blank_delay()))
}

#[async_trait]
impl<P: Printer + 'static> PrintDispatcher for LabelDispatcher<P> {
    async fn dispatch(&self, document: &Path, trailing_blank: bool) -> Result<(), DispatchError> {
        if !tokio::fs::try_exists(document).await.unwrap_or(false) {
            return Err(DispatchError::DocumentMissing(document.to_path_buf()));
        }
        self.print_label(document, trailing_blank).await?;
        Ok(())
    }
}
