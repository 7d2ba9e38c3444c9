//! Label rendering and printing
//!
//! - [`renderer`] - lays out the product label image
//! - [`dispatch`] - hands the image to the configured printer

pub mod dispatch;
pub mod renderer;

pub use dispatch::{DispatchError, dispatcher_from_config, printer_from_config};
pub use renderer::{ImageLabelRenderer, RenderError};
