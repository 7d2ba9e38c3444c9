//! Product Model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Product data scraped from one product page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    /// Price before discount, digits and thousands separators ("0" if none)
    pub price_original: String,
    /// Current price, as printed on the label
    pub price_sale: String,
    pub product_id: u64,
    /// First size option, empty if the product has no sizes
    pub size: String,
    /// Cached brand logo, if the page had one we can use
    pub brand_asset_path: Option<PathBuf>,
    /// Cached promotional tag images, page order
    pub promo_tag_paths: Vec<PathBuf>,
    pub source_url: String,
}

impl ProductRecord {
    /// One line of the printed log: `product_id,title,source_url`
    pub fn printed_log_line(&self) -> String {
        format!("{},{},{}", self.product_id, self.title, self.source_url)
    }

    /// Whether the record carries a size worth printing
    pub fn has_size(&self) -> bool {
        !self.size.trim().is_empty()
    }
}
