//! HTTP product fetcher
//!
//! GETs the product page (retrying while the shop answers 503), extracts
//! the product and caches brand/promo images under the cache directory.
//! A cached image is never downloaded again.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use shared::ProductRecord;
use tracing::{debug, info, instrument, warn};

use super::{FetchError, parse_product_page};
use crate::core::Config;
use crate::pipeline::ProductFetcher;

pub struct HttpProductFetcher {
    client: reqwest::Client,
    cache_dir: PathBuf,
    max_attempts: u32,
}

impl HttpProductFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout())
            .build()?;
        Ok(Self::with_client(
            client,
            config.cache_path(),
            config.fetch_max_attempts,
        ))
    }

    pub fn with_client(client: reqwest::Client, cache_dir: PathBuf, max_attempts: u32) -> Self {
        Self {
            client,
            cache_dir,
            max_attempts: max_attempts.max(1),
        }
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let mut attempt = 1;
        loop {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status == StatusCode::SERVICE_UNAVAILABLE && attempt < self.max_attempts {
                warn!(%url, attempt, "Shop unavailable, retrying");
                attempt += 1;
                continue;
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            return Ok(response);
        }
    }

    async fn download(&self, url: &Url, path: &Path) -> Result<(), FetchError> {
        let bytes = self.get(url).await?.bytes().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // complete files only, a cached name is trusted forever
        let partial = path.with_extension("part");
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, path).await?;
        Ok(())
    }

    /// Cached image path; `None` when the image cannot be had
    async fn cache_image(&self, page_url: &Url, src: &str, name: &str) -> Option<PathBuf> {
        let path = self.cache_dir.join(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(name, "Image cache hit");
            return Some(path);
        }

        let url = match page_url.join(src) {
            Ok(url) => url,
            Err(e) => {
                warn!(src, error = %e, "Unusable image URL");
                return None;
            }
        };

        match self.download(&url, &path).await {
            Ok(()) => {
                debug!(name, "Image cached");
                Some(path)
            }
            Err(e) => {
                warn!(%url, error = %e, "Image download failed");
                None
            }
        }
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}

#[async_trait]
impl ProductFetcher for HttpProductFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<ProductRecord, FetchError> {
        let page_url = parse_url(url)?;
        let html = self.get(&page_url).await?.text().await?;

        let page = parse_product_page(&html)?
            .ok_or_else(|| FetchError::ProductNotFound(url.to_string()))?;

        let brand_asset_path = match page.brand_asset() {
            Some((src, name)) => self.cache_image(&page_url, &src, &name).await,
            None => None,
        };

        let mut promo_tag_paths = Vec::new();
        for (src, name) in page.tag_assets() {
            if let Some(path) = self.cache_image(&page_url, &src, &name).await {
                promo_tag_paths.push(path);
            }
        }

        info!(product_id = page.product_id, title = %page.title, "Product fetched");

        Ok(ProductRecord {
            title: page.title,
            price_original: page.price_original,
            price_sale: page.price_sale,
            product_id: page.product_id,
            size: page.size,
            brand_asset_path,
            promo_tag_paths,
            source_url: url.to_string(),
        })
    }
}
