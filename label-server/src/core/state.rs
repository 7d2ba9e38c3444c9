use std::sync::Arc;

use tracing::info;

use crate::core::{Config, Result};
use crate::gate::SingleFlightGate;
use crate::pipeline::JobPipeline;
use crate::printing::{ImageLabelRenderer, dispatcher_from_config};
use crate::scraper::HttpProductFetcher;

/// Server state - one gate and one pipeline for the server's lifetime
///
/// Cloning is cheap; every handler gets its own handle to the same gate.
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Arc<Config> | configuration (immutable) |
/// | gate | SingleFlightGate | single-flight print admission |
/// | pipeline | Arc<JobPipeline> | fetch → render → print |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub gate: SingleFlightGate,
    pub pipeline: Arc<JobPipeline>,
}

impl ServerState {
    /// State around an already assembled pipeline
    pub fn new(config: Config, pipeline: JobPipeline) -> Self {
        Self {
            config: Arc::new(config),
            gate: SingleFlightGate::new(),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build the production collaborators from configuration
    pub fn initialize(config: &Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.work_dir)?;
        std::fs::create_dir_all(config.cache_path())?;

        let fetcher = HttpProductFetcher::new(config)?;
        let renderer = ImageLabelRenderer::from_config(config);
        let dispatcher = dispatcher_from_config(config)?;

        let pipeline = JobPipeline::new(
            Arc::new(fetcher),
            Arc::new(renderer),
            Arc::new(dispatcher),
            config.label_image_path(),
        )
        .with_timeout(config.job_timeout());

        info!(
            work_dir = %config.work_dir.display(),
            assets = %config.assets_path().display(),
            printer = ?config.printer_mode,
            "Server state initialized"
        );

        Ok(Self::new(config.clone(), pipeline))
    }
}
