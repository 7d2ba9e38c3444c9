//! Label Server - prints shop labels for product pages
//!
//! # Architecture
//!
//! A browser extension POSTs a product URL; the server scrapes the product,
//! renders a label and prints it. Only one print job runs at a time:
//! requests arriving while a job holds the gate are turned away at once.
//!
//! # Module structure
//!
//! ```text
//! label-server/src/
//! ├── core/          # config, state, server, errors
//! ├── gate.rs        # single-flight admission
//! ├── pipeline.rs    # fetch → render → print
//! ├── scraper/       # product page fetching and extraction
//! ├── printing/      # label layout and printer dispatch
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod core;
pub mod gate;
pub mod pipeline;
pub mod printing;
pub mod scraper;
pub mod utils;

pub use api::build_app;
pub use core::{Config, Server, ServerError, ServerState};
pub use gate::{GatePermit, SingleFlightGate};
pub use pipeline::{
    FailureKind, JobFailure, JobOutcome, JobPipeline, LabelRenderer, PrintDispatcher,
    ProductFetcher,
};

pub use utils::logger::init_logger_with_file;

/// Load `.env`, start logging and return the configuration
pub fn setup_environment() -> Config {
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}

pub fn print_banner() {
    println!(
        r#"
    __          __         __
   / /   ____ _/ /_  ___  / /
  / /   / __ `/ __ \/ _ \/ /
 / /___/ /_/ / /_/ /  __/ /
/_____/\__,_/_.___/\___/_/   server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
