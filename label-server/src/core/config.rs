use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::ServerError;

/// File name of the rendered label inside the work directory
pub const LABEL_IMAGE_FILE: &str = "label.jpg";

/// How finished documents reach the printer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrinterMode {
    /// Spawn a spooler command (`lp`, `lpr`, a vendor tool)
    #[default]
    Command,
    /// Raw TCP to port 9100
    Network,
}

impl FromStr for PrinterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" | "spooler" => Ok(Self::Command),
            "network" | "raw" | "tcp" => Ok(Self::Network),
            other => Err(format!("unknown printer mode: {}", other)),
        }
    }
}

/// Label server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_HOST | 127.0.0.1 | listen host |
/// | HTTP_PORT | 6969 | listen port |
/// | WORK_DIR | . | label.jpg / label.pdf location |
/// | ASSETS_DIR | assets | font, logo and currency images |
/// | CACHE_DIR | .cache | downloaded brand and tag images |
/// | PRINTED_LOG | written.csv | append-only log of printed products |
/// | PRINTER_MODE | command | `command` or `network` |
/// | PRINTER_COMMAND | lp | spooler command line |
/// | PRINTER_ADDR | 127.0.0.1:9100 | raw TCP printer |
/// | BLANK_PAGE | (generated) | pre-made trailing blank document |
/// | BLANK_DELAY_MS | 750 | pause before the trailing blank |
/// | FETCH_MAX_ATTEMPTS | 5 | attempts while the shop answers 503 |
/// | FETCH_TIMEOUT_MS | 15000 | per-request HTTP timeout |
/// | USER_AGENT | Mozilla/5.0 | scraper user agent |
/// | JOB_TIMEOUT_MS | 0 | whole-job watchdog, 0 disables it |
/// | LOG_LEVEL | info | tracing filter when RUST_LOG is unset |
/// | LOG_DIR | (unset) | daily rolling log files |
///
/// Relative asset, cache and log paths are resolved against `WORK_DIR`.
///
/// ```ignore
/// HTTP_PORT=7000 PRINTER_MODE=network PRINTER_ADDR=10.0.0.40:9100 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub work_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub printed_log: PathBuf,

    pub printer_mode: PrinterMode,
    pub printer_command: String,
    pub printer_addr: String,
    pub blank_page: Option<PathBuf>,
    pub blank_delay_ms: u64,

    pub fetch_max_attempts: u32,
    pub fetch_timeout_ms: u64,
    pub user_agent: String,

    /// 0 disables the watchdog
    pub job_timeout_ms: u64,

    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http_host: env_or("HTTP_HOST", "127.0.0.1"),
            http_port: env_parse("HTTP_PORT", 6969),
            work_dir: env_or("WORK_DIR", ".").into(),
            assets_dir: env_or("ASSETS_DIR", "assets").into(),
            cache_dir: env_or("CACHE_DIR", ".cache").into(),
            printed_log: env_or("PRINTED_LOG", "written.csv").into(),

            printer_mode: env_parse("PRINTER_MODE", PrinterMode::Command),
            printer_command: env_or("PRINTER_COMMAND", "lp"),
            printer_addr: env_or("PRINTER_ADDR", "127.0.0.1:9100"),
            blank_page: env_opt("BLANK_PAGE").map(PathBuf::from),
            blank_delay_ms: env_parse("BLANK_DELAY_MS", 750),

            fetch_max_attempts: env_parse("FETCH_MAX_ATTEMPTS", 5),
            fetch_timeout_ms: env_parse("FETCH_TIMEOUT_MS", 15_000),
            user_agent: env_or("USER_AGENT", "Mozilla/5.0"),

            job_timeout_ms: env_parse("JOB_TIMEOUT_MS", 0),

            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// Override the work directory and port
    ///
    /// Mostly used by tests
    pub fn with_overrides(work_dir: impl Into<PathBuf>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Reject settings no job could run with
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.fetch_max_attempts == 0 {
            return Err(ServerError::Config(
                "FETCH_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ServerError::Config(
                "FETCH_TIMEOUT_MS must be positive".to_string(),
            ));
        }
        if self.http_host.trim().is_empty() {
            return Err(ServerError::Config("HTTP_HOST is empty".to_string()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Resolve a configured path against the work directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    pub fn assets_path(&self) -> PathBuf {
        self.resolve(&self.assets_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.resolve(&self.cache_dir)
    }

    pub fn printed_log_path(&self) -> PathBuf {
        self.resolve(&self.printed_log)
    }

    pub fn blank_page_path(&self) -> Option<PathBuf> {
        self.blank_page.as_deref().map(|p| self.resolve(p))
    }

    pub fn label_image_path(&self) -> PathBuf {
        self.work_dir.join(LABEL_IMAGE_FILE)
    }

    pub fn blank_delay(&self) -> Duration {
        Duration::from_millis(self.blank_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        (self.job_timeout_ms > 0).then(|| Duration::from_millis(self.job_timeout_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printer_mode_parse() {
        assert_eq!("command".parse::<PrinterMode>(), Ok(PrinterMode::Command));
        assert_eq!(" Network ".parse::<PrinterMode>(), Ok(PrinterMode::Network));
        assert_eq!("raw".parse::<PrinterMode>(), Ok(PrinterMode::Network));
        assert!("serial".parse::<PrinterMode>().is_err());
    }

    #[test]
    fn test_paths_resolve_against_work_dir() {
        let mut config = Config::with_overrides("/srv/labels", 0);
        config.assets_dir = "assets".into();
        config.cache_dir = "/var/cache/labels".into();
        config.blank_page = Some("blank.pdf".into());

        assert_eq!(config.assets_path(), PathBuf::from("/srv/labels/assets"));
        assert_eq!(config.cache_path(), PathBuf::from("/var/cache/labels"));
        assert_eq!(
            config.blank_page_path(),
            Some(PathBuf::from("/srv/labels/blank.pdf"))
        );
        assert_eq!(
            config.label_image_path(),
            PathBuf::from("/srv/labels/label.jpg")
        );
    }

    #[test]
    fn test_job_timeout_disabled_by_zero() {
        let mut config = Config::with_overrides(".", 0);
        config.job_timeout_ms = 0;
        assert_eq!(config.job_timeout(), None);
        config.job_timeout_ms = 1500;
        assert_eq!(config.job_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        let mut config = Config::with_overrides(".", 0);
        config.http_host = "127.0.0.1".into();
        config.fetch_max_attempts = 5;
        config.fetch_timeout_ms = 15_000;
        assert!(config.validate().is_ok());

        config.fetch_max_attempts = 0;
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));

        config.fetch_max_attempts = 1;
        config.fetch_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let mut config = Config::with_overrides(".", 6969);
        config.http_host = "127.0.0.1".into();
        assert_eq!(config.bind_addr(), "127.0.0.1:6969");
    }
}
