use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding `*-parsed.json` and `parsed-results-*.json` artifacts.
    /// Uploaded HTML files are written here as well.
    pub artifacts_dir: PathBuf,
    /// Directory the external scraper writes raw `.html` pages into.
    pub html_dir: PathBuf,
    /// Working directory for the external scraper and parser processes.
    pub tools_dir: PathBuf,
    pub node_bin: String,
    pub parser_script: PathBuf,
    pub scraper_script: PathBuf,
    pub settle_poll_interval_ms: u64,
    pub settle_max_polls: u32,
    /// `None` means external processes may run indefinitely.
    pub process_timeout_secs: Option<u64>,
    pub max_upload_bytes: usize,
}
