use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// development configuration pointed at `./outputs` and `./output`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("GROCER_ENV", "development"))?;
    let bind_addr = parse_addr("GROCER_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("GROCER_LOG_LEVEL", "info");

    let artifacts_dir = PathBuf::from(or_default("GROCER_ARTIFACTS_DIR", "outputs"));
    let html_dir = PathBuf::from(or_default("GROCER_HTML_DIR", "output"));
    let tools_dir = PathBuf::from(or_default("GROCER_TOOLS_DIR", "."));
    let node_bin = or_default("GROCER_NODE_BIN", "node");
    let parser_script = PathBuf::from(or_default(
        "GROCER_PARSER_SCRIPT",
        "unified-html-parser.js",
    ));
    let scraper_script = PathBuf::from(or_default(
        "GROCER_SCRAPER_SCRIPT",
        "location-selector-orchestrator.js",
    ));

    let settle_poll_interval_ms = parse_u64("GROCER_SETTLE_POLL_INTERVAL_MS", "250")?;
    let settle_max_polls = parse_u32("GROCER_SETTLE_MAX_POLLS", "8")?;
    if settle_max_polls == 0 {
        return Err(invalid("GROCER_SETTLE_MAX_POLLS", "must be at least 1".to_string()));
    }

    let process_timeout_secs = match lookup("GROCER_PROCESS_TIMEOUT_SECS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| invalid("GROCER_PROCESS_TIMEOUT_SECS", e.to_string()))?,
        ),
        _ => None,
    };

    let max_upload_bytes = parse_usize("GROCER_MAX_UPLOAD_BYTES", "10485760")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        artifacts_dir,
        html_dir,
        tools_dir,
        node_bin,
        parser_script,
        scraper_script,
        settle_poll_interval_ms,
        settle_max_polls,
        process_timeout_secs,
        max_upload_bytes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GROCER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
