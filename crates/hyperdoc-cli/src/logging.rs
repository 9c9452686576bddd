//! Logging setup
//!
//! Logs go to stderr so `--json` output on stdout stays parseable.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides every other level source
const LOG_ENV: &str = "HYPERDOC_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber
pub fn init(verbose: u8, config_level: Option<&str>) {
    let level = resolve_level(std::env::var(LOG_ENV).ok(), verbose, config_level);
    let env_filter = EnvFilter::new(format!("hyperdoc_core={},hyperdoc_cli={}", level, level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Pick the log level: env var, then -v count, then config, then warn
fn resolve_level(env_level: Option<String>, verbose: u8, config_level: Option<&str>) -> String {
    if let Some(level) = env_level.filter(|l| !l.is_empty()) {
        return level;
    }
    match verbose {
        0 => config_level.unwrap_or(DEFAULT_LEVEL).to_string(),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    }
}
