//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::json;

use hyperdoc_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let token = config.access_token.as_deref().map(mask_token);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({
                    "api_url": config.api_url,
                    "access_token": token,
                    "timeout_secs": config.timeout_secs,
                    "user_agent": config.user_agent,
                    "log_level": config.log_level
                })
            );
        }
        OutputFormat::Quiet => {
            if let Some(ref url) = config.api_url {
                println!("{}", url);
            }
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!(
                "  api_url:      {}",
                config.api_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  access_token: {}",
                token.as_deref().unwrap_or("(not set)")
            );
            println!("  timeout_secs: {}", config.timeout_secs);
            println!(
                "  user_agent:   {}",
                config.user_agent.as_deref().unwrap_or("(default)")
            );
            println!(
                "  log_level:    {}",
                config.log_level.as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match key.as_str() {
        "api_url" => {
            config.api_url = optional(&value);
        }
        "access_token" => {
            config.access_token = optional(&value);
        }
        "timeout_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for timeout_secs. Use a whole number of seconds.")?;
            if secs == 0 {
                bail!("timeout_secs must be greater than zero");
            }
            config.timeout_secs = secs;
        }
        "user_agent" => {
            config.user_agent = optional(&value);
        }
        "log_level" => {
            config.log_level = optional(&value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: api_url, access_token, timeout_secs, user_agent, log_level",
                key
            );
        }
    }

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "access_token" {
        mask_token(&value)
    } else {
        value
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

/// Empty string or "none" clears a value
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Show only the last four characters of a token
fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        "****".to_string()
    } else {
        let tail: String = token.chars().skip(count - 4).collect();
        format!("****{}", tail)
    }
}
