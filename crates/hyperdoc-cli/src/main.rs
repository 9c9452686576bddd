//! hyperdoc CLI
//!
//! Command-line interface for browsing and editing collection+json
//! hypermedia documents.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use hyperdoc_core::Config;

mod commands;
mod logging;
mod output;

use commands::document::{parse_param, Target};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "hyperdoc")]
#[command(about = "hyperdoc - Browse and edit hypermedia documents over HTTP")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default
    #[arg(long = "config", global = true)]
    config_path: Option<PathBuf>,

    /// Document URL (defaults to api_url from config)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Bearer access token (defaults to HYPERDOC_TOKEN or config)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a document summary
    Show,
    /// List the links of a relation
    Links {
        /// Link relation (e.g. search, self, profile)
        rel: String,
    },
    /// List the document's items
    #[command(alias = "ls")]
    Items,
    /// Find the search link for a URN
    Search {
        /// URN of the search link
        urn: String,
        /// Template value as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Replace the document's data and save it
    SetData {
        /// New data payload as JSON
        data: String,
        /// Print the request body instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, access_token, timeout_secs, user_agent, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // A broken config file is reported by the command itself
    let config_level = Config::load_with_cli_override(cli.config_path.as_ref())
        .ok()
        .and_then(|config| config.log_level);
    logging::init(cli.verbose, config_level.as_deref());

    let target = Target {
        url: cli.url,
        token: cli.token,
        config_path: cli.config_path,
    };

    match cli.command {
        Commands::Show => commands::document::show(&target, &output),
        Commands::Links { rel } => commands::document::links(&target, rel, &output),
        Commands::Items => commands::document::items(&target, &output),
        Commands::Search { urn, params } => {
            commands::document::search(&target, urn, params, &output)
        }
        Commands::SetData { data, dry_run } => {
            commands::document::set_data(&target, data, dry_run, &output)
        }
        Commands::Config { command } => {
            handle_config_command(command, target.config_path.as_ref(), &output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_params() {
        let cli = Cli::try_parse_from([
            "hyperdoc",
            "--url",
            "https://api.example.com/",
            "search",
            "urn:collectiondoc:query:docs",
            "-p",
            "text=jazz",
            "--param",
            "limit=5",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://api.example.com/"));
        match cli.command {
            Commands::Search { urn, params } => {
                assert_eq!(urn, "urn:collectiondoc:query:docs");
                assert_eq!(
                    params,
                    vec![
                        ("text".to_string(), "jazz".to_string()),
                        ("limit".to_string(), "5".to_string())
                    ]
                );
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_param() {
        let result = Cli::try_parse_from(["hyperdoc", "search", "urn:x", "--param", "oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_is_counted() {
        let cli = Cli::try_parse_from(["hyperdoc", "-vv", "show"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Show));
    }

    #[test]
    fn test_set_data_dry_run() {
        let cli =
            Cli::try_parse_from(["hyperdoc", "set-data", r#"{"title":"x"}"#, "--dry-run"]).unwrap();
        match cli.command {
            Commands::SetData { data, dry_run } => {
                assert_eq!(data, r#"{"title":"x"}"#);
                assert!(dry_run);
            }
            _ => panic!("expected set-data command"),
        }
    }
}
