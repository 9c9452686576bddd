//! Document command handlers

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use hyperdoc_core::{Config, HypermediaDocument, ReqwestClient, TemplateParams, SEARCH_REL};

use crate::output::Output;

/// Where to fetch the document from, as given on the command line
pub struct Target {
    pub url: Option<String>,
    pub token: Option<String>,
    pub config_path: Option<PathBuf>,
}

impl Target {
    /// Resolve URL, token and client settings, then fetch the document
    ///
    /// An empty document is reported as an error here: the library treats a
    /// failed fetch as a normal outcome, but a command has nothing to show.
    fn open(&self) -> Result<HypermediaDocument> {
        let config = Config::load_with_cli_override(self.config_path.as_ref())
            .context("Failed to load configuration")?;

        let url = self.url.clone().or(config.api_url.clone()).ok_or_else(|| {
            anyhow!(
                "No document URL. Pass --url or set one with `hyperdoc config set api_url <url>`."
            )
        })?;
        let token = self
            .token
            .clone()
            .or(config.access_token.clone())
            .ok_or_else(|| {
                anyhow!("No access token. Pass --token, set HYPERDOC_TOKEN, or run `hyperdoc config set access_token <token>`.")
            })?;

        let client = ReqwestClient::from_config(&config).context("Failed to create HTTP client")?;
        let doc = HypermediaDocument::load_with(Arc::new(client), &url, &token)?;

        if !doc.is_loaded() {
            bail!(
                "Could not load a document from {} (expected 200 OK with a JSON body). Run with -v for details.",
                url
            );
        }
        Ok(doc)
    }
}

/// Show a document summary
pub fn show(target: &Target, output: &Output) -> Result<()> {
    let doc = target.open()?;
    output.print_document(&doc);
    Ok(())
}

/// List the links of a relation
pub fn links(target: &Target, rel: String, output: &Output) -> Result<()> {
    let doc = target.open()?;
    output.print_links(&rel, &doc.links(&rel));
    Ok(())
}

/// List the document's items
pub fn items(target: &Target, output: &Output) -> Result<()> {
    let doc = target.open()?;
    output.print_items(&doc.items());
    Ok(())
}

/// Find a search link by URN and expand its template
pub fn search(
    target: &Target,
    urn: String,
    params: Vec<(String, String)>,
    output: &Output,
) -> Result<()> {
    let doc = target.open()?;

    let link = doc.search(&urn).ok_or_else(|| {
        let known: Vec<String> = doc
            .links(SEARCH_REL)
            .iter()
            .filter_map(|l| l.urn.clone())
            .collect();
        if known.is_empty() {
            anyhow!("Document has no search links")
        } else {
            anyhow!(
                "No search link with URN '{}'. Available: {}",
                urn,
                known.join(", ")
            )
        }
    })?;

    let expanded = if link.is_templated() || !params.is_empty() {
        let params: TemplateParams = params.into_iter().collect();
        link.expand(&params)
    } else {
        None
    };

    output.print_link(link, expanded.as_deref());
    Ok(())
}

/// Replace the document's data and save it
pub fn set_data(target: &Target, data: String, dry_run: bool, output: &Output) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(&data).context("Data must be valid JSON")?;

    let mut doc = target.open()?;
    doc.set_data(value);

    if dry_run {
        output.message(&format!("Would PUT to {}:", doc.url()));
        output.print_value(&doc.save_body());
        return Ok(());
    }

    if !doc.save() {
        bail!(
            "Server did not accept the document at {} (expected 202 Accepted)",
            doc.url()
        );
    }

    output.success(&format!("Saved {}", doc.url()));
    Ok(())
}

/// Parse a `key=value` template parameter
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("text=morning edition"),
            Ok(("text".to_string(), "morning edition".to_string()))
        );
        assert_eq!(parse_param("q="), Ok(("q".to_string(), String::new())));
        assert_eq!(parse_param("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=value").is_err());
    }
}
