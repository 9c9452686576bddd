//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use serde_json::json;

use hyperdoc_core::{HypermediaDocument, ItemCollection, LinkCollection, LinkEntry};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a document summary
    pub fn print_document(&self, doc: &HypermediaDocument) {
        match self.format {
            OutputFormat::Human => {
                println!("URL:       {}", doc.url());
                println!(
                    "Version:   {}",
                    doc.version().map(plain).unwrap_or_else(|| "(none)".to_string())
                );

                let relations: Vec<String> = doc
                    .relations()
                    .into_iter()
                    .map(|rel| format!("{} ({})", rel, doc.links(rel).len()))
                    .collect();
                if relations.is_empty() {
                    println!("Links:     (none)");
                } else {
                    println!("Links:     {}", relations.join(", "));
                }
                println!("Items:     {}", doc.items().len());

                if let Some(fields) = doc.fields() {
                    if !fields.extra.is_empty() {
                        let keys: Vec<&str> = fields.extra.keys().map(String::as_str).collect();
                        println!("Other:     {}", keys.join(", "));
                    }
                }
                if let Some(data) = doc.data() {
                    println!();
                    println!("── Data ──");
                    println!("{}", pretty(data));
                }
            }
            OutputFormat::Json => {
                print_json(&json!({
                    "url": doc.url(),
                    "document": doc.fields(),
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", doc.url());
            }
        }
    }

    /// Print the links of one relation
    pub fn print_links(&self, rel: &str, links: &LinkCollection<'_>) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links for relation '{}'.", rel);
                    return;
                }
                for link in links {
                    println!(
                        "{} | {}{}",
                        truncate(link.urn.as_deref().unwrap_or("-"), 40),
                        truncate(link.href.as_deref().unwrap_or("-"), 60),
                        link.title
                            .as_ref()
                            .map(|t| format!(" | {}", truncate(&plain(t), 40)))
                            .unwrap_or_default()
                    );
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => {
                print_json(links.as_slice());
            }
            OutputFormat::Quiet => {
                for href in links.iter().filter_map(|link| link.href.as_deref()) {
                    println!("{}", href);
                }
            }
        }
    }

    /// Print a single link, with its expanded href when there is one
    pub fn print_link(&self, link: &LinkEntry, expanded: Option<&str>) {
        match self.format {
            OutputFormat::Human => {
                println!("URN:      {}", link.urn.as_deref().unwrap_or("(none)"));
                println!("Href:     {}", link.href.as_deref().unwrap_or("(none)"));
                if let Some(url) = expanded {
                    println!("Expanded: {}", url);
                }
                if let Some(ref title) = link.title {
                    println!("Title:    {}", plain(title));
                }
                for (name, value) in &link.extra {
                    println!("{}: {}", name, value);
                }
            }
            OutputFormat::Json => {
                print_json(&json!({
                    "link": link,
                    "expanded": expanded,
                }));
            }
            OutputFormat::Quiet => {
                if let Some(href) = expanded.or(link.href.as_deref()) {
                    println!("{}", href);
                }
            }
        }
    }

    /// Print the items of a document
    pub fn print_items(&self, items: &ItemCollection<'_>) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No items found.");
                    return;
                }
                for item in items {
                    let title = item
                        .data_field("title")
                        .and_then(|t| t.as_str())
                        .unwrap_or("(untitled)");
                    println!(
                        "{} | {}",
                        truncate(item.href.as_deref().unwrap_or("-"), 60),
                        truncate(title, 50)
                    );
                }
                println!("\n{} item(s)", items.len());
            }
            OutputFormat::Json => {
                print_json(items.as_slice());
            }
            OutputFormat::Quiet => {
                for item in items {
                    if let Some(ref href) = item.href {
                        println!("{}", href);
                    }
                }
            }
        }
    }

    /// Print any serializable value (the body of a dry run)
    pub fn print_value<T: Serialize + ?Sized>(&self, value: &T) {
        match self.format {
            OutputFormat::Quiet => {}
            _ => print_json(value),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Strings without quotes, anything else as compact JSON
fn plain(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
