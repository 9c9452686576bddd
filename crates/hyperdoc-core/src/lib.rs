//! hyperdoc Core Library
//!
//! Client-side model for collection+json style hypermedia documents fetched
//! and persisted over HTTP.
//!
//! # Architecture
//!
//! - **HypermediaDocument**: loaded with one GET, saved with one PUT
//! - **LinkCollection / ItemCollection**: borrowed, read-only views built on
//!   demand from the document's raw links and items
//!
//! Server failures never surface as errors: a document that cannot be
//! fetched is empty, and a rejected save returns `false`.
//!
//! # Quick Start
//!
//! ```text
//! let mut doc = HypermediaDocument::load("https://api.example.com/", &token)?;
//!
//! // Find a search link by URN
//! if let Some(href) = doc.search("urn:collectiondoc:query:docs").and_then(|l| l.href.as_deref()) {
//!     println!("{}", href);
//! }
//!
//! // Change the payload and write it back
//! doc.set_data(serde_json::json!({"title": "Updated"}));
//! let saved = doc.save();
//! ```
//!
//! # Modules
//!
//! - `document`: Document root (load, links, items, search, save)
//! - `links`: Link entries and relation-scoped collections
//! - `items`: Item entries and their collection
//! - `template`: URI template expansion for link hrefs
//! - `transport`: HTTP client trait and the reqwest implementation
//! - `config`: Application configuration

mod attrs;
pub mod config;
pub mod document;
pub mod error;
pub mod items;
pub mod links;
pub mod template;
pub mod transport;

pub use config::Config;
pub use document::{DocumentFields, DocumentState, HypermediaDocument, SEARCH_REL};
pub use error::{DocumentError, DocumentResult, TransportError};
pub use items::{ItemCollection, ItemEntry};
pub use links::{LinkCollection, LinkEntry, Relations};
pub use template::TemplateParams;
pub use transport::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
