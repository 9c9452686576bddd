//! Hypermedia document handling
//!
//! A [`HypermediaDocument`] is fetched from a URL with a bearer token, exposes
//! its links and items as borrowed views, and can be written back with
//! [`HypermediaDocument::save`].
//!
//! Loading never fails because of the server: anything other than a `200`
//! with a JSON object body leaves the document [`DocumentState::Empty`].
//! Beyond that nothing is validated: fields of an unexpected shape are kept
//! verbatim as extra keys.

use std::sync::Arc;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::attrs;
use crate::error::{DocumentError, DocumentResult};
use crate::items::{self, ItemCollection, ItemEntry};
use crate::links::{self, LinkCollection, LinkEntry, Relations};
use crate::template::TemplateParams;
use crate::transport::{self, HttpClient, ReqwestClient, SaveBody};

/// Relation holding the document's search links
pub const SEARCH_REL: &str = "search";

/// Top-level fields of a fetched document
///
/// `version`, `data`, `links` and `items` are interpreted; every other key is
/// kept verbatim in `extra`. So is a `links` value that is not an object of
/// link arrays, or an `items` value that is not an array of objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DocumentFields {
    pub version: Option<Value>,
    /// Opaque payload
    pub data: Option<Value>,
    /// Links grouped by relation name
    pub links: Option<Relations>,
    pub items: Option<Vec<ItemEntry>>,
    /// Unrecognized top-level keys
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for DocumentFields {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            version: attrs::take_value(&mut extra, "version"),
            data: attrs::take_value(&mut extra, "data"),
            links: attrs::take_if(
                &mut extra,
                "links",
                links::is_relations,
                links::relations_from_value,
            ),
            items: attrs::take_if(
                &mut extra,
                "items",
                attrs::is_object_array,
                items::items_from_value,
            ),
            extra,
        }
    }
}

impl From<DocumentFields> for Map<String, Value> {
    fn from(fields: DocumentFields) -> Self {
        let mut map = fields.extra;
        attrs::put(&mut map, "version", fields.version);
        attrs::put(&mut map, "data", fields.data);
        attrs::put(&mut map, "links", fields.links.map(links::relations_to_value));
        attrs::put(&mut map, "items", fields.items.map(items::items_to_value));
        map
    }
}

/// Result of the last load
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState {
    /// The server returned a document
    Loaded(DocumentFields),
    /// The load failed; no fields are populated
    Empty,
}

impl DocumentState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, DocumentState::Loaded(_))
    }

    pub fn fields(&self) -> Option<&DocumentFields> {
        match self {
            DocumentState::Loaded(fields) => Some(fields),
            DocumentState::Empty => None,
        }
    }

    fn from_fetch(fields: Option<DocumentFields>) -> Self {
        fields.map_or(DocumentState::Empty, DocumentState::Loaded)
    }
}

/// A hypermedia document bound to its URL and access token
pub struct HypermediaDocument {
    url: String,
    access_token: String,
    state: DocumentState,
    client: Arc<dyn HttpClient>,
}

impl HypermediaDocument {
    /// Fetch a document using a default HTTP client
    ///
    /// Fails only for an invalid URL, an empty token, or when the HTTP client
    /// cannot be created. A failed fetch yields an empty document.
    pub fn load(url: &str, access_token: &str) -> DocumentResult<Self> {
        validate(url, access_token)?;
        let client = ReqwestClient::new()?;
        Self::load_with(Arc::new(client), url, access_token)
    }

    /// Fetch a document through the given client
    pub fn load_with(
        client: Arc<dyn HttpClient>,
        url: &str,
        access_token: &str,
    ) -> DocumentResult<Self> {
        validate(url, access_token)?;

        let state = DocumentState::from_fetch(transport::get_document(
            client.as_ref(),
            url,
            access_token,
        ));
        info!(
            "Document {} {}",
            url,
            if state.is_loaded() { "loaded" } else { "is empty" }
        );

        Ok(Self {
            url: url.to_string(),
            access_token: access_token.to_string(),
            state,
            client,
        })
    }

    /// Build a loaded document from fields already in hand, without a request
    pub fn from_fields(
        client: Arc<dyn HttpClient>,
        url: &str,
        access_token: &str,
        fields: DocumentFields,
    ) -> DocumentResult<Self> {
        validate(url, access_token)?;

        Ok(Self {
            url: url.to_string(),
            access_token: access_token.to_string(),
            state: DocumentState::Loaded(fields),
            client,
        })
    }

    /// Fetch the document again
    ///
    /// Fields are replaced wholesale on success; on failure the document
    /// becomes empty. Returns whether the document is loaded afterwards.
    pub fn reload(&mut self) -> bool {
        self.state = DocumentState::from_fetch(transport::get_document(
            self.client.as_ref(),
            &self.url,
            &self.access_token,
        ));
        self.state.is_loaded()
    }

    /// Get the links of a relation
    ///
    /// Always returns a collection; it is empty when the document has no
    /// links or no such relation.
    pub fn links(&self, rel: &str) -> LinkCollection<'_> {
        let entries = self
            .fields()
            .and_then(|fields| fields.links.as_ref())
            .and_then(|links| links.get(rel))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        LinkCollection::new(entries, self)
    }

    /// Get the document's items (empty when there are none)
    pub fn items(&self) -> ItemCollection<'_> {
        let entries = self
            .fields()
            .and_then(|fields| fields.items.as_deref())
            .unwrap_or(&[]);
        ItemCollection::new(entries, self)
    }

    /// Find the search link with the given URN
    ///
    /// When several search links share the URN, the first in document order
    /// wins.
    pub fn search(&self, urn: &str) -> Option<&LinkEntry> {
        let search_links = self.links(SEARCH_REL);
        if search_links.is_empty() {
            debug!("Document {} has no search links", self.url);
            return None;
        }
        search_links.rels(&[urn]).into_iter().next()
    }

    /// Write the document back to its URL
    ///
    /// Sends only `version`, `data` and `links` (absent or empty values are
    /// sent as `null`). Returns `true` iff the server answers `202 Accepted`.
    /// Local fields are left untouched whatever the outcome.
    pub fn save(&self) -> bool {
        let body = self.save_body();
        let saved =
            transport::put_document(self.client.as_ref(), &self.url, &self.access_token, &body);
        info!(
            "Document {} {}",
            self.url,
            if saved { "saved" } else { "was not saved" }
        );
        saved
    }

    /// The body `save` sends
    pub fn save_body(&self) -> SaveBody<'_> {
        let fields = self.fields();
        SaveBody {
            version: fields
                .and_then(|f| f.version.as_ref())
                .filter(|version| !is_vacant(version)),
            data: fields
                .and_then(|f| f.data.as_ref())
                .filter(|data| !is_vacant(data)),
            links: fields
                .and_then(|f| f.links.as_ref())
                .filter(|links| !links.is_empty()),
        }
    }

    /// Load the document a link points to
    ///
    /// The href is expanded with `params`, resolved against this document's
    /// URL, and fetched with the same client and token. A link without an
    /// href cannot be followed.
    pub fn follow(
        &self,
        link: &LinkEntry,
        params: &TemplateParams,
    ) -> DocumentResult<HypermediaDocument> {
        let href = link.expand(params).ok_or(DocumentError::MissingHref)?;
        let base = parse_url(&self.url)?;
        let target = base.join(&href).map_err(|e| DocumentError::InvalidUrl {
            url: href.clone(),
            reason: e.to_string(),
        })?;

        debug!("Following {} from {}", target, self.url);
        Self::load_with(Arc::clone(&self.client), target.as_str(), &self.access_token)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn fields(&self) -> Option<&DocumentFields> {
        self.state.fields()
    }

    /// Mutable access to the fields of a loaded document
    pub fn fields_mut(&mut self) -> Option<&mut DocumentFields> {
        match self.state {
            DocumentState::Loaded(ref mut fields) => Some(fields),
            DocumentState::Empty => None,
        }
    }

    pub fn version(&self) -> Option<&Value> {
        self.fields().and_then(|f| f.version.as_ref())
    }

    pub fn data(&self) -> Option<&Value> {
        self.fields().and_then(|f| f.data.as_ref())
    }

    /// Get an unrecognized top-level key
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.fields().and_then(|f| f.extra.get(key))
    }

    /// Names of the link relations present, sorted
    pub fn relations(&self) -> Vec<&str> {
        self.fields()
            .and_then(|f| f.links.as_ref())
            .map(|links| links.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Set the version
    ///
    /// Like the other setters, this gives an empty document fields of its own.
    pub fn set_version(&mut self, version: Option<Value>) {
        self.update_fields(|fields| fields.version = version);
    }

    /// Replace the data payload
    pub fn set_data(&mut self, data: Value) {
        self.update_fields(|fields| fields.data = Some(data));
    }

    /// Replace all links
    pub fn set_links(&mut self, links: Relations) {
        self.update_fields(|fields| fields.links = Some(links));
    }

    /// Apply `update` to the fields, giving an empty document default ones
    fn update_fields(&mut self, update: impl FnOnce(&mut DocumentFields)) {
        let mut fields = match std::mem::replace(&mut self.state, DocumentState::Empty) {
            DocumentState::Loaded(fields) => fields,
            DocumentState::Empty => DocumentFields::default(),
        };
        update(&mut fields);
        self.state = DocumentState::Loaded(fields);
    }
}

impl std::fmt::Debug for HypermediaDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypermediaDocument")
            .field("url", &self.url)
            .field("access_token", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}

/// Check construction inputs
fn validate(url: &str, access_token: &str) -> DocumentResult<()> {
    parse_url(url)?;
    if access_token.trim().is_empty() {
        return Err(DocumentError::MissingToken);
    }
    Ok(())
}

/// Parse an absolute http(s) URL
fn parse_url(url: &str) -> DocumentResult<Url> {
    let invalid = |reason: String| DocumentError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}

/// Values that are sent as `null` on save
fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
