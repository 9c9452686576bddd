//! Hypermedia links
//!
//! A document groups its links by relation (`"search"`, `"self"`, ...). Each
//! relation holds an ordered list of [`LinkEntry`] values; within a relation
//! a link is identified by its URN.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attrs;
use crate::document::HypermediaDocument;
use crate::error::DocumentResult;
use crate::template::{self, TemplateParams};

/// Links grouped by relation name
pub type Relations = BTreeMap<String, Vec<LinkEntry>>;

/// A single hypermedia link
///
/// Decoded from any JSON object. Attributes of an unexpected type are kept
/// in `extra` rather than rejected; a link without an `href` is still a link,
/// it just cannot be followed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct LinkEntry {
    /// Identifier of this link within its relation
    pub urn: Option<String>,
    /// Relation name, when the link carries one itself
    pub rel: Option<String>,
    /// Target address, possibly a URI template
    pub href: Option<String>,
    /// Human readable title (usually a string, sometimes localized objects)
    pub title: Option<Value>,
    /// Any other attributes, passed through verbatim
    pub extra: Map<String, Value>,
}

impl LinkEntry {
    /// Create a link with the given href
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    /// Set the URN (builder style)
    pub fn with_urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }

    /// Set the relation name (builder style)
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    /// Check whether the href is a URI template
    pub fn is_templated(&self) -> bool {
        self.href.as_deref().is_some_and(template::is_template)
    }

    /// Expand the href template with the given values
    ///
    /// `None` when the link has no href.
    pub fn expand(&self, params: &TemplateParams) -> Option<String> {
        self.href
            .as_deref()
            .map(|href| template::expand(href, params))
    }

    /// Check whether this link carries the given URN
    pub fn has_urn(&self, urn: &str) -> bool {
        self.urn.as_deref() == Some(urn)
    }

    /// Get the title as text, when it is a plain string
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }

    /// Get an extra attribute by name
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

impl From<Map<String, Value>> for LinkEntry {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            urn: attrs::take_string(&mut extra, "urn"),
            rel: attrs::take_string(&mut extra, "rel"),
            href: attrs::take_string(&mut extra, "href"),
            title: attrs::take_value(&mut extra, "title"),
            extra,
        }
    }
}

impl From<LinkEntry> for Map<String, Value> {
    fn from(link: LinkEntry) -> Self {
        let mut map = link.extra;
        attrs::put(&mut map, "urn", link.urn);
        attrs::put(&mut map, "rel", link.rel);
        attrs::put(&mut map, "href", link.href);
        attrs::put(&mut map, "title", link.title);
        map
    }
}

/// An object mapping relation names to arrays of link objects
pub(crate) fn is_relations(value: &Value) -> bool {
    matches!(value, Value::Object(rels) if rels.values().all(attrs::is_object_array))
}

pub(crate) fn relations_from_value(value: Value) -> Relations {
    match value {
        Value::Object(rels) => rels
            .into_iter()
            .map(|(rel, entries)| (rel, attrs::objects(entries).map(LinkEntry::from).collect()))
            .collect(),
        _ => Relations::new(),
    }
}

pub(crate) fn relations_to_value(relations: Relations) -> Value {
    Value::Object(
        relations
            .into_iter()
            .map(|(rel, links)| {
                let links = links
                    .into_iter()
                    .map(|link| Value::Object(link.into()))
                    .collect();
                (rel, Value::Array(links))
            })
            .collect(),
    )
}

/// The links of one relation, borrowed from their document
#[derive(Debug, Clone, Copy)]
pub struct LinkCollection<'a> {
    entries: &'a [LinkEntry],
    owner: &'a HypermediaDocument,
}

impl<'a> LinkCollection<'a> {
    /// Wrap a slice of links belonging to `owner`
    pub fn new(entries: &'a [LinkEntry], owner: &'a HypermediaDocument) -> Self {
        Self { entries, owner }
    }

    /// Get every link whose URN is one of `urns`, in document order
    ///
    /// URNs with no matching link contribute nothing.
    pub fn rels(&self, urns: &[&str]) -> Vec<&'a LinkEntry> {
        self.entries
            .iter()
            .filter(|entry| urns.iter().any(|urn| entry.has_urn(urn)))
            .collect()
    }

    /// Get the first link with the given URN
    pub fn first_by_urn(&self, urn: &str) -> Option<&'a LinkEntry> {
        self.entries.iter().find(|entry| entry.has_urn(urn))
    }

    pub fn iter(&self) -> std::slice::Iter<'a, LinkEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a LinkEntry> {
        self.entries.get(index)
    }

    /// Get the links as a slice
    pub fn as_slice(&self) -> &'a [LinkEntry] {
        self.entries
    }

    /// Get the document these links belong to
    pub fn owner(&self) -> &'a HypermediaDocument {
        self.owner
    }

    /// Load the document a link points to
    ///
    /// Relative hrefs resolve against the owning document's URL, and the
    /// owner's client and access token are reused.
    pub fn follow(
        &self,
        entry: &LinkEntry,
        params: &TemplateParams,
    ) -> DocumentResult<HypermediaDocument> {
        self.owner.follow(entry, params)
    }
}

impl<'a> IntoIterator for LinkCollection<'a> {
    type Item = &'a LinkEntry;
    type IntoIter = std::slice::Iter<'a, LinkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &LinkCollection<'a> {
    type Item = &'a LinkEntry;
    type IntoIter = std::slice::Iter<'a, LinkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFields;
    use crate::transport::testing::RecordingClient;
    use serde_json::json;

    fn sample_links() -> Vec<LinkEntry> {
        vec![
            LinkEntry::new("/x").with_urn("a"),
            LinkEntry::new("/y").with_urn("b"),
            LinkEntry::new("/z").with_urn("a"),
            LinkEntry::new("/w"),
        ]
    }

    fn owner() -> HypermediaDocument {
        HypermediaDocument::from_fields(
            RecordingClient::shared(),
            "https://api.example.com/docs",
            "token",
            DocumentFields::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_link_deserialize_keeps_extra_attributes() {
        let link: LinkEntry = serde_json::from_value(json!({
            "urn": "urn:collectiondoc:query:docs",
            "href": "/docs{?text}",
            "title": "Query documents",
            "hints": {"allow": ["GET"]}
        }))
        .unwrap();

        assert_eq!(link.urn.as_deref(), Some("urn:collectiondoc:query:docs"));
        assert_eq!(link.href.as_deref(), Some("/docs{?text}"));
        assert_eq!(link.title_text(), Some("Query documents"));
        assert!(link.rel.is_none());
        assert_eq!(link.attr("hints"), Some(&json!({"allow": ["GET"]})));
        assert!(link.is_templated());
    }

    #[test]
    fn test_link_serialize_omits_absent_fields() {
        let link = LinkEntry::new("/plain");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value, json!({"href": "/plain"}));
        assert!(!link.is_templated());
    }

    #[test]
    fn test_link_expand() {
        let link = LinkEntry::new("/s{?q}");
        let mut params = TemplateParams::new();
        params.insert("q".to_string(), "npr".to_string());
        assert_eq!(link.expand(&params).as_deref(), Some("/s?q=npr"));
    }

    #[test]
    fn test_rels_preserves_document_order() {
        let links = sample_links();
        let doc = owner();
        let collection = LinkCollection::new(&links, &doc);

        let found = collection.rels(&["b", "a"]);
        let hrefs: Vec<&str> = found.iter().filter_map(|l| l.href.as_deref()).collect();
        assert_eq!(hrefs, vec!["/x", "/y", "/z"]);
    }

    #[test]
    fn test_rels_skips_unknown_urns() {
        let links = sample_links();
        let doc = owner();
        let collection = LinkCollection::new(&links, &doc);

        assert!(collection.rels(&["missing"]).is_empty());
        assert!(collection.rels(&[]).is_empty());
        assert_eq!(collection.rels(&["missing", "b"]).len(), 1);
    }

    #[test]
    fn test_first_by_urn() {
        let links = sample_links();
        let doc = owner();
        let collection = LinkCollection::new(&links, &doc);

        assert_eq!(collection.first_by_urn("a").and_then(|l| l.href.as_deref()), Some("/x"));
        assert!(collection.first_by_urn("c").is_none());
    }

    #[test]
    fn test_collection_accessors() {
        let links = sample_links();
        let doc = owner();
        let collection = LinkCollection::new(&links, &doc);

        assert_eq!(collection.len(), 4);
        assert!(!collection.is_empty());
        assert_eq!(collection.get(3).and_then(|l| l.href.as_deref()), Some("/w"));
        assert!(collection.get(4).is_none());
        assert_eq!(collection.iter().count(), 4);
        assert_eq!((&collection).into_iter().count(), 4);
        assert_eq!(collection.owner().url(), "https://api.example.com/docs");
    }

    #[test]
    fn test_empty_collection() {
        let doc = owner();
        let collection = LinkCollection::new(&[], &doc);
        assert!(collection.is_empty());
        assert!(collection.rels(&["a"]).is_empty());
    }

    #[test]
    fn test_link_tolerates_unexpected_attribute_types() {
        let raw = json!({
            "urn": 42,
            "href": "/x",
            "title": {"en": "Search", "fr": "Recherche"}
        });
        let link: LinkEntry = serde_json::from_value(raw.clone()).unwrap();

        assert!(link.urn.is_none());
        assert_eq!(link.attr("urn"), Some(&json!(42)));
        assert_eq!(link.title, Some(json!({"en": "Search", "fr": "Recherche"})));
        assert!(link.title_text().is_none());
        assert_eq!(serde_json::to_value(&link).unwrap(), raw);
    }

    #[test]
    fn test_link_without_href() {
        let link: LinkEntry = serde_json::from_value(json!({"title": "no href"})).unwrap();
        assert!(link.href.is_none());
        assert!(!link.is_templated());
        assert!(link.expand(&TemplateParams::new()).is_none());
    }

    #[test]
    fn test_relations_shape() {
        assert!(is_relations(&json!({"self": [{"title": "x"}], "search": []})));
        assert!(!is_relations(&json!({"self": {"href": "/x"}})));
        assert!(!is_relations(&json!({"self": ["/x"]})));
        assert!(!is_relations(&json!([{"href": "/x"}])));

        let relations = relations_from_value(json!({"self": [{"href": "/d"}, {"title": "t"}]}));
        assert_eq!(relations["self"].len(), 2);
        assert_eq!(
            relations_to_value(relations),
            json!({"self": [{"href": "/d"}, {"title": "t"}]})
        );
    }
}
