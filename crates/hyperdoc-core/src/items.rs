//! Document items
//!
//! Items of a collection document are themselves small documents: each may
//! carry its own version, data payload and link relations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attrs;
use crate::document::HypermediaDocument;
use crate::links::{self, LinkEntry, Relations};

/// One item embedded in a document
///
/// Like links, items decode from any JSON object; attributes of an
/// unexpected type are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ItemEntry {
    pub href: Option<String>,
    pub version: Option<Value>,
    pub data: Option<Value>,
    pub links: Option<Relations>,
    /// Any other attributes, passed through verbatim
    pub extra: Map<String, Value>,
}

impl ItemEntry {
    /// Get the item's own links for a relation (empty if absent)
    pub fn links(&self, rel: &str) -> &[LinkEntry] {
        self.links
            .as_ref()
            .and_then(|links| links.get(rel))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Get a field of the item's data payload
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(name))
    }
}

impl From<Map<String, Value>> for ItemEntry {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            href: attrs::take_string(&mut extra, "href"),
            version: attrs::take_value(&mut extra, "version"),
            data: attrs::take_value(&mut extra, "data"),
            links: attrs::take_if(
                &mut extra,
                "links",
                links::is_relations,
                links::relations_from_value,
            ),
            extra,
        }
    }
}

impl From<ItemEntry> for Map<String, Value> {
    fn from(item: ItemEntry) -> Self {
        let mut map = item.extra;
        attrs::put(&mut map, "href", item.href);
        attrs::put(&mut map, "version", item.version);
        attrs::put(&mut map, "data", item.data);
        attrs::put(&mut map, "links", item.links.map(links::relations_to_value));
        map
    }
}

/// Decode an array of item objects
pub(crate) fn items_from_value(value: Value) -> Vec<ItemEntry> {
    attrs::objects(value).map(ItemEntry::from).collect()
}

pub(crate) fn items_to_value(items: Vec<ItemEntry>) -> Value {
    Value::Array(
        items
            .into_iter()
            .map(|item| Value::Object(item.into()))
            .collect(),
    )
}

/// The items of a document, borrowed from it
#[derive(Debug, Clone, Copy)]
pub struct ItemCollection<'a> {
    entries: &'a [ItemEntry],
    owner: &'a HypermediaDocument,
}

impl<'a> ItemCollection<'a> {
    pub fn new(entries: &'a [ItemEntry], owner: &'a HypermediaDocument) -> Self {
        Self { entries, owner }
    }

    pub fn iter(&self) -> std::slice::Iter<'a, ItemEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a ItemEntry> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&'a ItemEntry> {
        self.entries.first()
    }

    pub fn as_slice(&self) -> &'a [ItemEntry] {
        self.entries
    }

    /// Get the document these items belong to
    pub fn owner(&self) -> &'a HypermediaDocument {
        self.owner
    }
}

impl<'a> IntoIterator for ItemCollection<'a> {
    type Item = &'a ItemEntry;
    type IntoIter = std::slice::Iter<'a, ItemEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &ItemCollection<'a> {
    type Item = &'a ItemEntry;
    type IntoIter = std::slice::Iter<'a, ItemEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
