//! Metadata types - the JSON-LD RO-Crate graph produced by the model.

use serde_json::{Map, Value};

/// File name of the RO-Crate metadata descriptor inside a crate directory.
pub const METADATA_FILE_NAME: &str = "ro-crate-metadata.json";

/// Legacy descriptor name still accepted when reopening a crate.
pub const LEGACY_METADATA_FILE_NAME: &str = "ro-crate-metadata.jsonld";

/// Versioned JSON-LD context declared by generated metadata.
pub const RO_CRATE_CONTEXT: &str = "https://w3id.org/ro/crate/1.1/context";

/// `@id` of the root dataset when the descriptor does not say otherwise.
pub const ROOT_ID: &str = "./";

/// A parsed metadata document.
///
/// Holds the JSON exactly as parsed (key order preserved) and offers typed
/// views over the `@graph` entries. Shape is not guaranteed; see
/// [`crate::pipeline::extract::validate`] for the structural checks.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataGraph {
    document: Value,
}

impl MetadataGraph {
    /// Wrap an already-parsed document.
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    /// The underlying JSON document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Consume the graph and return the JSON document.
    pub fn into_value(self) -> Value {
        self.document
    }

    /// The `@context` value, if any.
    pub fn context(&self) -> Option<&Value> {
        self.document.get("@context")
    }

    /// True when `@graph` exists and is an array.
    pub fn has_graph(&self) -> bool {
        self.document
            .get("@graph")
            .map(Value::is_array)
            .unwrap_or(false)
    }

    /// Object entries of `@graph`, in document order.
    pub fn entities(&self) -> Vec<Entity<'_>> {
        self.document
            .get("@graph")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_object)
                    .map(Entity::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up an entry by `@id`.
    pub fn entity(&self, id: &str) -> Option<Entity<'_>> {
        self.entities().into_iter().find(|e| e.id() == Some(id))
    }

    /// The metadata descriptor (the CreativeWork describing this file).
    pub fn descriptor(&self) -> Option<Entity<'_>> {
        self.entity(METADATA_FILE_NAME)
            .or_else(|| self.entity(LEGACY_METADATA_FILE_NAME))
    }

    /// `@id` of the root dataset: the descriptor's `about`, else `./`.
    pub fn root_id(&self) -> String {
        self.descriptor()
            .and_then(|d| d.references("about").into_iter().next())
            .unwrap_or(ROOT_ID)
            .to_string()
    }

    /// The root entity, if present and typed `Dataset`.
    pub fn root_dataset(&self) -> Option<Entity<'_>> {
        self.entity(&self.root_id())
            .filter(|e| e.has_type("Dataset"))
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.document)
    }
}

/// Borrowed view of one `@graph` entry.
#[derive(Debug, Clone, Copy)]
pub struct Entity<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Entity<'a> {
    fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The entry's `@id`, when it is a string.
    pub fn id(&self) -> Option<&'a str> {
        self.fields.get("@id").and_then(Value::as_str)
    }

    /// The entry's `@type` values (a single string or an array of strings).
    pub fn types(&self) -> Vec<&'a str> {
        match self.fields.get("@type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// True when `@type` includes `type_name`.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types().contains(&type_name)
    }

    /// Raw property value.
    pub fn property(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name)
    }

    /// `@id`s referenced by a property.
    ///
    /// Accepts `{"@id": ..}`, an array of such objects, or bare strings.
    pub fn references(&self, name: &str) -> Vec<&'a str> {
        fn reference(value: &Value) -> Option<&str> {
            match value {
                Value::Object(obj) => obj.get("@id").and_then(Value::as_str),
                Value::String(s) => Some(s.as_str()),
                _ => None,
            }
        }

        match self.fields.get(name) {
            Some(Value::Array(items)) => items.iter().filter_map(reference).collect(),
            Some(value) => reference(value).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MetadataGraph {
        MetadataGraph::from_value(json!({
            "@context": RO_CRATE_CONTEXT,
            "@graph": [
                {
                    "@id": METADATA_FILE_NAME,
                    "@type": "CreativeWork",
                    "about": {"@id": "./"}
                },
                {
                    "@id": "./",
                    "@type": ["Dataset"],
                    "hasPart": [{"@id": "data.csv"}, {"@id": "nb.ipynb"}],
                    "mainEntity": {"@id": "nb.ipynb"}
                },
                {"@id": "data.csv", "@type": "File"},
                "not an object"
            ]
        }))
    }

    #[test]
    fn test_entities_skip_non_objects() {
        assert_eq!(sample().entities().len(), 3);
    }

    #[test]
    fn test_root_resolution_via_descriptor() {
        let graph = sample();
        assert_eq!(graph.root_id(), "./");
        assert!(graph.root_dataset().is_some());
    }

    #[test]
    fn test_root_defaults_without_descriptor() {
        let graph = MetadataGraph::from_value(json!({
            "@context": RO_CRATE_CONTEXT,
            "@graph": [{"@id": "./", "@type": "Dataset"}]
        }));
        assert!(graph.descriptor().is_none());
        assert_eq!(graph.root_dataset().and_then(|e| e.id()), Some("./"));
    }

    #[test]
    fn test_references_accept_object_array_and_string() {
        let graph = sample();
        let root = graph.entity("./").unwrap();
        assert_eq!(root.references("hasPart"), vec!["data.csv", "nb.ipynb"]);
        assert_eq!(root.references("mainEntity"), vec!["nb.ipynb"]);
        assert!(root.references("missing").is_empty());
    }

    #[test]
    fn test_pretty_json_preserves_key_order() {
        let graph = MetadataGraph::from_value(json!({"@context": "c", "@graph": []}));
        let text = graph.to_pretty_json().unwrap();
        assert!(text.find("@context").unwrap() < text.find("@graph").unwrap());
        assert!(text.contains("\n  \"@graph\""));
    }
}
