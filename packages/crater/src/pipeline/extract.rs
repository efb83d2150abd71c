//! Metadata extraction - turns raw model text into a validated metadata graph.
//!
//! Models usually wrap their JSON in a fence line above and below. The
//! extractor drops the first and last line, parses what remains, and checks
//! its structure according to the configured [`ValidationMode`].

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::error::ValidationFailure;
use crate::types::{MetadataGraph, ValidationMode, METADATA_FILE_NAME};

/// Properties whose `@id` references must resolve inside the graph.
const LINK_PROPERTIES: [&str; 2] = ["hasPart", "mainEntity"];

/// The text strictly between the first and the last newline.
///
/// Text with fewer than two newlines has no inner lines and yields `""`.
pub fn strip_wrapping_lines(raw: &str) -> &str {
    match (raw.find('\n'), raw.rfind('\n')) {
        (Some(first), Some(last)) if first < last => &raw[first + 1..last],
        _ => "",
    }
}

/// Parse and check raw model output.
///
/// In [`ValidationMode::Lenient`] only JSON well-formedness is required and
/// structural issues are logged. In [`ValidationMode::Strict`] the first
/// structural issue is returned as the failure.
pub fn extract(raw: &str, mode: ValidationMode) -> Result<MetadataGraph, ValidationFailure> {
    let inner = strip_wrapping_lines(raw);
    let document: Value = serde_json::from_str(inner)
        .map_err(|e| ValidationFailure::NotStructured(e.to_string()))?;

    let issues = validate(&document);
    match mode {
        ValidationMode::Strict => {
            if let Some(first) = issues.into_iter().next() {
                return Err(first);
            }
        }
        ValidationMode::Lenient => {
            for issue in &issues {
                warn!(issue = %issue, "Generated metadata has a structural issue");
            }
        }
    }

    Ok(MetadataGraph::from_value(document))
}

/// Every structural issue in `document`, in rule order.
///
/// An empty list means the document has a context, a graph array, a metadata
/// descriptor, a root dataset, and no dangling `hasPart`/`mainEntity` links.
pub fn validate(document: &Value) -> Vec<ValidationFailure> {
    let Some(object) = document.as_object() else {
        return vec![ValidationFailure::NotAnObject];
    };

    let mut issues = Vec::new();
    if !object.contains_key("@context") {
        issues.push(ValidationFailure::MissingContext);
    }

    let graph = MetadataGraph::from_value(document.clone());
    if !graph.has_graph() {
        issues.push(ValidationFailure::MissingGraph);
        return issues;
    }

    let descriptor_ok = graph
        .entity(METADATA_FILE_NAME)
        .map(|e| e.has_type("CreativeWork"))
        .unwrap_or(false);
    if !descriptor_ok {
        issues.push(ValidationFailure::MissingEntity("metadata descriptor"));
    }
    if graph.root_dataset().is_none() {
        issues.push(ValidationFailure::MissingEntity("root Dataset"));
    }

    let entities = graph.entities();
    let known: HashSet<&str> = entities.iter().filter_map(|e| e.id()).collect();
    for entity in &entities {
        for property in LINK_PROPERTIES {
            for target in entity.references(property) {
                if !known.contains(target) {
                    issues.push(ValidationFailure::DanglingReference {
                        from: entity.id().unwrap_or("<anonymous>").to_string(),
                        property,
                        target: target.to_string(),
                    });
                }
            }
        }
    }

    issues
}
