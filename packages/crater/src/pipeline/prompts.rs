//! Prompt templates for metadata synthesis.
//!
//! The synthesis template carries exactly two slots, filled once each by the
//! context assembler. Everything else in it (including JSON braces) is
//! literal text.

use sha2::{Digest, Sha256};

/// Slot for the notebook's markdown digest.
pub const NOTEBOOK_SLOT: &str = "{notebook_content}";

/// Slot for the stringified file manifest.
pub const FILES_SLOT: &str = "{files}";

/// Instructions for producing RO-Crate 1.1 metadata.
pub const SYNTHESIS_PROMPT: &str = r##"Build one JSON-LD document that conforms to the RO-Crate Metadata Specification 1.1.

Step 1. Start from this skeleton. The first graph entry is the metadata descriptor:
{
  "@context": "https://w3id.org/ro/crate/1.1/context",
  "@graph": [
    {
      "@id": "ro-crate-metadata.json",
      "@type": "CreativeWork",
      "name": "ro-crate-metadata.json",
      "description": "RO-Crate metadata file describing the dataset.",
      "encodingFormat": "application/json",
      "conformsTo": {"@id": "https://w3id.org/ro/crate/1.1"},
      "about": {"@id": "./"}
    }
  ]
}

Step 2. Add the root dataset entry and fill in its properties, for example:
{
  "@id": "./",
  "@type": "Dataset",
  "name": "...",
  "description": "...",
  "license": "https://creativecommons.org/licenses/by/4.0/",
  "hasPart": [{"@id": "analysis.ipynb"}],
  "mainEntity": {"@id": "analysis.ipynb"}
}

Step 3. Read the notebook notes below and add a graph entry for every piece of software, data source, or other resource they mention. Always give a version:
{notebook_content}

Software entries look like this:
{
  "@id": "#python",
  "@type": "SoftwareApplication",
  "name": "Python",
  "version": "3.12.4"
}

Step 4. Add a File entry for every path in this list and reference each one from the root dataset's hasPart:
{files}

File entries look like this:
{
  "@id": "analysis.ipynb",
  "@type": "File",
  "name": "...",
  "description": "...",
  "encodingFormat": "application/x-ipynb+json"
}

Step 5. Keep "@context" set to "https://w3id.org/ro/crate/1.1/context".

Step 6. If the notes name an author, add them as a Person or Organization:
{
  "@id": "https://orcid.org/0000-0000-0000-0000",
  "@type": "Person",
  "name": "...",
  "affiliation": "..."
}

Rules:
- Reply with the JSON-LD document only.
- Every entry must describe something that actually appears in the notes or the file list."##;

/// Header placed above retrieved reference excerpts.
pub const GROUNDING_HEADER: &str =
    "Use the following reference excerpts when building the metadata. Do not copy example values from them.";

/// Separator between retrieved excerpts and the instructions.
pub const GROUNDING_SEPARATOR: &str = "\n\n---\n\n";

/// SHA-256 of a template, logged with each synthesized crate.
pub fn template_hash(template: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fill every slot occurrence in `template` in a single left-to-right pass.
///
/// Substituted values are never re-scanned, so slot-like text inside a value
/// is left alone.
pub fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let extra: usize = slots.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    loop {
        let next = slots
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .filter_map(|(name, value)| rest.find(name).map(|at| (at, *name, *value)))
            .min_by_key(|(at, _, _)| *at);

        match next {
            Some((at, name, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + name.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_each_slot_once() {
        assert_eq!(SYNTHESIS_PROMPT.matches(NOTEBOOK_SLOT).count(), 1);
        assert_eq!(SYNTHESIS_PROMPT.matches(FILES_SLOT).count(), 1);
    }

    #[test]
    fn test_template_keeps_fragment_ids_and_full_text() {
        assert!(SYNTHESIS_PROMPT.contains(r##""@id": "#python""##));
        assert!(SYNTHESIS_PROMPT.starts_with("Build one JSON-LD document"));
        assert!(SYNTHESIS_PROMPT.ends_with("appears in the notes or the file list."));
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let filled = fill_template("a {x} b {y}", &[("{x}", "{y}"), ("{y}", "Y")]);
        assert_eq!(filled, "a {y} b Y");
    }

    #[test]
    fn test_fill_leaves_json_braces() {
        let filled = fill_template(r#"{"k": {x}}"#, &[("{x}", "1")]);
        assert_eq!(filled, r#"{"k": 1}"#);
    }

    #[test]
    fn test_template_hash_is_stable_hex() {
        let hash = template_hash(SYNTHESIS_PROMPT);
        assert_eq!(hash, template_hash(SYNTHESIS_PROMPT));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, template_hash("{notebook_content} {files}"));
    }
}
