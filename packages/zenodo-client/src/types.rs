use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A deposition as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Deposition {
    pub id: u64,
    /// Empty until the deposition is published
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub doi_url: Option<String>,
    /// `unsubmitted`, `inprogress` or `done`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: DepositionLinks,
}

impl Deposition {
    /// The DOI, ignoring the empty string Zenodo returns for drafts.
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().filter(|d| !d.is_empty())
    }
}

/// Hypermedia links on a deposition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepositionLinks {
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub html: Option<String>,
    pub bucket: Option<String>,
    pub files: Option<String>,
}

/// A file attached to a deposition.
#[derive(Debug, Clone, Deserialize)]
pub struct DepositionFile {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Descriptive metadata for a deposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositionMetadata {
    pub title: String,
    pub upload_type: String,
    pub description: String,
    pub creators: Vec<Creator>,
}

impl DepositionMetadata {
    /// Metadata for a dataset upload.
    pub fn dataset(
        title: impl Into<String>,
        description: impl Into<String>,
        creators: Vec<Creator>,
    ) -> Self {
        Self {
            title: title.into(),
            upload_type: "dataset".to_string(),
            description: description.into(),
            creators,
        }
    }
}

/// A deposition creator, `"Family, Given"` by convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creator {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

impl Creator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliation: None,
        }
    }
}

/// Request body for metadata updates.
#[derive(Debug, Serialize)]
pub(crate) struct MetadataEnvelope<'a> {
    pub metadata: &'a DepositionMetadata,
}

// Zenodo emits both offset-qualified and naive UTC timestamps.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_deposition_parses_draft() {
        let json = r#"{
            "id": 1234,
            "doi": "",
            "state": "unsubmitted",
            "submitted": false,
            "created": "2024-05-01T10:00:00.123456",
            "links": {"self": "https://sandbox.zenodo.org/api/deposit/depositions/1234",
                      "html": "https://sandbox.zenodo.org/deposit/1234"}
        }"#;
        let deposition: Deposition = serde_json::from_str(json).unwrap();
        assert_eq!(deposition.id, 1234);
        assert_eq!(deposition.doi(), None);
        assert_eq!(deposition.created.map(|c| c.year()), Some(2024));
        assert!(deposition.links.html.is_some());
    }

    #[test]
    fn test_metadata_envelope_shape() {
        let metadata =
            DepositionMetadata::dataset("T", "D", vec![Creator::new("Doe, John")]);
        let body = serde_json::to_value(MetadataEnvelope {
            metadata: &metadata,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"metadata": {
                "title": "T",
                "upload_type": "dataset",
                "description": "D",
                "creators": [{"name": "Doe, John"}]
            }})
        );
    }
}
