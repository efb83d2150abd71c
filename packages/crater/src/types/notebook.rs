//! Notebook types - the cells of a Jupyter notebook and the digest built from them.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Kind of a notebook cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellType {
    Markdown,
    Code,
    Raw,
    /// Any cell type this reader does not know about
    Other(String),
}

impl From<String> for CellType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "markdown" => Self::Markdown,
            "code" => Self::Code,
            "raw" => Self::Raw,
            _ => Self::Other(value),
        }
    }
}

/// A single notebook cell with its joined source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub cell_type: CellType,
    pub source: String,
}

impl Cell {
    /// Create a markdown cell.
    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellType::Markdown,
            source: source.into(),
        }
    }

    /// Create a code cell.
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellType::Code,
            source: source.into(),
        }
    }
}

/// A parsed nbformat-4 notebook, reduced to its ordered cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notebook {
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Parse notebook JSON.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawNotebook = serde_json::from_str(json)?;
        Ok(Self {
            cells: raw
                .cells
                .into_iter()
                .map(|cell| Cell {
                    cell_type: CellType::from(cell.cell_type),
                    source: cell.source.joined(),
                })
                .collect(),
        })
    }

    /// Read and parse a notebook file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json)
    }

    /// Markdown cell sources joined with newlines, in cell order.
    pub fn digest(&self) -> NotebookDigest {
        let parts: Vec<&str> = self
            .cells
            .iter()
            .filter(|cell| cell.cell_type == CellType::Markdown)
            .map(|cell| cell.source.as_str())
            .collect();

        NotebookDigest {
            markdown_text: parts.join("\n"),
        }
    }
}

/// Concatenated markdown of the target notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotebookDigest {
    pub markdown_text: String,
}

impl NotebookDigest {
    /// Create a digest from text directly.
    pub fn new(markdown_text: impl Into<String>) -> Self {
        Self {
            markdown_text: markdown_text.into(),
        }
    }

    /// The digest text.
    pub fn as_str(&self) -> &str {
        &self.markdown_text
    }
}

#[derive(Deserialize)]
struct RawNotebook {
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

// nbformat allows `source` as a single string or a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl CellSource {
    fn joined(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lines(lines) => lines.concat(),
        }
    }
}
