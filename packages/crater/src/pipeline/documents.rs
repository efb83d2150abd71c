//! Document store - loads reference documents and cuts them into chunks.
//!
//! Reference documents are the format specifications and worked examples the
//! model is grounded on. They live in a flat directory; each file is loaded as
//! plain text and split with a recursive character splitter.

use std::collections::VecDeque;
use std::ops::Range;
use std::path::{Path, PathBuf};

use scraper::{Html, Node};
use tracing::{debug, info, warn};

use crate::error::{CraterError, Result};
use crate::types::{Chunk, CraterConfig};

/// Separators tried in order before falling back to single characters.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Elements whose text never reaches the loaded document.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements that start a new text block.
const BLOCK_ELEMENTS: [&str; 27] = [
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav", "p", "pre",
    "section", "table", "td", "th",
];

/// Loads reference documents and chunks them.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    splitter: TextSplitter,
}

impl DocumentStore {
    /// Create a store with explicit chunking parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self {
            splitter: TextSplitter::new(chunk_size, chunk_overlap)?,
        })
    }

    /// Create a store from the pipeline configuration.
    pub fn from_config(config: &CraterConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// The splitter used for every document.
    pub fn splitter(&self) -> &TextSplitter {
        &self.splitter
    }

    /// Load every supported file in `directory` and split it into chunks.
    ///
    /// Files are visited in file-name order. Unsupported files are skipped
    /// with a warning.
    pub fn load_and_chunk(&self, directory: &Path) -> Result<Vec<Chunk>> {
        if !directory.is_dir() {
            return Err(CraterError::not_found("reference directory", directory));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut chunks = Vec::new();
        for path in files {
            let text = match load_document(&path) {
                Ok(text) => text,
                Err(CraterError::UnsupportedFormat { path }) => {
                    warn!(path = %path.display(), "Skipping unsupported reference document");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let source_id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let before = chunks.len();
            chunks.extend(
                self.splitter
                    .split(&text)
                    .into_iter()
                    .map(|(offset, piece)| Chunk::new(piece, source_id.clone(), offset)),
            );
            debug!(source = %source_id, chunks = chunks.len() - before, "Loaded reference document");
        }

        info!(chunks = chunks.len(), directory = %directory.display(), "Reference documents chunked");
        Ok(chunks)
    }
}

/// Load a single reference document as plain text.
///
/// HTML is reduced to its visible text; JSON and JSON-LD are read verbatim.
pub fn load_document(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html") | Some("htm") => Ok(html_to_text(&std::fs::read_to_string(path)?)),
        Some("json") | Some("jsonld") => Ok(std::fs::read_to_string(path)?),
        _ => Err(CraterError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Extract visible text from an HTML document.
///
/// Whitespace is collapsed within each block element and blocks are joined
/// with blank lines, so the splitter's paragraph separator lines up with the
/// document structure.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut blocks: Vec<String> = Vec::new();
    let mut buffer = String::new();
    let mut current_block = None;

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let mut block = None;
        let mut hidden = false;
        for ancestor in node.ancestors() {
            if let Node::Element(element) = ancestor.value() {
                let name = element.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    hidden = true;
                    break;
                }
                if block.is_none() && BLOCK_ELEMENTS.contains(&name) {
                    block = Some(ancestor.id());
                }
            }
        }
        if hidden {
            continue;
        }

        if block != current_block {
            flush_block(&mut buffer, &mut blocks);
            current_block = block;
        }
        buffer.push(' ');
        buffer.push_str(text);
    }
    flush_block(&mut buffer, &mut blocks);

    blocks.join("\n\n")
}

fn flush_block(buffer: &mut String, blocks: &mut Vec<String>) {
    let collapsed = buffer.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        blocks.push(collapsed);
    }
    buffer.clear();
}

/// Recursive character splitter.
///
/// Text is cut on the first separator that yields pieces no longer than
/// `chunk_size` characters, recursing into finer separators (and finally
/// single characters) for pieces that are still too long. Pieces are then
/// merged greedily into chunks; consecutive chunks share at most
/// `chunk_overlap` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. `chunk_overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(CraterError::Config(format!(
                "invalid chunking: size {chunk_size}, overlap {chunk_overlap}"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split `text` into `(char_offset, chunk_text)` pairs.
    ///
    /// Chunk text is trimmed and the offset points at its first character.
    /// Whitespace-only chunks are dropped.
    pub fn split(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();
        self.split_range(&chars, 0..chars.len(), 0, &mut pieces);

        self.merge(&pieces)
            .into_iter()
            .filter_map(|range| {
                let window = &chars[range.clone()];
                let leading = window.iter().take_while(|c| c.is_whitespace()).count();
                let trimmed: String = window.iter().collect::<String>().trim().to_string();
                (!trimmed.is_empty()).then(|| (range.start + leading, trimmed))
            })
            .collect()
    }

    fn split_range(
        &self,
        chars: &[char],
        range: Range<usize>,
        level: usize,
        out: &mut Vec<Range<usize>>,
    ) {
        if range.is_empty() {
            return;
        }
        if range.len() <= self.chunk_size {
            out.push(range);
            return;
        }

        let Some(separator) = SEPARATORS.get(level) else {
            out.extend(range.map(|i| i..i + 1));
            return;
        };

        let separator: Vec<char> = separator.chars().collect();
        for piece in split_on(chars, range, &separator) {
            self.split_range(chars, piece, level + 1, out);
        }
    }

    // Pieces are contiguous, so every merged window is a contiguous span of
    // the source text.
    fn merge(&self, pieces: &[Range<usize>]) -> Vec<Range<usize>> {
        let mut windows = Vec::new();
        let mut current: VecDeque<Range<usize>> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = piece.len();
            if total + len > self.chunk_size && !current.is_empty() {
                windows.push(span(&current));
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match current.pop_front() {
                        Some(front) => total -= front.len(),
                        None => break,
                    }
                }
            }
            current.push_back(piece.clone());
            total += len;
        }

        if !current.is_empty() {
            windows.push(span(&current));
        }
        windows
    }
}

fn span(pieces: &VecDeque<Range<usize>>) -> Range<usize> {
    let start = pieces.front().map(|r| r.start).unwrap_or(0);
    let end = pieces.back().map(|r| r.end).unwrap_or(start);
    start..end
}

// Separators stay attached to the start of the following piece.
fn split_on(chars: &[char], range: Range<usize>, separator: &[char]) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut piece_start = range.start;
    let mut i = range.start;

    while i + separator.len() <= range.end {
        if &chars[i..i + separator.len()] == separator {
            if i > piece_start {
                pieces.push(piece_start..i);
                piece_start = i;
            }
            i += separator.len();
        } else {
            i += 1;
        }
    }
    if piece_start < range.end {
        pieces.push(piece_start..range.end);
    }
    pieces
}
