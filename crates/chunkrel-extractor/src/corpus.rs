//! Annotated corpus loading
//!
//! Corpora are JSON Lines files, one [`AnnotatedSentence`] per line:
//!
//! ```text
//! {"text": "The enzyme inhibits the reaction.", "tokens": [["The","DT"], ...], "relations": [{"subject": "The enzyme", "action": "inhibits", "object": "the reaction"}]}
//! ```
//!
//! Blank lines and lines starting with `//` are skipped.

use std::path::Path;

use chunkrel_core::{AnnotatedSentence, ChunkrelError, Result};

/// Parse JSON Lines corpus text
pub fn parse_jsonl(content: &str) -> Result<Vec<AnnotatedSentence>> {
    let mut sentences = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let sentence: AnnotatedSentence =
            serde_json::from_str(line).map_err(|e| ChunkrelError::Corpus {
                line: idx + 1,
                message: e.to_string(),
            })?;
        sentences.push(sentence);
    }

    Ok(sentences)
}

/// Load a JSON Lines corpus file
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<AnnotatedSentence>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let sentences = parse_jsonl(&content)?;
    tracing::debug!(path = %path.display(), sentences = sentences.len(), "Corpus loaded");
    Ok(sentences)
}

/// Split into (first part, rest) at `ratio` of the length, keeping order
pub fn split(
    sentences: Vec<AnnotatedSentence>,
    ratio: f32,
) -> (Vec<AnnotatedSentence>, Vec<AnnotatedSentence>) {
    let ratio = ratio.clamp(0.0, 1.0);
    let at = ((sentences.len() as f32) * ratio).floor() as usize;
    let mut first = sentences;
    let rest = first.split_off(at.min(first.len()));
    (first, rest)
}
