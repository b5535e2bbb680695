//! Tag rewriting for closed-class words
//!
//! Taggers give words like "that" or "whether" generic tags (DT, IN, CC)
//! that the grammar cannot tell apart. The rewriter forces a distinguished
//! tag for each configured word before chunking.

use std::collections::HashMap;

use chunkrel_core::{TaggingConfig, Token};

/// Forces configured tags onto specific words
#[derive(Debug, Clone, Default)]
pub struct TagRewriter {
    /// Lower-cased word -> forced tag
    overrides: HashMap<String, String>,
}

impl TagRewriter {
    /// Create a rewriter with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration
    pub fn from_config(config: &TaggingConfig) -> Self {
        config
            .overrides
            .iter()
            .fold(Self::new(), |rewriter, (word, tag)| {
                rewriter.with_override(word, tag)
            })
    }

    /// Add an override (the word is matched case-insensitively)
    pub fn with_override(mut self, word: &str, tag: &str) -> Self {
        self.overrides.insert(word.to_lowercase(), tag.to_string());
        self
    }

    /// Number of configured overrides
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Rewrite one token
    pub fn rewrite(&self, token: &Token) -> Token {
        match self.overrides.get(&token.word.to_lowercase()) {
            Some(tag) => token.clone().with_tag(tag.as_str()),
            None => token.clone(),
        }
    }

    /// Rewrite every token of a sentence, preserving order
    pub fn rewrite_all(&self, tokens: &[Token]) -> Vec<Token> {
        tokens.iter().map(|t| self.rewrite(t)).collect()
    }
}
