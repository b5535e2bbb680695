//! chunkrel Core - Data model, errors, and shared types
//!
//! This crate defines the abstractions shared by the chunking and
//! extraction pipeline:
//! - Tagged tokens and sentences
//! - The labeled chunk tree produced by the phrase chunker
//! - Relation triples and annotated corpus entries
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, ExtractorConfig, GrammarConfig, LoggingConfig, TaggingConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for chunkrel operations
#[derive(Error, Debug)]
pub enum ChunkrelError {
    #[error("Index out of bounds: word {index} requested but node holds {len} words")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Corpus error at line {line}: {message}")]
    Corpus { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChunkrelError>;

// ============================================================================
// Tokens
// ============================================================================

/// A word paired with its part-of-speech tag
///
/// Serialized as a two element array, `["enzyme", "NN"]`, which is the
/// shape tagger adapters emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Token {
    /// Surface string
    pub word: String,

    /// Part-of-speech tag
    pub tag: String,
}

impl Token {
    /// Create a new token
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }

    /// Replace the tag, keeping the surface string
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

impl From<(String, String)> for Token {
    fn from((word, tag): (String, String)) -> Self {
        Self { word, tag }
    }
}

impl From<Token> for (String, String) {
    fn from(token: Token) -> Self {
        (token.word, token.tag)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.word, self.tag)
    }
}

/// Ordered tokens of one sentence
pub type TaggedSentence = Vec<Token>;

// ============================================================================
// Chunk Tree
// ============================================================================

/// A node of the chunk tree: either a token or a labeled phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkTree {
    Leaf(Token),
    Branch {
        label: String,
        children: Vec<ChunkTree>,
    },
}

impl ChunkTree {
    /// Create a leaf node
    pub fn leaf(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::Leaf(Token::new(word, tag))
    }

    /// Create a branch node
    pub fn branch(label: impl Into<String>, children: Vec<ChunkTree>) -> Self {
        Self::Branch {
            label: label.into(),
            children,
        }
    }

    /// Branch label, `None` for leaves
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch { label, .. } => Some(label),
        }
    }

    /// Check if this node is a branch with the given label
    pub fn is_branch_labeled(&self, wanted: &str) -> bool {
        self.label() == Some(wanted)
    }

    /// Direct children (empty for leaves)
    pub fn children(&self) -> &[ChunkTree] {
        match self {
            Self::Leaf(_) => &[],
            Self::Branch { children, .. } => children,
        }
    }

    /// All tokens under this node, left to right
    pub fn leaves(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Self::Leaf(token) => out.push(token),
            Self::Branch { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl std::fmt::Display for ChunkTree {
    /// Bracketed notation, e.g. `(S (NP The/DT enzyme/NN) inhibits/VBZ)`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf(token) => write!(f, "{}", token),
            Self::Branch { label, children } => {
                write!(f, "({}", label)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// Relations
// ============================================================================

/// A (Subject, Action, Object) relation reconstructed from surface text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationTriple {
    pub subject: String,
    pub action: String,
    pub object: String,
}

impl RelationTriple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<String>,
        action: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            action: action.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for RelationTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.action, self.object)
    }
}

/// One corpus entry: a tagged sentence with optional gold relations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    /// Raw sentence text, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Tagger output for the sentence
    pub tokens: TaggedSentence,

    /// Gold standard relations
    #[serde(default)]
    pub relations: Vec<RelationTriple>,
}

impl AnnotatedSentence {
    /// Create an entry without gold relations
    pub fn new(tokens: TaggedSentence) -> Self {
        Self {
            text: None,
            tokens,
            relations: Vec::new(),
        }
    }

    /// Attach gold relations
    pub fn with_relations(mut self, relations: Vec<RelationTriple>) -> Self {
        self.relations = relations;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_serializes_as_pair() {
        let token = Token::new("enzyme", "NN");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#"["enzyme","NN"]"#);

        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_tree_display() {
        let tree = ChunkTree::branch(
            "S",
            vec![
                ChunkTree::branch(
                    "NP",
                    vec![ChunkTree::leaf("The", "DT"), ChunkTree::leaf("enzyme", "NN")],
                ),
                ChunkTree::leaf("inhibits", "VBZ"),
            ],
        );
        assert_eq!(tree.to_string(), "(S (NP The/DT enzyme/NN) inhibits/VBZ)");
    }

    #[test]
    fn test_tree_leaves_in_order() {
        let tree = ChunkTree::branch(
            "S",
            vec![
                ChunkTree::leaf("a", "DT"),
                ChunkTree::branch("NP", vec![ChunkTree::leaf("b", "NN")]),
                ChunkTree::leaf("c", "VBZ"),
            ],
        );
        let words: Vec<&str> = tree.leaves().iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
        assert!(tree.is_branch_labeled("S"));
        assert_eq!(tree.children()[0].label(), None);
    }

    #[test]
    fn test_annotated_sentence_defaults() {
        let json = r#"{"tokens": [["It", "PRP"], ["works", "VBZ"]]}"#;
        let sentence: AnnotatedSentence = serde_json::from_str(json).unwrap();
        assert_eq!(sentence.tokens.len(), 2);
        assert!(sentence.text.is_none());
        assert!(sentence.relations.is_empty());
    }

    #[test]
    fn test_triple_display() {
        let triple = RelationTriple::new("The enzyme", "inhibits", "the reaction");
        assert_eq!(triple.to_string(), "(The enzyme, inhibits, the reaction)");
    }
}
