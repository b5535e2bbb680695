//! chunkrel Extractor - Phrase chunking and relation extraction
//!
//! Implements the sentence pipeline:
//! tag rewriting -> grammar-driven phrase chunking -> clause-walking
//! relation extraction, plus corpus loading and evaluation helpers.

use chunkrel_core::{ChunkTree, RelationTriple, Result, Token};

/// Trait for phrase chunkers
pub trait PhraseChunker: Send + Sync {
    fn chunk(&self, tokens: &[Token]) -> Result<ChunkTree>;
}

/// Trait for relation extractors
///
/// Extraction never fails: unknown labels are skipped.
pub trait RelationExtractor: Send + Sync {
    fn extract(&self, tree: &ChunkTree) -> Vec<RelationTriple>;
}

pub mod chunker;
pub mod corpus;
pub mod grammar;
pub mod metrics;
pub mod navigator;
pub mod pipeline;
pub mod relation;
pub mod tagging;

pub use chunker::RegexpChunker;
pub use grammar::{Grammar, GrammarBuilder, GrammarError, Pattern, Predicate, Rule};
pub use pipeline::{ExtractionPipeline, SentenceAnalysis};
pub use relation::ClauseRelationExtractor;
pub use tagging::TagRewriter;
