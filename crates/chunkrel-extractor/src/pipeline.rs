//! End-to-end sentence pipeline
//!
//! Tag rewriter -> phrase chunker -> relation extractor. Sentences share
//! no state, so a batch is just independent calls.

use serde::Serialize;

use chunkrel_core::{AppConfig, ChunkTree, RelationTriple, Result, Token};

use crate::chunker::RegexpChunker;
use crate::grammar::Grammar;
use crate::relation::ClauseRelationExtractor;
use crate::tagging::TagRewriter;
use crate::{PhraseChunker, RelationExtractor};

/// Result of analyzing one sentence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceAnalysis {
    pub tree: ChunkTree,
    pub relations: Vec<RelationTriple>,
}

/// Wires the three stages together
pub struct ExtractionPipeline {
    rewriter: TagRewriter,
    chunker: Box<dyn PhraseChunker>,
    extractor: Box<dyn RelationExtractor>,
}

impl ExtractionPipeline {
    /// Build from configuration, compiling the grammar up front
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let grammar = Grammar::from_config(&config.grammar)?;
        tracing::debug!(
            rules = grammar.rules().len(),
            overrides = config.tagging.overrides.len(),
            action_verbs = config.extractor.action_verbs.len(),
            "Pipeline configured"
        );
        Ok(Self::new(
            TagRewriter::from_config(&config.tagging),
            Box::new(RegexpChunker::new(grammar)),
            Box::new(ClauseRelationExtractor::new(&config.extractor)),
        ))
    }

    /// Assemble from explicit stages
    pub fn new(
        rewriter: TagRewriter,
        chunker: Box<dyn PhraseChunker>,
        extractor: Box<dyn RelationExtractor>,
    ) -> Self {
        Self {
            rewriter,
            chunker,
            extractor,
        }
    }

    /// Rewrite tags and chunk
    pub fn chunk(&self, tokens: &[Token]) -> Result<ChunkTree> {
        let rewritten = self.rewriter.rewrite_all(tokens);
        self.chunker.chunk(&rewritten)
    }

    /// Chunk and extract relations for one sentence
    pub fn analyze(&self, tokens: &[Token]) -> Result<SentenceAnalysis> {
        let tree = self.chunk(tokens)?;
        let relations = self.extractor.extract(&tree);
        Ok(SentenceAnalysis { tree, relations })
    }

    /// Analyze many sentences independently
    pub fn analyze_batch<'a, I>(&self, sentences: I) -> Result<Vec<SentenceAnalysis>>
    where
        I: IntoIterator<Item = &'a [Token]>,
    {
        sentences.into_iter().map(|s| self.analyze(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkrel_core::{ChunkrelError, ExtractorConfig};

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.grammar.source = "NP: {<DT>?<JJ.*>*<NN.*>+}\nVP: {<VB.*>+}".to_string();
        config
            .tagging
            .overrides
            .insert("that".to_string(), "THAT".to_string());
        config.extractor = ExtractorConfig {
            action_verbs: vec!["inhibit".to_string()],
            ..ExtractorConfig::default()
        };
        config
    }

    fn tokens(pairs: &[(&str, &str)]) -> Vec<Token> {
        pairs.iter().map(|(w, t)| Token::new(*w, *t)).collect()
    }

    #[test]
    fn test_analyze_sentence() {
        let pipeline = ExtractionPipeline::from_config(&config()).unwrap();
        let analysis = pipeline
            .analyze(&tokens(&[
                ("The", "DT"),
                ("enzyme", "NN"),
                ("inhibits", "VBZ"),
                ("the", "DT"),
                ("reaction", "NN"),
                (".", "."),
            ]))
            .unwrap();

        assert_eq!(
            analysis.relations,
            vec![RelationTriple::new("The enzyme", "inhibits", "the reaction")]
        );
    }

    #[test]
    fn test_rewriter_runs_before_chunking() {
        let pipeline = ExtractionPipeline::from_config(&config()).unwrap();
        // "that" is tagged DT by the tagger but must not start a noun phrase
        let tree = pipeline
            .chunk(&tokens(&[("that", "DT"), ("cell", "NN")]))
            .unwrap();
        assert_eq!(tree.to_string(), "(S that/THAT (NP cell/NN))");
    }

    #[test]
    fn test_bad_grammar_fails_at_construction() {
        let mut config = config();
        config.grammar.source = "MNP: {[NP]<CC>[NP]}".to_string();
        let err = ExtractionPipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, ChunkrelError::InvalidGrammar(_)));
    }

    #[test]
    fn test_batch_is_independent() {
        let pipeline = ExtractionPipeline::from_config(&config()).unwrap();
        let a = tokens(&[("Drugs", "NNS"), ("inhibit", "VBP"), ("enzymes", "NNS")]);
        let b = tokens(&[("enzymes", "NNS")]);
        let results = pipeline
            .analyze_batch([a.as_slice(), b.as_slice()])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].relations.len(), 1);
        assert!(results[1].relations.is_empty());
    }
}
