//! Phrase chunking
//!
//! Applies a [`Grammar`] to a tagged sentence. Each pass runs every rule
//! in declaration order over the current top-level node sequence, so rules
//! declared later (or run in a later pass) see branches built earlier as
//! single units.

use chunkrel_core::{ChunkTree, Result, Token};

use crate::grammar::{Grammar, Rule};
use crate::PhraseChunker;

/// Chunker driven by a compiled regex-style grammar
#[derive(Debug, Clone)]
pub struct RegexpChunker {
    grammar: Grammar,
}

impl RegexpChunker {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Chunk with an explicit pass count instead of the grammar's own
    pub fn chunk_with_passes(&self, tokens: &[Token], passes: usize) -> ChunkTree {
        let mut nodes: Vec<ChunkTree> = tokens.iter().cloned().map(ChunkTree::Leaf).collect();

        for pass in 0..passes {
            nodes = self.run_pass(nodes);
            tracing::trace!(pass = pass + 1, nodes = nodes.len(), "Chunk pass finished");
        }

        ChunkTree::branch(self.grammar.root_label(), nodes)
    }

    /// One pass of every rule over a top-level sequence
    pub fn run_pass(&self, nodes: Vec<ChunkTree>) -> Vec<ChunkTree> {
        self.grammar
            .rules()
            .iter()
            .fold(nodes, |nodes, rule| apply_rule(rule, nodes))
    }
}

impl PhraseChunker for RegexpChunker {
    fn chunk(&self, tokens: &[Token]) -> Result<ChunkTree> {
        let tree = self.chunk_with_passes(tokens, self.grammar.passes());
        tracing::debug!(tokens = tokens.len(), "Sentence chunked");
        Ok(tree)
    }
}

/// Scan `nodes` left to right once for a single rule
fn apply_rule(rule: &Rule, nodes: Vec<ChunkTree>) -> Vec<ChunkTree> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut i = 0;

    while i < nodes.len() {
        // Existing branch of this rule hit by a break pattern: dissolve it
        if let ChunkTree::Branch { label, children } = &nodes[i] {
            if *label == rule.label && rule.breaks_within(children) {
                out.extend(children.iter().cloned());
                i += 1;
                continue;
            }
        }

        match rule.find_build(&nodes, i) {
            Some(end) if !rule.breaks_within(&nodes[i..end]) => {
                out.push(ChunkTree::branch(
                    rule.label.clone(),
                    nodes[i..end].to_vec(),
                ));
                i = end;
            }
            _ => {
                out.push(nodes[i].clone());
                i += 1;
            }
        }
    }

    out
}
