//! Relation Extraction (RE) module
//!
//! Walks a chunk tree clause by clause and emits `(Subject, Action, Object)`
//! triples. A noun phrase becomes the pending subject, an allow-listed verb
//! phrase the pending action, and the next noun phrase completes the
//! triple. Relative pronouns ("which") stand in for a subject and are
//! resolved against the noun phrase preceding their clause.

use chunkrel_core::{ChunkTree, ExtractorConfig, RelationTriple};

use crate::navigator::{find_nearest_preceding, flatten_text};
use crate::RelationExtractor;

// ============================================================================
// Node Roles
// ============================================================================

/// How the extractor treats a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRole {
    NounPhrase,
    VerbPhrase,
    Clause,
    RelativePronoun,
    Inert,
}

/// Pending extraction state within one clause
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Idle,
    Subject(String),
    SubjectAction { subject: String, action: String },
}

/// A triple plus whether the clause that produced it emitted it directly
///
/// Only directly emitted triples get a resolution attempt, and only
/// against the siblings of their own clause.
#[derive(Debug)]
struct Emitted {
    triple: RelationTriple,
    direct: bool,
}

impl Pending {
    fn subject(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Subject(subject) | Self::SubjectAction { subject, .. } => subject,
        }
    }
}

// ============================================================================
// Clause-walking RE
// ============================================================================

/// Rule-based relation extractor over chunk trees
#[derive(Debug, Clone)]
pub struct ClauseRelationExtractor {
    noun_phrase_labels: Vec<String>,
    verb_phrase_labels: Vec<String>,
    clause_labels: Vec<String>,
    /// Lower-cased relative pronoun, also used as the placeholder text
    relative_pronoun: String,
    /// Lower-cased action verb substrings
    action_verbs: Vec<String>,
}

impl ClauseRelationExtractor {
    /// Create from configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            noun_phrase_labels: config.noun_phrase_labels.clone(),
            verb_phrase_labels: config.verb_phrase_labels.clone(),
            clause_labels: config.clause_labels.clone(),
            relative_pronoun: config.relative_pronoun.to_lowercase(),
            action_verbs: config
                .action_verbs
                .iter()
                .map(|v| v.to_lowercase())
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Replace the action allow-list
    pub fn with_action_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.action_verbs = verbs
            .into_iter()
            .map(|v| v.as_ref().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        self
    }

    /// Subject text used for an unresolved relative pronoun
    pub fn placeholder(&self) -> &str {
        &self.relative_pronoun
    }

    /// Check if verb phrase text contains an allow-listed action
    pub fn is_action(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.action_verbs.iter().any(|verb| text.contains(verb.as_str()))
    }

    fn role(&self, node: &ChunkTree) -> NodeRole {
        match node {
            ChunkTree::Leaf(token) => {
                if token.word.to_lowercase() == self.relative_pronoun {
                    NodeRole::RelativePronoun
                } else {
                    NodeRole::Inert
                }
            }
            ChunkTree::Branch { label, .. } => {
                if self.noun_phrase_labels.contains(label) {
                    NodeRole::NounPhrase
                } else if self.verb_phrase_labels.contains(label) {
                    NodeRole::VerbPhrase
                } else if self.clause_labels.contains(label) {
                    NodeRole::Clause
                } else {
                    NodeRole::Inert
                }
            }
        }
    }

    /// Walk the children of one clause left to right
    fn extract_clause(&self, children: &[ChunkTree]) -> Vec<Emitted> {
        let mut triples = Vec::new();
        let mut pending = Pending::Idle;

        for (idx, child) in children.iter().enumerate() {
            match self.role(child) {
                NodeRole::NounPhrase => {
                    let text = flatten_text(child);
                    pending = match pending {
                        Pending::SubjectAction { subject, action } => {
                            let triple = RelationTriple::new(subject, action, text);
                            tracing::debug!(%triple, "Relation emitted");
                            triples.push(Emitted {
                                triple,
                                direct: true,
                            });
                            Pending::Idle
                        }
                        Pending::Idle | Pending::Subject(_) => Pending::Subject(text),
                    };
                }
                NodeRole::VerbPhrase => {
                    let text = flatten_text(child);
                    if self.is_action(&text) {
                        pending = Pending::SubjectAction {
                            subject: pending.subject().to_string(),
                            action: text,
                        };
                    } else {
                        tracing::trace!(verb = %text, "Verb phrase not in action list");
                    }
                }
                NodeRole::RelativePronoun => {
                    pending = Pending::Subject(self.relative_pronoun.clone());
                }
                NodeRole::Clause => {
                    let nested = self.extract_clause(child.children());
                    triples.extend(nested.into_iter().map(|emitted| Emitted {
                        triple: if emitted.direct {
                            self.resolve(emitted.triple, children, idx)
                        } else {
                            emitted.triple
                        },
                        direct: false,
                    }));
                }
                NodeRole::Inert => {}
            }
            tracing::trace!(index = idx, state = ?pending, "Clause node visited");
        }

        if pending != Pending::Idle {
            tracing::trace!(state = ?pending, "Incomplete relation discarded");
        }
        triples
    }

    /// Replace a placeholder subject with the nearest preceding noun phrase
    fn resolve(
        &self,
        mut triple: RelationTriple,
        siblings: &[ChunkTree],
        clause_index: usize,
    ) -> RelationTriple {
        if triple.subject != self.relative_pronoun {
            return triple;
        }
        match find_nearest_preceding(siblings, clause_index, &self.noun_phrase_labels) {
            Some(antecedent) => triple.subject = antecedent,
            None => tracing::debug!(%triple, "Relative pronoun left unresolved"),
        }
        triple
    }
}

impl Default for ClauseRelationExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl RelationExtractor for ClauseRelationExtractor {
    fn extract(&self, tree: &ChunkTree) -> Vec<RelationTriple> {
        // The root is walked as a clause whatever its label
        self.extract_clause(tree.children())
            .into_iter()
            .map(|emitted| emitted.triple)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
