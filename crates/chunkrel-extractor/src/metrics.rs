//! Quality Metrics module
//!
//! Scores extracted relation triples against gold annotations with
//! precision, recall and F1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use chunkrel_core::RelationTriple;

// ============================================================================
// Relation Metrics
// ============================================================================

/// Metrics for relation extraction evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMetrics {
    /// True positives (predicted triples found in gold)
    pub true_positives: usize,
    /// False positives (predicted triples not in gold)
    pub false_positives: usize,
    /// False negatives (gold triples never predicted)
    pub false_negatives: usize,
    /// Total relations in gold standard
    pub gold_total: usize,
    /// Total relations predicted
    pub predicted_total: usize,
}

impl RelationMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluator for extracted relations
pub struct Evaluator {
    /// Compare case-insensitively
    ignore_case: bool,
    /// Collapse runs of whitespace before comparing
    normalize_whitespace: bool,
}

impl Evaluator {
    /// Create a new evaluator with exact matching
    pub fn new() -> Self {
        Self {
            ignore_case: false,
            normalize_whitespace: false,
        }
    }

    /// Compare case-insensitively
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Collapse whitespace before comparing
    pub fn normalize_whitespace(mut self) -> Self {
        self.normalize_whitespace = true;
        self
    }

    fn normalize(&self, text: &str) -> String {
        let text = if self.normalize_whitespace {
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            text.to_string()
        };
        if self.ignore_case {
            text.to_lowercase()
        } else {
            text
        }
    }

    fn key(&self, triple: &RelationTriple) -> (String, String, String) {
        (
            self.normalize(&triple.subject),
            self.normalize(&triple.action),
            self.normalize(&triple.object),
        )
    }

    /// Evaluate relations as multisets: each gold triple matches at most
    /// one predicted triple
    pub fn evaluate_relations(
        &self,
        predicted: &[RelationTriple],
        gold: &[RelationTriple],
    ) -> RelationMetrics {
        let mut remaining: HashMap<(String, String, String), usize> = HashMap::new();
        for triple in gold {
            *remaining.entry(self.key(triple)).or_insert(0) += 1;
        }

        let mut true_positives = 0;
        for triple in predicted {
            if let Some(count) = remaining.get_mut(&self.key(triple)) {
                if *count > 0 {
                    *count -= 1;
                    true_positives += 1;
                }
            }
        }

        RelationMetrics {
            true_positives,
            false_positives: predicted.len() - true_positives,
            false_negatives: gold.len() - true_positives,
            gold_total: gold.len(),
            predicted_total: predicted.len(),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Aggregate Metrics
// ============================================================================

/// Aggregate metrics for a batch of sentences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub relation_metrics: RelationMetrics,
    pub num_sentences: usize,
    /// Predicted triples whose subject is still the relative-pronoun placeholder
    pub unresolved_references: usize,
}

impl AggregateMetrics {
    /// Add one sentence's metrics
    pub fn add_relation_metrics(&mut self, metrics: &RelationMetrics) {
        self.relation_metrics.true_positives += metrics.true_positives;
        self.relation_metrics.false_positives += metrics.false_positives;
        self.relation_metrics.false_negatives += metrics.false_negatives;
        self.relation_metrics.gold_total += metrics.gold_total;
        self.relation_metrics.predicted_total += metrics.predicted_total;
        self.num_sentences += 1;
    }

    /// Count predicted triples still carrying `placeholder` as subject
    pub fn count_unresolved(&mut self, predicted: &[RelationTriple], placeholder: &str) {
        self.unresolved_references += predicted
            .iter()
            .filter(|t| t.subject.eq_ignore_ascii_case(placeholder))
            .count();
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        format!(
            "=== Relation Extraction Report ===\n\n\
             Sentences evaluated: {}\n\n\
             Precision: {:.1}%\n\
             Recall:    {:.1}%\n\
             F1 Score:  {:.1}%\n\
             Gold: {} | Predicted: {} | TP: {} | FP: {} | FN: {}\n\
             Unresolved references: {}\n",
            self.num_sentences,
            self.relation_metrics.precision() * 100.0,
            self.relation_metrics.recall() * 100.0,
            self.relation_metrics.f1_score() * 100.0,
            self.relation_metrics.gold_total,
            self.relation_metrics.predicted_total,
            self.relation_metrics.true_positives,
            self.relation_metrics.false_positives,
            self.relation_metrics.false_negatives,
            self.unresolved_references,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
