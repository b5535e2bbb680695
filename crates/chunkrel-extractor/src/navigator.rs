//! Tree navigation utilities
//!
//! Word counting, word-index to child-path translation, surface text
//! reconstruction, and backward search for antecedent phrases.

use chunkrel_core::{ChunkTree, ChunkrelError, Result};

/// Tokens written without a preceding space
const NO_SPACE_BEFORE: &[&str] = &[".", ",", "!", "?", ")", "''", ":", "...", ";"];

/// Token that glues the following token to itself
const OPEN_PAREN: &str = "(";

// ============================================================================
// Counting and Paths
// ============================================================================

/// Number of leaves under a node
pub fn word_count(node: &ChunkTree) -> usize {
    match node {
        ChunkTree::Leaf(_) => 1,
        ChunkTree::Branch { children, .. } => children.iter().map(word_count).sum(),
    }
}

/// Child-index path from `node` to the leaf at flat word position `index`
pub fn locate(node: &ChunkTree, index: usize) -> Result<Vec<usize>> {
    let len = word_count(node);
    if index >= len {
        return Err(ChunkrelError::IndexOutOfBounds { index, len });
    }
    let mut path = Vec::new();
    descend(node, index, &mut path);
    Ok(path)
}

fn descend(node: &ChunkTree, mut remaining: usize, path: &mut Vec<usize>) {
    if let ChunkTree::Branch { children, .. } = node {
        for (i, child) in children.iter().enumerate() {
            let count = word_count(child);
            if remaining < count {
                path.push(i);
                descend(child, remaining, path);
                return;
            }
            remaining -= count;
        }
    }
}

/// Follow a child-index path
pub fn node_at<'a>(node: &'a ChunkTree, path: &[usize]) -> Option<&'a ChunkTree> {
    path.iter()
        .try_fold(node, |current, &i| current.children().get(i))
}

// ============================================================================
// Surface Text
// ============================================================================

/// Rebuild display text from the leaves under a node
///
/// Punctuation in [`NO_SPACE_BEFORE`] attaches to the previous word, the
/// word after an opening parenthesis attaches to it, and an opening
/// parenthesis itself always takes a space, so `( see )` becomes `" (see)"`.
pub fn flatten_text(node: &ChunkTree) -> String {
    layout(node).0
}

/// Character offset of every leaf inside [`flatten_text`]
pub fn char_offsets(node: &ChunkTree) -> Vec<usize> {
    layout(node).1
}

/// Flat word index whose start offset is closest to `offset`, within
/// `tolerance` characters either way
pub fn word_at_offset(node: &ChunkTree, offset: usize, tolerance: usize) -> Option<usize> {
    char_offsets(node)
        .into_iter()
        .enumerate()
        .filter(|(_, start)| start.abs_diff(offset) <= tolerance)
        .min_by_key(|(_, start)| start.abs_diff(offset))
        .map(|(i, _)| i)
}

fn layout(node: &ChunkTree) -> (String, Vec<usize>) {
    let mut text = String::new();
    let mut offsets = Vec::new();
    let mut chars = 0;
    let mut glue = false;

    for token in node.leaves() {
        let word = token.word.as_str();
        let space = if glue || NO_SPACE_BEFORE.contains(&word) {
            false
        } else {
            word == OPEN_PAREN || !text.is_empty()
        };
        if space {
            text.push(' ');
            chars += 1;
        }
        offsets.push(chars);
        text.push_str(word);
        chars += word.chars().count();
        glue = word == OPEN_PAREN;
    }

    (text, offsets)
}

// ============================================================================
// Antecedent Search
// ============================================================================

/// Text of the closest branch labeled `label` before `child_index` among
/// `parent`'s children
///
/// Siblings are scanned from `child_index - 1` down to 0. A branch with
/// another label is searched from its last child backward before moving
/// on. Returns `None` when nothing matches.
pub fn find_nearest_preceding_branch(
    parent: &ChunkTree,
    child_index: usize,
    label: &str,
) -> Option<String> {
    find_nearest_preceding(parent.children(), child_index, &[label])
}

/// Same search over a sibling slice, accepting any of `labels`
pub fn find_nearest_preceding<S: AsRef<str>>(
    siblings: &[ChunkTree],
    child_index: usize,
    labels: &[S],
) -> Option<String> {
    let end = child_index.min(siblings.len());
    search_backward(&siblings[..end], labels)
}

fn search_backward<S: AsRef<str>>(nodes: &[ChunkTree], labels: &[S]) -> Option<String> {
    for node in nodes.iter().rev() {
        if let ChunkTree::Branch { label, children } = node {
            if labels.iter().any(|l| l.as_ref() == label.as_str()) {
                return Some(flatten_text(node));
            }
            if let Some(found) = search_backward(children, labels) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn np(words: &[&str]) -> ChunkTree {
        ChunkTree::branch(
            "NP",
            words.iter().map(|w| ChunkTree::leaf(*w, "NN")).collect(),
        )
    }

    fn sample() -> ChunkTree {
        // (S (NP The enzyme) (VP inhibits) (NP (NP the reaction) quickly))
        ChunkTree::branch(
            "S",
            vec![
                np(&["The", "enzyme"]),
                ChunkTree::branch("VP", vec![ChunkTree::leaf("inhibits", "VBZ")]),
                ChunkTree::branch(
                    "NP",
                    vec![np(&["the", "reaction"]), ChunkTree::leaf("quickly", "RB")],
                ),
            ],
        )
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(&sample()), 6);
        assert_eq!(word_count(&ChunkTree::leaf("x", "NN")), 1);
        assert_eq!(word_count(&ChunkTree::branch("S", vec![])), 0);
    }

    #[test]
    fn test_locate_paths() {
        let tree = sample();
        assert_eq!(locate(&tree, 0).unwrap(), vec![0, 0]);
        assert_eq!(locate(&tree, 2).unwrap(), vec![1, 0]);
        assert_eq!(locate(&tree, 4).unwrap(), vec![2, 0, 1]);
        assert_eq!(locate(&tree, 5).unwrap(), vec![2, 1]);

        let leaf = node_at(&tree, &locate(&tree, 4).unwrap()).unwrap();
        assert_eq!(leaf, &ChunkTree::leaf("reaction", "NN"));
    }

    #[test]
    fn test_locate_out_of_bounds() {
        let err = locate(&sample(), 6).unwrap_err();
        assert!(matches!(
            err,
            ChunkrelError::IndexOutOfBounds { index: 6, len: 6 }
        ));
    }

    #[test]
    fn test_flatten_plain() {
        assert_eq!(flatten_text(&np(&["The", "enzyme"])), "The enzyme");
        assert_eq!(
            flatten_text(&sample()),
            "The enzyme inhibits the reaction quickly"
        );
    }

    #[test]
    fn test_flatten_parentheses() {
        let node = ChunkTree::branch(
            "X",
            vec![
                ChunkTree::leaf("(", "("),
                ChunkTree::leaf("see", "VB"),
                ChunkTree::leaf(")", ")"),
            ],
        );
        assert_eq!(flatten_text(&node), " (see)");
    }

    #[test]
    fn test_flatten_punctuation() {
        let node = ChunkTree::branch(
            "S",
            ["Yes", ",", "it", "works", "...", "really", "!"]
                .iter()
                .map(|w| ChunkTree::leaf(*w, "X"))
                .collect(),
        );
        assert_eq!(flatten_text(&node), "Yes, it works... really!");
    }

    #[test]
    fn test_char_offsets_and_lookup() {
        let tree = sample();
        let offsets = char_offsets(&tree);
        assert_eq!(offsets, vec![0, 4, 11, 20, 24, 33]);

        assert_eq!(word_at_offset(&tree, 20, 0), Some(3));
        assert_eq!(word_at_offset(&tree, 22, 2), Some(3));
        assert_eq!(word_at_offset(&tree, 15, 2), None);
    }

    #[test]
    fn test_find_nearest_preceding_direct_sibling() {
        let tree = sample();
        assert_eq!(
            find_nearest_preceding_branch(&tree, 2, "NP"),
            Some("The enzyme".to_string())
        );
        assert_eq!(find_nearest_preceding_branch(&tree, 0, "NP"), None);
    }

    #[test]
    fn test_find_nearest_preceding_recurses_into_other_labels() {
        let tree = ChunkTree::branch(
            "S",
            vec![
                np(&["cells"]),
                ChunkTree::branch(
                    "PP",
                    vec![ChunkTree::leaf("of", "IN"), np(&["the", "liver"])],
                ),
                ChunkTree::branch("CLAUSE", vec![ChunkTree::leaf("which", "WDT")]),
            ],
        );
        assert_eq!(
            find_nearest_preceding_branch(&tree, 2, "NP"),
            Some("the liver".to_string())
        );
        assert_eq!(find_nearest_preceding_branch(&tree, 2, "VP"), None);
    }

    #[test]
    fn test_find_nearest_preceding_label_set() {
        let siblings = vec![
            ChunkTree::branch("MNP", vec![np(&["a"]), ChunkTree::leaf("and", "CC"), np(&["b"])]),
            ChunkTree::leaf("which", "WDT"),
        ];
        assert_eq!(
            find_nearest_preceding(&siblings, 1, &["NP", "MNP"]),
            Some("a and b".to_string())
        );
    }
}
