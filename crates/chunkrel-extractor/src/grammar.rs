//! Chunk grammar
//!
//! A grammar is an ordered list of rules. Each rule names a phrase label
//! and carries build patterns (runs of nodes to wrap into a new branch)
//! and break patterns (runs that dissolve a branch of that label again).
//!
//! Grammars are written in a small text language and compiled once:
//!
//! ```text
//! # determiner, adjectives, nouns
//! NP:  {<DT|PRP\$>?<JJ.*>*<NN.*>+}
//!      }<VBD>{
//! MNP: {[NP](<,|CC>[NP])+}
//! ```
//!
//! `<regex>` tests a leaf's tag (anchored, so `NN.*` is a prefix match and
//! `NN` is exact), `[A|B]` tests a branch label, and `( )`, `|`, `?`, `*`,
//! `+` combine them. The same structure can be built directly with
//! [`Pattern`], [`Rule`] and [`GrammarBuilder`].

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use thiserror::Error;

use chunkrel_core::{ChunkTree, ChunkrelError, GrammarConfig};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while compiling a grammar
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Invalid tag pattern <{pattern}>: {source}")]
    InvalidTagPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule {rule} references undefined label {label}")]
    UndefinedLabel { rule: String, label: String },

    #[error("Duplicate rule label: {0}")]
    DuplicateRule(String),

    #[error("Rule {0} has no patterns")]
    EmptyRule(String),

    #[error("Pass count must be at least 1")]
    InvalidPassCount,

    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),
}

impl From<GrammarError> for ChunkrelError {
    fn from(err: GrammarError) -> Self {
        ChunkrelError::InvalidGrammar(err.to_string())
    }
}

// ============================================================================
// Predicates and Patterns
// ============================================================================

/// Test applied to a single node
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Leaf whose tag matches the anchored regex
    Tag { source: String, regex: Regex },
    /// Branch whose label is one of these
    Label(Vec<String>),
}

impl Predicate {
    /// Compile a tag predicate
    pub fn tag(pattern: &str) -> Result<Self, GrammarError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            GrammarError::InvalidTagPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self::Tag {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Label predicate for one or more labels
    pub fn label<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Label(labels.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, node: &ChunkTree) -> bool {
        match (self, node) {
            (Self::Tag { regex, .. }, ChunkTree::Leaf(token)) => regex.is_match(&token.tag),
            (Self::Label(labels), ChunkTree::Branch { label, .. }) => {
                labels.iter().any(|l| l == label)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag { source, .. } => write!(f, "<{}>", source),
            Self::Label(labels) => write!(f, "[{}]", labels.join("|")),
        }
    }
}

/// A regular pattern over a sequence of nodes
#[derive(Debug, Clone)]
pub enum Pattern {
    Atom(Predicate),
    Seq(Vec<Pattern>),
    Alt(Vec<Pattern>),
    Repeat {
        inner: Box<Pattern>,
        min: usize,
        max: Option<usize>,
    },
}

impl Pattern {
    /// Parse a pattern body, e.g. `<DT>?<NN.*>+`
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        PatternParser::new(text, 1).parse()
    }

    pub fn tag(pattern: &str) -> Result<Self, GrammarError> {
        Ok(Self::Atom(Predicate::tag(pattern)?))
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Atom(Predicate::Label(vec![label.into()]))
    }

    pub fn seq(parts: Vec<Pattern>) -> Self {
        Self::Seq(parts)
    }

    pub fn alt(options: Vec<Pattern>) -> Self {
        Self::Alt(options)
    }

    pub fn optional(inner: Pattern) -> Self {
        Self::Repeat {
            inner: Box::new(inner),
            min: 0,
            max: Some(1),
        }
    }

    pub fn star(inner: Pattern) -> Self {
        Self::Repeat {
            inner: Box::new(inner),
            min: 0,
            max: None,
        }
    }

    pub fn plus(inner: Pattern) -> Self {
        Self::Repeat {
            inner: Box::new(inner),
            min: 1,
            max: None,
        }
    }

    /// Every end position reachable by matching this pattern from `start`
    pub fn match_ends(&self, nodes: &[ChunkTree], start: usize) -> BTreeSet<usize> {
        self.advance(nodes, &BTreeSet::from([start]))
    }

    /// End of the longest non-empty match starting at `start`
    pub fn longest_match(&self, nodes: &[ChunkTree], start: usize) -> Option<usize> {
        self.match_ends(nodes, start)
            .into_iter()
            .filter(|&end| end > start)
            .max()
    }

    /// Check if a non-empty match exists anywhere in `nodes`
    pub fn matches_within(&self, nodes: &[ChunkTree]) -> bool {
        (0..nodes.len()).any(|start| self.longest_match(nodes, start).is_some())
    }

    /// Set-wise simulation: all positions reachable from any of `starts`
    fn advance(&self, nodes: &[ChunkTree], starts: &BTreeSet<usize>) -> BTreeSet<usize> {
        match self {
            Self::Atom(predicate) => starts
                .iter()
                .filter(|&&pos| pos < nodes.len() && predicate.matches(&nodes[pos]))
                .map(|pos| pos + 1)
                .collect(),
            Self::Seq(parts) => parts
                .iter()
                .fold(starts.clone(), |reached, part| part.advance(nodes, &reached)),
            Self::Alt(options) => options
                .iter()
                .flat_map(|option| option.advance(nodes, starts))
                .collect(),
            Self::Repeat { inner, min, max } => {
                let mut current = starts.clone();
                for _ in 0..*min {
                    current = inner.advance(nodes, &current);
                }

                let mut reached = current.clone();
                let mut frontier = current;
                let mut count = *min;
                while !frontier.is_empty() && max.map_or(true, |m| count < m) {
                    let next: BTreeSet<usize> = inner
                        .advance(nodes, &frontier)
                        .difference(&reached)
                        .copied()
                        .collect();
                    reached.extend(next.iter().copied());
                    frontier = next;
                    count += 1;
                }
                reached
            }
        }
    }

    fn collect_labels<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Atom(Predicate::Label(labels)) => out.extend(labels.iter().map(String::as_str)),
            Self::Atom(Predicate::Tag { .. }) => {}
            Self::Seq(parts) | Self::Alt(parts) => {
                for part in parts {
                    part.collect_labels(out);
                }
            }
            Self::Repeat { inner, .. } => inner.collect_labels(out),
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            Self::Atom(_) => false,
            Self::Seq(parts) | Self::Alt(parts) => parts.len() > 1,
            Self::Repeat { .. } => true,
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom(predicate) => write!(f, "{}", predicate),
            Self::Seq(parts) => parts.iter().try_for_each(|p| write!(f, "{}", p)),
            Self::Alt(options) => {
                let rendered: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                write!(f, "({})", rendered.join("|"))
            }
            Self::Repeat { inner, min, max } => {
                let quantifier = match (min, max) {
                    (0, Some(1)) => "?".to_string(),
                    (0, None) => "*".to_string(),
                    (1, None) => "+".to_string(),
                    (min, Some(max)) => format!("{{{},{}}}", min, max),
                    (min, None) => format!("{{{},}}", min),
                };
                if inner.is_compound() && !matches!(**inner, Self::Alt(_)) {
                    write!(f, "({}){}", inner, quantifier)
                } else {
                    write!(f, "{}{}", inner, quantifier)
                }
            }
        }
    }
}

// ============================================================================
// Pattern Parser
// ============================================================================

/// Recursive-descent parser for one pattern body
struct PatternParser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    text: &'a str,
}

impl<'a> PatternParser<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line,
            text,
        }
    }

    fn parse(mut self) -> Result<Pattern, GrammarError> {
        let pattern = self.parse_alt()?;
        self.skip_ws();
        if self.pos < self.chars.len() {
            return Err(self.error(format!("unexpected '{}'", self.chars[self.pos])));
        }
        if matches!(&pattern, Pattern::Seq(parts) if parts.is_empty()) {
            return Err(self.error(format!("empty pattern in {:?}", self.text)));
        }
        Ok(pattern)
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        GrammarError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn parse_alt(&mut self) -> Result<Pattern, GrammarError> {
        let mut options = vec![self.parse_seq()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            options.push(self.parse_seq()?);
        }
        Ok(if options.len() == 1 {
            options.remove(0)
        } else {
            Pattern::Alt(options)
        })
    }

    fn parse_seq(&mut self) -> Result<Pattern, GrammarError> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            parts.push(self.parse_quantified()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Pattern::Seq(parts)
        })
    }

    fn parse_quantified(&mut self) -> Result<Pattern, GrammarError> {
        let mut pattern = self.parse_primary()?;
        while let Some(c) = self.peek() {
            pattern = match c {
                '?' => Pattern::optional(pattern),
                '*' => Pattern::star(pattern),
                '+' => Pattern::plus(pattern),
                _ => break,
            };
            self.pos += 1;
        }
        Ok(pattern)
    }

    fn parse_primary(&mut self) -> Result<Pattern, GrammarError> {
        match self.peek() {
            Some('<') => {
                self.pos += 1;
                let body = self.read_until('>')?;
                let body = body.trim();
                if body.is_empty() {
                    return Err(self.error("empty tag predicate <>"));
                }
                Pattern::tag(body)
            }
            Some('[') => {
                self.pos += 1;
                let body = self.read_until(']')?;
                let labels: Vec<String> = body
                    .split('|')
                    .map(|l| l.trim().to_string())
                    .collect();
                if labels.iter().any(|l| !is_label(l)) {
                    return Err(self.error(format!("invalid label predicate [{}]", body)));
                }
                Ok(Pattern::Atom(Predicate::Label(labels)))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_alt()?;
                if self.peek() != Some(')') {
                    return Err(self.error("unclosed group"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(c) => Err(self.error(format!("unexpected '{}'", c))),
            None => Err(self.error("unexpected end of pattern")),
        }
    }

    /// Read raw text up to an unescaped `close`, consuming it
    fn read_until(&mut self, close: char) -> Result<String, GrammarError> {
        let mut out = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            if c == '\\' {
                out.push(c);
                if let Some(&next) = self.chars.get(self.pos) {
                    out.push(next);
                    self.pos += 1;
                }
                continue;
            }
            if c == close {
                return Ok(out);
            }
            out.push(c);
        }
        Err(self.error(format!("missing '{}'", close)))
    }
}

fn is_label(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ============================================================================
// Rules and Grammar
// ============================================================================

/// One phrase rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub label: String,
    pub builds: Vec<Pattern>,
    pub breaks: Vec<Pattern>,
}

impl Rule {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            builds: Vec::new(),
            breaks: Vec::new(),
        }
    }

    /// Add a build pattern
    pub fn with_build(mut self, pattern: Pattern) -> Self {
        self.builds.push(pattern);
        self
    }

    /// Add a break pattern
    pub fn with_break(mut self, pattern: Pattern) -> Self {
        self.breaks.push(pattern);
        self
    }

    /// First build pattern (in declaration order) matching at `start`,
    /// returning the end of its longest match
    pub fn find_build(&self, nodes: &[ChunkTree], start: usize) -> Option<usize> {
        self.builds
            .iter()
            .find_map(|pattern| pattern.longest_match(nodes, start))
    }

    /// Check if any break pattern matches inside `nodes`
    pub fn breaks_within(&self, nodes: &[ChunkTree]) -> bool {
        self.breaks.iter().any(|pattern| pattern.matches_within(nodes))
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.label)?;
        for pattern in &self.builds {
            write!(f, " {{{}}}", pattern)?;
        }
        for pattern in &self.breaks {
            write!(f, " }}{}{{", pattern)?;
        }
        Ok(())
    }
}

/// A compiled, validated grammar
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    passes: usize,
    root_label: String,
}

impl Grammar {
    /// Start building a grammar programmatically
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Compile grammar text with the given pass count
    pub fn parse(source: &str, passes: usize) -> Result<Self, GrammarError> {
        Self::from_config(&GrammarConfig {
            passes,
            source: source.to_string(),
            ..GrammarConfig::default()
        })
    }

    /// Compile from configuration
    pub fn from_config(config: &GrammarConfig) -> Result<Self, GrammarError> {
        parse_rules(&config.source)?
            .into_iter()
            .fold(
                Self::builder()
                    .passes(config.passes)
                    .root_label(config.root_label.clone()),
                |b, rule| b.rule(rule),
            )
            .build()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// Look up a rule by label
    pub fn rule(&self, label: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.label == label)
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// Builder that validates a grammar before handing it out
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
    passes: usize,
    root_label: String,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            passes: 1,
            root_label: "S".to_string(),
        }
    }

    /// Append a rule (rules apply in the order added)
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    pub fn root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    /// Validate and produce the grammar
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.passes == 0 {
            return Err(GrammarError::InvalidPassCount);
        }
        if !is_label(&self.root_label) {
            return Err(GrammarError::InvalidLabel(self.root_label));
        }

        let mut defined = HashSet::new();
        for rule in &self.rules {
            if !is_label(&rule.label) {
                return Err(GrammarError::InvalidLabel(rule.label.clone()));
            }
            if !defined.insert(rule.label.as_str()) {
                return Err(GrammarError::DuplicateRule(rule.label.clone()));
            }
            if rule.builds.is_empty() && rule.breaks.is_empty() {
                return Err(GrammarError::EmptyRule(rule.label.clone()));
            }
        }

        // Label predicates may point at rules declared later; later passes see them
        for rule in &self.rules {
            let mut referenced = Vec::new();
            for pattern in rule.builds.iter().chain(&rule.breaks) {
                pattern.collect_labels(&mut referenced);
            }
            if let Some(missing) = referenced.into_iter().find(|l| !defined.contains(l)) {
                return Err(GrammarError::UndefinedLabel {
                    rule: rule.label.clone(),
                    label: missing.to_string(),
                });
            }
        }

        if self.rules.is_empty() {
            tracing::warn!("Grammar has no rules; sentences will stay flat");
        }
        tracing::debug!(
            rules = self.rules.len(),
            passes = self.passes,
            "Grammar compiled"
        );

        Ok(Grammar {
            rules: self.rules,
            passes: self.passes,
            root_label: self.root_label,
        })
    }
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Grammar Text Parser
// ============================================================================

/// Parse grammar text into rules, in declaration order
fn parse_rules(source: &str) -> Result<Vec<Rule>, GrammarError> {
    let mut rules: Vec<Rule> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut rest = match split_label(line) {
            Some((label, rest)) => {
                rules.push(Rule::new(label));
                rest
            }
            None => line,
        };

        let rule = rules.last_mut().ok_or_else(|| GrammarError::Syntax {
            line: line_no,
            message: "pattern before any rule label".to_string(),
        })?;

        while !rest.is_empty() {
            let (open, close) = match rest.chars().next() {
                Some('{') => ('{', '}'),
                Some('}') => ('}', '{'),
                _ => {
                    return Err(GrammarError::Syntax {
                        line: line_no,
                        message: format!("expected '{{' or '}}' in {:?}", rest),
                    })
                }
            };
            let end = find_outside_brackets(&rest[1..], close).ok_or_else(|| {
                GrammarError::Syntax {
                    line: line_no,
                    message: format!("missing '{}'", close),
                }
            })?;
            let body = &rest[1..1 + end];
            let pattern = PatternParser::new(body, line_no).parse()?;
            if open == '{' {
                rule.builds.push(pattern);
            } else {
                rule.breaks.push(pattern);
            }
            rest = rest[1 + end + 1..].trim_start();
        }
    }

    Ok(rules)
}

/// `LABEL: rest` -> `(LABEL, rest)`
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = line.split_once(':')?;
    let head = head.trim();
    is_label(head).then(|| (head, rest.trim_start()))
}

/// Drop a `#` comment, ignoring `#` inside `<...>` (it is a tag there)
fn strip_comment(line: &str) -> &str {
    let mut in_tag = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '<' => in_tag = true,
            '>' => in_tag = false,
            '#' if !in_tag => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Byte index of the first `target` not inside `<...>`
fn find_outside_brackets(text: &str, target: char) -> Option<usize> {
    let mut in_tag = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '<' if !in_tag => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if c == target && !in_tag => return Some(i),
            _ => {}
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(tags: &[&str]) -> Vec<ChunkTree> {
        tags.iter()
            .enumerate()
            .map(|(i, tag)| ChunkTree::leaf(format!("w{}", i), *tag))
            .collect()
    }

    #[test]
    fn test_tag_predicate_is_anchored() {
        let exact = Predicate::tag("NN").unwrap();
        let prefix = Predicate::tag("NN.*").unwrap();
        let nns = ChunkTree::leaf("cells", "NNS");

        assert!(!exact.matches(&nns));
        assert!(prefix.matches(&nns));
        assert!(exact.matches(&ChunkTree::leaf("cell", "NN")));
    }

    #[test]
    fn test_label_predicate_only_matches_branches() {
        let pred = Predicate::label(["NP"]);
        assert!(pred.matches(&ChunkTree::branch("NP", vec![])));
        assert!(!pred.matches(&ChunkTree::leaf("NP", "NP")));
        assert!(!pred.matches(&ChunkTree::branch("VP", vec![])));
    }

    #[test]
    fn test_longest_match() {
        let pattern = Pattern::parse("<DT>?<JJ.*>*<NN.*>+").unwrap();
        let nodes = leaves(&["DT", "JJ", "NN", "NNS", "VBZ"]);
        assert_eq!(pattern.longest_match(&nodes, 0), Some(4));
        assert_eq!(pattern.longest_match(&nodes, 2), Some(4));
        assert_eq!(pattern.longest_match(&nodes, 4), None);
    }

    #[test]
    fn test_empty_match_is_not_a_match() {
        let pattern = Pattern::parse("<DT>?").unwrap();
        let nodes = leaves(&["NN"]);
        assert_eq!(pattern.longest_match(&nodes, 0), None);
    }

    #[test]
    fn test_alternation_and_groups() {
        let pattern = Pattern::parse("[NP](<,|CC>[NP])+").unwrap();
        let nodes = vec![
            ChunkTree::branch("NP", vec![]),
            ChunkTree::leaf(",", ","),
            ChunkTree::branch("NP", vec![]),
            ChunkTree::leaf("and", "CC"),
            ChunkTree::branch("NP", vec![]),
            ChunkTree::leaf("and", "CC"),
        ];
        assert_eq!(pattern.longest_match(&nodes, 0), Some(5));
    }

    #[test]
    fn test_escaped_tags() {
        let pattern = Pattern::parse(r"<\(><NN.*><\)>").unwrap();
        let nodes = leaves(&["(", "NNP", ")"]);
        assert_eq!(pattern.longest_match(&nodes, 0), Some(3));

        let prp = Pattern::parse(r"<PRP\$?>").unwrap();
        assert_eq!(prp.longest_match(&leaves(&["PRP$"]), 0), Some(1));
        assert_eq!(prp.longest_match(&leaves(&["PRP"]), 0), Some(1));
    }

    #[test]
    fn test_parse_grammar_text() {
        let source = r"
            # noun phrases
            NP:  {<DT>?<JJ.*>*<NN.*>+}   # trailing comment
                 }<VBD>{
            MNP: {[NP](<,|CC>[NP])+}
            TAG: {<#><CD>}
        ";
        let grammar = Grammar::parse(source, 2).unwrap();
        assert_eq!(grammar.passes(), 2);
        assert_eq!(grammar.rules().len(), 3);

        let np = grammar.rule("NP").unwrap();
        assert_eq!(np.builds.len(), 1);
        assert_eq!(np.breaks.len(), 1);
        assert_eq!(grammar.rules()[1].label, "MNP");
        assert_eq!(grammar.rule("TAG").unwrap().builds[0].to_string(), "<#><CD>");
    }

    #[test]
    fn test_multiple_patterns_on_one_line() {
        let grammar = Grammar::parse("VP: {<MD>?<VB.*>+} {<TO><VB>}", 1).unwrap();
        assert_eq!(grammar.rule("VP").unwrap().builds.len(), 2);
    }

    #[test]
    fn test_undefined_label_fails_fast() {
        let err = Grammar::parse("MNP: {[NP]<CC>[NP]}", 1).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UndefinedLabel { ref rule, ref label } if rule == "MNP" && label == "NP"
        ));
    }

    #[test]
    fn test_forward_label_reference_allowed() {
        let source = "CLAUSE: {[NP][VP]}\nNP: {<NN.*>+}\nVP: {<VB.*>+}";
        assert!(Grammar::parse(source, 2).is_ok());
    }

    #[test]
    fn test_grammar_errors() {
        assert!(matches!(
            Grammar::parse("NP: {<NN>}", 0),
            Err(GrammarError::InvalidPassCount)
        ));
        assert!(matches!(
            Grammar::parse("NP: {<NN>}\nNP: {<NNS>}", 1),
            Err(GrammarError::DuplicateRule(_))
        ));
        assert!(matches!(
            Grammar::parse("NP:", 1),
            Err(GrammarError::EmptyRule(_))
        ));
        assert!(matches!(
            Grammar::parse("NP: {<NN(>}", 1),
            Err(GrammarError::InvalidTagPattern { .. })
        ));
        assert!(matches!(
            Grammar::parse("{<NN>}", 1),
            Err(GrammarError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            Grammar::parse("NP: {<NN>\n", 1),
            Err(GrammarError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            Grammar::parse("NP: {<NN>}\nVP: {(<VB>}", 1),
            Err(GrammarError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn test_builder_matches_parsed() {
        let built = Grammar::builder()
            .rule(
                Rule::new("NP").with_build(Pattern::seq(vec![
                    Pattern::optional(Pattern::tag("DT").unwrap()),
                    Pattern::plus(Pattern::tag("NN.*").unwrap()),
                ])),
            )
            .passes(1)
            .build()
            .unwrap();

        assert_eq!(built.rules()[0].builds[0].to_string(), "<DT>?<NN.*>+");
        assert_eq!(built.root_label(), "S");
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let text = "[NP](<,|CC>[NP])+";
        let pattern = Pattern::parse(text).unwrap();
        let reparsed = Pattern::parse(&pattern.to_string()).unwrap();
        let nodes = vec![
            ChunkTree::branch("NP", vec![]),
            ChunkTree::leaf("and", "CC"),
            ChunkTree::branch("NP", vec![]),
        ];
        assert_eq!(reparsed.longest_match(&nodes, 0), Some(3));
    }

    #[test]
    fn test_parse_matches_from_config() {
        let source = "NP: {<DT>?<NN.*>+}\n    }<VBD>{\nVP: {<VB.*>+}";
        let parsed = Grammar::parse(source, 2).unwrap();
        let configured = Grammar::from_config(&GrammarConfig {
            passes: 2,
            root_label: "S".to_string(),
            source: source.to_string(),
        })
        .unwrap();

        assert_eq!(parsed.to_string(), configured.to_string());
        assert_eq!(parsed.passes(), configured.passes());
        assert_eq!(parsed.root_label(), configured.root_label());
        assert_eq!(parsed.rule("NP").map(|r| r.breaks.len()), Some(1));
    }

    #[test]
    fn test_breaks_within() {
        let rule = Rule::new("NP").with_break(Pattern::tag("VBD").unwrap());
        assert!(rule.breaks_within(&leaves(&["NN", "VBD", "NN"])));
        assert!(!rule.breaks_within(&leaves(&["NN", "NNS"])));
    }
}
