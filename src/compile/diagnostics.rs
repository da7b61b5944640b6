//! Classification of typesetter diagnostics and manuscript style checks.
//!
//! Classification is rule driven: each [`DiagnosticRule`] pairs a regex with
//! the kind of problem its first capture group names. New phrasings are
//! handled by adding rules, not code.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Lines of raw diagnostic output kept in failure payloads.
pub const TAIL_LINES: usize = 15;

pub const GENERIC_FAILURE_MESSAGE: &str =
    "Typesetting failed. Please review your Markdown and citations.";

pub const DOUBLE_SPACE_WARNING: &str =
    "Detected double spaces after punctuation. Consider using a single space.";

lazy_static! {
    static ref DOUBLE_SPACE_AFTER_SENTENCE: Regex =
        Regex::new(r"[.!?][ \t]{2,}[A-Z(]").expect("valid double-space regex");
    static ref BUILTIN_RULES: Vec<DiagnosticRule> = builtin_rules();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingCitation,
    MissingPackage,
}

#[derive(Debug, Clone)]
pub struct DiagnosticRule {
    pub kind: DiagnosticKind,
    /// The first capture group is the extracted citation key or package name.
    pub pattern: Regex,
}

impl DiagnosticRule {
    pub fn new(kind: DiagnosticKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            pattern: Regex::new(pattern)?,
        })
    }
}

fn builtin_rules() -> Vec<DiagnosticRule> {
    use DiagnosticKind::*;

    let patterns: [(DiagnosticKind, &str); 7] = [
        (MissingCitation, r"(?i)undefined citation\s*[: ]\s*'([^']+)'"),
        (MissingCitation, r#"(?i)citation ['"]?([A-Za-z0-9:_\-]+)['"]?\s+undefined"#),
        (MissingCitation, r"(?i)citation `([^`']+)' on page \d+ undefined"),
        (MissingCitation, r"(?i)reference\s+([A-Za-z0-9:_\-]+)\s+not found"),
        (MissingCitation, r#"(?i)could not find citation\s+['"]?([A-Za-z0-9:_\-]+)['"]?"#),
        (MissingCitation, r"(?i)citeproc: citation\s+([A-Za-z0-9:_\-]+)\s+not found"),
        (MissingPackage, r"(?i)LaTeX Error:\s*File\s+[`']([^`']+)\.sty['`]\s+not found"),
    ];

    patterns
        .iter()
        .map(|(kind, pattern)| {
            DiagnosticRule::new(*kind, pattern).expect("built-in diagnostic patterns are valid")
        })
        .collect()
}

/// Keys extracted from a diagnostic stream, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub missing_citations: Vec<String>,
    pub missing_packages: Vec<String>,
}

impl Classification {
    /// Most actionable summary: named citations and packages first.
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing_citations.is_empty() {
            parts.push(format!(
                "Undefined citations: {}.",
                self.missing_citations.join(", ")
            ));
        }
        if !self.missing_packages.is_empty() {
            parts.push(format!(
                "Missing LaTeX packages: {}.",
                self.missing_packages.join(", ")
            ));
        }
        if parts.is_empty() {
            return GENERIC_FAILURE_MESSAGE.to_string();
        }
        parts.join(" ")
    }
}

/// Everything a failed compile reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub message: String,
    pub missing_citations: Vec<String>,
    pub missing_packages: Vec<String>,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct DiagnosticParser {
    rules: Vec<DiagnosticRule>,
}

impl Default for DiagnosticParser {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.clone(),
        }
    }
}

impl DiagnosticParser {
    pub fn from_rules(rules: Vec<DiagnosticRule>) -> Self {
        Self { rules }
    }

    pub fn with_rule(mut self, rule: DiagnosticRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[DiagnosticRule] {
        &self.rules
    }

    pub fn classify(&self, stderr: &str) -> Classification {
        let mut citations = Vec::new();
        let mut packages = Vec::new();

        for rule in &self.rules {
            let hits = match rule.kind {
                DiagnosticKind::MissingCitation => &mut citations,
                DiagnosticKind::MissingPackage => &mut packages,
            };
            for captures in rule.pattern.captures_iter(stderr) {
                if let Some(key) = captures.get(1) {
                    hits.push((key.start(), key.as_str().to_string()));
                }
            }
        }

        Classification {
            missing_citations: dedup_in_order(citations),
            missing_packages: dedup_in_order(packages),
        }
    }

    pub fn report(&self, stderr: &str) -> DiagnosticReport {
        let classification = self.classify(stderr);
        DiagnosticReport {
            message: classification.message(),
            missing_citations: classification.missing_citations,
            missing_packages: classification.missing_packages,
            detail: stderr_tail(stderr, TAIL_LINES),
        }
    }
}

/// Sort hits by position in the stream and drop repeats.
fn dedup_in_order(mut hits: Vec<(usize, String)>) -> Vec<String> {
    hits.sort_by_key(|(offset, _)| *offset);
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter_map(|(_, key)| seen.insert(key.clone()).then_some(key))
        .collect()
}

/// Last `lines` lines of `text`, ignoring trailing blank output.
pub fn stderr_tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Advisory warnings about the manuscript itself. Independent of the compile
/// outcome.
pub fn style_warnings(manuscript: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    if DOUBLE_SPACE_AFTER_SENTENCE.is_match(manuscript) {
        warnings.push(DOUBLE_SPACE_WARNING.to_string());
    }
    warnings
}
