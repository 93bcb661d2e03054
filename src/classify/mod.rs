//! Line classification.
//!
//! Assigns a semantic kind to a line's text. Classification is pure and is
//! recomputed whenever a line's text changes, so a stored kind can never go
//! stale.

/// Semantic kind of a line, used in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing but spaces and tabs.
    Empty,
    /// First non-blank character is `;`.
    Comment,
    /// Anything else with content.
    Command,
    /// No rule produced a kind.
    Unknown,
}

impl LineKind {
    /// Uppercase label used in the INFO listing.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Comment => "COMMENT",
            Self::Command => "COMMAND",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A single classification rule. Returns `None` when the rule does not apply.
type Rule = fn(&str) -> Option<LineKind>;

/// Ordered rules; the first rule to produce a kind wins. `detect_command`
/// accepts any non-blank line, so it must stay last.
const RULES: &[Rule] = &[detect_empty, detect_comment, detect_command];

/// Classify a line's text.
pub fn classify(text: &str) -> LineKind {
    RULES
        .iter()
        .find_map(|rule| rule(text))
        .unwrap_or(LineKind::Unknown)
}

/// The line with leading spaces and tabs removed.
fn body(text: &str) -> &str {
    text.trim_start_matches([' ', '\t'])
}

fn detect_empty(text: &str) -> Option<LineKind> {
    body(text).is_empty().then_some(LineKind::Empty)
}

fn detect_comment(text: &str) -> Option<LineKind> {
    body(text).starts_with(';').then_some(LineKind::Comment)
}

fn detect_command(text: &str) -> Option<LineKind> {
    (!body(text).is_empty()).then_some(LineKind::Command)
}
