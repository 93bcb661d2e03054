//! Wildcard pattern matching.
//!
//! Glob-style patterns: `*` matches any run of characters (including none),
//! `?` matches exactly one character. A match is total — pattern and text
//! must both be fully consumed, so `"abc"` does not match `"abcd"`.

/// Whether pattern matching compares characters exactly or case-folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// Characters must match exactly.
    #[default]
    Sensitive,
    /// Characters match under simple case folding.
    Insensitive,
}

impl CaseSensitivity {
    /// Build from an "ignore case" flag.
    pub const fn from_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }
}

/// Match `text` against a wildcard `pattern`.
///
/// Backtracking matcher: on `*` the remainder of the pattern is tried
/// against every suffix of the remaining text, empty suffix included.
/// Worst case O(n·m), which is acceptable at line lengths.
pub fn matches(pattern: &str, text: &str, case: CaseSensitivity) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match case {
        CaseSensitivity::Sensitive => match_from(&pattern, &text, &|a, b| a == b),
        CaseSensitivity::Insensitive => match_from(&pattern, &text, &folded_eq),
    }
}

fn folded_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// One algorithm for both cases, parameterized by character equality.
fn match_from(pattern: &[char], text: &[char], eq: &impl Fn(char, char) -> bool) -> bool {
    let mut p = 0;
    let mut t = 0;

    while p < pattern.len() && t < text.len() {
        match pattern[p] {
            '*' => {
                // Consecutive stars collapse to one.
                while p < pattern.len() && pattern[p] == '*' {
                    p += 1;
                }
                if p == pattern.len() {
                    return true;
                }
                while t < text.len() {
                    if match_from(&pattern[p..], &text[t..], eq) {
                        return true;
                    }
                    t += 1;
                }
                return false;
            }
            '?' => {
                p += 1;
                t += 1;
            }
            c if eq(c, text[t]) => {
                p += 1;
                t += 1;
            }
            _ => return false,
        }
    }

    // Trailing stars match the empty suffix.
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len() && t == text.len()
}
