//! Glob-style patterns with negation and last-match-wins lists.
//!
//! This mirrors the OpenSSH PATTERNS grammar (ssh_config(5)): `*`
//! matches any run of characters including the empty run, `?` matches
//! exactly one character, everything else matches itself literally and
//! case-sensitively, and a leading `!` negates the entry. Negation is
//! resolved by [`PatternList::evaluate`], never by the single-pattern
//! matcher: in a list, the last entry whose body matches decides the
//! outcome, so a broad allow can be carved down by later `!` exceptions
//! (or the other way around) with well-defined precedence.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One glob pattern, parsed from a single comma-separated token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    negated: bool,
    body: String,
}

impl Pattern {
    /// Parse one pattern token. A leading `!` marks the entry negated;
    /// the remaining body must be non-empty.
    pub fn new(token: &str) -> Result<Self> {
        let (negated, body) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        if body.is_empty() {
            return Err(Error::InvalidPattern(token.to_string()));
        }
        Ok(Self {
            negated,
            body: body.to_string(),
        })
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Anchored match of the whole candidate against the body.
    ///
    /// Negation is ignored here; callers that care about `!` go through
    /// [`PatternList::evaluate`].
    pub fn matches(&self, candidate: &str) -> bool {
        glob_match(self.body.as_bytes(), candidate.as_bytes())
    }
}

/// Iterative backtracking glob matcher, anchored at both ends.
///
/// Only `*` and `?` are special. Byte-oriented, like the OpenSSH
/// matcher it mirrors: `?` consumes one byte.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let mut p = 0;
    let mut t = 0;
    // Position of the most recent `*` and the text offset it has
    // swallowed up to, for backtracking.
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

/// An ordered pattern list with last-match-wins precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternList(Vec<Pattern>);

impl PatternList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a comma-separated pattern list, e.g. `"*.example.com,!evil.example.com"`.
    pub fn parse(field: &str) -> Result<Self> {
        field.split(',').map(Pattern::new).collect()
    }

    pub fn push(&mut self, pattern: Pattern) {
        self.0.push(pattern);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.0.iter()
    }

    /// Evaluate the list against a candidate: every entry whose body
    /// matches overwrites the verdict with `!negated`, so the last
    /// matching entry wins. An empty list matches nothing.
    pub fn evaluate(&self, candidate: &str) -> bool {
        let mut matched = false;
        for pattern in &self.0 {
            if pattern.matches(candidate) {
                matched = !pattern.negated;
            }
        }
        matched
    }
}

impl FromIterator<Pattern> for PatternList {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
