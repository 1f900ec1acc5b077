//! Allowed-signers records: who may sign, for which namespaces, when.
//!
//! One record corresponds to one directive line:
//!
//! ```text
//! <principal-patterns> <options> <keytype> <key-material> [comment]
//! ```
//!
//! The options field is mandatory in this grammar: a line with only
//! three fields is rejected rather than treated as an optionless
//! directive. Real-world allowed_signers files may omit the field;
//! that compatibility gap is deliberate and documented, not repaired.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, LineError, ParseReport, Result};
use crate::keys::PublicKey;
use crate::options::{split_options, unquote};
use crate::pattern::{Pattern, PatternList};
use crate::timespec::{parse_timespec, TimeWindow};

/// One parsed allowed-signers directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedSigner {
    pub key: PublicKey,
    /// Principal patterns, last match wins.
    pub principals: PatternList,
    /// Namespace patterns. Empty means the signer is unrestricted: it is
    /// accepted for every namespace.
    pub namespaces: PatternList,
    pub is_ca: bool,
    pub window: TimeWindow,
}

impl AllowedSigner {
    /// Parse one non-blank, non-comment line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // Principals, options, key type, key material. Anything after
        // the material is ignored as a trailing comment.
        if fields.len() < 4 {
            return Err(Error::MalformedLine(line.to_string()));
        }
        let mut signer = Self {
            key: PublicKey::parse(fields[2], fields[3])?,
            principals: PatternList::parse(fields[0])?,
            namespaces: PatternList::new(),
            is_ca: false,
            window: TimeWindow::default(),
        };
        for token in split_options(fields[1])? {
            signer.apply_option(&token)?;
        }
        Ok(signer)
    }

    /// The restricted option subset this grammar allows in field 2.
    fn apply_option(&mut self, token: &str) -> Result<()> {
        if token == "cert-authority" {
            self.is_ca = true;
            return Ok(());
        }
        let Some((name, raw_value)) = token.split_once('=') else {
            return Err(Error::UnknownOption(token.to_string()));
        };
        let value = unquote(raw_value);
        match name {
            "namespaces" => {
                for part in value.split(',') {
                    self.namespaces.push(Pattern::new(part)?);
                }
            }
            "valid-after" => self.window.valid_after = Some(parse_timespec(value)?),
            "valid-before" => self.window.valid_before = Some(parse_timespec(value)?),
            _ => return Err(Error::UnknownOption(token.to_string())),
        }
        Ok(())
    }

    /// True if the signer may vouch for `candidate`.
    pub fn matches_principal(&self, candidate: &str) -> bool {
        self.principals.evaluate(candidate)
    }

    /// True if the signer is accepted for `candidate`.
    ///
    /// An empty namespace list accepts every namespace: an absent
    /// restriction in the source grammar means unrestricted, so this is
    /// a deliberate deviation from the generic empty-list rule of
    /// [`PatternList::evaluate`].
    pub fn matches_namespace(&self, candidate: &str) -> bool {
        self.namespaces.is_empty() || self.namespaces.evaluate(candidate)
    }

    /// True if the signer's validity window contains `now`.
    pub fn valid_at(&self, now: DateTime<Utc>) -> bool {
        self.window.contains(now)
    }
}

/// Parse an allowed-signers buffer leniently: blank and `#` lines are
/// skipped, well-formed lines become records, malformed lines are
/// collected with their 1-based line numbers.
pub fn parse_allowed_signers(input: &str) -> ParseReport<AllowedSigner> {
    let mut report = ParseReport::default();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match AllowedSigner::parse_line(line) {
            Ok(signer) => report.records.push(signer),
            Err(error) => {
                let err = LineError {
                    line: idx + 1,
                    error,
                };
                warn!(%err, "skipping malformed allowed_signers line");
                report.errors.push(err);
            }
        }
    }
    debug!(
        records = report.records.len(),
        errors = report.errors.len(),
        "parsed allowed_signers buffer"
    );
    report
}
