//! Authorized-keys records: the per-key option grammar and its
//! evaluation.
//!
//! One record corresponds to one line of an authorized_keys-style file.
//! The option grammar is dense and irregular (boolean flags with `no-`
//! inverses, write-once flags, a `restrict` macro, accumulating
//! multi-valued options, quoted values), so interpretation is driven by
//! two lookup tables ([`BareOption`], [`ValuedOption`]) and a fold that
//! applies one state transition per token, left to right. That makes
//! ordering effects explicit: `restrict,pty` ends with a PTY allowed,
//! `pty,restrict` with it denied.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, LineError, ParseReport, Result};
use crate::keys::PublicKey;
use crate::options::unquote;
use crate::pattern::{Pattern, PatternList};
use crate::timespec::{parse_timespec, TimeWindow};

/// One fully-resolved authorized key.
///
/// Capability booleans default to permitted; `restrict` and the `no-`
/// flags turn them off. Built once by [`AuthorizedKey::build`], immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedKey {
    pub key: PublicKey,
    pub comment: String,
    /// Principals the key may act as. Empty means the key is open: any
    /// principal is accepted.
    pub principals: Vec<String>,
    pub is_ca: bool,
    pub command: Option<String>,
    pub environment: HashMap<String, String>,
    pub expiry_time: Option<DateTime<Utc>>,
    pub agent_forwarding: bool,
    /// Source patterns (`from=`). Empty means unrestricted.
    pub from: PatternList,
    pub port_forwarding: bool,
    pub pty: bool,
    pub user_rc: bool,
    pub x11_forwarding: bool,
    pub permit_listen: Option<String>,
    pub permit_open: Option<String>,
    pub no_touch_required: bool,
    pub verify_required: bool,
    pub tunnel: Option<String>,
}

/// Flags without a value. Lookup is case-sensitive and exact; adding a
/// flag means adding a variant and a table row, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BareOption {
    AgentForwarding,
    NoAgentForwarding,
    CertAuthority,
    NoPortForwarding,
    PortForwarding,
    NoPty,
    Pty,
    NoUserRc,
    UserRc,
    NoX11Forwarding,
    X11Forwarding,
    NoTouchRequired,
    VerifyRequired,
    Restrict,
}

impl BareOption {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "agent-forwarding" => Self::AgentForwarding,
            "no-agent-forwarding" => Self::NoAgentForwarding,
            "cert-authority" => Self::CertAuthority,
            "no-port-forwarding" => Self::NoPortForwarding,
            "port-forwarding" => Self::PortForwarding,
            "no-pty" => Self::NoPty,
            "pty" => Self::Pty,
            "no-user-rc" => Self::NoUserRc,
            "user-rc" => Self::UserRc,
            "no-x11-forwarding" => Self::NoX11Forwarding,
            "x11-forwarding" => Self::X11Forwarding,
            "no-touch-required" => Self::NoTouchRequired,
            "verify-required" => Self::VerifyRequired,
            "restrict" => Self::Restrict,
            _ => return None,
        })
    }
}

/// Options of the form `name=value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValuedOption {
    Command,
    Environment,
    ExpiryTime,
    From,
    PermitListen,
    PermitOpen,
    Principal,
    Tunnel,
}

impl ValuedOption {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "command" => Self::Command,
            "environment" => Self::Environment,
            "expiry-time" => Self::ExpiryTime,
            "from" => Self::From,
            "permit-listen" => Self::PermitListen,
            "permit-open" => Self::PermitOpen,
            "principal" => Self::Principal,
            "tunnel" => Self::Tunnel,
            _ => return None,
        })
    }
}

impl AuthorizedKey {
    /// Build a record from already-isolated parts: validated key
    /// material, the trailing free-text comment, and the option tokens
    /// produced by [`crate::options::split_options`].
    ///
    /// Fail-fast: the first unknown or malformed token rejects the
    /// whole record.
    pub fn build<I>(key: PublicKey, comment: &str, tokens: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut record = Self {
            key,
            comment: comment.to_string(),
            principals: Vec::new(),
            is_ca: false,
            command: None,
            environment: HashMap::new(),
            expiry_time: None,
            agent_forwarding: true,
            from: PatternList::new(),
            port_forwarding: true,
            pty: true,
            user_rc: true,
            x11_forwarding: true,
            permit_listen: None,
            permit_open: None,
            no_touch_required: false,
            verify_required: false,
            tunnel: None,
        };
        for token in tokens {
            record.apply(token.as_ref())?;
        }
        Ok(record)
    }

    /// Apply one option token as a state transition.
    fn apply(&mut self, token: &str) -> Result<()> {
        if let Some(flag) = BareOption::from_name(token) {
            self.apply_flag(flag);
            return Ok(());
        }
        let Some((name, raw_value)) = token.split_once('=') else {
            return Err(Error::UnknownOption(token.to_string()));
        };
        let Some(option) = ValuedOption::from_name(name) else {
            return Err(Error::UnknownOption(token.to_string()));
        };
        let value = unquote(raw_value);
        match option {
            ValuedOption::Command => self.command = Some(value.to_string()),
            ValuedOption::Environment => {
                let Some((var, val)) = value.split_once('=') else {
                    return Err(Error::MalformedOption(token.to_string()));
                };
                self.environment.insert(var.to_string(), val.to_string());
            }
            ValuedOption::ExpiryTime => self.expiry_time = Some(parse_timespec(value)?),
            ValuedOption::From => {
                // No quoting or escaping inside the value itself; the
                // grammar splits plainly on commas.
                for part in value.split(',') {
                    self.from.push(Pattern::new(part)?);
                }
            }
            ValuedOption::PermitListen => self.permit_listen = Some(value.to_string()),
            ValuedOption::PermitOpen => self.permit_open = Some(value.to_string()),
            ValuedOption::Principal => {
                self.principals.extend(value.split(',').map(str::to_string));
            }
            ValuedOption::Tunnel => self.tunnel = Some(value.to_string()),
        }
        Ok(())
    }

    fn apply_flag(&mut self, flag: BareOption) {
        match flag {
            BareOption::AgentForwarding => self.agent_forwarding = true,
            BareOption::NoAgentForwarding => self.agent_forwarding = false,
            BareOption::CertAuthority => self.is_ca = true,
            BareOption::NoPortForwarding => self.port_forwarding = false,
            BareOption::PortForwarding => self.port_forwarding = true,
            BareOption::NoPty => self.pty = false,
            BareOption::Pty => self.pty = true,
            BareOption::NoUserRc => self.user_rc = false,
            BareOption::UserRc => self.user_rc = true,
            BareOption::NoX11Forwarding => self.x11_forwarding = false,
            BareOption::X11Forwarding => self.x11_forwarding = true,
            BareOption::NoTouchRequired => self.no_touch_required = true,
            BareOption::VerifyRequired => self.verify_required = true,
            BareOption::Restrict => {
                self.agent_forwarding = false;
                self.port_forwarding = false;
                self.pty = false;
                self.user_rc = false;
                self.x11_forwarding = false;
            }
        }
    }

    /// True if the key may act as `candidate`: exact membership in
    /// `principals`, or any principal at all when the list is empty.
    pub fn matches_principal(&self, candidate: &str) -> bool {
        self.principals.is_empty() || self.principals.iter().any(|p| p == candidate)
    }

    /// True if a connection from `source` is permitted by the `from=`
    /// patterns. An absent restriction permits every source.
    pub fn matches_source(&self, source: &str) -> bool {
        self.from.is_empty() || self.from.evaluate(source)
    }

    /// True if the key has not expired at `now`. `expiry-time` is an
    /// exclusive upper bound.
    pub fn valid_at(&self, now: DateTime<Utc>) -> bool {
        TimeWindow {
            valid_after: None,
            valid_before: self.expiry_time,
        }
        .contains(now)
    }
}

/// One line of an authorized-keys buffer: `<keytype> <key> [comment]`.
///
/// In this grammar the option field is not carried on the line; the
/// caller supplies option tokens to [`AuthorizedKey::build`] separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedKeyEntry {
    pub key: PublicKey,
    pub comment: String,
}

/// Parse an authorized-keys buffer leniently: blank and `#` lines are
/// skipped, well-formed lines become entries, malformed lines are
/// collected with their 1-based line numbers.
pub fn parse_authorized_keys(input: &str) -> ParseReport<AuthorizedKeyEntry> {
    let mut report = ParseReport::default();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_entry(line) {
            Ok(entry) => report.records.push(entry),
            Err(error) => {
                let err = LineError {
                    line: idx + 1,
                    error,
                };
                warn!(%err, "skipping malformed authorized_keys line");
                report.errors.push(err);
            }
        }
    }
    debug!(
        records = report.records.len(),
        errors = report.errors.len(),
        "parsed authorized_keys buffer"
    );
    report
}

fn parse_entry(line: &str) -> Result<AuthorizedKeyEntry> {
    let (keytype, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::MalformedLine(line.to_string()))?;
    let rest = rest.trim_start();
    let (material, comment) = match rest.split_once(char::is_whitespace) {
        Some((material, comment)) => (material, comment.trim_start()),
        None => (rest, ""),
    };
    Ok(AuthorizedKeyEntry {
        key: PublicKey::parse(keytype, material)?,
        comment: comment.to_string(),
    })
}
