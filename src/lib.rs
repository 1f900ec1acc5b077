//! # sshdata-auth
//!
//! Credential authorization engine for SSH-gated per-user data
//! services. The crate parses two OpenSSH-compatible credential
//! grammars into immutable records and evaluates those records against
//! runtime authorization requests: does public key K, acting as
//! principal P, in namespace N, at time T, satisfy the recorded
//! constraints?
//!
//! ## Key concepts
//!
//! - **AuthorizedKey**: one line of an authorized_keys-style file, key
//!   material plus the per-key option grammar (`restrict`, `no-pty`,
//!   `principal=`, `from=`, `expiry-time=`, ...), folded left to right
//!   so later options override earlier ones.
//! - **AllowedSigner**: one allowed_signers-style directive: principal
//!   and namespace patterns, a certificate-authority flag, and a
//!   validity window.
//! - **Pattern / PatternList**: OpenSSH glob matching (`*`, `?`,
//!   leading `!` negation) with last-match-wins list precedence.
//!
//! Parsing happens once, at load or reload; evaluation is pure and
//! lock-free, so a loaded record set can serve concurrent queries as
//! long as reloads swap in a fresh set instead of mutating in place.
//! Parse failures never yield partial records, and the lenient file
//! parsers report per-line errors so callers can deny on ambiguity.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use sshdata_auth::parse_allowed_signers;
//!
//! let report = parse_allowed_signers(
//!     "*@example.com,!root@example.com namespaces=\"git,ci-*\" ssh-ed25519 \
//!      AAAAC3NzaC1lZDI1NTE5AAAAIDgxTRA1n6W+w6JFAZZVPrNQU4XRSKjHO32h8OE2OynD",
//! );
//! assert!(report.is_clean());
//!
//! let signer = &report.records[0];
//! assert!(signer.matches_principal("alice@example.com"));
//! assert!(!signer.matches_principal("root@example.com"));
//! assert!(signer.matches_namespace("ci-deploy"));
//! assert!(signer.valid_at(Utc::now()));
//! ```

pub mod allowed_signer;
pub mod authorized_key;
pub mod error;
pub mod keys;
pub mod options;
pub mod pattern;
pub mod timespec;

pub use allowed_signer::{parse_allowed_signers, AllowedSigner};
pub use authorized_key::{parse_authorized_keys, AuthorizedKey, AuthorizedKeyEntry};
pub use error::{Error, LineError, ParseReport, Result};
pub use keys::PublicKey;
pub use options::{split_options, unquote};
pub use pattern::{Pattern, PatternList};
pub use timespec::{parse_timespec, TimeWindow};
