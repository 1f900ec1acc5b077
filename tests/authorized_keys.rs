//! End-to-end coverage for the authorized-keys option grammar: from a
//! raw option field through tokenization, record building, and
//! evaluation.

use chrono::{TimeZone, Utc};
use sshdata_auth::{
    parse_authorized_keys, split_options, AuthorizedKey, Error, PublicKey,
};

const ED25519: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIDgxTRA1n6W+w6JFAZZVPrNQU4XRSKjHO32h8OE2OynD";
const ED25519_B: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIKit506PzifX9Sl76SONE0BUlhuC8k4ACo4J2BvcEn5H";

fn key() -> PublicKey {
    PublicKey::parse("ssh-ed25519", ED25519).unwrap()
}

fn from_field(field: &str) -> Result<AuthorizedKey, Error> {
    AuthorizedKey::build(key(), "test", &split_options(field)?)
}

// =============================================================================
// Grammar
// =============================================================================

#[test]
fn full_option_line_resolves_every_field() {
    let ak = from_field(concat!(
        "restrict,pty,cert-authority,principal=alice,principal=bob,",
        r#"command="psql -c \"select 1\"",environment="PATH=/bin",environment=LANG=C,"#,
        "expiry-time=20301231Z,from=*.corp.example,permit-listen=localhost:5432,",
        r#"permit-open="db:5432",tunnel=2,no-touch-required"#
    ))
    .unwrap();

    assert!(ak.pty); // re-enabled after restrict
    assert!(!ak.agent_forwarding);
    assert!(!ak.port_forwarding);
    assert!(!ak.user_rc);
    assert!(!ak.x11_forwarding);
    assert!(ak.is_ca);
    assert!(ak.no_touch_required);
    assert!(!ak.verify_required);
    assert_eq!(ak.principals, ["alice", "bob"]);
    assert_eq!(ak.command.as_deref(), Some(r#"psql -c \"select 1\""#));
    assert_eq!(ak.environment["PATH"], "/bin");
    assert_eq!(ak.environment["LANG"], "C");
    assert_eq!(
        ak.expiry_time,
        Some(Utc.with_ymd_and_hms(2030, 12, 31, 0, 0, 0).unwrap())
    );
    assert!(ak.matches_source("db.corp.example"));
    assert!(!ak.matches_source("db.other.example"));
    assert_eq!(ak.permit_listen.as_deref(), Some("localhost:5432"));
    assert_eq!(ak.permit_open.as_deref(), Some("db:5432"));
    assert_eq!(ak.tunnel.as_deref(), Some("2"));
}

#[test]
fn quoted_comma_survives_tokenization_into_the_record() {
    let ak = from_field(r#"command="echo ,hi",no-pty"#).unwrap();
    assert_eq!(ak.command.as_deref(), Some("echo ,hi"));
    assert!(!ak.pty);
}

#[test]
fn restrict_ordering_is_observable() {
    let restricted_then_pty = from_field("restrict,pty").unwrap();
    assert!(restricted_then_pty.pty);
    assert!(!restricted_then_pty.agent_forwarding);

    let pty_then_restricted = from_field("pty,restrict").unwrap();
    assert!(!pty_then_restricted.pty);
}

#[test]
fn grammar_failures_reject_the_whole_record() {
    assert!(matches!(
        from_field("environment=NOEQUALS"),
        Err(Error::MalformedOption(_))
    ));
    assert!(matches!(
        from_field(r#"command="dangling"#),
        Err(Error::MalformedOption(_))
    ));
    assert!(matches!(
        from_field("expiry-time=tomorrow"),
        Err(Error::InvalidTimespec(_))
    ));
    assert!(matches!(
        from_field("made-up-flag"),
        Err(Error::UnknownOption(_))
    ));
    assert!(matches!(
        from_field("from=!"),
        Err(Error::InvalidPattern(_))
    ));
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn principal_evaluation_is_exact_membership_or_open() {
    let scoped = from_field(r#"principal="deploy,backup""#).unwrap();
    assert!(scoped.matches_principal("deploy"));
    assert!(scoped.matches_principal("backup"));
    assert!(!scoped.matches_principal("deplo")); // no globbing here
    assert!(!scoped.matches_principal("deploy2"));

    // Unquoted, the comma splits at the field level and the orphaned
    // tail is rejected as an option.
    assert!(matches!(
        from_field("principal=deploy,backup"),
        Err(Error::UnknownOption(_))
    ));

    let open = from_field("no-pty").unwrap();
    assert!(open.matches_principal("anyone"));
}

#[test]
fn expiry_gates_validity_exclusively() {
    let ak = from_field("expiry-time=20250101Z").unwrap();
    let expiry = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    assert!(ak.valid_at(expiry - chrono::Duration::milliseconds(1)));
    assert!(!ak.valid_at(expiry));
    assert!(!ak.valid_at(expiry + chrono::Duration::days(1)));

    let no_expiry = from_field("").unwrap();
    assert!(no_expiry.valid_at(Utc::now()));
}

// =============================================================================
// File-level parsing
// =============================================================================

#[test]
fn buffer_parse_loads_good_lines_and_reports_bad_ones() {
    let input = format!(
        "# team keys\n\
         ssh-ed25519 {ED25519} alice@laptop\n\
         not-even-a-line\n\
         ssh-ed25519 {ED25519_B} bob@desktop with spaces in comment\n\
         ssh-ed25519 AAAA short-blob\n"
    );
    let report = parse_authorized_keys(&input);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].comment, "alice@laptop");
    assert_eq!(report.records[1].comment, "bob@desktop with spaces in comment");

    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].line, 3);
    assert_eq!(report.errors[1].line, 5);
    assert!(matches!(report.errors[1].error, Error::InvalidKeyEncoding(_)));

    // Fail-fast view rejects the whole buffer on the first bad line.
    assert_eq!(report.into_result().unwrap_err().line, 3);
}

#[test]
fn records_serialize_for_auditing() {
    let ak = from_field("restrict,principal=alice").unwrap();
    let json = serde_json::to_string(&ak).unwrap();
    let back: AuthorizedKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ak);
}
