//! Tokenizer for comma-separated option fields.
//!
//! Option fields look like `restrict,command="echo ,hi",no-pty`: commas
//! separate tokens, except commas inside a double-quoted value. A `\"`
//! sequence inside quotes is an escaped quote and does not terminate the
//! quoted span. Tokens come out raw: a `key=value` token may still
//! carry its surrounding quotes, which the option interpreters strip
//! with [`unquote`].

use crate::error::{Error, Result};

/// Split one option field into raw option tokens.
///
/// Fails with [`Error::MalformedOption`] on an unterminated quote.
pub fn split_options(field: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in field.chars() {
        if in_quotes {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c == '"' {
            current.push(c);
            in_quotes = true;
        } else if c == ',' {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if in_quotes {
        return Err(Error::MalformedOption(field.to_string()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Strip one pair of surrounding double quotes, if present on both ends.
pub fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
