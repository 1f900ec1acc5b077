//! Opaque SSH public-key material.
//!
//! The engine never interprets keys cryptographically; verification
//! belongs to the SSH layer that already authenticated the peer. What
//! it does check is the encoding: the key-material token must be valid
//! base64, and the wire blob inside must open with a length-prefixed
//! algorithm string equal to the declared key type. That is enough to
//! reject truncated lines, swapped fields, and type/blob mismatches at
//! load time instead of at authorization time.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Validated-but-opaque public key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    algorithm: String,
    blob: Vec<u8>,
}

impl PublicKey {
    /// Validate the base64 `material` against the declared `keytype`
    /// (e.g. `ssh-ed25519`).
    pub fn parse(keytype: &str, material: &str) -> Result<Self> {
        let blob = BASE64
            .decode(material)
            .map_err(|_| Error::InvalidKeyEncoding(format!("bad base64 for {keytype} key")))?;
        let embedded = wire_string(&blob).ok_or_else(|| {
            Error::InvalidKeyEncoding(format!("truncated wire blob for {keytype} key"))
        })?;
        if embedded != keytype.as_bytes() {
            return Err(Error::InvalidKeyEncoding(format!(
                "declared key type {keytype} does not match blob"
            )));
        }
        Ok(Self {
            algorithm: keytype.to_string(),
            blob,
        })
    }

    /// The algorithm name, as declared and as embedded in the blob.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The raw wire blob.
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm, BASE64.encode(&self.blob))
    }
}

/// Read the leading length-prefixed string of an SSH wire blob.
fn wire_string(blob: &[u8]) -> Option<&[u8]> {
    let len = u32::from_be_bytes(blob.get(..4)?.try_into().ok()?) as usize;
    blob.get(4..4usize.checked_add(len)?)
}
