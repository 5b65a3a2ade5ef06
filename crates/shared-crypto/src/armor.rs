//! # Armored Text Blocks
//!
//! Keys and sealed messages travel through study configuration as text:
//!
//! ```text
//! -----BEGIN STUDY PUBLIC KEY BLOCK-----
//! Name: Lab A
//!
//! 02a1b2...
//! -----END STUDY PUBLIC KEY BLOCK-----
//! ```
//!
//! Headers are optional `Key: value` lines; the body is hex, wrapped at 64
//! columns.

use crate::CryptoError;

const LINE_WIDTH: usize = 64;

/// Block type carried by an armored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorKind {
    PublicKey,
    PrivateKey,
    Message,
}

impl ArmorKind {
    pub fn label(self) -> &'static str {
        match self {
            ArmorKind::PublicKey => "STUDY PUBLIC KEY BLOCK",
            ArmorKind::PrivateKey => "STUDY PRIVATE KEY BLOCK",
            ArmorKind::Message => "STUDY MESSAGE",
        }
    }

    /// Opening marker line.
    pub fn begin_marker(self) -> String {
        format!("-----BEGIN {}-----", self.label())
    }

    fn end_marker(self) -> String {
        format!("-----END {}-----", self.label())
    }
}

/// Decoded armored block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Armored {
    pub kind: ArmorKind,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Render `body` as an armored block of type `kind`.
pub fn encode(kind: ArmorKind, headers: &[(String, String)], body: &[u8]) -> String {
    let mut out = kind.begin_marker();
    out.push('\n');
    for (key, value) in headers {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out.push('\n');

    let hex_body = hex::encode(body);
    for chunk in hex_body.as_bytes().chunks(LINE_WIDTH) {
        // hex output is ASCII
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out.push_str(&kind.end_marker());
    out.push('\n');
    out
}

/// Parse an armored block, requiring it to be of type `kind`.
pub fn decode(kind: ArmorKind, text: &str) -> Result<Armored, CryptoError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let first = lines
        .next()
        .ok_or_else(|| CryptoError::InvalidArmor("empty input".into()))?;
    if first != kind.begin_marker() {
        return Err(CryptoError::UnexpectedArmor {
            expected: kind.label(),
            found: first.to_string(),
        });
    }

    let end = kind.end_marker();
    let mut headers = Vec::new();
    let mut hex_body = String::new();
    let mut closed = false;

    for line in lines {
        if line == end {
            closed = true;
            break;
        }
        match line.split_once(": ") {
            Some((key, value)) if hex_body.is_empty() => {
                headers.push((key.to_string(), value.to_string()));
            }
            _ => hex_body.push_str(line),
        }
    }

    if !closed {
        return Err(CryptoError::InvalidArmor(format!("missing {end}")));
    }

    let body = hex::decode(&hex_body).map_err(|e| CryptoError::InvalidArmor(e.to_string()))?;
    Ok(Armored {
        kind,
        headers,
        body,
    })
}
