//! Token wire format (v1)
//!
//! Format:
//!   token = base64( JSON{ "iv": base64(iv), "cipher": base64(ciphertext), "mac": hex(mac) } )
//!
//! Standard base64 alphabet with padding at both layers. The JSON object has
//! exactly these three string fields; anything else is a malformed envelope.
//! Structure is validated here, before the MAC or the cipher ever run.

use core::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::cipher::CipherSpec;
use crate::error::{DecryptionError, EncryptionError};
use crate::mac::{Tag, MAC_BYTES};

/// Hex-encoded MAC length
pub const MAC_HEX_CHARS: usize = MAC_BYTES * 2;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Package {
    iv: String,
    cipher: String,
    mac: String,
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Transport-safe encoding of an [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Parsed view of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub mac: Tag,
}

impl Envelope {
    pub fn encode(&self) -> Result<Token, EncryptionError> {
        encode(&self.iv, &self.ciphertext, &self.mac)
    }
}

pub fn encode(iv: &[u8], ciphertext: &[u8], mac: &[u8]) -> Result<Token, EncryptionError> {
    if mac.len() != MAC_BYTES {
        return Err(EncryptionError::Encoding);
    }

    let package = Package {
        iv: STANDARD.encode(iv),
        cipher: STANDARD.encode(ciphertext),
        mac: hex::encode(mac),
    };
    let json = serde_json::to_string(&package).map_err(|_| EncryptionError::Encoding)?;

    Ok(Token(STANDARD.encode(json)))
}

/// Structural parse without the IV length check (no cipher context needed).
pub fn parse(token: &str) -> Result<Envelope, DecryptionError> {
    let json = STANDARD
        .decode(token)
        .map_err(|_| DecryptionError::MalformedEnvelope)?;
    let package: Package =
        serde_json::from_slice(&json).map_err(|_| DecryptionError::MalformedEnvelope)?;

    let iv = STANDARD
        .decode(&package.iv)
        .map_err(|_| DecryptionError::MalformedEnvelope)?;
    let ciphertext = STANDARD
        .decode(&package.cipher)
        .map_err(|_| DecryptionError::MalformedEnvelope)?;

    // Only the lowercase form `encode` emits; hex decoding alone is case-blind.
    if package.mac.len() != MAC_HEX_CHARS
        || !package
            .mac
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return Err(DecryptionError::MalformedEnvelope);
    }
    let mut mac = [0u8; MAC_BYTES];
    hex::decode_to_slice(&package.mac, &mut mac).map_err(|_| DecryptionError::MalformedEnvelope)?;

    Ok(Envelope {
        iv,
        ciphertext,
        mac,
    })
}

/// Full structural validation against the active cipher.
pub fn decode(token: &str, spec: CipherSpec) -> Result<Envelope, DecryptionError> {
    let envelope = parse(token)?;
    if envelope.iv.len() != spec.iv_len() {
        return Err(DecryptionError::MalformedEnvelope);
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn encode_decode_roundtrip() {
        let iv = [7u8; 16];
        let token = encode(&iv, b"opaque", &[9u8; MAC_BYTES]).unwrap();
        let env = decode(token.as_str(), CipherSpec::Aes256Cbc).unwrap();
        assert_eq!(env.iv, iv);
        assert_eq!(env.ciphertext, b"opaque");
        assert_eq!(env.mac, [9u8; MAC_BYTES]);
        assert_eq!(env.encode().unwrap(), token);
    }

    #[test]
    fn json_layout() {
        let token = encode(&[0u8; 8], b"\x01\x02", &[0xAB; MAC_BYTES]).unwrap();
        let json = String::from_utf8(STANDARD.decode(token.as_str()).unwrap()).unwrap();
        let expected = format!(
            r#"{{"iv":"AAAAAAAAAAA=","cipher":"AQI=","mac":"{}"}}"#,
            "ab".repeat(MAC_BYTES)
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn rejects_wrong_mac_length_on_encode() {
        assert_eq!(encode(b"iv", b"ct", b"short"), Err(EncryptionError::Encoding));
    }

    #[test]
    fn rejects_non_base64_token() {
        assert_eq!(parse("not base64!"), Err(DecryptionError::MalformedEnvelope));
        assert_eq!(parse(""), Err(DecryptionError::MalformedEnvelope));
    }

    #[test]
    fn rejects_non_object() {
        for json in ["[]", "null", "\"iv\"", "42", "{"] {
            assert_eq!(parse(&wrap(json)), Err(DecryptionError::MalformedEnvelope));
        }
    }

    #[test]
    fn rejects_missing_and_extra_fields() {
        let mac = "00".repeat(MAC_BYTES);
        let missing = format!(r#"{{"iv":"AAAAAAAAAAA=","mac":"{mac}"}}"#);
        let extra = format!(r#"{{"iv":"AAAAAAAAAAA=","cipher":"AQI=","mac":"{mac}","v":2}}"#);
        let null = format!(r#"{{"iv":null,"cipher":"AQI=","mac":"{mac}"}}"#);
        for json in [missing, extra, null] {
            assert_eq!(parse(&wrap(&json)), Err(DecryptionError::MalformedEnvelope));
        }
    }

    #[test]
    fn rejects_bad_mac_encoding() {
        let short = r#"{"iv":"AAAAAAAAAAA=","cipher":"AQI=","mac":"abcd"}"#;
        let not_hex = format!(r#"{{"iv":"AAAAAAAAAAA=","cipher":"AQI=","mac":"{}"}}"#, "zz".repeat(MAC_BYTES));
        assert_eq!(parse(&wrap(short)), Err(DecryptionError::MalformedEnvelope));
        assert_eq!(parse(&wrap(&not_hex)), Err(DecryptionError::MalformedEnvelope));
    }

    #[test]
    fn rejects_uppercase_mac_hex() {
        let token = encode(&[0u8; 8], b"ct", &[0xAB; MAC_BYTES]).unwrap();
        assert!(parse(token.as_str()).is_ok());

        let upper = format!(
            r#"{{"iv":"AAAAAAAAAAA=","cipher":"Y3Q=","mac":"{}"}}"#,
            "AB".repeat(MAC_BYTES)
        );
        let mixed = format!(
            r#"{{"iv":"AAAAAAAAAAA=","cipher":"Y3Q=","mac":"A{}"}}"#,
            &"ab".repeat(MAC_BYTES)[1..]
        );
        assert_eq!(parse(&wrap(&upper)), Err(DecryptionError::MalformedEnvelope));
        assert_eq!(parse(&wrap(&mixed)), Err(DecryptionError::MalformedEnvelope));
    }

    #[test]
    fn iv_length_checked_against_cipher() {
        let token = encode(&[0u8; 8], b"ct", &[0u8; MAC_BYTES]).unwrap();
        assert!(decode(token.as_str(), CipherSpec::BfCbc).is_ok());
        assert_eq!(
            decode(token.as_str(), CipherSpec::Aes128Cbc),
            Err(DecryptionError::MalformedEnvelope)
        );
    }
}
