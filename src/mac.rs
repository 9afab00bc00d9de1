//! Envelope MAC.
//!
//! tag = HMAC-SHA256(salt || key || iv, ciphertext)
//!
//! The MAC key is plain concatenation, not a KDF. It is kept for token
//! compatibility; changing it needs a version field in the envelope.

use hmac::Mac;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::kdf::{keyed_hmac, DEFAULT_SALT};

pub const MAC_BYTES: usize = 32;

pub type Tag = [u8; MAC_BYTES];

#[derive(Clone)]
pub struct MacAuthenticator {
    salt: Vec<u8>,
}

impl Default for MacAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_SALT)
    }
}

impl MacAuthenticator {
    pub fn new(salt: impl AsRef<[u8]>) -> Self {
        Self {
            salt: salt.as_ref().to_vec(),
        }
    }

    pub fn tag(&self, ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Tag {
        let mut material = Zeroizing::new(Vec::with_capacity(self.salt.len() + key.len() + iv.len()));
        material.extend_from_slice(&self.salt);
        material.extend_from_slice(key);
        material.extend_from_slice(iv);

        let mut mac = keyed_hmac(&material);
        mac.update(ciphertext);

        let mut out = [0u8; MAC_BYTES];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    /// Constant-time check of `candidate` against the recomputed tag.
    pub fn verify(&self, ciphertext: &[u8], key: &[u8], iv: &[u8], candidate: &[u8]) -> bool {
        let expected = self.tag(ciphertext, key, iv);
        // ct_eq on slices of unequal length is false without inspecting content
        expected[..].ct_eq(candidate).into()
    }
}
