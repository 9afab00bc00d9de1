//! Encryption facade.
//!
//! Seal:  random iv → cipher(key, iv, plaintext) → tag(ciphertext, key, iv) → token
//! Open:  token → structural decode → constant-time MAC verify → cipher decrypt
//!
//! Each stage fails closed with its own error; ciphertext is never decrypted
//! before its MAC verifies.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cipher::{CbcPrimitive, CipherPrimitive, CipherSpec};
use crate::config::GuardConfig;
use crate::error::{CipherError, DecryptionError, EncryptionError, GuardError, KeyError, RandomError};
use crate::kdf::{Key, KeyDeriver, DEFAULT_SALT};
use crate::mac::MacAuthenticator;
use crate::master::MasterKey;
use crate::random::{OsRandom, RandomSource, DEFAULT_GENERATED_KEY_BYTES};
use crate::wire::{self, Token};

/// Cipher used by [`Guard::default`].
pub const DEFAULT_CIPHER: &str = "AES-256-CBC";

/// One key, one cipher. Cheap to construct; hold one per session.
pub struct Guard<P = CbcPrimitive, R = OsRandom> {
    cipher_name: String,
    spec: Option<CipherSpec>,
    key: Option<Key>,
    salt: Vec<u8>,
    deriver: KeyDeriver,
    mac: MacAuthenticator,
    primitive: P,
    random: R,
}

impl Default for Guard {
    fn default() -> Self {
        Self::new(DEFAULT_CIPHER)
    }
}

impl Guard {
    /// Unknown cipher names are accepted here and rejected by every
    /// encrypt/decrypt call with [`CipherError`].
    pub fn new(cipher: &str) -> Self {
        Self::with_parts(cipher, DEFAULT_SALT, CbcPrimitive, OsRandom)
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::with_parts(&config.cipher, &config.salt, CbcPrimitive, OsRandom)
    }
}

impl<P: CipherPrimitive, R: RandomSource> Guard<P, R> {
    pub fn with_parts(cipher: &str, salt: impl AsRef<[u8]>, primitive: P, random: R) -> Self {
        let cipher_name = cipher.to_ascii_uppercase();
        let spec = cipher_name.parse::<CipherSpec>().ok();
        let salt = salt.as_ref().to_vec();
        Self {
            cipher_name,
            spec,
            key: None,
            deriver: KeyDeriver::new(&salt),
            mac: MacAuthenticator::new(&salt),
            salt,
            primitive,
            random,
        }
    }

    /// A fresh instance for `cipher`, same salt and capabilities, no key.
    pub fn with_cipher(&self, cipher: &str) -> Self
    where
        P: Clone,
        R: Clone,
    {
        Self::with_parts(cipher, &self.salt, self.primitive.clone(), self.random.clone())
    }

    // -----------------------------------------------------------------------
    // Key + cipher state
    // -----------------------------------------------------------------------

    pub fn cipher(&self) -> &str {
        &self.cipher_name
    }

    pub fn spec(&self) -> Option<CipherSpec> {
        self.spec
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn is_key_set(&self) -> bool {
        self.key.is_some()
    }

    /// Derive and hold the key for `passphrase`. Recommended input is the
    /// user's password.
    pub fn set_key(&mut self, passphrase: impl AsRef<[u8]>) -> Result<(), KeyError> {
        let passphrase = passphrase.as_ref();
        if passphrase.is_empty() {
            return Err(KeyError::Empty);
        }
        self.key = Some(self.deriver.derive(passphrase));
        Ok(())
    }

    pub fn set_master_key(&mut self, master: &MasterKey) -> Result<(), KeyError> {
        self.set_key(master.as_bytes())
    }

    fn ready(&self) -> Result<(CipherSpec, &Key), GuardError> {
        let spec = self
            .spec
            .ok_or_else(|| CipherError::Unsupported(self.cipher_name.clone()))?;
        let key = self.key.as_ref().ok_or(KeyError::NotSet)?;
        Ok((spec, key))
    }

    // -----------------------------------------------------------------------
    // Encrypt
    // -----------------------------------------------------------------------

    /// Encrypt raw bytes.
    pub fn encrypt(&self, data: &[u8]) -> Result<Token, GuardError> {
        self.seal(data)
    }

    pub fn encrypt_string(&self, data: &str) -> Result<Token, GuardError> {
        self.seal(data.as_bytes())
    }

    /// Serialize `value` to JSON, then encrypt.
    pub fn encrypt_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Token, GuardError> {
        // Preconditions come before serialization so errors are reported in order.
        self.ready()?;
        let bytes = serde_json::to_vec(value).map_err(|_| EncryptionError::Serialize)?;
        self.seal(&bytes)
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Token, GuardError> {
        let (spec, key) = self.ready()?;

        let iv = self
            .random
            .random_bytes(spec.iv_len())
            .map_err(EncryptionError::from)?;
        let ciphertext = self
            .primitive
            .encrypt(spec, key.for_cipher(spec), &iv, plaintext)
            .map_err(|_| EncryptionError::Primitive)?;
        let mac = self.mac.tag(&ciphertext, key.as_bytes(), &iv);
        let token = wire::encode(&iv, &ciphertext, &mac)?;

        tracing::debug!(
            cipher = %spec,
            plaintext_len = plaintext.len(),
            token_len = token.as_str().len(),
            "sealed envelope"
        );
        Ok(token)
    }

    // -----------------------------------------------------------------------
    // Decrypt
    // -----------------------------------------------------------------------

    /// Decrypt to raw bytes.
    pub fn decrypt(&self, token: impl AsRef<str>) -> Result<Vec<u8>, GuardError> {
        self.open(token.as_ref())
    }

    pub fn decrypt_string(&self, token: impl AsRef<str>) -> Result<String, GuardError> {
        let bytes = self.open(token.as_ref())?;
        String::from_utf8(bytes).map_err(|_| DecryptionError::Unserialize.into())
    }

    /// Decrypt, then deserialize the JSON produced by [`Guard::encrypt_value`].
    pub fn decrypt_value<T: DeserializeOwned>(&self, token: impl AsRef<str>) -> Result<T, GuardError> {
        let bytes = self.open(token.as_ref())?;
        serde_json::from_slice(&bytes).map_err(|_| DecryptionError::Unserialize.into())
    }

    fn open(&self, token: &str) -> Result<Vec<u8>, GuardError> {
        let (spec, key) = self.ready()?;

        let envelope = wire::decode(token, spec).map_err(|e| {
            tracing::warn!(cipher = %spec, "rejected malformed envelope");
            e
        })?;

        if !self
            .mac
            .verify(&envelope.ciphertext, key.as_bytes(), &envelope.iv, &envelope.mac)
        {
            tracing::warn!(cipher = %spec, "rejected envelope with invalid MAC");
            return Err(DecryptionError::MacMismatch.into());
        }

        let plaintext = self
            .primitive
            .decrypt(spec, key.for_cipher(spec), &envelope.iv, &envelope.ciphertext)
            .map_err(|_| DecryptionError::CipherFailure)?;

        tracing::debug!(
            cipher = %spec,
            plaintext_len = plaintext.len(),
            "opened envelope"
        );
        Ok(plaintext)
    }

    // -----------------------------------------------------------------------
    // Random helpers
    // -----------------------------------------------------------------------

    pub fn generate_key(&self, length: usize) -> Result<Vec<u8>, RandomError> {
        self.random.random_bytes(length)
    }

    pub fn generate_default_key(&self) -> Result<Vec<u8>, RandomError> {
        self.generate_key(DEFAULT_GENERATED_KEY_BYTES)
    }

    pub fn random_bytes(&self, length: usize) -> Result<Vec<u8>, RandomError> {
        self.random.random_bytes(length)
    }

    pub fn random_string(&self, length: usize) -> Result<String, RandomError> {
        self.random.random_string(length)
    }
}

impl<P, R> fmt::Debug for Guard<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("cipher", &self.cipher_name)
            .field("supported", &self.spec.is_some())
            .field("key_set", &self.key.is_some())
            .finish()
    }
}
