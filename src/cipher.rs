//! Supported cipher suites and the block-cipher capability.
//!
//! Every suite is a 64- or 128-bit block cipher in CBC mode with PKCS#7
//! padding. IV and key lengths come from the primitive types themselves.

use core::fmt;
use core::str::FromStr;

use aes::{Aes128, Aes192, Aes256};
use blowfish::Blowfish;
use cast5::Cast5;
use cbc::cipher::{
    block_padding::Pkcs7, BlockCipher, BlockDecryptMut, BlockEncryptMut, IvSizeUser, KeyInit,
    KeyIvInit, KeySizeUser,
};

use crate::error::{CipherError, PrimitiveError};

/// Blowfish accepts 4..=56 byte keys; OpenSSL's `BF-CBC` defaults to 16.
const BLOWFISH_KEY_BYTES: usize = 16;

// ---------------------------------------------------------------------------
// Cipher suites
// ---------------------------------------------------------------------------

/// A named algorithm + mode with a fixed IV length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherSpec {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    BfCbc,
    Cast5Cbc,
}

impl CipherSpec {
    /// The fixed supported set, in canonical order.
    pub const ALL: [CipherSpec; 5] = [
        CipherSpec::Aes128Cbc,
        CipherSpec::Aes192Cbc,
        CipherSpec::Aes256Cbc,
        CipherSpec::BfCbc,
        CipherSpec::Cast5Cbc,
    ];

    /// Canonical (upper-case) name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Aes128Cbc => "AES-128-CBC",
            Self::Aes192Cbc => "AES-192-CBC",
            Self::Aes256Cbc => "AES-256-CBC",
            Self::BfCbc => "BF-CBC",
            Self::Cast5Cbc => "CAST5-CBC",
        }
    }

    /// Required IV length in bytes (one cipher block).
    pub fn iv_len(self) -> usize {
        match self {
            Self::Aes128Cbc => cbc::Encryptor::<Aes128>::iv_size(),
            Self::Aes192Cbc => cbc::Encryptor::<Aes192>::iv_size(),
            Self::Aes256Cbc => cbc::Encryptor::<Aes256>::iv_size(),
            Self::BfCbc => cbc::Encryptor::<Blowfish>::iv_size(),
            Self::Cast5Cbc => cbc::Encryptor::<Cast5>::iv_size(),
        }
    }

    /// Key length in bytes handed to the primitive.
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => Aes128::key_size(),
            Self::Aes192Cbc => Aes192::key_size(),
            Self::Aes256Cbc => Aes256::key_size(),
            Self::BfCbc => BLOWFISH_KEY_BYTES,
            Self::Cast5Cbc => Cast5::key_size(),
        }
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSpec {
    type Err = CipherError;

    /// Case-insensitive lookup in the supported set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|spec| spec.name() == upper)
            .ok_or(CipherError::Unsupported(upper))
    }
}

/// Names of every supported cipher.
pub fn supported() -> [&'static str; 5] {
    CipherSpec::ALL.map(CipherSpec::name)
}

// ---------------------------------------------------------------------------
// Primitive capability
// ---------------------------------------------------------------------------

/// Raw block-cipher capability. Implementations must not authenticate;
/// the envelope does that.
pub trait CipherPrimitive: Send + Sync {
    fn encrypt(
        &self,
        spec: CipherSpec,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError>;

    fn decrypt(
        &self,
        spec: CipherSpec,
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError>;
}

/// RustCrypto CBC + PKCS#7 implementation of [`CipherPrimitive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CbcPrimitive;

impl CipherPrimitive for CbcPrimitive {
    fn encrypt(
        &self,
        spec: CipherSpec,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        match spec {
            CipherSpec::Aes128Cbc => cbc_encrypt::<Aes128>(key, iv, plaintext),
            CipherSpec::Aes192Cbc => cbc_encrypt::<Aes192>(key, iv, plaintext),
            CipherSpec::Aes256Cbc => cbc_encrypt::<Aes256>(key, iv, plaintext),
            CipherSpec::BfCbc => cbc_encrypt::<Blowfish>(key, iv, plaintext),
            CipherSpec::Cast5Cbc => cbc_encrypt::<Cast5>(key, iv, plaintext),
        }
    }

    fn decrypt(
        &self,
        spec: CipherSpec,
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        match spec {
            CipherSpec::Aes128Cbc => cbc_decrypt::<Aes128>(key, iv, ciphertext),
            CipherSpec::Aes192Cbc => cbc_decrypt::<Aes192>(key, iv, ciphertext),
            CipherSpec::Aes256Cbc => cbc_decrypt::<Aes256>(key, iv, ciphertext),
            CipherSpec::BfCbc => cbc_decrypt::<Blowfish>(key, iv, ciphertext),
            CipherSpec::Cast5Cbc => cbc_decrypt::<Cast5>(key, iv, ciphertext),
        }
    }
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, PrimitiveError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| PrimitiveError)?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, PrimitiveError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| PrimitiveError)?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| PrimitiveError)
}
