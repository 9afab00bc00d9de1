//! Installation configuration.
//!
//! Values come from a JSON document or from environment variables; every
//! field has a default so an empty environment yields a working config.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::kdf::DEFAULT_SALT;

pub const ENV_CIPHER: &str = "GUARD_CIPHER";
pub const ENV_SALT: &str = "GUARD_SALT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuardConfig {
    /// Cipher name, matched case-insensitively against the supported set.
    #[serde(default = "default_cipher")]
    pub cipher: String,

    /// Installation-wide salt for key derivation and the MAC key.
    #[serde(default = "default_salt")]
    pub salt: String,
}

fn default_cipher() -> String {
    "AES-256-CBC".into()
}

fn default_salt() -> String {
    DEFAULT_SALT.into()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            cipher: default_cipher(),
            salt: default_salt(),
        }
    }
}

impl GuardConfig {
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(doc).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cfg = Self {
            cipher: lookup(ENV_CIPHER).unwrap_or_else(default_cipher),
            salt: lookup(ENV_SALT).unwrap_or_else(default_salt),
        };
        cfg.validate()
    }

    /// The cipher is not checked here: an unsupported one is reported by
    /// every encrypt/decrypt call instead.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.salt.is_empty() {
            return Err(ConfigError::EmptySalt);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults() {
        let cfg = GuardConfig::from_json("{}").unwrap();
        assert_eq!(cfg, GuardConfig::default());
        assert_eq!(cfg.cipher, "AES-256-CBC");
    }

    #[test]
    fn json_overrides() {
        let cfg = GuardConfig::from_json(r#"{"cipher":"bf-cbc","salt":"site-7"}"#).unwrap();
        assert_eq!(cfg.cipher, "bf-cbc");
        assert_eq!(cfg.salt, "site-7");
    }

    #[test]
    fn json_rejects_garbage_and_empty_salt() {
        assert!(matches!(GuardConfig::from_json("nope"), Err(ConfigError::Parse(_))));
        assert_eq!(
            GuardConfig::from_json(r#"{"salt":""}"#),
            Err(ConfigError::EmptySalt)
        );
    }

    #[test]
    fn lookup_uses_defaults_when_unset() {
        let cfg = GuardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, GuardConfig::default());

        let cfg = GuardConfig::from_lookup(|k| (k == ENV_CIPHER).then(|| "CAST5-CBC".to_string())).unwrap();
        assert_eq!(cfg.cipher, "CAST5-CBC");
        assert_eq!(cfg.salt, DEFAULT_SALT);
    }
}
