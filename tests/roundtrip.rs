use guard_envelope::{
    supported, CipherError, CipherSpec, DecryptionError, Guard, GuardConfig, GuardError, KeyError,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

fn setup(cipher: &str) -> Guard {
    let mut guard = Guard::new(cipher);
    guard.set_key("correct horse battery staple").unwrap();
    guard
}

#[test]
fn roundtrip_basic() {
    let guard = setup("AES-256-CBC");
    let token = guard.encrypt_string("hello world").unwrap();
    assert_eq!(guard.decrypt_string(&token).unwrap(), "hello world");
}

#[test]
fn roundtrip_every_supported_cipher() {
    for name in supported() {
        let guard = setup(name);
        let token = guard.encrypt(b"hello post-cbc world").unwrap();
        assert_eq!(guard.decrypt(&token).unwrap(), b"hello post-cbc world", "{name}");
    }
}

#[test]
fn roundtrip_empty_plaintext() {
    let guard = setup("AES-128-CBC");
    let token = guard.encrypt(b"").unwrap();
    assert_eq!(guard.decrypt(&token).unwrap(), b"");
}

#[test]
fn roundtrip_large_plaintext() {
    let guard = setup("CAST5-CBC");
    let plaintext = vec![0xABu8; 65536];
    let token = guard.encrypt(&plaintext).unwrap();
    assert_eq!(guard.decrypt(&token).unwrap(), plaintext);
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    tags: Vec<String>,
    age: Option<u8>,
}

#[test]
fn roundtrip_structured_value() {
    let guard = setup("BF-CBC");
    let profile = Profile {
        name: "ada".into(),
        tags: vec!["admin".into(), "ops".into()],
        age: None,
    };
    let token = guard.encrypt_value(&profile).unwrap();
    let back: Profile = guard.decrypt_value(&token).unwrap();
    assert_eq!(back, profile);
}

#[test]
fn iv_is_fresh_per_call() {
    let guard = setup("AES-256-CBC");
    let a = guard.encrypt(b"same data").unwrap();
    let b = guard.encrypt(b"same data").unwrap();
    assert_ne!(a, b);

    let ea = guard_envelope::wire::parse(a.as_str()).unwrap();
    let eb = guard_envelope::wire::parse(b.as_str()).unwrap();
    assert_ne!(ea.iv, eb.iv);
    assert_ne!(ea.ciphertext, eb.ciphertext);
    assert_ne!(ea.mac, eb.mac);
}

#[test]
fn wrong_key_fails() {
    let guard = setup("AES-256-CBC");
    let mut other = Guard::new("AES-256-CBC");
    other.set_key("Tr0ub4dor&3").unwrap();

    let token = guard.encrypt(b"data").unwrap();
    assert_eq!(
        other.decrypt(&token),
        Err(GuardError::Decryption(DecryptionError::MacMismatch))
    );
}

#[test]
fn different_salt_fails() {
    let guard = setup("AES-256-CBC");
    let cfg = GuardConfig {
        salt: "another installation".into(),
        ..GuardConfig::default()
    };
    let mut other = Guard::from_config(&cfg);
    other.set_key("correct horse battery staple").unwrap();

    let token = guard.encrypt(b"data").unwrap();
    assert_eq!(
        other.decrypt(&token),
        Err(GuardError::Decryption(DecryptionError::MacMismatch))
    );
}

#[test]
fn token_for_other_block_size_is_malformed() {
    let aes = setup("AES-256-CBC");
    let bf = setup("BF-CBC");
    let token = aes.encrypt(b"data").unwrap();
    assert_eq!(
        bf.decrypt(&token).unwrap_err().decryption_reason(),
        Some(DecryptionError::MalformedEnvelope)
    );
}

#[test]
fn no_key_set() {
    let guard = Guard::new("AES-256-CBC");
    assert_eq!(guard.encrypt(b"data"), Err(GuardError::Key(KeyError::NotSet)));
    assert_eq!(guard.decrypt("anything"), Err(GuardError::Key(KeyError::NotSet)));
    assert_eq!(guard.encrypt_value(&1u8), Err(GuardError::Key(KeyError::NotSet)));
}

#[test]
fn unsupported_cipher_always_fails() {
    let guard = setup("AES-256-GCM");
    let valid = setup("AES-256-CBC").encrypt(b"data").unwrap();
    let expected = GuardError::Cipher(CipherError::Unsupported("AES-256-GCM".into()));

    assert_eq!(guard.encrypt(b"data").unwrap_err(), expected);
    assert_eq!(guard.encrypt_string("data").unwrap_err(), expected);
    assert_eq!(guard.decrypt(&valid).unwrap_err(), expected);
    assert_eq!(guard.decrypt_string(&valid).unwrap_err(), expected);
    assert_eq!(guard.spec(), None);
}

#[test]
fn cipher_set_matches_spec_enum() {
    let names: Vec<&str> = CipherSpec::ALL.iter().map(|s| s.name()).collect();
    assert_eq!(names, supported());
    assert_eq!(
        names,
        ["AES-128-CBC", "AES-192-CBC", "AES-256-CBC", "BF-CBC", "CAST5-CBC"]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_roundtrip(
        cipher_idx in 0usize..5,
        passphrase in proptest::collection::vec(any::<u8>(), 1..64),
        data in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut guard = Guard::new(CipherSpec::ALL[cipher_idx].name());
        guard.set_key(&passphrase).unwrap();
        let token = guard.encrypt(&data).unwrap();
        prop_assert_eq!(guard.decrypt(&token).unwrap(), data);
    }

    #[test]
    fn prop_value_roundtrip(value in any::<(i64, String, Vec<bool>)>()) {
        let guard = setup("AES-192-CBC");
        let token = guard.encrypt_value(&value).unwrap();
        let back: (i64, String, Vec<bool>) = guard.decrypt_value(&token).unwrap();
        prop_assert_eq!(back, value);
    }
}
