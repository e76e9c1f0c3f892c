//! AES-256-GCM-SIV encryption and decryption of individual string fields.
//!
//! The engine only ever sees the [`Cipher`] trait; [`FieldCipher`] is the
//! implementation used unless a caller supplies its own.
//!
//! # Ciphertext format
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! # Key handling
//!
//! Callers hold the key as a string (typically hex or a passphrase from the
//! environment). The 256-bit AES key is derived from it with HMAC-SHA256 over
//! a fixed label, so any non-empty string is a usable key and the same string
//! always yields the same AES key.

use std::str::FromStr;

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Prefix that appears at the start of every encrypted field value.
pub const VERSION_PREFIX: &str = "v1";

/// Label mixed into the key derivation; bump alongside [`VERSION_PREFIX`].
const KEY_LABEL: &[u8] = b"fieldcloak/field-key/v1";

type HmacSha256 = Hmac<Sha256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key string is empty.
    #[error("encryption key must not be empty")]
    InvalidKey,

    /// AES-GCM-SIV encryption or decryption failed (wrong key or tampered data).
    #[error("aead operation failed")]
    Aead,

    /// The encrypted field string does not match the expected format.
    #[error("invalid encrypted field format")]
    InvalidFormat,

    /// Decryption succeeded but the plaintext is not UTF-8.
    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,
}

/// Leaf cipher consumed by the traversal engine.
///
/// Both directions take the caller's key string as-is.
#[cfg_attr(test, mockall::automock)]
pub trait Cipher: Send + Sync {
    /// Encrypt one field value.
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, CipherError>;

    /// Decrypt one field value previously produced by [`Cipher::encrypt`].
    fn decrypt(&self, ciphertext: &str, key: &str) -> Result<String, CipherError>;
}

/// AES-256-GCM-SIV field cipher with a fresh random nonce per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCipher;

impl Cipher for FieldCipher {
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, CipherError> {
        encrypt_field(plaintext.as_bytes(), key).map(|field| field.to_string())
    }

    fn decrypt(&self, ciphertext: &str, key: &str) -> Result<String, CipherError> {
        let field: EncryptedField = ciphertext.parse()?;
        let plaintext = decrypt_field(&field, key)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}

/// A parsed, encrypted field value.
///
/// The string representation is `v1.<base64url(nonce)>.<base64url(ciphertext+tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedField {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for EncryptedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }
}

impl FromStr for EncryptedField {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let (Some(VERSION_PREFIX), Some(nonce_b64), Some(ciphertext_b64)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CipherError::InvalidFormat);
        };

        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(nonce_b64)
            .map_err(|_| CipherError::InvalidFormat)?;
        let nonce: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| CipherError::InvalidFormat)?;

        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext_b64)
            .map_err(|_| CipherError::InvalidFormat)?;

        Ok(Self { nonce, ciphertext })
    }
}

/// Encrypt plaintext bytes under the key derived from `key`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKey`] if `key` is empty, or
/// [`CipherError::Aead`] on an internal AEAD error.
pub fn encrypt_field(plaintext: &[u8], key: &str) -> Result<EncryptedField, CipherError> {
    let cipher = build_cipher(key)?;

    use aes_gcm_siv::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CipherError::Aead)?;

    Ok(EncryptedField {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt an [`EncryptedField`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKey`] if `key` is empty, or
/// [`CipherError::Aead`] if authentication fails.
pub fn decrypt_field(field: &EncryptedField, key: &str) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let nonce = Nonce::from_slice(&field.nonce);
    cipher
        .decrypt(nonce, field.ciphertext.as_ref())
        .map_err(|_| CipherError::Aead)
}

fn build_cipher(key: &str) -> Result<Aes256GcmSiv, CipherError> {
    if key.is_empty() {
        return Err(CipherError::InvalidKey);
    }
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKey)?;
    mac.update(KEY_LABEL);
    let derived = mac.finalize().into_bytes();
    Aes256GcmSiv::new_from_slice(&derived).map_err(|_| CipherError::InvalidKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let encrypted = FieldCipher.encrypt("123-45-6789", "deadbeef").unwrap();
        assert!(encrypted.starts_with("v1."));
        assert_ne!(encrypted, "123-45-6789");
        let decrypted = FieldCipher.decrypt(&encrypted, "deadbeef").unwrap();
        assert_eq!(decrypted, "123-45-6789");
    }

    #[test]
    fn fresh_nonce_per_call() {
        let a = FieldCipher.encrypt("alice", "k").unwrap();
        let b = FieldCipher.encrypt("alice", "k").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let encrypted = FieldCipher.encrypt("secret", "key-one").unwrap();
        assert!(matches!(
            FieldCipher.decrypt(&encrypted, "key-two"),
            Err(CipherError::Aead)
        ));
    }

    #[test]
    fn empty_key_rejected() {
        assert!(matches!(
            FieldCipher.encrypt("x", ""),
            Err(CipherError::InvalidKey)
        ));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let encrypted = FieldCipher.encrypt("", "k").unwrap();
        assert_eq!(FieldCipher.decrypt(&encrypted, "k").unwrap(), "");
    }

    #[test]
    fn string_repr_round_trip() {
        let field = encrypt_field(b"hello", "k").unwrap();
        let parsed: EncryptedField = field.to_string().parse().unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn parse_rejects_bad_prefix() {
        assert!("v2.abc.def".parse::<EncryptedField>().is_err());
    }

    #[test]
    fn parse_rejects_too_few_parts() {
        assert!("v1.abc".parse::<EncryptedField>().is_err());
    }

    #[test]
    fn parse_rejects_bad_base64() {
        assert!("v1.!!!.abc".parse::<EncryptedField>().is_err());
    }

    #[test]
    fn plaintext_is_not_a_ciphertext() {
        assert!(matches!(
            FieldCipher.decrypt("alice", "k"),
            Err(CipherError::InvalidFormat)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let mut field = encrypt_field(b"tamper me", "k").unwrap();
        field.ciphertext[0] ^= 0xFF;
        assert!(decrypt_field(&field, "k").is_err());
    }
}
