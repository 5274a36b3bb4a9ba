// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Encryption of the persisted queue blob.
//!
//! Ciphertext is a text envelope so it can be stored as a plain string value:
//!
//! ```text
//! enc:v1:<nonce>:<ciphertext>
//! ```
//!
//! Both parts are URL-safe base64 without padding. Every encryption draws a
//! fresh 96-bit nonce.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};

use crate::error::{Error, Result};
use crate::BoxFuture;

const ENVELOPE_PREFIX: &str = "enc:v1:";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Symmetric encryption of text payloads.
///
/// Both operations are asynchronous so that platform keystores can back
/// them, and both may fail.
pub trait Cipher: Send + Sync {
    /// Encrypts `plaintext` into an opaque string.
    fn encrypt<'a>(&'a self, plaintext: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Decrypts a string produced by [`Cipher::encrypt`].
    fn decrypt<'a>(&'a self, ciphertext: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// ChaCha20-Poly1305 cipher with a 256-bit key.
#[derive(Clone)]
pub struct ChaChaCipher {
    aead: ChaCha20Poly1305,
}

impl ChaChaCipher {
    /// Creates a cipher from raw key bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(Error::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let aead =
            ChaCha20Poly1305::new_from_slice(key).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(ChaChaCipher { aead })
    }

    /// Creates a cipher from a base64 key (standard or URL-safe alphabet).
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        let key = URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .or_else(|_| STANDARD.decode(encoded.as_bytes()))
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Self::new(&key)
    }

    /// Generates a random key, returned base64 encoded.
    pub fn generate_key() -> String {
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        STANDARD.encode(key.as_slice())
    }

    fn seal(&self, plaintext: &str) -> Result<String> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = self
            .aead
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::Crypto(format!("failed to encrypt: {e}")))?;
        Ok(format!(
            "{ENVELOPE_PREFIX}{}:{}",
            URL_SAFE_NO_PAD.encode(nonce.as_slice()),
            URL_SAFE_NO_PAD.encode(sealed)
        ))
    }

    fn open(&self, envelope: &str) -> Result<String> {
        let body = envelope
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| Error::Crypto("unrecognized envelope".to_string()))?;
        let (nonce_b64, sealed_b64) = body
            .split_once(':')
            .ok_or_else(|| Error::Crypto("envelope is missing the nonce".to_string()))?;

        let nonce_raw = URL_SAFE_NO_PAD
            .decode(nonce_b64.as_bytes())
            .map_err(|e| Error::Crypto(format!("failed to decode nonce: {e}")))?;
        if nonce_raw.len() != NONCE_LEN {
            return Err(Error::Crypto("nonce length is invalid".to_string()));
        }
        let sealed = URL_SAFE_NO_PAD
            .decode(sealed_b64.as_bytes())
            .map_err(|e| Error::Crypto(format!("failed to decode payload: {e}")))?;

        let plain = self
            .aead
            .decrypt(Nonce::from_slice(&nonce_raw), sealed.as_ref())
            .map_err(|e| Error::Crypto(format!("failed to decrypt: {e}")))?;
        String::from_utf8(plain)
            .map_err(|e| Error::Crypto(format!("plaintext is not valid utf-8: {e}")))
    }
}

impl fmt::Debug for ChaChaCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaChaCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Cipher for ChaChaCipher {
    fn encrypt<'a>(&'a self, plaintext: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.seal(plaintext) })
    }

    fn decrypt<'a>(&'a self, ciphertext: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.open(ciphertext) })
    }
}

#[cfg(test)]
#[path = "crypto_tests.rs"]
mod tests;
