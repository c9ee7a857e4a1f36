//! AES-256-GCM envelope for storage entries.
//!
//! Entries are stored as base64-encoded `nonce || ciphertext || tag` with a
//! fresh random 12-byte nonce per write. The key is SHA-256 of the
//! application secret.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::StorageError;

/// Nonce size for AES-256-GCM (12 bytes).
const NONCE_SIZE: usize = 12;
/// AES-256 key size (32 bytes).
const KEY_SIZE: usize = 32;
/// GCM tag size (16 bytes).
const TAG_SIZE: usize = 16;

/// Symmetric cipher keyed from the application secret.
pub struct EnvelopeCipher {
    cipher: Aes256Gcm,
}

impl EnvelopeCipher {
    pub fn new(secret: &str) -> Result<Self, StorageError> {
        let key = derive_key(secret);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| StorageError::Encryption(format!("key init failed: {e}")))?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` into a base64 envelope.
    pub fn seal(&self, plaintext: &str) -> Result<String, StorageError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| StorageError::Encryption(format!("encryption failed: {e}")))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(&combined))
    }

    /// Decrypt a base64 envelope back to its plaintext.
    pub fn open(&self, envelope: &str) -> Result<String, StorageError> {
        let combined = STANDARD
            .decode(envelope.trim())
            .map_err(|e| StorageError::Encryption(format!("base64 decode failed: {e}")))?;

        if combined.len() < NONCE_SIZE + TAG_SIZE {
            return Err(StorageError::Encryption("envelope too short".into()));
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| StorageError::Encryption(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| StorageError::Encryption(format!("UTF-8 decode failed: {e}")))
    }
}

fn derive_key(secret: &str) -> [u8; KEY_SIZE] {
    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let cipher = EnvelopeCipher::new("test-secret").unwrap();
        let sealed = cipher.seal("\"T1\"").unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), "\"T1\"");
    }

    #[test]
    fn each_seal_uses_a_fresh_nonce() {
        let cipher = EnvelopeCipher::new("test-secret").unwrap();
        assert_ne!(cipher.seal("same").unwrap(), cipher.seal("same").unwrap());
    }

    #[test]
    fn wrong_secret_fails() {
        let sealed = EnvelopeCipher::new("right").unwrap().seal("value").unwrap();
        let other = EnvelopeCipher::new("wrong").unwrap();
        assert!(other.open(&sealed).is_err());
    }

    #[test]
    fn flipped_byte_fails_authentication() {
        let cipher = EnvelopeCipher::new("test-secret").unwrap();
        let sealed = cipher.seal("value").unwrap();
        let mut raw = STANDARD.decode(&sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        assert!(cipher.open(&STANDARD.encode(raw)).is_err());
    }

    #[test]
    fn short_envelope_is_rejected() {
        let cipher = EnvelopeCipher::new("test-secret").unwrap();
        assert!(cipher.open(&STANDARD.encode([0u8; 8])).is_err());
        assert!(cipher.open("not base64 at all!").is_err());
    }
}
