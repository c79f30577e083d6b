//! Credential vault
//!
//! Authenticated symmetric encryption (AES-256-GCM) of OAuth tokens for
//! at-rest storage. The envelope is self-contained —
//! `ivBase64:authTagBase64:ciphertextBase64` — so any holder of the
//! master key can decrypt without side-channel state, and any tampering
//! makes decryption fail instead of returning garbage.
//!
//! The 32-byte key is derived once per process from a long-lived secret
//! via Argon2id with a fixed application salt and cached for the process
//! lifetime. Encryption itself is pure and safe to call concurrently.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dealsync_core::ports::TokenCipher;
use dealsync_domain::{Result, SyncError};
use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::IntegrationConfig;

/// Fixed application salt for key derivation
const KEY_DERIVATION_SALT: &[u8] = b"dealsync-token-vault";

const IV_LENGTH: usize = 12;
const AUTH_TAG_LENGTH: usize = 16;

static SHARED_VAULT: OnceCell<TokenVault> = OnceCell::new();

/// AES-256-GCM vault over a derived master key
pub struct TokenVault {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVault").field("key", &"[REDACTED]").finish()
    }
}

impl TokenVault {
    /// Create a vault, deriving the 256-bit key from `secret` via Argon2.
    ///
    /// # Errors
    /// Returns `SyncError::Config` if key derivation fails.
    pub fn new(secret: &str) -> Result<Self> {
        let mut key = [0u8; 32];
        argon2::Argon2::default()
            .hash_password_into(secret.as_bytes(), KEY_DERIVATION_SALT, &mut key)
            .map_err(|e| SyncError::Config(format!("key derivation failed: {e}")))?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| SyncError::Config(format!("failed to initialize cipher: {e}")))?;
        Ok(Self { cipher })
    }

    /// Process-wide vault derived from the configured secret, cached so
    /// the slow key derivation runs once.
    pub fn shared(config: &IntegrationConfig) -> Result<&'static Self> {
        SHARED_VAULT.get_or_try_init(|| Self::new(&config.encryption_secret))
    }

    /// Encrypt a plaintext secret into a `iv:tag:ciphertext` envelope.
    ///
    /// # Errors
    /// Returns `SyncError::Config` if the cipher rejects the input.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut iv = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut iv);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| SyncError::Config(format!("encryption failed: {e}")))?;

        // The AEAD appends the 16-byte tag; split it out so the envelope
        // carries iv, tag, and ciphertext as separate parts.
        let split = sealed.len() - AUTH_TAG_LENGTH;
        let (ciphertext, tag) = sealed.split_at(split);

        Ok(format!("{}:{}:{}", BASE64.encode(iv), BASE64.encode(tag), BASE64.encode(ciphertext)))
    }

    /// Decrypt an envelope produced by [`TokenVault::encrypt`].
    ///
    /// # Errors
    /// - `InvalidEnvelopeFormat` when the three-part structure or base64
    ///   encoding is broken
    /// - `TamperedCiphertext` when authentication fails on any part
    pub fn decrypt(&self, envelope: &str) -> Result<String> {
        let parts: Vec<&str> = envelope.split(':').collect();
        let [iv_b64, tag_b64, ciphertext_b64] = parts.as_slice() else {
            return Err(SyncError::InvalidEnvelopeFormat);
        };

        let iv = BASE64.decode(iv_b64).map_err(|_| SyncError::InvalidEnvelopeFormat)?;
        let tag = BASE64.decode(tag_b64).map_err(|_| SyncError::InvalidEnvelopeFormat)?;
        let ciphertext =
            BASE64.decode(ciphertext_b64).map_err(|_| SyncError::InvalidEnvelopeFormat)?;

        if iv.len() != IV_LENGTH || tag.len() != AUTH_TAG_LENGTH {
            return Err(SyncError::InvalidEnvelopeFormat);
        }

        let mut sealed = ciphertext;
        sealed.extend_from_slice(&tag);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&iv), sealed.as_ref())
            .map_err(|_| SyncError::TamperedCiphertext)?;

        String::from_utf8(plaintext).map_err(|_| SyncError::TamperedCiphertext)
    }

    /// Structural probe: does the value look like an envelope?
    #[must_use]
    pub fn is_envelope(value: &str) -> bool {
        value.split(':').count() == 3
    }
}

impl TokenCipher for TokenVault {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        Self::encrypt(self, plaintext)
    }

    fn decrypt(&self, envelope: &str) -> Result<String> {
        Self::decrypt(self, envelope)
    }
}
