//! Credential cipher.
//!
//! Secret config fields are sealed with ChaCha20-Poly1305 under a key derived
//! from the process root secret. The key is derived lazily on first use and
//! cached for the lifetime of the cipher.
//!
//! Ciphertext format (lowercase hex):
//! - 12 bytes: nonce
//! - N bytes: ciphertext with authentication tag

use std::sync::OnceLock;

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use crate::config::{CryptoErrorPolicy, EncryptionConfig};
use crate::secret::SecretString;

/// Size of the nonce prefix in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes
pub const TAG_SIZE: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("encryption root key is not configured")]
    RootKeyMissing,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed: {0}")]
    Decrypt(&'static str),
}

/// Supplies the root secret the first time the cipher is used.
pub trait RootKeySource: Send + Sync {
    fn root_key(&self) -> Option<SecretString>;
}

impl RootKeySource for EncryptionConfig {
    fn root_key(&self) -> Option<SecretString> {
        self.root_key.clone()
    }
}

/// Symmetric cipher for individual secret strings.
///
/// Blank input (empty or whitespace only) passes through unchanged in both
/// directions. A missing root key always fails. Any other failure follows
/// the configured [`CryptoErrorPolicy`].
pub struct CredentialCipher {
    source: Box<dyn RootKeySource>,
    policy: CryptoErrorPolicy,
    key: OnceLock<ChaCha20Poly1305>,
    init: Mutex<()>,
}

impl CredentialCipher {
    #[must_use]
    pub fn new(source: impl RootKeySource + 'static, policy: CryptoErrorPolicy) -> Self {
        Self {
            source: Box::new(source),
            policy,
            key: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn from_config(config: &EncryptionConfig) -> Self {
        Self::new(config.clone(), config.on_crypto_error)
    }

    /// Derive the key now instead of at first use.
    ///
    /// # Errors
    /// Returns [`CipherError::RootKeyMissing`] if no root key is configured.
    pub fn init(&self) -> Result<(), CipherError> {
        self.aead().map(|_| ())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.key.get().is_some()
    }

    #[must_use]
    pub const fn policy(&self) -> CryptoErrorPolicy {
        self.policy
    }

    /// Encrypt one secret value.
    ///
    /// # Errors
    /// [`CipherError::RootKeyMissing`] when no root key is configured;
    /// [`CipherError::Encrypt`] only under [`CryptoErrorPolicy::Reject`].
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if is_blank(plaintext) {
            return Ok(plaintext.to_owned());
        }
        let aead = self.aead()?;
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        match aead.encrypt(&nonce, plaintext.as_bytes()) {
            Ok(sealed) => {
                let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
                out.extend_from_slice(&nonce);
                out.extend_from_slice(&sealed);
                Ok(hex::encode(out))
            }
            Err(_) => self.degrade(plaintext, CipherError::Encrypt),
        }
    }

    /// Decrypt one value produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    /// [`CipherError::RootKeyMissing`] when no root key is configured;
    /// [`CipherError::Decrypt`] only under [`CryptoErrorPolicy::Reject`].
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        if is_blank(ciphertext) {
            return Ok(ciphertext.to_owned());
        }
        let aead = self.aead()?;
        match open(aead, ciphertext) {
            Ok(plaintext) => Ok(plaintext),
            Err(err) => self.degrade(ciphertext, err),
        }
    }

    fn degrade(&self, input: &str, err: CipherError) -> Result<String, CipherError> {
        match self.policy {
            CryptoErrorPolicy::PassThrough => {
                tracing::error!(error = %err, "credential cipher failed, returning input unchanged");
                Ok(input.to_owned())
            }
            CryptoErrorPolicy::Reject => {
                tracing::error!(error = %err, "credential cipher failed");
                Err(err)
            }
        }
    }

    fn aead(&self) -> Result<&ChaCha20Poly1305, CipherError> {
        if let Some(aead) = self.key.get() {
            return Ok(aead);
        }

        let _guard = self.init.lock();
        if let Some(aead) = self.key.get() {
            return Ok(aead);
        }

        let Some(root) = self.source.root_key().filter(|k| !k.is_blank()) else {
            tracing::error!("encryption root key is not configured");
            return Err(CipherError::RootKeyMissing);
        };
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&Sha256::digest(root.expose().as_bytes()));
        let aead = ChaCha20Poly1305::new(Key::from_slice(key.as_slice()));
        tracing::debug!("credential cipher key initialized");
        Ok(self.key.get_or_init(|| aead))
    }
}

fn open(aead: &ChaCha20Poly1305, ciphertext: &str) -> Result<String, CipherError> {
    let bytes =
        hex::decode(ciphertext.trim()).map_err(|_| CipherError::Decrypt("not hex encoded"))?;
    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CipherError::Decrypt("ciphertext too short"));
    }
    let (nonce, body) = bytes.split_at(NONCE_SIZE);
    let plaintext = aead
        .decrypt(Nonce::from_slice(nonce), body)
        .map_err(|_| CipherError::Decrypt("wrong key or corrupted data"))?;
    String::from_utf8(plaintext).map_err(|e| {
        e.into_bytes().zeroize();
        CipherError::Decrypt("plaintext is not UTF-8")
    })
}

/// Empty or whitespace only.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
