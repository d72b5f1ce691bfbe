//! RSA key management for JWT signing and verification
//!
//! The signing key pair is bootstrapped once per deployment: loaded from the
//! configured PEM file when present, generated and persisted otherwise. The
//! persist step uses an exclusive create so that replicas racing through
//! first startup on a shared filesystem converge on a single key instead of
//! overwriting each other.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use tracing::info;

use crate::errors::{DomainError, TokenError};

/// RSA key size in bits for generated signing keys
const KEY_BITS: usize = 2048;

/// Manager for the RS256 key pair used in JWT operations
pub struct KeyManager {
    /// Private key for signing JWTs
    encoding_key: EncodingKey,
    /// Public key for verifying JWTs
    decoding_key: DecodingKey,
    /// Public key material for JWKS export
    public_key: RsaPublicKey,
    /// Path the private key was loaded from or persisted to
    private_key_path: PathBuf,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("private_key_path", &self.private_key_path)
            .finish()
    }
}

impl KeyManager {
    /// Loads the key pair from `path`, generating and persisting a new one
    /// if the file does not exist
    ///
    /// Bootstrap failures are fatal: a service that cannot sign tokens must
    /// not start.
    ///
    /// # Returns
    ///
    /// * `Ok(KeyManager)` - Keys available for signing and verification
    /// * `Err(DomainError)` - Key file unreadable, unparsable, or unwritable
    pub fn load_or_generate<P: AsRef<Path>>(path: P) -> Result<Self, DomainError> {
        let path = path.as_ref();

        if path.exists() {
            return Self::load(path);
        }

        info!(path = %path.display(), "signing key not found, generating a new RSA key pair");
        let private_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, KEY_BITS)
            .map_err(|e| bootstrap_error(format!("key generation failed: {e}")))?;

        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| bootstrap_error(format!("failed to encode private key: {e}")))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| bootstrap_error(format!("failed to create key directory: {e}")))?;
            }
        }

        // create_new is the cross-replica arbiter: exactly one process wins
        // the exclusive create, every loser re-reads the winner's file.
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(mut file) => {
                file.write_all(pem.as_bytes())
                    .map_err(|e| bootstrap_error(format!("failed to persist private key: {e}")))?;
                info!(path = %path.display(), "persisted new signing key");
                Self::from_private_key(private_key, path.to_path_buf())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                info!(path = %path.display(), "another instance persisted the key first, reloading");
                Self::load(path)
            }
            Err(e) => Err(bootstrap_error(format!(
                "failed to create key file: {e}"
            ))),
        }
    }

    /// Loads an existing PEM-encoded private key from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let pem = fs::read_to_string(path)
            .map_err(|e| bootstrap_error(format!("failed to read private key: {e}")))?;

        let private_key = parse_private_key_pem(&pem)?;
        Self::from_private_key(private_key, path.to_path_buf())
    }

    /// Creates a key manager from a PEM string (useful for tests)
    pub fn from_pem(private_key_pem: &str) -> Result<Self, DomainError> {
        let private_key = parse_private_key_pem(private_key_pem)?;
        Self::from_private_key(private_key, PathBuf::from("memory"))
    }

    fn from_private_key(private_key: RsaPrivateKey, path: PathBuf) -> Result<Self, DomainError> {
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| bootstrap_error(format!("failed to encode private key: {e}")))?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| bootstrap_error(format!("failed to encode public key: {e}")))?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| bootstrap_error(format!("invalid private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| bootstrap_error(format!("invalid public key: {e}")))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            public_key,
            private_key_path: path,
        })
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying JWTs
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns the path of the persisted private key
    pub fn key_path(&self) -> &Path {
        &self.private_key_path
    }

    /// Exports the public key as a JSON Web Key Set
    ///
    /// Relying services verify signatures from this document alone; the
    /// private key never leaves this process.
    pub fn jwks(&self) -> JsonWebKeySet {
        JsonWebKeySet {
            keys: vec![JsonWebKey {
                kty: "RSA".to_string(),
                key_use: "sig".to_string(),
                alg: "RS256".to_string(),
                n: URL_SAFE_NO_PAD.encode(self.public_key.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(self.public_key.e().to_bytes_be()),
            }],
        }
    }
}

fn parse_private_key_pem(pem: &str) -> Result<RsaPrivateKey, DomainError> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| bootstrap_error(format!("invalid private key format: {e}")))
}

fn bootstrap_error(message: String) -> DomainError {
    DomainError::Token(TokenError::KeyBootstrap { message })
}

/// A single JSON Web Key
#[derive(Debug, Clone, Serialize)]
pub struct JsonWebKey {
    /// Key type
    pub kty: String,
    /// Key usage
    #[serde(rename = "use")]
    pub key_use: String,
    /// Signature algorithm
    pub alg: String,
    /// Modulus, base64url without padding
    pub n: String,
    /// Public exponent, base64url without padding
    pub e: String,
}

/// JWKS response document
#[derive(Debug, Clone, Serialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}
