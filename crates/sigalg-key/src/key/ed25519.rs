use ed25519_dalek::{
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
    Signature, Signer, SigningKey, Verifier, VerifyingKey,
};
use pkcs8::LineEnding;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

const ED25519: &str = "Ed25519";
const EDDSA: &str = "EdDSA";

// ============================================================================
// Core Key Structure
// ============================================================================

/// Ed25519 private key
///
/// A key reports itself either as `Ed25519` or, when produced by a generic
/// EdDSA key generator, as `EdDSA`. The label affects only
/// [`algorithm_name`](Self::algorithm_name); the key material is identical.
#[derive(Clone)]
pub struct Ed25519Key {
    inner: SigningKey,
    generic: bool,
}

impl Ed25519Key {
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::generate(&mut OsRng),
            generic: false,
        }
    }

    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            inner: SigningKey::from_bytes(seed),
            generic: false,
        }
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let inner = SigningKey::from_pkcs8_der(der)
            .map_err(|e| Error::ImportError(format!("Ed25519 PKCS8 DER import failed: {e}")))?;
        Ok(Self {
            inner,
            generic: false,
        })
    }

    /// Relabel the key as a generic `EdDSA` key
    pub fn into_generic(mut self) -> Self {
        self.generic = true;
        self
    }

    pub fn algorithm_name(&self) -> &str {
        if self.generic {
            EDDSA
        } else {
            ED25519
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            inner: self.inner.verifying_key(),
            generic: self.generic,
        }
    }

    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = self
            .inner
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::ExportError(format!("Ed25519 PKCS8 PEM export failed: {e}")))?;
        Ok(pem.to_string())
    }

    /// Sign the full message (Ed25519 hashes internally)
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.inner.sign(message).to_bytes().to_vec()
    }
}

// ============================================================================
// Public key
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    inner: VerifyingKey,
    generic: bool,
}

impl Ed25519PublicKey {
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        let inner = VerifyingKey::from_public_key_der(der)
            .map_err(|e| Error::ImportError(format!("Ed25519 SPKI DER import failed: {e}")))?;
        Ok(Self {
            inner,
            generic: false,
        })
    }

    pub fn algorithm_name(&self) -> &str {
        if self.generic {
            EDDSA
        } else {
            ED25519
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let der = self
            .inner
            .to_public_key_der()
            .map_err(|e| Error::ExportError(format!("Ed25519 SPKI DER export failed: {e}")))?;
        Ok(der.as_bytes().to_vec())
    }

    /// Verify a 64-byte signature; wrong lengths verify as `false`
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match Signature::from_slice(signature) {
            Ok(sig) => self.inner.verify(message, &sig).is_ok(),
            Err(_) => false,
        }
    }
}
