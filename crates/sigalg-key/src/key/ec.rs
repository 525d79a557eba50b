use const_oid::ObjectIdentifier;
use p256::{
    ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier},
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding},
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Curves
// ============================================================================

/// Named prime curves with a signing implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcCurve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
}

const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

impl EcCurve {
    pub fn name(&self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
        }
    }

    /// Named-curve object identifier
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            EcCurve::P256 => SECP256R1,
            EcCurve::P384 => SECP384R1,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [EcCurve::P256, EcCurve::P384]
            .into_iter()
            .find(|c| c.oid() == *oid)
    }
}

impl std::fmt::Display for EcCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Private key
// ============================================================================

/// ECDSA private key on a named curve
///
/// Signs pre-computed digests; signatures are DER-encoded `Ecdsa-Sig-Value`.
#[derive(Clone)]
pub enum EcKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl EcKey {
    /// Generate a new key pair on `curve`
    pub fn generate(curve: EcCurve) -> Self {
        match curve {
            EcCurve::P256 => EcKey::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
            EcCurve::P384 => EcKey::P384(p384::ecdsa::SigningKey::random(&mut OsRng)),
        }
    }

    /// Import from PKCS8 DER format on the given curve
    pub fn from_pkcs8_der(curve: EcCurve, der: &[u8]) -> Result<Self> {
        let key = match curve {
            EcCurve::P256 => p256::ecdsa::SigningKey::from_pkcs8_der(der).map(EcKey::P256),
            EcCurve::P384 => p384::ecdsa::SigningKey::from_pkcs8_der(der).map(EcKey::P384),
        };
        key.map_err(|e| Error::ImportError(format!("{curve} PKCS8 DER import failed: {e}")))
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            EcKey::P256(_) => EcCurve::P256,
            EcKey::P384(_) => EcCurve::P384,
        }
    }

    pub fn public_key(&self) -> EcPublicKey {
        match self {
            EcKey::P256(key) => EcPublicKey::P256(p256::ecdsa::VerifyingKey::from(key)),
            EcKey::P384(key) => EcPublicKey::P384(p384::ecdsa::VerifyingKey::from(key)),
        }
    }

    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = match self {
            EcKey::P256(key) => key.to_pkcs8_pem(LineEnding::LF),
            EcKey::P384(key) => key.to_pkcs8_pem(LineEnding::LF),
        }
        .map_err(|e| Error::ExportError(format!("{} PKCS8 PEM export failed: {e}", self.curve())))?;
        Ok(pem.to_string())
    }

    /// Sign a digest, returning a DER-encoded signature
    pub fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>> {
        let der = match self {
            EcKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| Error::SignatureError(format!("P-256 signing failed: {e}")))?;
                signature.to_der().as_bytes().to_vec()
            }
            EcKey::P384(key) => {
                let signature: p384::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|e| Error::SignatureError(format!("P-384 signing failed: {e}")))?;
                signature.to_der().as_bytes().to_vec()
            }
        };
        Ok(der)
    }
}

// ============================================================================
// Public key
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EcPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl EcPublicKey {
    pub fn from_spki_der(curve: EcCurve, der: &[u8]) -> Result<Self> {
        let key = match curve {
            EcCurve::P256 => p256::ecdsa::VerifyingKey::from_public_key_der(der).map(EcPublicKey::P256),
            EcCurve::P384 => p384::ecdsa::VerifyingKey::from_public_key_der(der).map(EcPublicKey::P384),
        };
        key.map_err(|e| Error::ImportError(format!("{curve} SPKI DER import failed: {e}")))
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            EcPublicKey::P256(_) => EcCurve::P256,
            EcPublicKey::P384(_) => EcCurve::P384,
        }
    }

    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let der = match self {
            EcPublicKey::P256(key) => key.to_public_key_der(),
            EcPublicKey::P384(key) => key.to_public_key_der(),
        }
        .map_err(|e| Error::ExportError(format!("{} SPKI DER export failed: {e}", self.curve())))?;
        Ok(der.as_bytes().to_vec())
    }

    /// Verify a DER-encoded signature over a digest
    ///
    /// Malformed signatures verify as `false`.
    pub fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> bool {
        match self {
            EcPublicKey::P256(key) => p256::ecdsa::Signature::from_der(signature)
                .map(|sig| key.verify_prehash(digest, &sig).is_ok())
                .unwrap_or(false),
            EcPublicKey::P384(key) => p384::ecdsa::Signature::from_der(signature)
                .map(|sig| key.verify_prehash(digest, &sig).is_ok())
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{hash_data, HashAlgorithm};

    #[test]
    fn test_curve_metadata() {
        assert_eq!(EcCurve::P256.to_string(), "P-256");
        assert_eq!(EcCurve::P384.oid().to_string(), "1.3.132.0.34");
        assert_eq!(EcCurve::from_oid(&SECP256R1), Some(EcCurve::P256));
    }

    #[test]
    fn test_p256_sign_verify() {
        let key = EcKey::generate(EcCurve::P256);
        let digest = hash_data(b"Hello, P-256!", HashAlgorithm::Sha256);

        let signature = key.sign_prehash(&digest).unwrap();
        assert_eq!(signature[0], 0x30);
        assert!(key.public_key().verify_prehash(&digest, &signature));

        let other = hash_data(b"tampered", HashAlgorithm::Sha256);
        assert!(!key.public_key().verify_prehash(&other, &signature));
    }

    #[test]
    fn test_p384_with_longer_digest() {
        let key = EcKey::generate(EcCurve::P384);
        let digest = hash_data(b"Hello, P-384!", HashAlgorithm::Sha512);

        let signature = key.sign_prehash(&digest).unwrap();
        assert!(key.public_key().verify_prehash(&digest, &signature));
    }

    #[test]
    fn test_garbage_signature_is_rejected() {
        let key = EcKey::generate(EcCurve::P256);
        let digest = hash_data(b"data", HashAlgorithm::Sha256);
        assert!(!key.public_key().verify_prehash(&digest, &[0x30, 0x00]));
    }

    #[test]
    fn test_spki_round_trip() {
        let key = EcKey::generate(EcCurve::P384);
        let der = key.public_key().to_spki_der().unwrap();
        let imported = EcPublicKey::from_spki_der(EcCurve::P384, &der).unwrap();
        assert_eq!(imported, key.public_key());
    }
}
