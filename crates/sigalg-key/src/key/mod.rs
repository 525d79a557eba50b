//! Key objects
//!
//! Every key, private or public, reports a standard algorithm name through the
//! [`Key`] trait. Signature engines receive keys as `&dyn Key` and recover the
//! concrete [`PrivateKey`] or [`PublicKey`] through [`Key::as_any`].

pub mod ec;
pub mod ed25519;
pub mod rsa;
pub mod util;

use std::any::Any;

use der::Decode;
use pkcs8::{Document, LineEnding};

pub use self::{
    ec::{EcCurve, EcKey, EcPublicKey},
    ed25519::{Ed25519Key, Ed25519PublicKey},
    rsa::RsaKey,
};
use crate::error::{Error, Result};

// ============================================================================
// Core Key Trait
// ============================================================================

/// Common interface of every key object
pub trait Key: Send + Sync {
    /// Standard algorithm name of the key, e.g. `RSA`, `EC`, `Ed25519`, `EdDSA`
    fn algorithm(&self) -> &str;

    /// Whether the key carries private material
    fn is_private(&self) -> bool;

    /// Downcast hook used by signature engines
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Private Keys
// ============================================================================

/// A private key of any supported algorithm
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(RsaKey),
    Ec(EcKey),
    Ed25519(Ed25519Key),
}

impl PrivateKey {
    /// Derive the matching public key
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.public_key()),
            PrivateKey::Ec(key) => PublicKey::Ec(key.public_key()),
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.public_key()),
        }
    }

    /// Export to PKCS#8 PEM
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        match self {
            PrivateKey::Rsa(key) => key.to_pkcs8_pem(),
            PrivateKey::Ec(key) => key.to_pkcs8_pem(),
            PrivateKey::Ed25519(key) => key.to_pkcs8_pem(),
        }
    }
}

impl Key for PrivateKey {
    fn algorithm(&self) -> &str {
        match self {
            PrivateKey::Rsa(_) => "RSA",
            PrivateKey::Ec(_) => "EC",
            PrivateKey::Ed25519(key) => key.algorithm_name(),
        }
    }

    fn is_private(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<RsaKey> for PrivateKey {
    fn from(value: RsaKey) -> Self {
        PrivateKey::Rsa(value)
    }
}

impl From<EcKey> for PrivateKey {
    fn from(value: EcKey) -> Self {
        PrivateKey::Ec(value)
    }
}

impl From<Ed25519Key> for PrivateKey {
    fn from(value: Ed25519Key) -> Self {
        PrivateKey::Ed25519(value)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key material
        match self {
            PrivateKey::Rsa(key) => write!(f, "PrivateKey::Rsa({} bits)", key.size_bits()),
            PrivateKey::Ec(key) => write!(f, "PrivateKey::Ec({})", key.curve()),
            PrivateKey::Ed25519(key) => write!(f, "PrivateKey::Ed25519({})", key.algorithm_name()),
        }
    }
}

// ============================================================================
// Public Keys
// ============================================================================

/// A public key of any supported algorithm
#[derive(Clone, Debug)]
pub enum PublicKey {
    Rsa(::rsa::RsaPublicKey),
    Ec(EcPublicKey),
    Ed25519(Ed25519PublicKey),
}

impl PublicKey {
    /// Export to SPKI DER
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        match self {
            PublicKey::Rsa(key) => crate::key::rsa::public_key_to_spki_der(key),
            PublicKey::Ec(key) => key.to_spki_der(),
            PublicKey::Ed25519(key) => key.to_spki_der(),
        }
    }

    /// Export to SPKI PEM
    pub fn to_spki_pem(&self) -> Result<String> {
        let der = self.to_spki_der()?;
        Document::from_der(&der)
            .and_then(|doc| doc.to_pem(util::SPKI_PEM_LABEL, LineEnding::LF))
            .map_err(|e| Error::ExportError(format!("SPKI PEM export failed: {e}")))
    }
}

impl Key for PublicKey {
    fn algorithm(&self) -> &str {
        match self {
            PublicKey::Rsa(_) => "RSA",
            PublicKey::Ec(_) => "EC",
            PublicKey::Ed25519(key) => key.algorithm_name(),
        }
    }

    fn is_private(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_names() {
        let ec: PrivateKey = EcKey::generate(EcCurve::P256).into();
        assert_eq!(ec.algorithm(), "EC");
        assert!(ec.is_private());
        assert_eq!(ec.public_key().algorithm(), "EC");
        assert!(!ec.public_key().is_private());

        let ed: PrivateKey = Ed25519Key::generate().into();
        assert_eq!(ed.algorithm(), "Ed25519");

        let generic: PrivateKey = Ed25519Key::generate().into_generic().into();
        assert_eq!(generic.algorithm(), "EdDSA");
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let key: PrivateKey = Ed25519Key::generate().into();
        let dyn_key: &dyn Key = &key;
        assert!(dyn_key.as_any().downcast_ref::<PrivateKey>().is_some());
        assert!(dyn_key.as_any().downcast_ref::<PublicKey>().is_none());
    }

    #[test]
    fn test_debug_hides_material() {
        let key: PrivateKey = EcKey::generate(EcCurve::P384).into();
        assert_eq!(format!("{key:?}"), "PrivateKey::Ec(P-384)");
    }

    #[test]
    fn test_public_pem_reloads() {
        let key: PrivateKey = EcKey::generate(EcCurve::P256).into();
        let pem = key.public_key().to_spki_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));

        let loaded = util::load_public_key_from_spki_pem(&pem).unwrap();
        assert_eq!(loaded.to_spki_der().unwrap(), key.public_key().to_spki_der().unwrap());
    }
}
