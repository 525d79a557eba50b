use std::{convert::TryFrom, path::Path};

use const_oid::ObjectIdentifier;
use pkcs8::{
    der::pem::PemLabel,
    spki::{der::asn1::AnyRef, SubjectPublicKeyInfoRef},
    Document, PrivateKeyInfo, SecretDocument,
};

use super::{
    ec::{EcCurve, EcKey, EcPublicKey},
    ed25519::{Ed25519Key, Ed25519PublicKey},
    rsa::{self as rsa_key, RsaKey},
    PrivateKey, PublicKey,
};
use crate::error::{Error, Result};

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const ID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

pub(crate) const SPKI_PEM_LABEL: &str = "PUBLIC KEY";

/// Load a private key from PKCS#8 PEM, detecting RSA, EC (P-256, P-384) and Ed25519.
pub fn load_private_key_from_pkcs8_pem(pem: &str) -> Result<PrivateKey> {
    let (label, doc) = SecretDocument::from_pem(pem)
        .map_err(|e| Error::ImportError(format!("Failed to decode PEM: {e}")))?;

    if label != PrivateKeyInfo::PEM_LABEL {
        return Err(Error::ImportError(format!("Invalid PKCS#8 label: {label}")));
    }

    load_private_key_from_pkcs8_der(doc.as_bytes())
}

/// Load a private key from PKCS#8 DER.
pub fn load_private_key_from_pkcs8_der(der: &[u8]) -> Result<PrivateKey> {
    let info = PrivateKeyInfo::try_from(der)
        .map_err(|e| Error::ImportError(format!("Failed to parse PKCS#8: {e}")))?;

    match detect_key_algorithm(info.algorithm.oid, info.algorithm.parameters)? {
        KeyAlgorithm::Rsa => Ok(RsaKey::from_pkcs8_der(der)?.into()),
        KeyAlgorithm::Ec(curve) => Ok(EcKey::from_pkcs8_der(curve, der)?.into()),
        KeyAlgorithm::Ed25519 => Ok(Ed25519Key::from_pkcs8_der(der)?.into()),
    }
}

/// Load a public key from SPKI PEM (`-----BEGIN PUBLIC KEY-----`).
pub fn load_public_key_from_spki_pem(pem: &str) -> Result<PublicKey> {
    let (label, doc) = Document::from_pem(pem)
        .map_err(|e| Error::ImportError(format!("Failed to decode PEM: {e}")))?;

    if label != SPKI_PEM_LABEL {
        return Err(Error::ImportError(format!("Invalid SPKI label: {label}")));
    }

    load_public_key_from_spki_der(doc.as_bytes())
}

/// Load a public key from SPKI DER.
pub fn load_public_key_from_spki_der(der: &[u8]) -> Result<PublicKey> {
    let info = SubjectPublicKeyInfoRef::try_from(der)
        .map_err(|e| Error::ImportError(format!("Failed to parse SPKI: {e}")))?;

    match detect_key_algorithm(info.algorithm.oid, info.algorithm.parameters)? {
        KeyAlgorithm::Rsa => Ok(PublicKey::Rsa(rsa_key::public_key_from_spki_der(der)?)),
        KeyAlgorithm::Ec(curve) => Ok(PublicKey::Ec(EcPublicKey::from_spki_der(curve, der)?)),
        KeyAlgorithm::Ed25519 => Ok(PublicKey::Ed25519(Ed25519PublicKey::from_spki_der(der)?)),
    }
}

/// Read a PEM file holding either a PKCS#8 private key or an SPKI public key.
///
/// Private keys are returned together with their derived public key.
pub fn load_key_file<P: AsRef<Path>>(path: P) -> Result<(Option<PrivateKey>, PublicKey)> {
    let pem = std::fs::read_to_string(path)?;
    if pem.contains(SPKI_PEM_LABEL) && !pem.contains(PrivateKeyInfo::PEM_LABEL) {
        return Ok((None, load_public_key_from_spki_pem(&pem)?));
    }
    let private = load_private_key_from_pkcs8_pem(&pem)?;
    let public = private.public_key();
    Ok((Some(private), public))
}

enum KeyAlgorithm {
    Rsa,
    Ec(EcCurve),
    Ed25519,
}

fn detect_key_algorithm(
    oid: ObjectIdentifier,
    parameters: Option<AnyRef<'_>>,
) -> Result<KeyAlgorithm> {
    if oid == ID_ED25519 {
        return Ok(KeyAlgorithm::Ed25519);
    }

    if oid == RSA_ENCRYPTION {
        return Ok(KeyAlgorithm::Rsa);
    }

    if oid == ID_EC_PUBLIC_KEY {
        let params = parameters.ok_or_else(|| {
            Error::ImportError("EC key is missing curve parameters".to_string())
        })?;
        let curve_oid = parse_curve_oid(params)?;
        return EcCurve::from_oid(&curve_oid)
            .map(KeyAlgorithm::Ec)
            .ok_or_else(|| Error::ImportError(format!("Unsupported EC curve OID: {curve_oid}")));
    }

    Err(Error::ImportError(format!("Unsupported key algorithm OID: {oid}")))
}

fn parse_curve_oid(any: AnyRef<'_>) -> Result<ObjectIdentifier> {
    ObjectIdentifier::try_from(any)
        .map_err(|e| Error::ImportError(format!("Failed to parse curve OID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn test_detects_each_key_type() {
        let keys: Vec<PrivateKey> = vec![
            EcKey::generate(EcCurve::P256).into(),
            EcKey::generate(EcCurve::P384).into(),
            Ed25519Key::generate().into(),
        ];

        for key in keys {
            let pem = key.to_pkcs8_pem().unwrap();
            let loaded = load_private_key_from_pkcs8_pem(&pem).unwrap();
            assert_eq!(loaded.algorithm(), key.algorithm());
            assert_eq!(
                loaded.public_key().to_spki_der().unwrap(),
                key.public_key().to_spki_der().unwrap()
            );
        }
    }

    #[test]
    fn test_loads_rsa_public_key() {
        let key: PrivateKey = RsaKey::generate_2048().unwrap().into();
        let der = key.public_key().to_spki_der().unwrap();
        let loaded = load_public_key_from_spki_der(&der).unwrap();
        assert_eq!(loaded.algorithm(), "RSA");
    }

    #[test]
    fn test_rejects_wrong_label() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(load_private_key_from_pkcs8_pem(pem).is_err());
        assert!(load_public_key_from_spki_pem(pem).is_err());
    }

    #[test]
    fn test_load_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key: PrivateKey = EcKey::generate(EcCurve::P256).into();
        let path = dir.path().join("key.pem");
        std::fs::write(&path, key.to_pkcs8_pem().unwrap()).unwrap();

        let (private, public) = load_key_file(&path).unwrap();
        assert!(private.is_some());
        assert_eq!(public.algorithm(), "EC");

        assert!(load_key_file(dir.path().join("missing.pem")).is_err());
    }
}
