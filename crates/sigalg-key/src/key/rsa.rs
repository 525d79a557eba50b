use ::rsa::{
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding},
    traits::PublicKeyParts,
    Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey,
};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::{
    error::{Error, Result},
    hash::HashAlgorithm,
};

// ============================================================================
// Core Key Structure
// ============================================================================

/// RSA private key
///
/// Signs pre-computed digests with PKCS#1 v1.5 or PSS padding.
///
/// # Examples
///
/// ```no_run
/// use sigalg_key::{hash_data, HashAlgorithm, RsaKey};
///
/// let key = RsaKey::generate_2048().unwrap();
/// let digest = hash_data(b"Hello, World!", HashAlgorithm::Sha256);
/// let signature = key.sign_pkcs1v15(HashAlgorithm::Sha256, &digest).unwrap();
/// ```
#[derive(Clone)]
pub struct RsaKey {
    inner: RsaPrivateKey,
}

impl From<RsaPrivateKey> for RsaKey {
    fn from(value: RsaPrivateKey) -> Self {
        Self { inner: value }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl RsaKey {
    /// Generate a new RSA key pair with the given modulus size in bits
    pub fn generate(bits: usize) -> Result<Self> {
        let inner = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::KeyError(format!("RSA-{bits} generation failed: {e}")))?;
        Ok(Self { inner })
    }

    /// Generate a new 2048-bit RSA key pair
    pub fn generate_2048() -> Result<Self> {
        Self::generate(2048)
    }

    /// Import from PKCS8 DER format
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let inner = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| Error::ImportError(format!("RSA PKCS8 DER import failed: {e}")))?;
        Ok(Self { inner })
    }

    /// Import from PKCS8 PEM format
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let inner = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| Error::ImportError(format!("RSA PKCS8 PEM import failed: {e}")))?;
        Ok(Self { inner })
    }
}

// ============================================================================
// Accessors and export
// ============================================================================

impl RsaKey {
    /// Modulus size in bits
    pub fn size_bits(&self) -> usize {
        self.inner.size() * 8
    }

    /// Modulus size in bytes
    pub fn modulus_len(&self) -> usize {
        self.inner.size()
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.inner.to_public_key()
    }

    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = self
            .inner
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| Error::ExportError(format!("RSA PKCS8 PEM export failed: {e}")))?;
        Ok(pem.to_string())
    }
}

// ============================================================================
// Signing
// ============================================================================

impl RsaKey {
    /// Sign a digest with PKCS#1 v1.5 padding
    pub fn sign_pkcs1v15(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<u8>> {
        self.inner
            .sign(pkcs1v15_scheme(hash), digest)
            .map_err(|e| Error::SignatureError(format!("RSA PKCS#1 v1.5 signing failed: {e}")))
    }

    /// Sign a digest with PSS padding, MGF1 over the same digest
    pub fn sign_pss<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        hash: HashAlgorithm,
        salt_len: usize,
        digest: &[u8],
    ) -> Result<Vec<u8>> {
        self.inner
            .sign_with_rng(rng, pss_scheme(hash, salt_len), digest)
            .map_err(|e| Error::SignatureError(format!("RSA PSS signing failed: {e}")))
    }
}

// ============================================================================
// Public key helpers
// ============================================================================

/// Verify a PKCS#1 v1.5 signature over a digest
pub fn verify_pkcs1v15(
    public_key: &RsaPublicKey,
    hash: HashAlgorithm,
    digest: &[u8],
    signature: &[u8],
) -> bool {
    public_key
        .verify(pkcs1v15_scheme(hash), digest, signature)
        .is_ok()
}

/// Verify a PSS signature over a digest
pub fn verify_pss(
    public_key: &RsaPublicKey,
    hash: HashAlgorithm,
    salt_len: usize,
    digest: &[u8],
    signature: &[u8],
) -> bool {
    public_key
        .verify(pss_scheme(hash, salt_len), digest, signature)
        .is_ok()
}

/// Import an RSA public key from SPKI DER
pub fn public_key_from_spki_der(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der)
        .map_err(|e| Error::ImportError(format!("RSA SPKI DER import failed: {e}")))
}

/// Export an RSA public key to SPKI DER
pub fn public_key_to_spki_der(public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let der = public_key
        .to_public_key_der()
        .map_err(|e| Error::ExportError(format!("RSA SPKI DER export failed: {e}")))?;
    Ok(der.as_bytes().to_vec())
}

/// Modulus size in bytes of an RSA public key
pub fn public_modulus_len(public_key: &RsaPublicKey) -> usize {
    public_key.size()
}

fn pkcs1v15_scheme(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

fn pss_scheme(hash: HashAlgorithm, salt_len: usize) -> Pss {
    match hash {
        HashAlgorithm::Sha1 => Pss::new_with_salt::<Sha1>(salt_len),
        HashAlgorithm::Sha224 => Pss::new_with_salt::<Sha224>(salt_len),
        HashAlgorithm::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
        HashAlgorithm::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
        HashAlgorithm::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
    }
}

// ============================================================================
// Tests
// ============================================================================
