//! Algorithm name normalization
//!
//! A designator is either a standard name (`SHA256withRSA`) or a dotted object
//! identifier (`1.2.840.113549.1.1.11`). [`normalize`] turns both forms into a
//! [`CanonicalAlgorithmName`] by asking the provider which engine answers to
//! the identifier.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use const_oid::ObjectIdentifier;
use tracing::debug;

use crate::{
    error::{Error, Result},
    provider::{Provider, ProviderError},
};

const OID_DELIMITER: char = '.';

// ============================================================================
// Canonical name
// ============================================================================

/// A resolved signature algorithm name
///
/// Keeps the spelling the provider reports; equality and hashing ignore ASCII
/// case. Never contains `.`.
#[derive(Clone, Debug)]
pub struct CanonicalAlgorithmName(String);

impl CanonicalAlgorithmName {
    fn new(name: String) -> Option<Self> {
        if name.is_empty() || name.contains(OID_DELIMITER) {
            return None;
        }
        Some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used for family dispatch
    pub fn to_upper(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    pub fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::of(self)
    }
}

impl PartialEq for CanonicalAlgorithmName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for CanonicalAlgorithmName {}

impl PartialEq<str> for CanonicalAlgorithmName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for CanonicalAlgorithmName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Hash for CanonicalAlgorithmName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
    }
}

impl fmt::Display for CanonicalAlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalAlgorithmName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Family dispatch
// ============================================================================

/// Structural family that governs how parameters are encoded
///
/// Decided by substring on the upper-cased name. This is a heuristic: a name
/// carrying both markers, or neither, is `Unrecognized` and never guessed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    Rsa,
    Ec,
    Unrecognized,
}

impl AlgorithmFamily {
    pub fn of(name: &CanonicalAlgorithmName) -> Self {
        let upper = name.to_upper();
        match (upper.contains("RSA"), upper.contains("ECDSA")) {
            (true, false) => AlgorithmFamily::Rsa,
            (false, true) => AlgorithmFamily::Ec,
            _ => AlgorithmFamily::Unrecognized,
        }
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmFamily::Rsa => f.write_str("RSA"),
            AlgorithmFamily::Ec => f.write_str("EC"),
            AlgorithmFamily::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Resolve a designator to its canonical name
pub fn normalize(provider: &dyn Provider, designator: &str) -> Result<CanonicalAlgorithmName> {
    let unknown = |source: Option<ProviderError>| Error::UnknownAlgorithm {
        designator: designator.to_string(),
        source,
    };

    if !designator.contains(OID_DELIMITER) {
        return CanonicalAlgorithmName::new(designator.to_string()).ok_or_else(|| unknown(None));
    }

    let oid = ObjectIdentifier::new(designator)
        .map_err(|e| unknown(Some(ProviderError::NoSuchAlgorithm(format!("{designator}: {e}")))))?;
    let engine = provider
        .signature(&oid.to_string())
        .map_err(|e| unknown(Some(e)))?;

    let reported = engine.algorithm().to_string();
    debug!(%designator, name = %reported, provider = provider.name(), "resolved algorithm identifier");

    CanonicalAlgorithmName::new(reported).ok_or_else(|| unknown(None))
}
