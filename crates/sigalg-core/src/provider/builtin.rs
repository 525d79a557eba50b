use const_oid::ObjectIdentifier;
use sigalg_key::HashAlgorithm;
use tracing::debug;

use super::{
    engine::{EcdsaEngine, EdDsaEngine, RsaPkcs1Engine, RsaPssEngine},
    Provider, ProviderError, SignatureEngine,
};
use crate::params::{AlgorithmParameters, EcParams, RsaPssParams, RSASSA_PSS};

// ============================================================================
// Algorithm table
// ============================================================================

#[derive(Clone, Copy, Debug)]
enum EngineKind {
    RsaPkcs1(HashAlgorithm),
    RsaPss,
    Ecdsa(HashAlgorithm),
    EdDsa,
    /// Identifier known, no engine
    Unavailable,
}

#[derive(Clone, Copy, Debug)]
struct AlgorithmEntry {
    name: &'static str,
    oid: Option<ObjectIdentifier>,
    kind: EngineKind,
}

const fn entry(name: &'static str, oid: &'static str, kind: EngineKind) -> AlgorithmEntry {
    AlgorithmEntry {
        name,
        oid: Some(ObjectIdentifier::new_unwrap(oid)),
        kind,
    }
}

const ALGORITHMS: &[AlgorithmEntry] = &[
    entry("SHA224withRSA", "1.2.840.113549.1.1.14", EngineKind::RsaPkcs1(HashAlgorithm::Sha224)),
    entry("SHA256withRSA", "1.2.840.113549.1.1.11", EngineKind::RsaPkcs1(HashAlgorithm::Sha256)),
    entry("SHA384withRSA", "1.2.840.113549.1.1.12", EngineKind::RsaPkcs1(HashAlgorithm::Sha384)),
    entry("SHA512withRSA", "1.2.840.113549.1.1.13", EngineKind::RsaPkcs1(HashAlgorithm::Sha512)),
    entry(RSASSA_PSS, "1.2.840.113549.1.1.10", EngineKind::RsaPss),
    entry("SHA224withECDSA", "1.2.840.10045.4.3.1", EngineKind::Ecdsa(HashAlgorithm::Sha224)),
    entry("SHA256withECDSA", "1.2.840.10045.4.3.2", EngineKind::Ecdsa(HashAlgorithm::Sha256)),
    entry("SHA384withECDSA", "1.2.840.10045.4.3.3", EngineKind::Ecdsa(HashAlgorithm::Sha384)),
    entry("SHA512withECDSA", "1.2.840.10045.4.3.4", EngineKind::Ecdsa(HashAlgorithm::Sha512)),
    entry("Ed25519", "1.3.101.112", EngineKind::EdDsa),
    entry("Ed448", "1.3.101.113", EngineKind::Unavailable),
    // generic label: an engine, but no identifier of its own
    AlgorithmEntry {
        name: "EdDSA",
        oid: None,
        kind: EngineKind::EdDsa,
    },
];

/// Named curves the curve decoder accepts
const CURVES: &[(&str, &str)] = &[
    ("P-256", "1.2.840.10045.3.1.7"),
    ("P-384", "1.3.132.0.34"),
    ("P-521", "1.3.132.0.35"),
    ("secp256k1", "1.3.132.0.10"),
];

// ============================================================================
// Provider
// ============================================================================

/// Provider backed by the RustCrypto primitives of `sigalg-key`
///
/// Names are matched ASCII case-insensitively; dotted designators are matched
/// against the identifier column.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinProvider;

impl BuiltinProvider {
    pub fn new() -> Self {
        Self
    }

    /// Standard names of every algorithm the provider knows
    pub fn algorithm_names(&self) -> impl Iterator<Item = &'static str> {
        ALGORITHMS.iter().map(|e| e.name)
    }

    /// Name of a named curve the decoder accepts
    pub fn curve_name(oid: &ObjectIdentifier) -> Option<&'static str> {
        CURVES
            .iter()
            .find(|(_, curve)| ObjectIdentifier::new(curve).ok().as_ref() == Some(oid))
            .map(|(name, _)| *name)
    }

    fn lookup(&self, algorithm: &str) -> Result<&'static AlgorithmEntry, ProviderError> {
        let found = if algorithm.contains('.') {
            let oid = ObjectIdentifier::new(algorithm)
                .map_err(|e| ProviderError::NoSuchAlgorithm(format!("{algorithm}: {e}")))?;
            ALGORITHMS.iter().find(|e| e.oid == Some(oid))
        } else {
            ALGORITHMS
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(algorithm))
        };
        found.ok_or_else(|| ProviderError::NoSuchAlgorithm(algorithm.to_string()))
    }
}

impl Provider for BuiltinProvider {
    fn name(&self) -> &str {
        "Builtin"
    }

    fn signature(&self, algorithm: &str) -> Result<Box<dyn SignatureEngine>, ProviderError> {
        let entry = self.lookup(algorithm)?;
        let engine: Box<dyn SignatureEngine> = match entry.kind {
            EngineKind::RsaPkcs1(hash) => Box::new(RsaPkcs1Engine::new(entry.name, hash)),
            EngineKind::RsaPss => Box::new(RsaPssEngine::new()),
            EngineKind::Ecdsa(hash) => Box::new(EcdsaEngine::new(entry.name, hash)),
            EngineKind::EdDsa => Box::new(EdDsaEngine::new(entry.name)),
            EngineKind::Unavailable => {
                return Err(ProviderError::NoSuchAlgorithm(format!(
                    "{} has no signature engine",
                    entry.name
                )))
            }
        };
        Ok(engine)
    }

    fn parameters(&self, algorithm: &str, der: &[u8]) -> Result<AlgorithmParameters, ProviderError> {
        let entry = self.lookup(algorithm)?;
        match entry.kind {
            EngineKind::RsaPss => {
                RsaPssParams::from_der(der)?;
                Ok(AlgorithmParameters::new(RSASSA_PSS, der.to_vec()))
            }
            EngineKind::Ecdsa(_) => {
                EcParams::from_der(der)?;
                Ok(AlgorithmParameters::new("EC", der.to_vec()))
            }
            _ => Err(ProviderError::NoSuchAlgorithm(format!(
                "{} has no parameters",
                entry.name
            ))),
        }
    }

    fn ec_parameter_spec(&self, der: &[u8]) -> Option<EcParams> {
        let params = match EcParams::from_der(der) {
            Ok(params) => params,
            Err(e) => {
                debug!(error = %e, "curve parameters did not decode");
                return None;
            }
        };
        match params.named_curve() {
            Some(oid) if Self::curve_name(oid).is_none() => {
                debug!(%oid, "unknown named curve");
                None
            }
            _ => Some(params),
        }
    }

    fn algorithm_oid(&self, name: &str) -> Option<ObjectIdentifier> {
        ALGORITHMS
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .and_then(|e| e.oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_oid() {
        let provider = BuiltinProvider::new();
        assert_eq!(provider.signature("sha512withrsa").unwrap().algorithm(), "SHA512withRSA");
        assert_eq!(
            provider.signature("1.2.840.10045.4.3.2").unwrap().algorithm(),
            "SHA256withECDSA"
        );
        assert_eq!(provider.signature("1.3.101.112").unwrap().algorithm(), "Ed25519");
        assert_eq!(provider.signature("EdDSA").unwrap().algorithm(), "EdDSA");
    }

    #[test]
    fn test_identifier_only_entries() {
        let provider = BuiltinProvider::new();
        assert!(provider.signature("Ed448").is_err());
        assert_eq!(
            provider.algorithm_oid("ed448").map(|oid| oid.to_string()).as_deref(),
            Some("1.3.101.113")
        );
        assert!(provider.algorithm_oid("EdDSA").is_none());
        assert!(provider.algorithm_oid("MD5withRSA").is_none());
    }

    #[test]
    fn test_parameter_objects() {
        let provider = BuiltinProvider::new();
        let pss = RsaPssParams::with_hash(HashAlgorithm::Sha384).to_der().unwrap();
        let params = provider.parameters("1.2.840.113549.1.1.10", &pss).unwrap();
        assert_eq!(params.algorithm, "RSASSA-PSS");
        assert_eq!(params.encoded, pss);

        assert!(provider.parameters("RSASSA-PSS", &[0x05, 0x00]).is_err());
        assert!(provider.parameters("SHA256withRSA", &pss).is_err());

        let curve = hex::decode("06052b81040022").unwrap();
        assert_eq!(provider.parameters("SHA384withECDSA", &curve).unwrap().algorithm, "EC");
    }

    #[test]
    fn test_curve_decoder_swallows_errors() {
        let provider = BuiltinProvider::new();
        assert!(provider.ec_parameter_spec(&hex::decode("06052b81040022").unwrap()).is_some());
        // well-formed but unknown curve 1.2.3.4
        assert!(provider.ec_parameter_spec(&[0x06, 0x03, 0x2a, 0x03, 0x04]).is_none());
        assert!(provider.ec_parameter_spec(&[0x05, 0x00]).is_none());
        assert!(provider.ec_parameter_spec(b"garbage").is_none());
    }

    #[test]
    fn test_curve_names() {
        assert_eq!(
            BuiltinProvider::curve_name(&ObjectIdentifier::new_unwrap("1.3.132.0.34")),
            Some("P-384")
        );
        assert_eq!(BuiltinProvider::curve_name(&ObjectIdentifier::new_unwrap("1.2.3.4")), None);
        assert_eq!(BuiltinProvider::new().algorithm_names().count(), 12);
    }
}
