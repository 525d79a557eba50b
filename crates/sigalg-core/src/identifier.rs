//! Algorithm identifier derivation
//!
//! Builds the identifier to embed in a signed structure from a configured
//! signing operation:
//!
//! 1. ask the operation for the parameters in effect; an engine that cannot
//!    report them counts as having none
//! 2. with parameters, the parameter object names the algorithm
//! 3. without, the operation's name is used, except that the generic `EdDSA`
//!    label is replaced by the key's own algorithm
//! 4. a name without an object identifier is an error

use std::fmt;

use const_oid::ObjectIdentifier;
use der::{asn1::Any, Decode, Encode, Tag};
use sigalg_key::Key;
use spki::AlgorithmIdentifierOwned;
use tracing::debug;

use crate::{
    binder::SigningOperation,
    error::{Error, Result},
    name::{normalize, CanonicalAlgorithmName},
    params::{decode_structured, ParameterSpec},
    provider::{Provider, ProviderError},
};

const GENERIC_EDDSA: &str = "EdDSA";

/// PKCS#1 v1.5 signature arcs under 1.2.840.113549.1.1 whose identifiers
/// carry an explicit `NULL`: md2, md4, md5, sha1, sha256, sha384, sha512,
/// sha224, sha512-224, sha512-256
const PKCS1_PREFIX: &str = "1.2.840.113549.1.1.";
const PKCS1_NULL_ARCS: &[&str] = &["2", "3", "4", "5", "11", "12", "13", "14", "15", "16"];

/// Signature algorithm identifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    name: CanonicalAlgorithmName,
    oid: ObjectIdentifier,
    params: Option<ParameterSpec>,
}

impl AlgorithmIdentifier {
    pub fn name(&self) -> &CanonicalAlgorithmName {
        &self.name
    }

    pub fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    pub fn params(&self) -> Option<&ParameterSpec> {
        self.params.as_ref()
    }

    /// The X.509 `AlgorithmIdentifier` structure
    pub fn to_spki(&self) -> der::Result<AlgorithmIdentifierOwned> {
        let parameters = match &self.params {
            Some(spec) => Some(Any::from_der(&spec.to_der()?)?),
            None if takes_null_parameters(&self.oid) => Some(Any::new(Tag::Null, Vec::<u8>::new())?),
            None => None,
        };
        Ok(AlgorithmIdentifierOwned {
            oid: self.oid,
            parameters,
        })
    }

    pub fn to_der(&self) -> der::Result<Vec<u8>> {
        self.to_spki()?.to_der()
    }
}

impl fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.oid)?;
        if let Some(params) = &self.params {
            match params.to_der() {
                Ok(der) => write!(f, " params={}", hex::encode(der))?,
                Err(_) => write!(f, " params=<unencodable>")?,
            }
        }
        Ok(())
    }
}

fn takes_null_parameters(oid: &ObjectIdentifier) -> bool {
    oid.to_string()
        .strip_prefix(PKCS1_PREFIX)
        .map(|arc| PKCS1_NULL_ARCS.contains(&arc))
        .unwrap_or(false)
}

/// Derive the identifier of a configured signing operation
pub fn derive(provider: &dyn Provider, operation: &SigningOperation, key: &dyn Key) -> Result<AlgorithmIdentifier> {
    let params = match operation.parameters() {
        Ok(params) => params,
        Err(ProviderError::Unsupported(reason)) => {
            debug!(algorithm = operation.algorithm(), %reason, "engine cannot report parameters");
            None
        }
        Err(source) => {
            return Err(Error::ProviderFailure {
                context: format!("reading parameters of {}", operation.algorithm()),
                source,
            })
        }
    };

    let failed = |algorithm: &str| Error::IdentifierDerivationFailed {
        algorithm: algorithm.to_string(),
        key_algorithm: key.algorithm().to_string(),
    };

    if let Some(params) = params {
        let name = normalize(provider, &params.algorithm)?;
        let oid = provider
            .algorithm_oid(name.as_str())
            .ok_or_else(|| failed(name.as_str()))?;
        let spec = decode_structured(provider, operation.algorithm(), Some(&params))?;
        debug!(algorithm = %name, %oid, "identifier derived from parameters");
        return Ok(AlgorithmIdentifier {
            name,
            oid,
            params: spec,
        });
    }

    let mut algorithm = operation.algorithm();
    if algorithm.eq_ignore_ascii_case(GENERIC_EDDSA) {
        algorithm = key.algorithm();
        debug!(key = algorithm, "generic EdDSA label replaced by key algorithm");
    }

    let name = normalize(provider, algorithm)?;
    let oid = provider
        .algorithm_oid(name.as_str())
        .ok_or_else(|| failed(name.as_str()))?;
    debug!(algorithm = %name, %oid, "identifier derived from name");
    Ok(AlgorithmIdentifier {
        name,
        oid,
        params: None,
    })
}

#[cfg(test)]
mod tests {
    use sigalg_key::{EcCurve, EcKey, Ed25519Key, HashAlgorithm, PrivateKey, RsaKey};

    use super::*;
    use crate::{
        binder::SignatureBinder,
        params::{AlgorithmParameters, EcParams, RsaPssParams},
        policy::KeySizePolicy,
        provider::{BuiltinProvider, SecureRandom, SignatureEngine},
    };

    /// Reports PSS parameters under the OID label, as DER-decoded objects do
    struct OidLabelledEngine(Box<dyn SignatureEngine>);

    impl SignatureEngine for OidLabelledEngine {
        fn algorithm(&self) -> &str {
            self.0.algorithm()
        }

        fn init_sign(
            &mut self,
            key: &dyn Key,
            params: Option<&ParameterSpec>,
            rng: Option<Box<dyn SecureRandom>>,
        ) -> std::result::Result<(), ProviderError> {
            self.0.init_sign(key, params, rng)
        }

        fn init_verify(&mut self, key: &dyn Key, params: Option<&ParameterSpec>) -> std::result::Result<(), ProviderError> {
            self.0.init_verify(key, params)
        }

        fn update(&mut self, data: &[u8]) -> std::result::Result<(), ProviderError> {
            self.0.update(data)
        }

        fn sign(&mut self) -> std::result::Result<Vec<u8>, ProviderError> {
            self.0.sign()
        }

        fn verify(&mut self, signature: &[u8]) -> std::result::Result<bool, ProviderError> {
            self.0.verify(signature)
        }

        fn parameters(&self) -> std::result::Result<Option<AlgorithmParameters>, ProviderError> {
            Ok(self.0.parameters()?.map(|p| AlgorithmParameters::new("1.2.840.113549.1.1.10", p.encoded)))
        }
    }

    struct OidLabelling(BuiltinProvider);

    impl Provider for OidLabelling {
        fn name(&self) -> &str {
            "OidLabelling"
        }

        fn signature(&self, algorithm: &str) -> std::result::Result<Box<dyn SignatureEngine>, ProviderError> {
            Ok(Box::new(OidLabelledEngine(self.0.signature(algorithm)?)))
        }

        fn parameters(&self, algorithm: &str, der: &[u8]) -> std::result::Result<AlgorithmParameters, ProviderError> {
            self.0.parameters(algorithm, der)
        }

        fn ec_parameter_spec(&self, der: &[u8]) -> Option<EcParams> {
            self.0.ec_parameter_spec(der)
        }

        fn algorithm_oid(&self, name: &str) -> Option<ObjectIdentifier> {
            self.0.algorithm_oid(name)
        }
    }

    fn identifier_for(provider: &dyn Provider, key: &PrivateKey, designator: &str) -> Result<AlgorithmIdentifier> {
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(provider, &policy);
        let op = binder.from_key(key, designator)?;
        derive(provider, &op, key)
    }

    #[test]
    fn test_generic_eddsa_takes_key_name() {
        let provider = BuiltinProvider::new();
        let key: PrivateKey = Ed25519Key::generate().into();

        let id = identifier_for(&provider, &key, "EdDSA").unwrap();
        assert_eq!(id.name().as_str(), "Ed25519");
        assert_eq!(id.oid().to_string(), "1.3.101.112");
        assert!(id.params().is_none());
        assert_eq!(hex::encode(id.to_der().unwrap()), "300506032b6570");
    }

    #[test]
    fn test_generic_eddsa_with_generic_key_fails() {
        let provider = BuiltinProvider::new();
        let key: PrivateKey = Ed25519Key::generate().into_generic().into();

        let err = identifier_for(&provider, &key, "EdDSA").unwrap_err();
        assert!(matches!(
            err,
            Error::IdentifierDerivationFailed { ref algorithm, ref key_algorithm }
                if algorithm == "EdDSA" && key_algorithm == "EdDSA"
        ));
    }

    #[test]
    fn test_pkcs1_falls_back_to_name() {
        let provider = BuiltinProvider::new();
        let key: PrivateKey = RsaKey::generate(1024).unwrap().into();

        let id = identifier_for(&provider, &key, "sha256withrsa").unwrap();
        assert_eq!(id.name(), &"SHA256withRSA");
        assert!(id.params().is_none());
        // SEQUENCE { sha256WithRSAEncryption, NULL }
        assert_eq!(
            hex::encode(id.to_der().unwrap()),
            "300d06092a864886f70d01010b0500"
        );
    }

    #[test]
    fn test_pss_identifier_carries_parameters() {
        let provider = BuiltinProvider::new();
        let key: PrivateKey = RsaKey::generate(1024).unwrap().into();

        let id = identifier_for(&provider, &key, "RSASSA-PSS").unwrap();
        assert_eq!(id.name().as_str(), "RSASSA-PSS");
        assert_eq!(id.oid().to_string(), "1.2.840.113549.1.1.10");
        assert_eq!(
            id.params(),
            Some(&ParameterSpec::RsaPss(RsaPssParams::with_hash(HashAlgorithm::Sha256)))
        );

        let spki = id.to_spki().unwrap();
        let params = spki.parameters.unwrap().to_der().unwrap();
        assert_eq!(RsaPssParams::from_der(&params).unwrap().salt_length, 32);
    }

    #[test]
    fn test_oid_labelled_parameters_are_resolved() {
        let provider = OidLabelling(BuiltinProvider::new());
        let key: PrivateKey = RsaKey::generate(1024).unwrap().into();

        let id = identifier_for(&provider, &key, "RSASSA-PSS").unwrap();
        assert_eq!(id.name().as_str(), "RSASSA-PSS");
        assert!(matches!(id.params(), Some(ParameterSpec::RsaPss(_))));
    }

    #[test]
    fn test_ecdsa_identifier_has_no_parameters() {
        let provider = BuiltinProvider::new();
        let key: PrivateKey = EcKey::generate(EcCurve::P384).into();

        let id = identifier_for(&provider, &key, "1.2.840.10045.4.3.3").unwrap();
        assert_eq!(id.name().as_str(), "SHA384withECDSA");
        assert_eq!(hex::encode(id.to_der().unwrap()), "300a06082a8648ce3d040303");
        assert_eq!(id.to_string(), "SHA384withECDSA (1.2.840.10045.4.3.3)");
    }
}
