//! Operation binding
//!
//! [`SignatureBinder`] resolves a designator, obtains an engine from the
//! provider, fills in default parameters through a [`ParameterPolicy`] and
//! initializes the engine with the key. Initialization failures are reported
//! as they are; no other algorithm is ever substituted.

use sigalg_key::Key;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    name::{normalize, CanonicalAlgorithmName},
    params::{AlgorithmParameters, ParameterSpec},
    policy::ParameterPolicy,
    provider::{Provider, ProviderError, SecureRandom, SignatureEngine},
};

// ============================================================================
// Operation handles
// ============================================================================

/// A signature engine initialized for signing
pub struct SigningOperation {
    engine: Box<dyn SignatureEngine>,
    name: CanonicalAlgorithmName,
    params: Option<ParameterSpec>,
    synthesized: bool,
}

/// A signature engine initialized for verification
pub struct VerificationOperation {
    engine: Box<dyn SignatureEngine>,
    name: CanonicalAlgorithmName,
    params: Option<ParameterSpec>,
    synthesized: bool,
}

macro_rules! operation_accessors {
    ($ty:ty) => {
        impl $ty {
            /// Canonical name the operation was bound under
            pub fn name(&self) -> &CanonicalAlgorithmName {
                &self.name
            }

            /// Name the engine reports
            pub fn algorithm(&self) -> &str {
                self.engine.algorithm()
            }

            /// Parameters the engine was initialized with
            pub fn parameter_spec(&self) -> Option<&ParameterSpec> {
                self.params.as_ref()
            }

            /// Whether the parameters came from the default policy
            pub fn is_synthesized(&self) -> bool {
                self.synthesized
            }

            /// Parameter object the engine reports, if it can
            pub fn parameters(&self) -> std::result::Result<Option<AlgorithmParameters>, ProviderError> {
                self.engine.parameters()
            }

            pub fn update(&mut self, data: &[u8]) -> Result<()> {
                self.engine
                    .update(data)
                    .map_err(|source| failure(&self.name, "updating", source))
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("name", &self.name)
                    .field("algorithm", &self.engine.algorithm())
                    .field("params", &self.params)
                    .field("synthesized", &self.synthesized)
                    .finish()
            }
        }
    };
}

operation_accessors!(SigningOperation);
operation_accessors!(VerificationOperation);

impl SigningOperation {
    /// Sign everything passed to [`update`](Self::update) since the last call
    pub fn sign(&mut self) -> Result<Vec<u8>> {
        self.engine
            .sign()
            .map_err(|source| failure(&self.name, "signing", source))
    }

    pub fn sign_message(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        self.update(message)?;
        self.sign()
    }
}

impl VerificationOperation {
    pub fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        self.engine
            .verify(signature)
            .map_err(|source| failure(&self.name, "verifying", source))
    }

    pub fn verify_message(&mut self, message: &[u8], signature: &[u8]) -> Result<bool> {
        self.update(message)?;
        self.verify(signature)
    }
}

fn failure(name: &CanonicalAlgorithmName, action: &str, source: ProviderError) -> Error {
    Error::ProviderFailure {
        context: format!("{action} with {name}"),
        source,
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Binds keys to initialized signature operations
#[derive(Clone, Copy)]
pub struct SignatureBinder<'a> {
    provider: &'a dyn Provider,
    policy: &'a dyn ParameterPolicy,
}

struct Resolved {
    engine: Box<dyn SignatureEngine>,
    name: CanonicalAlgorithmName,
    params: Option<ParameterSpec>,
    synthesized: bool,
}

impl<'a> SignatureBinder<'a> {
    pub fn new(provider: &'a dyn Provider, policy: &'a dyn ParameterPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn provider(&self) -> &'a dyn Provider {
        self.provider
    }

    /// Initialize a signing operation
    ///
    /// Without `explicit` parameters the policy supplies defaults sized to the
    /// key. Without `rng` engines that need randomness use the OS generator.
    pub fn sign(
        &self,
        key: &dyn Key,
        designator: &str,
        explicit: Option<&ParameterSpec>,
        rng: Option<Box<dyn SecureRandom>>,
    ) -> Result<SigningOperation> {
        let Resolved {
            mut engine,
            name,
            params,
            synthesized,
        } = self.resolve(key, designator, explicit)?;

        engine
            .init_sign(key, params.as_ref(), rng)
            .map_err(|e| init_error(&name, key, synthesized, e))?;

        Ok(SigningOperation {
            engine,
            name,
            params,
            synthesized,
        })
    }

    /// Initialize a verification operation
    pub fn verify(
        &self,
        key: &dyn Key,
        designator: &str,
        explicit: Option<&ParameterSpec>,
    ) -> Result<VerificationOperation> {
        let Resolved {
            mut engine,
            name,
            params,
            synthesized,
        } = self.resolve(key, designator, explicit)?;

        engine
            .init_verify(key, params.as_ref())
            .map_err(|e| init_error(&name, key, synthesized, e))?;

        Ok(VerificationOperation {
            engine,
            name,
            params,
            synthesized,
        })
    }

    /// Signing operation with default parameters and default randomness
    pub fn from_key(&self, key: &dyn Key, designator: &str) -> Result<SigningOperation> {
        self.sign(key, designator, None, None)
    }

    fn resolve(&self, key: &dyn Key, designator: &str, explicit: Option<&ParameterSpec>) -> Result<Resolved> {
        let name = normalize(self.provider, designator)?;
        let engine = self
            .provider
            .signature(name.as_str())
            .map_err(|e| Error::UnknownAlgorithm {
                designator: designator.to_string(),
                source: Some(e),
            })?;

        let (params, synthesized) = match explicit {
            Some(spec) => (Some(spec.clone()), false),
            None => {
                let spec = self.policy.default_parameters(&name, key);
                if let Some(spec) = &spec {
                    debug!(algorithm = %name, key = key.algorithm(), ?spec, "synthesized default parameters");
                }
                (spec.clone(), spec.is_some())
            }
        };

        Ok(Resolved {
            engine,
            name,
            params,
            synthesized,
        })
    }
}

fn init_error(name: &CanonicalAlgorithmName, key: &dyn Key, synthesized: bool, source: ProviderError) -> Error {
    match source {
        ProviderError::InvalidKey(_) => Error::InvalidKeyForAlgorithm {
            algorithm: name.to_string(),
            key_algorithm: key.algorithm().to_string(),
            source,
        },
        ProviderError::InvalidParameter(_) => {
            warn!(algorithm = %name, synthesized, error = %source, "engine rejected parameters");
            Error::InvalidAlgorithmParameter {
                algorithm: name.to_string(),
                synthesized,
                source,
            }
        }
        other => failure(name, "initializing", other),
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use sigalg_key::{EcCurve, EcKey, Ed25519Key, HashAlgorithm, PrivateKey, RsaKey};

    use super::*;
    use crate::{
        params::{EcParams, MaskGenAlgorithm, RsaPssParams},
        policy::KeySizePolicy,
        provider::BuiltinProvider,
    };

    /// Always proposes PSS parameters the engine refuses
    struct MismatchedMgfPolicy;

    impl ParameterPolicy for MismatchedMgfPolicy {
        fn default_parameters(&self, _algorithm: &CanonicalAlgorithmName, _key: &dyn Key) -> Option<ParameterSpec> {
            Some(ParameterSpec::RsaPss(RsaPssParams {
                mask_gen: MaskGenAlgorithm::Mgf1(HashAlgorithm::Sha1),
                ..RsaPssParams::with_hash(HashAlgorithm::Sha256)
            }))
        }
    }

    fn rsa_key() -> PrivateKey {
        RsaKey::generate(1024).unwrap().into()
    }

    #[test]
    fn test_pss_defaults_are_synthesized() {
        let provider = BuiltinProvider::new();
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(&provider, &policy);
        let key = rsa_key();

        let op = binder.from_key(&key, "RSASSA-PSS").unwrap();
        assert!(op.is_synthesized());
        assert_eq!(
            op.parameter_spec(),
            Some(&ParameterSpec::RsaPss(RsaPssParams::with_hash(HashAlgorithm::Sha256)))
        );
        assert!(op.parameters().unwrap().is_some());
    }

    #[test]
    fn test_pss_sign_then_verify() {
        let provider = BuiltinProvider::new();
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(&provider, &policy);
        let key = rsa_key();

        let rng = StdRng::seed_from_u64(7);
        let mut signer = binder
            .sign(&key, "1.2.840.113549.1.1.10", None, Some(Box::new(rng)))
            .unwrap();
        assert_eq!(signer.name().as_str(), "RSASSA-PSS");
        let signature = signer.sign_message(b"to be signed").unwrap();

        let public = key.public_key();
        let mut verifier = binder.verify(&public, "RSASSA-PSS", None).unwrap();
        assert!(verifier.verify_message(b"to be signed", &signature).unwrap());

        let mut verifier = binder.verify(&public, "RSASSA-PSS", None).unwrap();
        assert!(!verifier.verify_message(b"something else", &signature).unwrap());
    }

    #[test]
    fn test_every_builtin_engine_round_trips() {
        let provider = BuiltinProvider::new();
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(&provider, &policy);

        let rsa = rsa_key();
        let p256: PrivateKey = EcKey::generate(EcCurve::P256).into();
        let p384: PrivateKey = EcKey::generate(EcCurve::P384).into();
        let ed: PrivateKey = Ed25519Key::generate().into();

        let cases: [(&PrivateKey, &str); 7] = [
            (&rsa, "SHA256withRSA"),
            (&rsa, "SHA512withRSA"),
            (&p256, "SHA256withECDSA"),
            (&p256, "SHA512withECDSA"),
            (&p384, "SHA384withECDSA"),
            (&ed, "Ed25519"),
            (&ed, "EdDSA"),
        ];

        for (key, designator) in cases {
            let mut signer = binder.from_key(key, designator).unwrap();
            assert!(!signer.is_synthesized(), "{designator}");
            let signature = signer.sign_message(b"message").unwrap();

            let public = key.public_key();
            let mut verifier = binder.verify(&public, designator, None).unwrap();
            assert!(verifier.verify_message(b"message", &signature).unwrap(), "{designator}");
        }
    }

    #[test]
    fn test_incompatible_key_is_not_substituted() {
        let provider = BuiltinProvider::new();
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(&provider, &policy);
        let ec: PrivateKey = EcKey::generate(EcCurve::P256).into();

        for designator in ["SHA256withRSA", "RSASSA-PSS", "Ed25519"] {
            let err = binder.from_key(&ec, designator).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidKeyForAlgorithm { key_algorithm, .. } if key_algorithm == "EC"),
                "{designator}: {err}"
            );
        }

        // a public key cannot sign
        let public = ec.public_key();
        let err = binder.from_key(&public, "SHA256withECDSA").unwrap_err();
        assert!(matches!(err, Error::InvalidKeyForAlgorithm { .. }));
    }

    #[test]
    fn test_explicit_parameter_rejection_surfaces() {
        let provider = BuiltinProvider::new();
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(&provider, &policy);
        let ec: PrivateKey = EcKey::generate(EcCurve::P256).into();

        let p384 = ParameterSpec::Ec(EcParams::NamedCurve(EcCurve::P384.oid()));
        let err = binder.sign(&ec, "SHA256withECDSA", Some(&p384), None).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidAlgorithmParameter {
                synthesized: false,
                ..
            }
        ));

        let p256 = ParameterSpec::Ec(EcParams::NamedCurve(EcCurve::P256.oid()));
        let op = binder.sign(&ec, "SHA256withECDSA", Some(&p256), None).unwrap();
        assert!(!op.is_synthesized());
    }

    #[test]
    fn test_synthesized_parameters_do_not_mask_rejection() {
        let provider = BuiltinProvider::new();
        let binder = SignatureBinder::new(&provider, &MismatchedMgfPolicy);
        let key = rsa_key();

        let err = binder.from_key(&key, "RSASSA-PSS").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidAlgorithmParameter {
                synthesized: true,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_designator() {
        let provider = BuiltinProvider::new();
        let policy = KeySizePolicy::default();
        let binder = SignatureBinder::new(&provider, &policy);
        let key = rsa_key();

        for designator in ["MD5withRSA", "1.2.3.4", "Ed448"] {
            let err = binder.from_key(&key, designator).unwrap_err();
            assert!(matches!(err, Error::UnknownAlgorithm { .. }), "{designator}: {err}");
        }
    }
}
