//! RustCrypto-backed signature engines
//!
//! Every engine buffers the message and hashes it on `sign`/`verify`, then
//! drives the raw primitives of `sigalg-key`.

use rand::rngs::OsRng;
use sigalg_key::{
    hash_data,
    key::rsa::{public_modulus_len, verify_pkcs1v15, verify_pss},
    EcKey, EcPublicKey, Ed25519Key, Ed25519PublicKey, HashAlgorithm, Key, PrivateKey, PublicKey,
    RsaKey, RsaPublicKey,
};
use tracing::debug;

use super::{ProviderError, SecureRandom, SignatureEngine};
use crate::params::{AlgorithmParameters, EcParams, ParameterSpec, RsaPssParams, RSASSA_PSS};

const TRAILER_FIELD_BC: u32 = 1;

enum Mode<S, V> {
    Idle,
    Sign(S),
    Verify(V),
}

fn private_key<'a>(key: &'a dyn Key, algorithm: &str) -> Result<&'a PrivateKey, ProviderError> {
    key.as_any().downcast_ref::<PrivateKey>().ok_or_else(|| {
        ProviderError::InvalidKey(format!(
            "{algorithm} signing needs a private key, got {} {}",
            key.algorithm(),
            if key.is_private() { "private key" } else { "public key" }
        ))
    })
}

fn public_key<'a>(key: &'a dyn Key, algorithm: &str) -> Result<&'a PublicKey, ProviderError> {
    key.as_any().downcast_ref::<PublicKey>().ok_or_else(|| {
        ProviderError::InvalidKey(format!(
            "{algorithm} verification needs a public key, got {}",
            key.algorithm()
        ))
    })
}

fn wrong_key(algorithm: &str, key: &dyn Key) -> ProviderError {
    ProviderError::InvalidKey(format!("{} key cannot be used with {algorithm}", key.algorithm()))
}

fn no_parameters(algorithm: &str, params: Option<&ParameterSpec>) -> Result<(), ProviderError> {
    match params {
        None => Ok(()),
        Some(spec) => Err(ProviderError::InvalidParameter(format!(
            "{algorithm} takes no parameters, got {} parameters",
            spec.family()
        ))),
    }
}

// ============================================================================
// RSA PKCS#1 v1.5
// ============================================================================

pub(crate) struct RsaPkcs1Engine {
    name: &'static str,
    hash: HashAlgorithm,
    mode: Mode<RsaKey, RsaPublicKey>,
    buffer: Vec<u8>,
}

impl RsaPkcs1Engine {
    pub(crate) fn new(name: &'static str, hash: HashAlgorithm) -> Self {
        Self {
            name,
            hash,
            mode: Mode::Idle,
            buffer: Vec::new(),
        }
    }
}

impl SignatureEngine for RsaPkcs1Engine {
    fn algorithm(&self) -> &str {
        self.name
    }

    fn init_sign(
        &mut self,
        key: &dyn Key,
        params: Option<&ParameterSpec>,
        _rng: Option<Box<dyn SecureRandom>>,
    ) -> Result<(), ProviderError> {
        let PrivateKey::Rsa(rsa) = private_key(key, self.name)? else {
            return Err(wrong_key(self.name, key));
        };
        no_parameters(self.name, params)?;
        self.mode = Mode::Sign(rsa.clone());
        self.buffer.clear();
        Ok(())
    }

    fn init_verify(&mut self, key: &dyn Key, params: Option<&ParameterSpec>) -> Result<(), ProviderError> {
        let PublicKey::Rsa(rsa) = public_key(key, self.name)? else {
            return Err(wrong_key(self.name, key));
        };
        no_parameters(self.name, params)?;
        self.mode = Mode::Verify(rsa.clone());
        self.buffer.clear();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        if let Mode::Idle = self.mode {
            return Err(ProviderError::NotInitialized(self.name));
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn sign(&mut self) -> Result<Vec<u8>, ProviderError> {
        let Mode::Sign(key) = &self.mode else {
            return Err(ProviderError::NotInitialized(self.name));
        };
        let digest = hash_data(&std::mem::take(&mut self.buffer), self.hash);
        Ok(key.sign_pkcs1v15(self.hash, &digest)?)
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError> {
        let Mode::Verify(key) = &self.mode else {
            return Err(ProviderError::NotInitialized(self.name));
        };
        let digest = hash_data(&std::mem::take(&mut self.buffer), self.hash);
        Ok(verify_pkcs1v15(key, self.hash, &digest, signature))
    }

    fn parameters(&self) -> Result<Option<AlgorithmParameters>, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "{} does not report parameters",
            self.name
        )))
    }
}

// ============================================================================
// RSASSA-PSS
// ============================================================================

pub(crate) struct RsaPssEngine {
    params: Option<RsaPssParams>,
    mode: Mode<(RsaKey, Box<dyn SecureRandom>), RsaPublicKey>,
    buffer: Vec<u8>,
}

impl RsaPssEngine {
    pub(crate) fn new() -> Self {
        Self {
            params: None,
            mode: Mode::Idle,
            buffer: Vec::new(),
        }
    }

    fn check_params(params: Option<&ParameterSpec>, modulus_len: usize) -> Result<RsaPssParams, ProviderError> {
        let params = match params {
            Some(ParameterSpec::RsaPss(params)) => *params,
            Some(other) => {
                return Err(ProviderError::InvalidParameter(format!(
                    "{RSASSA_PSS} needs PSS parameters, got {} parameters",
                    other.family()
                )))
            }
            None => {
                return Err(ProviderError::InvalidParameter(format!(
                    "{RSASSA_PSS} needs explicit parameters"
                )))
            }
        };

        if params.mask_gen.hash() != params.hash {
            return Err(ProviderError::InvalidParameter(format!(
                "MGF1 digest {} differs from message digest {}",
                params.mask_gen.hash(),
                params.hash
            )));
        }
        if params.trailer_field != TRAILER_FIELD_BC {
            return Err(ProviderError::InvalidParameter(format!(
                "unsupported trailer field {}",
                params.trailer_field
            )));
        }

        let needed = params.hash.output_len() + params.salt_length as usize + 2;
        if modulus_len < needed {
            return Err(ProviderError::InvalidKey(format!(
                "key is too short for {} with salt {}: need {needed} bytes, have {modulus_len}",
                params.hash, params.salt_length
            )));
        }
        Ok(params)
    }
}

impl SignatureEngine for RsaPssEngine {
    fn algorithm(&self) -> &str {
        RSASSA_PSS
    }

    fn init_sign(
        &mut self,
        key: &dyn Key,
        params: Option<&ParameterSpec>,
        rng: Option<Box<dyn SecureRandom>>,
    ) -> Result<(), ProviderError> {
        let PrivateKey::Rsa(rsa) = private_key(key, RSASSA_PSS)? else {
            return Err(wrong_key(RSASSA_PSS, key));
        };
        let checked = Self::check_params(params, rsa.modulus_len())?;
        let rng = rng.unwrap_or_else(|| Box::new(OsRng));
        self.params = Some(checked);
        self.mode = Mode::Sign((rsa.clone(), rng));
        self.buffer.clear();
        Ok(())
    }

    fn init_verify(&mut self, key: &dyn Key, params: Option<&ParameterSpec>) -> Result<(), ProviderError> {
        let PublicKey::Rsa(rsa) = public_key(key, RSASSA_PSS)? else {
            return Err(wrong_key(RSASSA_PSS, key));
        };
        let checked = Self::check_params(params, public_modulus_len(rsa))?;
        self.params = Some(checked);
        self.mode = Mode::Verify(rsa.clone());
        self.buffer.clear();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        if let Mode::Idle = self.mode {
            return Err(ProviderError::NotInitialized(RSASSA_PSS));
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn sign(&mut self) -> Result<Vec<u8>, ProviderError> {
        let (Mode::Sign((key, rng)), Some(params)) = (&mut self.mode, self.params) else {
            return Err(ProviderError::NotInitialized(RSASSA_PSS));
        };
        let digest = hash_data(&std::mem::take(&mut self.buffer), params.hash);
        let mut rng: &mut dyn SecureRandom = rng.as_mut();
        Ok(key.sign_pss(&mut rng, params.hash, params.salt_length as usize, &digest)?)
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError> {
        let (Mode::Verify(key), Some(params)) = (&self.mode, self.params) else {
            return Err(ProviderError::NotInitialized(RSASSA_PSS));
        };
        let digest = hash_data(&std::mem::take(&mut self.buffer), params.hash);
        Ok(verify_pss(
            key,
            params.hash,
            params.salt_length as usize,
            &digest,
            signature,
        ))
    }

    fn parameters(&self) -> Result<Option<AlgorithmParameters>, ProviderError> {
        match self.params {
            Some(params) => Ok(Some(AlgorithmParameters::new(RSASSA_PSS, params.to_der()?))),
            None => Ok(None),
        }
    }
}

// ============================================================================
// ECDSA
// ============================================================================

pub(crate) struct EcdsaEngine {
    name: &'static str,
    hash: HashAlgorithm,
    mode: Mode<EcKey, EcPublicKey>,
    buffer: Vec<u8>,
}

impl EcdsaEngine {
    pub(crate) fn new(name: &'static str, hash: HashAlgorithm) -> Self {
        Self {
            name,
            hash,
            mode: Mode::Idle,
            buffer: Vec::new(),
        }
    }

    /// Curve parameters, when given, must name the key's own curve
    fn check_params(&self, params: Option<&ParameterSpec>, curve: sigalg_key::EcCurve) -> Result<(), ProviderError> {
        match params {
            None => Ok(()),
            Some(ParameterSpec::Ec(EcParams::NamedCurve(oid))) if *oid == curve.oid() => Ok(()),
            Some(ParameterSpec::Ec(EcParams::NamedCurve(oid))) => Err(ProviderError::InvalidParameter(
                format!("curve {oid} does not match {curve} key"),
            )),
            Some(ParameterSpec::Ec(EcParams::Explicit(_))) => Err(ProviderError::InvalidParameter(
                "explicit curve parameters are not supported".to_string(),
            )),
            Some(other) => no_parameters(self.name, Some(other)),
        }
    }
}

impl SignatureEngine for EcdsaEngine {
    fn algorithm(&self) -> &str {
        self.name
    }

    fn init_sign(
        &mut self,
        key: &dyn Key,
        params: Option<&ParameterSpec>,
        _rng: Option<Box<dyn SecureRandom>>,
    ) -> Result<(), ProviderError> {
        let PrivateKey::Ec(ec) = private_key(key, self.name)? else {
            return Err(wrong_key(self.name, key));
        };
        self.check_params(params, ec.curve())?;
        debug!(algorithm = self.name, curve = %ec.curve(), "ECDSA engine ready to sign");
        self.mode = Mode::Sign(ec.clone());
        self.buffer.clear();
        Ok(())
    }

    fn init_verify(&mut self, key: &dyn Key, params: Option<&ParameterSpec>) -> Result<(), ProviderError> {
        let PublicKey::Ec(ec) = public_key(key, self.name)? else {
            return Err(wrong_key(self.name, key));
        };
        self.check_params(params, ec.curve())?;
        self.mode = Mode::Verify(ec.clone());
        self.buffer.clear();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        if let Mode::Idle = self.mode {
            return Err(ProviderError::NotInitialized(self.name));
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn sign(&mut self) -> Result<Vec<u8>, ProviderError> {
        let Mode::Sign(key) = &self.mode else {
            return Err(ProviderError::NotInitialized(self.name));
        };
        let digest = hash_data(&std::mem::take(&mut self.buffer), self.hash);
        Ok(key.sign_prehash(&digest)?)
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError> {
        let Mode::Verify(key) = &self.mode else {
            return Err(ProviderError::NotInitialized(self.name));
        };
        let digest = hash_data(&std::mem::take(&mut self.buffer), self.hash);
        Ok(key.verify_prehash(&digest, signature))
    }

    fn parameters(&self) -> Result<Option<AlgorithmParameters>, ProviderError> {
        Ok(None)
    }
}

// ============================================================================
// EdDSA
// ============================================================================

/// Ed25519, reachable both as `Ed25519` and as the generic `EdDSA`
pub(crate) struct EdDsaEngine {
    name: &'static str,
    mode: Mode<Ed25519Key, Ed25519PublicKey>,
    buffer: Vec<u8>,
}

impl EdDsaEngine {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            mode: Mode::Idle,
            buffer: Vec::new(),
        }
    }
}

impl SignatureEngine for EdDsaEngine {
    fn algorithm(&self) -> &str {
        self.name
    }

    fn init_sign(
        &mut self,
        key: &dyn Key,
        params: Option<&ParameterSpec>,
        _rng: Option<Box<dyn SecureRandom>>,
    ) -> Result<(), ProviderError> {
        let PrivateKey::Ed25519(ed) = private_key(key, self.name)? else {
            return Err(wrong_key(self.name, key));
        };
        no_parameters(self.name, params)?;
        self.mode = Mode::Sign(ed.clone());
        self.buffer.clear();
        Ok(())
    }

    fn init_verify(&mut self, key: &dyn Key, params: Option<&ParameterSpec>) -> Result<(), ProviderError> {
        let PublicKey::Ed25519(ed) = public_key(key, self.name)? else {
            return Err(wrong_key(self.name, key));
        };
        no_parameters(self.name, params)?;
        self.mode = Mode::Verify(ed.clone());
        self.buffer.clear();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError> {
        if let Mode::Idle = self.mode {
            return Err(ProviderError::NotInitialized(self.name));
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn sign(&mut self) -> Result<Vec<u8>, ProviderError> {
        let Mode::Sign(key) = &self.mode else {
            return Err(ProviderError::NotInitialized(self.name));
        };
        Ok(key.sign(&std::mem::take(&mut self.buffer)))
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError> {
        let Mode::Verify(key) = &self.mode else {
            return Err(ProviderError::NotInitialized(self.name));
        };
        Ok(key.verify(&std::mem::take(&mut self.buffer), signature))
    }

    fn parameters(&self) -> Result<Option<AlgorithmParameters>, ProviderError> {
        Ok(None)
    }
}
