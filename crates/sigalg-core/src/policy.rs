//! Default parameter synthesis
//!
//! When a caller binds an operation without explicit parameters the binder
//! asks a [`ParameterPolicy`] for them.

use sigalg_key::{key::rsa::public_modulus_len, HashAlgorithm, Key, PrivateKey, PublicKey};

use crate::{
    name::CanonicalAlgorithmName,
    params::{ParameterSpec, RsaPssParams, RSASSA_PSS},
    settings::PssSettings,
};

/// Chooses parameters for an algorithm and key when none were given
pub trait ParameterPolicy: Send + Sync {
    fn default_parameters(&self, algorithm: &CanonicalAlgorithmName, key: &dyn Key) -> Option<ParameterSpec>;
}

/// Sizes the RSASSA-PSS digest to the RSA modulus
///
/// MGF1 uses the same digest, the salt is as long as the digest and the
/// trailer field is 1. Every other algorithm gets no parameters.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeySizePolicy {
    thresholds: PssSettings,
}

impl KeySizePolicy {
    pub fn new(thresholds: PssSettings) -> Self {
        Self { thresholds }
    }

    pub fn digest_for_modulus(&self, bits: usize) -> HashAlgorithm {
        if bits <= self.thresholds.sha256_max_bits {
            HashAlgorithm::Sha256
        } else if bits <= self.thresholds.sha384_max_bits {
            HashAlgorithm::Sha384
        } else {
            HashAlgorithm::Sha512
        }
    }
}

fn rsa_modulus_bits(key: &dyn Key) -> Option<usize> {
    let any = key.as_any();
    if let Some(PrivateKey::Rsa(rsa)) = any.downcast_ref::<PrivateKey>() {
        return Some(rsa.size_bits());
    }
    if let Some(PublicKey::Rsa(rsa)) = any.downcast_ref::<PublicKey>() {
        return Some(public_modulus_len(rsa) * 8);
    }
    None
}

impl ParameterPolicy for KeySizePolicy {
    fn default_parameters(&self, algorithm: &CanonicalAlgorithmName, key: &dyn Key) -> Option<ParameterSpec> {
        if *algorithm != RSASSA_PSS {
            return None;
        }
        // a non-RSA key gets nothing here and is rejected by the engine
        let bits = rsa_modulus_bits(key)?;
        Some(ParameterSpec::RsaPss(RsaPssParams::with_hash(
            self.digest_for_modulus(bits),
        )))
    }
}
