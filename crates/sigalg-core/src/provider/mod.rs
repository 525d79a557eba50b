//! Provider seam
//!
//! A [`Provider`] hands out [`SignatureEngine`]s by name or OID, builds
//! parameter objects from DER, decodes curve parameters and maps names to
//! object identifiers. [`BuiltinProvider`] implements it on RustCrypto;
//! [`Registry`] chains several providers.

mod builtin;
mod engine;
mod registry;

use const_oid::ObjectIdentifier;
use rand::{CryptoRng, RngCore};
use sigalg_key::Key;
use thiserror::Error;

pub use self::{builtin::BuiltinProvider, registry::Registry};
use crate::params::{AlgorithmParameters, EcParams, ParameterSpec};

/// Errors reported by providers and their engines
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No such algorithm: {0}")]
    NoSuchAlgorithm(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The engine does not implement the requested capability
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Engine not initialized for {0}")]
    NotInitialized(&'static str),

    #[error("Signature error: {0}")]
    Signature(#[from] sigalg_key::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] der::Error),

    #[error("{0}")]
    Other(String),
}

/// Randomness source accepted by signing engines
pub trait SecureRandom: RngCore + CryptoRng + Send {}

impl<T: RngCore + CryptoRng + Send> SecureRandom for T {}

/// A signature engine in the style of a streaming sign/verify object
///
/// Engines are initialized once for signing or verification, fed with
/// [`update`](Self::update) and finished with [`sign`](Self::sign) or
/// [`verify`](Self::verify), which reset the buffered message.
pub trait SignatureEngine: Send {
    /// Name the engine reports, which may be a generic label such as `EdDSA`
    fn algorithm(&self) -> &str;

    fn init_sign(
        &mut self,
        key: &dyn Key,
        params: Option<&ParameterSpec>,
        rng: Option<Box<dyn SecureRandom>>,
    ) -> Result<(), ProviderError>;

    fn init_verify(&mut self, key: &dyn Key, params: Option<&ParameterSpec>) -> Result<(), ProviderError>;

    fn update(&mut self, data: &[u8]) -> Result<(), ProviderError>;

    fn sign(&mut self) -> Result<Vec<u8>, ProviderError>;

    fn verify(&mut self, signature: &[u8]) -> Result<bool, ProviderError>;

    /// Parameters in effect
    ///
    /// `Ok(None)` means the algorithm has no parameters;
    /// [`ProviderError::Unsupported`] means the engine cannot report them.
    fn parameters(&self) -> Result<Option<AlgorithmParameters>, ProviderError>;
}

/// A source of signature engines and algorithm metadata
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Engine for a standard name or dotted OID
    fn signature(&self, algorithm: &str) -> Result<Box<dyn SignatureEngine>, ProviderError>;

    /// Parameter object for `algorithm` initialized from DER
    fn parameters(&self, algorithm: &str, der: &[u8]) -> Result<AlgorithmParameters, ProviderError>;

    /// Curve parameter decoder. Reports failure as `None`.
    fn ec_parameter_spec(&self, der: &[u8]) -> Option<EcParams>;

    /// Object identifier of a signature algorithm name
    fn algorithm_oid(&self, name: &str) -> Option<ObjectIdentifier>;
}
