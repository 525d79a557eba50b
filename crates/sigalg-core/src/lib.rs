//! Signature algorithm resolution.
//!
//! Turns user-supplied algorithm designators into canonical names, decodes
//! algorithm parameter bytes into structured specifications, binds signing
//! and verification operations to keys through a [`Provider`], and derives
//! the `AlgorithmIdentifier` to embed in signed structures.

pub mod binder;
pub mod error;
pub mod identifier;
pub mod name;
pub mod params;
pub mod policy;
pub mod provider;
pub mod settings;

pub use binder::{SignatureBinder, SigningOperation, VerificationOperation};
pub use error::{Error, Result};
pub use identifier::{derive, AlgorithmIdentifier};
pub use name::{normalize, AlgorithmFamily, CanonicalAlgorithmName};
pub use params::{
    decode, decode_structured, AlgorithmParameters, EcParams, ParameterSpec, RsaPssParams,
};
pub use policy::{KeySizePolicy, ParameterPolicy};
pub use provider::{BuiltinProvider, Provider, ProviderError, Registry, SecureRandom, SignatureEngine};
pub use settings::{PssSettings, Settings};
