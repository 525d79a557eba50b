use thiserror::Error;

use crate::{name::AlgorithmFamily, provider::ProviderError};

/// Errors raised while resolving signature algorithms and their parameters
#[derive(Error, Debug)]
pub enum Error {
    /// The designator does not resolve to any algorithm the provider knows
    #[error("Unknown signature algorithm: {designator}")]
    UnknownAlgorithm {
        designator: String,
        #[source]
        source: Option<ProviderError>,
    },

    /// The name resolved but carries neither the RSA nor the ECDSA marker
    #[error("Unrecognized algorithm for signature parameters: {algorithm}")]
    UnsupportedAlgorithmFamily { algorithm: String },

    /// Parameter bytes (or a parameter object) do not decode for the family
    #[error("Malformed {family} parameters for {algorithm}: {reason}")]
    MalformedParameters {
        algorithm: String,
        family: AlgorithmFamily,
        reason: String,
        #[source]
        source: Option<ProviderError>,
    },

    /// The key cannot be used with the requested algorithm
    #[error("{key_algorithm} key is not valid for {algorithm}")]
    InvalidKeyForAlgorithm {
        algorithm: String,
        key_algorithm: String,
        #[source]
        source: ProviderError,
    },

    /// The engine rejected the parameters it was initialized with
    #[error("{algorithm} rejected its parameters (synthesized: {synthesized})")]
    InvalidAlgorithmParameter {
        algorithm: String,
        synthesized: bool,
        #[source]
        source: ProviderError,
    },

    /// No algorithm identifier can be built for the operation
    #[error("Cannot derive AlgorithmIdentifier for {algorithm} with {key_algorithm} key")]
    IdentifierDerivationFailed {
        algorithm: String,
        key_algorithm: String,
    },

    /// A provider call failed in a way no other variant describes
    #[error("Provider failure while {context}: {source}")]
    ProviderFailure {
        context: String,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
