//! Signature parameter codec
//!
//! Converts between encoded parameter bytes and a typed [`ParameterSpec`] for
//! the two families that carry parameters: RSA (RSASSA-PSS) and EC. Family is
//! decided by [`AlgorithmFamily::of`]; `Unrecognized` is an error, never a
//! guess.

pub mod ec;
pub mod pss;

use tracing::{debug, warn};

pub use self::{
    ec::{EcParams, ExplicitCurve, FieldType},
    pss::{MaskGenAlgorithm, RsaPssParams},
};
use crate::{
    error::{Error, Result},
    name::{normalize, AlgorithmFamily, CanonicalAlgorithmName},
    provider::{Provider, ProviderError},
};

pub const RSASSA_PSS: &str = "RSASSA-PSS";

/// DER `NULL`, the parameter field of PKCS#1 v1.5 signature identifiers
const DER_NULL: [u8; 2] = [0x05, 0x00];

// ============================================================================
// Types
// ============================================================================

/// Typed signature parameters. Absence is `None` at the use site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterSpec {
    RsaPss(RsaPssParams),
    Ec(EcParams),
}

impl ParameterSpec {
    pub fn to_der(&self) -> der::Result<Vec<u8>> {
        match self {
            ParameterSpec::RsaPss(params) => params.to_der(),
            ParameterSpec::Ec(params) => params.to_der(),
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            ParameterSpec::RsaPss(_) => AlgorithmFamily::Rsa,
            ParameterSpec::Ec(_) => AlgorithmFamily::Ec,
        }
    }
}

impl From<RsaPssParams> for ParameterSpec {
    fn from(value: RsaPssParams) -> Self {
        ParameterSpec::RsaPss(value)
    }
}

impl From<EcParams> for ParameterSpec {
    fn from(value: EcParams) -> Self {
        ParameterSpec::Ec(value)
    }
}

/// Provider-produced parameter object
///
/// `algorithm` is the label the provider attached, which may be a dotted OID
/// when the object came out of DER decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmParameters {
    pub algorithm: String,
    pub encoded: Vec<u8>,
}

impl AlgorithmParameters {
    pub fn new(algorithm: impl Into<String>, encoded: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            encoded,
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode parameter bytes for a signature algorithm
///
/// `None` bytes mean the algorithm carries no parameters and decode to `None`.
pub fn decode(
    provider: &dyn Provider,
    sig_name: &str,
    encoded: Option<&[u8]>,
) -> Result<Option<ParameterSpec>> {
    let name = normalize(provider, sig_name)?;
    let Some(bytes) = encoded else {
        return Ok(None);
    };

    match name.family() {
        AlgorithmFamily::Rsa => {
            if bytes == DER_NULL.as_slice() {
                debug!(algorithm = %name, "NULL parameters treated as absent");
                return Ok(None);
            }
            let params = provider
                .parameters(name.as_str(), bytes)
                .map_err(|e| malformed(&name, AlgorithmFamily::Rsa, "provider rejected encoding", Some(e)))?;
            rsa_spec(&name, &params).map(Some)
        }
        AlgorithmFamily::Ec => {
            provider.signature(name.as_str()).map_err(|e| Error::UnknownAlgorithm {
                designator: name.to_string(),
                source: Some(e),
            })?;
            ec_spec(provider, &name, bytes).map(Some)
        }
        AlgorithmFamily::Unrecognized => Err(unsupported(&name)),
    }
}

/// Convert an existing parameter object into a typed spec
///
/// A parameter object labelled with a dotted OID is first re-created from its
/// encoding under the canonical signature name.
pub fn decode_structured(
    provider: &dyn Provider,
    sig_name: &str,
    params: Option<&AlgorithmParameters>,
) -> Result<Option<ParameterSpec>> {
    let name = normalize(provider, sig_name)?;
    let Some(params) = params else {
        return Ok(None);
    };

    let relabelled;
    let params = if params.algorithm.contains('.') {
        debug!(label = %params.algorithm, algorithm = %name, "re-creating OID-labelled parameters");
        relabelled = provider
            .parameters(name.as_str(), &params.encoded)
            .map_err(|e| malformed(&name, name.family(), "cannot re-create parameters", Some(e)))?;
        &relabelled
    } else {
        params
    };

    match name.family() {
        AlgorithmFamily::Rsa => rsa_spec(&name, params).map(Some),
        AlgorithmFamily::Ec => ec_spec(provider, &name, &params.encoded).map(Some),
        AlgorithmFamily::Unrecognized => Err(unsupported(&name)),
    }
}

fn rsa_spec(name: &CanonicalAlgorithmName, params: &AlgorithmParameters) -> Result<ParameterSpec> {
    if !params.algorithm.eq_ignore_ascii_case(RSASSA_PSS) {
        return Err(malformed(
            name,
            AlgorithmFamily::Rsa,
            &format!("{} parameters are not {RSASSA_PSS} parameters", params.algorithm),
            None,
        ));
    }
    RsaPssParams::from_der(&params.encoded)
        .map(ParameterSpec::RsaPss)
        .map_err(|e| malformed(name, AlgorithmFamily::Rsa, "invalid RSASSA-PSS-params", Some(e.into())))
}

fn ec_spec(provider: &dyn Provider, name: &CanonicalAlgorithmName, bytes: &[u8]) -> Result<ParameterSpec> {
    // the curve decoder swallows its errors; an empty result is a failure here
    match provider.ec_parameter_spec(bytes) {
        Some(params) => Ok(ParameterSpec::Ec(params)),
        None => Err(malformed(
            name,
            AlgorithmFamily::Ec,
            "Error handling EC parameters",
            None,
        )),
    }
}

fn malformed(
    name: &CanonicalAlgorithmName,
    family: AlgorithmFamily,
    reason: &str,
    source: Option<ProviderError>,
) -> Error {
    warn!(algorithm = %name, %family, reason, "rejected signature parameters");
    Error::MalformedParameters {
        algorithm: name.to_string(),
        family,
        reason: reason.to_string(),
        source,
    }
}

fn unsupported(name: &CanonicalAlgorithmName) -> Error {
    Error::UnsupportedAlgorithmFamily {
        algorithm: name.to_string(),
    }
}
