//! RSASSA-PSS parameters (RFC 4055)
//!
//! ```text
//! RSASSA-PSS-params ::= SEQUENCE {
//!     hashAlgorithm      [0] HashAlgorithm    DEFAULT sha1,
//!     maskGenAlgorithm   [1] MaskGenAlgorithm DEFAULT mgf1SHA1,
//!     saltLength         [2] INTEGER          DEFAULT 20,
//!     trailerField       [3] TrailerField     DEFAULT trailerFieldBC
//! }
//! ```
//!
//! Fields equal to their DEFAULT are omitted on encode. Hash identifiers are
//! accepted with absent or `NULL` parameters and always written with `NULL`.

use const_oid::ObjectIdentifier;
use der::{asn1::Any, Decode, Encode, Sequence, Tag, Tagged};
use serde::{Deserialize, Serialize};
use sigalg_key::HashAlgorithm;
use spki::AlgorithmIdentifierOwned;

pub const ID_MGF_1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.8");

const DEFAULT_HASH: HashAlgorithm = HashAlgorithm::Sha1;
const DEFAULT_SALT_LENGTH: u32 = 20;
const TRAILER_FIELD_BC: u32 = 1;

/// Mask generation function of a PSS encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskGenAlgorithm {
    Mgf1(HashAlgorithm),
}

impl MaskGenAlgorithm {
    pub fn hash(&self) -> HashAlgorithm {
        match self {
            MaskGenAlgorithm::Mgf1(hash) => *hash,
        }
    }
}

/// Typed RSASSA-PSS parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RsaPssParams {
    pub hash: HashAlgorithm,
    pub mask_gen: MaskGenAlgorithm,
    pub salt_length: u32,
    pub trailer_field: u32,
}

impl Default for RsaPssParams {
    /// The all-DEFAULT value, i.e. an empty SEQUENCE
    fn default() -> Self {
        Self {
            hash: DEFAULT_HASH,
            mask_gen: MaskGenAlgorithm::Mgf1(DEFAULT_HASH),
            salt_length: DEFAULT_SALT_LENGTH,
            trailer_field: TRAILER_FIELD_BC,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct PssParamsAsn1 {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    hash_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", optional = "true")]
    mask_gen_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", optional = "true")]
    salt_length: Option<u32>,
    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", optional = "true")]
    trailer_field: Option<u32>,
}

impl RsaPssParams {
    /// Parameters with MGF1 over the message digest and a salt as long as it
    pub fn with_hash(hash: HashAlgorithm) -> Self {
        Self {
            hash,
            mask_gen: MaskGenAlgorithm::Mgf1(hash),
            salt_length: hash.output_len() as u32,
            trailer_field: TRAILER_FIELD_BC,
        }
    }

    pub fn from_der(bytes: &[u8]) -> der::Result<Self> {
        let asn1 = PssParamsAsn1::from_der(bytes)?;

        let hash = match &asn1.hash_algorithm {
            Some(id) => hash_from_identifier(id)?,
            None => DEFAULT_HASH,
        };

        let mask_gen = match &asn1.mask_gen_algorithm {
            Some(id) => {
                if id.oid != ID_MGF_1 {
                    return Err(Tag::ObjectIdentifier.value_error());
                }
                let inner = id
                    .parameters
                    .as_ref()
                    .ok_or_else(|| Tag::Sequence.value_error())?;
                let inner = AlgorithmIdentifierOwned::from_der(&inner.to_der()?)?;
                MaskGenAlgorithm::Mgf1(hash_from_identifier(&inner)?)
            }
            None => MaskGenAlgorithm::Mgf1(DEFAULT_HASH),
        };

        Ok(Self {
            hash,
            mask_gen,
            salt_length: asn1.salt_length.unwrap_or(DEFAULT_SALT_LENGTH),
            trailer_field: asn1.trailer_field.unwrap_or(TRAILER_FIELD_BC),
        })
    }

    pub fn to_der(&self) -> der::Result<Vec<u8>> {
        let hash_algorithm = (self.hash != DEFAULT_HASH)
            .then(|| hash_identifier(self.hash))
            .transpose()?;

        let mgf_hash = self.mask_gen.hash();
        let mask_gen_algorithm = if mgf_hash != DEFAULT_HASH {
            let inner = hash_identifier(mgf_hash)?;
            Some(AlgorithmIdentifierOwned {
                oid: ID_MGF_1,
                parameters: Some(Any::from_der(&inner.to_der()?)?),
            })
        } else {
            None
        };

        PssParamsAsn1 {
            hash_algorithm,
            mask_gen_algorithm,
            salt_length: (self.salt_length != DEFAULT_SALT_LENGTH).then_some(self.salt_length),
            trailer_field: (self.trailer_field != TRAILER_FIELD_BC).then_some(self.trailer_field),
        }
        .to_der()
    }
}

fn hash_from_identifier(id: &AlgorithmIdentifierOwned) -> der::Result<HashAlgorithm> {
    if let Some(params) = &id.parameters {
        if params.tag() != Tag::Null {
            return Err(Tag::Null.value_error());
        }
    }
    HashAlgorithm::from_oid(&id.oid).ok_or_else(|| Tag::ObjectIdentifier.value_error())
}

fn hash_identifier(hash: HashAlgorithm) -> der::Result<AlgorithmIdentifierOwned> {
    Ok(AlgorithmIdentifierOwned {
        oid: hash.oid(),
        parameters: Some(Any::new(Tag::Null, Vec::<u8>::new())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256, MGF1-SHA-256, salt 32
    const PSS_SHA256_SALT32: &str = "3034a00f300d06096086480165030402010500a11c301a06092a864886f70d010108300d06096086480165030402010500a203020120";

    #[test]
    fn test_decode_sha256_salt32() {
        let der = hex::decode(PSS_SHA256_SALT32).unwrap();
        let params = RsaPssParams::from_der(&der).unwrap();

        assert_eq!(params.hash, HashAlgorithm::Sha256);
        assert_eq!(params.mask_gen, MaskGenAlgorithm::Mgf1(HashAlgorithm::Sha256));
        assert_eq!(params.salt_length, 32);
        assert_eq!(params.trailer_field, 1);
    }

    #[test]
    fn test_reencode_is_byte_identical() {
        let der = hex::decode(PSS_SHA256_SALT32).unwrap();
        let params = RsaPssParams::from_der(&der).unwrap();
        assert_eq!(params.to_der().unwrap(), der);

        for hash in [HashAlgorithm::Sha384, HashAlgorithm::Sha512, HashAlgorithm::Sha224] {
            let encoded = RsaPssParams::with_hash(hash).to_der().unwrap();
            let decoded = RsaPssParams::from_der(&encoded).unwrap();
            assert_eq!(decoded, RsaPssParams::with_hash(hash));
            assert_eq!(decoded.to_der().unwrap(), encoded);
        }
    }

    #[test]
    fn test_empty_sequence_means_defaults() {
        let params = RsaPssParams::from_der(&[0x30, 0x00]).unwrap();
        assert_eq!(params, RsaPssParams::default());
        assert_eq!(params.to_der().unwrap(), vec![0x30, 0x00]);
    }

    #[test]
    fn test_absent_hash_parameters_accepted() {
        // hashAlgorithm SHA-256 without NULL, everything else default
        let der = hex::decode("3011a00f300d06096086480165030402010500").unwrap();
        let with_null = RsaPssParams::from_der(&der).unwrap();
        let der = hex::decode("300fa00d300b0609608648016503040201").unwrap();
        let without_null = RsaPssParams::from_der(&der).unwrap();
        assert_eq!(with_null, without_null);
        assert_eq!(without_null.hash, HashAlgorithm::Sha256);
        assert_eq!(without_null.salt_length, 20);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(RsaPssParams::from_der(&[]).is_err());
        assert!(RsaPssParams::from_der(&[0x05, 0x00]).is_err());
        assert!(RsaPssParams::from_der(&[0x30, 0x03, 0x02, 0x01]).is_err());
        // unknown digest OID 1.2.3.4
        let der = hex::decode("300ba009300706032a0304 0500".replace(' ', "")).unwrap();
        assert!(RsaPssParams::from_der(&der).is_err());
    }
}
