//! EC domain parameters (RFC 3279, SEC 1)
//!
//! ```text
//! ECParameters ::= CHOICE {
//!     namedCurve         OBJECT IDENTIFIER,
//!     specifiedCurve     SpecifiedECDomain,
//!     implicitCurve      NULL
//! }
//! ```
//!
//! `implicitCurve` names no domain at all and is rejected.

use const_oid::ObjectIdentifier;
use der::{
    asn1::{Any, BitString, OctetString, Uint},
    Decode, Encode, Sequence, Tag,
};

pub const PRIME_FIELD: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.1.1");
pub const CHARACTERISTIC_TWO_FIELD: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.1.2");

/// Typed EC parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EcParams {
    NamedCurve(ObjectIdentifier),
    Explicit(ExplicitCurve),
}

/// Underlying field of an explicit curve
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// Big-endian prime modulus
    Prime(Vec<u8>),
    /// DER of the `Characteristic-two` parameters, kept opaque
    CharacteristicTwo(Vec<u8>),
}

/// A fully specified curve domain
///
/// Integers are unsigned big-endian without leading zeros.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplicitCurve {
    pub version: u8,
    pub field: FieldType,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
    pub seed: Option<Vec<u8>>,
    /// Encoded base point
    pub base: Vec<u8>,
    pub order: Vec<u8>,
    pub cofactor: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct FieldId {
    field_type: ObjectIdentifier,
    parameters: Any,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct CurveAsn1 {
    a: OctetString,
    b: OctetString,
    seed: Option<BitString>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct SpecifiedEcDomain {
    version: u8,
    field_id: FieldId,
    curve: CurveAsn1,
    base: OctetString,
    order: Uint,
    cofactor: Option<Uint>,
}

impl EcParams {
    pub fn from_der(bytes: &[u8]) -> der::Result<Self> {
        match bytes.first().copied() {
            Some(0x06) => Ok(EcParams::NamedCurve(ObjectIdentifier::from_der(bytes)?)),
            Some(0x30) => {
                let domain = SpecifiedEcDomain::from_der(bytes)?;
                Ok(EcParams::Explicit(ExplicitCurve::try_from(domain)?))
            }
            Some(0x05) => Err(Tag::Null.value_error()),
            _ => Err(Tag::Sequence.value_error()),
        }
    }

    pub fn to_der(&self) -> der::Result<Vec<u8>> {
        match self {
            EcParams::NamedCurve(oid) => oid.to_der(),
            EcParams::Explicit(curve) => SpecifiedEcDomain::try_from(curve)?.to_der(),
        }
    }

    pub fn named_curve(&self) -> Option<&ObjectIdentifier> {
        match self {
            EcParams::NamedCurve(oid) => Some(oid),
            EcParams::Explicit(_) => None,
        }
    }
}

impl TryFrom<SpecifiedEcDomain> for ExplicitCurve {
    type Error = der::Error;

    fn try_from(domain: SpecifiedEcDomain) -> der::Result<Self> {
        let field = if domain.field_id.field_type == PRIME_FIELD {
            let prime = Uint::from_der(&domain.field_id.parameters.to_der()?)?;
            FieldType::Prime(prime.as_bytes().to_vec())
        } else if domain.field_id.field_type == CHARACTERISTIC_TWO_FIELD {
            FieldType::CharacteristicTwo(domain.field_id.parameters.to_der()?)
        } else {
            return Err(Tag::ObjectIdentifier.value_error());
        };

        let seed = domain
            .curve
            .seed
            .as_ref()
            .map(|bits| bits.as_bytes().map(<[u8]>::to_vec).ok_or_else(|| Tag::BitString.value_error()))
            .transpose()?;

        Ok(Self {
            version: domain.version,
            field,
            a: domain.curve.a.as_bytes().to_vec(),
            b: domain.curve.b.as_bytes().to_vec(),
            seed,
            base: domain.base.as_bytes().to_vec(),
            order: domain.order.as_bytes().to_vec(),
            cofactor: domain.cofactor.map(|c| c.as_bytes().to_vec()),
        })
    }
}

impl TryFrom<&ExplicitCurve> for SpecifiedEcDomain {
    type Error = der::Error;

    fn try_from(curve: &ExplicitCurve) -> der::Result<Self> {
        let field_id = match &curve.field {
            FieldType::Prime(p) => FieldId {
                field_type: PRIME_FIELD,
                parameters: Any::from_der(&Uint::new(p)?.to_der()?)?,
            },
            FieldType::CharacteristicTwo(params) => FieldId {
                field_type: CHARACTERISTIC_TWO_FIELD,
                parameters: Any::from_der(params)?,
            },
        };

        Ok(Self {
            version: curve.version,
            field_id,
            curve: CurveAsn1 {
                a: OctetString::new(curve.a.clone())?,
                b: OctetString::new(curve.b.clone())?,
                seed: curve.seed.as_deref().map(BitString::from_bytes).transpose()?,
            },
            base: OctetString::new(curve.base.clone())?,
            order: Uint::new(&curve.order)?,
            cofactor: curve.cofactor.as_deref().map(Uint::new).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Explicit secp256r1 domain, cofactor 1, with seed
    fn explicit_p256() -> ExplicitCurve {
        ExplicitCurve {
            version: 1,
            field: FieldType::Prime(
                hex::decode("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff")
                    .unwrap(),
            ),
            a: hex::decode("ffffffff00000001000000000000000000000000fffffffffffffffffffffffc")
                .unwrap(),
            b: hex::decode("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b")
                .unwrap(),
            seed: Some(hex::decode("c49d360886e704936a6678e1139d26b7819f7e90").unwrap()),
            base: hex::decode(concat!(
                "046b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
                "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"
            ))
            .unwrap(),
            order: hex::decode("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551")
                .unwrap(),
            cofactor: Some(vec![1]),
        }
    }

    #[test]
    fn test_named_curve_round_trip() {
        let der = hex::decode("06082a8648ce3d030107").unwrap();
        let params = EcParams::from_der(&der).unwrap();
        assert_eq!(
            params.named_curve().map(|oid| oid.to_string()).as_deref(),
            Some("1.2.840.10045.3.1.7")
        );
        assert_eq!(params.to_der().unwrap(), der);
    }

    #[test]
    fn test_explicit_curve_round_trip() {
        let params = EcParams::Explicit(explicit_p256());
        let der = params.to_der().unwrap();
        assert_eq!(der[0], 0x30);

        let decoded = EcParams::from_der(&der).unwrap();
        assert_eq!(decoded, params);
        assert_eq!(decoded.to_der().unwrap(), der);
        assert!(decoded.named_curve().is_none());
    }

    #[test]
    fn test_explicit_curve_without_optionals() {
        let mut curve = explicit_p256();
        curve.seed = None;
        curve.cofactor = None;
        let der = EcParams::Explicit(curve.clone()).to_der().unwrap();
        assert_eq!(EcParams::from_der(&der).unwrap(), EcParams::Explicit(curve));
    }

    #[test]
    fn test_rejects_implicit_and_garbage() {
        assert!(EcParams::from_der(&[0x05, 0x00]).is_err());
        assert!(EcParams::from_der(&[]).is_err());
        assert!(EcParams::from_der(&[0x04, 0x01, 0x00]).is_err());
        assert!(EcParams::from_der(&[0x06, 0x05, 0x2a]).is_err());
    }
}
