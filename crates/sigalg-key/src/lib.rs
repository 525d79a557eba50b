//! Key objects for sigalg.
//!
//! Private and public keys for RSA, EC (P-256, P-384) and Ed25519, the
//! digest algorithms used by signature schemes, and the raw signing and
//! verification primitives the built-in provider drives.

pub mod error;
pub mod hash;
pub mod key;

pub use error::{Error, Result};
pub use rsa::RsaPublicKey;
pub use hash::{hash_data, HashAlgorithm};
pub use key::{
    util::{
        load_key_file, load_private_key_from_pkcs8_der, load_private_key_from_pkcs8_pem,
        load_public_key_from_spki_der, load_public_key_from_spki_pem,
    },
    EcCurve, EcKey, EcPublicKey, Ed25519Key, Ed25519PublicKey, Key, PrivateKey, PublicKey,
    RsaKey,
};
