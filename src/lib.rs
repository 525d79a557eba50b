//! # sigalg
//!
//! Signature algorithm resolution
//!
//! ## Crates
//!
//! - `sigalg_key` - key objects and signing primitives
//! - `sigalg_core` - names, parameters, operation binding, identifiers

pub use sigalg_core;
pub use sigalg_key;
