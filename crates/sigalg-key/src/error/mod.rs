use thiserror::Error;

/// Errors raised by key handling and raw signature primitives
#[derive(Error, Debug)]
pub enum Error {
    /// Key generation or key-material errors
    #[error("Key error: {0}")]
    KeyError(String),

    /// Signing primitive failed
    #[error("Signature error: {0}")]
    SignatureError(String),

    /// Key import failed
    #[error("Import error: {0}")]
    ImportError(String),

    /// Key export failed
    #[error("Export error: {0}")]
    ExportError(String),

    #[error("PKCS8 error: {0}")]
    Pkcs8Error(#[from] pkcs8::Error),

    #[error("SPKI error: {0}")]
    SpkiError(#[from] pkcs8::spki::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
