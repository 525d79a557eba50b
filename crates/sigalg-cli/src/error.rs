use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Key error: {0}")]
    Key(#[from] sigalg_key::Error),

    #[error("{0}")]
    Resolution(#[from] sigalg_core::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] der::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Signature does not verify")]
    SignatureMismatch,
}

pub type CliResult<T> = Result<T, CliError>;
