use thiserror::Error;

/// Errors from the TOTP core. Constructed at the boundary (engine
/// construction or generate-time timestamp validation) and propagated,
/// never silently corrected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpError {
    #[error("invalid base32 secret: {0}")]
    InvalidSecret(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Errors from the keys-file layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unable to access keys file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed keys file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unable to serialize keys file: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unable to find home directory")]
    NoHomeDir,
}
