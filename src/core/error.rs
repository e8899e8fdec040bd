use thiserror::Error;

#[derive(Error, Debug)]
pub enum AclError {
    #[error("Out of memory: could not grow rule storage to {requested} bytes or slots")]
    OutOfMemory { requested: usize },

    #[error("Duplicate entry in access control list: {0}")]
    DuplicateRule(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<toml::de::Error> for AclError {
    fn from(err: toml::de::Error) -> Self {
        AclError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AclError {
    fn from(err: toml::ser::Error) -> Self {
        AclError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AclError>;
