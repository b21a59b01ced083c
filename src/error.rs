use thiserror::Error;

/// Failures of the persisted key/value backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Stored value is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Problems loading the TOML config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("Error parsing config {0}: {1}")]
    Parse(String, #[source] toml::de::Error),
    #[error("Error writing default config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// User-visible ledger failures. Every variant is recoverable: the caller
/// reports the message and re-presents the form.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please enter a valid amount")]
    InvalidAmount,
    #[error("Invalid PIN")]
    InvalidPin,
    #[error("PIN must be exactly 4 digits")]
    InvalidPinFormat,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("PINs do not match. Please try again.")]
    PinMismatch,
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Unknown role: {0}")]
    InvalidRole(String),
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Not permitted for role {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Input error: {0}")]
    Input(#[from] std::io::Error),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(StorageError::Serialization(err))
    }
}
