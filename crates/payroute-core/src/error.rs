/// Core configuration and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid fee amount {amount:?}: {reason}")]
    InvalidFee { amount: String, reason: String },

    #[error("invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("amount overflow while computing {0}")]
    Overflow(&'static str),

    #[error("unknown blockchain: {0}")]
    UnknownBlockchain(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
