use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("listing enumeration failed for provider {provider}: {message}")]
    Listing { provider: String, message: String },

    #[error("failed to fetch listing {id}: {message}")]
    Fetch { id: String, message: String },

    #[error("failed to read from collection {collection}: {message}")]
    StoreRead { collection: String, message: String },

    #[error("failed to write listing {id}: {message}")]
    StoreWrite { id: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidConfigValue { field: String, reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, CollectorError>;
