//! Error types for ext-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from ext-meta
    #[error(transparent)]
    Meta(#[from] ext_meta::Error),

    /// Error from ext-resolve
    #[error(transparent)]
    Resolve(#[from] ext_resolve::ResolveError),

    /// Error from ext-config
    #[error(transparent)]
    Config(#[from] ext_config::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Profile could not be parsed
    #[error("invalid profile: {0}")]
    ProfileParse(#[from] toml::de::Error),

    /// Profile could not be written
    #[error("failed to write profile: {0}")]
    ProfileSerialize(#[from] toml::ser::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
