//! Error types for ext-config

/// Result type for ext-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ext-config operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value was refused by a blocking verdict
    #[error("illegal value for '{url}': {reason} (by {by})")]
    IllegalValue { url: String, reason: String, by: String },

    /// No active extension defines the url
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// The stored user configuration could not be parsed
    #[error("failed to parse user configuration: {0}")]
    UserConfigParse(#[from] toml::de::Error),

    /// The user configuration could not be written out
    #[error("failed to serialize user configuration: {0}")]
    UserConfigSerialize(#[from] toml::ser::Error),

    // Transparent wrappers for underlying crate errors
    /// Metadata error from ext-meta
    #[error(transparent)]
    Meta(#[from] ext_meta::Error),

    /// Resolution error from ext-resolve
    #[error(transparent)]
    Resolve(#[from] ext_resolve::ResolveError),
}
