use std::path::PathBuf;

/// Errors that can occur while loading and validating extensions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse extension manifest TOML.
    #[error("failed to parse extension manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    /// Extension manifest file not found at the expected path.
    #[error("extension manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// A manifest on disk failed to load.
    #[error("{path}: {source}")]
    InManifest {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A version string that is not valid semver.
    #[error("unparsable version '{raw}': {source}")]
    UnparsableVersion {
        raw: String,
        source: semver::Error,
    },

    /// A version range that cannot be parsed.
    #[error("invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    /// Invalid extension name.
    #[error("invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A dependency statement that cannot be parsed.
    #[error("invalid dependency '{statement}' in extension '{extension}': {reason}")]
    InvalidDependency {
        extension: String,
        statement: String,
        reason: String,
    },

    /// An option declaration whose payload is inconsistent.
    #[error("invalid option '{url}': {reason}")]
    InvalidOption { url: String, reason: String },

    /// A raw string that cannot be read as a value of the option's type.
    #[error("'{raw}' is not a valid {expected} value")]
    InvalidValue { raw: String, expected: &'static str },

    /// A configuration demand whose payload is inconsistent.
    #[error("invalid demand on '{url}' in extension '{extension}': {reason}")]
    InvalidDemand {
        extension: String,
        url: String,
        reason: String,
    },

    /// Two option declarations share the same url.
    #[error("duplicate option url '{url}' declared by '{first}' and '{second}'")]
    DuplicateOptionUrl {
        url: String,
        first: String,
        second: String,
    },

    /// The same extension identity was loaded twice.
    #[error("duplicate extension '{0}'")]
    DuplicateExtension(String),

    /// I/O error reading extension files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
