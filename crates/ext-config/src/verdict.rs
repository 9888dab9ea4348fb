//! The outcome of checking one candidate value.

use std::fmt;

use serde::Serialize;

/// Attribution used when the option declaration itself refuses a value.
pub const SPEC_AUTHORITY: &str = "spec";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Ok,
    /// A suggestion is not met. Never blocks.
    Warning,
    /// A requirement or hard bound is violated.
    Illegal,
    /// The value or a demand does not fit the option's type.
    Error,
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Illegal => "illegal",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A status with the reason and the extension (or [`SPEC_AUTHORITY`]) that
/// decided it. `reason` and `by` are empty for [`PermissionStatus::Ok`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionVerdict {
    pub status: PermissionStatus,
    pub reason: String,
    pub by: String,
}

impl PermissionVerdict {
    pub fn ok() -> Self {
        Self {
            status: PermissionStatus::Ok,
            reason: String::new(),
            by: String::new(),
        }
    }

    pub fn warning(reason: impl Into<String>, by: impl Into<String>) -> Self {
        Self::with(PermissionStatus::Warning, reason, by)
    }

    pub fn illegal(reason: impl Into<String>, by: impl Into<String>) -> Self {
        Self::with(PermissionStatus::Illegal, reason, by)
    }

    pub fn error(reason: impl Into<String>, by: impl Into<String>) -> Self {
        Self::with(PermissionStatus::Error, reason, by)
    }

    fn with(status: PermissionStatus, reason: impl Into<String>, by: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            by: by.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == PermissionStatus::Ok
    }

    /// `Illegal` and `Error` verdicts block a value; warnings do not.
    pub fn is_blocking(&self) -> bool {
        matches!(self.status, PermissionStatus::Illegal | PermissionStatus::Error)
    }
}

impl fmt::Display for PermissionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("ok");
        }
        write!(f, "{}: {} (by {})", self.status, self.reason, self.by)
    }
}
