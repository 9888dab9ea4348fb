//! Configuration engines for Extension Manager.
//!
//! - [`permission`] decides whether a value may be set for an option, given
//!   the demands of the active extensions.
//! - [`derived`] folds value demands into the configuration the active set
//!   asks for.
//! - [`loss`] classifies user-set values against the state a transition
//!   would produce.
//! - [`user`] holds the values the user set explicitly.

pub mod derived;
pub mod error;
pub mod loss;
pub mod permission;
pub mod user;
pub mod verdict;

pub use derived::{ConfigConflict, DerivedConfiguration, DerivedStatus, Override, OverrideKind, Sourced, derive_configuration};
pub use error::{Error, Result};
pub use loss::{ConfigLoss, LossReason, LostEntry, RetainedEntry, TransitionPreview, analyze_config_loss};
pub use permission::{ActiveDemand, active_demands, check_permission, check_value, ensure_permitted};
pub use user::UserConfiguration;
pub use verdict::{PermissionStatus, PermissionVerdict, SPEC_AUTHORITY};
