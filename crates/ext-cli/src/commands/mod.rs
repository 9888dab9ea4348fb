//! Command implementations for ext-cli

pub mod check;
pub mod config;
pub mod host;
pub mod list;
pub mod order;
pub mod transition;
pub mod upgrade;

pub use check::{run_check, run_set, run_unset};
pub use config::run_config;
pub use host::run_host;
pub use list::run_list;
pub use order::run_order;
pub use transition::{run_activate, run_deactivate};
pub use upgrade::run_upgrade;

use serde::Serialize;

use crate::error::Result;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
