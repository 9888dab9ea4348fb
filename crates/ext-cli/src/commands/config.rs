//! Show derived and effective configuration

use std::collections::BTreeMap;

use colored::Colorize;
use ext_config::{DerivedConfiguration, DerivedStatus, derive_configuration};
use ext_meta::ConfigValue;
use serde::Serialize;

use super::print_json;
use crate::context::CliContext;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    status: DerivedStatus,
    effective: BTreeMap<String, ConfigValue>,
    derived: &'a DerivedConfiguration,
}

/// Run the config command
pub fn run_config(ctx: &CliContext, json: bool) -> Result<()> {
    let session = ctx.load()?;
    let derived = derive_configuration(session.state.active());
    let effective = session.user.effective_values(&derived);

    if json {
        return print_json(&ConfigReport {
            status: derived.status(),
            effective,
            derived: &derived,
        });
    }

    println!("{}", "Configuration".bold());
    println!();
    if effective.is_empty() {
        println!("  {}", "No options defined by active extensions".dimmed());
    }
    for (url, value) in &effective {
        let source = if session.user.contains(url) {
            "user".green().to_string()
        } else if let Some(lock) = derived.locks.get(url) {
            format!("required by {}", lock.by).red().to_string()
        } else if let Some(suggestion) = derived.suggestions.get(url) {
            format!("suggested by {}", suggestion.by).yellow().to_string()
        } else {
            "default".dimmed().to_string()
        };
        println!("  {:<32} {:<16} {}", url, value.to_string(), source);
    }

    if !derived.overrides.is_empty() {
        println!();
        println!("{}:", "Overrides".yellow().bold());
        for o in &derived.overrides {
            println!("  {} {}", "!".yellow(), o);
        }
    }
    if !derived.conflicts.is_empty() {
        println!();
        println!("{}:", "Conflicts".red().bold());
        for c in &derived.conflicts {
            println!("  {} {}", "x".red(), c);
        }
    }

    let orphaned: Vec<_> = session.user.iter().filter(|(url, _)| !effective.contains_key(*url)).collect();
    if !orphaned.is_empty() {
        println!();
        println!("{}:", "User values for undefined options".dimmed());
        for (url, value) in orphaned {
            println!("  {url} = {value}");
        }
    }
    Ok(())
}
