//! List installed extensions

use colored::Colorize;
use serde::Serialize;

use super::print_json;
use crate::context::CliContext;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ListEntry {
    id: String,
    kind: ext_meta::ExtensionKind,
    active: bool,
    explicit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Run the list command
pub fn run_list(ctx: &CliContext, json: bool) -> Result<()> {
    let session = ctx.load()?;
    let state = &session.state;

    let entries: Vec<ListEntry> = state
        .installed()
        .iter()
        .map(|ext| {
            let id = ext.id();
            ListEntry {
                active: state.is_active(&id),
                explicit: state.is_explicit(&id),
                id: id.to_string(),
                kind: ext.kind,
                description: ext.description.clone(),
            }
        })
        .collect();

    if json {
        return print_json(&entries);
    }

    println!("{}", "Installed Extensions".bold());
    println!();

    if entries.is_empty() {
        println!("  {} (in {})", "None".dimmed(), ctx.extensions_dir.display());
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.explicit {
            "*".green().bold()
        } else if entry.active {
            "+".green()
        } else {
            " ".normal()
        };
        let id = if entry.active { entry.id.cyan() } else { entry.id.normal() };
        match &entry.description {
            Some(description) => println!("  {marker} {id:<28} {}", description.dimmed()),
            None => println!("  {marker} {id}"),
        }
    }

    let active = entries.iter().filter(|e| e.active).count();
    println!();
    println!(
        "{} {} installed, {} active ({} explicit, {} dependency).",
        "Total:".dimmed(),
        entries.len(),
        active,
        "*".green().bold(),
        "+".green()
    );
    Ok(())
}
