//! Upgrade command

use colored::Colorize;
use ext_config::TransitionPreview;
use ext_resolve::{UpgradeOutcome, available_upgrades, upgrade};

use super::transition::finish;
use crate::context::CliContext;
use crate::error::{CliError, Result};

/// Run the upgrade command
pub fn run_upgrade(ctx: &CliContext, apply: bool, json: bool) -> Result<()> {
    let session = ctx.load()?;

    if !json {
        let candidates = available_upgrades(&session.state);
        println!("{}", "Newer Versions".bold());
        println!();
        if candidates.is_empty() {
            println!("  {}", "None installed".dimmed());
        }
        for candidate in &candidates {
            let newer: Vec<_> = candidate.newer.iter().map(|id| id.version.to_string()).collect();
            println!("  {} {}", candidate.current.to_string().cyan(), newer.join(", ").dimmed());
        }
        println!();
    }

    match upgrade(&session.state) {
        UpgradeOutcome::Unchanged { .. } => {
            if json {
                let active: Vec<String> = session.state.active_ids().iter().map(ToString::to_string).collect();
                super::print_json(&serde_json::json!({ "applied": [], "active": active }))?;
            } else {
                println!("{} Nothing to upgrade.", "=>".blue().bold());
            }
            Ok(())
        }
        UpgradeOutcome::Rejected { reason, .. } => Err(CliError::Resolve(reason)),
        UpgradeOutcome::Upgraded { state, applied } => {
            if !json {
                println!("{}", "Upgrades".bold());
                for proposal in &applied {
                    println!("  {} {}", "^".green(), proposal);
                }
                println!();
            }
            let preview = TransitionPreview::new(state, &session.user);
            finish(ctx, &session.state, preview, apply, json)
        }
    }
}
