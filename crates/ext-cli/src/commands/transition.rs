//! Activate and deactivate commands

use std::sync::Arc;

use colored::Colorize;
use ext_config::{ConfigLoss, LossReason, PermissionStatus, TransitionPreview};
use ext_meta::ExtensionId;
use ext_resolve::ExtensionsState;
use serde::Serialize;

use super::print_json;
use crate::context::CliContext;
use crate::error::Result;

/// What a transition would change, as printed with `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct PreviewReport<'a> {
    added: Vec<String>,
    removed: Vec<String>,
    active: Vec<String>,
    #[serde(flatten)]
    loss: &'a ConfigLoss,
    applied: bool,
}

impl<'a> PreviewReport<'a> {
    pub(crate) fn new(before: &ExtensionsState, preview: &'a TransitionPreview, applied: bool) -> Self {
        let before_ids = before.active_ids();
        let after_ids = preview.state.active_ids();
        Self {
            added: difference(&after_ids, &before_ids),
            removed: difference(&before_ids, &after_ids),
            active: after_ids.iter().map(ToString::to_string).collect(),
            loss: &preview.loss,
            applied,
        }
    }

    pub(crate) fn print(&self) {
        for id in &self.added {
            println!("  {} {}", "+".green(), id.cyan());
        }
        for id in &self.removed {
            println!("  {} {}", "-".red(), id);
        }
        if self.added.is_empty() && self.removed.is_empty() {
            println!("  {}", "No change to the active set".dimmed());
        }

        let warnings: Vec<_> = self
            .loss
            .retained
            .iter()
            .filter(|e| e.verdict.status == PermissionStatus::Warning)
            .collect();
        if !warnings.is_empty() {
            println!();
            println!("{}:", "Warnings".yellow().bold());
            for entry in warnings {
                println!("  {} {} = {}: {}", "!".yellow(), entry.url, entry.value, entry.verdict.reason);
            }
        }

        if !self.loss.lost.is_empty() {
            println!();
            println!("{}:", "User values that would be dropped".red().bold());
            for entry in &self.loss.lost {
                let reason = match &entry.reason {
                    LossReason::NoLongerDefined => entry.reason.to_string(),
                    LossReason::Rejected(verdict) => format!("{} (by {})", verdict.reason, verdict.by),
                };
                println!("  {} {} = {}: {}", "x".red(), entry.url, entry.value, reason.dimmed());
            }
        }

        println!();
        if self.applied {
            println!("{} Profile updated.", "=>".blue().bold());
        } else {
            println!("{} Preview only. Re-run with {} to write the profile.", "=>".blue().bold(), "--apply".cyan());
        }
    }
}

fn difference(a: &[ExtensionId], b: &[ExtensionId]) -> Vec<String> {
    a.iter().filter(|id| !b.contains(id)).map(ToString::to_string).collect()
}

/// Show `preview` against `before` and write it to the profile when `apply`.
pub(crate) fn finish(ctx: &CliContext, before: &ExtensionsState, preview: TransitionPreview, apply: bool, json: bool) -> Result<()> {
    let report = PreviewReport::new(before, &preview, apply);
    if json {
        print_json(&report)?;
    } else {
        report.print();
    }

    if apply {
        let (state, user) = preview.commit();
        ctx.save(&state, user)?;
    }
    Ok(())
}

/// Run the activate command
pub fn run_activate(ctx: &CliContext, id: &str, apply: bool, json: bool) -> Result<()> {
    let id: ExtensionId = id.parse()?;
    let session = ctx.load()?;
    let next = session.state.activate(&id)?;

    if !json {
        println!("{} {}", "Activate".bold(), id.to_string().cyan());
        println!();
    }
    let preview = TransitionPreview::new(Arc::new(next), &session.user);
    finish(ctx, &session.state, preview, apply, json)
}

/// Run the deactivate command
pub fn run_deactivate(ctx: &CliContext, id: &str, apply: bool, json: bool) -> Result<()> {
    let id: ExtensionId = id.parse()?;
    let session = ctx.load()?;
    let next = session.state.deactivate(&id)?;

    if !json {
        println!("{} {}", "Deactivate".bold(), id.to_string().cyan());
        println!();
    }
    let preview = TransitionPreview::new(Arc::new(next), &session.user);
    finish(ctx, &session.state, preview, apply, json)
}
