//! Check active extensions against the host versions

use colored::Colorize;
use ext_meta::{HostComponent, parse_version};
use ext_resolve::{HostCheckState, HostVersions, check_active_host};
use serde::Serialize;

use super::print_json;
use crate::context::CliContext;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct HostEntry {
    extension: String,
    component: HostComponent,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Run the host command
///
/// An unknown framework version turns its checks into warnings.
pub fn run_host(ctx: &CliContext, framework: Option<&str>, frontend: &str, json: bool) -> Result<()> {
    let mut host = HostVersions::new().with(HostComponent::Frontend, parse_version(frontend)?);
    if let Some(framework) = framework {
        host = host.with(HostComponent::Framework, parse_version(framework)?);
    }

    let session = ctx.load()?;
    let checks = check_active_host(&session.state, &host);

    if json {
        let entries: Vec<HostEntry> = checks
            .iter()
            .map(|check| HostEntry {
                extension: check.extension.to_string(),
                component: check.component,
                range: check.range.as_ref().map(ToString::to_string),
                version: check.version.as_ref().map(ToString::to_string),
                state: check.state.to_string(),
                message: check.message.clone(),
            })
            .collect();
        return print_json(&entries);
    }

    println!("{}", "Host Requirements".bold());
    println!();
    if checks.is_empty() {
        println!("  {} (use {} to add)", "Nothing active".dimmed(), "extm activate".cyan());
        return Ok(());
    }

    for check in &checks {
        let state = match check.state {
            HostCheckState::Success => "ok".green(),
            HostCheckState::Warning => "warning".yellow(),
            HostCheckState::Failed => "failed".red().bold(),
        };
        let range = check.range.as_ref().map_or("*", |r| r.as_str());
        print!(
            "  {state:<8} {:<24} {:<10} {range}",
            check.extension.to_string().cyan(),
            check.component.as_str()
        );
        match &check.message {
            Some(message) => println!("  {}", message.dimmed()),
            None => println!(),
        }
    }

    let failed = checks.iter().filter(|c| c.is_failed()).count();
    println!();
    if failed == 0 {
        println!("{} every declared host range is met.", "Done:".green().bold());
    } else {
        println!("{} {failed} host range(s) not met.", "Warning:".yellow().bold());
    }
    Ok(())
}
