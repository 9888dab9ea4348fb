//! Check, set and unset user values

use colored::{ColoredString, Colorize};
use ext_config::{Error as ConfigError, PermissionStatus, PermissionVerdict, check_value};
use ext_meta::ConfigValue;

use super::print_json;
use crate::context::{CliContext, Session};
use crate::error::{CliError, Result};

fn parse(session: &Session, url: &str, raw: &str) -> Result<ConfigValue> {
    let spec = session
        .state
        .option(url)
        .ok_or_else(|| ConfigError::UnknownOption(url.to_string()))?;
    Ok(spec.kind.parse_value(raw)?)
}

fn status_label(status: PermissionStatus) -> ColoredString {
    match status {
        PermissionStatus::Ok => "ok".green().bold(),
        PermissionStatus::Warning => "warning".yellow().bold(),
        PermissionStatus::Illegal => "illegal".red().bold(),
        PermissionStatus::Error => "error".red().bold(),
    }
}

fn print_verdict(url: &str, value: &ConfigValue, verdict: &PermissionVerdict) {
    if verdict.is_ok() {
        println!("{} {} = {}", status_label(verdict.status), url, value);
    } else {
        println!(
            "{} {} = {}: {} {}",
            status_label(verdict.status),
            url,
            value,
            verdict.reason,
            format!("(by {})", verdict.by).dimmed()
        );
    }
}

/// Run the check command
pub fn run_check(ctx: &CliContext, url: &str, raw: &str, json: bool) -> Result<()> {
    let session = ctx.load()?;
    let value = parse(&session, url, raw)?;
    let verdict = check_value(&session.state, url, &value)?;

    if json {
        return print_json(&verdict);
    }
    print_verdict(url, &value, &verdict);
    Ok(())
}

/// Run the set command
pub fn run_set(ctx: &CliContext, url: &str, raw: &str) -> Result<()> {
    let mut session = ctx.load()?;
    let value = parse(&session, url, raw)?;
    let verdict = session.user.set_checked(&session.state, url, value.clone())?;

    print_verdict(url, &value, &verdict);
    ctx.save(&session.state, session.user)
}

/// Run the unset command
pub fn run_unset(ctx: &CliContext, url: &str) -> Result<()> {
    let mut session = ctx.load()?;
    if session.user.remove(url).is_none() {
        return Err(CliError::user(format!("no user value set for '{url}'")));
    }
    println!("{} Removed {}", "=>".blue().bold(), url.cyan());
    ctx.save(&session.state, session.user)
}
