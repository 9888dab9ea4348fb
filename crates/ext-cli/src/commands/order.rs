//! Show activation layers

use colored::Colorize;

use super::print_json;
use crate::context::CliContext;
use crate::error::Result;

/// Run the order command
pub fn run_order(ctx: &CliContext, json: bool) -> Result<()> {
    let session = ctx.load()?;
    let layers: Vec<Vec<String>> = session
        .state
        .layers()
        .iter()
        .map(|layer| layer.iter().map(ToString::to_string).collect())
        .collect();

    if json {
        return print_json(&layers);
    }

    println!("{}", "Activation Order".bold());
    println!();
    if layers.is_empty() {
        println!("  {} (use {} to add)", "Nothing active".dimmed(), "extm activate".cyan());
        return Ok(());
    }
    for (i, layer) in layers.iter().enumerate() {
        println!("  {} {}", format!("{i:>2}").dimmed(), layer.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ext_test_utils::TestExtensionsDir;

    #[test]
    fn test_order_runs() {
        let dir = TestExtensionsDir::new();
        dir.add_simple("core", "1.0.0", &[]);
        dir.add_simple("maps", "1.0.0", &["core"]);
        dir.write_profile("load-order = [\"maps@1.0.0\"]\n");
        let ctx = CliContext::new(dir.extensions_dir(), dir.profile_path());
        assert!(run_order(&ctx, false).is_ok());
    }

    #[test]
    fn test_order_fails_on_cycle() {
        let dir = TestExtensionsDir::new();
        dir.add_simple("a", "1.0.0", &["b"]);
        dir.add_simple("b", "1.0.0", &["a"]);
        dir.write_profile("load-order = [\"a@1.0.0\"]\n");
        let ctx = CliContext::new(dir.extensions_dir(), dir.profile_path());
        let err = run_order(&ctx, false).unwrap_err();
        assert!(err.to_string().starts_with("cyclic dependency"));
    }
}
