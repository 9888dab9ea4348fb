//! Behavioural scenarios across resolution, upgrades and configuration.

use std::sync::Arc;

use ext_config::{PermissionStatus, TransitionPreview, UserConfiguration, analyze_config_loss, check_value};
use ext_meta::{Catalogue, ConfigValue};
use ext_resolve::{ExtensionsState, ResolveError, UpgradeOutcome, select_upgrades, upgrade};
use ext_test_utils::{ExtensionBuilder, catalogue, ext, id};
use pretty_assertions::assert_eq;

fn ids(state: &ExtensionsState) -> Vec<String> {
    state.active_ids().iter().map(ToString::to_string).collect()
}

// =============================================================================
// Dependency resolution and upgrades
// =============================================================================

#[test]
fn test_breaking_major_is_not_proposed() {
    let b = ExtensionBuilder::new("b", "1.0.0").depends_on("a ^1.0.0").build();
    let installed = catalogue(vec![ext("a", "1.0.0"), b.clone()]);
    let state = ExtensionsState::from_explicit(installed, &[id("a@1.0.0"), id("b@1.0.0")]).unwrap();
    assert_eq!(ids(&state), vec!["a@1.0.0", "b@1.0.0"]);

    let rescanned = catalogue(vec![ext("a", "1.0.0"), ext("a", "2.0.0"), b]);
    let state = Arc::new(state.with_installed(rescanned).unwrap());
    assert!(select_upgrades(&state).is_empty());

    let outcome = upgrade(&state);
    assert!(matches!(outcome, UpgradeOutcome::Unchanged { .. }));
    assert!(Arc::ptr_eq(outcome.state(), &state));
    assert_eq!(ids(outcome.state()), vec!["a@1.0.0", "b@1.0.0"]);
}

#[test]
fn test_cycle_names_every_member() {
    let installed = catalogue(vec![
        ExtensionBuilder::new("a", "1.0.0").depends_on("c").build(),
        ExtensionBuilder::new("b", "1.0.0").depends_on("a").build(),
        ExtensionBuilder::new("c", "1.0.0").depends_on("b").build(),
        ExtensionBuilder::new("d", "1.0.0").depends_on("a").build(),
    ]);
    let err = ExtensionsState::from_explicit(installed, &[id("d@1.0.0")]).unwrap_err();
    let ResolveError::CyclicDependency { cycles } = err else {
        panic!("expected a cycle, got {err}");
    };
    assert_eq!(cycles, vec![vec![id("a@1.0.0"), id("b@1.0.0"), id("c@1.0.0")]]);
}

#[test]
fn test_rejected_upgrade_keeps_state() {
    let installed = catalogue(vec![
        ext("a", "1.0.0"),
        ExtensionBuilder::new("a", "1.1.0").depends_on("missing ^1").build(),
    ]);
    let state = Arc::new(ExtensionsState::from_explicit(installed, &[id("a@1.0.0")]).unwrap());
    let outcome = upgrade(&state);
    assert!(matches!(outcome, UpgradeOutcome::Rejected { .. }));
    assert!(Arc::ptr_eq(outcome.state(), &state));
}

// =============================================================================
// Value permissions
// =============================================================================

/// `x` is in [0, 100]; `p` requires 50 and `q` suggests 10.
fn permission_catalogue() -> Catalogue {
    catalogue(vec![
        ExtensionBuilder::new("base", "1.0.0")
            .number_option("x", 0.0, Some(0.0), Some(100.0))
            .build(),
        ExtensionBuilder::new("p", "1.0.0").depends_on("base").requires_value("x", 50).build(),
        ExtensionBuilder::new("q", "1.0.0").depends_on("base").suggests_value("x", 10).build(),
    ])
}

#[test]
fn test_requirement_and_suggestion() {
    let state = ExtensionsState::from_explicit(permission_catalogue(), &[id("p@1.0.0"), id("q@1.0.0")]).unwrap();

    let verdict = check_value(&state, "x", &ConfigValue::from(70)).unwrap();
    assert_eq!((verdict.status, verdict.by.as_str()), (PermissionStatus::Illegal, "p"));
    assert!(check_value(&state, "x", &ConfigValue::from(50)).unwrap().is_ok());

    let state = state.deactivate(&id("p@1.0.0")).unwrap();
    assert!(check_value(&state, "x", &ConfigValue::from(10)).unwrap().is_ok());
    let verdict = check_value(&state, "x", &ConfigValue::from(20)).unwrap();
    assert_eq!((verdict.status, verdict.by.as_str()), (PermissionStatus::Warning, "q"));
}

// =============================================================================
// Config loss
// =============================================================================

#[test]
fn test_lost_entry_is_not_resurrected() {
    let installed = permission_catalogue();
    let mut user = UserConfiguration::new();
    user.set("x", ConfigValue::from(70));

    let with_q = ExtensionsState::from_explicit(installed.clone(), &[id("q@1.0.0")]).unwrap();
    assert!(analyze_config_loss(&user, &with_q).is_lossless());

    // Activating p makes 70 illegal; committing drops it.
    let with_p = with_q.activate(&id("p@1.0.0")).unwrap();
    let preview = TransitionPreview::new(Arc::new(with_p), &user);
    assert_eq!(preview.loss.lost.len(), 1);
    let (with_p, user) = preview.commit();

    // Leaving and re-entering the same set never brings 70 back.
    let without_p = with_p.deactivate(&id("p@1.0.0")).unwrap();
    let (_, user) = TransitionPreview::new(Arc::new(without_p), &user).commit();
    let again = ExtensionsState::from_explicit(installed, with_p.explicitly_activated()).unwrap();
    let loss = analyze_config_loss(&user, &again);
    assert!(loss.lost.is_empty());
    assert!(loss.retained.is_empty());
    assert!(user.get("x").is_none());
}
