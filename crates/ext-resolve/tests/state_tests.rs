//! State transitions across activation, rescans and upgrades.

use std::sync::Arc;

use ext_resolve::{ExtensionsState, ResolveError, UpgradeOutcome, available_upgrades, upgrade};
use ext_test_utils::{ExtensionBuilder, catalogue, ext, id};
use pretty_assertions::assert_eq;

fn render(state: &ExtensionsState) -> String {
    state
        .layers()
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let ids: Vec<_> = layer.iter().map(ToString::to_string).collect();
            format!("{i}: {}", ids.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn game() -> ext_meta::Catalogue {
    catalogue(vec![
        ext("framework", "1.0.0"),
        ExtensionBuilder::new("ai", "1.0.0").depends_on("framework ^1").build(),
        ExtensionBuilder::new("maps", "1.2.0").depends_on("framework >= 1.0.0").build(),
        ExtensionBuilder::new("campaign", "0.3.0")
            .depends_on("ai")
            .depends_on("maps ^1.1")
            .build(),
        ExtensionBuilder::new("sounds", "2.0.0").build(),
    ])
}

#[test]
fn test_layers_snapshot() {
    let state = ExtensionsState::new(game())
        .activate(&id("campaign@0.3.0"))
        .unwrap()
        .activate(&id("sounds@2.0.0"))
        .unwrap();

    insta::assert_snapshot!(render(&state), @r"
    0: framework@1.0.0 sounds@2.0.0
    1: ai@1.0.0 maps@1.2.0
    2: campaign@0.3.0
    ");
}

#[test]
fn test_cycle_blocks_activation() {
    let cat = catalogue(vec![
        ExtensionBuilder::new("a", "1.0.0").depends_on("b").build(),
        ExtensionBuilder::new("b", "1.0.0").depends_on("a").build(),
    ]);
    let err = ExtensionsState::new(cat).activate(&id("a@1.0.0")).unwrap_err();
    match err {
        ResolveError::CyclicDependency { cycles } => {
            assert_eq!(cycles, vec![vec![id("a@1.0.0"), id("b@1.0.0")]]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_dependency_blocks_activation() {
    let cat = catalogue(vec![ExtensionBuilder::new("a", "1.0.0").depends_on("ghost ^1").build()]);
    let err = ExtensionsState::new(cat).activate(&id("a@1.0.0")).unwrap_err();
    assert_eq!(err.to_string(), "'a@1.0.0' requires ghost ^1, which is not installed");
}

#[test]
fn test_rescan_then_upgrade() {
    let state = ExtensionsState::new(game()).activate(&id("campaign@0.3.0")).unwrap();

    let rescanned = game()
        .with(ExtensionBuilder::new("maps", "1.4.0").depends_on("framework ^1").build())
        .unwrap()
        .with(ExtensionBuilder::new("maps", "2.0.0").depends_on("framework ^1").build())
        .unwrap();
    let state = Arc::new(state.with_installed(rescanned).unwrap());

    // Rescanning alone never changes versions.
    assert!(state.is_active(&id("maps@1.2.0")));

    let candidates = available_upgrades(&state);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].newer, vec![id("maps@2.0.0"), id("maps@1.4.0")]);

    match upgrade(&state) {
        UpgradeOutcome::Upgraded { state: next, applied } => {
            assert_eq!(applied.len(), 1);
            assert_eq!(applied[0].to, id("maps@1.4.0"));
            assert!(next.is_active(&id("maps@1.4.0")));
            assert!(!Arc::ptr_eq(&next, &state));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
