//! End-to-end integration test for the full pipeline
//!
//! Manifests on disk -> catalogue -> activation -> derived configuration ->
//! config-loss preview -> commit.

use std::sync::Arc;

use ext_config::{DerivedStatus, LossReason, PermissionStatus, TransitionPreview, UserConfiguration, check_value};
use ext_meta::{Catalogue, ConfigValue, Error as MetaError};
use ext_resolve::{ExtensionsState, UpgradeOutcome, upgrade};
use ext_test_utils::{TestExtensionsDir, id};
use pretty_assertions::assert_eq;

const CORE: &str = r#"
[extension]
name = "core"
version = "1.0.0"
description = "Shared settings"

[[options]]
url = "core.difficulty"
type = "choice"
default = "normal"
choices = ["easy", "normal", "hard"]
"#;

const GRAPHICS_1: &str = r#"
[extension]
name = "graphics"
version = "1.0.0"
dependencies = ["core ^1"]

[[options]]
url = "graphics.resolution"
type = "number"
default = 50
min = 0
max = 100

[[options]]
url = "graphics.layers"
type = "set"
default = ["terrain"]
choices = ["terrain", "water", "fog"]
"#;

const GRAPHICS_1_1: &str = r#"
[extension]
name = "graphics"
version = "1.1.0"
dependencies = ["core ^1"]

[[options]]
url = "graphics.resolution"
type = "number"
default = 60
min = 0
max = 70

[[options]]
url = "graphics.layers"
type = "set"
default = ["terrain"]
choices = ["terrain", "water", "fog"]
"#;

const CAMPAIGN: &str = r#"
[extension]
name = "campaign"
version = "0.3.0"
dependencies = ["graphics >= 1.0.0", { name = "core", version = "^1" }]

[config."graphics.layers"]
required-values = ["water"]

[config."core.difficulty"]
suggested-value = "hard"
"#;

fn setup() -> TestExtensionsDir {
    let dir = TestExtensionsDir::new();
    dir.add_manifest("core", CORE);
    dir.add_manifest("graphics-1.0.0", GRAPHICS_1);
    dir.add_manifest("campaign", CAMPAIGN);
    dir
}

#[test]
fn test_full_pipeline() {
    let dir = setup();
    let installed = Catalogue::load_dir(&dir.extensions_dir()).unwrap();
    assert_eq!(installed.len(), 3);

    // Activation pulls in the dependency closure in order.
    let state = ExtensionsState::new(installed).activate(&id("campaign@0.3.0")).unwrap();
    let ids: Vec<_> = state.active_ids().iter().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["core@1.0.0", "graphics@1.0.0", "campaign@0.3.0"]);

    // Demands from campaign apply to options defined by its dependencies.
    let layers = |items: Vec<&str>| ConfigValue::from(items);
    let verdict = check_value(&state, "graphics.layers", &layers(vec!["terrain"])).unwrap();
    assert_eq!(verdict.status, PermissionStatus::Illegal);
    assert_eq!(verdict.by, "campaign");
    assert!(check_value(&state, "graphics.layers", &layers(vec!["water", "fog"])).unwrap().is_ok());

    let verdict = check_value(&state, "graphics.layers", &layers(vec!["water", "lava"])).unwrap();
    assert_eq!((verdict.status, verdict.by.as_str()), (PermissionStatus::Illegal, "spec"));

    let verdict = check_value(&state, "core.difficulty", &ConfigValue::from("easy")).unwrap();
    assert_eq!(verdict.status, PermissionStatus::Warning);

    // The user picks values; the preview keeps them all.
    let mut user = UserConfiguration::new();
    user.set_checked(&state, "graphics.resolution", ConfigValue::from(75)).unwrap();
    user.set_checked(&state, "graphics.layers", layers(vec!["water"])).unwrap();
    user.set_checked(&state, "core.difficulty", ConfigValue::from("easy")).unwrap();

    let preview = TransitionPreview::new(Arc::new(state), &user);
    assert!(preview.loss.is_lossless());
    assert_eq!(preview.derived.status(), DerivedStatus::Clean);
    assert_eq!(preview.derived.values["core.difficulty"], ConfigValue::from("hard"));
    let effective = user.effective_values(&preview.derived);
    assert_eq!(effective["core.difficulty"], ConfigValue::from("easy"));
    let (state, user) = preview.commit();

    // A rescan brings graphics 1.1.0, whose tighter bound drops the resolution.
    dir.add_manifest("graphics-1.1.0", GRAPHICS_1_1);
    let rescanned = Catalogue::load_dir(&dir.extensions_dir()).unwrap();
    let state = Arc::new(state.with_installed(rescanned).unwrap());
    assert!(state.is_active(&id("graphics@1.0.0")));

    let UpgradeOutcome::Upgraded { state: next, applied } = upgrade(&state) else {
        panic!("expected an upgrade");
    };
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].to_string(), "graphics@1.0.0 -> 1.1.0");

    let preview = TransitionPreview::new(next, &user);
    assert_eq!(preview.loss.lost.len(), 1);
    assert_eq!(preview.loss.lost[0].url, "graphics.resolution");
    match &preview.loss.lost[0].reason {
        LossReason::Rejected(verdict) => assert_eq!(verdict.reason, "value (75) too high (70)"),
        other => panic!("unexpected reason: {other}"),
    }
    let (_, user) = preview.commit();
    assert_eq!(user.len(), 2);
}

#[test]
fn test_duplicate_option_url_fails_at_load() {
    let dir = setup();
    dir.add_manifest(
        "copycat",
        "[extension]\nname = \"copycat\"\nversion = \"1.0.0\"\n\n[[options]]\nurl = \"core.difficulty\"\ntype = \"boolean\"\ndefault = false\n",
    );
    let err = Catalogue::load_dir(&dir.extensions_dir()).unwrap_err();
    assert!(matches!(err, MetaError::DuplicateOptionUrl { .. }), "got {err}");
}
