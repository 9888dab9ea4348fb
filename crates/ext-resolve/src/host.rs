//! Checks of the host ranges active extensions declare.
//!
//! The framework and frontend are not part of the catalogue, so their ranges
//! are never planned. They are matched against the versions the caller
//! reports for the host, and the outcome is advisory: a failed check is
//! reported but does not block activation.

use std::fmt;

use ext_meta::{Extension, ExtensionId, HostComponent, Version, VersionRange};

use crate::state::ExtensionsState;

/// Versions of the host components, where known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostVersions {
    framework: Option<Version>,
    frontend: Option<Version>,
}

impl HostVersions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: HostComponent, version: Version) -> Self {
        *self.slot(component) = Some(version);
        self
    }

    pub fn get(&self, component: HostComponent) -> Option<&Version> {
        match component {
            HostComponent::Framework => self.framework.as_ref(),
            HostComponent::Frontend => self.frontend.as_ref(),
        }
    }

    fn slot(&mut self, component: HostComponent) -> &mut Option<Version> {
        match component {
            HostComponent::Framework => &mut self.framework,
            HostComponent::Frontend => &mut self.frontend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCheckState {
    Success,
    /// Nothing could be checked: no range declared, or the host version is
    /// unknown.
    Warning,
    Failed,
}

impl fmt::Display for HostCheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failed => "failed",
        })
    }
}

/// The outcome of checking one extension against one host component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCheck {
    pub extension: ExtensionId,
    pub component: HostComponent,
    pub range: Option<VersionRange>,
    pub version: Option<Version>,
    pub state: HostCheckState,
    pub message: Option<String>,
}

impl HostCheck {
    pub fn is_failed(&self) -> bool {
        self.state == HostCheckState::Failed
    }
}

/// Check `ext` against every host component, in [`HostComponent::ALL`] order.
pub fn check_host(ext: &Extension, host: &HostVersions) -> Vec<HostCheck> {
    HostComponent::ALL
        .iter()
        .map(|&component| {
            let range = ext.host_range(component).cloned();
            let version = host.get(component).cloned();
            let (state, message) = match (&range, &version) {
                (None, _) => (HostCheckState::Warning, Some("no host range declared".to_string())),
                (Some(_), None) => (HostCheckState::Warning, Some(format!("{component} version unknown"))),
                (Some(range), Some(version)) if range.matches(version) => (HostCheckState::Success, None),
                (Some(range), Some(version)) => (
                    HostCheckState::Failed,
                    Some(format!("{component} {version} is outside {range}")),
                ),
            };
            if state == HostCheckState::Failed {
                tracing::warn!(extension = %ext, %component, "Host version outside declared range");
            }
            HostCheck {
                extension: ext.id(),
                component,
                range,
                version,
                state,
                message,
            }
        })
        .collect()
}

/// Check every active extension, in activation order.
pub fn check_active_host(state: &ExtensionsState, host: &HostVersions) -> Vec<HostCheck> {
    state.active().iter().flat_map(|ext| check_host(ext, host)).collect()
}
