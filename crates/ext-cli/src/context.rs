//! Paths the CLI works against, and loading the current session from them.

use std::path::PathBuf;
use std::sync::Arc;

use ext_config::UserConfiguration;
use ext_meta::Catalogue;
use ext_resolve::ExtensionsState;

use crate::error::Result;
use crate::profile::Profile;

#[derive(Debug, Clone)]
pub struct CliContext {
    pub extensions_dir: PathBuf,
    pub profile_path: PathBuf,
}

/// The resolved state of the profile together with its user values.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: Arc<ExtensionsState>,
    pub user: UserConfiguration,
}

impl CliContext {
    pub fn new(extensions_dir: PathBuf, profile_path: PathBuf) -> Self {
        Self {
            extensions_dir,
            profile_path,
        }
    }

    pub fn catalogue(&self) -> Result<Catalogue> {
        Ok(Catalogue::load_dir(&self.extensions_dir)?)
    }

    /// Load the catalogue and resolve the profile's load order against it.
    ///
    /// Load-order entries that are no longer installed are skipped with a
    /// warning.
    pub fn load(&self) -> Result<Session> {
        let installed = self.catalogue()?;
        let profile = Profile::load(&self.profile_path)?;

        let (explicit, missing): (Vec<_>, Vec<_>) = profile
            .explicit()?
            .into_iter()
            .partition(|id| installed.contains(id));
        for id in &missing {
            tracing::warn!(extension = %id, "Profile entry is not installed");
        }

        let state = ExtensionsState::from_explicit(installed, &explicit)?;
        tracing::debug!(active = state.active().len(), "Loaded session");
        Ok(Session {
            state: Arc::new(state),
            user: profile.values,
        })
    }

    pub fn save(&self, state: &ExtensionsState, user: UserConfiguration) -> Result<()> {
        Profile::from_parts(state.explicitly_activated(), user).save(&self.profile_path)
    }
}
