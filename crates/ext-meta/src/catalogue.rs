//! The validated set of installed extensions.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::extension::{Extension, ExtensionId};
use crate::manifest;
use crate::version::compare;

/// Installed extensions, sorted by `(name, version)`.
///
/// Construction rejects duplicate identities and option urls declared by
/// more than one extension name. Different versions of the same extension
/// may redeclare their own urls.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    extensions: Vec<Arc<Extension>>,
}

impl Catalogue {
    /// Build a catalogue from loaded extensions.
    pub fn new(extensions: impl IntoIterator<Item = Extension>) -> Result<Self> {
        Self::from_shared(extensions.into_iter().map(Arc::new))
    }

    /// Build a catalogue from already shared extensions.
    pub fn from_shared(extensions: impl IntoIterator<Item = Arc<Extension>>) -> Result<Self> {
        let mut extensions: Vec<_> = extensions.into_iter().collect();
        extensions.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| compare(&a.version, &b.version))
        });

        for pair in extensions.windows(2) {
            if pair[0].name == pair[1].name && pair[0].version == pair[1].version {
                return Err(Error::DuplicateExtension(pair[1].id().to_string()));
            }
        }

        check_option_urls(&extensions)?;

        tracing::debug!(count = extensions.len(), "Built extension catalogue");
        Ok(Self { extensions })
    }

    /// Scan `dir` for extension manifests and validate them as a whole.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Self::new(manifest::load_dir(dir)?)
    }

    /// A new catalogue with `extension` added.
    pub fn with(&self, extension: Extension) -> Result<Self> {
        Self::from_shared(
            self.extensions
                .iter()
                .cloned()
                .chain(std::iter::once(Arc::new(extension))),
        )
    }

    pub fn get(&self, id: &ExtensionId) -> Option<&Arc<Extension>> {
        self.extensions.iter().find(|e| e.is(id))
    }

    pub fn contains(&self, id: &ExtensionId) -> bool {
        self.get(id).is_some()
    }

    /// All installed versions of `name`, newest first.
    pub fn versions_of(&self, name: &str) -> Vec<&Arc<Extension>> {
        let mut versions: Vec<_> = self.extensions.iter().filter(|e| e.name == name).collect();
        versions.reverse();
        versions
    }

    /// Distinct extension names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.extensions
            .iter()
            .map(|e| e.name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Extension>> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

fn check_option_urls(extensions: &[Arc<Extension>]) -> Result<()> {
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for ext in extensions {
        let mut own = BTreeSet::new();
        for option in &ext.options {
            if !own.insert(option.url.as_str()) {
                return Err(Error::DuplicateOptionUrl {
                    url: option.url.clone(),
                    first: ext.id().to_string(),
                    second: ext.id().to_string(),
                });
            }
            match owners.get(option.url.as_str()) {
                Some(owner) if *owner != ext.name => {
                    return Err(Error::DuplicateOptionUrl {
                        url: option.url.clone(),
                        first: (*owner).to_string(),
                        second: ext.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(option.url.as_str(), ext.name.as_str());
                }
            }
        }
    }

    Ok(())
}
