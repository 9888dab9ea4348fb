//! [`TestExtensionsDir`] for tests that read extensions from disk.

use std::fs;
use std::path::{Path, PathBuf};

use ext_meta::MANIFEST_FILENAME;
use tempfile::TempDir;

/// A temporary directory holding an `extensions/` tree and a profile.
///
/// # Example
///
/// ```rust
/// use ext_test_utils::TestExtensionsDir;
///
/// let dir = TestExtensionsDir::new();
/// dir.add_manifest("core", "[extension]\nname = \"core\"\nversion = \"1.0.0\"\n");
/// dir.write_profile("load-order = [\"core@1.0.0\"]\n");
/// assert!(dir.profile_path().exists());
/// ```
pub struct TestExtensionsDir {
    temp_dir: TempDir,
}

impl Default for TestExtensionsDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExtensionsDir {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("extensions")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.root().join("extensions")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root().join("profile.toml")
    }

    /// Write `extensions/<dir>/extension.toml`.
    pub fn add_manifest(&self, dir: &str, content: &str) {
        let path = self.extensions_dir().join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MANIFEST_FILENAME), content).unwrap();
    }

    /// Write a minimal manifest with dependency statements.
    pub fn add_simple(&self, name: &str, version: &str, dependencies: &[&str]) {
        let deps = dependencies
            .iter()
            .map(|d| format!("\"{d}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.add_manifest(
            &format!("{name}-{version}"),
            &format!("[extension]\nname = \"{name}\"\nversion = \"{version}\"\ndependencies = [{deps}]\n"),
        );
    }

    pub fn write_profile(&self, content: &str) {
        fs::write(self.profile_path(), content).unwrap();
    }

    pub fn read_profile(&self) -> String {
        fs::read_to_string(self.profile_path()).unwrap()
    }
}
