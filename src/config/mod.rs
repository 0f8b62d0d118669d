//! Project configuration read from the consuming project's `composer.json`.
pub mod options;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub use options::Options;

/// Name of the project manifest file.
pub const MANIFEST_FILE: &str = "composer.json";

/// Vendor directory used when the manifest does not override it.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    require: Map<String, Value>,
    #[serde(rename = "require-dev")]
    require_dev: Map<String, Value>,
    config: ManifestConfig,
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManifestConfig {
    #[serde(rename = "vendor-dir")]
    vendor_dir: Option<String>,
}

/// Everything the engine needs to know about the consuming project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project root directory (the one holding `composer.json`).
    pub root: PathBuf,
    /// Vendor directory, relative to `root`.
    pub vendor_dir: String,
    /// Declared dependencies: `require` then `require-dev`, in declaration
    /// order, platform entries excluded.
    pub dependencies: Vec<String>,
    /// Path options for placeholder substitution.
    pub options: Options,
}

impl ProjectConfig {
    /// Load the project configuration rooted at `root`.
    ///
    /// A missing manifest yields an empty configuration with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let manifest: Manifest = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
        } else {
            Manifest::default()
        };

        let mut dependencies: Vec<String> = Vec::new();
        for name in manifest.require.keys().chain(manifest.require_dev.keys()) {
            if is_package_name(name) && !dependencies.contains(name) {
                dependencies.push(name.clone());
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            vendor_dir: manifest
                .config
                .vendor_dir
                .unwrap_or_else(|| DEFAULT_VENDOR_DIR.to_string()),
            dependencies,
            options: Options::from_extra(&manifest.extra),
        })
    }
}

/// Platform requirements (`php`, `ext-*`, `lib-*`, `composer-plugin-api`)
/// have no vendor prefix.
fn is_package_name(name: &str) -> bool {
    name.contains('/')
}
