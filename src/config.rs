//! Project manifest (`extbind.toml`)
//!
//! Declares the package metadata, where the version lives, which objects the
//! build driver must produce, and how the glue module is compiled. Every
//! field has a default, and the defaults describe the Jsonnet binding, so an
//! empty manifest (or none at all) builds `_jsonnet`.
//!
//! ```toml
//! [version]
//! header = "core/libjsonnet.h"
//! macro_name = "LIB_JSONNET_VERSION"
//!
//! [build]
//! objects = ["core/libjsonnet.o", "core/vm.o"]
//!
//! [extension]
//! name = "_jsonnet"
//! sources = ["python/_jsonnet.c"]
//! language = "c++"
//! runtime_config = "python3-config"
//! ```

use crate::extensions::linker::default_suffix;
use crate::extensions::manifest::normalize;
use crate::extensions::runtime::DEFAULT_RUNTIME_CONFIG;
use crate::extensions::{ArtifactManifest, GlueSpec, LinkLanguage};
use crate::package::{PackageMetadata, PackagingError};
use crate::paths;
use crate::version::VersionString;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name
pub const MANIFEST_FILE: &str = "extbind.toml";

/// Project configuration loaded from `extbind.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Distribution metadata
    pub package: PackageSection,
    /// Version header lookup
    pub version: VersionSection,
    /// Object build
    pub build: BuildSection,
    /// Glue module
    pub extension: ExtensionSection,
}

/// `[package]`: declarative metadata, no behavioral contract
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSection {
    pub name: String,
    pub url: String,
    pub description: String,
    pub author: String,
    pub author_email: String,
}

impl Default for PackageSection {
    fn default() -> Self {
        Self {
            name: "jsonnet".to_string(),
            url: "https://google.github.io/jsonnet/doc/".to_string(),
            description: "Python bindings for Jsonnet - The data templating language".to_string(),
            author: "David Cunningham".to_string(),
            author_email: "dcunnin@google.com".to_string(),
        }
    }
}

impl PackageSection {
    /// Metadata with the resolved version filled in
    #[must_use]
    pub fn metadata(&self, version: &VersionString) -> PackageMetadata {
        PackageMetadata {
            name: self.name.clone(),
            version: version.to_string(),
            url: self.url.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            author_email: self.author_email.clone(),
        }
    }
}

/// `[version]`: where the version macro is defined
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSection {
    /// Header path, relative to the project root
    pub header: String,
    /// Macro identifier carrying the version
    pub macro_name: String,
}

impl Default for VersionSection {
    fn default() -> Self {
        Self {
            header: "core/libjsonnet.h".to_string(),
            macro_name: "LIB_JSONNET_VERSION".to_string(),
        }
    }
}

/// `[build]`: the external object build
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Build driver program (`MAKE` overrides it)
    pub driver: String,
    /// Arguments placed before the targets
    pub args: Vec<String>,
    /// Object artifacts, relative to the project root, in link order
    pub objects: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            driver: crate::extensions::driver::DEFAULT_DRIVER.to_string(),
            args: Vec::new(),
            objects: [
                "core/libjsonnet.o",
                "core/lexer.o",
                "core/parser.o",
                "core/static_analysis.o",
                "core/vm.o",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

/// `[extension]`: the loadable module
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionSection {
    /// Module name, identical to the runtime's import identifier
    pub name: String,
    /// Glue sources, relative to the project root
    pub sources: Vec<String>,
    /// Link language (`c` or `c++`)
    pub language: LinkLanguage,
    pub include_dirs: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
    /// Module file suffix; the runtime's suffix, else the platform default,
    /// when unset
    pub suffix: Option<String>,
    /// Runtime config tool queried for include dirs and the module suffix
    /// (empty string disables the query)
    pub runtime_config: Option<String>,
    /// Output directory, relative to the project root
    pub out_dir: String,
}

impl Default for ExtensionSection {
    fn default() -> Self {
        Self {
            name: "_jsonnet".to_string(),
            sources: vec!["python/_jsonnet.c".to_string()],
            language: LinkLanguage::Cxx,
            include_dirs: Vec::new(),
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
            suffix: None,
            runtime_config: Some(DEFAULT_RUNTIME_CONFIG.to_string()),
            out_dir: "build".to_string(),
        }
    }
}

impl ExtensionSection {
    /// Runtime config tool to query, if enabled
    #[must_use]
    pub fn runtime_config(&self) -> Option<&str> {
        self.runtime_config
            .as_deref()
            .map(str::trim)
            .filter(|program| !program.is_empty())
    }
}

impl Config {
    /// Load configuration and determine the project root.
    ///
    /// Manifest priority: `custom_path` -> `EXTBIND_MANIFEST` -> `extbind.toml`
    /// in `start_dir` or an ancestor -> built-in defaults.
    ///
    /// The root is the manifest's directory, or `start_dir` when running on
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named manifest is missing, or any
    /// manifest fails to parse.
    pub fn discover(custom_path: Option<&Path>, start_dir: &Path) -> Result<(Self, PathBuf)> {
        let explicit = custom_path
            .map(Path::to_path_buf)
            .or_else(|| crate::env_vars::extbind_manifest().map(PathBuf::from));

        let manifest = match explicit {
            Some(path) => {
                let path = paths::resolve_in(start_dir, path);
                if !path.is_file() {
                    anyhow::bail!("Manifest not found: {}", path.display());
                }
                Some(path)
            }
            None => paths::find_manifest_in(start_dir),
        };

        match manifest {
            Some(path) => {
                let config = Self::load_from(&path)?;
                let root = path
                    .parent()
                    .map_or_else(|| start_dir.to_path_buf(), Path::to_path_buf);
                crate::debug!("Loaded {} (root {})", path.display(), root.display());
                Ok((config, root))
            }
            None => {
                crate::debug!("No {MANIFEST_FILE} found, using built-in defaults");
                Ok((Self::default(), start_dir.to_path_buf()))
            }
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Parse manifest TOML.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or unknown keys.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validated object artifacts.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if the declared list is invalid.
    pub fn artifact_manifest(&self) -> Result<ArtifactManifest, PackagingError> {
        ArtifactManifest::new(&self.build.objects)
    }

    /// Glue-side descriptor settings.
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::Configuration` if the module name or source
    /// list is empty, or two sources would compile to the same object.
    pub fn glue_spec(&self) -> Result<GlueSpec, PackagingError> {
        let ext = &self.extension;
        if ext.name.trim().is_empty() {
            return Err(PackagingError::Configuration {
                message: "Extension name must not be empty".to_string(),
            });
        }
        if ext.sources.is_empty() {
            return Err(PackagingError::Configuration {
                message: format!("Extension {} declares no glue sources", ext.name),
            });
        }

        let sources: Vec<PathBuf> = ext.sources.iter().map(PathBuf::from).collect();
        // Each source compiles to `<temp>/<dir>/<stem>.o`
        let mut objects = HashMap::with_capacity(sources.len());
        for source in &sources {
            if let Some(first) = objects.insert(normalize(&source.with_extension("")), source) {
                return Err(PackagingError::Configuration {
                    message: format!(
                        "Extension {} glue sources {} and {} compile to the same object",
                        ext.name,
                        first.display(),
                        source.display()
                    ),
                });
            }
        }

        Ok(GlueSpec {
            name: ext.name.clone(),
            sources,
            language: ext.language,
            include_dirs: ext.include_dirs.iter().map(PathBuf::from).collect(),
            extra_compile_args: ext.extra_compile_args.clone(),
            extra_link_args: ext.extra_link_args.clone(),
            suffix: ext
                .suffix
                .clone()
                .unwrap_or_else(|| default_suffix().to_string()),
        })
    }
}
