// src/recipe/manifest.rs

//! Recipe manifest format definitions
//!
//! A recipe is a TOML file declaring one package: its metadata, build
//! options, the single pinned dependency, and the source roots exported
//! verbatim into the build context. The version is deliberately absent:
//! it is derived from tag history at recipe load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete recipe manifest for one package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeManifest {
    /// Package metadata
    pub package: PackageSection,

    /// Build options with their defaults
    #[serde(default)]
    pub options: BuildOptions,

    /// The single pinned dependency
    #[serde(default)]
    pub dependency: DependencyPin,

    /// Source roots copied verbatim into the build context
    #[serde(default)]
    pub sources: SourcesSection,

    /// Opaque settings handed through to the native toolchain uninterpreted
    /// (build type, compiler, OS, architecture and the like)
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Project homepage
    #[serde(default)]
    pub homepage: Option<String>,

    /// License identifier
    #[serde(default)]
    pub license: Option<String>,

    /// Package type; this system only produces libraries
    #[serde(rename = "type", default = "default_package_type")]
    pub package_type: String,
}

fn default_package_type() -> String {
    "library".to_string()
}

/// Boolean build options, each with exactly one default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Build a shared library instead of a static one
    #[serde(default = "default_shared")]
    pub shared: bool,

    /// Compile position-independent code
    #[serde(default = "default_fpic")]
    pub fpic: bool,
}

fn default_shared() -> bool {
    false
}

fn default_fpic() -> bool {
    true
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            shared: default_shared(),
            fpic: default_fpic(),
        }
    }
}

impl BuildOptions {
    /// The declared option set: name and current value
    pub fn declared(&self) -> [(&'static str, bool); 2] {
        [("shared", self.shared), ("fpic", self.fpic)]
    }

    /// The declared option set with its defaults
    pub fn declared_defaults() -> [(&'static str, bool); 2] {
        [("shared", default_shared()), ("fpic", default_fpic())]
    }
}

/// The single dependency, pinned to an exact version
///
/// Forwarded options adjust the dependency's own option set; they are
/// recorded in the generated dependency description, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyPin {
    /// Dependency name
    #[serde(default = "default_dependency_name")]
    pub name: String,

    /// Exact version token, never a range
    #[serde(default = "default_dependency_version")]
    pub version: String,

    /// Forwarded boolean options on the dependency
    #[serde(default = "default_dependency_options")]
    pub options: BTreeMap<String, bool>,
}

fn default_dependency_name() -> String {
    "grpc".to_string()
}

fn default_dependency_version() -> String {
    "1.72.0".to_string()
}

fn default_dependency_options() -> BTreeMap<String, bool> {
    // The optional systemd logging backend stays off
    BTreeMap::from([("with_libsystemd".to_string(), false)])
}

impl Default for DependencyPin {
    fn default() -> Self {
        Self {
            name: default_dependency_name(),
            version: default_dependency_version(),
            options: default_dependency_options(),
        }
    }
}

impl DependencyPin {
    /// The pin as a `name/version` reference string
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// Source roots exported into the build context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesSection {
    /// Build-description file, copied verbatim (never parsed here)
    #[serde(default = "default_build_file")]
    pub build_file: String,

    /// Source directory, copied verbatim
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
}

fn default_build_file() -> String {
    "CMakeLists.txt".to_string()
}

fn default_source_dir() -> String {
    "src".to_string()
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            build_file: default_build_file(),
            source_dir: default_source_dir(),
        }
    }
}

/// The package metadata surface consumers of the produced package observe
#[derive(Debug, Clone, Serialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub package_type: String,
    pub options: BuildOptions,
    pub dependency: DependencyPin,
    /// Library names forming the link interface, populated after install
    pub libs: Vec<String>,
}

impl PackageMetadata {
    pub fn new(manifest: &RecipeManifest, version: &str, libs: Vec<String>) -> Self {
        Self {
            name: manifest.package.name.clone(),
            version: version.to_string(),
            package_type: manifest.package.package_type.clone(),
            options: manifest.options.clone(),
            dependency: manifest.dependency.clone(),
            libs,
        }
    }
}
