// src/recipe/orchestrator/resolver.rs

//! Dependency resolution for the single pinned dependency

use crate::error::{Error, Result};
use crate::recipe::manifest::DependencyPin;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Where a resolved dependency's headers and libraries live
///
/// Consumed only by the generated toolchain artifacts; the orchestrator
/// never inspects the contents.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedDependency {
    pub name: String,
    pub version: String,
    pub root: PathBuf,
    pub include_dir: PathBuf,
    pub lib_dir: PathBuf,
}

/// Trait for resolving the pinned dependency by exact name and version
///
/// Keeps the orchestrator decoupled from how dependencies are stored while
/// still letting the generated artifacts point at real headers/libraries.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, pin: &DependencyPin) -> Result<ResolvedDependency>;
}

/// Resolves pins from a local dependency store laid out as
/// `<store>/<name>/<version>/{include,lib}`
pub struct StoreResolver {
    store: PathBuf,
}

impl StoreResolver {
    pub fn new(store: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
        }
    }
}

impl DependencyResolver for StoreResolver {
    fn resolve(&self, pin: &DependencyPin) -> Result<ResolvedDependency> {
        let root = self.store.join(&pin.name).join(&pin.version);
        if !root.is_dir() {
            return Err(Error::ResolutionError(format!(
                "{} not present in dependency store at {}",
                pin.reference(),
                self.store.display()
            )));
        }

        debug!("Resolved {} at {}", pin.reference(), root.display());

        Ok(ResolvedDependency {
            name: pin.name.clone(),
            version: pin.version.clone(),
            include_dir: root.join("include"),
            lib_dir: root.join("lib"),
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_store_resolver_missing_pin() {
        let store = tempfile::tempdir().unwrap();
        let resolver = StoreResolver::new(store.path());
        let result = resolver.resolve(&DependencyPin::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_store_resolver_resolves_layout() {
        let store = tempfile::tempdir().unwrap();
        let root = store.path().join("grpc/1.72.0");
        fs::create_dir_all(root.join("include")).unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();

        let resolver = StoreResolver::new(store.path());
        let resolved = resolver.resolve(&DependencyPin::default()).unwrap();
        assert_eq!(resolved.name, "grpc");
        assert_eq!(resolved.version, "1.72.0");
        assert_eq!(resolved.root, root);
        assert_eq!(resolved.include_dir, root.join("include"));
        assert_eq!(resolved.lib_dir, root.join("lib"));
    }
}
