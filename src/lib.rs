// src/lib.rs

//! Protopack
//!
//! Recipe-driven build and packaging for a native library that bundles
//! generated RPC/message definitions, pinned against exactly one
//! RPC/serialization framework dependency.
//!
//! # Architecture
//!
//! - Version resolution: the package version is derived once, at recipe
//!   load time, from repository tag history plus an optional CI build
//!   identifier
//! - Recipes: TOML manifests declaring options, the dependency pin, and
//!   exported sources
//! - Orchestration: a fixed generate/configure/build/install sequence
//!   driven against injected toolchain and dependency-store backends
//! - Link interface: produced library artifacts enumerated after install

mod error;
pub mod recipe;
pub mod version;

pub use error::{Error, Result};
pub use recipe::{
    BuildBackend, BuildContext, BuildOptions, BuildPhase, BuildReport, BuildRun, BuildState,
    CmakeBackend, DependencyPin, DependencyResolver, LinkInterface, Orchestrator,
    OrchestratorConfig, PackageMetadata, RecipeManifest, ResolvedDependency, StoreResolver,
};
pub use version::{GitCli, VcsQuery, VersionSpec};
