// src/recipe/mod.rs

//! Recipe system for building and packaging stub libraries
//!
//! A recipe declares one package: metadata, boolean build options, the
//! single pinned dependency, and the source roots exported verbatim into
//! the build context. The orchestrator then drives the native toolchain
//! through generate, configure, build, and install, and finally exposes
//! the produced libraries as the package's link interface.
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "phonexia-grpc-stubs"
//! description = "Stubs and messages for the speech microservices"
//! license = "Apache-2.0"
//!
//! [options]
//! shared = false
//! fpic = true
//!
//! [dependency]
//! name = "grpc"
//! version = "1.72.0"
//!
//! [dependency.options]
//! with_libsystemd = false
//!
//! [sources]
//! build_file = "CMakeLists.txt"
//! source_dir = "src"
//!
//! [settings]
//! CMAKE_BUILD_TYPE = "Release"
//! ```

mod manifest;
mod orchestrator;
pub mod parser;

pub use manifest::{
    BuildOptions, DependencyPin, PackageMetadata, PackageSection, RecipeManifest, SourcesSection,
};
pub use orchestrator::{
    BuildBackend, BuildContext, BuildPhase, BuildReport, BuildRun, BuildState, CmakeBackend,
    DependencyResolver, LinkInterface, Orchestrator, OrchestratorConfig, ResolvedDependency,
    StoreResolver,
};
pub use parser::{parse_manifest, parse_manifest_file, validate_manifest};
