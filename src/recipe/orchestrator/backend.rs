// src/recipe/orchestrator/backend.rs

//! Native build toolchain backends
//!
//! The orchestrator drives a fixed four-step contract (generate, configure,
//! build, install) against a [`BuildBackend`]. Each step is an opaque
//! pass/fail unit; nothing produced by one step is interpreted by the
//! orchestrator itself. [`CmakeBackend`] is the production implementation.

use crate::error::{Error, Result};
use crate::recipe::manifest::RecipeManifest;
use crate::recipe::orchestrator::resolver::ResolvedDependency;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// One step of the fixed build sequence
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuildPhase {
    Generate,
    Configure,
    Build,
    Install,
}

/// Everything a backend needs to run one phase
pub struct BuildContext<'a> {
    /// The recipe being built
    pub manifest: &'a RecipeManifest,
    /// The resolved location of the pinned dependency
    pub resolved: &'a ResolvedDependency,
    /// Root of the exported sources (build file + source directory)
    pub export_dir: &'a Path,
    /// Out-of-tree build directory; generated artifacts land here
    pub build_dir: &'a Path,
    /// Package staging layout install writes into
    pub staging_dir: &'a Path,
    /// Run the configure step verbosely
    pub verbose_configure: bool,
    /// Parallel compile jobs
    pub jobs: u32,
}

/// The native build toolchain, as seen by the orchestrator
///
/// Implementations may shell out (the real toolchain) or record invocations
/// (tests); either way each step is pass/fail and never retried.
pub trait BuildBackend: Send + Sync {
    /// Emit toolchain configuration artifacts into the build directory
    fn generate(&self, ctx: &BuildContext<'_>) -> Result<()>;

    /// Run the toolchain's configuration step against the generated artifacts
    fn configure(&self, ctx: &BuildContext<'_>) -> Result<()>;

    /// Run the compile step
    fn build(&self, ctx: &BuildContext<'_>) -> Result<()>;

    /// Install build outputs into the staging layout
    fn install(&self, ctx: &BuildContext<'_>) -> Result<()>;
}

#[derive(Serialize)]
struct DependencyDescription<'a> {
    dependency: &'a ResolvedDependency,
    options: &'a BTreeMap<String, bool>,
}

/// `BuildBackend` implementation driving the `cmake` binary
pub struct CmakeBackend {
    cmake: PathBuf,
}

impl CmakeBackend {
    /// Toolchain-configuration artifact written by the generate step
    pub const TOOLCHAIN_FILE: &'static str = "protopack_toolchain.cmake";
    /// Dependency-resolution artifact written by the generate step
    pub const DEPS_FILE: &'static str = "protopack_deps.json";

    /// Locate `cmake` on PATH
    pub fn discover() -> Result<Self> {
        let cmake = which::which("cmake")
            .map_err(|e| Error::NotFound(format!("cmake binary not found: {}", e)))?;
        Ok(Self { cmake })
    }

    /// Use an explicit cmake binary instead of searching PATH
    pub fn with_binary(cmake: impl Into<PathBuf>) -> Self {
        Self {
            cmake: cmake.into(),
        }
    }

    fn run(&self, phase: BuildPhase, args: &[String]) -> Result<()> {
        debug!("{} {}", self.cmake.display(), args.join(" "));

        let output = Command::new(&self.cmake).args(args).output().map_err(|e| {
            Error::PhaseFailed {
                phase: phase.to_string(),
                detail: format!("Failed to invoke {}: {}", self.cmake.display(), e),
            }
        })?;

        if !output.status.success() {
            return Err(Error::PhaseFailed {
                phase: phase.to_string(),
                detail: format!(
                    "exit code {:?}\nstderr: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        Ok(())
    }
}

impl BuildBackend for CmakeBackend {
    fn generate(&self, ctx: &BuildContext<'_>) -> Result<()> {
        fs::create_dir_all(ctx.build_dir)?;

        // Toolchain description: option values plus the dependency's location
        let on_off = |v: bool| if v { "ON" } else { "OFF" };
        let mut toolchain = String::new();
        let _ = writeln!(toolchain, "# Generated by protopack; do not edit.");
        let _ = writeln!(
            toolchain,
            "set(BUILD_SHARED_LIBS {})",
            on_off(ctx.manifest.options.shared)
        );
        let _ = writeln!(
            toolchain,
            "set(CMAKE_POSITION_INDEPENDENT_CODE {})",
            on_off(ctx.manifest.options.fpic)
        );
        let _ = writeln!(
            toolchain,
            "list(APPEND CMAKE_PREFIX_PATH \"{}\")",
            ctx.resolved.root.display()
        );
        let _ = writeln!(
            toolchain,
            "set(PROTOPACK_DEP_INCLUDE_DIR \"{}\")",
            ctx.resolved.include_dir.display()
        );
        let _ = writeln!(
            toolchain,
            "set(PROTOPACK_DEP_LIB_DIR \"{}\")",
            ctx.resolved.lib_dir.display()
        );
        fs::write(ctx.build_dir.join(Self::TOOLCHAIN_FILE), toolchain)?;

        // Dependency description: where the native build finds the pin
        let description = DependencyDescription {
            dependency: ctx.resolved,
            options: &ctx.manifest.dependency.options,
        };
        let body = serde_json::to_string_pretty(&description).map_err(|e| {
            Error::IoError(format!("Failed to encode dependency description: {}", e))
        })?;
        fs::write(ctx.build_dir.join(Self::DEPS_FILE), body)?;

        Ok(())
    }

    fn configure(&self, ctx: &BuildContext<'_>) -> Result<()> {
        let mut args = vec![
            "-S".to_string(),
            ctx.export_dir.display().to_string(),
            "-B".to_string(),
            ctx.build_dir.display().to_string(),
            format!(
                "-DCMAKE_TOOLCHAIN_FILE={}",
                ctx.build_dir.join(Self::TOOLCHAIN_FILE).display()
            ),
        ];

        // Settings pass through uninterpreted
        for (key, value) in &ctx.manifest.settings {
            args.push(format!("-D{}={}", key, value));
        }

        if ctx.verbose_configure {
            args.push("--log-level=VERBOSE".to_string());
        }

        self.run(BuildPhase::Configure, &args)
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<()> {
        let args = vec![
            "--build".to_string(),
            ctx.build_dir.display().to_string(),
            "--parallel".to_string(),
            ctx.jobs.to_string(),
        ];
        self.run(BuildPhase::Build, &args)
    }

    fn install(&self, ctx: &BuildContext<'_>) -> Result<()> {
        let args = vec![
            "--install".to_string(),
            ctx.build_dir.display().to_string(),
            "--prefix".to_string(),
            ctx.staging_dir.display().to_string(),
        ];
        self.run(BuildPhase::Install, &args)
    }
}
