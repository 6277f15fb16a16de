// src/recipe/orchestrator/mod.rs

//! The build orchestrator: drives a recipe through the fixed lifecycle
//!
//! `declared → generated → configured → built → packaged → exposed`
//!
//! Each transition is strictly sequential and one-way. A failing phase
//! aborts the sequence with no rollback and no retry; the caller observes
//! the failure and the package stays non-publishable. Ordering across
//! phases is the caller's lifecycle contract; the orchestrator tracks the
//! state it has reached and reports an empty link interface whenever
//! install has not completed.

mod backend;
mod config;
mod resolver;

pub use backend::{BuildBackend, BuildContext, BuildPhase, CmakeBackend};
pub use config::{BuildReport, OrchestratorConfig};
pub use resolver::{DependencyResolver, ResolvedDependency, StoreResolver};

use crate::error::{Error, Result};
use crate::recipe::manifest::RecipeManifest;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Lifecycle state of one recipe evaluation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuildState {
    Declared,
    Generated,
    Configured,
    Built,
    Packaged,
    Exposed,
}

/// The enumerated library names a consumer must link against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInterface {
    pub libs: Vec<String>,
}

impl LinkInterface {
    pub fn is_empty(&self) -> bool {
        self.libs.is_empty()
    }
}

/// Drives recipes through the build lifecycle against injected collaborators
pub struct Orchestrator {
    pub(crate) config: OrchestratorConfig,
    backend: Arc<dyn BuildBackend>,
    resolver: Arc<dyn DependencyResolver>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        backend: Arc<dyn BuildBackend>,
        resolver: Arc<dyn DependencyResolver>,
    ) -> Self {
        Self {
            config,
            backend,
            resolver,
        }
    }

    /// Resolve the dependency, set up the build workspace, and export the
    /// recipe's sources into it. Phases are then invoked on the returned
    /// [`BuildRun`].
    pub fn begin<'a>(
        &'a self,
        manifest: &'a RecipeManifest,
        recipe_root: &Path,
    ) -> Result<BuildRun<'a>> {
        let resolved = self.resolver.resolve(&manifest.dependency)?;

        let (workspace_root, workspace) = match &self.config.build_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                (root.clone(), None)
            }
            None => {
                let tmp = tempfile::Builder::new()
                    .prefix("protopack-")
                    .keep(self.config.keep_builddir)
                    .tempdir()?;
                (tmp.path().to_path_buf(), Some(tmp))
            }
        };
        debug!("Build workspace: {}", workspace_root.display());

        let export_dir = workspace_root.join("export");
        let build_dir = workspace_root.join("build");
        let staging_dir = self
            .config
            .staging_dir
            .clone()
            .unwrap_or_else(|| workspace_root.join("staging"));
        fs::create_dir_all(&export_dir)?;
        fs::create_dir_all(&build_dir)?;
        fs::create_dir_all(&staging_dir)?;

        let mut run = BuildRun {
            orchestrator: self,
            manifest,
            _workspace: workspace,
            export_dir,
            build_dir,
            staging_dir,
            resolved,
            state: BuildState::Declared,
            log: String::new(),
        };
        run.export_sources(recipe_root)?;
        run.log_line(&format!(
            "declared: {} against {}",
            manifest.package.name,
            manifest.dependency.reference()
        ));

        Ok(run)
    }

    /// Run the full generate/configure/build/install sequence and expose
    /// the link interface
    pub fn run(&self, manifest: &RecipeManifest, recipe_root: &Path) -> Result<BuildReport> {
        self.run_until(manifest, recipe_root, BuildPhase::Install)
    }

    /// Run the sequence up to and including `last`
    pub fn run_until(
        &self,
        manifest: &RecipeManifest,
        recipe_root: &Path,
        last: BuildPhase,
    ) -> Result<BuildReport> {
        info!(
            "Building {} against {}",
            manifest.package.name,
            manifest.dependency.reference()
        );

        let mut run = self.begin(manifest, recipe_root)?;

        run.generate()?;
        if last >= BuildPhase::Configure {
            run.configure()?;
        }
        if last >= BuildPhase::Build {
            run.build()?;
        }
        if last >= BuildPhase::Install {
            run.install()?;
        }

        let link_interface = run.package_info();
        if last >= BuildPhase::Install && link_interface.is_empty() {
            return Err(Error::PhaseFailed {
                phase: BuildPhase::Install.to_string(),
                detail: "no library artifacts were installed into the staging layout"
                    .to_string(),
            });
        }

        info!(
            "Reached {} for {} ({} libs)",
            run.state(),
            manifest.package.name,
            link_interface.libs.len()
        );

        Ok(BuildReport {
            staging_dir: run.staging_dir().to_path_buf(),
            state: run.state(),
            link_interface,
            log: run.log().to_string(),
        })
    }
}

/// One recipe evaluation in flight
pub struct BuildRun<'a> {
    orchestrator: &'a Orchestrator,
    manifest: &'a RecipeManifest,
    /// Kept alive for the duration of the run
    _workspace: Option<TempDir>,
    export_dir: PathBuf,
    build_dir: PathBuf,
    staging_dir: PathBuf,
    resolved: ResolvedDependency,
    state: BuildState,
    log: String,
}

impl<'a> BuildRun<'a> {
    /// Copy the exported source roots verbatim into the build context
    fn export_sources(&mut self, recipe_root: &Path) -> Result<()> {
        let build_file = recipe_root.join(&self.manifest.sources.build_file);
        if !build_file.is_file() {
            return Err(Error::NotFound(format!(
                "Exported build file not found: {}",
                build_file.display()
            )));
        }
        let build_file_dst = self.export_dir.join(&self.manifest.sources.build_file);
        if let Some(parent) = build_file_dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&build_file, &build_file_dst)?;

        let source_dir = recipe_root.join(&self.manifest.sources.source_dir);
        if !source_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "Exported source directory not found: {}",
                source_dir.display()
            )));
        }
        copy_tree(
            &source_dir,
            &self.export_dir.join(&self.manifest.sources.source_dir),
        )?;

        self.log_line(&format!(
            "exported: {} and {}/",
            self.manifest.sources.build_file, self.manifest.sources.source_dir
        ));
        Ok(())
    }

    /// Emit toolchain configuration artifacts
    pub fn generate(&mut self) -> Result<()> {
        info!("Generating toolchain artifacts...");
        let ctx = self.context();
        self.orchestrator.backend.generate(&ctx)?;
        self.state = BuildState::Generated;
        self.log_line("generate: ok");
        Ok(())
    }

    /// Run the native configuration step
    pub fn configure(&mut self) -> Result<()> {
        info!("Configuring native build...");
        let ctx = self.context();
        self.orchestrator.backend.configure(&ctx)?;
        self.state = BuildState::Configured;
        self.log_line("configure: ok");
        Ok(())
    }

    /// Run the native compile step
    pub fn build(&mut self) -> Result<()> {
        info!("Running native build...");
        let ctx = self.context();
        self.orchestrator.backend.build(&ctx)?;
        self.state = BuildState::Built;
        self.log_line("build: ok");
        Ok(())
    }

    /// Install build outputs into the staging layout.
    ///
    /// Configuration is safe to repeat, so install always goes through the
    /// configure step again before installing.
    pub fn install(&mut self) -> Result<()> {
        info!("Installing into staging layout...");
        let ctx = self.context();
        self.orchestrator.backend.configure(&ctx)?;
        self.orchestrator.backend.install(&ctx)?;
        self.state = BuildState::Packaged;
        self.log_line("install: ok");
        Ok(())
    }

    /// Enumerate produced library artifacts and expose them as the link
    /// interface. Empty whenever install has not completed.
    pub fn package_info(&mut self) -> LinkInterface {
        if self.state < BuildState::Packaged {
            debug!("Install has not run; link interface is empty");
            return LinkInterface::default();
        }

        let interface = LinkInterface {
            libs: collect_libs(&self.staging_dir),
        };
        self.state = BuildState::Exposed;
        self.log_line(&format!(
            "package_info: exposed {} libs",
            interface.libs.len()
        ));
        interface
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    fn context(&self) -> BuildContext<'_> {
        BuildContext {
            manifest: self.manifest,
            resolved: &self.resolved,
            export_dir: &self.export_dir,
            build_dir: &self.build_dir,
            staging_dir: &self.staging_dir,
            verbose_configure: self.orchestrator.config.verbose_configure,
            jobs: self.orchestrator.config.jobs,
        }
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }
}

/// Walk the staging layout and collect produced library names
pub(crate) fn collect_libs(staging_dir: &Path) -> Vec<String> {
    let mut libs: Vec<String> = WalkDir::new(staging_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().and_then(lib_name))
        .collect();
    libs.sort();
    libs.dedup();
    libs
}

/// Extract a link-interface name from an artifact file name.
///
/// Recognizes `libfoo.a`, `libfoo.so`, `libfoo.so.1.2`, `libfoo.dylib`,
/// and `foo.lib`; everything else is not a library artifact.
fn lib_name(file: &str) -> Option<String> {
    let stem = if let Some(idx) = file.find(".so") {
        let rest = &file[idx + 3..];
        if !(rest.is_empty() || rest.starts_with('.')) {
            return None;
        }
        &file[..idx]
    } else if let Some(stem) = file.strip_suffix(".a") {
        stem
    } else if let Some(stem) = file.strip_suffix(".dylib") {
        stem
    } else if let Some(stem) = file.strip_suffix(".lib") {
        stem
    } else {
        return None;
    };

    if stem.is_empty() {
        return None;
    }
    let stem = stem.strip_prefix("lib").unwrap_or(stem);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry =
            entry.map_err(|e| Error::IoError(format!("Failed to walk {}: {}", src.display(), e)))?;
        let rel = entry.path().strip_prefix(src).map_err(|e| {
            Error::IoError(format!("Failed to relativize {}: {}", entry.path().display(), e))
        })?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
