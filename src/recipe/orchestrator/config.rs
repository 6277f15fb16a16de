// src/recipe/orchestrator/config.rs

//! Configuration types for the build orchestrator

use crate::recipe::orchestrator::{BuildState, LinkInterface};
use std::path::PathBuf;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Root directory for the build workspace; a temporary directory is
    /// created when unset
    pub build_root: Option<PathBuf>,
    /// Staging directory for installed artifacts; defaults to a directory
    /// inside the build workspace, which disappears with it. Set this to
    /// keep artifacts around
    pub staging_dir: Option<PathBuf>,
    /// Run the native configure step verbosely
    pub verbose_configure: bool,
    /// Number of parallel compile jobs
    pub jobs: u32,
    /// Keep the build workspace after completion (for debugging)
    pub keep_builddir: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            build_root: None,
            staging_dir: None,
            verbose_configure: false,
            jobs,
            keep_builddir: false,
        }
    }
}

/// Result of a completed (or partially driven) build sequence
#[derive(Debug)]
pub struct BuildReport {
    /// Staging layout the install step wrote into
    pub staging_dir: PathBuf,
    /// Final lifecycle state reached
    pub state: BuildState,
    /// Library names forming the link interface; empty unless install ran
    pub link_interface: LinkInterface,
    /// Build log
    pub log: String,
}
