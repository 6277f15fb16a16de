// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use protopack::recipe::{
    parse_manifest_file, validate_manifest, BuildPhase, CmakeBackend, Orchestrator,
    OrchestratorConfig, PackageMetadata, StoreResolver,
};
use protopack::version::{self, GitCli};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "protopack")]
#[command(author, version, about = "Recipe-driven build and packaging for generated RPC stub libraries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the package version from repository tag history
    Version {
        /// Repository checkout to query
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,
        /// CI build identifier (defaults to $CI_PIPELINE_ID)
        #[arg(long)]
        build_id: Option<String>,
    },
    /// Parse and validate a recipe manifest
    Validate {
        /// Path to the recipe manifest
        manifest: PathBuf,
    },
    /// Drive the generate/configure/build/install sequence for a recipe
    Build {
        /// Path to the recipe manifest
        manifest: PathBuf,
        /// Recipe root containing the exported sources
        #[arg(short, long, default_value = ".")]
        source_root: PathBuf,
        /// Dependency store directory
        #[arg(long, default_value = "/var/cache/protopack/store")]
        store: PathBuf,
        /// Staging directory for installed artifacts
        #[arg(long, default_value = "protopack-out")]
        staging: PathBuf,
        /// Last phase to run (generate, configure, build, install)
        #[arg(long, default_value = "install")]
        until: String,
        /// Run the native configure step verbosely
        #[arg(long)]
        verbose_configure: bool,
        /// Parallel build jobs (defaults to available cores)
        #[arg(short, long)]
        jobs: Option<u32>,
        /// Keep the build workspace after completion (for debugging)
        #[arg(long)]
        keep_builddir: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version { repo, build_id }) => {
            let vcs = GitCli::new(&repo)?;
            let build_id = build_id.or_else(version::build_id_from_env);
            let spec = version::resolve(&vcs, build_id.as_deref())?;
            println!("{}", spec);
            Ok(())
        }
        Some(Commands::Validate { manifest }) => {
            let recipe = parse_manifest_file(&manifest)?;
            let warnings = validate_manifest(&recipe)?;
            for warning in &warnings {
                warn!("{}", warning);
            }
            println!(
                "{}: ok ({} against {})",
                manifest.display(),
                recipe.package.name,
                recipe.dependency.reference()
            );
            Ok(())
        }
        Some(Commands::Build {
            manifest,
            source_root,
            store,
            staging,
            until,
            verbose_configure,
            jobs,
            keep_builddir,
        }) => {
            let recipe = parse_manifest_file(&manifest)?;
            for warning in validate_manifest(&recipe)? {
                warn!("{}", warning);
            }

            let until: BuildPhase = until
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown phase: {}", until))?;

            // Fix the package identity before any phase runs
            let vcs = GitCli::new(&source_root)?;
            let spec = version::resolve(&vcs, version::build_id_from_env().as_deref())?;
            info!("Resolved version: {}", spec);

            let mut config = OrchestratorConfig {
                staging_dir: Some(staging),
                verbose_configure,
                keep_builddir,
                ..OrchestratorConfig::default()
            };
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }

            let orchestrator = Orchestrator::new(
                config,
                Arc::new(CmakeBackend::discover()?),
                Arc::new(StoreResolver::new(store)),
            );
            let report = orchestrator.run_until(&recipe, &source_root, until)?;

            let metadata =
                PackageMetadata::new(&recipe, &spec.to_string(), report.link_interface.libs);
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "protopack", &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("protopack v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'protopack --help' for usage information");
            Ok(())
        }
    }
}
