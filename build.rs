// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe manifest path
fn manifest_arg() -> Arg {
    Arg::new("manifest")
        .required(true)
        .help("Path to the recipe manifest")
}

fn build_cli() -> Command {
    Command::new("protopack")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Protopack Contributors")
        .about("Recipe-driven build and packaging for generated RPC stub libraries")
        .subcommand_required(false)
        .subcommand(
            Command::new("version")
                .about("Resolve the package version from repository tag history")
                .arg(
                    Arg::new("repo")
                        .short('r')
                        .long("repo")
                        .default_value(".")
                        .help("Repository checkout to query"),
                )
                .arg(
                    Arg::new("build_id")
                        .long("build-id")
                        .help("CI build identifier (defaults to $CI_PIPELINE_ID)"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Parse and validate a recipe manifest")
                .arg(manifest_arg()),
        )
        .subcommand(
            Command::new("build")
                .about("Drive the generate/configure/build/install sequence for a recipe")
                .arg(manifest_arg())
                .arg(
                    Arg::new("source_root")
                        .short('s')
                        .long("source-root")
                        .default_value(".")
                        .help("Recipe root containing the exported sources"),
                )
                .arg(
                    Arg::new("store")
                        .long("store")
                        .default_value("/var/cache/protopack/store")
                        .help("Dependency store directory"),
                )
                .arg(
                    Arg::new("staging")
                        .long("staging")
                        .default_value("protopack-out")
                        .help("Staging directory for installed artifacts"),
                )
                .arg(
                    Arg::new("until")
                        .long("until")
                        .default_value("install")
                        .help("Last phase to run (generate, configure, build, install)"),
                )
                .arg(
                    Arg::new("verbose_configure")
                        .long("verbose-configure")
                        .action(clap::ArgAction::SetTrue)
                        .help("Run the native configure step verbosely"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Parallel build jobs (defaults to available cores)"),
                )
                .arg(
                    Arg::new("keep_builddir")
                        .long("keep-builddir")
                        .action(clap::ArgAction::SetTrue)
                        .help("Keep the build workspace after completion"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("protopack.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
