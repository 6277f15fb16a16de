// src/version/mod.rs

//! Version derivation from source-control tag history
//!
//! The package version is fixed once, at recipe load time, from the
//! repository's tag history plus an optional CI build identifier:
//!
//! - Tagged release checkouts get the tag string as-is.
//! - Intermediate CI builds (a build identifier is present and HEAD is not
//!   itself tagged) get `"{tag}-{build_id}"`.
//! - Repositories with no tags at all fall back to a revision hash,
//!   never a failure. An empty identifier from the query layer is a defect
//!   and is reported as a version-control error.
//!
//! The version-control queries are behind the [`VcsQuery`] trait so the
//! composition logic can be exercised with synthetic inputs; [`GitCli`] is
//! the production implementation shelling out to the `git` binary.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Environment variable carrying the CI build identifier.
///
/// Its presence is the sole signal distinguishing CI builds from local ones.
pub const CI_BUILD_ID_VAR: &str = "CI_PIPELINE_ID";

/// The resolved package version, computed once per recipe evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    /// Most recent reachable tag (or the fallback revision hash)
    pub tag: String,
    /// CI build identifier, absent for local builds
    pub build_id: Option<String>,
    /// Whether HEAD is itself the tagged commit
    pub is_exact_tag_match: bool,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.build_id {
            Some(id) if !self.is_exact_tag_match => write!(f, "{}-{}", self.tag, id),
            _ => write!(f, "{}", self.tag),
        }
    }
}

/// Read-only version-control queries needed for version resolution
pub trait VcsQuery {
    /// Most recent tag reachable from HEAD, abbreviated.
    ///
    /// Contract: never fails for "no tags exist"; implementations fall back
    /// to a synthesized identifier such as a revision hash. Failure
    /// here means the query mechanism itself is broken.
    fn latest_tag(&self) -> Result<String>;

    /// Whether HEAD exactly matches a tag.
    ///
    /// Implementations catch the failing exact-match query and convert it to
    /// `false`; callers never see that failure.
    fn is_exact_tag(&self) -> bool;
}

/// `VcsQuery` implementation backed by the `git` command-line tool
pub struct GitCli {
    git: PathBuf,
    workdir: PathBuf,
}

impl GitCli {
    /// Create a query handle for the repository checked out at `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Result<Self> {
        let git = which::which("git")
            .map_err(|e| Error::VersionControl(format!("git binary not found: {}", e)))?;
        Ok(Self {
            git,
            workdir: workdir.into(),
        })
    }

    /// Use an explicit git binary instead of searching PATH
    pub fn with_binary(git: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            git: git.into(),
            workdir: workdir.into(),
        }
    }

    fn describe(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.git)
            .arg("describe")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| Error::VersionControl(format!("Failed to run git describe: {}", e)))?;

        if !output.status.success() {
            return Err(Error::VersionControl(format!(
                "git describe {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VcsQuery for GitCli {
    fn latest_tag(&self) -> Result<String> {
        // --always degrades to a revision hash in untagged repositories
        let tag = self.describe(&["--tags", "--abbrev=0", "--always"])?;
        if tag.is_empty() {
            return Err(Error::VersionControl(
                "git describe returned no identifier".to_string(),
            ));
        }
        Ok(tag)
    }

    fn is_exact_tag(&self) -> bool {
        // A non-zero exit here is the expected "HEAD is not tagged" signal
        match self.describe(&["--tags", "--exact-match"]) {
            Ok(_) => true,
            Err(e) => {
                debug!("HEAD is not an exact tag: {}", e);
                false
            }
        }
    }
}

/// Resolve the package version from tag history and an optional build id.
///
/// An empty build id is treated as absent, matching the truthiness test on
/// the CI environment variable.
pub fn resolve(vcs: &dyn VcsQuery, build_id: Option<&str>) -> Result<VersionSpec> {
    let tag = vcs.latest_tag()?;
    let is_exact_tag_match = vcs.is_exact_tag();
    let build_id = build_id
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string());

    let spec = VersionSpec {
        tag,
        build_id,
        is_exact_tag_match,
    };
    debug!("Resolved version: {}", spec);
    Ok(spec)
}

/// Read the CI build identifier from the environment, if present.
///
/// The resolver itself takes the identifier as a parameter; only entry
/// points should touch the process environment.
pub fn build_id_from_env() -> Option<String> {
    std::env::var(CI_BUILD_ID_VAR)
        .ok()
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeVcs {
        tag: &'static str,
        exact: bool,
    }

    impl VcsQuery for FakeVcs {
        fn latest_tag(&self) -> Result<String> {
            Ok(self.tag.to_string())
        }

        fn is_exact_tag(&self) -> bool {
            self.exact
        }
    }

    #[test]
    fn test_exact_tag_ignores_build_id() {
        let vcs = FakeVcs {
            tag: "v2.3.0",
            exact: true,
        };
        let spec = resolve(&vcs, Some("455")).unwrap();
        assert_eq!(spec.to_string(), "v2.3.0");
        assert!(spec.is_exact_tag_match);
    }

    #[test]
    fn test_exact_tag_without_build_id() {
        let vcs = FakeVcs {
            tag: "v2.3.0",
            exact: true,
        };
        let spec = resolve(&vcs, None).unwrap();
        assert_eq!(spec.to_string(), "v2.3.0");
    }

    #[test]
    fn test_ahead_of_tag_with_build_id() {
        let vcs = FakeVcs {
            tag: "v2.3.0",
            exact: false,
        };
        let spec = resolve(&vcs, Some("455")).unwrap();
        assert_eq!(spec.to_string(), "v2.3.0-455");
        assert_eq!(spec.build_id.as_deref(), Some("455"));
    }

    #[test]
    fn test_ahead_of_tag_without_build_id() {
        let vcs = FakeVcs {
            tag: "v2.3.0",
            exact: false,
        };
        let spec = resolve(&vcs, None).unwrap();
        assert_eq!(spec.to_string(), "v2.3.0");
        assert_eq!(spec.build_id, None);
    }

    #[test]
    fn test_untagged_repository_uses_fallback_identifier() {
        let vcs = FakeVcs {
            tag: "abc1234",
            exact: false,
        };
        let spec = resolve(&vcs, None).unwrap();
        assert_eq!(spec.to_string(), "abc1234");
    }

    #[test]
    fn test_empty_build_id_is_absent() {
        let vcs = FakeVcs {
            tag: "v1.0.0",
            exact: false,
        };
        let spec = resolve(&vcs, Some("")).unwrap();
        assert_eq!(spec.build_id, None);
        assert_eq!(spec.to_string(), "v1.0.0");
    }

    #[test]
    fn test_display_matches_composition() {
        let spec = VersionSpec {
            tag: "v2.3.0".to_string(),
            build_id: Some("455".to_string()),
            is_exact_tag_match: false,
        };
        assert_eq!(spec.to_string(), "v2.3.0-455");

        let spec = VersionSpec {
            tag: "v2.3.0".to_string(),
            build_id: Some("455".to_string()),
            is_exact_tag_match: true,
        };
        assert_eq!(spec.to_string(), "v2.3.0");
    }
}
