// src/recipe/parser.rs

//! Recipe manifest parsing

use crate::error::{Error, Result};
use crate::recipe::manifest::RecipeManifest;
use std::path::Path;

/// Parse a recipe manifest from a TOML string
pub fn parse_manifest(content: &str) -> Result<RecipeManifest> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe manifest from a file
pub fn parse_manifest_file(path: &Path) -> Result<RecipeManifest> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_manifest(&content)
}

/// Validate a recipe manifest for completeness and correctness
pub fn validate_manifest(manifest: &RecipeManifest) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if manifest.package.name.is_empty() {
        return Err(Error::ValidationError(
            "Recipe package name cannot be empty".to_string(),
        ));
    }

    // Exactly one pin, and it must name an exact version
    let pin = &manifest.dependency;
    if pin.name.is_empty() {
        return Err(Error::ValidationError(
            "Dependency name cannot be empty".to_string(),
        ));
    }
    if pin
        .version
        .chars()
        .any(|c| matches!(c, '>' | '<' | '=' | '~' | '^' | '*' | ',' | ' '))
    {
        return Err(Error::ValidationError(format!(
            "Dependency pin must be an exact version, got range-like '{}'",
            pin.version
        )));
    }
    if semver::Version::parse(&pin.version).is_err() {
        return Err(Error::ValidationError(format!(
            "Dependency pin '{}' is not an exact version token",
            pin.version
        )));
    }

    if manifest.sources.build_file.is_empty() {
        return Err(Error::ValidationError(
            "Exported build file cannot be empty".to_string(),
        ));
    }
    if manifest.sources.source_dir.is_empty() {
        return Err(Error::ValidationError(
            "Exported source directory cannot be empty".to_string(),
        ));
    }

    // Warn about missing fields
    if manifest.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    if manifest.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if manifest.package.package_type != "library" {
        warnings.push(format!(
            "Unusual package type '{}'; this system packages libraries",
            manifest.package.package_type
        ));
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_manifest() {
        let content = r#"
[package]
name = "stub-pack"
description = "Generated RPC stubs and messages"
license = "Apache-2.0"

[options]
shared = false
fpic = true

[dependency]
name = "grpc"
version = "1.72.0"

[dependency.options]
with_libsystemd = false

[sources]
build_file = "CMakeLists.txt"
source_dir = "src"

[settings]
CMAKE_BUILD_TYPE = "Release"
"#;

        let manifest = parse_manifest(content).unwrap();
        assert_eq!(manifest.package.name, "stub-pack");
        assert_eq!(manifest.dependency.reference(), "grpc/1.72.0");
        assert_eq!(
            manifest.settings.get("CMAKE_BUILD_TYPE"),
            Some(&"Release".to_string())
        );
        assert!(validate_manifest(&manifest).unwrap().is_empty());
    }

    #[test]
    fn test_parse_minimal_manifest_fills_defaults() {
        let content = r#"
[package]
name = "stub-pack"
"#;

        let manifest = parse_manifest(content).unwrap();
        assert!(!manifest.options.shared);
        assert!(manifest.options.fpic);
        assert_eq!(manifest.dependency.name, "grpc");
        assert_eq!(manifest.dependency.version, "1.72.0");
        assert_eq!(manifest.dependency.options.get("with_libsystemd"), Some(&false));
        assert_eq!(manifest.sources.build_file, "CMakeLists.txt");
        assert!(manifest.settings.is_empty());
    }

    #[test]
    fn test_parse_invalid_manifest() {
        let content = "this is not valid toml at all {}";
        assert!(parse_manifest(content).is_err());
    }

    #[test]
    fn test_validate_empty_name() {
        let content = r#"
[package]
name = ""
"#;

        let manifest = parse_manifest(content).unwrap();
        assert!(validate_manifest(&manifest).is_err());
    }

    #[test]
    fn test_validate_rejects_version_range() {
        let content = r#"
[package]
name = "stub-pack"

[dependency]
name = "grpc"
version = ">=1.72.0"
"#;

        let manifest = parse_manifest(content).unwrap();
        assert!(validate_manifest(&manifest).is_err());
    }

    #[test]
    fn test_validate_rejects_partial_version() {
        let content = r#"
[package]
name = "stub-pack"

[dependency]
name = "grpc"
version = "1.72"
"#;

        let manifest = parse_manifest(content).unwrap();
        assert!(validate_manifest(&manifest).is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "stub-pack"
"#;

        let manifest = parse_manifest(content).unwrap();
        let warnings = validate_manifest(&manifest).unwrap();
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("license")));
    }
}
