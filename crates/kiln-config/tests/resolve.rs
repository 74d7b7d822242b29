//! Properties of environment-driven resolution.

use kiln_config::{
    BuildEnvironment, ConfigDiscovery, ConfigError, ConfigResolver, Mode, ProjectConfig,
    SourceMapMode,
};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const ENVIRONMENTS: [BuildEnvironment; 2] =
    [BuildEnvironment::Development, BuildEnvironment::Production];

fn resolver() -> ConfigResolver {
    ConfigResolver::new(ProjectConfig::default(), "/project")
}

#[test]
fn source_maps_disabled_iff_production() {
    for env in ENVIRONMENTS {
        let config = resolver().resolve(env).expect("resolve");
        assert_eq!(
            config.source_map() == SourceMapMode::Disabled,
            config.mode() == Mode::Production,
            "invariant broken for {env}"
        );
    }
}

#[test]
fn watch_iff_development() {
    let prod = resolver().resolve(BuildEnvironment::Production).unwrap();
    assert!(!prod.watch());

    let dev = resolver().resolve(BuildEnvironment::Development).unwrap();
    assert!(dev.watch());
}

#[test]
fn resolution_is_idempotent() {
    let resolver = resolver();
    for env in ENVIRONMENTS {
        let first = resolver.resolve(env).unwrap();
        let second = resolver.resolve(env).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn string_environments_resolve_like_enum_values() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve_str("production").unwrap(),
        resolver.resolve(BuildEnvironment::Production).unwrap()
    );
}

#[test]
fn unrecognized_environment_produces_no_config() {
    for value in ["staging", "", "PRODUCTIONS", "test"] {
        let result = resolver().resolve_str(value);
        assert!(
            matches!(result, Err(ConfigError::UnknownEnvironment { .. })),
            "'{value}' should be rejected"
        );
    }
}

#[test]
#[serial]
fn invariants_hold_for_file_based_config_with_profiles() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("kiln.toml"),
        r#"
base_path = "web"
source_map = "external"

[entries]
app = "src/app.tsx"
admin = "src/admin.tsx"

[output]
dir = "build"

[profiles.production.output]
filename = "[name].[contenthash].js"
"#,
    )
    .unwrap();

    let project = ConfigDiscovery::new(dir.path()).load().unwrap();
    let resolver = ConfigResolver::new(project, dir.path());

    let dev = resolver.resolve(BuildEnvironment::Development).unwrap();
    assert_eq!(dev.source_map(), SourceMapMode::External);
    assert_eq!(dev.output().filename, "[name].js");
    assert_eq!(dev.output_dir(), dir.path().join("web/build"));

    let prod = resolver.resolve(BuildEnvironment::Production).unwrap();
    assert_eq!(prod.source_map(), SourceMapMode::Disabled);
    assert_eq!(prod.output().filename, "[name].[contenthash].js");
    assert_eq!(prod.entries().len(), 2);
    assert!(prod.entries().contains_key("app"));
    assert_eq!(
        prod.entries()["admin"],
        dir.path().join("web").join(PathBuf::from("src/admin.tsx"))
    );
}

#[test]
#[serial]
fn environment_variables_override_the_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("kiln.toml"),
        "[output]\ndir = \"dist\"\nfilename = \"[name].js\"\n",
    )
    .unwrap();

    unsafe {
        std::env::set_var("KILN_OUTPUT__DIR", "build");
    }
    let loaded = ConfigDiscovery::new(dir.path()).load();
    unsafe {
        std::env::remove_var("KILN_OUTPUT__DIR");
    }

    let project = loaded.unwrap();
    assert_eq!(project.output.dir, PathBuf::from("build"));
    assert_eq!(project.output.filename, "[name].js");

    let config = ConfigResolver::new(project, dir.path())
        .resolve(BuildEnvironment::Production)
        .unwrap();
    assert_eq!(config.output_dir(), dir.path().join("static/js/build"));

    let without_override = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(without_override.output.dir, PathBuf::from("dist"));
}
