//! Compose and env file selection tests

use std::fs;
use std::path::Path;

use komodo_import::stacks::select::{
    parse_env_config, select_compose_files, select_env_files, EnvConfig, EnvOptions,
    DEFAULT_COMPOSE_GLOB, DEFAULT_ENV_GLOB,
};

fn touch(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn env_options(write_env: bool, path_prefix: Option<&str>) -> EnvOptions<'_> {
    EnvOptions {
        env_file_glob: DEFAULT_ENV_GLOB,
        write_env,
        komodo_env_name: ".komodoEnv",
        path_prefix,
    }
}

#[test]
fn test_default_glob_komodo_default_is_omitted() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "compose.yaml", "services: {}");

    let selected = select_compose_files(DEFAULT_COMPOSE_GLOB, tmp.path()).unwrap();
    assert!(selected.is_none());
}

#[test]
fn test_default_glob_selects_single_best_match() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "docker-compose.yaml", "services: {}");
    touch(tmp.path(), "docker-compose.test.yaml", "services: {}");
    touch(tmp.path(), "nested/compose.yaml", "services: {}");

    let selected = select_compose_files(DEFAULT_COMPOSE_GLOB, tmp.path()).unwrap();
    assert_eq!(selected, Some(vec!["docker-compose.yaml".to_string()]));
}

#[test]
fn test_default_glob_prefers_compose_over_docker_compose() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "docker-compose.yaml", "services: {}");
    touch(tmp.path(), "compose.yaml", "services: {}");

    // compose.yaml wins and is Komodo's default, so nothing is written
    let selected = select_compose_files(DEFAULT_COMPOSE_GLOB, tmp.path()).unwrap();
    assert!(selected.is_none());
}

#[test]
fn test_custom_glob_selects_all_matches_sorted() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "docker-compose.yaml", "services: {}");
    touch(tmp.path(), "compose.override.yaml", "services: {}");

    let selected = select_compose_files("**/*compose*.yaml", tmp.path()).unwrap();
    assert_eq!(
        selected,
        Some(vec![
            "compose.override.yaml".to_string(),
            "docker-compose.yaml".to_string()
        ])
    );
}

#[test]
fn test_custom_glob_single_compose_yaml_is_kept() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "compose.yaml", "services: {}");

    let selected = select_compose_files("*.yaml", tmp.path()).unwrap();
    assert_eq!(selected, Some(vec!["compose.yaml".to_string()]));
}

#[test]
fn test_no_compose_files() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "README.md", "");

    assert!(select_compose_files(DEFAULT_COMPOSE_GLOB, tmp.path()).unwrap().is_none());
    assert!(select_env_files(DEFAULT_ENV_GLOB, tmp.path()).unwrap().is_none());
}

#[tokio::test]
async fn test_env_files_are_referenced() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), ".env", "FOO=bar");
    touch(tmp.path(), "nested/additional.env", "BAZ=qux");

    let env = parse_env_config(tmp.path(), &env_options(false, None))
        .await
        .unwrap();
    assert_eq!(env.env_file_path.as_deref(), Some(".komodoEnv"));
    assert_eq!(
        env.additional_env_files,
        Some(vec![".env".to_string(), "nested/additional.env".to_string()])
    );
    assert!(env.environment.is_none());
}

#[tokio::test]
async fn test_env_files_prefixed_inside_repository() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), ".env", "FOO=bar");

    let env = parse_env_config(tmp.path(), &env_options(false, Some("stacks/web")))
        .await
        .unwrap();
    assert_eq!(env.additional_env_files, Some(vec!["stacks/web/.env".to_string()]));
}

#[tokio::test]
async fn test_env_contents_are_inlined() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), ".env", "FOO=bar");
    touch(tmp.path(), "empty.env", "  \n");
    touch(tmp.path(), "nested/additional.env", "BAZ=qux");

    let env = parse_env_config(tmp.path(), &env_options(true, None))
        .await
        .unwrap();
    assert_eq!(
        env,
        EnvConfig {
            env_file_path: None,
            additional_env_files: None,
            environment: Some("FOO=bar\nBAZ=qux".to_string()),
        }
    );
}

#[tokio::test]
async fn test_no_env_files_gives_empty_config() {
    let tmp = tempfile::tempdir().unwrap();
    let env = parse_env_config(tmp.path(), &env_options(true, None))
        .await
        .unwrap();
    assert_eq!(env, EnvConfig::default());
}
