//! Stack builder and discovery tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use async_trait::async_trait;
use komodo_client::{GitProviderAccount, RepoListItem, RepoListItemInfo};
use komodo_import::app::options::{
    DiscoveryOptions, ExportOptions, ImportOptions, StackOptions, StackSource,
};
use komodo_import::app::run::run_with;
use komodo_import::docker::compose::{COMPOSE_CONFIG_FILES_LABEL, COMPOSE_WORKING_DIR_LABEL};
use komodo_import::docker::{Container, ContainerSource, COMPOSE_PROJECT_LABEL};
use komodo_import::errors::ImportError;
use komodo_import::filesys::paths::{resolve_directories, DirectoryConfig, DirectoryValues};
use komodo_import::komodo::{CachedRegistry, KomodoRegistry};
use komodo_import::stacks::{
    build_file_stack, DiscoveredVia, RepoRef, StackBuilder, StackCandidate, TomlStack,
};

const HOST: &str = "/home/me/stacks";

struct FakeDocker(Vec<Container>);

#[async_trait]
impl ContainerSource for FakeDocker {
    async fn list_containers(&self, _label: &str) -> Vec<Container> {
        self.0.clone()
    }
}

struct StaticRegistry {
    repos: Vec<RepoListItem>,
    providers: Vec<GitProviderAccount>,
}

#[async_trait]
impl KomodoRegistry for StaticRegistry {
    async fn list_repos(&self) -> Result<Vec<RepoListItem>, ImportError> {
        Ok(self.repos.clone())
    }

    async fn list_git_provider_accounts(&self) -> Result<Vec<GitProviderAccount>, ImportError> {
        Ok(self.providers.clone())
    }
}

fn touch(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=Komodo Import",
            "-c",
            "user.email=import@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {:?} failed in {}", args, dir.display());
}

/// Clone a fresh single-commit repository into `dest` and point its origin
/// at `remote_url`
fn clone_repo(upstream_root: &Path, dest: &Path, remote_url: &str) {
    let upstream = upstream_root.join("upstream");
    if !upstream.exists() {
        fs::create_dir_all(&upstream).unwrap();
        git(&upstream, &["init", "-q"]);
        git(&upstream, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&upstream, &["commit", "-q", "--allow-empty", "-m", "initial"]);
    }
    let parent = dest.parent().unwrap();
    fs::create_dir_all(parent).unwrap();
    git(
        parent,
        &[
            "clone",
            "-q",
            upstream.to_str().unwrap(),
            dest.file_name().unwrap().to_str().unwrap(),
        ],
    );
    git(dest, &["remote", "set-url", "origin", remote_url]);
}

async fn dirs(mount: &Path, scan: Option<&str>) -> DirectoryConfig {
    resolve_directories(&DirectoryValues {
        mount: mount.to_string_lossy().to_string(),
        host: Some(HOST.to_string()),
        scan: scan.map(String::from),
    })
    .await
    .unwrap()
}

fn stack_options() -> StackOptions {
    StackOptions {
        server: "local".to_string(),
        ..Default::default()
    }
}

fn builder(
    dirs: DirectoryConfig,
    discovery: DiscoveryOptions,
    containers: Vec<Container>,
    registry: Option<StaticRegistry>,
) -> StackBuilder {
    StackBuilder::new(
        stack_options(),
        discovery,
        dirs,
        Arc::new(FakeDocker(containers)),
        registry.map(|r| Arc::new(CachedRegistry::new(Arc::new(r)))),
    )
}

fn compose_container(project: &str, working_dir: &str, files: &[&str]) -> Container {
    let config_files = files
        .iter()
        .map(|f| format!("{}/{}", working_dir, f))
        .collect::<Vec<_>>()
        .join(",");
    Container {
        id: format!("{}-1", project),
        image: "nginx:latest".to_string(),
        labels: [
            (COMPOSE_PROJECT_LABEL, project.to_string()),
            (COMPOSE_WORKING_DIR_LABEL, working_dir.to_string()),
            (COMPOSE_CONFIG_FILES_LABEL, config_files),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        state: Some("running".to_string()),
    }
}

fn find<'a>(stacks: &'a [TomlStack], name: &str) -> &'a TomlStack {
    stacks
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no stack named {name}"))
}

#[tokio::test]
async fn test_files_on_server_record() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "web/docker-compose.yaml", "services: {}");
    let dirs = dirs(tmp.path(), None).await;

    let candidate = StackCandidate::new(dirs.mount.join("web"), DiscoveredVia::Folder);
    let stack = build_file_stack(&candidate, &dirs, &stack_options()).await.unwrap();
    assert_eq!(stack.config.file_paths, Some(vec!["docker-compose.yaml".to_string()]));
    assert_eq!(stack.config.run_directory.as_deref(), Some("/home/me/stacks/web"));

    touch(tmp.path(), "web/docker-compose.prod.yaml", "services: {}");
    let options = StackOptions {
        compose_file_glob: "**/docker-compose*.yaml".to_string(),
        ..stack_options()
    };
    let stack = build_file_stack(&candidate, &dirs, &options).await.unwrap();
    assert_eq!(stack.config.file_paths.map(|f| f.len()), Some(2));
}

#[tokio::test]
async fn test_dir_mode_mixes_git_and_files_stacks() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tempfile::tempdir().unwrap();

    touch(tmp.path(), "web/docker-compose.yaml", "services: {}");
    touch(tmp.path(), "web/.env", "FOO=bar");
    touch(tmp.path(), ".hidden/compose.yaml", "services: {}");
    touch(tmp.path(), "notes.txt", "");
    clone_repo(upstream.path(), &tmp.path().join("app"), "https://github.com/me/app.git");
    touch(tmp.path(), "app/compose.yaml", "services: {}");

    let builder = builder(dirs(tmp.path(), None).await, DiscoveryOptions::default(), vec![], None);
    let (stacks, summary) = builder.build_stacks().await.unwrap();

    assert_eq!(summary.built, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(stacks.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["app", "web"]);

    let app = find(&stacks, "app");
    assert_eq!(
        app.config.repo,
        Some(RepoRef::Standalone {
            git_provider: None,
            git_account: None,
            git_https: None,
            repo: "me/app".to_string(),
            branch: "main".to_string(),
        })
    );
    assert!(app.config.file_paths.is_none());
    assert!(app.config.files_on_host.is_none());
    assert!(app.config.run_directory.is_none());

    let web = find(&stacks, "web");
    assert!(web.config.repo.is_none());
    assert_eq!(web.config.files_on_host, Some(true));
    assert_eq!(web.config.env_file_path.as_deref(), Some(".komodoEnv"));
    assert_eq!(web.config.additional_env_files, Some(vec![".env".to_string()]));
}

#[tokio::test]
async fn test_git_stack_links_existing_repo() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tempfile::tempdir().unwrap();
    clone_repo(upstream.path(), &tmp.path().join("app"), "https://github.com/Me/App.git");

    let registry = StaticRegistry {
        repos: vec![RepoListItem {
            name: "app-repo".to_string(),
            info: RepoListItemInfo {
                git_provider: "github.com".to_string(),
                repo: "me/app".to_string(),
                branch: "main".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }],
        providers: vec![],
    };
    let builder = builder(
        dirs(tmp.path(), None).await,
        DiscoveryOptions::default(),
        vec![],
        Some(registry),
    );
    let (stacks, _) = builder.build_stacks().await.unwrap();

    assert_eq!(
        stacks[0].config.repo,
        Some(RepoRef::Linked {
            linked_repo: "app-repo".to_string()
        })
    );
}

#[tokio::test]
async fn test_git_stack_with_provider_account() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tempfile::tempdir().unwrap();
    clone_repo(upstream.path(), &tmp.path().join("app"), "http://git.lan:3000/me/app.git");

    let registry = StaticRegistry {
        repos: vec![],
        providers: vec![GitProviderAccount {
            domain: "git.lan:3000".to_string(),
            https: false,
            username: "me".to_string(),
            ..Default::default()
        }],
    };
    let builder = builder(
        dirs(tmp.path(), None).await,
        DiscoveryOptions::default(),
        vec![],
        Some(registry),
    );
    let (stacks, _) = builder.build_stacks().await.unwrap();

    assert_eq!(
        stacks[0].config.repo,
        Some(RepoRef::Standalone {
            git_provider: Some("git.lan:3000".to_string()),
            git_account: Some("me".to_string()),
            git_https: Some(false),
            repo: "me/app".to_string(),
            branch: "main".to_string(),
        })
    );
}

#[tokio::test]
async fn test_folders_inside_repository_use_run_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tempfile::tempdir().unwrap();
    let mono = tmp.path().join("mono");
    clone_repo(upstream.path(), &mono, "git@github.com:me/mono.git");
    touch(&mono, "web/docker-compose.yaml", "services: {}");
    touch(&mono, "web/.env", "FOO=bar");

    let builder = builder(
        dirs(tmp.path(), Some("mono")).await,
        DiscoveryOptions::default(),
        vec![],
        None,
    );
    let (stacks, summary) = builder.build_stacks().await.unwrap();
    assert_eq!(summary.built, 1);

    let web = &stacks[0];
    assert_eq!(web.name, "web");
    assert_eq!(web.config.run_directory.as_deref(), Some("web"));
    assert_eq!(web.config.file_paths, Some(vec!["docker-compose.yaml".to_string()]));
    assert_eq!(web.config.additional_env_files, Some(vec!["web/.env".to_string()]));
    assert!(matches!(
        web.config.repo,
        Some(RepoRef::Standalone { ref repo, .. }) if repo == "me/mono"
    ));
}

#[tokio::test]
async fn test_probing_parents_can_be_disabled() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tempfile::tempdir().unwrap();
    let mono = tmp.path().join("mono");
    clone_repo(upstream.path(), &mono, "https://github.com/me/mono.git");
    touch(&mono, "web/docker-compose.yaml", "services: {}");

    let discovery = DiscoveryOptions {
        probe_parents: false,
        ..Default::default()
    };
    let builder = builder(dirs(tmp.path(), Some("mono")).await, discovery, vec![], None);
    let (stacks, _) = builder.build_stacks().await.unwrap();

    assert!(stacks[0].config.repo.is_none());
    assert_eq!(
        stacks[0].config.run_directory.as_deref(),
        Some("/home/me/stacks/mono/web")
    );
}

#[tokio::test]
async fn test_compose_mode_filters_projects() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "web/compose.prod.yaml", "services: {}");
    touch(tmp.path(), "db/compose.yaml", "services: {}");
    touch(tmp.path(), "skipme/compose.yaml", "services: {}");

    let containers = vec![
        compose_container("web", &format!("{HOST}/web"), &["compose.prod.yaml"]),
        compose_container("database", &format!("{HOST}/db"), &["compose.yaml"]),
        compose_container("web", &format!("{HOST}/elsewhere"), &["compose.yaml"]),
        compose_container("outside", "/opt/outside", &["compose.yaml"]),
        compose_container("internal", "/home/me/stacks/komodo/stacks/internal", &["compose.yaml"]),
        compose_container("skipme", &format!("{HOST}/skipme"), &["compose.yaml"]),
    ];
    let discovery = DiscoveryOptions {
        stacks_from: StackSource::Compose,
        compose_dir_ignore_glob: Some("**/skip*".to_string()),
        ..Default::default()
    };
    let builder = builder(dirs(tmp.path(), None).await, discovery, containers, None);
    let (stacks, summary) = builder.build_stacks().await.unwrap();

    assert_eq!(summary.built, 2);
    assert_eq!(stacks.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["web", "db"]);

    let web = find(&stacks, "web");
    assert!(web.config.project_name.is_none());
    assert_eq!(web.config.file_paths, Some(vec!["compose.prod.yaml".to_string()]));

    let db = find(&stacks, "db");
    assert_eq!(db.config.project_name.as_deref(), Some("database"));
    assert_eq!(db.config.run_directory.as_deref(), Some("/home/me/stacks/db"));
    assert!(db.config.file_paths.is_none());
}

#[tokio::test]
async fn test_failed_candidate_does_not_stop_run() {
    let tmp = tempfile::tempdir().unwrap();
    touch(tmp.path(), "web/compose.yaml", "services: {}");

    let containers = vec![
        compose_container("ghost", &format!("{HOST}/ghost"), &["compose.yaml"]),
        compose_container("web", &format!("{HOST}/web"), &["compose.yaml"]),
    ];
    let discovery = DiscoveryOptions {
        stacks_from: StackSource::Compose,
        ..Default::default()
    };
    let builder = builder(dirs(tmp.path(), None).await, discovery, containers, None);
    let (stacks, summary) = builder.build_stacks().await.unwrap();

    assert_eq!(summary.built, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(stacks[0].name, "web");
}

#[tokio::test]
async fn test_run_writes_sync_file() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    touch(tmp.path(), "web/docker-compose.yaml", "services: {}");

    let options = ImportOptions {
        directories: DirectoryValues {
            mount: tmp.path().to_string_lossy().to_string(),
            host: Some(HOST.to_string()),
            scan: None,
        },
        stack: stack_options(),
        export: ExportOptions {
            log_toml: false,
            output_dir: Some(out.path().to_path_buf()),
        },
        ..Default::default()
    };
    let summary = run_with(options, Arc::new(FakeDocker(vec![]))).await.unwrap();
    assert_eq!(summary.built, 1);

    let written: Vec<PathBuf> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(written.len(), 1);
    let toml = fs::read_to_string(&written[0]).unwrap();
    assert!(toml.contains("[[stack]]"));
    assert!(toml.contains("name = \"web\""));
    assert!(toml.contains("run_directory = \"/home/me/stacks/web\""));
}

#[tokio::test]
async fn test_empty_scan_is_nothing_to_do() {
    let tmp = tempfile::tempdir().unwrap();
    let options = ImportOptions {
        directories: DirectoryValues {
            mount: tmp.path().to_string_lossy().to_string(),
            ..Default::default()
        },
        stack: stack_options(),
        ..Default::default()
    };
    let summary = run_with(options, Arc::new(FakeDocker(vec![]))).await.unwrap();
    assert_eq!(summary.built, 0);
    assert_eq!(summary.failed, 0);
}
