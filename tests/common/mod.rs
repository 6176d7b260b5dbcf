//! Common test utilities and helpers for repofilter tests

#![allow(dead_code)]

use octocrab::Octocrab;
use repofilter::GitHubClient;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Isolated config home for running the binary
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("repofilter");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            config_dir,
        }
    }

    pub fn create_test_config(&self, content: &str) -> PathBuf {
        let config_path = self.config_dir.join("config.yml");
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }

    /// Command for the built binary with config and credentials isolated
    pub fn command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(env!("CARGO_BIN_EXE_repofilter"));
        command
            .env("XDG_CONFIG_HOME", self.temp_dir.path())
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG");
        command
    }
}

/// Upstream repository record as served by the fake API
#[derive(Debug, Clone)]
pub struct MockRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    pub archived: bool,
    pub disabled: bool,
}

impl MockRepository {
    pub fn new(id: u64, name: &str, owner: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            default_branch: "main".to_string(),
            archived: false,
            disabled: false,
        }
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.default_branch = branch.to_string();
        self
    }

    pub fn as_archived(mut self) -> Self {
        self.archived = true;
        self
    }

    pub fn as_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "node_id": format!("R_{}", self.id),
            "name": self.name,
            "full_name": self.full_name,
            "private": false,
            "fork": false,
            "url": format!("https://api.github.com/repos/{}", self.full_name),
            "html_url": format!("https://github.com/{}", self.full_name),
            "default_branch": self.default_branch,
            "archived": self.archived,
            "disabled": self.disabled
        })
    }
}

/// Fake GitHub API serving an organization listing
pub struct FakeGitHub {
    pub server: MockServer,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Serve `repos` for `org`, split into pages of `per_page`, linked with
    /// `rel="next"` headers. Each page must be requested exactly once.
    pub async fn serve_org(&self, org: &str, repos: &[MockRepository], per_page: usize) {
        let chunks: Vec<&[MockRepository]> = if repos.is_empty() {
            vec![repos]
        } else {
            repos.chunks(per_page).collect()
        };
        let page_count = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let page = index + 1;
            let body: Vec<Value> = chunk.iter().map(MockRepository::to_json).collect();

            let mut response = ResponseTemplate::new(200).set_body_json(body);
            if page < page_count {
                response = response.insert_header(
                    "Link",
                    format!(
                        "<{}/orgs/{}/repos?per_page={}&page={}>; rel=\"next\"",
                        self.server.uri(),
                        org,
                        per_page,
                        page + 1
                    )
                    .as_str(),
                );
            }

            Mock::given(method("GET"))
                .and(path(format!("/orgs/{}/repos", org)))
                .and(query_param("page", page.to_string()))
                .respond_with(response)
                .expect(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Fail every listing request for `org` with `status`
    pub async fn fail_org(&self, org: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/orgs/{}/repos", org)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&self.server)
            .await;
    }

    pub fn client(&self) -> GitHubClient {
        let octocrab = Octocrab::builder()
            .base_uri(self.server.uri())
            .expect("Invalid mock server URI")
            .personal_token("ghp_testtoken".to_string())
            .build()
            .expect("Failed to build octocrab client");

        GitHubClient::from_octocrab(octocrab)
    }
}

/// Test data sets for common scenarios
pub struct TestDataSets;

impl TestDataSets {
    /// Mix of active, archived and disabled repositories
    pub fn mixed_repositories() -> Vec<MockRepository> {
        vec![
            MockRepository::new(1, "api-gateway", "acme"),
            MockRepository::new(2, "web-app", "acme").with_default_branch("develop"),
            MockRepository::new(3, "internal-tool", "acme").as_archived(),
            MockRepository::new(4, "api-legacy", "acme").as_disabled(),
        ]
    }

    /// `count` active repositories named `repo-000`, `repo-001`, ...
    pub fn numbered_repositories(count: u64) -> Vec<MockRepository> {
        (0..count)
            .map(|i| MockRepository::new(i + 1, &format!("repo-{:03}", i), "acme"))
            .collect()
    }
}
