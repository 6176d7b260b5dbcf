use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use octocrab::models::Repository;
use octocrab::Octocrab;
use std::env;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DataSourceError;

/// Page cursor returned when there are no further pages
pub const LAST_PAGE: u32 = 0;

/// Read-only view of an upstream repository record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRepository {
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    pub archived: bool,
    pub disabled: bool,
}

impl UpstreamRepository {
    /// Archived and disabled repositories are never reported
    pub fn is_excluded(&self) -> bool {
        self.archived || self.disabled
    }

    fn from_octocrab(org: &str, repo: Repository) -> Self {
        let full_name = repo
            .full_name
            .unwrap_or_else(|| format!("{}/{}", org, repo.name));

        Self {
            name: repo.name,
            full_name,
            default_branch: repo.default_branch.unwrap_or_default(),
            archived: repo.archived.unwrap_or(false),
            disabled: repo.disabled.unwrap_or(false),
        }
    }
}

/// One page of an organization listing
#[derive(Debug, Clone, Default)]
pub struct RepositoryPage {
    pub records: Vec<UpstreamRepository>,
    /// Cursor for the following page, [`LAST_PAGE`] when exhausted
    pub next_page: u32,
}

/// Capability to list an organization's repositories one page at a time
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    async fn list_by_org(&self, org: &str, per_page: u8, page: u32) -> Result<RepositoryPage>;
}

/// Walk the organization listing until the next-page cursor is exhausted.
///
/// Records keep upstream order. A failed page aborts the walk and drops
/// everything accumulated so far.
pub async fn fetch_all<L>(
    lister: &L,
    org: &str,
    per_page: u8,
) -> std::result::Result<Vec<UpstreamRepository>, DataSourceError>
where
    L: RepositoryLister + ?Sized,
{
    let mut repositories = Vec::new();
    let mut page = 1u32;

    loop {
        debug!("Fetching repositories for {} page {}", org, page);

        let listing = lister
            .list_by_org(org, per_page, page)
            .await
            .map_err(|e| DataSourceError::UpstreamFetch {
                org: org.to_string(),
                page,
                message: format!("{:#}", e),
            })?;

        repositories.extend(listing.records);

        if listing.next_page == LAST_PAGE {
            break;
        }
        page = listing.next_page;
    }

    info!(
        "Found {} repositories for organization: {}",
        repositories.len(),
        org
    );
    Ok(repositories)
}

/// Extract the `page` query parameter from a pagination link
fn page_from_query(query: Option<&str>) -> u32 {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
        .unwrap_or(LAST_PAGE)
}

/// Keep the HTTP status of GitHub API errors, which octocrab's Display drops
fn describe_api_error(err: octocrab::Error) -> anyhow::Error {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            anyhow!("{}: {}", source.status_code, source.message)
        }
        other => anyhow::Error::new(other),
    }
}

/// GitHub client wrapper with authentication management
pub struct GitHubClient {
    client: Octocrab,
}

/// GitHub authentication strategies
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// Use GitHub CLI authentication
    GitHubCLI,
    /// Use environment variable token
    EnvironmentToken,
}

impl GitHubClient {
    /// Create a new GitHub client with automatic authentication
    pub fn new(config: &Config) -> Result<Self> {
        let (auth_strategy, token) = Self::detect_authentication(config)?;

        info!("Using authentication strategy: {:?}", auth_strategy);

        let mut builder = Octocrab::builder();
        if let Some(base_url) = &config.github.base_url {
            debug!("Using GitHub API root: {}", base_url);
            builder = builder
                .base_uri(base_url.as_str())
                .with_context(|| format!("Invalid GitHub base URL: {}", base_url))?;
        }

        let client = builder
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }

    /// Wrap an already configured octocrab instance
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self { client }
    }

    /// Login of the user owning the token
    pub async fn authenticated_user(&self) -> Result<String> {
        let user = self
            .client
            .current()
            .user()
            .await
            .context("Failed to get current user information. Check your authentication.")?;

        Ok(user.login)
    }

    /// Detect and obtain GitHub authentication
    fn detect_authentication(config: &Config) -> Result<(AuthStrategy, String)> {
        match config.github.auth_method.as_str() {
            "auto" => {
                // Try GitHub CLI first, then environment token
                if let Ok(token) = Self::try_github_cli() {
                    Ok((AuthStrategy::GitHubCLI, token))
                } else if let Ok(token) = Self::try_environment_token() {
                    Ok((AuthStrategy::EnvironmentToken, token))
                } else {
                    Err(anyhow!(
                        "No GitHub authentication found. Please either:\n\
                         1. Install and authenticate GitHub CLI: gh auth login\n\
                         2. Set GITHUB_TOKEN environment variable"
                    ))
                }
            }
            "gh_cli" => {
                let token = Self::try_github_cli()
                    .context("GitHub CLI authentication failed. Run: gh auth login")?;
                Ok((AuthStrategy::GitHubCLI, token))
            }
            "token" => {
                let token = Self::try_environment_token()
                    .context("GITHUB_TOKEN environment variable not found or invalid")?;
                Ok((AuthStrategy::EnvironmentToken, token))
            }
            other => Err(anyhow!("Unknown auth method: {}", other)),
        }
    }

    /// Try to get token from GitHub CLI
    fn try_github_cli() -> Result<String> {
        debug!("Attempting GitHub CLI authentication");

        let token_output = Command::new("gh")
            .args(["auth", "token"])
            .output()
            .context("Failed to run GitHub CLI (gh)")?;

        if !token_output.status.success() {
            return Err(anyhow!(
                "Failed to retrieve token from GitHub CLI: {}",
                String::from_utf8_lossy(&token_output.stderr)
            ));
        }

        let token = String::from_utf8(token_output.stdout)
            .context("GitHub CLI token is not valid UTF-8")?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(anyhow!("GitHub CLI returned empty token"));
        }

        debug!("Successfully obtained token from GitHub CLI");
        Ok(token)
    }

    /// Try to get token from environment variable
    fn try_environment_token() -> Result<String> {
        debug!("Attempting environment variable authentication");

        let token = env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable not set")?;

        if token.is_empty() {
            return Err(anyhow!("GITHUB_TOKEN is empty"));
        }

        if !token.starts_with("ghp_")
            && !token.starts_with("gho_")
            && !token.starts_with("ghs_")
            && !token.starts_with("github_pat_")
        {
            warn!("GITHUB_TOKEN doesn't look like a valid GitHub token (should start with ghp_, gho_, ghs_ or github_pat_)");
        }

        debug!("Successfully found GITHUB_TOKEN environment variable");
        Ok(token)
    }
}

#[async_trait]
impl RepositoryLister for GitHubClient {
    async fn list_by_org(&self, org: &str, per_page: u8, page: u32) -> Result<RepositoryPage> {
        let listing = self
            .client
            .orgs(org)
            .list_repos()
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .map_err(describe_api_error)?;

        let next_page = page_from_query(listing.next.as_ref().and_then(|uri| uri.query()));

        let records = listing
            .items
            .into_iter()
            .map(|repo| UpstreamRepository::from_octocrab(org, repo))
            .collect();

        Ok(RepositoryPage { records, next_page })
    }
}
