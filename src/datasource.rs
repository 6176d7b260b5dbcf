//! Repositories data source
//!
//! A read runs one linear pipeline: list every repository of the
//! organization, drop archived and disabled ones, emit a summary for every
//! filter a repository's name matches, and key the result by the
//! concatenated filters.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::{ReadInput, MAX_PER_PAGE};
use crate::error::DataSourceError;
use crate::filter::FilterSet;
use crate::github::{fetch_all, RepositoryLister, UpstreamRepository};

/// Summary of a matching repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
}

impl From<&UpstreamRepository> for RepositorySummary {
    fn from(repo: &UpstreamRepository) -> Self {
        Self {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            default_branch: repo.default_branch.clone(),
        }
    }
}

/// Outcome of a successful read
#[derive(Debug, Clone, Serialize)]
pub struct ReadResult {
    /// Concatenation of the raw filters, in input order
    pub id: String,
    pub filters: Vec<String>,
    pub repositories: Vec<RepositorySummary>,
}

impl ReadResult {
    /// Render the result as the record the host persists
    pub fn to_state(&self) -> Result<Value, DataSourceError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Data source listing an organization's repositories by name filters
pub struct RepositoriesDataSource<L> {
    lister: L,
    organization: String,
    per_page: u8,
}

impl<L: RepositoryLister> RepositoriesDataSource<L> {
    pub fn new(lister: L, organization: impl Into<String>) -> Self {
        Self {
            lister,
            organization: organization.into(),
            per_page: MAX_PER_PAGE,
        }
    }

    /// Override the page size (clamped to 1..=100)
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Run a read for the given filters
    pub async fn read(&self, input: &ReadInput) -> Result<ReadResult, DataSourceError> {
        let filters = input.filters();

        info!(
            "Listing repositories for {} with {} filter(s)",
            self.organization,
            filters.len()
        );

        let repositories = fetch_all(&self.lister, &self.organization, self.per_page).await?;
        let matched = filter_and_shape(&repositories, filters);

        info!(
            "{} of {} repositories matched",
            matched.len(),
            repositories.len()
        );

        Ok(ReadResult {
            id: filters.resource_id(),
            filters: filters.raw(),
            repositories: matched,
        })
    }
}

/// Emit one summary per (repository, matching filter) pair.
///
/// Archived and disabled repositories are skipped before any filter is
/// tested. A repository matching several filters is emitted once per match.
pub fn filter_and_shape(
    repositories: &[UpstreamRepository],
    filters: &FilterSet,
) -> Vec<RepositorySummary> {
    let mut summaries = Vec::new();

    for repo in repositories {
        if repo.is_excluded() {
            continue;
        }

        for _ in filters.matches(&repo.name) {
            debug!("adding repository: {}", repo.full_name);
            summaries.push(RepositorySummary::from(repo));
        }
    }

    summaries
}

/// Field declarations of the data source, as exposed to the host.
///
/// `repositories` is a list rather than a set so that a repository matched
/// by several filters keeps one entry per match.
pub fn schema() -> Value {
    let required_string = json!({ "type": "string", "required": true });

    json!({
        "filters": {
            "type": "list",
            "elem": { "type": "string" },
            "required": true
        },
        "repositories": {
            "type": "list",
            "optional": true,
            "computed": true,
            "elem": {
                "name": required_string,
                "full_name": required_string,
                "default_branch": required_string
            }
        }
    })
}
