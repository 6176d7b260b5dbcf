//! repofilter - Pattern-filtered repository listing for a GitHub organization
//!
//! Given an ordered list of regular expressions, repofilter enumerates every
//! repository of an organization, skips archived and disabled ones, and
//! returns `{name, full_name, default_branch}` for each filter a repository's
//! name matches. The result is keyed by the concatenated filters.
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and typed read input
//! - [`filter`]: Compiled repository name filters
//! - [`github`]: GitHub API integration, authentication and paged listing
//! - [`datasource`]: The read pipeline and result record
//! - [`error`]: Error taxonomy of a read

pub mod config;
pub mod datasource;
pub mod error;
pub mod filter;
pub mod github;

pub use config::{Config, ReadInput};
pub use datasource::{ReadResult, RepositoriesDataSource, RepositorySummary};
pub use error::DataSourceError;
pub use filter::FilterSet;
pub use github::{GitHubClient, RepositoryLister, RepositoryPage, UpstreamRepository};
