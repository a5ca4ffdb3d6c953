//! open-prs: report open pull requests across GitHub users and organizations.
//!
//! Resolves the owners to look at (command line or configuration file),
//! fetches their repositories through a [`RepoHost`], and renders one block
//! per repository with open pull requests, styled by how long each pull
//! request has been waiting.

pub mod cli;
pub mod config;
pub mod fetch;
pub mod github;
pub mod render;
pub mod report;
pub mod targets;
pub mod types;

pub use cli::{ColorChoice, Invocation, parse_args};
pub use config::{AuthConfig, Config, ConfigError};
pub use fetch::{Fetched, fetch_repositories};
pub use github::{Credentials, GitHub};
pub use render::{Palette, Renderer, Style};
pub use report::{
    Block, PullEntry, ReportOptions, RepositoryBlock, build_report, report_owner,
    report_repositories,
};
pub use targets::resolve_targets;
pub use types::{
    HostError, OwnerSpec, OwnerTarget, PullRequest, RepoHost, Repository, Severity, Targets,
};
