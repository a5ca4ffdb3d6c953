use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    fetch::{fetch_repositories, missing_repository_notice},
    types::{HostError, OwnerSpec, PullRequest, RepoHost, Repository, Severity, Targets},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Report forked repositories (annotated as such) instead of skipping them.
    pub include_forks: bool,
}

/// A pull request with the severity it was classified under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullEntry {
    pub pull: PullRequest,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryBlock {
    pub name: String,
    pub fork: bool,
    pub pulls: Vec<PullEntry>,
}

/// One unit of report output, rendered in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A user-visible warning, e.g. an unknown owner.
    Notice(String),
    Repository(RepositoryBlock),
}

impl Block {
    pub fn as_repository(&self) -> Option<&RepositoryBlock> {
        match self {
            Block::Repository(block) => Some(block),
            Block::Notice(_) => None,
        }
    }

    pub fn as_notice(&self) -> Option<&str> {
        match self {
            Block::Notice(text) => Some(text),
            Block::Repository(_) => None,
        }
    }
}

/// Builds blocks for every repository of `owner` that has open pull
/// requests. Forks are skipped unless `options.include_forks` is set.
pub async fn report_repositories<H>(
    owner: &str,
    repositories: &[Repository],
    host: &H,
    now: DateTime<Utc>,
    options: ReportOptions,
) -> Result<Vec<Block>>
where
    H: RepoHost + Sync,
{
    let mut blocks = Vec::new();

    for repo in repositories {
        if repo.fork && !options.include_forks {
            debug!(owner, repo = %repo.name, "skipping fork");
            continue;
        }

        let pulls = match host.open_pull_requests(owner, &repo.name).await {
            Ok(pulls) => pulls,
            Err(HostError::NotFound) => {
                debug!(owner, repo = %repo.name, "repository disappeared while listing pull requests");
                blocks.push(Block::Notice(missing_repository_notice(owner, &repo.name)));
                continue;
            }
            Err(HostError::Other(err)) => return Err(err),
        };

        if pulls.is_empty() {
            continue;
        }

        let pulls = pulls
            .into_iter()
            .map(|pull| PullEntry {
                severity: pull.severity(now),
                pull,
            })
            .collect();

        blocks.push(Block::Repository(RepositoryBlock {
            name: repo.name.clone(),
            fork: repo.fork,
            pulls,
        }));
    }

    Ok(blocks)
}

/// Fetches and reports a single owner: notices first, then repositories.
pub async fn report_owner<H>(
    owner: &str,
    spec: &OwnerSpec,
    host: &H,
    now: DateTime<Utc>,
    options: ReportOptions,
) -> Result<Vec<Block>>
where
    H: RepoHost + Sync,
{
    let fetched = fetch_repositories(owner, spec, host).await?;

    let mut blocks: Vec<Block> = fetched.notices.into_iter().map(Block::Notice).collect();
    blocks.extend(report_repositories(owner, &fetched.repositories, host, now, options).await?);

    Ok(blocks)
}

/// Reports every target in order.
pub async fn build_report<H>(
    targets: &Targets,
    host: &H,
    now: DateTime<Utc>,
    options: ReportOptions,
) -> Result<Vec<Block>>
where
    H: RepoHost + Sync,
{
    let mut blocks = Vec::new();
    for target in targets {
        blocks.extend(report_owner(&target.owner, &target.spec, host, now, options).await?);
    }
    Ok(blocks)
}
