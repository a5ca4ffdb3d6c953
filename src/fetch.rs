use anyhow::Result;
use tracing::debug;

use crate::types::{HostError, OwnerSpec, RepoHost, Repository};

/// Repositories selected for one owner, plus the notices raised while
/// looking them up.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub repositories: Vec<Repository>,
    pub notices: Vec<String>,
}

pub fn missing_repository_notice(owner: &str, repo: &str) -> String {
    format!("No user '{owner}' or no repository '{repo}'")
}

pub fn missing_owner_notice(owner: &str) -> String {
    format!("User '{owner}' not found")
}

pub fn no_repositories_notice(owner: &str) -> String {
    format!("User '{owner}' has no public repositories")
}

/// Looks up the repositories `spec` selects for `owner`.
///
/// A missing owner or repository becomes a notice and never an error; any
/// other host failure is returned to the caller.
pub async fn fetch_repositories<H>(owner: &str, spec: &OwnerSpec, host: &H) -> Result<Fetched>
where
    H: RepoHost + Sync,
{
    let mut fetched = Fetched::default();

    match spec {
        OwnerSpec::Explicit { include } => {
            for name in include {
                match host.repository(owner, name).await {
                    Ok(repo) => fetched.repositories.push(repo),
                    Err(HostError::NotFound) => {
                        debug!(owner, repo = %name, "repository not found");
                        fetched
                            .notices
                            .push(missing_repository_notice(owner, name));
                    }
                    Err(HostError::Other(err)) => return Err(err),
                }
            }
        }
        OwnerSpec::AllPublic { exclude } => {
            let repositories = match host.user_repositories(owner).await {
                Ok(repositories) => repositories,
                Err(HostError::NotFound) => {
                    debug!(owner, "owner not found");
                    fetched.notices.push(missing_owner_notice(owner));
                    return Ok(fetched);
                }
                Err(HostError::Other(err)) => return Err(err),
            };

            if repositories.is_empty() {
                fetched.notices.push(no_repositories_notice(owner));
            }

            fetched.repositories = repositories
                .into_iter()
                .filter(|repo| !exclude.contains(&repo.name))
                .collect();
        }
    }

    debug!(
        owner,
        repositories = fetched.repositories.len(),
        notices = fetched.notices.len(),
        "fetched repositories"
    );

    Ok(fetched)
}
