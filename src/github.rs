use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, Page, models, params};
use tracing::debug;

use crate::{
    config::AuthConfig,
    types::{HostError, PullRequest, RepoHost, Repository},
};

/// Page size for list requests. Only the first page is read.
const PER_PAGE: u8 = 100;

/// How the client authenticates against GitHub.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(..)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Picks credentials from the configuration, falling back to the
    /// environment and the `gh` CLI for a token.
    pub fn resolve(auth: &AuthConfig) -> Result<Credentials> {
        if let (Some(username), Some(password)) = (&auth.username, &auth.password) {
            return Ok(Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            });
        }

        if let Some(token) = auth.token.as_ref().filter(|t| !t.trim().is_empty()) {
            return Ok(Credentials::Token(token.trim().to_string()));
        }

        get_github_token().map(Credentials::Token)
    }
}

pub fn get_github_token() -> Result<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = std::env::var(var)
            && !token.trim().is_empty()
        {
            return Ok(token.trim().to_string());
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("No GitHub credentials configured and the gh CLI is not available")?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// [`RepoHost`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Creates an authenticated client.
    pub fn connect(credentials: &Credentials) -> Result<Self> {
        let builder = Octocrab::builder();
        let builder = match credentials {
            Credentials::Token(token) => builder.personal_token(token.clone()),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username.clone(), password.clone())
            }
        };
        let octocrab = builder.build().context("Failed to create GitHub client")?;
        Ok(Self::new(octocrab))
    }
}

/// Maps a 404 response to [`HostError::NotFound`]; anything else keeps its
/// context and propagates.
fn classify(err: octocrab::Error, what: String) -> HostError {
    if let octocrab::Error::GitHub { source, .. } = &err
        && source.status_code.as_u16() == 404
    {
        debug!("{what}: not found");
        return HostError::NotFound;
    }
    HostError::Other(anyhow::Error::new(err).context(what))
}

fn convert_repository(repo: models::Repository) -> Repository {
    Repository {
        name: repo.name,
        fork: repo.fork.unwrap_or(false),
    }
}

fn convert_pull_request(pr: models::pulls::PullRequest) -> Option<PullRequest> {
    let Some(created_at) = pr.created_at else {
        debug!(number = pr.number, "skipping pull request without creation date");
        return None;
    };

    Some(PullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        author_login: pr
            .user
            .map(|user| user.login)
            .unwrap_or_else(|| "Unknown".to_string()),
        created_at,
        updated_at: pr.updated_at.unwrap_or(created_at),
        url: pr.html_url.map(|url| url.to_string()).unwrap_or_default(),
    })
}

#[async_trait]
impl RepoHost for GitHub {
    async fn user_repositories(&self, owner: &str) -> Result<Vec<Repository>, HostError> {
        debug!(owner, "listing repositories");

        let route = format!("/users/{owner}/repos");
        let query = serde_json::json!({ "type": "owner", "per_page": PER_PAGE });
        let page: Page<models::Repository> = self
            .octocrab
            .get(&route, Some(&query))
            .await
            .map_err(|e| classify(e, format!("Failed to list repositories of '{owner}'")))?;

        Ok(page.items.into_iter().map(convert_repository).collect())
    }

    async fn repository(&self, owner: &str, name: &str) -> Result<Repository, HostError> {
        debug!(owner, repo = name, "fetching repository");

        let repo = self
            .octocrab
            .repos(owner, name)
            .get()
            .await
            .map_err(|e| classify(e, format!("Failed to fetch repository '{owner}/{name}'")))?;

        Ok(convert_repository(repo))
    }

    async fn open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, HostError> {
        debug!(owner, repo, "listing open pull requests");

        let page = self
            .octocrab
            .pulls(owner, repo)
            .list()
            .state(params::State::Open)
            .per_page(PER_PAGE)
            .send()
            .await
            .map_err(|e| {
                classify(
                    e,
                    format!("Failed to list pull requests of '{owner}/{repo}'"),
                )
            })?;

        Ok(page
            .items
            .into_iter()
            .filter_map(convert_pull_request)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_preferred_when_complete() {
        let auth = AuthConfig {
            username: Some("bot".into()),
            password: Some("secret".into()),
            token: Some("ghp_token".into()),
        };

        assert_eq!(
            Credentials::resolve(&auth).unwrap(),
            Credentials::Basic {
                username: "bot".into(),
                password: "secret".into(),
            }
        );
    }

    #[test]
    fn test_configured_token_used_without_password() {
        let auth = AuthConfig {
            username: Some("bot".into()),
            password: None,
            token: Some(" ghp_token \n".into()),
        };

        assert_eq!(
            Credentials::resolve(&auth).unwrap(),
            Credentials::Token("ghp_token".into())
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let token = format!("{:?}", Credentials::Token("ghp_secret".into()));
        let basic = format!(
            "{:?}",
            Credentials::Basic {
                username: "bot".into(),
                password: "hunter2".into(),
            }
        );

        assert!(!token.contains("ghp_secret"));
        assert!(basic.contains("bot"));
        assert!(!basic.contains("hunter2"));
    }
}
