use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Pull requests older than this are reported with [`Severity::Warning`].
pub const WARNING_AGE_DAYS: i64 = 30;

/// Pull requests older than this are reported with [`Severity::Error`].
pub const ERROR_AGE_DAYS: i64 = 60;

/// Which repositories of an owner end up in the report.
///
/// Chosen once while resolving targets; the two variants never mix, so an
/// owner is either scanned in full (minus exclusions) or restricted to an
/// explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerSpec {
    /// Every public repository of the owner except the excluded names.
    AllPublic { exclude: BTreeSet<String> },
    /// Only the named repositories, in the order given.
    Explicit { include: Vec<String> },
}

impl OwnerSpec {
    pub fn all_public() -> Self {
        OwnerSpec::AllPublic {
            exclude: BTreeSet::new(),
        }
    }

    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OwnerSpec::AllPublic {
            exclude: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut include: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !include.contains(&name) {
                include.push(name);
            }
        }
        OwnerSpec::Explicit { include }
    }
}

/// An owner together with the repositories to report for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTarget {
    pub owner: String,
    pub spec: OwnerSpec,
}

/// Ordered owner → spec mapping. Owners are unique and keep the order in
/// which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    entries: Vec<OwnerTarget>,
}

impl Targets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the spec for `owner`, keeping its original position.
    pub fn insert(&mut self, owner: impl Into<String>, spec: OwnerSpec) {
        let owner = owner.into();
        match self.entries.iter_mut().find(|t| t.owner == owner) {
            Some(existing) => existing.spec = spec,
            None => self.entries.push(OwnerTarget { owner, spec }),
        }
    }

    pub fn get(&self, owner: &str) -> Option<&OwnerSpec> {
        self.entries
            .iter()
            .find(|t| t.owner == owner)
            .map(|t| &t.spec)
    }

    pub(crate) fn get_mut(&mut self, owner: &str) -> Option<&mut OwnerSpec> {
        self.entries
            .iter_mut()
            .find(|t| t.owner == owner)
            .map(|t| &mut t.spec)
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|t| t.owner.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a OwnerTarget;
    type IntoIter = std::slice::Iter<'a, OwnerTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, OwnerSpec)> for Targets {
    fn from_iter<T: IntoIterator<Item = (S, OwnerSpec)>>(iter: T) -> Self {
        let mut targets = Targets::new();
        for (owner, spec) in iter {
            targets.insert(owner, spec);
        }
        targets
    }
}

/// A repository as seen by the report: only its name and fork flag matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub fork: bool,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fork: false,
        }
    }

    pub fn forked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fork: true,
        }
    }
}

/// Open pull request details needed to render one report entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub author_login: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

impl PullRequest {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    pub fn severity(&self, now: DateTime<Utc>) -> Severity {
        Severity::from_age(self.age(now))
    }
}

/// Age-based classification of a pull request. Only affects styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Thresholds are strict: a pull request exactly 30 days old is still
    /// `Info`, exactly 60 days old is still `Warning`.
    pub fn from_age(age: Duration) -> Self {
        if age > Duration::days(ERROR_AGE_DAYS) {
            Severity::Error
        } else if age > Duration::days(WARNING_AGE_DAYS) {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a [`RepoHost`].
#[derive(Debug, Error)]
pub enum HostError {
    /// The owner or repository does not exist (or is not visible).
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Source-hosting platform the report reads from.
///
/// Every call is awaited before the next one is issued; implementations do
/// not need to be reentrant beyond `Sync`.
#[async_trait]
pub trait RepoHost {
    /// Public repositories owned by a user or organization.
    async fn user_repositories(&self, owner: &str) -> Result<Vec<Repository>, HostError>;

    async fn repository(&self, owner: &str, name: &str) -> Result<Repository, HostError>;

    /// Open pull requests of `owner/repo`, in the order the host returns them.
    async fn open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::from_age(Duration::days(10)), Severity::Info);
        assert_eq!(Severity::from_age(Duration::days(31)), Severity::Warning);
        assert_eq!(Severity::from_age(Duration::days(61)), Severity::Error);
    }

    #[test]
    fn test_severity_boundaries_are_strict() {
        assert_eq!(Severity::from_age(Duration::days(30)), Severity::Info);
        assert_eq!(
            Severity::from_age(Duration::days(30) + Duration::seconds(1)),
            Severity::Warning
        );
        assert_eq!(Severity::from_age(Duration::days(60)), Severity::Warning);
        assert_eq!(
            Severity::from_age(Duration::days(60) + Duration::seconds(1)),
            Severity::Error
        );
    }

    #[test]
    fn test_severity_future_timestamp_is_info() {
        assert_eq!(Severity::from_age(Duration::days(-2)), Severity::Info);
    }

    #[test]
    fn test_explicit_spec_drops_duplicates() {
        let spec = OwnerSpec::explicit(["a", "b", "a", "c"]);
        assert_eq!(
            spec,
            OwnerSpec::Explicit {
                include: vec!["a".into(), "b".into(), "c".into()]
            }
        );
    }

    #[test]
    fn test_targets_keep_first_seen_order() {
        let mut targets = Targets::new();
        targets.insert("zeta", OwnerSpec::all_public());
        targets.insert("alpha", OwnerSpec::all_public());
        targets.insert("zeta", OwnerSpec::explicit(["x"]));

        let owners: Vec<&str> = targets.owners().collect();
        assert_eq!(owners, vec!["zeta", "alpha"]);
        assert_eq!(targets.get("zeta"), Some(&OwnerSpec::explicit(["x"])));
        assert_eq!(targets.len(), 2);
    }
}
