use crate::types::{OwnerSpec, Targets};

/// Splits `owner/repo` into its first two segments; anything after a second
/// `/` is dropped, so `a/b/c` names repository `b` of owner `a`.
///
/// Returns `None` for a bare owner and for arguments whose owner part would
/// be empty (`/foo`), which are then taken whole as owner names.
pub fn split_target(argument: &str) -> Option<(&str, &str)> {
    let (owner, rest) = argument.split_once('/')?;
    if owner.is_empty() {
        return None;
    }
    let repo = rest.split('/').next().unwrap_or(rest);
    Some((owner, repo))
}

/// Turns positional arguments into report targets.
///
/// With no arguments the configured targets are used as they are. Otherwise
/// the configuration is ignored: `owner` selects every public repository of
/// that owner, `owner/repo` adds `repo` to that owner's explicit list. When an
/// owner appears in both forms the bare form wins.
pub fn resolve_targets<S: AsRef<str>>(arguments: &[S], configured: &Targets) -> Targets {
    if arguments.is_empty() {
        return configured.clone();
    }

    let mut targets = Targets::new();

    for argument in arguments {
        let argument = argument.as_ref();
        match split_target(argument) {
            Some((owner, repo)) => match targets.get_mut(owner) {
                Some(OwnerSpec::Explicit { include }) => {
                    if !include.iter().any(|name| name == repo) {
                        include.push(repo.to_string());
                    }
                }
                Some(OwnerSpec::AllPublic { .. }) => {}
                None => targets.insert(owner, OwnerSpec::explicit([repo])),
            },
            None => targets.insert(argument, OwnerSpec::all_public()),
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Targets {
        [
            ("symfony", OwnerSpec::excluding(["website"])),
            ("doctrine", OwnerSpec::explicit(["orm"])),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_no_arguments_returns_configuration() {
        let args: [&str; 0] = [];
        assert_eq!(resolve_targets(&args, &configured()), configured());
    }

    #[test]
    fn test_bare_owners_ignore_configuration() {
        let targets = resolve_targets(&["symfony", "phpcr"], &configured());

        assert_eq!(targets.get("symfony"), Some(&OwnerSpec::all_public()));
        assert_eq!(targets.get("phpcr"), Some(&OwnerSpec::all_public()));
        assert_eq!(targets.get("doctrine"), None);
    }

    #[test]
    fn test_repo_arguments_accumulate_in_first_seen_order() {
        let targets = resolve_targets(
            &["acme/widgets", "other/tool", "acme/gadgets", "acme/widgets"],
            &Targets::new(),
        );

        assert_eq!(
            targets.get("acme"),
            Some(&OwnerSpec::Explicit {
                include: vec!["widgets".into(), "gadgets".into()]
            })
        );
        let owners: Vec<&str> = targets.owners().collect();
        assert_eq!(owners, vec!["acme", "other"]);
    }

    #[test]
    fn test_bare_owner_wins_over_explicit_list() {
        let before = resolve_targets(&["acme", "acme/widgets"], &Targets::new());
        let after = resolve_targets(&["acme/widgets", "other", "acme"], &Targets::new());

        assert_eq!(before.get("acme"), Some(&OwnerSpec::all_public()));
        assert_eq!(after.get("acme"), Some(&OwnerSpec::all_public()));
        let owners: Vec<&str> = after.owners().collect();
        assert_eq!(owners, vec!["acme", "other"]);
    }

    #[test]
    fn test_split_keeps_first_two_segments() {
        assert_eq!(split_target("a/b/c"), Some(("a", "b")));
        assert_eq!(split_target("acme"), None);
        assert_eq!(split_target("/acme"), None);
        assert_eq!(split_target("acme/"), Some(("acme", "")));
    }

    #[test]
    fn test_extra_segments_are_dropped() {
        let targets = resolve_targets(&["a/b/c", "a/d"], &Targets::new());
        assert_eq!(targets.get("a"), Some(&OwnerSpec::explicit(["b", "d"])));
    }

    #[test]
    fn test_blank_argument_does_not_use_configuration() {
        let targets = resolve_targets(&[" "], &configured());

        let owners: Vec<&str> = targets.owners().collect();
        assert_eq!(owners, vec![" "]);
        assert_eq!(targets.get(" "), Some(&OwnerSpec::all_public()));
    }

    #[test]
    fn test_leading_slash_is_an_owner_name() {
        let targets = resolve_targets(&["/acme"], &Targets::new());
        assert_eq!(targets.get("/acme"), Some(&OwnerSpec::all_public()));
    }
}
