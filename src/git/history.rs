//! Path history with merge simplification.
//!
//! A commit belongs to the history of a path when it is not TREESAME to its
//! parent at that path, i.e. the entry id differs or the entry appears or
//! disappears. Root commits count when the path exists in them.
//!
//! Merge commits are never reported. When a merge is TREESAME to one of its
//! parents, only the first such parent is followed and the others are
//! pruned, so a change merged in from several branches is reported once.
//! A merge that is the sole introducer of a change (an "evil merge") is
//! therefore not reported either; this matches the default simplification
//! of `git log -- <path>` minus the merge itself.

use git2::{Commit, Oid};
use std::path::Path;

use crate::error::{is_backend_not_found, Error, Result};
use crate::git::repository::GitRepository;
use crate::git::walker::CommitWalk;

impl GitRepository {
    /// Commits that changed `path`, newest first. Empty when the path never
    /// existed in the walked range.
    pub fn commit_history_for(&self, path: &str) -> Result<Vec<Commit<'_>>> {
        let history = path_history(self, path, None, None)?;
        tracing::info!(
            "History for {}: {} commits",
            display_path(path),
            history.len()
        );
        Ok(history)
    }

    /// The commit that introduced the last change to `path`.
    pub fn last_commit_for(&self, path: &str) -> Result<Commit<'_>> {
        path_history(self, path, None, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoHistoryForPath(path.to_string()))
    }

    /// History of `path` restricted to commits not reachable from `since`.
    pub fn commit_history_between<C: crate::git::reference::ToOid>(
        &self,
        path: &str,
        since: C,
    ) -> Result<Vec<Commit<'_>>> {
        let since = self.resolve_commit(since)?.id();
        path_history(self, path, Some(since), None)
    }
}

fn path_history<'r>(
    repository: &'r GitRepository,
    path: &str,
    since: Option<Oid>,
    limit: Option<usize>,
) -> Result<Vec<Commit<'r>>> {
    let mut walk = CommitWalk::new(&repository.repo);
    walk.push(repository.commit_id())?;
    if let Some(since) = since {
        walk.hide(since)?;
    }

    let mut history = Vec::new();
    let mut visited = 0usize;

    while let Some(commit) = walk.next_commit()? {
        visited += 1;
        let entry = entry_at(&commit, path)?;

        match commit.parent_count() {
            0 => {
                if entry.is_some() {
                    history.push(commit);
                }
            }
            1 => {
                let parent = commit.parent(0)?;
                walk.push(parent.id())?;
                if entry_at(&parent, path)? != entry {
                    history.push(commit);
                }
            }
            _ => {
                let mut treesame = None;
                for parent in commit.parents() {
                    if entry_at(&parent, path)? == entry {
                        treesame = Some(parent.id());
                        break;
                    }
                }
                match treesame {
                    Some(parent) => walk.push(parent)?,
                    None => {
                        for parent in commit.parent_ids() {
                            walk.push(parent)?;
                        }
                    }
                }
            }
        }

        if limit.is_some_and(|limit| history.len() >= limit) {
            break;
        }
    }

    tracing::debug!(
        "Walked {} commits for {}, kept {}",
        visited,
        display_path(path),
        history.len()
    );
    Ok(history)
}

/// Id of the entry at `path` in the commit's tree; `None` when absent.
fn entry_at(commit: &Commit, path: &str) -> Result<Option<Oid>> {
    if path.is_empty() {
        return Ok(Some(commit.tree_id()));
    }
    let tree = commit.tree()?;
    match tree.get_path(Path::new(path)) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if is_backend_not_found(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "(root)" } else { path }
}
