//! Commit graph walk for path history.
//!
//! Unlike a backend revwalk, which enqueues every parent by itself, the
//! caller decides which parents of each returned commit are followed. That
//! is what lets the history simplification prune merge parents mid-walk.
//!
//! - `push(oid)`: follow a commit
//! - `hide(oid)`: mark a commit and its ancestors as uninteresting
//! - `next_commit()`: advance to the newest pending commit, skipping hidden ones
//!
//! Commits come out newest first by committer time; ties keep push order.

use git2::{Commit, Oid, Repository};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::error::Result;

#[derive(Debug, PartialEq, Eq)]
struct Pending {
    time: i64,
    seq: u64,
    oid: Oid,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct CommitWalk<'r> {
    repo: &'r Repository,
    queue: BinaryHeap<Pending>,
    queued: HashSet<Oid>,
    in_queue: HashSet<Oid>,
    hidden: HashSet<Oid>,
    // pending commits that are not hidden
    visible: usize,
    seq: u64,
}

impl<'r> CommitWalk<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self {
            repo,
            queue: BinaryHeap::new(),
            queued: HashSet::new(),
            in_queue: HashSet::new(),
            hidden: HashSet::new(),
            visible: 0,
            seq: 0,
        }
    }

    /// Follow `oid`. Commits already queued or returned are not queued twice.
    pub fn push(&mut self, oid: Oid) -> Result<()> {
        if !self.queued.insert(oid) {
            return Ok(());
        }
        let time = self.repo.find_commit(oid)?.time().seconds();
        self.queue.push(Pending {
            time,
            seq: self.seq,
            oid,
        });
        self.in_queue.insert(oid);
        if !self.hidden.contains(&oid) {
            self.visible += 1;
        }
        self.seq += 1;
        Ok(())
    }

    /// Hide `oid` and everything reachable from it.
    ///
    /// Hiding takes effect for commits not yet returned by `next_commit`.
    pub fn hide(&mut self, oid: Oid) -> Result<()> {
        self.mark_hidden(oid);
        self.push(oid)
    }

    pub fn is_hidden(&self, oid: Oid) -> bool {
        self.hidden.contains(&oid)
    }

    /// The newest pending commit that is not hidden, or `None` once only
    /// hidden commits remain.
    pub fn next_commit(&mut self) -> Result<Option<Commit<'r>>> {
        loop {
            if self.visible == 0 && !self.hidden.is_empty() {
                return Ok(None);
            }
            let Some(pending) = self.queue.pop() else {
                return Ok(None);
            };
            self.in_queue.remove(&pending.oid);
            let commit = self.repo.find_commit(pending.oid)?;
            if !self.hidden.contains(&pending.oid) {
                self.visible -= 1;
                return Ok(Some(commit));
            }
            for parent in commit.parent_ids() {
                self.mark_hidden(parent);
                self.push(parent)?;
            }
        }
    }

    fn mark_hidden(&mut self, oid: Oid) {
        if self.hidden.insert(oid) && self.in_queue.contains(&oid) {
            self.visible -= 1;
        }
    }
}

impl std::fmt::Debug for CommitWalk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitWalk")
            .field("pending", &self.queue.len())
            .field("visible", &self.visible)
            .field("hidden", &self.hidden.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(time: i64, seq: u64) -> Pending {
        Pending {
            time,
            seq,
            oid: Oid::zero(),
        }
    }

    #[test]
    fn newest_first_then_push_order() {
        let mut heap = BinaryHeap::new();
        heap.push(pending(10, 0));
        heap.push(pending(30, 1));
        heap.push(pending(20, 2));
        heap.push(pending(30, 3));

        let order: Vec<(i64, u64)> = std::iter::from_fn(|| heap.pop())
            .map(|p| (p.time, p.seq))
            .collect();
        assert_eq!(order, vec![(30, 1), (30, 3), (20, 2), (10, 0)]);
    }

    /// A bare repository holding a linear chain of `len` commits, oldest first.
    fn chain(len: i64) -> (tempfile::TempDir, Repository, Vec<Oid>) {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = Repository::init_bare(dir.path()).unwrap();
        let tree_id = repo.treebuilder(None).unwrap().write().unwrap();
        let mut commits: Vec<Oid> = Vec::new();
        {
            let tree = repo.find_tree(tree_id).unwrap();
            for n in 0..len {
                let time = git2::Time::new(1_700_000_000 + n * 60, 0);
                let sig = git2::Signature::new("Walker", "walker@example.com", &time).unwrap();
                let parent = commits.last().map(|oid| repo.find_commit(*oid).unwrap());
                let parents: Vec<&Commit> = parent.iter().collect();
                let oid = repo
                    .commit(None, &sig, &sig, &format!("c{}", n + 1), &tree, &parents)
                    .unwrap();
                commits.push(oid);
            }
        }
        (dir, repo, commits)
    }

    fn drain(walk: &mut CommitWalk) -> Vec<Oid> {
        let mut seen = Vec::new();
        while let Some(commit) = walk.next_commit().unwrap() {
            for parent in commit.parent_ids() {
                walk.push(parent).unwrap();
            }
            seen.push(commit.id());
        }
        seen
    }

    #[test]
    fn hidden_ancestors_end_the_walk() {
        let (_dir, repo, c) = chain(4);
        let mut walk = CommitWalk::new(&repo);
        walk.push(c[3]).unwrap();
        walk.hide(c[1]).unwrap();

        assert_eq!(drain(&mut walk), vec![c[3], c[2]]);
        assert_eq!(walk.visible, 0);
        // the root below the hidden commit is never loaded
        assert!(!walk.queued.contains(&c[0]));
    }

    #[test]
    fn hiding_reaches_commits_already_pending() {
        let (_dir, repo, c) = chain(4);
        let mut walk = CommitWalk::new(&repo);
        walk.push(c[3]).unwrap();
        walk.push(c[1]).unwrap();
        walk.hide(c[2]).unwrap();
        assert_eq!(walk.visible, 2);

        assert_eq!(walk.next_commit().unwrap().map(|commit| commit.id()), Some(c[3]));
        assert_eq!(walk.visible, 1);
        // c3 is popped hidden and hides the pending c2
        assert!(walk.next_commit().unwrap().is_none());
        assert!(walk.is_hidden(c[1]));
        assert_eq!(walk.visible, 0);
    }

    #[test]
    fn walk_without_hidden_commits_runs_to_the_root() {
        let (_dir, repo, c) = chain(3);
        let mut walk = CommitWalk::new(&repo);
        walk.push(c[2]).unwrap();

        assert_eq!(drain(&mut walk), vec![c[2], c[1], c[0]]);
    }
}
