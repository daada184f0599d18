//! Folder projection of a git tree.
//!
//! A `Folder` behaves like an ordered mapping of name → child over the
//! direct entries of its tree. Only trees and blobs with UTF-8 names are
//! children; other entry kinds (submodule links) and names that are not
//! valid UTF-8 are skipped by every operation and do not count toward
//! `len`. Keys containing `/` are routed segment by segment.

use git2::{Oid, Tree, TreeEntry};

use crate::error::{Error, Result};
use crate::git::file::File;
use crate::git::node::{GitNode, Lookup, Node, NodeKind};
use crate::git::reference::ToOid;
use crate::git::repository::GitRepository;

pub const PATH_SEPARATOR: char = '/';

/// One step of `Folder::walk`: a folder with its child folders and files.
pub type WalkEntry<'r> = (Folder<'r>, Vec<Folder<'r>>, Vec<File<'r>>);

#[derive(Clone)]
pub struct Folder<'r> {
    name: String,
    parent: Option<String>,
    repository: &'r GitRepository,
    tree: Tree<'r>,
}

impl<'r> Folder<'r> {
    pub(crate) fn new(
        name: String,
        parent: Option<String>,
        repository: &'r GitRepository,
        tree: Tree<'r>,
    ) -> Self {
        Self {
            name,
            parent,
            repository,
            tree,
        }
    }

    pub fn tree(&self) -> &Tree<'r> {
        &self.tree
    }

    /// Whether `key` (a name or a `/`-separated path) resolves to a child.
    ///
    /// Backend failures read as absent.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }

    /// Look up a child by name or `/`-separated path.
    pub fn get_child(&self, key: &str) -> Result<Node<'r>> {
        if let Some((head, rest)) = key.split_once(PATH_SEPARATOR) {
            return self
                .get_child(head)?
                .get_child(rest)
                .map_err(|e| {
                    if e.is_not_found() {
                        Error::NotFound(self.child_path(key))
                    } else {
                        e
                    }
                });
        }

        let entry = self
            .direct_entry(key)
            .ok_or_else(|| Error::NotFound(self.child_path(key)))?;
        self.child_factory(&entry)
    }

    /// Like `get_child`, but a missing child is `None`.
    pub fn get(&self, key: &str) -> Result<Option<Node<'r>>> {
        match self.get_child(key) {
            Ok(node) => Ok(Some(node)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like `get_child`, falling back to `default` when one is given.
    ///
    /// Without a default a missing child is still a `NotFound` error.
    pub fn get_or<D>(&self, key: &str, default: Option<D>) -> Result<Lookup<'r, D>> {
        match (self.get(key)?, default) {
            (Some(node), _) => Ok(Lookup::Found(node)),
            (None, Some(default)) => Ok(Lookup::Default(default)),
            (None, None) => Err(Error::NotFound(self.child_path(key))),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries().map(|entry| entry_name(&entry))
    }

    pub fn values(&self) -> impl Iterator<Item = Result<Node<'r>>> + '_ {
        self.entries().map(move |entry| self.child_factory(&entry))
    }

    pub fn items(&self) -> impl Iterator<Item = Result<(String, Node<'r>)>> + '_ {
        self.entries()
            .map(move |entry| Ok((entry_name(&entry), self.child_factory(&entry)?)))
    }

    /// Iterate over child names, like iterating a mapping.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.keys()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Direct children partitioned into folders and files, in entry order.
    pub fn children(&self) -> Result<(Vec<Folder<'r>>, Vec<File<'r>>)> {
        let mut folders = Vec::new();
        let mut files = Vec::new();
        for child in self.values() {
            match child? {
                Node::Folder(folder) => folders.push(folder),
                Node::File(file) => files.push(file),
            }
        }
        Ok((folders, files))
    }

    /// Depth-first walk yielding `(folder, child folders, child files)`,
    /// starting with `self`, similar to `os.walk` but with node values.
    pub fn walk(&self) -> Walk<'r> {
        Walk {
            pending: vec![self.clone()],
        }
    }

    fn entries(&self) -> impl Iterator<Item = TreeEntry<'_>> + '_ {
        self.tree.iter().filter(is_child)
    }

    fn direct_entry(&self, name: &str) -> Option<TreeEntry<'_>> {
        // the backend cannot look up names with an interior NUL
        if name.is_empty() || name.contains('\0') {
            return None;
        }
        self.tree.get_name(name).filter(is_child)
    }

    fn child_factory(&self, entry: &TreeEntry) -> Result<Node<'r>> {
        let name = entry_name(entry);
        let parent = Some(self.git_path());
        let repository: &'r GitRepository = self.repository;
        let repo = &repository.repo;
        match NodeKind::of_entry(entry) {
            Some(NodeKind::Folder) => {
                let tree = repo.find_tree(entry.id())?;
                Ok(Node::Folder(Folder::new(name, parent, repository, tree)))
            }
            Some(NodeKind::File) => {
                let blob = repo.find_blob(entry.id())?;
                Ok(Node::File(File::new(name, parent, repository, blob)))
            }
            None => Err(Error::NotFound(self.child_path(&name))),
        }
    }

    fn child_path(&self, key: &str) -> String {
        crate::git::node::join_path(&self.git_path(), key)
    }
}

/// Whether an entry is visible as a child: a tree or blob whose name is UTF-8.
fn is_child(entry: &TreeEntry) -> bool {
    NodeKind::of_entry(entry).is_some() && entry.name().is_some()
}

fn entry_name(entry: &TreeEntry) -> String {
    entry.name().unwrap_or_default().to_string()
}

impl<'r> GitNode<'r> for Folder<'r> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent_path(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn repository(&self) -> &'r GitRepository {
        self.repository
    }

    fn id(&self) -> Oid {
        self.tree.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Folder
    }
}

/// Folders are equal when they hold the same tree, wherever they were found.
impl PartialEq for Folder<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.tree.id() == other.tree.id()
    }
}

impl Eq for Folder<'_> {}

impl ToOid for Folder<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

impl std::fmt::Debug for Folder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Folder")
            .field("git_path", &self.git_path())
            .field("tree", &self.tree.id())
            .finish()
    }
}

/// Iterator returned by `Folder::walk`. Each call to `walk` starts afresh.
pub struct Walk<'r> {
    pending: Vec<Folder<'r>>,
}

impl<'r> Iterator for Walk<'r> {
    type Item = Result<WalkEntry<'r>>;

    fn next(&mut self) -> Option<Self::Item> {
        let folder = self.pending.pop()?;
        match folder.children() {
            Ok((folders, files)) => {
                self.pending.extend(folders.iter().rev().cloned());
                Some(Ok((folder, folders, files)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
