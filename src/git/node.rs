//! Folder/file polymorphism.
//!
//! `GitNode` carries the contract shared by both kinds: the path derived from
//! the parent chain, history delegation to the repository, and diffs against
//! other commits. `Node` is the closed union handed out by lookups.
//!
//! A node only knows its parent's git path. Ownership runs from the
//! repository down to the node, and `parent()` re-resolves the parent from
//! the root when asked.

use git2::{Commit, ObjectType, Oid, TreeEntry};

use crate::error::{Error, Result};
use crate::git::diff;
use crate::git::file::File;
use crate::git::reference::ToOid;
use crate::git::repository::GitRepository;
use crate::git::tree::Folder;
use crate::models::{DiffResult, EntryType};

/// Which node variant a tree entry becomes. Anything else (submodule links)
/// has no variant and is invisible to the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub fn from_object_type(kind: ObjectType) -> Option<Self> {
        match kind {
            ObjectType::Tree => Some(NodeKind::Folder),
            ObjectType::Blob => Some(NodeKind::File),
            _ => None,
        }
    }

    pub fn of_entry(entry: &TreeEntry) -> Option<Self> {
        entry.kind().and_then(Self::from_object_type)
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            NodeKind::Folder => ObjectType::Tree,
            NodeKind::File => ObjectType::Blob,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            NodeKind::Folder => EntryType::Directory,
            NodeKind::File => EntryType::File,
        }
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

pub trait GitNode<'r> {
    fn name(&self) -> &str;

    /// Git path of the parent folder; `None` only for the repository root.
    fn parent_path(&self) -> Option<&str>;

    fn repository(&self) -> &'r GitRepository;

    /// Id of the backend object (tree or blob) this node holds.
    fn id(&self) -> Oid;

    fn kind(&self) -> NodeKind;

    /// Path of this node inside the repository; `""` for the root.
    fn git_path(&self) -> String {
        match self.parent_path() {
            Some(parent) => join_path(parent, self.name()),
            None => self.name().to_string(),
        }
    }

    fn parent(&self) -> Result<Option<Folder<'r>>> {
        let Some(parent) = self.parent_path() else {
            return Ok(None);
        };
        let root = self.repository().root()?;
        if parent.is_empty() {
            return Ok(Some(root));
        }
        match root.get_child(parent)? {
            Node::Folder(folder) => Ok(Some(folder)),
            Node::File(_) => Err(Error::NotFound(parent.to_string())),
        }
    }

    /// The commit that introduced the last change to this path.
    fn last_commit(&self) -> Result<Commit<'r>> {
        self.repository().last_commit_for(&self.git_path())
    }

    /// Commits that changed this path, newest first.
    fn history(&self) -> Result<Vec<Commit<'r>>> {
        self.repository().commit_history_for(&self.git_path())
    }

    /// Diff from the object currently held to the object at this path in `commitish`.
    fn diff<C: ToOid>(&self, commitish: C) -> Result<DiffResult>
    where
        Self: Sized,
    {
        diff::diff_node(self, commitish, None::<Oid>)
    }

    /// Diff from the object at this path in `reference` to the one in `commitish`.
    fn diff_between<C: ToOid, R: ToOid>(&self, commitish: C, reference: R) -> Result<DiffResult>
    where
        Self: Sized,
    {
        diff::diff_node(self, commitish, Some(reference))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<'r> {
    Folder(Folder<'r>),
    File(File<'r>),
}

impl<'r> Node<'r> {
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn as_folder(&self) -> Option<&Folder<'r>> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File<'r>> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    pub fn into_folder(self) -> Option<Folder<'r>> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<File<'r>> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    /// Child lookup that also works on files, which never have children.
    pub fn get_child(&self, key: &str) -> Result<Node<'r>> {
        match self {
            Node::Folder(folder) => folder.get_child(key),
            Node::File(file) => Err(Error::NotFound(join_path(&file.git_path(), key))),
        }
    }
}

impl<'r> GitNode<'r> for Node<'r> {
    fn name(&self) -> &str {
        match self {
            Node::Folder(folder) => folder.name(),
            Node::File(file) => file.name(),
        }
    }

    fn parent_path(&self) -> Option<&str> {
        match self {
            Node::Folder(folder) => folder.parent_path(),
            Node::File(file) => file.parent_path(),
        }
    }

    fn repository(&self) -> &'r GitRepository {
        match self {
            Node::Folder(folder) => folder.repository(),
            Node::File(file) => file.repository(),
        }
    }

    fn id(&self) -> Oid {
        match self {
            Node::Folder(folder) => folder.id(),
            Node::File(file) => file.id(),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Node::Folder(_) => NodeKind::Folder,
            Node::File(_) => NodeKind::File,
        }
    }
}

impl ToOid for Node<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

impl<'r> From<Folder<'r>> for Node<'r> {
    fn from(folder: Folder<'r>) -> Self {
        Node::Folder(folder)
    }
}

impl<'r> From<File<'r>> for Node<'r> {
    fn from(file: File<'r>) -> Self {
        Node::File(file)
    }
}

/// Result of `get_or`: the child, or the caller's fallback value.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'r, D> {
    Found(Node<'r>),
    Default(D),
}

impl<'r, D> Lookup<'r, D> {
    pub fn found(self) -> Option<Node<'r>> {
        match self {
            Lookup::Found(node) => Some(node),
            Lookup::Default(_) => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Lookup::Default(_))
    }
}
