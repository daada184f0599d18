use git2::{BranchType, Commit, Oid, Repository, Tree};
use std::path::Path;

use crate::error::{is_backend_not_found, Error, Result};
use crate::git::encoding::TextEncoding;
use crate::git::node::{Lookup, Node};
use crate::git::reference::ToOid;
use crate::git::tree::{Folder, Walk};
use crate::models::{AuthorInfo, BranchInfo, CommitDetail, CommitInfo, RepositoryInfo};

const DEFAULT_ENCODING: &str = "utf-8";

/// The tree of a single resolved commit, and the owner of the backend handle.
///
/// A `GitRepository` never changes after `open`: switching branches creates a
/// new instance. Folders and files borrow it for their whole lifetime.
pub struct GitRepository {
    pub repo: Repository,
    pub path: String,
    branch: String,
    encoding: String,
    commit_id: Oid,
    tree_id: Oid,
}

/// Options for opening a repository.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    branch: Option<String>,
    encoding: Option<String>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local branch to work on instead of HEAD.
    pub fn branch(mut self, name: impl Into<String>) -> Self {
        self.branch = Some(name.into());
        self
    }

    /// Default text encoding for files, overriding `gui.encoding`.
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<GitRepository> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::discover(&path).map_err(|e| Error::OpenFailure {
            path: path_str.clone(),
            message: e.message().to_string(),
        })?;

        let (branch, commit_id, tree_id) = {
            let reference = match &self.branch {
                None => repo.head().map_err(|e| match e.code() {
                    git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound => {
                        Error::RefNotFound("HEAD".to_string())
                    }
                    _ => Error::Git(e),
                })?,
                Some(name) => repo
                    .find_branch(name, BranchType::Local)
                    .map_err(|e| {
                        if is_backend_not_found(&e) || e.code() == git2::ErrorCode::InvalidSpec {
                            Error::RefNotFound(name.clone())
                        } else {
                            Error::Git(e)
                        }
                    })?
                    .into_reference(),
            };
            let commit = reference.peel_to_commit()?;
            let branch = reference.shorthand().unwrap_or("HEAD").to_string();
            (branch, commit.id(), commit.tree_id())
        };

        let encoding = match &self.encoding {
            Some(label) => {
                label.parse::<TextEncoding>()?;
                label.clone()
            }
            None => configured_encoding(&repo),
        };

        let path = repo.path().to_string_lossy().to_string();
        tracing::debug!("Opened {} at {} ({})", path, branch, commit_id);

        Ok(GitRepository {
            repo,
            path,
            branch,
            encoding,
            commit_id,
            tree_id,
        })
    }
}

fn configured_encoding(repo: &Repository) -> String {
    let label = repo
        .config()
        .and_then(|config| config.get_string("gui.encoding"))
        .ok();
    match label {
        Some(label) if label.parse::<TextEncoding>().is_ok() => label,
        Some(label) => {
            tracing::warn!("Ignoring unsupported gui.encoding '{}'", label);
            DEFAULT_ENCODING.to_string()
        }
        None => DEFAULT_ENCODING.to_string(),
    }
}

impl GitRepository {
    /// Open the repository at (or above) `path` on its current HEAD.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        OpenOptions::new().open(path)
    }

    /// Open the repository at (or above) `path` on a local branch.
    pub fn open_branch<P: AsRef<Path>>(path: P, branch: &str) -> Result<Self> {
        OpenOptions::new().branch(branch).open(path)
    }

    /// A fresh instance of the same repository on another local branch.
    pub fn switch_branch(&self, branch: &str) -> Result<Self> {
        OpenOptions::new()
            .branch(branch)
            .encoding(self.encoding.clone())
            .open(&self.path)
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    /// The commit whose tree this repository projects; history walks start here.
    pub fn commit_id(&self) -> Oid {
        self.commit_id
    }

    pub fn tree_id(&self) -> Oid {
        self.tree_id
    }

    pub fn commit(&self) -> Result<Commit<'_>> {
        Ok(self.repo.find_commit(self.commit_id)?)
    }

    pub fn tree(&self) -> Result<Tree<'_>> {
        Ok(self.repo.find_tree(self.tree_id)?)
    }

    /// The root folder: empty name, no parent, `git_path() == ""`.
    pub fn root(&self) -> Result<Folder<'_>> {
        Ok(Folder::new(String::new(), None, self, self.tree()?))
    }

    /// Names of all local branches, sorted.
    pub fn branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolve a commit-ish to a commit of this repository.
    pub fn resolve_commit<C: ToOid>(&self, commitish: C) -> Result<Commit<'_>> {
        let oid = commitish.to_oid()?;
        let object = self.repo.find_object(oid, None).map_err(|e| {
            if is_backend_not_found(&e) {
                Error::InvalidCommitReference(oid.to_string())
            } else {
                Error::Git(e)
            }
        })?;
        object.into_commit().map_err(|object| {
            let kind = object.kind().map(|k| k.str()).unwrap_or("unknown");
            Error::InvalidCommitReference(format!("{} is a {}", oid, kind))
        })
    }

    /// Resolve a revision expression (`HEAD~2`, branch names, short ids) to a commit id.
    ///
    /// Unknown, malformed or ambiguous revisions are `RefNotFound`; backend
    /// faults while reading objects stay `Git` errors.
    pub fn revparse(&self, spec: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(spec).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound
            | git2::ErrorCode::InvalidSpec
            | git2::ErrorCode::Ambiguous => Error::RefNotFound(spec.to_string()),
            _ => Error::Git(e),
        })?;
        let commit = object.peel_to_commit().map_err(|e| match e.code() {
            git2::ErrorCode::InvalidSpec | git2::ErrorCode::Peel => {
                Error::InvalidCommitReference(spec.to_string())
            }
            _ => Error::Git(e),
        })?;
        Ok(commit.id())
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        let name = Path::new(&self.path)
            .components()
            .rev()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .find(|c| c != ".git")
            .unwrap_or_else(|| "Unknown".to_string());

        let commit = self.commit()?;
        let mut branches = Vec::new();
        for branch in self.branches()? {
            let last_commit = self
                .repo
                .find_branch(&branch, BranchType::Local)
                .ok()
                .and_then(|b| b.get().peel_to_commit().ok())
                .map(|c| commit_to_info(&c));
            branches.push(BranchInfo {
                is_current: branch == self.branch,
                name: branch,
                last_commit,
            });
        }

        Ok(RepositoryInfo {
            name,
            path: self.path.clone(),
            branch: self.branch.clone(),
            head_commit: commit_to_info(&commit),
            is_bare: self.is_bare(),
            encoding: self.encoding.clone(),
            branches,
        })
    }

    pub fn get_child(&self, key: &str) -> Result<Node<'_>> {
        self.root()?.get_child(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<Node<'_>>> {
        self.root()?.get(key)
    }

    pub fn get_or<D>(&self, key: &str, default: Option<D>) -> Result<Lookup<'_, D>> {
        self.root()?.get_or(key, default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.root().map(|root| root.contains(key)).unwrap_or(false)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.root()?.keys().collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.root()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.root()?.is_empty())
    }

    pub fn walk(&self) -> Result<Walk<'_>> {
        Ok(self.root()?.walk())
    }
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.path)
            .field("branch", &self.branch)
            .field("commit", &self.commit_id)
            .finish()
    }
}

pub fn commit_to_info(commit: &Commit) -> CommitInfo {
    let timestamp = commit.time().seconds();
    CommitInfo {
        oid: commit.id().to_string(),
        message: commit.message().unwrap_or("").trim().to_string(),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        timestamp,
        relative_time: format_relative_time(timestamp),
    }
}

pub fn commit_to_detail(commit: &Commit) -> CommitDetail {
    let author = commit.author();
    let committer = commit.committer();
    let timestamp = commit.time().seconds();
    CommitDetail {
        oid: commit.id().to_string(),
        message: commit.message().unwrap_or("").trim().to_string(),
        author: AuthorInfo {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        committer: AuthorInfo {
            name: committer.name().unwrap_or("Unknown").to_string(),
            email: committer.email().unwrap_or("").to_string(),
        },
        timestamp,
        relative_time: format_relative_time(timestamp),
        tree: commit.tree_id().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}

pub fn format_relative_time(timestamp: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}
