//! Test fixture that builds real git repositories with git2.
//!
//! Every commit is written from a full snapshot of paths, with a fixed,
//! increasing timestamp so walks are deterministic. Repositories are bare
//! unless created with `Fixture::with_workdir`.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use gitdict::GitRepository;

const EPOCH: i64 = 1_700_000_000;

#[derive(Clone)]
enum Leaf {
    Blob(Vec<u8>),
    Link(Oid),
}

/// Full content of one commit's tree.
#[derive(Clone, Default)]
pub struct Snapshot {
    entries: BTreeMap<String, Leaf>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries
            .insert(path.to_string(), Leaf::Blob(content.as_ref().to_vec()));
        self
    }

    /// A submodule entry pointing at `commit`.
    pub fn link(mut self, path: &str, commit: Oid) -> Self {
        self.entries.insert(path.to_string(), Leaf::Link(commit));
        self
    }

    pub fn without(mut self, path: &str) -> Self {
        let prefix = format!("{}/", path);
        self.entries
            .retain(|key, _| key != path && !key.starts_with(&prefix));
        self
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repository,
    commits: std::cell::Cell<i64>,
}

impl Fixture {
    /// A new bare repository.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Repository::init_bare(dir.path()).expect("failed to init repository");
        Self {
            dir,
            repo,
            commits: std::cell::Cell::new(0),
        }
    }

    /// A new repository with a working directory.
    pub fn with_workdir() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Repository::init(dir.path()).expect("failed to init repository");
        Self {
            dir,
            repo,
            commits: std::cell::Cell::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn open(&self) -> GitRepository {
        GitRepository::open(self.path()).expect("failed to open fixture")
    }

    pub fn open_branch(&self, branch: &str) -> GitRepository {
        GitRepository::open_branch(self.path(), branch).expect("failed to open fixture branch")
    }

    /// Write a commit with the given parents; refs are not touched.
    pub fn commit(&self, snapshot: &Snapshot, parents: &[Oid], message: &str) -> Oid {
        let tree_id = write_tree(&self.repo, &snapshot.entries);
        self.commit_tree(tree_id, parents, message)
    }

    /// Write a commit for an already written tree; refs are not touched.
    pub fn commit_tree(&self, tree_id: Oid, parents: &[Oid], message: &str) -> Oid {
        let n = self.commits.get();
        self.commits.set(n + 1);
        let time = Time::new(EPOCH + n * 60, 0);
        let signature = Signature::new("Fixture", "fixture@example.com", &time).unwrap();

        let tree = self.repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(None, &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }

    /// Point `refs/heads/<name>` at `commit`.
    pub fn set_branch(&self, name: &str, commit: Oid) {
        self.repo
            .reference(&format!("refs/heads/{}", name), commit, true, "fixture")
            .unwrap();
    }

    /// Point HEAD at `refs/heads/<name>`.
    pub fn set_head(&self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    }

    /// Create `name` at `commit` and make it HEAD.
    pub fn checkout(&self, name: &str, commit: Oid) {
        self.set_branch(name, commit);
        self.set_head(name);
    }

    pub fn set_config(&self, key: &str, value: &str) {
        self.repo.config().unwrap().set_str(key, value).unwrap();
    }

    pub fn tree_of(&self, commit: Oid) -> Oid {
        self.repo.find_commit(commit).unwrap().tree_id()
    }

    /// Id of the entry at `path` in `commit`.
    pub fn id_at(&self, commit: Oid, path: &str) -> Oid {
        self.repo
            .find_commit(commit)
            .unwrap()
            .tree()
            .unwrap()
            .get_path(Path::new(path))
            .unwrap()
            .id()
    }
}

fn write_tree(repo: &Repository, entries: &BTreeMap<String, Leaf>) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    let mut folders: BTreeMap<String, BTreeMap<String, Leaf>> = BTreeMap::new();

    for (path, leaf) in entries {
        match path.split_once('/') {
            Some((folder, rest)) => {
                folders
                    .entry(folder.to_string())
                    .or_default()
                    .insert(rest.to_string(), leaf.clone());
            }
            None => match leaf {
                Leaf::Blob(content) => {
                    let oid = repo.blob(content).unwrap();
                    builder.insert(path.as_str(), oid, 0o100644).unwrap();
                }
                Leaf::Link(commit) => {
                    builder.insert(path.as_str(), *commit, 0o160000).unwrap();
                }
            },
        }
    }

    for (name, children) in &folders {
        let oid = write_tree(repo, children);
        builder.insert(name.as_str(), oid, 0o040000).unwrap();
    }

    builder.write().unwrap()
}

/// Messages of `commits`, first line only.
pub fn messages(commits: &[git2::Commit]) -> Vec<String> {
    commits
        .iter()
        .map(|c| c.message().unwrap_or("").lines().next().unwrap_or("").to_string())
        .collect()
}

/// The documentation-style tree used by the projection tests.
///
/// ```text
/// .gitattributes
/// README.rst
/// docs/{Makefile, conf.py, index.rst}
/// docs/_static/style.css
/// docs/recipes/{git-init.rst, git-show.rst}
/// src/lib.c
/// vendor            (submodule link)
/// ```
pub fn docs_fixture() -> (Fixture, Oid) {
    let fixture = Fixture::new();
    let base = Snapshot::new()
        .file(".gitattributes", "*.h text eol=lf\n")
        .file("README.rst", "gitdict\n=======\n")
        .file("docs/Makefile", "all:\n\tsphinx-build . _build\n")
        .file("docs/conf.py", "project = 'gitdict'\n")
        .file("docs/index.rst", "Welcome\n")
        .file("docs/_static/style.css", "body { margin: 0; }\n")
        .file("docs/recipes/git-init.rst", "git init\n")
        .file("docs/recipes/git-show.rst", "git show\n")
        .file("src/lib.c", "int main(void) { return 0; }\n");
    let first = fixture.commit(&base, &[], "Initial import");
    let head = fixture.commit(&base.link("vendor", first), &[first], "Add vendor submodule");
    fixture.checkout("master", head);
    (fixture, head)
}
