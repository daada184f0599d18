//! gitdict - a read-only dictionary view of the tree of a git commit.
//!
//! ```no_run
//! use gitdict::{GitNode, GitRepository};
//!
//! # fn main() -> gitdict::Result<()> {
//! let repo = GitRepository::open("path/to/repo")?;
//! let folder = repo.get_child("docs/recipes")?;
//! println!("{} changed in {}", folder.git_path(), folder.last_commit()?.id());
//! for entry in repo.walk()? {
//!     let (folder, folders, files) = entry?;
//!     println!("{}: {} folders, {} files", folder.git_path(), folders.len(), files.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! - `git`: repository root, nodes, history walker and diff resolver
//! - `models`: serialisable DTOs (commit summaries, diff results, listings)
//! - `error`: the error taxonomy shared by all operations

pub mod error;
pub mod git;
pub mod models;

pub use error::{Error, Result};
pub use git::{
    File, Folder, GitNode, GitRepository, Lookup, Node, NodeKind, OpenOptions, TextEncoding, ToOid,
    WalkEntry,
};
pub use models::DiffResult;
