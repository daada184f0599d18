//! Data transfer objects (DTOs) for CLI output and diff results.
//!
//! These structs serialize to JSON with `--json`.
//! - `tree`: TreeEntry, RepositoryInfo, BranchInfo
//! - `commit`: CommitInfo, CommitDetail, AuthorInfo
//! - `diff`: DiffResult, FileDiff, DiffHunk, DiffLine, DiffStats

pub mod commit;
pub mod diff;
pub mod tree;

pub use commit::*;
pub use diff::*;
pub use tree::*;
