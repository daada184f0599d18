//! Tree and repository-related DTOs.
//!
//! - `TreeEntry`: Single file/folder in a listing (`ls`)
//! - `RepositoryInfo`: Repo metadata (`info`)
//! - `BranchInfo`: Local branch with its tip commit

use serde::{Deserialize, Serialize};

use super::CommitInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    pub entry_type: EntryType,
    pub size: Option<u64>,
    pub last_commit: Option<CommitInfo>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub path: String,
    pub branch: String,
    pub head_commit: CommitInfo,
    pub is_bare: bool,
    pub encoding: String,
    pub branches: Vec<BranchInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
    pub last_commit: Option<CommitInfo>,
}
