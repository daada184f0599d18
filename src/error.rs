//! Error types for the tree projection.
//!
//! Every public operation either succeeds or fails with one `Error` variant:
//! - `OpenFailure`, `RefNotFound` → opening a repository or branch
//! - `NotFound` → child name/path lookups
//! - `UnconvertibleReference`, `InvalidCommitReference` → commit-ish arguments
//! - `ImpossibleDiff` → missing or mismatched diff operands
//! - `NoHistoryForPath` → `last_commit` on a path without history
//! - `UnknownEncoding`, `Decode` → file decoding
//! - `Git` → backend faults outside the taxonomy (corrupt objects, I/O)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Cannot open repository at {path}: {message}")]
    OpenFailure { path: String, message: String },

    #[error("Reference not found: {0}")]
    RefNotFound(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Unconvertible reference: {0}")]
    UnconvertibleReference(String),

    #[error("Not a commit: {0}")]
    InvalidCommitReference(String),

    #[error("Diff impossible for '{path}': {reason}")]
    ImpossibleDiff { path: String, reason: String },

    #[error("No commit found for path: {0}")]
    NoHistoryForPath(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Cannot decode {path} as {encoding}: {reason}")]
    Decode {
        path: String,
        encoding: String,
        reason: String,
    },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub(crate) fn impossible_diff(path: &str, reason: impl Into<String>) -> Self {
        Error::ImpossibleDiff {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Whether a backend error only says "no such object/entry".
pub(crate) fn is_backend_not_found(err: &git2::Error) -> bool {
    err.code() == git2::ErrorCode::NotFound
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected() {
        assert!(Error::NotFound("docs/missing".into()).is_not_found());
        assert!(!Error::NoHistoryForPath("docs".into()).is_not_found());
    }

    #[test]
    fn display_names_the_path() {
        let err = Error::impossible_diff("docs", "blob in target commit");
        assert_eq!(err.to_string(), "Diff impossible for 'docs': blob in target commit");

        let err = Error::RefNotFound("no-such-branch".into());
        assert_eq!(err.to_string(), "Reference not found: no-such-branch");
    }

    #[test]
    fn backend_errors_convert() {
        let backend = git2::Error::from_str("object corrupt");
        let err: Error = backend.into();
        assert!(matches!(err, Error::Git(_)));
        assert!(!err.is_not_found());
    }
}
