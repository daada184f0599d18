//! Diff-related DTOs.
//!
//! - `DiffResult`: Which two objects were compared, per-file changes and stats
//! - `FileDiff`: Single file's changes with hunks
//! - `DiffHunk`: Contiguous block of changes with context
//! - `DiffLine`: Single line (addition, deletion, or context)
//!
//! Paths inside a folder diff are relative to that folder.

use serde::{Deserialize, Serialize};

use super::EntryType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    pub path: String,
    pub kind: EntryType,
    pub old_id: String,
    pub new_id: String,
    pub files: Vec<FileDiff>,
    pub stats: DiffStats,
}

impl DiffResult {
    /// Whether both sides hold the same content.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Render the changes as a unified patch.
    pub fn patch_text(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            let old = file
                .old_path
                .as_ref()
                .map(|p| format!("a/{}", p))
                .unwrap_or_else(|| "/dev/null".to_string());
            let new = file
                .new_path
                .as_ref()
                .map(|p| format!("b/{}", p))
                .unwrap_or_else(|| "/dev/null".to_string());
            out.push_str(&format!("--- {}\n+++ {}\n", old, new));
            if file.is_binary {
                out.push_str("Binary files differ\n");
                continue;
            }
            for hunk in &file.hunks {
                out.push_str(&hunk.header);
                if !hunk.header.ends_with('\n') {
                    out.push('\n');
                }
                for line in &hunk.lines {
                    let origin = match line.line_type {
                        LineType::Addition => '+',
                        LineType::Deletion => '-',
                        LineType::Context => ' ',
                        LineType::Header => continue,
                    };
                    out.push(origin);
                    out.push_str(&line.content);
                    if !line.content.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: DiffStatus,
    pub hunks: Vec<DiffHunk>,
    pub is_binary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChanged,
    Unmodified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub header: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    pub line_type: LineType,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Context,
    Addition,
    Deletion,
    Header,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line_type: LineType, content: &str) -> DiffLine {
        DiffLine {
            line_type,
            old_lineno: None,
            new_lineno: None,
            content: content.to_string(),
        }
    }

    #[test]
    fn patch_text_renders_hunks() {
        let result = DiffResult {
            path: "docs".into(),
            kind: EntryType::Directory,
            old_id: "a".into(),
            new_id: "b".into(),
            files: vec![FileDiff {
                old_path: Some("a.txt".into()),
                new_path: Some("a.txt".into()),
                status: DiffStatus::Modified,
                hunks: vec![DiffHunk {
                    old_start: 1,
                    old_lines: 1,
                    new_start: 1,
                    new_lines: 2,
                    header: "@@ -1 +1,2 @@\n".into(),
                    lines: vec![
                        line(LineType::Context, "one\n"),
                        line(LineType::Addition, "two"),
                    ],
                }],
                is_binary: false,
            }],
            stats: DiffStats {
                files_changed: 1,
                insertions: 1,
                deletions: 0,
            },
        };

        assert_eq!(
            result.patch_text(),
            "--- a/a.txt\n+++ b/a.txt\n@@ -1 +1,2 @@\n one\n+two\n"
        );
        assert!(!result.is_empty());
    }

    #[test]
    fn added_file_uses_dev_null() {
        let result = DiffResult {
            path: "docs".into(),
            kind: EntryType::Directory,
            old_id: "a".into(),
            new_id: "b".into(),
            files: vec![FileDiff {
                old_path: None,
                new_path: Some("new.bin".into()),
                status: DiffStatus::Added,
                hunks: vec![],
                is_binary: true,
            }],
            stats: DiffStats::default(),
        };

        assert_eq!(
            result.patch_text(),
            "--- /dev/null\n+++ b/new.bin\nBinary files differ\n"
        );
    }
}
