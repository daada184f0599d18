//! Diff resolution for nodes.
//!
//! Both operands are the objects found at the node's git path: either the
//! node's own object and the one in a commit, or the ones in two commits.
//! They must both exist and match the node's kind (tree for folders, blob
//! for files); anything else is an `ImpossibleDiff`.

use git2::{Delta, DiffOptions, Object, Patch};
use std::path::Path;

use crate::error::{is_backend_not_found, Error, Result};
use crate::git::node::{GitNode, NodeKind};
use crate::git::reference::ToOid;
use crate::git::repository::GitRepository;
use crate::models::{DiffHunk, DiffLine, DiffResult, DiffStats, DiffStatus, FileDiff, LineType};

const CONTEXT_LINES: u32 = 3;

pub(crate) fn diff_node<'r, N, C, R>(node: &N, commitish: C, reference: Option<R>) -> Result<DiffResult>
where
    N: GitNode<'r> + ?Sized,
    C: ToOid,
    R: ToOid,
{
    let repository = node.repository();
    let path = node.git_path();
    let kind = node.kind();

    let new = object_at(repository, commitish, &path)?;
    let old = match reference {
        Some(reference) => object_at(repository, reference, &path)?,
        None => Some(repository.repo.find_object(node.id(), Some(kind.object_type()))?),
    };

    let (Some(old), Some(new)) = (old, new) else {
        return Err(Error::impossible_diff(&path, "path does not exist in the commit"));
    };
    for object in [&old, &new] {
        if object.kind() != Some(kind.object_type()) {
            let found = object.kind().map(|k| k.str()).unwrap_or("unknown");
            return Err(Error::impossible_diff(
                &path,
                format!("expected a {} but found a {}", kind.object_type().str(), found),
            ));
        }
    }

    tracing::debug!("Diffing {} from {} to {}", path, old.id(), new.id());

    let mut opts = DiffOptions::new();
    opts.context_lines(CONTEXT_LINES);

    let mut files = Vec::new();
    let mut stats = DiffStats::default();

    match kind {
        NodeKind::Folder => {
            let old_tree = old.peel_to_tree()?;
            let new_tree = new.peel_to_tree()?;
            let diff = repository
                .repo
                .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))?;
            for delta_idx in 0..diff.deltas().len() {
                if let Some(patch) = Patch::from_diff(&diff, delta_idx)? {
                    files.push(collect_patch(&patch, &mut stats)?);
                }
            }
        }
        NodeKind::File => {
            let old_blob = old.peel_to_blob()?;
            let new_blob = new.peel_to_blob()?;
            let file_path = Path::new(&path);
            let patch = Patch::from_blobs(
                &old_blob,
                Some(file_path),
                &new_blob,
                Some(file_path),
                Some(&mut opts),
            )?;
            if old_blob.id() != new_blob.id() {
                files.push(collect_patch(&patch, &mut stats)?);
            }
        }
    }

    Ok(DiffResult {
        path,
        kind: kind.entry_type(),
        old_id: old.id().to_string(),
        new_id: new.id().to_string(),
        files,
        stats,
    })
}

/// The object at `path` in the commit named by `commitish`; `None` when the
/// path is absent or is neither a tree nor a blob.
fn object_at<'r, C: ToOid>(
    repository: &'r GitRepository,
    commitish: C,
    path: &str,
) -> Result<Option<Object<'r>>> {
    let commit = repository.resolve_commit(commitish)?;
    let tree = commit.tree()?;
    if path.is_empty() {
        return Ok(Some(tree.into_object()));
    }
    let entry = match tree.get_path(Path::new(path)) {
        Ok(entry) => entry,
        Err(e) if is_backend_not_found(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if NodeKind::of_entry(&entry).is_none() {
        return Ok(None);
    }
    Ok(Some(entry.to_object(&repository.repo)?))
}

fn collect_patch(patch: &Patch, stats: &mut DiffStats) -> Result<FileDiff> {
    let delta = patch.delta();
    let status = match delta.status() {
        Delta::Added => DiffStatus::Added,
        Delta::Deleted => DiffStatus::Deleted,
        Delta::Modified => DiffStatus::Modified,
        Delta::Renamed => DiffStatus::Renamed,
        Delta::Copied => DiffStatus::Copied,
        Delta::Typechange => DiffStatus::TypeChanged,
        _ => DiffStatus::Unmodified,
    };

    let old_path = match status {
        DiffStatus::Added => None,
        _ => delta.old_file().path().map(|p| p.to_string_lossy().to_string()),
    };
    let new_path = match status {
        DiffStatus::Deleted => None,
        _ => delta.new_file().path().map(|p| p.to_string_lossy().to_string()),
    };
    let is_binary = delta.flags().is_binary();

    let mut hunks: Vec<DiffHunk> = Vec::new();
    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, _) = patch.hunk(hunk_idx)?;

        let mut lines: Vec<DiffLine> = Vec::new();
        for line_idx in 0..patch.num_lines_in_hunk(hunk_idx)? {
            let line = patch.line_in_hunk(hunk_idx, line_idx)?;

            let line_type = match line.origin() {
                '+' => {
                    stats.insertions += 1;
                    LineType::Addition
                }
                '-' => {
                    stats.deletions += 1;
                    LineType::Deletion
                }
                ' ' => LineType::Context,
                _ => LineType::Header,
            };

            lines.push(DiffLine {
                line_type,
                old_lineno: line.old_lineno(),
                new_lineno: line.new_lineno(),
                content: String::from_utf8_lossy(line.content()).to_string(),
            });
        }

        hunks.push(DiffHunk {
            old_start: hunk.old_start(),
            old_lines: hunk.old_lines(),
            new_start: hunk.new_start(),
            new_lines: hunk.new_lines(),
            header: String::from_utf8_lossy(hunk.header()).to_string(),
            lines,
        });
    }

    stats.files_changed += 1;

    Ok(FileDiff {
        old_path,
        new_path,
        status,
        hunks,
        is_binary,
    })
}
