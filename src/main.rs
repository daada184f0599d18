//! gitdict - browse the tree of a git commit from the command line
//!
//! # Usage
//! ```bash
//! gitdict --repo /path/to/repo ls docs           # List a folder
//! gitdict --repo /path/to/repo log docs/recipes  # Commits that changed a path
//! gitdict --repo /path/to/repo diff docs HEAD~3  # Diff a folder against a commit
//! gitdict diff / HEAD~1 HEAD~2 --stat             # Diff the whole tree between two commits
//! gitdict --branch gh-pages walk                 # Every folder of a branch
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitdict::git::repository::{commit_to_detail, commit_to_info};
use gitdict::models::TreeEntry;
use gitdict::{GitNode, GitRepository, Node, OpenOptions};

/// Read-only dictionary view of a git commit tree
#[derive(Parser)]
#[command(name = "gitdict")]
#[command(about = "Browse the tree of a git commit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the git repository
    #[arg(short, long, value_name = "REPO_PATH", default_value = ".", global = true)]
    repo: PathBuf,

    /// Local branch to read instead of HEAD
    #[arg(short, long, global = true)]
    branch: Option<String>,

    /// Default text encoding for file content
    #[arg(short, long, global = true)]
    encoding: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Repository, branch and head commit
    Info,
    /// List the children of a folder
    Ls {
        /// Folder path, the root when omitted
        path: Option<String>,
        /// Include the last commit of every entry
        #[arg(short, long)]
        last_commit: bool,
    },
    /// Print a file's decoded content
    Cat {
        path: String,
        /// Decode with this encoding instead of the default
        #[arg(long = "as", value_name = "ENCODING")]
        decode_as: Option<String>,
    },
    /// Commits that changed a path, newest first
    Log {
        path: Option<String>,
        /// Show at most this many commits
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Only commits not reachable from this revision
        #[arg(long, value_name = "REV")]
        since: Option<String>,
    },
    /// The commit that last changed a path
    Last { path: Option<String> },
    /// Diff a path against a revision, or between two revisions
    Diff {
        /// Path to diff, `/` for the root
        path: String,
        /// Revision holding the new side
        rev: String,
        /// Revision holding the old side, the current object when omitted
        reference: Option<String>,
        /// Only print statistics
        #[arg(long)]
        stat: bool,
    },
    /// Every folder with its folders and files, depth first
    Walk,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut options = OpenOptions::new();
    if let Some(branch) = &cli.branch {
        options = options.branch(branch.clone());
    }
    if let Some(encoding) = &cli.encoding {
        options = options.encoding(encoding.clone());
    }
    let repo = options
        .open(&cli.repo)
        .with_context(|| format!("Failed to open repository at {}", cli.repo.display()))?;

    match &cli.command {
        Commands::Info => {
            let info = repo.info()?;
            if cli.json {
                return print_json(&info);
            }
            println!("Repository: {}", info.name);
            println!("Path:       {}", info.path);
            println!("Branch:     {}", info.branch);
            println!("Head:       {} {}", short(&info.head_commit.oid), first_line(&info.head_commit.message));
            println!("Bare:       {}", info.is_bare);
            println!("Encoding:   {}", info.encoding);
            for branch in &info.branches {
                println!("  {} {}", if branch.is_current { "*" } else { " " }, branch.name);
            }
        }
        Commands::Ls { path, last_commit } => {
            let folder = match lookup(&repo, path.as_deref())? {
                Node::Folder(folder) => folder,
                Node::File(file) => bail!("{} is not a folder", file.git_path()),
            };
            let mut entries = Vec::new();
            for item in folder.items() {
                let (name, node) = item?;
                let last = if *last_commit {
                    Some(commit_to_info(&node.last_commit()?))
                } else {
                    None
                };
                entries.push(TreeEntry {
                    name,
                    path: node.git_path(),
                    entry_type: node.kind().entry_type(),
                    size: node.as_file().map(|f| f.size() as u64),
                    last_commit: last,
                });
            }
            if cli.json {
                return print_json(&entries);
            }
            for entry in entries {
                let marker = if entry.entry_type == gitdict::models::EntryType::Directory { "/" } else { "" };
                match entry.last_commit {
                    Some(commit) => println!(
                        "{:<40} {} {} ({})",
                        format!("{}{}", entry.name, marker),
                        short(&commit.oid),
                        first_line(&commit.message),
                        commit.relative_time
                    ),
                    None => println!("{}{}", entry.name, marker),
                }
            }
        }
        Commands::Cat { path, decode_as } => {
            let mut file = match repo.get_child(path)? {
                Node::File(file) => file,
                Node::Folder(folder) => bail!("{} is not a file", folder.git_path()),
            };
            let text = file.decode(decode_as.as_deref())?;
            if cli.json {
                return print_json(&serde_json::json!({
                    "path": file.git_path(),
                    "encoding": file.encoding(),
                    "content": text,
                }));
            }
            print!("{}", text);
        }
        Commands::Log { path, limit, since } => {
            let path = path.as_deref().unwrap_or("");
            let history = match since {
                Some(rev) => repo.commit_history_between(path, repo.revparse(rev)?)?,
                None => repo.commit_history_for(path)?,
            };
            let commits: Vec<_> = history
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(commit_to_detail)
                .collect();
            if cli.json {
                return print_json(&commits);
            }
            for commit in commits {
                println!(
                    "{} {} ({}, {})",
                    short(&commit.oid),
                    first_line(&commit.message),
                    commit.author.name,
                    commit.relative_time
                );
            }
        }
        Commands::Last { path } => {
            let commit = repo.last_commit_for(path.as_deref().unwrap_or(""))?;
            let info = commit_to_info(&commit);
            if cli.json {
                return print_json(&info);
            }
            println!("{} {} ({}, {})", info.oid, first_line(&info.message), info.author, info.relative_time);
        }
        Commands::Diff {
            path,
            rev,
            reference,
            stat,
        } => {
            let node = lookup(&repo, Some(path.as_str()))?;
            let target = repo.revparse(rev)?;
            let result = match reference {
                Some(reference) => node.diff_between(target, repo.revparse(reference)?)?,
                None => node.diff(target)?,
            };
            if cli.json {
                return print_json(&result);
            }
            if *stat {
                println!(
                    "{} files changed, {} insertions(+), {} deletions(-)",
                    result.stats.files_changed, result.stats.insertions, result.stats.deletions
                );
            } else {
                print!("{}", result.patch_text());
            }
        }
        Commands::Walk => {
            for entry in repo.walk()? {
                let (folder, folders, files) = entry?;
                let folder_path = folder.git_path();
                println!("{}/", folder_path);
                for child in &folders {
                    println!("  {}/", child.name());
                }
                for child in &files {
                    println!("  {}", child.name());
                }
            }
        }
    }

    Ok(())
}

/// The root for an empty/missing path, otherwise the node at `path`.
fn lookup<'r>(repo: &'r GitRepository, path: Option<&str>) -> anyhow::Result<Node<'r>> {
    match path.map(|p| p.trim_matches('/')) {
        None | Some("") => Ok(Node::Folder(repo.root()?)),
        Some(path) => Ok(repo.get_child(path)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn short(oid: &str) -> &str {
    &oid[..oid.len().min(8)]
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}
