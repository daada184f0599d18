pub mod diff;
pub mod encoding;
pub mod file;
pub mod history;
pub mod node;
pub mod reference;
pub mod repository;
pub mod tree;
pub mod walker;

pub use encoding::TextEncoding;
pub use file::File;
pub use node::{GitNode, Lookup, Node, NodeKind};
pub use reference::ToOid;
pub use repository::{GitRepository, OpenOptions};
pub use tree::{Folder, Walk, WalkEntry};
pub use walker::CommitWalk;
