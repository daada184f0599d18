use git2::{Blob, Oid};

use crate::error::{Error, Result};
use crate::git::encoding::TextEncoding;
use crate::git::node::{GitNode, NodeKind};
use crate::git::reference::ToOid;
use crate::git::repository::GitRepository;

/// A blob in the projected tree.
///
/// The bytes never change; `encoding` is a per-instance convenience setting
/// that starts at the repository default and follows the last explicit
/// `decode`.
#[derive(Clone)]
pub struct File<'r> {
    name: String,
    parent: Option<String>,
    repository: &'r GitRepository,
    blob: Blob<'r>,
    encoding: String,
}

impl<'r> File<'r> {
    pub(crate) fn new(
        name: String,
        parent: Option<String>,
        repository: &'r GitRepository,
        blob: Blob<'r>,
    ) -> Self {
        Self {
            name,
            parent,
            encoding: repository.encoding().to_string(),
            repository,
            blob,
        }
    }

    pub fn blob(&self) -> &Blob<'r> {
        &self.blob
    }

    pub fn content(&self) -> &[u8] {
        self.blob.content()
    }

    pub fn size(&self) -> usize {
        self.blob.size()
    }

    pub fn is_binary(&self) -> bool {
        self.blob.is_binary()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Decode the content with the stored encoding.
    pub fn text(&self) -> Result<String> {
        self.decode_as(&self.encoding)
    }

    /// Decode the content, with `encoding` if given (stored for later calls
    /// once decoding succeeds) or with the stored encoding.
    pub fn decode(&mut self, encoding: Option<&str>) -> Result<String> {
        match encoding {
            None => self.text(),
            Some(label) => {
                let text = self.decode_as(label)?;
                self.encoding = label.to_string();
                Ok(text)
            }
        }
    }

    /// Decoded lines, each keeping its line terminator.
    pub fn lines(&self) -> Result<Vec<String>> {
        Ok(self
            .text()?
            .split_inclusive('\n')
            .map(str::to_string)
            .collect())
    }

    fn decode_as(&self, label: &str) -> Result<String> {
        let encoding: TextEncoding = label.parse()?;
        encoding.decode(self.content()).map_err(|reason| Error::Decode {
            path: self.git_path(),
            encoding: label.to_string(),
            reason,
        })
    }
}

impl<'r> GitNode<'r> for File<'r> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent_path(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    fn repository(&self) -> &'r GitRepository {
        self.repository
    }

    fn id(&self) -> Oid {
        self.blob.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::File
    }
}

/// Files are equal when they hold the same blob; the encoding is ignored.
impl PartialEq for File<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.blob.id() == other.blob.id()
    }
}

impl Eq for File<'_> {}

impl ToOid for File<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

impl std::fmt::Debug for File<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("git_path", &self.git_path())
            .field("blob", &self.blob.id())
            .field("encoding", &self.encoding)
            .finish()
    }
}
