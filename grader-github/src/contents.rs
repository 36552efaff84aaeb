//! Repository contents listing

use async_trait::async_trait;
use grader_core::RepositoryRef;
use octocrab::models::repos::Content;

use crate::Result;

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything else the walker skips
    Other,
}

impl EntryKind {
    /// Parse the `type` field of a contents API entry
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "file" => Self::File,
            "dir" => Self::Dir,
            _ => Self::Other,
        }
    }
}

/// One entry of a repository directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub kind: EntryKind,
    /// Base name of the entry
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    /// Raw content location; only files carry one
    pub download_url: Option<String>,
}

impl ContentEntry {
    pub fn file(path: impl Into<String>, download_url: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: EntryKind::File,
            name: base_name(&path),
            path,
            download_url: Some(download_url.into()),
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: EntryKind::Dir,
            name: base_name(&path),
            path,
            download_url: None,
        }
    }
}

fn base_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

impl From<Content> for ContentEntry {
    fn from(content: Content) -> Self {
        Self {
            kind: EntryKind::from_api(&content.r#type),
            name: content.name,
            path: content.path,
            download_url: content.download_url,
        }
    }
}

/// Read access to a repository tree
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// List the entries directly under `path` (`""` is the root)
    async fn list_dir(&self, repository: &RepositoryRef, path: &str) -> Result<Vec<ContentEntry>>;

    /// Download the raw bytes of a file entry
    async fn download(&self, entry: &ContentEntry) -> Result<Vec<u8>>;
}
