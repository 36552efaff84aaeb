//! Recursive repository traversal
//!
//! [`RepositoryWalker`] walks a repository depth-first in listing order and
//! aggregates every reviewable file into one annotated text. Traversal is
//! permissive: a directory that cannot be listed contributes nothing and a
//! file that cannot be downloaded is skipped, while the rest of the tree is
//! still walked.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use grader_core::config::ReviewConfig;
use grader_core::{RepositoryRef, RepositorySnapshot, SourceTreeFetcher};
use tracing::{debug, info, warn};

use crate::contents::{ContentEntry, ContentsApi, EntryKind};

/// Name-based rules for which entries a walk includes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    suffixes: Vec<String>,
    excluded_files: Vec<String>,
    excluded_dirs: Vec<String>,
}

impl FileFilter {
    pub fn new(suffixes: Vec<String>, excluded_files: Vec<String>, excluded_dirs: Vec<String>) -> Self {
        Self {
            suffixes,
            excluded_files,
            excluded_dirs,
        }
    }

    pub fn from_config(config: &ReviewConfig) -> Self {
        Self::new(
            config.reviewable_suffixes.clone(),
            config.excluded_files.clone(),
            config.excluded_dirs.clone(),
        )
    }

    /// Whether a file with this base name should be reviewed
    ///
    /// An empty suffix list admits every name that is not excluded.
    pub fn admits_file(&self, name: &str) -> bool {
        if self.excluded_files.iter().any(|excluded| excluded == name) {
            return false;
        }
        self.suffixes.is_empty() || self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Whether a directory with this base name should be descended into
    pub fn admits_dir(&self, name: &str) -> bool {
        !self.excluded_dirs.iter().any(|excluded| excluded == name)
    }
}

/// Walks a repository through a [`ContentsApi`]
#[derive(Debug)]
pub struct RepositoryWalker<A> {
    api: A,
    filter: FileFilter,
}

impl<A: ContentsApi> RepositoryWalker<A> {
    pub fn new(api: A, filter: FileFilter) -> Self {
        Self { api, filter }
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    /// Walk the subtree rooted at `path` (`""` for the repository root)
    ///
    /// File segments are rendered as `# File: {path}\n{content}\n\n` and all
    /// segments of one directory are joined with a newline, so an empty
    /// subdirectory still contributes an empty segment.
    pub fn walk<'a>(
        &'a self,
        repository: &'a RepositoryRef,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = RepositorySnapshot> + Send + 'a>> {
        Box::pin(async move {
            let entries = match self.api.list_dir(repository, path).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(repository = %repository, path = %path, error = %e, "Failed to list directory");
                    return RepositorySnapshot::default();
                }
            };

            let mut segments = Vec::new();
            let mut paths = Vec::new();

            for entry in entries {
                match entry.kind {
                    EntryKind::File if self.filter.admits_file(&entry.name) => {
                        if let Some(text) = self.read_file(&entry).await {
                            segments.push(format!("# File: {}\n{}\n\n", entry.path, text));
                            paths.push(entry.path);
                        }
                    }
                    EntryKind::Dir if self.filter.admits_dir(&entry.name) => {
                        let (content, sub_paths) = self.walk(repository, &entry.path).await.into_parts();
                        segments.push(content);
                        paths.extend(sub_paths);
                    }
                    _ => debug!(path = %entry.path, kind = ?entry.kind, "Skipping entry"),
                }
            }

            RepositorySnapshot::new(segments.join("\n"), paths)
        })
    }

    async fn read_file(&self, entry: &ContentEntry) -> Option<String> {
        match self.api.download(entry).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!(path = %entry.path, error = %e, "Failed to download file, skipping");
                None
            }
        }
    }
}

#[async_trait]
impl<A: ContentsApi> SourceTreeFetcher for RepositoryWalker<A> {
    async fn fetch(&self, repository: &RepositoryRef) -> RepositorySnapshot {
        let snapshot = self.walk(repository, "").await;
        info!(
            repository = %repository,
            files = snapshot.paths().len(),
            "Walked repository"
        );
        snapshot
    }
}
