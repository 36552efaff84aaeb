//! Repository snapshots and the fetcher that produces them

use async_trait::async_trait;

use crate::review::RepositoryRef;

/// Aggregated, path-annotated source text of one repository traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    content: String,
    paths: Vec<String>,
}

impl RepositorySnapshot {
    pub fn new(content: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            content: content.into(),
            paths,
        }
    }

    /// Concatenated file contents, each preceded by a `# File:` header
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Included file paths in traversal order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Included file paths, one per line
    pub fn structure(&self) -> String {
        self.paths.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.content, self.paths)
    }
}

/// Trait for fetching the reviewable source of a repository
///
/// Fetching is best-effort: parts of the tree that cannot be read are left
/// out of the snapshot instead of failing the whole fetch.
#[async_trait]
pub trait SourceTreeFetcher: Send + Sync {
    async fn fetch(&self, repository: &RepositoryRef) -> RepositorySnapshot;
}
