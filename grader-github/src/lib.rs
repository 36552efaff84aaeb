//! Grader GitHub - repository access for Grader
//!
//! This crate lists repository trees through the GitHub contents API,
//! downloads raw files, and walks a repository into the
//! [`grader_core::RepositorySnapshot`] that the review prompt is built from.

mod client;
mod contents;
mod error;
mod walker;

pub use client::GitHubClient;
pub use contents::{ContentEntry, ContentsApi, EntryKind};
pub use error::{Error, Result};
pub use walker::{FileFilter, RepositoryWalker};
