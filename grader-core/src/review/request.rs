//! Review requests and their validation
//!
//! A [`ReviewRequest`] can only be obtained through validation, so every
//! request that reaches the pipeline points at a real GitHub repository and
//! carries a non-empty assignment description.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Hosts accepted for repository URLs
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Skill level of the candidate under review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateLevel {
    Junior,
    #[default]
    Middle,
    Senior,
}

impl CandidateLevel {
    /// Lowercase name used in prompts and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateLevel::Junior => "junior",
            CandidateLevel::Middle => "middle",
            CandidateLevel::Senior => "senior",
        }
    }
}

impl fmt::Display for CandidateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(CandidateLevel::Junior),
            "middle" => Ok(CandidateLevel::Middle),
            "senior" => Ok(CandidateLevel::Senior),
            other => Err(ValidationError::UnknownLevel(other.to_string())),
        }
    }
}

/// Reasons a review request is rejected at the boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Assignment description must not be empty")]
    EmptyDescription,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL must be a valid GitHub HTTPS address.")]
    NotGitHubHttps,

    #[error("Invalid GitHub repository URL")]
    MissingRepositoryPath,

    #[error("Unknown candidate level '{0}'. Expected junior, middle or senior")]
    UnknownLevel(String),
}

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Create a reference from its parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Extract owner and repository from an HTTPS GitHub URL
    ///
    /// Supports:
    /// - https://github.com/owner/repo
    /// - https://github.com/owner/repo.git
    /// - https://github.com/owner/repo/tree/main (extra segments are ignored)
    pub fn from_url(url: &Url) -> Result<Self, ValidationError> {
        let host = url.host_str().unwrap_or_default();
        if url.scheme() != "https" || !GITHUB_HOSTS.contains(&host) {
            return Err(ValidationError::NotGitHubHttps);
        }

        let mut segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|segment| !segment.is_empty());

        let owner = segments.next().ok_or(ValidationError::MissingRepositoryPath)?;
        let name = segments
            .next()
            .map(|name| name.trim_end_matches(".git"))
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingRepositoryPath)?;

        Ok(Self::new(owner, name))
    }

    /// Repository owner (user or organization)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s.trim()).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        Self::from_url(&url)
    }
}

/// A validated request to review a candidate's assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    assignment_description: String,
    repository_url: Url,
    candidate_level: CandidateLevel,
    repository: RepositoryRef,
}

impl ReviewRequest {
    /// Validate the raw parts of a request
    pub fn new(
        assignment_description: impl Into<String>,
        repository_url: &str,
        candidate_level: CandidateLevel,
    ) -> Result<Self, ValidationError> {
        let assignment_description = assignment_description.into();
        if assignment_description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let repository_url =
            Url::parse(repository_url.trim()).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        let repository = RepositoryRef::from_url(&repository_url)?;

        Ok(Self {
            assignment_description,
            repository_url,
            candidate_level,
            repository,
        })
    }

    /// Free-form assignment description
    pub fn assignment_description(&self) -> &str {
        &self.assignment_description
    }

    /// The repository URL as submitted (normalized by URL parsing)
    pub fn repository_url(&self) -> &Url {
        &self.repository_url
    }

    /// Candidate skill level
    pub fn candidate_level(&self) -> CandidateLevel {
        self.candidate_level
    }

    /// Repository the URL points at
    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }
}

/// Wire shape of a review submission, before validation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewPayload {
    pub assignment_description: String,
    pub github_repo_url: String,
    #[serde(default)]
    pub candidate_level: CandidateLevel,
}

impl TryFrom<ReviewPayload> for ReviewRequest {
    type Error = ValidationError;

    fn try_from(payload: ReviewPayload) -> Result<Self, Self::Error> {
        ReviewRequest::new(
            payload.assignment_description,
            &payload.github_repo_url,
            payload.candidate_level,
        )
    }
}

/// Feedback returned to the caller, whether fresh or cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedReview {
    pub data: String,
}

impl CompletedReview {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}
