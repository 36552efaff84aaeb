//! Review command - run one review and print the feedback

use clap::Args;
use grader_core::{CandidateLevel, Config, ReviewRequest, Secrets};

/// Review one repository and print the feedback
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// HTTPS URL of the candidate's GitHub repository
    pub github_repo_url: String,

    /// Assignment description the candidate worked from
    #[arg(short, long)]
    pub description: String,

    /// Candidate level: junior, middle or senior
    #[arg(short, long, default_value_t = CandidateLevel::Middle)]
    pub level: CandidateLevel,

    /// Cache reviews in process memory instead of Redis
    #[arg(long)]
    pub memory_cache: bool,

    /// Print the response as JSON (`{"data": ...}`)
    #[arg(long)]
    pub json: bool,
}

impl ReviewArgs {
    /// Execute the review command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let request = ReviewRequest::new(self.description.as_str(), &self.github_repo_url, self.level)?;

        let secrets = Secrets::load()?;
        let service = super::build_service(config, &secrets, self.memory_cache).await?;

        tracing::info!(
            repository = %request.repository(),
            level = %request.candidate_level(),
            "Reviewing repository"
        );

        let review = service
            .process(&request)
            .await
            .map_err(|e| anyhow::anyhow!("Review failed ({}): {}", e.status(), e.detail()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&review)?);
        } else {
            println!("{}", review.data);
        }

        Ok(())
    }
}
