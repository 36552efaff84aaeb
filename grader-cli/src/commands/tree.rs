//! Tree command - show which files a review would include

use clap::Args;
use grader_core::{Config, RepositoryRef, Secrets, SourceTreeFetcher};

/// List the files a review of a repository would include
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// HTTPS URL of the GitHub repository
    pub github_repo_url: String,

    /// Also print the aggregated content sent to the model
    #[arg(long)]
    pub content: bool,
}

impl TreeArgs {
    /// Execute the tree command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let repository: RepositoryRef = self.github_repo_url.parse()?;
        let secrets = Secrets::load()?;
        let walker = super::build_walker(config, &secrets)?;

        let snapshot = walker.fetch(&repository).await;

        if snapshot.is_empty() {
            println!("No reviewable files found in {}.", repository);
            return Ok(());
        }

        println!("{} ({} files)", repository, snapshot.paths().len());
        println!();
        for path in snapshot.paths() {
            println!("  {}", path);
        }

        if self.content {
            println!();
            println!("{}", snapshot.content());
        }

        Ok(())
    }
}
