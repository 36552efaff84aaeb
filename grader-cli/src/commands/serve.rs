//! Serve command - run the HTTP review service

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;
use grader_core::{Config, Secrets};

use crate::server::{self, AppState};

/// Run the HTTP review service
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and env)
    #[arg(long, env = "GRADER_BIND")]
    pub bind: Option<SocketAddr>,

    /// Cache reviews in process memory instead of Redis
    #[arg(long)]
    pub memory_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let service = super::build_service(config, &secrets, self.memory_cache).await?;

        let state = AppState {
            service: Arc::new(service),
        };
        server::serve(state, config.server.bind).await?;
        Ok(())
    }
}
