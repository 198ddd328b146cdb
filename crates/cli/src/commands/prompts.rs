//! Prompts command handler.

use clap::Args;
use coach_core::{config::AppConfig, AppError, AppResult};
use coach_prompt::list_prompts;

/// List the prompts the pipeline resolves, and where each comes from
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let listings = list_prompts(&config.workspace)?;
        tracing::debug!("Found {} prompts", listings.len());

        if self.json {
            let json = serde_json::to_string_pretty(&listings)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        let width = listings.iter().map(|l| l.id.len()).max().unwrap_or(0);
        for listing in &listings {
            println!("{:<width$}  {}", listing.id, listing.origin, width = width);
        }

        Ok(())
    }
}
