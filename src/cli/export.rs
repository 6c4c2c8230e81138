use crate::AppContext;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Writes every subscription as JSON rows to `output`, or stdout.
pub async fn run(ctx: &AppContext, output: Option<&Path>) -> Result<()> {
    let rows = ctx.actions().export_data().await?;
    let json = serde_json::to_string_pretty(&rows).context("Failed to serialize export")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            info!("Exported {} subscriptions to {}", rows.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
