use super::ui;
use crate::AppContext;
use anyhow::Result;

/// Shows the display currency, or changes it when `code` is given.
pub async fn currency(ctx: &AppContext, code: Option<&str>) -> Result<()> {
    match code {
        Some(code) => ui::report(&ctx.actions().update_settings(code).await),
        None => {
            let user = ctx.user().await?;
            println!(
                "{} {}",
                ui::style_text("Display currency:", ui::StyleType::TotalLabel),
                user.preferred_currency
            );
            Ok(())
        }
    }
}
