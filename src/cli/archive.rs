use super::subscriptions::{resolve_id, short_id};
use super::ui;
use crate::AppContext;
use crate::core::analytics::{graveyard_stats, monthly_cost_in_base};
use crate::core::model::SubscriptionStatus;
use anyhow::Result;
use comfy_table::Cell;

pub async fn archive(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_id(ctx, id).await?;
    ui::report(&ctx.actions().archive(id).await)
}

pub async fn restore(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_id(ctx, id).await?;
    ui::report(&ctx.actions().restore(id).await)
}

/// Cancelled subscriptions and what they would still cost each month.
pub async fn graveyard(ctx: &AppContext) -> Result<()> {
    let (user, subs) = futures::try_join!(ctx.user(), ctx.subscriptions())?;
    let pb = ui::new_spinner("Fetching exchange rates...");
    let rates = ctx.user_rates(&user).await;
    pb.finish_and_clear();
    let rates = rates?;

    let stats = graveyard_stats(&subs, &rates);
    println!(
        "{}",
        ui::style_text("Subscription Graveyard", ui::StyleType::Title)
    );
    if stats.count == 0 {
        println!(
            "{}",
            ui::style_text("Nothing cancelled yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Vendor"),
        ui::header_cell("Category"),
        ui::header_cell("Frequency"),
        ui::header_cell(&format!("Saved / Month ({})", rates.base)),
    ]);
    for sub in subs
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Cancelled)
    {
        table.add_row(vec![
            Cell::new(short_id(sub.id)),
            Cell::new(&sub.vendor.name),
            Cell::new(&sub.category),
            Cell::new(sub.frequency),
            ui::money_cell(monthly_cost_in_base(sub, &rates), &rates.base),
        ]);
    }

    println!("{table}");
    println!(
        "\n{} {} across {} cancelled subscriptions",
        ui::style_text("Total saved per month:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::format_money(stats.total_saved_monthly, &rates.base),
            ui::StyleType::TotalValue
        ),
        stats.count
    );
    Ok(())
}
