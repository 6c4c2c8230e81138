use super::ui;
use crate::AppContext;
use crate::core::reminders::expiring_trials;
use anyhow::Result;
use comfy_table::Cell;

/// Lists trials that convert to paid plans within the reminder window.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let subs = ctx.subscriptions().await?;
    let window = ctx.config.reminders.trial_window_days;
    let reminders = expiring_trials(&subs, ctx.today, window);

    if reminders.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("No trials ending in the next {window} days."),
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Vendor"),
        ui::header_cell("Trial Ends"),
        ui::header_cell("When"),
        ui::header_cell("Then Costs"),
    ]);
    for reminder in &reminders {
        table.add_row(vec![
            Cell::new(&reminder.vendor),
            Cell::new(reminder.ends_on.format("%b %d, %Y")),
            ui::days_left_cell(reminder.days_left),
            ui::money_cell(reminder.renewal_cost, &reminder.currency),
        ]);
    }

    println!(
        "{}\n{}",
        ui::style_text("Trials Ending Soon", ui::StyleType::Title),
        table
    );
    Ok(())
}
