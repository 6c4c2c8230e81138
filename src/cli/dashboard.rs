use super::ui;
use crate::AppContext;
use crate::core::analytics::DashboardSummary;
use crate::core::rates::RateSource;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

impl DashboardSummary {
    pub fn display_as_table(&self) -> String {
        let currency = &self.base_currency;
        let mut output = format!(
            "{}\n",
            ui::style_text(&format!("Dashboard ({currency})"), ui::StyleType::Title)
        );
        if self.rate_source == RateSource::Fallback {
            output.push_str(&ui::style_text(
                "Live exchange rates unavailable, using offline estimates.\n",
                ui::StyleType::Warning,
            ));
        }

        let mut stats = ui::new_styled_table();
        stats.set_header(vec![
            ui::header_cell("Monthly Burn"),
            ui::header_cell("Annual Projection"),
            ui::header_cell("Active Trials"),
            ui::header_cell("Saved / Month"),
        ]);
        stats.add_row(vec![
            ui::money_cell(self.monthly_burn, currency),
            ui::money_cell(self.annual_projection, currency),
            Cell::new(self.active_trials).set_alignment(CellAlignment::Right),
            ui::money_cell(self.graveyard.total_saved_monthly, currency),
        ]);
        output.push('\n');
        output.push_str(&stats.to_string());

        let mut runway = ui::new_styled_table();
        runway.set_header(vec![
            ui::header_cell("Next 30 Days"),
            ui::header_cell("Next 60 Days"),
            ui::header_cell("Next 90 Days"),
        ]);
        runway.add_row(vec![
            ui::money_cell(self.runway.d30, currency),
            ui::money_cell(self.runway.d60, currency),
            ui::money_cell(self.runway.d90, currency),
        ]);
        output.push_str(&format!(
            "\n\n{}\n{}",
            ui::style_text("Cash Flow Runway", ui::StyleType::TotalLabel),
            runway
        ));

        if !self.upcoming.is_empty() {
            let mut bills = ui::new_styled_table();
            bills.set_header(vec![
                ui::header_cell("Vendor"),
                ui::header_cell("Due"),
                ui::header_cell("When"),
                ui::header_cell("Amount"),
            ]);
            for bill in &self.upcoming {
                bills.add_row(vec![
                    Cell::new(&bill.vendor),
                    Cell::new(bill.due.format("%b %d, %Y")),
                    ui::days_left_cell(bill.days_left),
                    ui::money_cell(bill.amount, &bill.currency),
                ]);
            }
            output.push_str(&format!(
                "\n\n{}\n{}",
                ui::style_text("Upcoming Bills", ui::StyleType::TotalLabel),
                bills
            ));
        }

        if !self.categories.is_empty() {
            let mut categories = ui::new_styled_table();
            categories.set_header(vec![
                ui::header_cell("Category"),
                ui::header_cell(&format!("Monthly ({currency})")),
            ]);
            for spend in &self.categories {
                categories.add_row(vec![
                    Cell::new(&spend.category),
                    ui::money_cell(spend.monthly_cost, currency),
                ]);
            }
            output.push_str(&format!(
                "\n\n{}\n{}",
                ui::style_text("Spending by Category", ui::StyleType::TotalLabel),
                categories
            ));
        }

        let mut forecast = ui::new_styled_table();
        forecast.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell("Categories"),
            ui::header_cell(&format!("Total ({currency})")),
        ]);
        for month in &self.forecast {
            let breakdown = month
                .by_category
                .iter()
                .map(|(category, amount)| format!("{category}: {:.2}", amount.round_dp(2)))
                .collect::<Vec<_>>()
                .join(", ");
            forecast.add_row(vec![
                Cell::new(month.month.format("%B %Y")),
                Cell::new(breakdown),
                ui::money_cell(month.total, currency),
            ]);
        }
        output.push_str(&format!(
            "\n\n{}\n{}",
            ui::style_text("Spending Velocity", ui::StyleType::TotalLabel),
            forecast
        ));

        if !self.alerts.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("Insights", ui::StyleType::TotalLabel)
            ));
            for alert in &self.alerts {
                output.push_str(&format!(
                    "\n  {} {} ({}: {}) {}",
                    ui::style_text("!", ui::StyleType::Warning),
                    alert.message,
                    alert.kind,
                    alert.vendors.join(", "),
                    ui::style_text(
                        &ui::format_money(alert.total_cost, currency),
                        ui::StyleType::Subtle
                    ),
                ));
            }
        }

        output
    }
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let summary = ctx.dashboard().await;
    pb.finish_and_clear();

    println!("{}", summary?.display_as_table());
    Ok(())
}
