use crate::core::actions::ActionResponse;
use crate::core::model::SubscriptionStatus;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::{Decimal, RoundingStrategy};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Warning,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Amount rounded to cents with its currency code, e.g. `PHP 1200.00`.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    format!(
        "{currency} {:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn money_cell(amount: Decimal, currency: &str) -> Cell {
    Cell::new(format_money(amount, currency)).set_alignment(CellAlignment::Right)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "-".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("-")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

pub fn status_cell(status: SubscriptionStatus) -> Cell {
    let color = match status {
        SubscriptionStatus::Active => Color::Green,
        SubscriptionStatus::Paused => Color::Yellow,
        SubscriptionStatus::Cancelled => Color::DarkGrey,
    };
    Cell::new(status.to_string()).fg(color)
}

/// Days until a charge, highlighted when it is close.
pub fn days_left_cell(days: i64) -> Cell {
    let text = match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    };
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if days <= 3 {
        cell.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

/// Text progress bar for a ratio in `[0, 1]`.
pub fn progress_bar_text(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        ratio.clamp(0.0, 1.0) * 100.0
    )
}

/// Spinner shown while waiting on the network.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a successful action, or turns a failed one into an error after
/// listing its field errors.
pub fn report(response: &ActionResponse) -> anyhow::Result<()> {
    if response.success {
        println!("{}", style_text(&response.message, StyleType::TotalValue));
        return Ok(());
    }

    if let Some(errors) = &response.errors {
        for (field, messages) in errors {
            for message in messages {
                eprintln!("  {}: {}", style_text(field, StyleType::TotalLabel), message);
            }
        }
    }
    anyhow::bail!("{}", response.message)
}
