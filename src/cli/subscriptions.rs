use super::ui;
use crate::AppContext;
use crate::core::actions::SubscriptionInput;
use crate::core::analytics::monthly_cost_in_base;
use crate::core::billing::{
    cycle_progress, lifetime_spend, payments_made, subscription_next_renewal,
};
use crate::core::currency::to_base;
use crate::core::model::{Frequency, Subscription, SubscriptionStatus};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::Cell;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Subscription fields given on the command line; unset fields keep their
/// current value on edit and take defaults on add.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFields {
    pub name: Option<String>,
    pub website: Option<String>,
    pub cost: Option<Decimal>,
    pub split_cost: Option<Decimal>,
    pub currency: Option<String>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub trial: Option<bool>,
    pub category: Option<String>,
    pub status: Option<SubscriptionStatus>,
}

impl SubscriptionFields {
    pub fn into_new_input(self, default_currency: &str, today: NaiveDate) -> SubscriptionInput {
        SubscriptionInput {
            name: self.name.unwrap_or_default(),
            website: self.website,
            cost: self.cost.unwrap_or_default(),
            split_cost: self.split_cost,
            currency: self.currency.unwrap_or_else(|| default_currency.to_string()),
            frequency: Some(self.frequency.unwrap_or(Frequency::Monthly)),
            start_date: Some(self.start_date.unwrap_or(today)),
            is_trial: self.trial.unwrap_or(false),
            category: self.category,
            status: self.status,
        }
    }

    pub fn apply_to(self, existing: &Subscription) -> SubscriptionInput {
        SubscriptionInput {
            name: self.name.unwrap_or_else(|| existing.vendor.name.clone()),
            website: self.website.or_else(|| existing.vendor.website.clone()),
            cost: self.cost.unwrap_or(existing.cost),
            split_cost: self.split_cost.or(existing.split_cost),
            currency: self.currency.unwrap_or_else(|| existing.currency.clone()),
            frequency: Some(self.frequency.unwrap_or(existing.frequency)),
            start_date: Some(self.start_date.unwrap_or(existing.start_date)),
            is_trial: self.trial.unwrap_or(existing.is_trial),
            category: Some(self.category.unwrap_or_else(|| existing.category.clone())),
            status: self.status,
        }
    }
}

/// Finds the user's subscription by full id or unique id prefix.
pub async fn resolve_id(ctx: &AppContext, text: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(text) {
        return Ok(id);
    }

    let prefix = text.to_lowercase();
    let matches: Vec<Uuid> = ctx
        .subscriptions()
        .await?
        .iter()
        .map(|s| s.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    debug!("Id prefix {} matched {} subscriptions", text, matches.len());

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No subscription matches id {text}"),
        _ => bail!("Id prefix {text} is ambiguous"),
    }
}

pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn cost_text(sub: &Subscription) -> String {
    let cost = ui::format_money(sub.cost, &sub.currency);
    match sub.split_cost {
        Some(split) if split > Decimal::ZERO => {
            format!("{} (my share {})", cost, ui::format_money(split, &sub.currency))
        }
        _ => cost,
    }
}

pub async fn list(ctx: &AppContext, status: Option<SubscriptionStatus>) -> Result<()> {
    let (user, mut subs) = futures::try_join!(ctx.user(), ctx.subscriptions())?;
    let pb = ui::new_spinner("Fetching exchange rates...");
    let rates = ctx.user_rates(&user).await;
    pb.finish_and_clear();
    let rates = rates?;

    subs.retain(|s| match status {
        Some(status) => s.status == status,
        None => s.status != SubscriptionStatus::Cancelled,
    });
    subs.sort_by(|a, b| {
        a.vendor
            .name
            .to_lowercase()
            .cmp(&b.vendor.name.to_lowercase())
            .then(a.start_date.cmp(&b.start_date))
    });

    if subs.is_empty() {
        println!(
            "{}",
            ui::style_text("No subscriptions found.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Vendor"),
        ui::header_cell("Category"),
        ui::header_cell("Cost"),
        ui::header_cell("Frequency"),
        ui::header_cell("Status"),
        ui::header_cell("Next Renewal"),
        ui::header_cell(&format!("Monthly ({})", rates.base)),
    ]);
    for sub in &subs {
        let vendor = if sub.is_trial {
            format!("{} (trial)", sub.vendor.name)
        } else {
            sub.vendor.name.clone()
        };
        let next = (sub.status != SubscriptionStatus::Cancelled)
            .then(|| subscription_next_renewal(sub, ctx.today));
        table.add_row(vec![
            Cell::new(short_id(sub.id)),
            Cell::new(vendor),
            Cell::new(&sub.category),
            Cell::new(cost_text(sub)),
            Cell::new(sub.frequency),
            ui::status_cell(sub.status),
            ui::format_optional_cell(next, |d| d.format("%b %d, %Y").to_string()),
            ui::money_cell(monthly_cost_in_base(sub, &rates), &rates.base),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_id(ctx, id).await?;
    let sub = match ctx.repo.get_subscription(id).await? {
        Some(sub) if sub.user_id == ctx.session.user_id => sub,
        _ => bail!("Subscription not found"),
    };
    let user = ctx.user().await?;
    let rates = ctx.user_rates(&user).await?;

    let progress = cycle_progress(sub.start_date, sub.frequency, sub.next_renewal_date, ctx.today);
    let payments = payments_made(sub.start_date, sub.frequency, ctx.today, sub.is_trial);
    let spent = lifetime_spend(&sub, ctx.today);

    let mut table = ui::new_styled_table();
    let mut row = |label: &str, value: String| {
        table.add_row(vec![ui::header_cell(label), Cell::new(value)]);
    };
    row("ID", sub.id.to_string());
    row("Vendor", sub.vendor.name.clone());
    row(
        "Website",
        sub.vendor.website.clone().unwrap_or_else(|| "-".to_string()),
    );
    row("Category", sub.category.clone());
    row("Status", sub.status.to_string());
    row("Cost", cost_text(&sub));
    row("Frequency", sub.frequency.to_string());
    row("Trial", if sub.is_trial { "yes" } else { "no" }.to_string());
    row("Start Date", sub.start_date.format("%b %d, %Y").to_string());
    row(
        "Next Renewal",
        progress.next_renewal.format("%b %d, %Y").to_string(),
    );
    row(
        "Cycle",
        format!(
            "{} {} of {} days, renews in {} days",
            ui::progress_bar_text(progress.ratio(), 20),
            progress.days_used.max(0),
            progress.days_in_cycle,
            progress.days_until_renewal
        ),
    );
    row("Payments Made", payments.to_string());
    row(
        "Lifetime Spend",
        format!(
            "{} ({})",
            ui::format_money(spent, &sub.currency),
            ui::format_money(to_base(spent, &sub.currency, &rates), &rates.base)
        ),
    );

    println!(
        "{}\n{}",
        ui::style_text(&sub.vendor.name, ui::StyleType::Title),
        table
    );
    Ok(())
}

pub async fn add(ctx: &AppContext, fields: SubscriptionFields) -> Result<()> {
    if fields.cost.is_none() {
        bail!("A cost is required to add a subscription (--cost)");
    }
    let user = ctx.user().await?;
    let input = fields.into_new_input(&user.preferred_currency, ctx.today);
    let response = ctx.actions().add(&input).await;
    if let Some(id) = response.id {
        println!("{} {}", ui::style_text("ID", ui::StyleType::Subtle), id);
    }
    ui::report(&response)
}

pub async fn edit(ctx: &AppContext, id: &str, fields: SubscriptionFields) -> Result<()> {
    let id = resolve_id(ctx, id).await?;
    let existing = match ctx.repo.get_subscription(id).await? {
        Some(sub) if sub.user_id == ctx.session.user_id => sub,
        _ => bail!("Subscription not found"),
    };
    let input = fields.apply_to(&existing);
    ui::report(&ctx.actions().update(id, &input).await)
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_id(ctx, id).await?;
    ui::report(&ctx.actions().delete(id).await)
}
