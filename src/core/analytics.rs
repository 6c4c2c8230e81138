//! Dashboard aggregates computed over a user's subscriptions.
//!
//! Every amount returned here is expressed in the base currency of the rate
//! table passed in, which is the user's preferred currency.
use crate::core::billing::{add_cycles, subscription_next_renewal};
use crate::core::currency::to_base;
use crate::core::model::{Frequency, Subscription, SubscriptionStatus};
use crate::core::rates::{RateSource, RateTable};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use tracing::debug;
use uuid::Uuid;

const RUNWAY_HORIZON_DAYS: i64 = 90;
const RUNWAY_MAX_OCCURRENCES: u32 = 12;
pub const FORECAST_MONTHS: u32 = 6;
pub const UPCOMING_BILLS_LIMIT: usize = 4;

/// Effective cost converted to base, spread over a month.
pub fn monthly_cost_in_base(sub: &Subscription, rates: &RateTable) -> Decimal {
    let cost = to_base(sub.effective_cost(), &sub.currency, rates);
    match sub.frequency {
        Frequency::Monthly => cost,
        Frequency::Yearly => cost / Decimal::from(12),
    }
}

/// Recurring monthly spend of active, paying subscriptions. Trials cost nothing yet.
pub fn monthly_burn(subs: &[Subscription], rates: &RateTable) -> Decimal {
    subs.iter()
        .filter(|s| s.is_active() && !s.is_trial)
        .map(|s| monthly_cost_in_base(s, rates))
        .sum()
}

pub fn annual_projection(monthly_burn: Decimal) -> Decimal {
    monthly_burn * Decimal::from(12)
}

/// Active trials whose trial period has not ended yet.
pub fn active_trial_count(subs: &[Subscription], today: NaiveDate) -> usize {
    subs.iter()
        .filter(|s| s.is_active() && s.is_trial && s.next_renewal_date >= today)
        .count()
}

/// Charges falling due within the next 30, 60 and 90 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CashFlowRunway {
    pub d30: Decimal,
    pub d60: Decimal,
    pub d90: Decimal,
}

pub fn cash_flow_runway(subs: &[Subscription], rates: &RateTable, today: NaiveDate) -> CashFlowRunway {
    let mut runway = CashFlowRunway::default();

    for sub in subs.iter().filter(|s| s.is_active()) {
        let first = subscription_next_renewal(sub, today);
        let cost = to_base(sub.effective_cost(), &sub.currency, rates);

        for i in 0..RUNWAY_MAX_OCCURRENCES {
            let due = add_cycles(first, sub.frequency, i);
            let offset = (due - today).num_days();
            if offset > RUNWAY_HORIZON_DAYS {
                break;
            }
            if offset < 0 {
                continue;
            }
            if offset <= 30 {
                runway.d30 += cost;
            }
            if offset <= 60 {
                runway.d60 += cost;
            }
            runway.d90 += cost;
        }
    }

    runway
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    DuplicateVendor,
    CategoryOverload,
}

impl Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::DuplicateVendor => write!(f, "Duplicate vendor"),
            AlertKind::CategoryOverload => write!(f, "Category overload"),
        }
    }
}

/// A group of active subscriptions that likely overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedundancyAlert {
    pub kind: AlertKind,
    /// Vendor name or category the group was formed on.
    pub group: String,
    pub count: usize,
    pub vendors: Vec<String>,
    pub total_cost: Decimal,
    pub message: String,
}

/// Flags duplicate vendors, then crowded categories outside `safe_categories`.
///
/// A category is only flagged when at least two of its members were not
/// already reported as vendor duplicates.
pub fn redundancy_alerts(
    subs: &[Subscription],
    rates: &RateTable,
    safe_categories: &[String],
) -> Vec<RedundancyAlert> {
    let active: Vec<&Subscription> = subs.iter().filter(|s| s.is_active()).collect();
    let group_cost = |items: &[&Subscription]| -> Decimal {
        items
            .iter()
            .map(|s| to_base(s.effective_cost(), &s.currency, rates))
            .sum()
    };

    let mut alerts = Vec::new();
    let mut flagged: HashSet<Uuid> = HashSet::new();

    let mut by_vendor: BTreeMap<&str, Vec<&Subscription>> = BTreeMap::new();
    for &sub in &active {
        by_vendor.entry(sub.vendor.name.as_str()).or_default().push(sub);
    }
    for (vendor, items) in &by_vendor {
        if items.len() < 2 {
            continue;
        }
        flagged.extend(items.iter().map(|s| s.id));
        alerts.push(RedundancyAlert {
            kind: AlertKind::DuplicateVendor,
            group: vendor.to_string(),
            count: items.len(),
            vendors: items.iter().map(|s| s.vendor.name.clone()).collect(),
            total_cost: group_cost(items),
            message: format!("You have {} subscriptions for {}.", items.len(), vendor),
        });
    }

    let mut by_category: BTreeMap<&str, Vec<&Subscription>> = BTreeMap::new();
    for &sub in &active {
        by_category.entry(sub.category.as_str()).or_default().push(sub);
    }
    for (category, items) in &by_category {
        if safe_categories.iter().any(|c| c == category) || items.len() < 2 {
            continue;
        }
        let unflagged = items.iter().filter(|s| !flagged.contains(&s.id)).count();
        if unflagged < 2 {
            continue;
        }
        alerts.push(RedundancyAlert {
            kind: AlertKind::CategoryOverload,
            group: category.to_string(),
            count: items.len(),
            vendors: items.iter().map(|s| s.vendor.name.clone()).collect(),
            total_cost: group_cost(items),
            message: format!("You have {} subscriptions in {}.", items.len(), category),
        });
    }

    debug!("Found {} redundancy alerts", alerts.len());
    alerts
}

/// What cancelled subscriptions would cost per month if they were still running.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GraveyardStats {
    pub count: usize,
    pub total_saved_monthly: Decimal,
    pub cancelled: Vec<Uuid>,
}

pub fn graveyard_stats(subs: &[Subscription], rates: &RateTable) -> GraveyardStats {
    let cancelled: Vec<&Subscription> = subs
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Cancelled)
        .collect();

    GraveyardStats {
        count: cancelled.len(),
        total_saved_monthly: cancelled.iter().map(|s| monthly_cost_in_base(s, rates)).sum(),
        cancelled: cancelled.iter().map(|s| s.id).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingBill {
    pub subscription_id: Uuid,
    pub vendor: String,
    /// Charge in the subscription's own currency.
    pub amount: Decimal,
    pub currency: String,
    pub due: NaiveDate,
    pub days_left: i64,
}

/// Soonest `limit` charges among active subscriptions.
pub fn upcoming_bills(subs: &[Subscription], today: NaiveDate, limit: usize) -> Vec<UpcomingBill> {
    let mut bills: Vec<UpcomingBill> = subs
        .iter()
        .filter(|s| s.is_active())
        .map(|s| {
            let due = subscription_next_renewal(s, today);
            UpcomingBill {
                subscription_id: s.id,
                vendor: s.vendor.name.clone(),
                amount: s.effective_cost(),
                currency: s.currency.clone(),
                due,
                days_left: (due - today).num_days(),
            }
        })
        .collect();

    bills.sort_by(|a, b| a.days_left.cmp(&b.days_left).then_with(|| a.vendor.cmp(&b.vendor)));
    bills.truncate(limit);
    bills
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub monthly_cost: Decimal,
}

/// Monthly spend of active subscriptions per category, largest first.
pub fn category_breakdown(subs: &[Subscription], rates: &RateTable) -> Vec<CategorySpend> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for sub in subs.iter().filter(|s| s.is_active()) {
        *totals.entry(sub.category.clone()).or_default() += monthly_cost_in_base(sub, rates);
    }

    let mut breakdown: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, monthly_cost)| CategorySpend {
            category,
            monthly_cost,
        })
        .collect();
    breakdown.sort_by(|a, b| b.monthly_cost.cmp(&a.monthly_cost));
    breakdown
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastMonth {
    /// First day of the month.
    pub month: NaiveDate,
    pub by_category: BTreeMap<String, Decimal>,
    pub total: Decimal,
}

/// Expected charges per calendar month, starting with the current one.
///
/// Monthly plans count in every month from their start month on; yearly plans
/// only in the month of their next renewal.
pub fn spending_forecast(
    subs: &[Subscription],
    rates: &RateTable,
    today: NaiveDate,
    months: u32,
) -> Vec<ForecastMonth> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let month_key = |d: NaiveDate| (d.year(), d.month());

    (0..months)
        .filter_map(|i| first_of_month.checked_add_months(Months::new(i)))
        .map(|month| {
            let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
            for sub in subs.iter().filter(|s| s.is_active()) {
                let applies = match sub.frequency {
                    Frequency::Monthly => month_key(sub.start_date) <= month_key(month),
                    Frequency::Yearly => {
                        month_key(subscription_next_renewal(sub, today)) == month_key(month)
                    }
                };
                if applies {
                    *by_category.entry(sub.category.clone()).or_default() +=
                        to_base(sub.effective_cost(), &sub.currency, rates);
                }
            }
            let total = by_category.values().copied().sum();
            ForecastMonth {
                month,
                by_category,
                total,
            }
        })
        .collect()
}

/// Everything the dashboard shows, in `base_currency`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub base_currency: String,
    pub rate_source: RateSource,
    pub monthly_burn: Decimal,
    pub annual_projection: Decimal,
    pub active_trials: usize,
    pub runway: CashFlowRunway,
    pub alerts: Vec<RedundancyAlert>,
    pub graveyard: GraveyardStats,
    pub upcoming: Vec<UpcomingBill>,
    pub categories: Vec<CategorySpend>,
    pub forecast: Vec<ForecastMonth>,
}

pub fn summarize(
    subs: &[Subscription],
    rates: &RateTable,
    today: NaiveDate,
    safe_categories: &[String],
) -> DashboardSummary {
    let burn = monthly_burn(subs, rates);
    DashboardSummary {
        base_currency: rates.base.clone(),
        rate_source: rates.source,
        monthly_burn: burn,
        annual_projection: annual_projection(burn),
        active_trials: active_trial_count(subs, today),
        runway: cash_flow_runway(subs, rates, today),
        alerts: redundancy_alerts(subs, rates, safe_categories),
        graveyard: graveyard_stats(subs, rates),
        upcoming: upcoming_bills(subs, today, UPCOMING_BILLS_LIMIT),
        categories: category_breakdown(subs, rates),
        forecast: spending_forecast(subs, rates, today, FORECAST_MONTHS),
    }
}
