use crate::core::model::{Subscription, SubscriptionStatus};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A trial about to convert into a paid subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialReminder {
    pub subscription_id: Uuid,
    pub vendor: String,
    /// Day the trial ends: the start date for trials that have not started, else the renewal.
    pub ends_on: NaiveDate,
    pub days_left: i64,
    pub renewal_cost: Decimal,
    pub currency: String,
}

/// Trials whose start or renewal date falls within `[today, today + window_days]`.
pub fn expiring_trials(
    subs: &[Subscription],
    today: NaiveDate,
    window_days: i64,
) -> Vec<TrialReminder> {
    let window_end = today
        .checked_add_days(Days::new(window_days.max(0) as u64))
        .unwrap_or(NaiveDate::MAX);
    let in_window = |d: NaiveDate| d >= today && d <= window_end;

    let mut reminders: Vec<TrialReminder> = subs
        .iter()
        .filter(|s| s.is_trial && s.status != SubscriptionStatus::Cancelled)
        .filter(|s| in_window(s.next_renewal_date) || in_window(s.start_date))
        .map(|s| {
            let ends_on = if s.start_date > today {
                s.start_date
            } else {
                s.next_renewal_date
            };
            TrialReminder {
                subscription_id: s.id,
                vendor: s.vendor.name.clone(),
                ends_on,
                days_left: (ends_on - today).num_days().max(0),
                renewal_cost: s.cost,
                currency: s.currency.clone(),
            }
        })
        .collect();

    reminders.sort_by_key(|r| (r.days_left, r.vendor.clone()));
    reminders
}
