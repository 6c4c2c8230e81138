//! Renewal date rollforward and billing cycle arithmetic.
//!
//! Dates advance in whole cycle units counted from a fixed anchor, so month-end
//! clamping (Jan 31 + 1 month = Feb 28) never accumulates across cycles.
use crate::core::model::{Frequency, Subscription};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

/// Advances `date` by `cycles` billing units, clamping to the end of the month.
pub fn add_cycles(date: NaiveDate, frequency: Frequency, cycles: u32) -> NaiveDate {
    date.checked_add_months(Months::new(frequency.months() * cycles))
        .unwrap_or(NaiveDate::MAX)
}

fn sub_cycles(date: NaiveDate, frequency: Frequency, cycles: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(frequency.months() * cycles))
        .unwrap_or(NaiveDate::MIN)
}

/// Number of whole billing units that fit between `from` and `to`.
///
/// Returns 0 when `to` is not after `from`.
pub fn whole_cycles_between(from: NaiveDate, to: NaiveDate, frequency: Frequency) -> u32 {
    if to <= from {
        return 0;
    }
    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut cycles = (months.max(0) as u32) / frequency.months();
    while cycles > 0 && add_cycles(from, frequency, cycles) > to {
        cycles -= 1;
    }
    cycles
}

/// Renewal date assigned when a subscription is first saved.
pub fn initial_renewal(start_date: NaiveDate, frequency: Frequency) -> NaiveDate {
    add_cycles(start_date, frequency, 1)
}

/// Computes the next upcoming renewal, never earlier than `today`.
///
/// A subscription starting in the future renews on its start date. Otherwise
/// a stale `last_known_renewal` is rolled forward by the number of whole
/// cycles that elapsed, plus one more when truncation left it in the past.
pub fn next_renewal(
    start_date: NaiveDate,
    frequency: Frequency,
    last_known_renewal: NaiveDate,
    today: NaiveDate,
) -> NaiveDate {
    if start_date > today {
        return start_date;
    }
    if last_known_renewal >= today {
        return last_known_renewal;
    }

    let diff = whole_cycles_between(last_known_renewal, today, frequency);
    let next = add_cycles(last_known_renewal, frequency, diff);
    if next < today {
        add_cycles(last_known_renewal, frequency, diff + 1)
    } else {
        next
    }
}

/// Next renewal for a stored subscription.
pub fn subscription_next_renewal(sub: &Subscription, today: NaiveDate) -> NaiveDate {
    next_renewal(sub.start_date, sub.frequency, sub.next_renewal_date, today)
}

/// Position of `today` inside the current billing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleProgress {
    pub cycle_start: NaiveDate,
    pub next_renewal: NaiveDate,
    pub days_in_cycle: i64,
    pub days_until_renewal: i64,
    pub days_used: i64,
}

impl CycleProgress {
    /// Fraction of the cycle already used, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        (self.days_used as f64 / self.days_in_cycle as f64).clamp(0.0, 1.0)
    }
}

pub fn cycle_progress(
    start_date: NaiveDate,
    frequency: Frequency,
    last_known_renewal: NaiveDate,
    today: NaiveDate,
) -> CycleProgress {
    let next = next_renewal(start_date, frequency, last_known_renewal, today);
    let is_future = start_date > today;
    let cycle_start = if is_future {
        start_date
    } else {
        sub_cycles(next, frequency, 1)
    };

    let days_in_cycle = (next - cycle_start).num_days().max(1);
    let days_until_renewal = (next - today).num_days();
    let days_used = if is_future {
        0
    } else {
        days_in_cycle - days_until_renewal
    };

    CycleProgress {
        cycle_start,
        next_renewal: next,
        days_in_cycle,
        days_until_renewal,
        days_used,
    }
}

/// Number of charges made since the start date, counting the initial one.
///
/// Trials and subscriptions that have not started yet have made no payments.
pub fn payments_made(
    start_date: NaiveDate,
    frequency: Frequency,
    today: NaiveDate,
    is_trial: bool,
) -> u32 {
    if start_date > today || is_trial {
        return 0;
    }
    whole_cycles_between(start_date, today, frequency) + 1
}

/// Total paid so far, in the subscription's own currency.
pub fn lifetime_spend(sub: &Subscription, today: NaiveDate) -> Decimal {
    let payments = payments_made(sub.start_date, sub.frequency, today, sub.is_trial);
    sub.effective_cost() * Decimal::from(payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::fixtures::{date, subscription};

    #[test]
    fn test_add_cycles_clamps_month_end() {
        assert_eq!(
            add_cycles(date(2024, 1, 31), Frequency::Monthly, 1),
            date(2024, 2, 29)
        );
        assert_eq!(
            add_cycles(date(2023, 1, 31), Frequency::Monthly, 1),
            date(2023, 2, 28)
        );
        assert_eq!(
            add_cycles(date(2024, 2, 29), Frequency::Yearly, 1),
            date(2025, 2, 28)
        );
        assert_eq!(
            add_cycles(date(2024, 1, 31), Frequency::Monthly, 3),
            date(2024, 4, 30)
        );
    }

    #[test]
    fn test_whole_cycles_between() {
        assert_eq!(
            whole_cycles_between(date(2024, 1, 15), date(2024, 4, 14), Frequency::Monthly),
            2
        );
        assert_eq!(
            whole_cycles_between(date(2024, 1, 15), date(2024, 4, 15), Frequency::Monthly),
            3
        );
        assert_eq!(
            whole_cycles_between(date(2020, 6, 1), date(2024, 5, 31), Frequency::Yearly),
            3
        );
        assert_eq!(
            whole_cycles_between(date(2024, 5, 1), date(2024, 4, 1), Frequency::Monthly),
            0
        );
    }

    #[test]
    fn test_future_start_renews_on_start_date() {
        let today = date(2024, 6, 1);
        let start = date(2024, 6, 20);
        let next = next_renewal(start, Frequency::Monthly, date(2024, 7, 20), today);
        assert_eq!(next, start);
    }

    #[test]
    fn test_upcoming_renewal_is_untouched() {
        let today = date(2024, 6, 1);
        let next = next_renewal(date(2024, 1, 10), Frequency::Monthly, date(2024, 6, 10), today);
        assert_eq!(next, date(2024, 6, 10));
        let due_today = next_renewal(date(2024, 1, 1), Frequency::Monthly, today, today);
        assert_eq!(due_today, today);
    }

    #[test]
    fn test_stale_monthly_renewal_rolls_forward() {
        let today = date(2024, 6, 12);
        let next = next_renewal(date(2023, 1, 10), Frequency::Monthly, date(2023, 2, 10), today);
        assert_eq!(next, date(2024, 7, 10));
    }

    #[test]
    fn test_stale_yearly_renewal_rolls_forward() {
        let today = date(2024, 6, 12);
        let next = next_renewal(date(2020, 3, 1), Frequency::Yearly, date(2021, 3, 1), today);
        assert_eq!(next, date(2025, 3, 1));
    }

    #[test]
    fn test_month_end_anchor_does_not_drift() {
        // Jan 31 -> Feb 29 -> Mar 29 would fall before Mar 30 if stepped one month at a time.
        let today = date(2024, 3, 30);
        let next = next_renewal(date(2023, 12, 31), Frequency::Monthly, date(2024, 1, 31), today);
        assert_eq!(next, date(2024, 3, 31));
    }

    #[test]
    fn test_next_renewal_never_before_today() {
        let anchors = [
            date(2019, 1, 31),
            date(2020, 2, 29),
            date(2023, 8, 15),
            date(2024, 12, 31),
        ];
        let mut today = date(2024, 1, 1);
        while today <= date(2025, 12, 31) {
            for anchor in anchors {
                for frequency in [Frequency::Monthly, Frequency::Yearly] {
                    for start in [anchor, date(2025, 6, 1)] {
                        let next = next_renewal(start, frequency, anchor, today);
                        assert!(
                            next >= today,
                            "{next} before {today} (start {start}, anchor {anchor}, {frequency})"
                        );
                    }
                }
            }
            today = today.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_cycle_progress_midway() {
        let today = date(2024, 6, 16);
        let progress = cycle_progress(date(2024, 1, 1), Frequency::Monthly, date(2024, 7, 1), today);
        assert_eq!(progress.cycle_start, date(2024, 6, 1));
        assert_eq!(progress.next_renewal, date(2024, 7, 1));
        assert_eq!(progress.days_in_cycle, 30);
        assert_eq!(progress.days_until_renewal, 15);
        assert_eq!(progress.days_used, 15);
        assert!((progress.ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cycle_progress_future_start_is_zero() {
        let today = date(2024, 6, 1);
        let progress = cycle_progress(date(2024, 6, 10), Frequency::Yearly, date(2025, 6, 10), today);
        assert_eq!(progress.next_renewal, date(2024, 6, 10));
        assert_eq!(progress.days_in_cycle, 1);
        assert_eq!(progress.days_used, 0);
        assert_eq!(progress.ratio(), 0.0);
    }

    #[test]
    fn test_payments_and_lifetime_spend() {
        let today = date(2024, 6, 15);
        assert_eq!(
            payments_made(date(2024, 1, 15), Frequency::Monthly, today, false),
            6
        );
        assert_eq!(
            payments_made(date(2024, 1, 15), Frequency::Monthly, today, true),
            0
        );
        assert_eq!(
            payments_made(date(2024, 7, 1), Frequency::Monthly, today, false),
            0
        );

        let mut sub = subscription("Spotify", 200, "PHP", Frequency::Yearly, date(2022, 6, 15));
        assert_eq!(lifetime_spend(&sub, today), Decimal::from(600));
        sub.split_cost = Some(Decimal::from(50));
        assert_eq!(lifetime_spend(&sub, today), Decimal::from(150));
    }
}
