//! Records owned by a user: subscriptions, vendors and user settings.

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque user identifier.
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Monthly,
    Yearly,
}

impl Frequency {
    /// Length of one billing cycle in calendar months.
    pub fn months(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Yearly => 12,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Frequency::Monthly => "MONTHLY",
                Frequency::Yearly => "YEARLY",
            }
        )
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(anyhow!("Invalid billing frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    /// Status after an archive action, if the transition is allowed.
    pub fn archive(self) -> Option<SubscriptionStatus> {
        match self {
            SubscriptionStatus::Active => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }

    /// Status after a restore action, if the transition is allowed.
    pub fn restore(self) -> Option<SubscriptionStatus> {
        match self {
            SubscriptionStatus::Cancelled => Some(SubscriptionStatus::Active),
            _ => None,
        }
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SubscriptionStatus::Active => "ACTIVE",
                SubscriptionStatus::Paused => "PAUSED",
                SubscriptionStatus::Cancelled => "CANCELLED",
            }
        )
    }
}

impl FromStr for SubscriptionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "PAUSED" => Ok(SubscriptionStatus::Paused),
            "CANCELLED" => Ok(SubscriptionStatus::Cancelled),
            _ => Err(anyhow!("Invalid subscription status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub preferred_currency: String,
    #[serde(default)]
    pub email_notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub website: Option<String>,
}

/// Subscription as persisted, referencing its vendor by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub vendor_id: Uuid,
    pub cost: Decimal,
    #[serde(default)]
    pub split_cost: Option<Decimal>,
    pub currency: String,
    pub frequency: Frequency,
    pub category: String,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub next_renewal_date: NaiveDate,
    #[serde(default)]
    pub is_trial: bool,
}

/// Subscription joined with its vendor, as consumed by billing and analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: UserId,
    pub vendor: Vendor,
    pub cost: Decimal,
    pub split_cost: Option<Decimal>,
    pub currency: String,
    pub frequency: Frequency,
    pub category: String,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub next_renewal_date: NaiveDate,
    pub is_trial: bool,
}

impl Subscription {
    pub fn from_record(record: SubscriptionRecord, vendor: Vendor) -> Self {
        Subscription {
            id: record.id,
            user_id: record.user_id,
            vendor,
            cost: record.cost,
            split_cost: record.split_cost,
            currency: record.currency,
            frequency: record.frequency,
            category: record.category,
            status: record.status,
            start_date: record.start_date,
            next_renewal_date: record.next_renewal_date,
            is_trial: record.is_trial,
        }
    }

    pub fn to_record(&self) -> SubscriptionRecord {
        SubscriptionRecord {
            id: self.id,
            user_id: self.user_id.clone(),
            vendor_id: self.vendor.id,
            cost: self.cost,
            split_cost: self.split_cost,
            currency: self.currency.clone(),
            frequency: self.frequency,
            category: self.category.clone(),
            status: self.status,
            start_date: self.start_date,
            next_renewal_date: self.next_renewal_date,
            is_trial: self.is_trial,
        }
    }

    /// The user's out-of-pocket share: the split cost when positive, else the full cost.
    pub fn effective_cost(&self) -> Decimal {
        match self.split_cost {
            Some(split) if split > Decimal::ZERO => split,
            _ => self.cost,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds an active, non-trial subscription owned by `user-1`.
    pub fn subscription(
        vendor: &str,
        cost: i64,
        currency: &str,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            vendor: Vendor {
                id: Uuid::new_v4(),
                user_id: "user-1".to_string(),
                name: vendor.to_string(),
                website: None,
            },
            cost: Decimal::from(cost),
            split_cost: None,
            currency: currency.to_string(),
            frequency,
            category: "Personal".to_string(),
            status: SubscriptionStatus::Active,
            start_date,
            next_renewal_date: crate::core::billing::initial_renewal(start_date, frequency),
            is_trial: false,
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
