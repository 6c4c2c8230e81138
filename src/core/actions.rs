//! Mutations performed on behalf of the signed-in user.
//!
//! Input is validated once at this boundary; every failure is reported as an
//! [`ActionResponse`] instead of an error so callers can render it directly.
use crate::core::billing::{initial_renewal, subscription_next_renewal};
use crate::core::model::{
    Frequency, Subscription, SubscriptionRecord, SubscriptionStatus, User, UserId, Vendor,
};
use crate::core::repository::Repository;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Outcome of an action as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Subscription the action touched, when it succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl ActionResponse {
    fn ok(message: &str, id: Option<Uuid>) -> Self {
        ActionResponse {
            success: true,
            message: message.to_string(),
            errors: None,
            id,
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unauthorized. Please log in.")]
    Unauthorized,
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    InvalidTransition(&'static str),
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl From<ActionError> for ActionResponse {
    fn from(err: ActionError) -> Self {
        let message = err.to_string();
        let errors = match err {
            ActionError::Validation(fields) => Some(fields),
            _ => None,
        };
        ActionResponse {
            success: false,
            message,
            errors,
            id: None,
        }
    }
}

/// Storage failures surface with a generic message; the cause is only logged.
trait StorageContext<T> {
    fn storage(self, message: &'static str) -> Result<T, ActionError>;
}

impl<T> StorageContext<T> for anyhow::Result<T> {
    fn storage(self, message: &'static str) -> Result<T, ActionError> {
        self.map_err(|source| ActionError::Storage { message, source })
    }
}

/// The user an action is performed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

/// Subscription fields as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionInput {
    pub name: String,
    pub website: Option<String>,
    pub cost: Decimal,
    pub split_cost: Option<Decimal>,
    pub currency: String,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub is_trial: bool,
    pub category: Option<String>,
    pub status: Option<SubscriptionStatus>,
}

/// Input that passed validation, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubscription {
    pub name: String,
    pub website: Option<String>,
    pub cost: Decimal,
    pub split_cost: Option<Decimal>,
    pub currency: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub is_trial: bool,
    pub category: String,
    pub status: Option<SubscriptionStatus>,
}

/// Largest accepted cost (one trillion); keeps every aggregate inside `Decimal` range.
pub const MAX_COST: Decimal = Decimal::from_parts(3567587328, 232, 0, false, 0);

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Upper-cased ISO 4217 style code, if `code` looks like one.
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

impl SubscriptionInput {
    pub fn validate(&self) -> Result<ValidSubscription, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            push_error(&mut errors, "name", "Vendor name is required");
        }
        if self.cost < Decimal::ZERO {
            push_error(&mut errors, "cost", "Cost cannot be negative");
        } else if self.cost > MAX_COST {
            push_error(&mut errors, "cost", "Cost is too large");
        }
        match self.split_cost {
            Some(s) if s < Decimal::ZERO => {
                push_error(&mut errors, "split_cost", "Split cost cannot be negative")
            }
            Some(s) if s > MAX_COST => {
                push_error(&mut errors, "split_cost", "Split cost is too large")
            }
            _ => {}
        }
        let currency = normalize_currency(&self.currency);
        if currency.is_none() {
            push_error(&mut errors, "currency", "Currency must be a 3-letter code");
        }
        if self.frequency.is_none() {
            push_error(&mut errors, "frequency", "Billing frequency is required");
        }
        if self.start_date.is_none() {
            push_error(&mut errors, "start_date", "Start date is required");
        }
        if self.status == Some(SubscriptionStatus::Cancelled) {
            push_error(
                &mut errors,
                "status",
                "Use archive to cancel a subscription",
            );
        }

        match (currency, self.frequency, self.start_date) {
            (Some(currency), Some(frequency), Some(start_date)) if errors.is_empty() => {
                let category = self
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or("Personal");
                Ok(ValidSubscription {
                    name: name.to_string(),
                    website: self
                        .website
                        .as_deref()
                        .map(str::trim)
                        .filter(|w| !w.is_empty())
                        .map(str::to_string),
                    cost: self.cost,
                    split_cost: self.split_cost,
                    currency,
                    frequency,
                    start_date,
                    is_trial: self.is_trial,
                    category: category.to_string(),
                    status: self.status,
                })
            }
            _ => Err(errors),
        }
    }
}

/// One line of the data export, keyed the way spreadsheets expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Cost")]
    pub cost: Decimal,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Frequency")]
    pub frequency: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Next Renewal")]
    pub next_renewal: String,
}

const EXPORT_DATE_FORMAT: &str = "%b %d, %Y";

/// Subscription mutations scoped to one session.
pub struct SubscriptionActions {
    repo: Arc<dyn Repository>,
    session: Option<Session>,
    today: NaiveDate,
}

impl SubscriptionActions {
    pub fn new(repo: Arc<dyn Repository>, session: Option<Session>, today: NaiveDate) -> Self {
        Self {
            repo,
            session,
            today,
        }
    }

    fn user_id(&self) -> Result<&str, ActionError> {
        self.session
            .as_ref()
            .map(|s| s.user_id.as_str())
            .ok_or(ActionError::Unauthorized)
    }

    fn respond(&self, action: &str, result: Result<Uuid, ActionError>, message: &str) -> ActionResponse {
        match result {
            Ok(id) => {
                info!(%id, "{action} succeeded");
                ActionResponse::ok(message, Some(id))
            }
            Err(err) => {
                match &err {
                    ActionError::Storage { source, .. } => {
                        error!(error = %source, "{action} failed")
                    }
                    other => error!(error = %other, "{action} rejected"),
                }
                err.into()
            }
        }
    }

    /// Subscription owned by the session user; anything else reads as missing.
    async fn owned(
        &self,
        user_id: &str,
        id: Uuid,
        missing: &'static str,
    ) -> Result<Subscription, ActionError> {
        let sub = self
            .repo
            .get_subscription(id)
            .await
            .storage("Failed to load subscription.")?;
        match sub {
            Some(sub) if sub.user_id == user_id => Ok(sub),
            _ => Err(ActionError::NotFound(missing)),
        }
    }

    async fn find_or_create_vendor(
        &self,
        user_id: &str,
        name: &str,
        website: Option<String>,
        failure: &'static str,
    ) -> Result<Vendor, ActionError> {
        if let Some(vendor) = self
            .repo
            .find_vendor_by_name(user_id, name)
            .await
            .storage(failure)?
        {
            return Ok(vendor);
        }

        let vendor = Vendor {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            website,
        };
        self.repo.save_vendor(&vendor).await.storage(failure)?;
        Ok(vendor)
    }

    pub async fn add(&self, input: &SubscriptionInput) -> ActionResponse {
        let result = self.try_add(input).await;
        self.respond("Add subscription", result, "Subscription added successfully")
    }

    async fn try_add(&self, input: &SubscriptionInput) -> Result<Uuid, ActionError> {
        let user_id = self.user_id()?;
        let valid = input.validate().map_err(ActionError::Validation)?;
        let failure = "Failed to save subscription.";

        let vendor = self
            .find_or_create_vendor(user_id, &valid.name, valid.website.clone(), failure)
            .await?;
        let record = SubscriptionRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            vendor_id: vendor.id,
            cost: valid.cost,
            split_cost: valid.split_cost,
            currency: valid.currency,
            frequency: valid.frequency,
            category: valid.category,
            status: valid.status.unwrap_or_default(),
            start_date: valid.start_date,
            next_renewal_date: initial_renewal(valid.start_date, valid.frequency),
            is_trial: valid.is_trial,
        };
        self.repo.save_subscription(&record).await.storage(failure)?;
        Ok(record.id)
    }

    pub async fn update(&self, id: Uuid, input: &SubscriptionInput) -> ActionResponse {
        let result = self.try_update(id, input).await;
        self.respond("Update subscription", result, "Subscription updated")
    }

    async fn try_update(&self, id: Uuid, input: &SubscriptionInput) -> Result<Uuid, ActionError> {
        let user_id = self.user_id()?;
        let valid = input.validate().map_err(ActionError::Validation)?;
        let failure = "Failed to update";

        let existing = self.owned(user_id, id, "Subscription not found").await?;
        let status = match valid.status {
            Some(status) if status != existing.status => {
                if existing.status == SubscriptionStatus::Cancelled {
                    return Err(ActionError::InvalidTransition(
                        "Use restore to reactivate a cancelled subscription.",
                    ));
                }
                status
            }
            _ => existing.status,
        };

        let vendor = self
            .find_or_create_vendor(user_id, &valid.name, valid.website.clone(), failure)
            .await?;
        let record = SubscriptionRecord {
            id,
            user_id: user_id.to_string(),
            vendor_id: vendor.id,
            cost: valid.cost,
            split_cost: valid.split_cost,
            currency: valid.currency,
            frequency: valid.frequency,
            category: valid.category,
            status,
            start_date: valid.start_date,
            next_renewal_date: initial_renewal(valid.start_date, valid.frequency),
            is_trial: valid.is_trial,
        };
        self.repo.save_subscription(&record).await.storage(failure)?;
        Ok(id)
    }

    /// Moves an active subscription to the graveyard.
    pub async fn archive(&self, id: Uuid) -> ActionResponse {
        let result = self.try_archive(id).await;
        self.respond("Archive subscription", result, "Subscription archived.")
    }

    async fn try_archive(&self, id: Uuid) -> Result<Uuid, ActionError> {
        let user_id = self.user_id()?;
        let sub = self
            .owned(user_id, id, "Subscription not found or access denied.")
            .await?;
        let status = sub.status.archive().ok_or(ActionError::InvalidTransition(
            "Only active subscriptions can be archived.",
        ))?;

        let mut record = sub.to_record();
        record.status = status;
        self.repo
            .save_subscription(&record)
            .await
            .storage("Failed to archive subscription.")?;
        Ok(id)
    }

    /// Brings a cancelled subscription back, rolling its renewal date forward.
    pub async fn restore(&self, id: Uuid) -> ActionResponse {
        let result = self.try_restore(id).await;
        self.respond("Restore subscription", result, "Subscription restored.")
    }

    async fn try_restore(&self, id: Uuid) -> Result<Uuid, ActionError> {
        let user_id = self.user_id()?;
        let sub = self
            .owned(user_id, id, "Subscription not found or access denied.")
            .await?;
        let status = sub.status.restore().ok_or(ActionError::InvalidTransition(
            "Only cancelled subscriptions can be restored.",
        ))?;

        let mut record = sub.to_record();
        record.status = status;
        record.next_renewal_date = subscription_next_renewal(&sub, self.today);
        self.repo
            .save_subscription(&record)
            .await
            .storage("Failed to restore subscription.")?;
        Ok(id)
    }

    pub async fn delete(&self, id: Uuid) -> ActionResponse {
        let result = self.try_delete(id).await;
        self.respond("Delete subscription", result, "Subscription deleted.")
    }

    async fn try_delete(&self, id: Uuid) -> Result<Uuid, ActionError> {
        let user_id = self.user_id()?;
        let failure = "Failed to delete subscription.";
        self.owned(user_id, id, "Subscription not found or access denied.")
            .await?;
        self.repo.delete_subscription(id).await.storage(failure)?;
        Ok(id)
    }

    /// Changes the display currency, creating the user record on first use.
    pub async fn update_settings(&self, preferred_currency: &str) -> ActionResponse {
        match self.try_update_settings(preferred_currency).await {
            Ok(()) => ActionResponse::ok("Settings updated successfully", None),
            Err(err) => {
                error!(error = %err, "Update settings failed");
                err.into()
            }
        }
    }

    async fn try_update_settings(&self, preferred_currency: &str) -> Result<(), ActionError> {
        let user_id = self.user_id()?;
        let currency = normalize_currency(preferred_currency).ok_or_else(|| {
            let mut errors = FieldErrors::new();
            push_error(
                &mut errors,
                "preferred_currency",
                "Currency must be a 3-letter code",
            );
            ActionError::Validation(errors)
        })?;

        let failure = "Failed to update settings";
        let user = self.repo.get_user(user_id).await.storage(failure)?;
        let user = match user {
            Some(user) => User {
                preferred_currency: currency,
                ..user
            },
            None => User {
                id: user_id.to_string(),
                name: None,
                email: None,
                preferred_currency: currency,
                email_notifications: false,
            },
        };
        self.repo.save_user(&user).await.storage(failure)
    }

    /// All of the user's subscriptions, newest start date first.
    pub async fn export_data(&self) -> Result<Vec<ExportRow>, ActionError> {
        let user_id = self.user_id()?;
        let mut subs = self
            .repo
            .list_subscriptions(user_id)
            .await
            .storage("Failed to export data.")?;
        subs.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        Ok(subs
            .into_iter()
            .map(|s| ExportRow {
                vendor: s.vendor.name,
                category: s.category,
                cost: s.cost,
                currency: s.currency,
                frequency: s.frequency.to_string(),
                status: s.status.to_string(),
                start_date: s.start_date.format(EXPORT_DATE_FORMAT).to_string(),
                next_renewal: s.next_renewal_date.format(EXPORT_DATE_FORMAT).to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::fixtures::date;
    use crate::store::memory::MemoryRepository;
    use anyhow::Result;

    fn input(name: &str, cost: i64) -> SubscriptionInput {
        SubscriptionInput {
            name: name.to_string(),
            cost: Decimal::from(cost),
            currency: "php".to_string(),
            frequency: Some(Frequency::Monthly),
            start_date: Some(date(2024, 1, 31)),
            ..Default::default()
        }
    }

    fn actions_for(repo: &Arc<MemoryRepository>, user: &str) -> SubscriptionActions {
        SubscriptionActions::new(
            repo.clone(),
            Some(Session {
                user_id: user.to_string(),
            }),
            date(2024, 6, 15),
        )
    }

    #[test]
    fn test_validation_collects_field_errors() {
        let bad = SubscriptionInput {
            name: "  ".to_string(),
            cost: Decimal::from(-1),
            split_cost: Some(Decimal::from(-5)),
            currency: "pesos".to_string(),
            frequency: Some(Frequency::Monthly),
            start_date: Some(date(2024, 1, 1)),
            status: Some(SubscriptionStatus::Cancelled),
            ..Default::default()
        };

        let errors = bad.validate().unwrap_err();
        assert_eq!(errors["name"], vec!["Vendor name is required"]);
        assert_eq!(errors["cost"], vec!["Cost cannot be negative"]);
        assert!(errors.contains_key("split_cost"));
        assert!(errors.contains_key("currency"));
        assert!(errors.contains_key("status"));
    }

    #[test]
    fn test_validation_rejects_oversized_costs() {
        let mut huge = input("Yacht Club", 0);
        huge.cost = Decimal::MAX;
        huge.split_cost = Some(Decimal::MAX);
        let errors = huge.validate().unwrap_err();
        assert_eq!(errors["cost"], vec!["Cost is too large"]);
        assert_eq!(errors["split_cost"], vec!["Split cost is too large"]);

        let mut limit = input("Yacht Club", 0);
        limit.cost = MAX_COST;
        assert!(limit.validate().is_ok());
        limit.cost = MAX_COST + Decimal::ONE;
        assert!(limit.validate().is_err());
    }

    #[test]
    fn test_validation_normalizes() {
        let mut raw = input(" Netflix ", 100);
        raw.category = Some("".to_string());
        raw.website = Some("".to_string());

        let valid = raw.validate().unwrap();
        assert_eq!(valid.name, "Netflix");
        assert_eq!(valid.currency, "PHP");
        assert_eq!(valid.category, "Personal");
        assert!(valid.website.is_none());
    }

    #[tokio::test]
    async fn test_add_requires_session() {
        let repo = Arc::new(MemoryRepository::new());
        let actions = SubscriptionActions::new(repo, None, date(2024, 6, 15));

        let response = actions.add(&input("Netflix", 100)).await;
        assert!(!response.success);
        assert_eq!(response.message, "Unauthorized. Please log in.");
    }

    #[tokio::test]
    async fn test_add_reuses_vendor_case_insensitively() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");

        let first = actions.add(&input("Netflix", 100)).await;
        let second = actions.add(&input("NETFLIX", 200)).await;
        assert!(first.success && second.success);
        assert_eq!(first.message, "Subscription added successfully");

        let subs = repo.list_subscriptions("user-1").await?;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].vendor.id, subs[1].vendor.id);

        for name in ["Ärzte Plus", "ÄRZTE PLUS", "ärzte plus"] {
            assert!(actions.add(&input(name, 30)).await.success);
        }
        let vendors: std::collections::HashSet<Uuid> = repo
            .list_subscriptions("user-1")
            .await?
            .iter()
            .map(|s| s.vendor.id)
            .collect();
        assert_eq!(vendors.len(), 2);

        let added = repo.get_subscription(first.id.unwrap()).await?.unwrap();
        assert_eq!(added.status, SubscriptionStatus::Active);
        assert_eq!(added.currency, "PHP");
        // Jan 31 + 1 month clamps to the end of February.
        assert_eq!(added.next_renewal_date, date(2024, 2, 29));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_reports_validation_errors() {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");

        let response = actions.add(&input("", 100)).await;
        assert!(!response.success);
        assert_eq!(response.message, "Validation failed");
        assert!(response.errors.unwrap().contains_key("name"));
    }

    #[tokio::test]
    async fn test_update_checks_ownership() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let id = actions_for(&repo, "owner")
            .add(&input("Netflix", 100))
            .await
            .id
            .unwrap();

        let response = actions_for(&repo, "intruder")
            .update(id, &input("Hulu", 1))
            .await;
        assert!(!response.success);
        assert_eq!(response.message, "Subscription not found");
        assert_eq!(
            repo.get_subscription(id).await?.unwrap().vendor.name,
            "Netflix"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_changes_vendor_and_pauses() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");
        let id = actions.add(&input("Netflix", 100)).await.id.unwrap();

        let mut changed = input("Disney+", 300);
        changed.frequency = Some(Frequency::Yearly);
        changed.status = Some(SubscriptionStatus::Paused);
        let response = actions.update(id, &changed).await;
        assert!(response.success);
        assert_eq!(response.message, "Subscription updated");

        let sub = repo.get_subscription(id).await?.unwrap();
        assert_eq!(sub.vendor.name, "Disney+");
        assert_eq!(sub.cost, Decimal::from(300));
        assert_eq!(sub.status, SubscriptionStatus::Paused);
        assert_eq!(sub.next_renewal_date, date(2025, 1, 31));
        Ok(())
    }

    #[tokio::test]
    async fn test_archive_and_restore_follow_state_machine() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");
        let id = actions.add(&input("Netflix", 100)).await.id.unwrap();

        let restored_early = actions.restore(id).await;
        assert!(!restored_early.success);
        assert_eq!(
            restored_early.message,
            "Only cancelled subscriptions can be restored."
        );

        assert!(actions.archive(id).await.success);
        assert_eq!(
            repo.get_subscription(id).await?.unwrap().status,
            SubscriptionStatus::Cancelled
        );
        assert!(!actions.archive(id).await.success);

        let restored = actions.restore(id).await;
        assert!(restored.success);
        let sub = repo.get_subscription(id).await?.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.next_renewal_date, date(2024, 6, 29));
        Ok(())
    }

    #[tokio::test]
    async fn test_paused_cannot_be_archived() {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");
        let mut paused = input("Gym", 50);
        paused.status = Some(SubscriptionStatus::Paused);
        let id = actions.add(&paused).await.id.unwrap();

        let response = actions.archive(id).await;
        assert!(!response.success);
        assert_eq!(response.message, "Only active subscriptions can be archived.");
    }

    #[tokio::test]
    async fn test_delete_from_any_state() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");
        let id = actions.add(&input("Netflix", 100)).await.id.unwrap();
        actions.archive(id).await;

        let denied = actions_for(&repo, "someone-else").delete(id).await;
        assert_eq!(denied.message, "Subscription not found or access denied.");

        let response = actions.delete(id).await;
        assert!(response.success);
        assert_eq!(response.message, "Subscription deleted.");
        assert!(repo.get_subscription(id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_settings_creates_user() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");

        assert!(!actions.update_settings("euros").await.success);
        let response = actions.update_settings("eur").await;
        assert!(response.success);
        assert_eq!(
            repo.get_user("user-1").await?.unwrap().preferred_currency,
            "EUR"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_export_newest_first() -> Result<()> {
        let repo = Arc::new(MemoryRepository::new());
        let actions = actions_for(&repo, "user-1");
        actions.add(&input("Old", 10)).await;
        let mut newer = input("New", 20);
        newer.start_date = Some(date(2024, 5, 3));
        actions.add(&newer).await;

        let rows = actions.export_data().await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].vendor, "New");
        assert_eq!(rows[0].start_date, "May 03, 2024");
        assert_eq!(rows[1].next_renewal, "Feb 29, 2024");
        assert_eq!(rows[1].frequency, "MONTHLY");

        let json = serde_json::to_value(&rows[0])?;
        assert!(json.get("Next Renewal").is_some());
        Ok(())
    }
}
