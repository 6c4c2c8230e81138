//! Storage abstraction for users, vendors and subscriptions.

use crate::core::model::{Subscription, SubscriptionRecord, User, Vendor};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// CRUD over the records owned by users.
///
/// Subscriptions are returned joined with their vendor. Ownership is not
/// checked here; callers compare `user_id` before mutating.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn save_user(&self, user: &User) -> Result<()>;

    /// Finds a vendor of `user_id` whose name matches ignoring case.
    async fn find_vendor_by_name(&self, user_id: &str, name: &str) -> Result<Option<Vendor>>;

    async fn save_vendor(&self, vendor: &Vendor) -> Result<()>;

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>>;

    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>>;

    async fn save_subscription(&self, record: &SubscriptionRecord) -> Result<()>;

    /// Removes a subscription, returning whether it existed.
    async fn delete_subscription(&self, id: Uuid) -> Result<bool>;
}
