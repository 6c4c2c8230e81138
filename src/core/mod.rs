//! Core business logic: billing, currency normalization and aggregates

pub mod actions;
pub mod analytics;
pub mod billing;
pub mod cache;
pub mod config;
pub mod currency;
pub mod log;
pub mod model;
pub mod rates;
pub mod reminders;
pub mod repository;

// Re-export main types for cleaner imports
pub use model::{Frequency, Subscription, SubscriptionStatus, User, Vendor};
pub use rates::{RateProvider, RateSource, RateTable};
pub use repository::Repository;
