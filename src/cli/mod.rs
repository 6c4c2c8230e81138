//! Terminal front end: one module per command group

pub mod archive;
pub mod dashboard;
pub mod export;
pub mod settings;
pub mod setup;
pub mod subscriptions;
pub mod trials;
pub mod ui;
