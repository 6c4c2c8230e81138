pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::subscriptions::SubscriptionFields;
use crate::core::actions::{Session, SubscriptionActions, normalize_currency};
use crate::core::analytics::{self, DashboardSummary};
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::model::{Subscription, SubscriptionStatus, User};
use crate::core::rates::{RateProvider, RateTable};
use crate::core::repository::Repository;
use crate::store::Storage;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Dashboard,
    List { status: Option<SubscriptionStatus> },
    Show { id: String },
    Add(SubscriptionFields),
    Edit { id: String, fields: SubscriptionFields },
    Archive { id: String },
    Restore { id: String },
    Delete { id: String },
    Graveyard,
    Trials,
    Currency { code: Option<String> },
    Export { output: Option<PathBuf> },
}

/// Collaborators shared by every command of one invocation.
pub struct AppContext {
    pub config: AppConfig,
    pub repo: Arc<dyn Repository>,
    pub rates: Arc<dyn RateProvider>,
    pub session: Session,
    pub today: NaiveDate,
    storage: Option<Storage>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn Repository>,
        rates: Arc<dyn RateProvider>,
        today: NaiveDate,
    ) -> Self {
        let session = Session {
            user_id: config.user.id.clone(),
        };
        AppContext {
            config,
            repo,
            rates,
            session,
            today,
            storage: None,
        }
    }

    /// Opens the on-disk store under the configured data path.
    pub fn open(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        debug!("Opening data store at {}", data_path.display());
        let storage = Storage::open(&data_path)?;

        let repo: Arc<dyn Repository> = Arc::new(storage.repository()?);
        let rate_cache: Arc<dyn Cache<String, RateTable>> =
            Arc::new(storage.cache::<String, RateTable>("rates")?);
        let rates = providers::build_rate_provider(
            &config.providers.rates,
            rate_cache,
            Duration::from_secs(config.cache.rates_ttl_secs),
        );

        let today = chrono::Local::now().date_naive();
        let mut ctx = AppContext::new(config, repo, rates, today);
        ctx.storage = Some(storage);
        Ok(ctx)
    }

    pub fn actions(&self) -> SubscriptionActions {
        SubscriptionActions::new(self.repo.clone(), Some(self.session.clone()), self.today)
    }

    /// The session user, created from the config on first use.
    pub async fn user(&self) -> Result<User> {
        if let Some(user) = self.repo.get_user(&self.session.user_id).await? {
            return Ok(user);
        }

        let user = User {
            id: self.session.user_id.clone(),
            name: self.config.user.name.clone(),
            email: self.config.user.email.clone(),
            preferred_currency: configured_currency(&self.config),
            email_notifications: false,
        };
        info!("Creating user {}", user.id);
        self.repo.save_user(&user).await?;
        Ok(user)
    }

    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.repo.list_subscriptions(&self.session.user_id).await
    }

    /// Rate table for the user's preferred currency.
    pub async fn user_rates(&self, user: &User) -> Result<RateTable> {
        self.rates.fetch_rates(&user.preferred_currency).await
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        let (user, subs) = futures::try_join!(self.user(), self.subscriptions())?;
        let rates = self.user_rates(&user).await?;
        Ok(analytics::summarize(
            &subs,
            &rates,
            self.today,
            &self.config.insights.safe_categories,
        ))
    }

    pub fn persist(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.persist(),
            None => Ok(()),
        }
    }
}

/// The config's currency code, or USD when it is not a 3-letter code.
fn configured_currency(config: &AppConfig) -> String {
    normalize_currency(&config.currency).unwrap_or_else(|| {
        warn!(
            "Ignoring invalid currency {:?} in config, using USD",
            config.currency
        );
        "USD".to_string()
    })
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("subtrack starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = AppContext::open(config)?;
    let result = execute(&ctx, command).await;
    ctx.persist()?;
    result
}

pub async fn execute(ctx: &AppContext, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Dashboard => cli::dashboard::run(ctx).await,
        AppCommand::List { status } => cli::subscriptions::list(ctx, status).await,
        AppCommand::Show { id } => cli::subscriptions::show(ctx, &id).await,
        AppCommand::Add(fields) => cli::subscriptions::add(ctx, fields).await,
        AppCommand::Edit { id, fields } => cli::subscriptions::edit(ctx, &id, fields).await,
        AppCommand::Archive { id } => cli::archive::archive(ctx, &id).await,
        AppCommand::Restore { id } => cli::archive::restore(ctx, &id).await,
        AppCommand::Delete { id } => cli::subscriptions::delete(ctx, &id).await,
        AppCommand::Graveyard => cli::archive::graveyard(ctx).await,
        AppCommand::Trials => cli::trials::run(ctx).await,
        AppCommand::Currency { code } => cli::settings::currency(ctx, code.as_deref()).await,
        AppCommand::Export { output } => cli::export::run(ctx, output.as_deref()).await,
    }
}
