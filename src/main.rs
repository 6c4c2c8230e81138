use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use subtrack::cli::subscriptions::SubscriptionFields;
use subtrack::core::log::init_logging;
use subtrack::core::model::{Frequency, SubscriptionStatus};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FrequencyArg {
    Monthly,
    Yearly,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Monthly => Frequency::Monthly,
            FrequencyArg::Yearly => Frequency::Yearly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Paused,
    Cancelled,
}

impl From<StatusArg> for SubscriptionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => SubscriptionStatus::Active,
            StatusArg::Paused => SubscriptionStatus::Paused,
            StatusArg::Cancelled => SubscriptionStatus::Cancelled,
        }
    }
}

/// Subscription details shared by `add` and `edit`
#[derive(Args)]
struct FieldArgs {
    /// Cost of the plan per billing cycle
    #[arg(long)]
    cost: Option<Decimal>,

    /// Your share when the plan is split with others
    #[arg(long)]
    split: Option<Decimal>,

    /// ISO currency code of the cost, defaults to the display currency
    #[arg(long)]
    currency: Option<String>,

    #[arg(long, value_enum)]
    frequency: Option<FrequencyArg>,

    /// First billing date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    start: Option<NaiveDate>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    website: Option<String>,

    /// Mark as a free trial
    #[arg(long)]
    trial: Option<bool>,
}

impl FieldArgs {
    fn into_fields(self, name: Option<String>, status: Option<StatusArg>) -> SubscriptionFields {
        SubscriptionFields {
            name,
            website: self.website,
            cost: self.cost,
            split_cost: self.split,
            currency: self.currency,
            frequency: self.frequency.map(Into::into),
            start_date: self.start,
            trial: self.trial,
            category: self.category,
            status: status.map(Into::into),
        }
    }
}

impl From<Commands> for subtrack::AppCommand {
    fn from(cmd: Commands) -> subtrack::AppCommand {
        match cmd {
            Commands::Dashboard => subtrack::AppCommand::Dashboard,
            Commands::List { status } => subtrack::AppCommand::List {
                status: status.map(Into::into),
            },
            Commands::Show { id } => subtrack::AppCommand::Show { id },
            Commands::Add { name, fields } => {
                subtrack::AppCommand::Add(fields.into_fields(Some(name), None))
            }
            Commands::Edit {
                id,
                name,
                status,
                fields,
            } => subtrack::AppCommand::Edit {
                id,
                fields: fields.into_fields(name, status),
            },
            Commands::Archive { id } => subtrack::AppCommand::Archive { id },
            Commands::Restore { id } => subtrack::AppCommand::Restore { id },
            Commands::Delete { id } => subtrack::AppCommand::Delete { id },
            Commands::Graveyard => subtrack::AppCommand::Graveyard,
            Commands::Trials => subtrack::AppCommand::Trials,
            Commands::Currency { code } => subtrack::AppCommand::Currency { code },
            Commands::Export { output } => subtrack::AppCommand::Export { output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show burn rate, runway, upcoming bills and insights
    Dashboard,
    /// List subscriptions (cancelled ones are hidden unless asked for)
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show one subscription with its billing cycle and lifetime spend
    Show { id: String },
    /// Add a subscription
    Add {
        /// Vendor name
        name: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change a subscription
    Edit {
        id: String,
        /// New vendor name
        #[arg(long)]
        name: Option<String>,
        /// Pause or resume (active / paused)
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Cancel a subscription, moving it to the graveyard
    Archive { id: String },
    /// Reactivate a cancelled subscription
    Restore { id: String },
    /// Permanently remove a subscription
    Delete { id: String },
    /// Show cancelled subscriptions and the money saved
    Graveyard,
    /// List trials that end soon
    Trials,
    /// Show or change the display currency
    Currency { code: Option<String> },
    /// Export all subscriptions as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => subtrack::cli::setup::setup(),
        Some(cmd) => subtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
