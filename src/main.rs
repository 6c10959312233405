use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use moneyguard::AppCommand;
use moneyguard::cli::ledger::{EntryChanges, NewEntry};
use moneyguard::core::analytics::Period;
use moneyguard::core::log::init_logging;
use moneyguard::core::transaction::TransactionKind;
use rust_decimal::Decimal;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Create an account and sign in
    SignUp {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the signed-in user and balance
    Whoami,
    /// List transactions with income, expense and balance totals
    List {
        /// Only show one month, as YYYY-MM
        #[arg(long)]
        period: Option<Period>,
    },
    /// Add an income or expense
    Add {
        /// income or expense
        kind: TransactionKind,
        /// Positive amount; the sign follows the type
        amount: Decimal,
        #[arg(long)]
        comment: String,
        /// Category name or id, required for expenses
        #[arg(long)]
        category: Option<String>,
        /// Defaults to today, as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change fields of an existing transaction
    Edit {
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a transaction
    Delete { id: String },
    /// List transaction categories
    Categories,
    /// Show spending per category for one month
    Stats {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(long)]
        period: Option<Period>,
        /// Compute from the downloaded transactions instead of the server
        #[arg(long)]
        local: bool,
    },
    /// Show currency buy and sell rates
    Rates,
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::SignUp {
                username,
                email,
                password,
            } => AppCommand::SignUp {
                username,
                email,
                password,
            },
            Commands::Login { email, password } => AppCommand::Login { email, password },
            Commands::Logout => AppCommand::Logout,
            Commands::Whoami => AppCommand::Whoami,
            Commands::List { period } => AppCommand::List { period },
            Commands::Add {
                kind,
                amount,
                comment,
                category,
                date,
            } => AppCommand::Add(NewEntry {
                kind,
                amount,
                date,
                comment,
                category,
            }),
            Commands::Edit {
                id,
                amount,
                comment,
                category,
                date,
            } => AppCommand::Edit {
                id,
                changes: EntryChanges {
                    amount,
                    date,
                    comment,
                    category,
                },
            },
            Commands::Delete { id } => AppCommand::Delete { id },
            Commands::Categories => AppCommand::Categories,
            Commands::Stats { period, local } => AppCommand::Stats {
                period: period.unwrap_or_default(),
                local,
            },
            Commands::Rates => AppCommand::Rates,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => moneyguard::cli::setup::setup_at_path(path),
            None => moneyguard::cli::setup::setup(),
        },
        Some(cmd) => moneyguard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}
