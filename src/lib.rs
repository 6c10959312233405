pub mod app;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::app::App;
use crate::cli::ledger::{EntryChanges, NewEntry};
use crate::core::analytics::Period;
use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::rates::iso_code;
use crate::providers::{MonobankProvider, RateCache, WalletApiClient};
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    SignUp {
        username: String,
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Whoami,
    List {
        period: Option<Period>,
    },
    Add(NewEntry),
    Edit {
        id: String,
        changes: EntryChanges,
    },
    Delete {
        id: String,
    },
    Categories,
    Stats {
        period: Period,
        local: bool,
    },
    Rates,
}

impl AppCommand {
    fn needs_session(&self) -> bool {
        !matches!(
            self,
            AppCommand::SignUp { .. }
                | AppCommand::Login { .. }
                | AppCommand::Logout
                | AppCommand::Rates
        )
    }
}

fn currency_code(currency: &str) -> Result<u16> {
    iso_code(currency).with_context(|| format!("Unsupported currency: {currency}"))
}

/// Wires the store, the wallet client and the rate cache together.
pub fn build_app(config: &AppConfig) -> Result<App> {
    let data_path = config.default_data_path()?;
    let store = KeyValueStore::open(&data_path);
    if !store.is_persistent() {
        info!("Session and rates will not outlive this run");
    }

    let session = store.get_collection("session");
    let rates_collection = store.get_collection("rates");

    let currencies = config
        .rates
        .currencies
        .iter()
        .map(|c| currency_code(c))
        .collect::<Result<Vec<_>>>()?;
    let base = currency_code(&config.rates.base_currency)?;
    let provider = MonobankProvider::new(&config.rates.base_url, currencies, base);
    let rates = RateCache::new(provider, rates_collection, config.rates.freshness_window());

    let api = WalletApiClient::new(&config.api.base_url)?;
    Ok(App::new(Arc::new(api), rates, session))
}

async fn dispatch(app: &App, cmd: AppCommand) -> Result<()> {
    if cmd.needs_session() && !app.restore_session().await? {
        anyhow::bail!("Not signed in. Run `moneyguard login` first");
    }

    match cmd {
        AppCommand::SignUp {
            username,
            email,
            password,
        } => cli::auth::sign_up(app, &username, &email, &password).await,
        AppCommand::Login { email, password } => cli::auth::login(app, &email, &password).await,
        AppCommand::Logout => cli::auth::logout(app).await,
        AppCommand::Whoami => cli::auth::whoami(app).await,
        AppCommand::List { period } => cli::ledger::list(app, period).await,
        AppCommand::Add(entry) => cli::ledger::add(app, entry).await,
        AppCommand::Edit { id, changes } => cli::ledger::edit(app, &id, changes).await,
        AppCommand::Delete { id } => cli::ledger::delete(app, &id).await,
        AppCommand::Categories => cli::ledger::categories(app).await,
        AppCommand::Stats { period, local } => cli::stats::run(app, period, local).await,
        AppCommand::Rates => cli::rates::run(app).await,
    }
}

pub async fn run_command(cmd: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = build_app(&config)?;
    tokio::select! {
        result = dispatch(&app, cmd) => result,
        _ = tokio::signal::ctrl_c() => {
            app.unmount();
            anyhow::bail!("Interrupted")
        }
    }
}
