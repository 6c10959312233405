//! Core business logic abstractions

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod finance;
pub mod ledger;
pub mod log;
pub mod rates;
pub mod state;
pub mod transaction;

// Re-export main types for cleaner imports
pub use error::{AppError, ValidationErrors};
pub use finance::FinanceApi;
pub use ledger::{Ledger, LedgerAction};
pub use rates::{CurrencyRate, CurrencyRateProvider, RateSnapshot, RateState};
pub use state::{Action, AppState};
pub use transaction::{Category, Transaction, TransactionKind};
