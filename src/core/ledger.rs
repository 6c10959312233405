//! In-memory ledger: the server-confirmed transactions and categories.
//!
//! The collection only changes through [`Ledger::apply`]. Totals and
//! breakdowns are recomputed on every read so they cannot drift.

use crate::core::analytics::{self, CategoryBreakdown, DerivedTotals, Period, PeriodSummary};
use crate::core::transaction::{Category, Transaction, TransactionId};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerAction {
    /// A request was sent; prior data stays readable.
    Pending,
    TransactionsLoaded(Vec<Transaction>),
    CategoriesLoaded(Vec<Category>),
    CategoriesInvalidated,
    TransactionAdded(Transaction),
    TransactionUpdated(Transaction),
    TransactionDeleted(TransactionId),
    Failed(String),
    /// In-flight responses were abandoned.
    Settled,
    Cleared,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Ledger {
    pub fn apply(&mut self, action: LedgerAction) {
        match action {
            LedgerAction::Pending => {
                self.is_loading = true;
                self.error = None;
            }
            LedgerAction::TransactionsLoaded(transactions) => {
                debug!(count = transactions.len(), "Ledger replaced");
                self.is_loading = false;
                self.error = None;
                self.transactions = transactions;
            }
            LedgerAction::CategoriesLoaded(categories) => {
                self.error = None;
                self.categories = categories;
            }
            LedgerAction::CategoriesInvalidated => self.categories.clear(),
            // Mutations leave `is_loading` alone: only the list load owns it.
            LedgerAction::TransactionAdded(transaction) => {
                self.error = None;
                self.transactions.retain(|t| t.id() != transaction.id());
                self.transactions.insert(0, transaction);
            }
            LedgerAction::TransactionUpdated(transaction) => {
                self.error = None;
                match self
                    .transactions
                    .iter_mut()
                    .find(|t| t.id() == transaction.id())
                {
                    Some(slot) => *slot = transaction,
                    None => debug!(id = transaction.id(), "Update for unknown transaction ignored"),
                }
            }
            LedgerAction::TransactionDeleted(id) => {
                self.error = None;
                self.transactions.retain(|t| t.id() != id);
            }
            LedgerAction::Failed(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            LedgerAction::Settled => self.is_loading = false,
            LedgerAction::Cleared => *self = Ledger::default(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    pub fn category_name(&self, id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Looks a category up by id, or by name ignoring case.
    pub fn resolve_category(&self, id_or_name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.id == id_or_name)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(id_or_name))
            })
    }

    pub fn totals(&self) -> DerivedTotals {
        analytics::totals(&self.transactions)
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        analytics::category_breakdown(&self.transactions)
    }

    pub fn period_summary(&self, period: Period) -> PeriodSummary {
        analytics::summarize_period(&self.transactions, &self.categories, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn expense(id: &str, amount: i64, category: &str) -> Transaction {
        Transaction::expense(id, date(), "expense", Decimal::from(amount), category)
    }

    fn income(id: &str, amount: i64) -> Transaction {
        Transaction::income(id, date(), "income", Decimal::from(amount))
    }

    fn loaded(transactions: Vec<Transaction>) -> Ledger {
        let mut ledger = Ledger::default();
        ledger.apply(LedgerAction::TransactionsLoaded(transactions));
        ledger
    }

    fn assert_balance_identity(ledger: &Ledger) {
        let t = ledger.totals();
        assert_eq!(t.balance, t.income - t.expenses);
    }

    #[test]
    fn test_load_replaces_collection() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::TransactionsLoaded(vec![
            income("b", 20),
            expense("c", 5, "food"),
        ]));
        let ids: Vec<&str> = ledger.transactions().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(ledger.totals().balance, Decimal::from(15));
    }

    #[test]
    fn test_failure_keeps_prior_collection() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::Pending);
        assert!(ledger.is_loading);
        ledger.apply(LedgerAction::Failed("Failed to fetch transactions".into()));

        assert!(!ledger.is_loading);
        assert_eq!(ledger.error.as_deref(), Some("Failed to fetch transactions"));
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.totals().income, Decimal::from(10));
    }

    #[test]
    fn test_add_prepends() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::TransactionAdded(expense("b", 4, "food")));
        assert_eq!(ledger.transactions()[0].id(), "b");
        assert_eq!(ledger.totals().expenses, Decimal::from(4));
        assert_balance_identity(&ledger);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut ledger = loaded(vec![income("a", 10), expense("b", 4, "food")]);
        ledger.apply(LedgerAction::TransactionUpdated(expense("b", 9, "fun")));

        assert_eq!(ledger.transactions()[1].amount(), Decimal::from(-9));
        assert_eq!(ledger.transactions()[1].category_id(), Some("fun"));
        assert_eq!(ledger.totals().balance, Decimal::from(1));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut ledger = loaded(vec![income("a", 10)]);
        let before = ledger.clone();
        ledger.apply(LedgerAction::TransactionUpdated(income("zzz", 99)));
        assert_eq!(ledger.transactions(), before.transactions());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut ledger = loaded(vec![income("a", 10), expense("b", 4, "food")]);
        ledger.apply(LedgerAction::TransactionDeleted("b".into()));
        let after_first = ledger.clone();
        ledger.apply(LedgerAction::TransactionDeleted("b".into()));
        assert_eq!(ledger, after_first);
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn test_add_then_delete_restores_prior_state() {
        let mut ledger = loaded(vec![income("a", 1000), expense("b", 50, "food")]);
        let before_totals = ledger.totals();
        let before: Vec<Transaction> = ledger.transactions().to_vec();

        ledger.apply(LedgerAction::TransactionAdded(expense("c", 25, "fun")));
        ledger.apply(LedgerAction::TransactionDeleted("c".into()));

        assert_eq!(ledger.totals(), before_totals);
        assert_eq!(ledger.transactions(), before.as_slice());
    }

    #[test]
    fn test_balance_identity_over_mutations() {
        let mut ledger = Ledger::default();
        let actions = vec![
            LedgerAction::TransactionAdded(income("a", 300)),
            LedgerAction::TransactionAdded(expense("b", 120, "food")),
            LedgerAction::TransactionAdded(expense("c", 0, "food")),
            LedgerAction::TransactionUpdated(expense("b", 80, "food")),
            LedgerAction::TransactionAdded(income("d", 0)),
            LedgerAction::TransactionDeleted("a".into()),
            LedgerAction::TransactionDeleted("missing".into()),
            LedgerAction::TransactionAdded(income("e", 45)),
        ];
        for action in actions {
            ledger.apply(action);
            assert_balance_identity(&ledger);
        }
        assert_eq!(ledger.totals().balance, Decimal::from(-35));
        assert_eq!(
            ledger.category_breakdown().get("food"),
            Some(&Decimal::from(80))
        );
    }

    #[test]
    fn test_add_with_existing_id_keeps_last_write() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::TransactionAdded(income("a", 25)));
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.totals().income, Decimal::from(25));
    }

    #[test]
    fn test_category_lookup_and_invalidation() {
        let mut ledger = Ledger::default();
        assert!(!ledger.has_categories());
        ledger.apply(LedgerAction::CategoriesLoaded(vec![Category {
            id: "c1".into(),
            name: "Products".into(),
            kind: None,
        }]));
        assert!(ledger.has_categories());
        assert_eq!(ledger.category_name("c1"), Some("Products"));
        assert_eq!(ledger.resolve_category("products").map(|c| c.id.as_str()), Some("c1"));
        assert_eq!(ledger.resolve_category("c1").map(|c| c.id.as_str()), Some("c1"));

        ledger.apply(LedgerAction::CategoriesInvalidated);
        assert!(!ledger.has_categories());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::Failed("x".into()));
        ledger.apply(LedgerAction::Cleared);
        assert_eq!(ledger, Ledger::default());
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::Failed("Network error".into()));
        ledger.apply(LedgerAction::TransactionAdded(income("b", 5)));
        assert_eq!(ledger.error, None);

        ledger.apply(LedgerAction::Failed("Network error".into()));
        ledger.apply(LedgerAction::TransactionDeleted("missing".into()));
        assert_eq!(ledger.error, None);
    }

    #[test]
    fn test_mutation_keeps_pending_load() {
        let mut ledger = loaded(vec![income("a", 10)]);
        ledger.apply(LedgerAction::Pending);
        ledger.apply(LedgerAction::TransactionAdded(income("b", 5)));
        ledger.apply(LedgerAction::TransactionUpdated(income("a", 15)));
        ledger.apply(LedgerAction::TransactionDeleted("b".into()));
        ledger.apply(LedgerAction::CategoriesLoaded(Vec::new()));
        assert!(ledger.is_loading);

        ledger.apply(LedgerAction::TransactionsLoaded(vec![income("a", 15)]));
        assert!(!ledger.is_loading);
    }
}
