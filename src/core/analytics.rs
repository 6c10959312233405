//! Totals and statistics derived from the transaction list.
//!
//! Everything here is a pure function of its inputs; nothing is stored.

use crate::core::transaction::{Category, Transaction, TransactionKind};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedTotals {
    pub income: Decimal,
    /// Absolute value of all negative amounts.
    pub expenses: Decimal,
    pub balance: Decimal,
}

pub fn totals(transactions: &[Transaction]) -> DerivedTotals {
    let (income, expenses) =
        transactions
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(income, expenses), t| {
                let amount = t.amount();
                if amount.is_sign_negative() {
                    (income, expenses + amount.abs())
                } else {
                    (income + amount, expenses)
                }
            });

    DerivedTotals {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Category id to absolute spend, expenses only.
pub type CategoryBreakdown = BTreeMap<String, Decimal>;

pub fn category_breakdown(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::new();
    for t in transactions {
        if let Transaction::Expense {
            amount,
            category_id,
            ..
        } = t
        {
            *breakdown.entry(category_id.clone()).or_default() += amount.abs();
        }
    }
    breakdown.retain(|_, spend| !spend.is_zero());
    breakdown
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        if !(1..=12).contains(&month) {
            anyhow::bail!("Invalid month: {}", month);
        }
        Ok(Self { year, month })
    }

    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::current()
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("Invalid period: {} (expected YYYY-MM)", s))?;
        Period::new(year.trim().parse()?, month.trim().parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub kind: Option<TransactionKind>,
    /// Absolute total for the category in the period.
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub income: Decimal,
    pub expenses: Decimal,
    pub total: Decimal,
    pub categories: Vec<CategorySummary>,
}

/// Builds the statistics for one month from the local ledger, largest
/// spend first.
pub fn summarize_period(
    transactions: &[Transaction],
    categories: &[Category],
    period: Period,
) -> PeriodSummary {
    let in_period: Vec<Transaction> = transactions
        .iter()
        .filter(|t| period.contains(t.date()))
        .cloned()
        .collect();

    let DerivedTotals {
        income,
        expenses,
        balance,
    } = totals(&in_period);

    let mut lines: Vec<CategorySummary> = category_breakdown(&in_period)
        .into_iter()
        .map(|(id, total)| {
            let category = categories.iter().find(|c| c.id == id);
            CategorySummary {
                name: category.map_or(id.clone(), |c| c.name.clone()),
                kind: Some(TransactionKind::Expense),
                total,
            }
        })
        .collect();
    lines.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    PeriodSummary {
        period,
        income,
        expenses,
        total: balance,
        categories: lines,
    }
}
