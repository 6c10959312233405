//! Transactions, categories and the payloads used to create or edit them.

use crate::core::error::{AppError, ValidationErrors};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionKind::Income => "INCOME",
                TransactionKind::Expense => "EXPENSE",
            }
        )
    }
}

impl FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INCOME" | "+" => Ok(TransactionKind::Income),
            "EXPENSE" | "-" => Ok(TransactionKind::Expense),
            _ => Err(anyhow::anyhow!("Invalid transaction type: {}", s)),
        }
    }
}

impl TransactionKind {
    /// Applies the ledger sign convention: expenses negative, income non-negative.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount.abs(),
            TransactionKind::Expense => -amount.abs(),
        }
    }
}

/// A confirmed ledger entry as returned by the server.
///
/// Amounts already follow the sign convention of [`TransactionKind::signed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Income {
        id: TransactionId,
        date: NaiveDate,
        comment: String,
        amount: Decimal,
    },
    Expense {
        id: TransactionId,
        date: NaiveDate,
        comment: String,
        amount: Decimal,
        category_id: String,
    },
}

impl Transaction {
    pub fn income(id: &str, date: NaiveDate, comment: &str, amount: Decimal) -> Self {
        Transaction::Income {
            id: id.to_string(),
            date,
            comment: comment.to_string(),
            amount: TransactionKind::Income.signed(amount),
        }
    }

    pub fn expense(
        id: &str,
        date: NaiveDate,
        comment: &str,
        amount: Decimal,
        category_id: &str,
    ) -> Self {
        Transaction::Expense {
            id: id.to_string(),
            date,
            comment: comment.to_string(),
            amount: TransactionKind::Expense.signed(amount),
            category_id: category_id.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Transaction::Income { id, .. } | Transaction::Expense { id, .. } => id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Transaction::Income { date, .. } | Transaction::Expense { date, .. } => *date,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Transaction::Income { comment, .. } | Transaction::Expense { comment, .. } => comment,
        }
    }

    /// Signed amount.
    pub fn amount(&self) -> Decimal {
        match self {
            Transaction::Income { amount, .. } | Transaction::Expense { amount, .. } => *amount,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Income { .. } => TransactionKind::Income,
            Transaction::Expense { .. } => TransactionKind::Expense,
        }
    }

    pub fn category_id(&self) -> Option<&str> {
        match self {
            Transaction::Income { .. } => None,
            Transaction::Expense { category_id, .. } => Some(category_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub balance: Decimal,
}

/// Dates travel as `YYYY-MM-DD`; RFC 3339 timestamps are accepted on input.
pub(crate) mod wire_date {
    use super::*;
    use serde::{Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
    }

    pub fn format(date: &NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}")))
    }
}

/// Transaction as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionRecord {
    pub id: String,
    #[serde(with = "wire_date")]
    pub transaction_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub amount: Decimal,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = AppError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let comment = record.comment.unwrap_or_default();
        match record.kind {
            TransactionKind::Income => Ok(Transaction::income(
                &record.id,
                record.transaction_date,
                &comment,
                record.amount,
            )),
            TransactionKind::Expense => {
                let category_id = record
                    .category_id
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        AppError::MalformedResponse(format!(
                            "expense transaction {} has no category",
                            record.id
                        ))
                    })?;
                Ok(Transaction::expense(
                    &record.id,
                    record.transaction_date,
                    &comment,
                    record.amount,
                    &category_id,
                ))
            }
        }
    }
}

/// User input for a new transaction. `amount` is the magnitude as typed.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub comment: String,
    pub category_id: Option<String>,
}

/// Validated creation payload, ready to be posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(with = "wire_date")]
    pub transaction_date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_id: Option<String>,
    pub comment: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<NewTransaction, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.amount <= Decimal::ZERO {
            errors.push("amount", "Sum must be positive");
        }

        let comment = self.comment.trim();
        if comment.is_empty() {
            errors.push("comment", "Comment is required");
        }

        let category_id = match self.kind {
            TransactionKind::Expense => {
                let category = self
                    .category_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty());
                if category.is_none() {
                    errors.push("category", "Category is required for expenses");
                }
                category.map(str::to_string)
            }
            TransactionKind::Income => None,
        };

        errors.into_result(NewTransaction {
            transaction_date: self.date,
            kind: self.kind,
            category_id,
            comment: comment.to_string(),
            amount: self.kind.signed(self.amount),
        })
    }
}

/// Partial update of an existing transaction. Only set fields are sent.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
}

impl TransactionPatch {
    /// Validates the set fields. `kind` is the kind of the record being
    /// edited, used to sign the amount. A new amount for a record of
    /// unknown kind is rejected.
    pub fn validate(
        &self,
        kind: Option<TransactionKind>,
    ) -> Result<TransactionUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.amount.is_none()
            && self.date.is_none()
            && self.comment.is_none()
            && self.category_id.is_none()
        {
            errors.push("patch", "Nothing to update");
        }

        if let Some(amount) = self.amount
            && amount <= Decimal::ZERO
        {
            errors.push("amount", "Sum must be positive");
        } else if self.amount.is_some() && kind.is_none() {
            errors.push("amount", "Transaction type is unknown, reload transactions first");
        }

        let comment = self.comment.as_deref().map(str::trim);
        if comment.is_some_and(str::is_empty) {
            errors.push("comment", "Comment is required");
        }

        if kind == Some(TransactionKind::Income) && self.category_id.is_some() {
            errors.push("category", "Income transactions have no category");
        }

        errors.into_result(TransactionUpdate {
            transaction_date: self.date.as_ref().map(wire_date::format),
            category_id: self.category_id.clone(),
            comment: comment.map(str::to_string),
            amount: self.amount.zip(kind).map(|(a, kind)| kind.signed(a)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_record_conversion_normalises_sign() {
        let json = r#"[
            {"id": "t1", "transactionDate": "2025-03-14", "type": "EXPENSE",
             "categoryId": "food", "comment": "Groceries", "amount": 50, "balanceAfter": 950},
            {"id": "t2", "transactionDate": "2025-03-01T09:30:00.000Z", "type": "INCOME",
             "categoryId": "income-cat", "comment": null, "amount": -1000}
        ]"#;
        let records: Vec<TransactionRecord> = serde_json::from_str(json).unwrap();
        let txs: Vec<Transaction> = records
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(txs[0].amount(), Decimal::from(-50));
        assert_eq!(txs[0].category_id(), Some("food"));
        assert_eq!(txs[0].date(), date("2025-03-14"));

        assert_eq!(txs[1].kind(), TransactionKind::Income);
        assert_eq!(txs[1].amount(), Decimal::from(1000));
        assert_eq!(txs[1].category_id(), None);
        assert_eq!(txs[1].comment(), "");
        assert_eq!(txs[1].date(), date("2025-03-01"));
    }

    #[test]
    fn test_expense_record_without_category_is_rejected() {
        let json = r#"{"id": "t1", "transactionDate": "2025-03-14", "type": "EXPENSE",
                       "comment": "x", "amount": -5}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        let err = Transaction::try_from(record).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_draft_validation_collects_field_errors() {
        let draft = TransactionDraft {
            kind: TransactionKind::Expense,
            amount: Decimal::ZERO,
            date: date("2025-03-14"),
            comment: "   ".to_string(),
            category_id: None,
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.field("amount"), Some("Sum must be positive"));
        assert_eq!(errors.field("comment"), Some("Comment is required"));
        assert_eq!(
            errors.field("category"),
            Some("Category is required for expenses")
        );
    }

    #[test]
    fn test_draft_produces_signed_payload() {
        let expense = TransactionDraft {
            kind: TransactionKind::Expense,
            amount: Decimal::new(1250, 2),
            date: date("2025-03-14"),
            comment: " Lunch ".to_string(),
            category_id: Some("food".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(expense.amount, Decimal::new(-1250, 2));
        assert_eq!(expense.comment, "Lunch");

        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["transactionDate"], "2025-03-14");
        assert_eq!(json["amount"], -12.5);

        let income = TransactionDraft {
            kind: TransactionKind::Income,
            amount: Decimal::from(1000),
            date: date("2025-03-01"),
            comment: "Salary".to_string(),
            category_id: Some("ignored".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(income.category_id, None);
        let json = serde_json::to_value(&income).unwrap();
        assert!(json["categoryId"].is_null());
    }

    #[test]
    fn test_patch_signs_amount_by_kind() {
        let patch = TransactionPatch {
            amount: Some(Decimal::from(30)),
            ..Default::default()
        };
        assert_eq!(
            patch.validate(Some(TransactionKind::Expense)).unwrap().amount,
            Some(Decimal::from(-30))
        );
        assert_eq!(
            patch.validate(Some(TransactionKind::Income)).unwrap().amount,
            Some(Decimal::from(30))
        );

        let json = serde_json::to_value(patch.validate(Some(TransactionKind::Income)).unwrap())
            .unwrap();
        assert_eq!(json, serde_json::json!({"amount": 30.0}));
    }

    #[test]
    fn test_patch_amount_needs_known_kind() {
        let patch = TransactionPatch {
            amount: Some(Decimal::from(30)),
            ..Default::default()
        };
        let errors = patch.validate(None).unwrap_err();
        assert_eq!(
            errors.field("amount"),
            Some("Transaction type is unknown, reload transactions first")
        );

        let patch = TransactionPatch {
            comment: Some("Rent".to_string()),
            ..Default::default()
        };
        let update = patch.validate(None).unwrap();
        assert_eq!(update.comment.as_deref(), Some("Rent"));
        assert_eq!(update.amount, None);
    }

    #[test]
    fn test_patch_rejects_empty_and_invalid_fields() {
        let errors = TransactionPatch::default().validate(None).unwrap_err();
        assert_eq!(errors.field("patch"), Some("Nothing to update"));

        let errors = TransactionPatch {
            amount: Some(Decimal::from(-1)),
            comment: Some(" ".to_string()),
            ..Default::default()
        }
        .validate(Some(TransactionKind::Expense))
        .unwrap_err();
        assert!(errors.field("amount").is_some());
        assert!(errors.field("comment").is_some());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "expense".parse::<TransactionKind>().unwrap(),
            TransactionKind::Expense
        );
        assert_eq!(
            "Income".parse::<TransactionKind>().unwrap(),
            TransactionKind::Income
        );
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
