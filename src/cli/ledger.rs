use super::ui;
use crate::app::App;
use crate::core::analytics::{self, Period};
use crate::core::ledger::Ledger;
use crate::core::transaction::{
    Transaction, TransactionDraft, TransactionKind, TransactionPatch,
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use comfy_table::{Cell, CellAlignment};
use rust_decimal::Decimal;
use tracing::warn;

/// Transaction as entered on the command line. `category` may be an id or
/// a category name.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub comment: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub category: Option<String>,
}

fn resolve_category(ledger: &Ledger, category: Option<&str>) -> Result<Option<String>> {
    let Some(category) = category else {
        return Ok(None);
    };
    let found = ledger.resolve_category(category).with_context(|| {
        format!("Unknown category: {category}. Run `moneyguard categories` to list them")
    })?;
    Ok(Some(found.id.clone()))
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "+",
        TransactionKind::Expense => "-",
    }
}

/// Renders the ledger newest first, optionally limited to one month.
pub fn render_transactions(ledger: &Ledger, period: Option<Period>) -> String {
    let selected: Vec<&Transaction> = ledger
        .transactions()
        .iter()
        .filter(|t| period.is_none_or(|p| p.contains(t.date())))
        .collect();

    if selected.is_empty() {
        return "No transactions yet.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Type"),
        ui::header_cell("Category"),
        ui::header_cell("Comment"),
        ui::header_cell("Sum"),
        ui::header_cell("Id"),
    ]);

    for t in &selected {
        let category = match t.category_id() {
            Some(id) => ledger.category_name(id).unwrap_or(id).to_string(),
            None => "Income".to_string(),
        };
        table.add_row(vec![
            Cell::new(t.date().format("%d.%m.%Y")),
            Cell::new(kind_label(t.kind())).set_alignment(CellAlignment::Center),
            Cell::new(category),
            Cell::new(t.comment()),
            ui::amount_cell(t.amount()),
            Cell::new(ui::style_text(t.id(), ui::StyleType::Subtle)),
        ]);
    }

    let owned: Vec<Transaction> = selected.into_iter().cloned().collect();
    let totals = analytics::totals(&owned);

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n\n{} {}\n{} {}\n{} {}",
        ui::style_text("Income:  ", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_money(totals.income), ui::StyleType::Income),
        ui::style_text("Expenses:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_money(totals.expenses), ui::StyleType::Expense),
        ui::style_text("Balance: ", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_money(totals.balance), ui::StyleType::Title),
    ));
    output
}

pub async fn list(app: &App, period: Option<Period>) -> Result<()> {
    let pb = ui::new_spinner("Loading transactions...");
    let result = app.refresh().await;
    pb.finish_and_clear();
    result?;

    if let Some(period) = period {
        println!(
            "{}\n",
            ui::style_text(&format!("Transactions for {period}"), ui::StyleType::Title)
        );
    }
    println!("{}", render_transactions(&app.state().ledger, period));
    Ok(())
}

pub async fn add(app: &App, entry: NewEntry) -> Result<()> {
    if entry.kind == TransactionKind::Expense && entry.category.is_some() {
        app.load_categories().await?;
    }
    let category_id = match entry.kind {
        TransactionKind::Expense => {
            resolve_category(&app.state().ledger, entry.category.as_deref())?
        }
        TransactionKind::Income => {
            if entry.category.is_some() {
                warn!("Income transactions have no category, ignoring it");
            }
            None
        }
    };

    let draft = TransactionDraft {
        kind: entry.kind,
        amount: entry.amount,
        date: entry.date.unwrap_or_else(|| Utc::now().date_naive()),
        comment: entry.comment,
        category_id,
    };
    let created = app.add_transaction(&draft).await?;
    println!(
        "Added {} {} on {} ({})",
        kind_label(created.kind()),
        ui::format_money(created.amount().abs()),
        created.date(),
        created.id()
    );
    Ok(())
}

pub async fn edit(app: &App, id: &str, changes: EntryChanges) -> Result<()> {
    // The record's kind decides how the amount is signed.
    app.load_transactions().await?;
    if app.state().ledger.find(id).is_none() {
        anyhow::bail!("No transaction with id {id}");
    }
    if changes.category.is_some() {
        app.load_categories().await?;
    }
    let category_id = resolve_category(&app.state().ledger, changes.category.as_deref())?;

    let patch = TransactionPatch {
        amount: changes.amount,
        date: changes.date,
        comment: changes.comment,
        category_id,
    };
    let updated = app.update_transaction(id, &patch).await?;
    println!(
        "Updated {}: {} {} on {}",
        updated.id(),
        kind_label(updated.kind()),
        ui::format_money(updated.amount().abs()),
        updated.date()
    );
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    app.delete_transaction(id).await?;
    println!("Deleted {id}");
    Ok(())
}

pub async fn categories(app: &App) -> Result<()> {
    app.load_categories().await?;
    let state = app.state();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Type"),
        ui::header_cell("Id"),
    ]);
    for category in state.ledger.categories() {
        table.add_row(vec![
            Cell::new(&category.name),
            ui::format_optional_cell(category.kind, |k| k.to_string()),
            Cell::new(&category.id),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::LedgerAction;
    use crate::core::transaction::Category;

    fn ledger() -> Ledger {
        let date = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        let mut ledger = Ledger::default();
        ledger.apply(LedgerAction::CategoriesLoaded(vec![Category {
            id: "c-food".into(),
            name: "Products".into(),
            kind: Some(TransactionKind::Expense),
        }]));
        ledger.apply(LedgerAction::TransactionsLoaded(vec![
            Transaction::expense("t1", date(14), "Groceries", Decimal::from(50), "c-food"),
            Transaction::income("t2", date(1), "Salary", Decimal::from(1000)),
        ]));
        ledger
    }

    #[test]
    fn test_render_shows_names_and_totals() {
        console::set_colors_enabled(false);
        let output = render_transactions(&ledger(), None);
        assert!(output.contains("Products"));
        assert!(output.contains("Groceries"));
        assert!(output.contains("14.03.2025"));
        assert!(output.contains("1 000.00"));
        assert!(output.contains("950.00"));
    }

    #[test]
    fn test_render_filters_by_period() {
        let period = Period::new(2024, 12).unwrap();
        assert_eq!(
            render_transactions(&ledger(), Some(period)),
            "No transactions yet."
        );
    }

    #[test]
    fn test_category_resolution_by_name_or_id() {
        let ledger = ledger();
        assert_eq!(
            resolve_category(&ledger, Some("products")).unwrap(),
            Some("c-food".to_string())
        );
        assert_eq!(
            resolve_category(&ledger, Some("c-food")).unwrap(),
            Some("c-food".to_string())
        );
        assert_eq!(resolve_category(&ledger, None).unwrap(), None);

        let err = resolve_category(&ledger, Some("Travel")).unwrap_err();
        assert!(err.to_string().contains("Unknown category: Travel"));
    }
}
