use super::ui;
use crate::app::App;
use crate::core::analytics::{Period, PeriodSummary};
use anyhow::Result;
use comfy_table::{Cell, Color};

/// Palette cycled through the category rows, matching the chart legend.
const CATEGORY_COLORS: &[Color] = &[
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::DarkYellow,
    Color::DarkMagenta,
    Color::DarkCyan,
];

pub fn render_summary(summary: &PeriodSummary) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text(
            &format!("Statistics for {}", summary.period),
            ui::StyleType::Title
        )
    );

    if summary.categories.is_empty() {
        output.push_str(&ui::style_text(
            "No expenses in this period.",
            ui::StyleType::Subtle,
        ));
    } else {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Category"), ui::header_cell("Sum")]);
        for (line, color) in summary
            .categories
            .iter()
            .zip(CATEGORY_COLORS.iter().cycle())
        {
            table.add_row(vec![
                Cell::new(format!("■ {}", line.name)).fg(*color),
                ui::format_optional_cell(Some(line.total), ui::format_money),
            ]);
        }
        output.push_str(&table.to_string());
    }

    output.push_str(&format!(
        "\n\n{} {}\n{} {}\n{} {}",
        ui::style_text("Expenses:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_money(summary.expenses), ui::StyleType::Expense),
        ui::style_text("Income:  ", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_money(summary.income), ui::StyleType::Income),
        ui::style_text("Total:   ", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_money(summary.total), ui::StyleType::Title),
    ));
    output
}

/// Shows one month of statistics. With `local` the summary is computed
/// from the downloaded ledger instead of asking the server.
pub async fn run(app: &App, period: Period, local: bool) -> Result<()> {
    let pb = ui::new_spinner("Loading statistics...");
    let summary = if local {
        let result = app.refresh().await;
        pb.finish_and_clear();
        result?;
        app.state().ledger.period_summary(period)
    } else {
        let result = app.load_statistics(period).await;
        pb.finish_and_clear();
        result?;
        match app.state().statistics.data {
            Some(summary) => summary,
            None => anyhow::bail!("No statistics available for {period}"),
        }
    };

    println!("{}", render_summary(&summary));
    Ok(())
}
