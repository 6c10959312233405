use super::ui;
use crate::app::App;
use crate::core::rates::RateSnapshot;
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use comfy_table::Cell;

pub fn render_rates(snapshot: &RateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Purchase"),
        ui::header_cell("Sale"),
    ]);
    for rate in &snapshot.rates {
        table.add_row(vec![
            Cell::new(&rate.currency),
            ui::format_optional_cell(rate.buy, |p| format!("{p:.2}")),
            ui::format_optional_cell(rate.sell, |p| format!("{p:.2}")),
        ]);
    }

    let fetched_at = Local
        .timestamp_millis_opt(snapshot.fetched_at_ms)
        .single()
        .map_or_else(|| "unknown".to_string(), |t| t.format("%d.%m.%Y %H:%M").to_string());

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n{}",
        ui::style_text(&format!("Updated {fetched_at}"), ui::StyleType::Subtle)
    ));
    if snapshot.stale {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                "Could not refresh rates, showing the last known values",
                ui::StyleType::Warning
            )
        ));
    }
    output
}

pub async fn run(app: &App) -> Result<()> {
    let pb = ui::new_spinner("Fetching currency rates...");
    let result = app.load_rates().await;
    pb.finish_and_clear();

    result?;

    let state = app.state();
    let snapshot = state
        .rates
        .snapshot()
        .context("No currency rates available")?;
    println!("{}", render_rates(snapshot));
    Ok(())
}
