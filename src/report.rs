//! Run summary output.

use crate::snapshot::RunStats;
use crate::ui;
use comfy_table::Cell;
use tracing::info;

/// Renders the run stats as a table.
pub fn summary_table(stats: &RunStats) -> String {
    let mut table = ui::new_styled_table();

    table.set_header(vec![ui::header_cell("Outcome"), ui::header_cell("Count")]);
    table.add_row(vec![Cell::new("Stored"), ui::count_cell(stats.stored)]);
    table.add_row(vec![
        Cell::new("Reused (cached)"),
        ui::count_cell(stats.reused),
    ]);
    table.add_row(vec![Cell::new("Skipped"), ui::count_cell(stats.skipped)]);
    table.add_row(vec![
        Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
        ui::count_cell(stats.total()),
    ]);

    table.to_string()
}

/// Emits the end-of-run summary. Formatting only, no decisions.
pub fn report(stats: &RunStats) {
    info!(
        stored = stats.stored,
        reused = stats.reused,
        skipped = stats.skipped,
        "Run complete"
    );

    println!(
        "\n{}\n\n{}",
        ui::style_text("Run summary", ui::StyleType::Title),
        summary_table(stats)
    );
}
