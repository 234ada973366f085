use crate::args::{FetchArgs, OutputFormat};
use crate::commands::Out;
use crate::model::{QueryWindow, WardReport};
use crate::{Collector, Config, Result};
use std::fmt::Write;

/// Fetches one day's collections and renders the per-ward summary to the
/// terminal as a table or as JSON.
pub async fn fetch(config: Config, args: &FetchArgs) -> Result<Out<WardReport>> {
    let window = match args.date() {
        Some(date) => date.parse::<QueryWindow>()?,
        None => QueryWindow::today(),
    };

    let report = Collector::new(config).fetch_and_group(&window).await?;

    let message = match args.format() {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Table => render_table(&window, &report),
    };
    Ok(Out::new(message, report))
}

/// A plain text table: one row per ward plus a totals line.
fn render_table(window: &QueryWindow, report: &WardReport) -> String {
    if report.is_empty() {
        return format!("No data found for {window}.");
    }

    let ward_width = report
        .iter()
        .map(|(ward, _)| ward.len())
        .chain(std::iter::once("Ward".len()))
        .max()
        .unwrap_or(4);

    let mut out = String::new();
    let _ = writeln!(out, "Collection report for {window}");
    let _ = writeln!(out, "{:<ward_width$}  {:>6}  {:>14}  Consumers", "Ward", "Bills", "Total Amount");
    for (ward, summary) in report.iter() {
        let _ = writeln!(
            out,
            "{:<ward_width$}  {:>6}  {:>14.2}  {}",
            ward,
            summary.count,
            summary.total_amount,
            summary.owners.join("; ")
        );
    }
    let _ = write!(
        out,
        "Total: {} bills, {:.2}",
        report.total_bills(),
        report.total_amount()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CollectionRecord;
    use chrono::NaiveDate;

    fn report() -> WardReport {
        let records = vec![
            CollectionRecord {
                secretariat_ward: Some("5".into()),
                total_amount: Some(100.0),
                consumer_name: Some("A".into()),
                consumer_code: Some("C1".into()),
                ..Default::default()
            },
            CollectionRecord {
                secretariat_ward: Some("7".into()),
                total_amount: Some(25.0),
                consumer_name: Some("D".into()),
                consumer_code: Some("C3".into()),
                ..Default::default()
            },
        ];
        WardReport::from_records(&records)
    }

    fn window() -> QueryWindow {
        QueryWindow::single_day(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap())
    }

    #[test]
    fn table_lists_wards_and_totals() {
        let text = render_table(&window(), &report());
        assert!(text.contains("09/04/2025"));
        assert!(text.contains("A (C1)"));
        assert!(text.contains("Total: 2 bills, 125.00"));
    }

    #[test]
    fn empty_report_renders_no_data_line() {
        let text = render_table(&window(), &WardReport::default());
        assert_eq!(text, "No data found for 09/04/2025.");
    }
}
