//! Spreadsheet export: the same grouped data as the other front ends, written
//! as two CSV sheets (`Summary` and `Details`).

use crate::args::ExportArgs;
use crate::commands::Out;
use crate::model::{CollectionRecord, QueryWindow, WardReport};
use crate::{Collector, Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fetches one day's collections and writes the Summary and Details sheets.
/// An empty result writes nothing.
pub async fn export(config: Config, args: &ExportArgs) -> Result<Out<Vec<PathBuf>>> {
    let window = match args.date() {
        Some(date) => date.parse::<QueryWindow>()?,
        None => QueryWindow::today(),
    };
    let out_dir = args
        .out_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.export_dir());

    let records = Collector::new(config).fetch(&window).await?;
    if records.is_empty() {
        return Ok("No data available for the selected date.".into());
    }
    let report = WardReport::from_records(&records);

    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("Unable to create export directory {}", out_dir.display()))?;
    let paths = write_sheets(&out_dir, &window, &report, &records)?;
    info!("Report generated successfully");
    Ok(Out::new(
        format!(
            "Wrote {} and {}",
            paths[0].display(),
            paths[1].display()
        ),
        paths,
    ))
}

/// Writes `Daily_Collection_Report_<date>_{Summary,Details}.csv` and returns
/// both paths.
fn write_sheets(
    dir: &Path,
    window: &QueryWindow,
    report: &WardReport,
    records: &[CollectionRecord],
) -> Result<Vec<PathBuf>> {
    let stem = format!(
        "Daily_Collection_Report_{}",
        window.from_date().format("%Y-%m-%d")
    );
    let summary_path = dir.join(format!("{stem}_Summary.csv"));
    let details_path = dir.join(format!("{stem}_Details.csv"));

    write_summary(&summary_path, window, report)?;
    write_details(&details_path, records)?;
    Ok(vec![summary_path, details_path])
}

/// One row per ward: date, ward, amount total, bill count and the joined
/// consumer list, mirroring the grouped web table.
fn write_summary(path: &Path, window: &QueryWindow, report: &WardReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    writer.write_record([
        "Date",
        "Secretariat Ward",
        "Total Amount",
        "No of Bills",
        "Consumers",
    ])?;
    for (ward, summary) in report.iter() {
        writer.write_record([
            window.from_param(),
            ward.to_string(),
            format!("{:.2}", summary.total_amount),
            summary.count.to_string(),
            summary.owners.join(", "),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Unable to write {}", path.display()))
}

/// The raw record list, verbatim, with the upstream column names spelled out.
fn write_details(path: &Path, records: &[CollectionRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    writer.write_record([
        "Id",
        "Receipt Number",
        "Receipt Date",
        "City",
        "Consumer Name",
        "Consumer Code",
        "Secretariat Ward",
        "Total Amount",
    ])?;
    for record in records {
        writer.write_record([
            record.id.map(|id| id.to_string()).unwrap_or_default(),
            record.receipt_number.clone().unwrap_or_default(),
            record.receipt_date.clone().unwrap_or_default(),
            record.city_name.clone().unwrap_or_default(),
            record.consumer_name().to_string(),
            record.consumer_code().to_string(),
            record.ward().to_string(),
            format!("{:.2}", record.amount()),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Unable to write {}", path.display()))
}
