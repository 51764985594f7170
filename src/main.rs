// src/main.rs
mod utils;
mod sheets;
mod extractors;
mod storage;

use chrono::NaiveDate;
use clap::Parser;
use utils::AppError;
use sheets::{client, models, SheetSource};
use extractors::{DateWindow, Record, ScheduleExtractor};
use storage::{OutputDocument, StorageManager};

/// Publishes the date-relevant part of the daily and weekly schedule sheets as one JSON file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV export URL of the daily schedule
    #[arg(long, default_value = models::DAILY_SHEET_URL)]
    daily_url: String,

    /// CSV export URL of the weekly schedule
    #[arg(long, default_value = models::WEEKLY_SHEET_URL)]
    weekly_url: String,

    /// Row (0-based) holding the dates in the daily sheet
    #[arg(long, default_value_t = 0)]
    daily_date_row: usize,

    /// Row (0-based) holding the dates in the weekly sheet
    #[arg(long, default_value_t = 1)]
    weekly_date_row: usize,

    /// Destination of the JSON document
    #[arg(short, long, default_value = "../public/data.json")]
    output: String,

    /// Keep dates up to this many days in the past
    #[arg(long, default_value_t = 2)]
    window_before: u32,

    /// Keep dates up to this many days ahead
    #[arg(long, default_value_t = 10)]
    window_after: u32,

    /// Exit with an error and keep the previous file when both sheets fail
    #[arg(long)]
    strict: bool,
}

/// Fetches and extracts one sheet. Every failure is returned, none escapes the source.
async fn process_source(
    source: &SheetSource,
    extractor: &ScheduleExtractor,
) -> Result<Vec<Record>, AppError> {
    tracing::info!("--- Fetching {} ---", source.name);
    let content = client::fetch_sheet_csv(&source.url).await?;
    tracing::info!("Successfully downloaded {} sheet ({} bytes)", source.name, content.len());

    let records = extractor.extract_csv(&content, source.date_row)?;
    Ok(records)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting sync with args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output)?;

    // 4. Fix "today" for the whole run
    let today: NaiveDate = chrono::Local::now().date_naive();
    let window = DateWindow::new(i64::from(args.window_before), i64::from(args.window_after));
    tracing::info!("Keeping dates from -{} to +{} days around {}", window.days_before, window.days_after, today);
    let extractor = ScheduleExtractor::new(window, today);

    // 5. Extract both sheets, one after the other
    let daily_source = SheetSource::new("Daily", &args.daily_url, args.daily_date_row);
    let weekly_source = SheetSource::new("Weekly", &args.weekly_url, args.weekly_date_row);

    let daily = process_source(&daily_source, &extractor).await;
    let weekly = process_source(&weekly_source, &extractor).await;

    let failure_count = [daily.is_err(), weekly.is_err()].iter().filter(|failed| **failed).count();
    if args.strict && failure_count == 2 {
        if let (Err(daily_err), Err(weekly_err)) = (&daily, &weekly) {
            tracing::error!("Daily: {}", daily_err);
            tracing::error!("Weekly: {}", weekly_err);
        }
        return Err(AppError::Processing(format!(
            "Both sheets failed, leaving {} untouched",
            storage.output_path().display()
        )));
    }

    // 6. Assemble and write
    let document = OutputDocument::assemble(daily, weekly, storage::timestamp_now());
    tracing::info!(
        "Processing finished. Daily: {} batches, Weekly: {} batches, Failed sheets: {}",
        document.daily.len(),
        document.weekly.len(),
        failure_count
    );

    storage.save_document(&document)?;

    Ok(())
}
