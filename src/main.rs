use analytics::{AnalyticsEngine, DaySummary, MonthView, Stats};
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{Config, load_config};
use core_types::DailyPnl;
use indicatif::{ProgressBar, ProgressStyle};
use ingest::{IngestResult, Ingestor, ProgressSink};
use journal::{Journal, JournalEntry};
use std::path::PathBuf;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The main entry point for the trade calendar.
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config)?;

    match cli.command {
        Commands::Load(args) => handle_load(args, config).await,
        Commands::History => handle_history(&config),
        Commands::Month(args) => handle_month(args, &config),
        Commands::Day(args) => handle_day(args, &config),
        Commands::Clear => handle_clear(&config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Turns exported trade lists into a daily P&L calendar.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a trade export and print its daily P&L.
    Load(LoadArgs),
    /// List saved snapshots.
    History,
    /// Show the day-by-day P&L of one month from a snapshot.
    Month(MonthArgs),
    /// Show every trade of one day from a snapshot.
    Day(DayArgs),
    /// Delete all saved snapshots.
    Clear,
}

#[derive(Parser)]
struct LoadArgs {
    /// An `.xlsx` export, a `.csv` sheet, or a directory of `.csv` sheets.
    path: PathBuf,

    /// Do not write a snapshot of this run.
    #[arg(long)]
    no_save: bool,
}

#[derive(Parser)]
struct MonthArgs {
    /// Snapshot file, or its name inside the data directory.
    snapshot: PathBuf,

    /// The month to show (format: YYYY-MM).
    #[arg(value_parser = parse_month)]
    month: (i32, u32),
}

#[derive(Parser)]
struct DayArgs {
    /// Snapshot file, or its name inside the data directory.
    snapshot: PathBuf,

    /// The day to show (format: YYYY-MM-DD).
    date: NaiveDate,
}

fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| format!("'{raw}' is not a month in YYYY-MM format"))?;
    Ok((first.year(), first.month()))
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber. The returned guard flushes the log file on drop.
fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &config.logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "trade-calendar.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("Failed to install the tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .context("Failed to install the tracing subscriber")?;
            Ok(None)
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Shows ingestion messages on a terminal spinner.
struct SpinnerProgress(ProgressBar);

impl ProgressSink for SpinnerProgress {
    fn report(&self, message: &str) {
        self.0.set_message(message.to_string());
    }
}

/// Ingests a file on a blocking worker while the spinner ticks on this task.
async fn handle_load(args: LoadArgs, config: Config) -> Result<()> {
    tracing::info!(path = %args.path.display(), save = !args.no_save, "Loading trade file.");
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let worker_config = config.clone();
    let path = args.path.clone();
    let sink = SpinnerProgress(spinner.clone());
    let outcome = tokio::task::spawn_blocking(move || {
        Ingestor::new(&worker_config).process_file(&path, &sink)
    })
    .await
    .context("Ingestion worker panicked")?;

    let result = match outcome {
        Ok(result) => {
            spinner.finish_with_message(format!(
                "Processed {} trades from {}",
                result.trades.len(),
                args.path.display()
            ));
            result
        }
        Err(e) => {
            spinner.abandon_with_message("Ingestion failed");
            return Err(e).with_context(|| format!("Failed to ingest {}", args.path.display()));
        }
    };

    print_stats(&result.stats);
    print_daily(&result.daily_pnl);
    print_tally(&result);

    if !args.no_save {
        let journal = Journal::open(&config.journal.data_dir)?;
        let saved = journal.save(&args.path, &result.trades, &result.daily_pnl, &result.stats)?;
        tracing::info!(snapshot = %saved.display(), "Run recorded in the journal.");
        println!("Snapshot saved to {}", saved.display());
    }
    Ok(())
}

fn handle_history(config: &Config) -> Result<()> {
    let journal = Journal::open(&config.journal.data_dir)?;
    let entries = journal.history()?;
    if entries.is_empty() {
        println!("No saved snapshots in {}", journal.dir().display());
        return Ok(());
    }

    let mut table = new_table(vec!["Snapshot", "Saved", "Size"]);
    for entry in &entries {
        table.add_row(vec![
            entry.filename.clone(),
            format_modified(entry),
            format_bytes(entry.size_bytes),
        ]);
    }
    println!("{table}");
    println!(
        "{} snapshots, {} in {}",
        journal.file_count()?,
        format_bytes(journal.folder_size()?),
        journal.dir().display()
    );
    Ok(())
}

fn handle_month(args: MonthArgs, config: &Config) -> Result<()> {
    let journal = Journal::open(&config.journal.data_dir)?;
    let snapshot = journal
        .load(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    let (year, month) = args.month;
    let view = AnalyticsEngine::new().month_view(&snapshot.daily_pnl, &snapshot.trades, year, month)?;
    print_month(&view);
    Ok(())
}

fn handle_day(args: DayArgs, config: &Config) -> Result<()> {
    let journal = Journal::open(&config.journal.data_dir)?;
    let snapshot = journal
        .load(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    match AnalyticsEngine::new().day_summary(args.date, &snapshot.trades) {
        Some(summary) => print_day(&summary),
        None => println!("No trades on {}", args.date),
    }
    Ok(())
}

fn handle_clear(config: &Config) -> Result<()> {
    let journal = Journal::open(&config.journal.data_dir)?;
    tracing::info!(dir = %journal.dir().display(), "Clearing saved snapshots.");
    let removed = journal.clear()?;
    println!("Removed {removed} snapshots from {}", journal.dir().display());
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pnl_cell(pnl: f64) -> Cell {
    let cell = Cell::new(format!("{pnl:.2}"));
    if pnl > 0.0 {
        cell.fg(Color::Green)
    } else if pnl < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn print_stats(stats: &Stats) {
    let mut table = new_table(vec!["Total P&L", "Win Rate", "Avg Daily", "Trades"]);
    table.add_row(vec![
        pnl_cell(stats.total_pnl),
        Cell::new(format!("{:.1}%", stats.win_rate)),
        pnl_cell(stats.avg_daily),
        Cell::new(stats.total_trades),
    ]);
    println!("{table}");
}

fn print_daily(daily: &DailyPnl) {
    if daily.is_empty() {
        return;
    }
    let mut table = new_table(vec!["Date", "P&L"]);
    for (date, pnl) in daily {
        table.add_row(vec![Cell::new(date), pnl_cell(*pnl)]);
    }
    println!("{table}");
}

fn print_tally(result: &IngestResult) {
    let tally = &result.tally;
    if tally.rejected() == 0 {
        return;
    }
    println!(
        "Skipped {} of {} rows (duplicates: {}, missing date: {}, missing P&L: {}, \
         bad date: {}, future: {}, before 2000: {}, bad P&L: {})",
        tally.rejected(),
        tally.rows_read,
        tally.duplicate_trade_id,
        tally.missing_date,
        tally.missing_pnl,
        tally.unparseable_date,
        tally.future_date,
        tally.before_minimum_year,
        tally.unparseable_pnl,
    );
}

fn print_month(view: &MonthView) {
    let mut table = new_table(vec!["Date", "Weekday", "P&L", "Trades"]);
    for day in &view.days {
        let pnl = if day.trade_count > 0 {
            pnl_cell(day.pnl)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(day.date.format("%Y-%m-%d")),
            Cell::new(day.date.format("%a")),
            pnl,
            Cell::new(day.trade_count),
        ]);
    }
    println!("{table}");

    let (prev_year, prev_month) = view.previous();
    let (next_year, next_month) = view.next();
    println!(
        "{:04}-{:02} total: {:.2} over {} trading days  (prev {:04}-{:02}, next {:04}-{:02})",
        view.year,
        view.month,
        view.total_pnl,
        view.trading_days().count(),
        prev_year,
        prev_month,
        next_year,
        next_month,
    );
}

fn print_day(summary: &DaySummary) {
    println!(
        "{}: {:.2} total, {} winners, {} losers, {:.1}% win rate",
        summary.date,
        summary.total_pnl,
        summary.winning_trades,
        summary.losing_trades,
        summary.win_rate
    );
    let mut table = new_table(vec!["Trade #", "P&L"]);
    for trade in &summary.trades {
        let id = trade
            .trade_num
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![Cell::new(id), pnl_cell(trade.pnl)]);
    }
    println!("{table}");
}

fn format_modified(entry: &JournalEntry) -> String {
    let modified: chrono::DateTime<Local> = entry.modified.into();
    modified.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < KIB * KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_argument_parses_year_and_month() {
        assert_eq!(parse_month("2024-02"), Ok((2024, 2)));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("Feb 2024").is_err());
    }

    #[test]
    fn byte_sizes_are_human_readable() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
