use crate::JournalError;
use analytics::Stats;
use chrono::{DateTime, Local};
use core_types::{DailyPnl, Trade};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Format of the timestamp stored in a snapshot and appended to its file name.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const SNAPSHOT_EXTENSION: &str = "json";

/// One saved ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub original_filename: String,
    pub trades: Vec<Trade>,
    pub daily_pnl: DailyPnl,
    pub stats: Stats,
    pub total_trades: usize,
}

/// A snapshot file found in the journal directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub filename: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size_bytes: u64,
}

/// A directory of snapshot files.
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    /// Opens the journal at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a snapshot of one run and returns the path of the new file.
    ///
    /// The file is named `<source stem>_<timestamp>.json`. A numeric suffix is
    /// added when a snapshot of the same source was already saved within the
    /// same second.
    pub fn save(
        &self,
        source_path: &Path,
        trades: &[Trade],
        daily_pnl: &DailyPnl,
        stats: &Stats,
    ) -> Result<PathBuf, JournalError> {
        self.save_at(Local::now(), source_path, trades, daily_pnl, stats)
    }

    fn save_at(
        &self,
        now: DateTime<Local>,
        source_path: &Path,
        trades: &[Trade],
        daily_pnl: &DailyPnl,
        stats: &Stats,
    ) -> Result<PathBuf, JournalError> {
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        let original_filename = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trades".to_string());

        let snapshot = Snapshot {
            timestamp: timestamp.clone(),
            original_filename,
            trades: trades.to_vec(),
            daily_pnl: daily_pnl.clone(),
            stats: stats.clone(),
            total_trades: trades.len(),
        };

        let path = self.free_path(&format!("{stem}_{timestamp}"));
        let body = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, body).map_err(|source| io_error(&path, source))?;

        tracing::info!(path = %path.display(), trades = snapshot.total_trades, "Snapshot saved.");
        Ok(path)
    }

    fn free_path(&self, base: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{base}.{SNAPSHOT_EXTENSION}"));
        let mut counter = 1;
        while path.exists() {
            path = self
                .dir
                .join(format!("{base}_{counter}.{SNAPSHOT_EXTENSION}"));
            counter += 1;
        }
        path
    }

    /// Reads a snapshot back. Relative paths are looked up inside the journal
    /// directory when they do not exist as given.
    pub fn load(&self, path: &Path) -> Result<Snapshot, JournalError> {
        let resolved = if path.is_relative() && !path.exists() {
            self.dir.join(path)
        } else {
            path.to_path_buf()
        };
        let body = fs::read_to_string(&resolved).map_err(|source| io_error(&resolved, source))?;
        let snapshot = serde_json::from_str(&body)?;
        tracing::debug!(path = %resolved.display(), "Snapshot loaded.");
        Ok(snapshot)
    }

    /// Lists saved snapshots, most recently modified first.
    pub fn history(&self) -> Result<Vec<JournalEntry>, JournalError> {
        let mut entries = Vec::new();
        for path in self.snapshot_paths()? {
            let meta = fs::metadata(&path).map_err(|source| io_error(&path, source))?;
            let modified = meta.modified().map_err(|source| io_error(&path, source))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            entries.push(JournalEntry {
                filename,
                path,
                modified,
                size_bytes: meta.len(),
            });
        }
        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(entries)
    }

    /// Total size in bytes of every file in the journal directory.
    pub fn folder_size(&self) -> Result<u64, JournalError> {
        let mut total = 0;
        for entry in self.read_dir()? {
            let meta = entry.metadata().map_err(|source| io_error(&entry.path(), source))?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }

    /// Number of snapshot files in the journal directory.
    pub fn file_count(&self) -> Result<usize, JournalError> {
        Ok(self.snapshot_paths()?.len())
    }

    /// Deletes every snapshot and returns how many were removed. Other files
    /// in the directory are left alone.
    pub fn clear(&self) -> Result<usize, JournalError> {
        let paths = self.snapshot_paths()?;
        for path in &paths {
            fs::remove_file(path).map_err(|source| io_error(path, source))?;
        }
        tracing::warn!(dir = %self.dir.display(), removed = paths.len(), "Journal cleared.");
        Ok(paths.len())
    }

    fn read_dir(&self) -> Result<Vec<fs::DirEntry>, JournalError> {
        let reader = match fs::read_dir(&self.dir) {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(&self.dir, source)),
        };
        reader
            .map(|entry| entry.map_err(|source| io_error(&self.dir, source)))
            .collect()
    }

    fn snapshot_paths(&self) -> Result<Vec<PathBuf>, JournalError> {
        let mut paths: Vec<PathBuf> = self
            .read_dir()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> JournalError {
    JournalError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use chrono::{NaiveDate, TimeZone};
    use core_types::TradeId;

    fn sample() -> (Vec<Trade>, DailyPnl, Stats) {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let trades = vec![
            Trade::new(day, 100.0, Some(TradeId::from("1"))),
            Trade::new(day, -30.0, Some(TradeId::from(2i64))),
            Trade::new(day.succ_opt().unwrap(), 50.0, None),
        ];
        let mut daily = DailyPnl::new();
        for trade in &trades {
            daily.add(trade.date, trade.pnl);
        }
        let stats = AnalyticsEngine::new().calculate(&trades, &daily);
        (trades, daily, stats)
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn save_then_load_restores_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let (trades, daily, stats) = sample();

        let path = journal
            .save_at(noon(), Path::new("/exports/BTCUSD.csv"), &trades, &daily, &stats)
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "BTCUSD_20240107_120000.json"
        );

        let snapshot = journal.load(&path).unwrap();
        assert_eq!(snapshot.timestamp, "20240107_120000");
        assert_eq!(snapshot.original_filename, "BTCUSD.csv");
        assert_eq!(snapshot.trades, trades);
        assert_eq!(snapshot.daily_pnl, daily);
        assert_eq!(snapshot.stats, stats);
        assert_eq!(snapshot.total_trades, 3);
    }

    #[test]
    fn snapshot_json_uses_date_keys() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let (trades, daily, stats) = sample();
        let path = journal
            .save_at(noon(), Path::new("run.csv"), &trades, &daily, &stats)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["daily_pnl"]["2024-01-05"], 70.0);
        assert_eq!(value["daily_pnl"]["2024-01-06"], 50.0);
        assert_eq!(value["total_trades"], 3);
    }

    #[test]
    fn same_second_saves_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let (trades, daily, stats) = sample();

        let first = journal
            .save_at(noon(), Path::new("run.csv"), &trades, &daily, &stats)
            .unwrap();
        let second = journal
            .save_at(noon(), Path::new("run.csv"), &trades[..1], &daily, &stats)
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(journal.file_count().unwrap(), 2);
        assert_eq!(journal.load(&second).unwrap().total_trades, 1);
    }

    #[test]
    fn load_resolves_names_inside_the_journal() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let (trades, daily, stats) = sample();
        journal
            .save_at(noon(), Path::new("run.csv"), &trades, &daily, &stats)
            .unwrap();

        let snapshot = journal.load(Path::new("run_20240107_120000.json")).unwrap();
        assert_eq!(snapshot.total_trades, 3);
    }

    #[test]
    fn history_lists_snapshots_only() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let (trades, daily, stats) = sample();
        journal.save(Path::new("a.csv"), &trades, &daily, &stats).unwrap();
        journal.save(Path::new("b.csv"), &trades, &daily, &stats).unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let history = journal.history().unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.filename.ends_with(".json")));
        assert!(history.windows(2).all(|w| w[0].modified >= w[1].modified));
        assert!(journal.folder_size().unwrap() > history.iter().map(|e| e.size_bytes).sum());
    }

    #[test]
    fn clear_removes_snapshots_and_keeps_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let (trades, daily, stats) = sample();
        journal.save(Path::new("a.csv"), &trades, &daily, &stats).unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        assert_eq!(journal.clear().unwrap(), 1);
        assert_eq!(journal.file_count().unwrap(), 0);
        assert!(journal.history().unwrap().is_empty());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("trading_data").join("archive");
        let journal = Journal::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(journal.file_count().unwrap(), 0);
        assert_eq!(journal.folder_size().unwrap(), 0);
    }

    #[test]
    fn corrupt_snapshot_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(journal.load(&path), Err(JournalError::Json(_))));
        assert!(matches!(
            journal.load(&dir.path().join("absent.json")),
            Err(JournalError::Io { .. })
        ));
    }
}
