//! YAML artifact store for screen runs and the validated universe.
//!
//! Runs are written as `{screen_name}_{YYYYMMDD_HHMMSS}.yaml`; a second run
//! with the same timestamp gets a `_N` suffix instead of replacing the first.

use crate::domain::error::ScreenerError;
use crate::domain::screen_result::ScreenRun;
use crate::domain::validator::SymbolUniverse;
use crate::ports::result_store_port::ResultStorePort;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const UNIVERSE_FILE: &str = "validated_symbols.yaml";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

pub struct YamlResultStore {
    dir: PathBuf,
}

impl YamlResultStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), ScreenerError> {
        fs::create_dir_all(&self.dir).map_err(|e| storage(&self.dir, e))
    }

    /// Artifacts of `screen_name`, oldest first.
    pub fn list_runs(&self, screen_name: &str) -> Result<Vec<PathBuf>, ScreenerError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage(&self.dir, e)),
        };

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| storage(&self.dir, e))?;
            let name = entry.file_name();
            if let Some(key) = run_sort_key(screen_name, &name.to_string_lossy()) {
                runs.push((key, entry.path()));
            }
        }

        runs.sort();
        Ok(runs.into_iter().map(|(_, path)| path).collect())
    }
}

fn storage(path: &Path, reason: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::Storage {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// `(timestamp, counter)` when `file_name` is an artifact of `screen_name`.
fn run_sort_key(screen_name: &str, file_name: &str) -> Option<(String, u32)> {
    let rest = file_name
        .strip_prefix(screen_name)?
        .strip_prefix('_')?
        .strip_suffix(".yaml")?;

    let (timestamp, counter) = match rest.get(TIMESTAMP_LEN..) {
        Some("") => (rest, 0),
        Some(tail) => {
            let n = tail.strip_prefix('_')?;
            if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            (&rest[..TIMESTAMP_LEN], n.parse().ok()?)
        }
        None => return None,
    };

    let well_formed = timestamp.bytes().enumerate().all(|(i, b)| {
        if i == 8 {
            b == b'_'
        } else {
            b.is_ascii_digit()
        }
    });
    well_formed.then(|| (timestamp.to_string(), counter))
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ScreenerError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage(path, e)),
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| storage(path, e))
}

fn to_yaml<T: Serialize>(path: &Path, value: &T) -> Result<String, ScreenerError> {
    serde_yaml::to_string(value).map_err(|e| storage(path, e))
}

/// Writes a freshly created artifact, removing it again on failure so a
/// truncated file never becomes the latest run.
fn write_artifact(mut out: impl Write, path: &Path, bytes: &[u8]) -> Result<(), ScreenerError> {
    if let Err(e) = out.write_all(bytes).and_then(|_| out.flush()) {
        if let Err(remove_err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove_err, "failed to remove partial artifact");
        }
        return Err(storage(path, e));
    }
    Ok(())
}

impl ResultStorePort for YamlResultStore {
    fn save_run(&self, run: &ScreenRun) -> Result<PathBuf, ScreenerError> {
        self.ensure_dir()?;
        let stem = format!(
            "{}_{}",
            run.screen_name,
            run.screen_date.format(TIMESTAMP_FORMAT)
        );
        let yaml = to_yaml(&self.dir, run)?;

        let mut counter = 0u32;
        loop {
            let path = if counter == 0 {
                self.dir.join(format!("{}.yaml", stem))
            } else {
                self.dir.join(format!("{}_{}.yaml", stem, counter))
            };

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_artifact(file, &path, yaml.as_bytes())?;
                    info!(path = %path.display(), results = run.total_results, "saved screen run");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "artifact exists, trying next suffix");
                    counter += 1;
                }
                Err(e) => return Err(storage(&path, e)),
            }
        }
    }

    fn load_latest(&self, screen_name: &str) -> Result<Option<ScreenRun>, ScreenerError> {
        match self.list_runs(screen_name)?.last() {
            Some(path) => {
                debug!(path = %path.display(), "loading latest run");
                read_yaml(path)
            }
            None => Ok(None),
        }
    }

    fn save_universe(&self, universe: &SymbolUniverse) -> Result<PathBuf, ScreenerError> {
        self.ensure_dir()?;
        let path = self.universe_location();
        let yaml = to_yaml(&path, universe)?;
        fs::write(&path, yaml).map_err(|e| storage(&path, e))?;
        info!(path = %path.display(), valid = universe.summary.valid_count, "saved validated universe");
        Ok(path)
    }

    fn load_universe(&self) -> Result<Option<SymbolUniverse>, ScreenerError> {
        read_yaml(&self.universe_location())
    }

    fn universe_location(&self) -> PathBuf {
        self.dir.join(UNIVERSE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screen_result::ScreenResult;
    use crate::domain::symbol::SymbolRecord;
    use crate::domain::validator::UniverseSummary;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn run(name: &str, when: NaiveDateTime, symbols: &[&str]) -> ScreenRun {
        let results = symbols
            .iter()
            .map(|s| ScreenResult::custom(&SymbolRecord::bare(*s), when.date()))
            .collect();
        ScreenRun::new(name, when, results)
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_no_artifact() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());
        let path = dir.path().join("momentum_screen_20240603_143005.yaml");
        fs::write(&path, "").unwrap();

        let err = write_artifact(FullDisk, &path, b"screen_name: momentum_screen\n").unwrap_err();
        assert!(matches!(err, ScreenerError::Storage { .. }));
        assert!(!path.exists());
        assert_eq!(store.load_latest("momentum_screen").unwrap(), None);
    }

    #[test]
    fn save_run_uses_timestamped_name() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().join("out"));

        let path = store
            .save_run(&run("momentum_screen", at(14, 30, 5), &["XOM"]))
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "momentum_screen_20240603_143005.yaml"
        );
        let content = fs::read_to_string(&path).unwrap();
        let keys: Vec<&str> = content
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(keys, vec!["screen_name", "screen_date", "total_results", "results"]);
    }

    #[test]
    fn save_run_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());
        let when = at(9, 0, 0);

        let first = store.save_run(&run("momentum_screen", when, &["AAPL"])).unwrap();
        let second = store.save_run(&run("momentum_screen", when, &["XOM"])).unwrap();
        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_string_lossy(),
            "momentum_screen_20240603_090000_1.yaml"
        );

        let latest = store.load_latest("momentum_screen").unwrap().unwrap();
        assert_eq!(latest.symbols(), vec!["XOM"]);
    }

    #[test]
    fn counter_orders_numerically() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());
        let when = at(9, 0, 0);
        for i in 0..12 {
            let symbol = format!("S{i}");
            store
                .save_run(&run("momentum_screen", when, &[symbol.as_str()]))
                .unwrap();
        }
        let latest = store.load_latest("momentum_screen").unwrap().unwrap();
        assert_eq!(latest.symbols(), vec!["S11"]);
    }

    #[test]
    fn load_latest_picks_newest_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());

        store.save_run(&run("realistic_value_screen", at(10, 0, 0), &["KO"])).unwrap();
        store.save_run(&run("realistic_value_screen", at(16, 0, 0), &["CVX"])).unwrap();
        store.save_run(&run("realistic_value_screen", at(12, 0, 0), &["PFE"])).unwrap();

        let latest = store.load_latest("realistic_value_screen").unwrap().unwrap();
        assert_eq!(latest.symbols(), vec!["CVX"]);
        assert_eq!(latest.screen_date, at(16, 0, 0));
    }

    #[test]
    fn load_latest_ignores_other_screens_and_derived_files() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());

        store.save_run(&run("realistic_value_screen", at(10, 0, 0), &["KO"])).unwrap();
        fs::write(dir.path().join("value_screen_detailed.yaml"), "garbage: [").unwrap();
        fs::write(dir.path().join("value_screen_symbols.txt"), "KO\n").unwrap();

        assert!(store.load_latest("value_screen").unwrap().is_none());
    }

    #[test]
    fn load_latest_empty_or_missing_dir() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().join("never_created"));
        assert!(store.load_latest("momentum_screen").unwrap().is_none());
        assert!(store.load_universe().unwrap().is_none());
    }

    #[test]
    fn universe_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());
        let universe = SymbolUniverse {
            valid_symbols: vec![SymbolRecord::bare("AAPL")],
            invalid_symbols: vec![],
            summary: UniverseSummary {
                total_tested: 1,
                valid_count: 1,
                invalid_count: 0,
                validation_date: at(8, 0, 0),
            },
        };

        let path = store.save_universe(&universe).unwrap();
        assert_eq!(path, dir.path().join(UNIVERSE_FILE));
        assert_eq!(store.load_universe().unwrap(), Some(universe));
    }

    #[test]
    fn corrupt_universe_is_storage_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(UNIVERSE_FILE), "valid_symbols: [").unwrap();
        let store = YamlResultStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.load_universe(),
            Err(ScreenerError::Storage { .. })
        ));
    }

    #[test]
    fn sort_key_rejects_lookalikes() {
        assert_eq!(
            run_sort_key("momentum_screen", "momentum_screen_20240603_090000_3.yaml"),
            Some(("20240603_090000".to_string(), 3))
        );
        assert_eq!(run_sort_key("momentum_screen", "momentum_screen_symbols.txt"), None);
        assert_eq!(run_sort_key("momentum_screen", "momentum_screen_2024.yaml"), None);
        assert_eq!(
            run_sort_key("momentum_screen", "momentum_screen_20240603_090000_.yaml"),
            None
        );
    }
}
