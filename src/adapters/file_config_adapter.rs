//! INI file configuration adapter.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScreenerError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| ScreenerError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SCREENER_CONFIG: &str = r#"
[symbol_sources]
sp500 = true
custom_symbols = XOM, aapl , ,CVX

[validation]
min_market_cap = 1000000000
min_avg_volume = 100000
min_price_threshold = 5.0

[data_requirements]
required_fields = Open, High, Low, Close, Volume

[momentum]
min_return_3m = 0.05
min_volume_ratio = 0.8

[value]
max_pe = 20
min_dividend_yield = 0.02
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SCREENER_CONFIG).unwrap();
        assert!(adapter.get_bool("symbol_sources", "sp500", false));
        assert_eq!(
            adapter.get_int("validation", "min_market_cap", 0),
            1_000_000_000
        );
        assert_eq!(adapter.get_double("validation", "min_price_threshold", 0.0), 5.0);
        assert_eq!(adapter.get_double("value", "max_pe", 0.0), 20.0);
        assert_eq!(adapter.get_double("value", "min_dividend_yield", 0.0), 0.02);
    }

    #[test]
    fn get_list_trims_and_drops_empty_tokens() {
        let adapter = FileConfigAdapter::from_string(SCREENER_CONFIG).unwrap();
        assert_eq!(
            adapter.get_list("symbol_sources", "custom_symbols"),
            vec!["XOM", "aapl", "CVX"]
        );
        assert_eq!(
            adapter.get_list("data_requirements", "required_fields"),
            vec!["Open", "High", "Low", "Close", "Volume"]
        );
    }

    #[test]
    fn get_list_missing_key_is_empty() {
        let adapter = FileConfigAdapter::from_string("[symbol_sources]\n").unwrap();
        assert!(adapter.get_list("symbol_sources", "custom_symbols").is_empty());
        assert!(adapter.get_list("missing", "custom_symbols").is_empty());
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[output]\ndir = ./data\n").unwrap();
        assert_eq!(adapter.get_string("output", "dir"), Some("./data".to_string()));
        assert_eq!(adapter.get_string("output", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "dir"), None);
    }

    #[test]
    fn numeric_getters_fall_back_to_default() {
        let adapter = FileConfigAdapter::from_string(
            "[validation]\nlookback_days = abc\nmin_avg_volume = lots\n",
        )
        .unwrap();
        assert_eq!(adapter.get_int("validation", "lookback_days", 730), 730);
        assert_eq!(adapter.get_int("validation", "missing", 42), 42);
        assert_eq!(
            adapter.get_double("validation", "min_avg_volume", 99.9),
            99.9
        );
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[symbol_sources]\na = true\nb = Yes\nc = on\nd = 0\ne = off\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("symbol_sources", "a", false));
        assert!(adapter.get_bool("symbol_sources", "b", false));
        assert!(adapter.get_bool("symbol_sources", "c", false));
        assert!(!adapter.get_bool("symbol_sources", "d", true));
        assert!(!adapter.get_bool("symbol_sources", "e", true));
        assert!(adapter.get_bool("symbol_sources", "f", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[sqlite]\npath = /tmp/stocks.db\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/tmp/stocks.db".to_string())
        );
    }

    #[test]
    fn from_file_missing_file_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/screener.ini");
        match result {
            Err(ScreenerError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/screener.ini")
            }
            Err(other) => panic!("expected ConfigParse, got {other:?}"),
            Ok(_) => panic!("expected error"),
        }
    }
}
