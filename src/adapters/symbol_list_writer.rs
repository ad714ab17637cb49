//! Plain-text and detailed YAML symbol list files.

use crate::domain::error::ScreenerError;
use crate::domain::projector::DetailedSymbolList;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub struct SymbolListWriter {
    dir: PathBuf,
}

impl SymbolListWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn write(&self, file_name: &str, content: &str) -> Result<PathBuf, ScreenerError> {
        let path = self.dir.join(file_name);
        fs::write(&path, content).map_err(|e| ScreenerError::Storage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

/// `# {display} - {n} symbols`, `# Generated: ...`, a blank line, then one
/// symbol per line.
pub fn render_symbol_list(display_name: &str, symbols: &[String], generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} - {} symbols", display_name, symbols.len());
    let _ = writeln!(out, "# Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    out.push('\n');
    for symbol in symbols {
        out.push_str(symbol);
        out.push('\n');
    }
    out
}

impl ReportPort for SymbolListWriter {
    fn write_symbol_lists(
        &self,
        screen_type: &str,
        symbols: &[String],
        detailed: &DetailedSymbolList,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<PathBuf>, ScreenerError> {
        fs::create_dir_all(&self.dir).map_err(|e| ScreenerError::Storage {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let text = render_symbol_list(&detailed.screen_name, symbols, generated_at);
        let simple = self.write(&format!("{}_symbols.txt", screen_type), &text)?;

        let yaml = serde_yaml::to_string(detailed).map_err(|e| ScreenerError::Storage {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let detailed_path = self.write(&format!("{}_detailed.yaml", screen_type), &yaml)?;

        info!(screen_type, symbols = symbols.len(), "wrote symbol lists");
        Ok(vec![simple, detailed_path])
    }
}
