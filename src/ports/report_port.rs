//! Symbol-list report port trait.

use crate::domain::error::ScreenerError;
use crate::domain::projector::DetailedSymbolList;
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Port for writing derived symbol lists.
pub trait ReportPort {
    /// Write the simple list and the detailed list for one screen type,
    /// returning the paths written.
    fn write_symbol_lists(
        &self,
        screen_type: &str,
        symbols: &[String],
        detailed: &DetailedSymbolList,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<PathBuf>, ScreenerError>;
}
