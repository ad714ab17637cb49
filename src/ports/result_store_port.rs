//! Result persistence port trait.

use crate::domain::error::ScreenerError;
use crate::domain::screen_result::ScreenRun;
use crate::domain::validator::SymbolUniverse;
use std::path::PathBuf;

pub trait ResultStorePort {
    /// Persist a run under a new, timestamp-suffixed artifact. Never
    /// overwrites an existing artifact.
    fn save_run(&self, run: &ScreenRun) -> Result<PathBuf, ScreenerError>;

    /// The lexicographically last artifact saved for `screen_name`.
    fn load_latest(&self, screen_name: &str) -> Result<Option<ScreenRun>, ScreenerError>;

    fn save_universe(&self, universe: &SymbolUniverse) -> Result<PathBuf, ScreenerError>;

    fn load_universe(&self) -> Result<Option<SymbolUniverse>, ScreenerError>;

    /// Where the validated universe lives, for operator messages.
    fn universe_location(&self) -> PathBuf;
}
