//! SQLite export of validated symbols.

use crate::domain::error::ScreenerError;
use crate::domain::symbol::SymbolRecord;
use crate::ports::config_port::ConfigPort;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use tracing::{debug, info};

/// A row of the `symbols` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSymbol {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    /// Stored as text.
    pub market_cap: Option<String>,
    pub exchange: Option<String>,
    pub is_active: bool,
}

pub struct SqliteSymbolStore {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> ScreenerError {
    ScreenerError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> ScreenerError {
    ScreenerError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteSymbolStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| ScreenerError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;
        let pool_size = config.get_int("sqlite", "pool_size", 2).max(1) as u32;
        Self::open(db_path, pool_size)
    }

    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self, ScreenerError> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;
        debug!(path = %path.as_ref().display(), "opened sqlite symbol store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, ScreenerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;
        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), ScreenerError> {
        let conn = self.pool.get().map_err(pool_error)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS symbols (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol VARCHAR(10) NOT NULL UNIQUE,
                name VARCHAR(255),
                sector VARCHAR(100),
                industry VARCHAR(100),
                country VARCHAR(100),
                market_cap VARCHAR(20),
                exchange VARCHAR(20),
                is_active BOOLEAN DEFAULT TRUE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .map_err(query_error)?;

        Ok(())
    }

    /// Insert or refresh each record by symbol. Existing rows keep their
    /// `id` and `created_at`.
    pub fn upsert_symbols(&self, records: &[SymbolRecord]) -> Result<usize, ScreenerError> {
        let mut conn = self.pool.get().map_err(pool_error)?;
        let tx = conn.transaction().map_err(query_error)?;

        for record in records {
            tx.execute(
                "INSERT INTO symbols (symbol, name, sector, industry, country, market_cap, exchange)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(symbol) DO UPDATE SET
                    name = excluded.name,
                    sector = excluded.sector,
                    industry = excluded.industry,
                    country = excluded.country,
                    market_cap = excluded.market_cap,
                    exchange = excluded.exchange,
                    is_active = TRUE,
                    updated_at = CURRENT_TIMESTAMP",
                params![
                    record.symbol,
                    record.name,
                    record.sector,
                    record.industry,
                    record.country,
                    record.market_cap.to_string(),
                    record.exchange
                ],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)?;
        info!(count = records.len(), "exported symbols");
        Ok(records.len())
    }

    pub fn list_symbols(&self) -> Result<Vec<StoredSymbol>, ScreenerError> {
        let conn = self.pool.get().map_err(pool_error)?;

        let mut stmt = conn
            .prepare(
                "SELECT symbol, name, sector, industry, country, market_cap, exchange, is_active
                 FROM symbols
                 ORDER BY symbol",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StoredSymbol {
                    symbol: row.get(0)?,
                    name: row.get(1)?,
                    sector: row.get(2)?,
                    industry: row.get(3)?,
                    country: row.get(4)?,
                    market_cap: row.get(5)?,
                    exchange: row.get(6)?,
                    is_active: row.get(7)?,
                })
            })
            .map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    pub fn count(&self) -> Result<usize, ScreenerError> {
        let conn = self.pool.get().map_err(pool_error)?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
            .map_err(query_error)?;
        Ok(n as usize)
    }
}
