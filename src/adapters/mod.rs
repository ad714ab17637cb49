//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod symbol_list_writer;
pub mod throttled_adapter;
pub mod yaml_result_store;
