//! Core domain types and screening logic.

pub mod config_validation;
pub mod error;
pub mod momentum;
pub mod price_history;
pub mod projector;
pub mod rule_set;
pub mod screen_result;
pub mod screening;
pub mod statistics;
pub mod symbol;
pub mod validator;
