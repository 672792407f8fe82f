// Expense Tracker - Core Library
// Exposes the store, repository and validation for the CLI, API server, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod repository;
pub mod schema;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{Config, ServerArgs};
pub use db::{setup_database, CategoryTotal, Expense, MonthlyTotal, NewExpense, Session, Store};
pub use error::{ExpenseError, Result};
pub use logging::init_logging;
pub use repository::ExpenseRepository;
pub use schema::{parse_expense_id, ExpensePayload, ValidationError, ValidationErrors};

#[cfg(feature = "server")]
pub use api::router;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
