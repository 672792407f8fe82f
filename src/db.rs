use crate::error::{ExpenseError, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Persisted expense record
/// `id` is assigned by the store and never changes or gets reused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

/// Validated input for a new expense (see `schema`)
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

/// One slice of the category pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// One bar of the monthly chart, `month` is `YYYY-MM`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// Exclusive borrow of the store connection, released on drop
pub type Session<'a> = MutexGuard<'a, Connection>;

/// Handle to the expense database.
///
/// Cloning is cheap; every clone shares the same connection. Callers hold a
/// [`Session`] only for the duration of one operation.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, PartialEq)]
enum Location<'a> {
    Memory,
    File(&'a str),
}

fn parse_location(url: &str) -> Location<'_> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    if rest.is_empty() || rest == ":memory:" {
        Location::Memory
    } else {
        Location::File(rest)
    }
}

impl Store {
    /// Open a store from a connection string.
    ///
    /// Accepts `sqlite://<path>`, a bare path, or `:memory:` /
    /// `sqlite::memory:`. The schema is created if absent.
    pub fn open(url: &str) -> Result<Self> {
        match parse_location(url) {
            Location::Memory => Self::open_in_memory(),
            Location::File(path) => {
                let conn = Connection::open(path)?;

                // Enable WAL mode for crash recovery
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.busy_timeout(Duration::from_secs(5))?;

                info!(path, "opened expense database");
                Self::from_connection(conn)
            }
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("opened in-memory expense database");
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;

        Ok(Store {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection for one operation
    pub fn session(&self) -> Result<Session<'_>> {
        self.conn
            .lock()
            .map_err(|e| ExpenseError::StoreUnavailable(e.to_string()))
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);
        CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);",
    )?;

    Ok(())
}
