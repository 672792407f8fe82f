// 🗄️ Expense Repository - the only component that queries the store
// Each operation borrows one session and releases it before returning

use crate::db::{CategoryTotal, Expense, MonthlyTotal, NewExpense, Store};
use crate::error::{ExpenseError, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

const EXPENSE_COLUMNS: &str = "id, title, amount, category, date";

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
    })
}

#[derive(Clone)]
pub struct ExpenseRepository {
    store: Store,
}

impl ExpenseRepository {
    pub fn new(store: Store) -> Self {
        ExpenseRepository { store }
    }

    /// Insert a validated expense; the store assigns the id
    pub fn create(&self, input: NewExpense) -> Result<Expense> {
        let conn = self.store.session()?;

        let expense = conn.query_row(
            &format!(
                "INSERT INTO expenses (title, amount, category, date)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {EXPENSE_COLUMNS}"
            ),
            params![input.title, input.amount, input.category, input.date],
            row_to_expense,
        )?;

        info!(id = expense.id, category = %expense.category, "expense created");
        Ok(expense)
    }

    /// All expenses in creation order
    pub fn list(&self) -> Result<Vec<Expense>> {
        let conn = self.store.session()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY id"
        ))?;
        let expenses = stmt
            .query_map([], row_to_expense)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = expenses.len(), "listed expenses");
        Ok(expenses)
    }

    /// Remove an expense and return the removed record.
    ///
    /// A missing id is reported as `NotFound`; the store is left unchanged.
    pub fn delete(&self, id: i64) -> Result<Expense> {
        let conn = self.store.session()?;

        let removed = conn
            .query_row(
                &format!("DELETE FROM expenses WHERE id = ?1 RETURNING {EXPENSE_COLUMNS}"),
                params![id],
                row_to_expense,
            )
            .optional()?;

        match removed {
            Some(expense) => {
                info!(id, "expense deleted");
                Ok(expense)
            }
            None => Err(ExpenseError::NotFound(id)),
        }
    }

    /// Total amount per category, ordered by category name
    pub fn category_summary(&self) -> Result<Vec<CategoryTotal>> {
        let conn = self.store.session()?;

        let mut stmt = conn.prepare(
            "SELECT category, SUM(amount) AS total
             FROM expenses
             GROUP BY category
             ORDER BY category",
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(groups = totals.len(), "computed category summary");
        Ok(totals)
    }

    /// Total amount per calendar month (`YYYY-MM`), ordered by month
    pub fn monthly_summary(&self) -> Result<Vec<MonthlyTotal>> {
        let conn = self.store.session()?;

        let mut stmt = conn.prepare(
            "SELECT strftime('%Y-%m', date) AS month, SUM(amount) AS total
             FROM expenses
             GROUP BY month
             ORDER BY month",
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(MonthlyTotal {
                    month: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(groups = totals.len(), "computed monthly summary");
        Ok(totals)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.store.session()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;

        Ok(count)
    }
}
