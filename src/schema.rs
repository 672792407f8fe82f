// 📐 Shape Layer - Schema Validation
// Turns untrusted payloads into validated expense inputs.
// Every violation is reported with the name of the offending field.

use crate::db::NewExpense;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CATEGORY_LEN: usize = 100;

/// Largest single amount; keeps `SUM` over any realistic table finite
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Wire and storage format for expense dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// All violations found in one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        ValidationErrors(vec![ValidationError::new(field, message)])
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(ValidationError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the offending fields, in check order
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// CREATE PAYLOAD
// ============================================================================

/// Raw body of a create request.
///
/// Fields are loosely typed so that a wrong type is reported against the
/// field it appears in instead of failing deserialization as a whole.
/// A JSON `null` is treated the same as an absent field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePayload {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

impl ExpensePayload {
    /// Validate every field, collecting all violations
    pub fn validate(&self) -> Result<NewExpense, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = text_field(self.title.as_ref(), "title", &mut errors)
            .and_then(|t| check_text("title", t, MAX_TITLE_LEN, &mut errors));

        let amount = match self.amount.as_ref() {
            None => {
                errors.push("amount", "Required field is missing");
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(amount) => check_amount(amount, &mut errors),
                None => {
                    errors.push("amount", "Must be a finite number");
                    None
                }
            },
            Some(_) => {
                errors.push("amount", "Must be a number");
                None
            }
        };

        let category = text_field(self.category.as_ref(), "category", &mut errors)
            .and_then(|c| check_text("category", c, MAX_CATEGORY_LEN, &mut errors));

        let date = text_field(self.date.as_ref(), "date", &mut errors)
            .and_then(|d| check_date(d, &mut errors));

        match (title, amount, category, date) {
            (Some(title), Some(amount), Some(category), Some(date)) => Ok(NewExpense {
                title,
                amount,
                category,
                date,
            }),
            _ => Err(errors),
        }
    }
}

impl NewExpense {
    /// Validate already-typed values (CLI input) with the same rules as payloads
    pub fn parse(
        title: &str,
        amount: f64,
        category: &str,
        date: &str,
    ) -> Result<NewExpense, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = check_text("title", title, MAX_TITLE_LEN, &mut errors);
        let amount = check_amount(amount, &mut errors);
        let category = check_text("category", category, MAX_CATEGORY_LEN, &mut errors);
        let date = check_date(date, &mut errors);

        match (title, amount, category, date) {
            (Some(title), Some(amount), Some(category), Some(date)) => Ok(NewExpense {
                title,
                amount,
                category,
                date,
            }),
            _ => Err(errors),
        }
    }
}

/// Validate the `{expense_id}` path segment of a delete request
pub fn parse_expense_id(raw: &str) -> Result<i64, ValidationErrors> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(ValidationErrors::single(
            "expense_id",
            "Must be a positive integer",
        )),
        Err(_) => Err(ValidationErrors::single(
            "expense_id",
            format!("Must be an integer, got {:?}", raw),
        )),
    }
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

fn text_field<'a>(
    value: Option<&'a Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match value {
        None => {
            errors.push(field, "Required field is missing");
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.push(field, "Must be a string");
            None
        }
    }
}

fn check_text(
    field: &str,
    value: &str,
    max_len: usize,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        errors.push(field, "Required field is empty");
        return None;
    }

    let len = trimmed.chars().count();
    if len > max_len {
        errors.push(
            field,
            format!("Must be at most {} characters, got {}", max_len, len),
        );
        return None;
    }

    Some(trimmed.to_string())
}

fn check_amount(amount: f64, errors: &mut ValidationErrors) -> Option<f64> {
    if !amount.is_finite() {
        errors.push("amount", "Must be a finite number");
        return None;
    }

    if amount <= 0.0 {
        errors.push(
            "amount",
            format!("Must be greater than 0, got {}", amount),
        );
        return None;
    }

    if amount > MAX_AMOUNT {
        errors.push(
            "amount",
            format!("Must be at most {}, got {}", MAX_AMOUNT, amount),
        );
        return None;
    }

    Some(amount)
}

/// Exactly `YYYY-MM-DD`: a four digit year, so SQLite date functions accept it
fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn check_date(value: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let parsed = if has_date_shape(trimmed) {
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
    } else {
        None
    };

    match parsed {
        Some(date) => Some(date),
        None => {
            errors.push(
                "date",
                format!("Must be a calendar date in YYYY-MM-DD format, got {:?}", value),
            );
            None
        }
    }
}
