//! Client-side filter over a fetched summary list

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::expense::ExpenseSummary;
use super::result::{Error, Result};

/// How the amount filter compares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountOperator {
    #[default]
    Eq,
    Gte,
    Lte,
}

impl AmountOperator {
    fn accepts(self, value: Decimal, bound: Decimal) -> bool {
        match self {
            AmountOperator::Eq => value == bound,
            AmountOperator::Gte => value >= bound,
            AmountOperator::Lte => value <= bound,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AmountOperator::Eq => "=",
            AmountOperator::Gte => "≥",
            AmountOperator::Lte => "≤",
        }
    }
}

impl FromStr for AmountOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "eq" | "=" | "==" => Ok(AmountOperator::Eq),
            "gte" | ">=" | "≥" => Ok(AmountOperator::Gte),
            "lte" | "<=" | "≤" => Ok(AmountOperator::Lte),
            other => Err(Error::validation(format!(
                "Unknown amount operator '{}'. Use eq, gte or lte",
                other
            ))),
        }
    }
}

impl fmt::Display for AmountOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AmountOperator::Eq => "eq",
            AmountOperator::Gte => "gte",
            AmountOperator::Lte => "lte",
        };
        f.write_str(name)
    }
}

/// Predicate applied to the summary list; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub category_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub amount: Option<Decimal>,
    pub amount_op: AmountOperator,
}

impl ExpenseFilter {
    /// Build a filter from raw form fields; blank fields are unset
    pub fn from_fields(
        category_id: &str,
        year: &str,
        month: &str,
        amount: &str,
        amount_op: &str,
    ) -> Result<Self> {
        Ok(Self {
            category_id: parse_optional(category_id, "category")?,
            year: parse_optional(year, "year")?,
            month: parse_optional(month, "month")?,
            amount: parse_optional(amount, "amount")?,
            amount_op: amount_op.parse()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.year.is_none()
            && self.month.is_none()
            && self.amount.is_none()
    }

    pub fn matches(&self, expense: &ExpenseSummary) -> bool {
        if let Some(category_id) = self.category_id {
            if expense.category_id() != Some(category_id) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if expense.year != year {
                return false;
            }
        }
        if let Some(month) = self.month {
            if expense.month != month {
                return false;
            }
        }
        if let Some(bound) = self.amount {
            if !self.amount_op.accepts(expense.amount, bound) {
                return false;
            }
        }
        true
    }

    /// Derived view; the input is left untouched
    pub fn apply(&self, expenses: &[ExpenseSummary]) -> Vec<ExpenseSummary> {
        expenses.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

fn parse_optional<T: FromStr>(raw: &str, field: &str) -> Result<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| Error::validation(format!("Invalid {} filter: {}", field, raw)))
}
