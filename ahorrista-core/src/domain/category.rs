//! Expense category model

use std::fmt;

use serde::{Deserialize, Serialize};

/// A server-defined expense category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: i64,
    pub name: String,
}

impl ExpenseCategory {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Find a category by id in a loaded list
    pub fn find(categories: &[ExpenseCategory], id: i64) -> Option<&ExpenseCategory> {
        categories.iter().find(|c| c.id == id)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}
