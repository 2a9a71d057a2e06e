//! Core domain entities
//!
//! Plain data structures shaped after the backend's JSON. No I/O here;
//! deserialization is where wire quirks get normalized.

mod category;
mod expense;
pub mod filter;
mod goal;
pub mod result;
mod session;

pub use category::ExpenseCategory;
pub use expense::{Expense, ExpenseDetail, ExpenseSummary, NewExpense};
pub use filter::{AmountOperator, ExpenseFilter};
pub use goal::{Goal, GoalFields};
pub use session::{AuthResponse, Credentials, Session};
