//! Backend port - one method per REST operation

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{
    AuthResponse, Credentials, Expense, ExpenseCategory, ExpenseDetail, ExpenseSummary, Goal,
    GoalFields, NewExpense,
};

/// The remote backend as seen by the client
///
/// Each method performs exactly one request. No retries and no validation
/// beyond shaping bodies; errors carry the backend's message when it sent
/// one.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // === Authentication ===

    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    // === Categories ===

    async fn list_categories(&self) -> Result<Vec<ExpenseCategory>>;

    // === Expenses ===

    /// Summary rows, optionally narrowed server-side to a year/month
    async fn get_summary(&self, year: Option<i32>, month: Option<u32>)
        -> Result<Vec<ExpenseSummary>>;

    async fn get_details(&self, year: i32, month: u32, category_id: i64)
        -> Result<Vec<ExpenseDetail>>;

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense>;

    async fn delete_expense(&self, id: i64) -> Result<()>;

    // === Goals ===

    async fn list_goals(&self) -> Result<Vec<Goal>>;

    async fn create_goal(&self, goal: &GoalFields) -> Result<Goal>;

    async fn update_goal(&self, id: i64, changes: &GoalFields) -> Result<Goal>;
}
