//! Shared fakes for the integration tests
//!
//! `FakeBackend` implements `BackendApi` in memory, counts calls, and can be
//! told to delay, fail, or reject the token the way the HTTP adapter would.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;

use ahorrista_core::domain::result::{Error, Result};
use ahorrista_core::domain::{AuthResponse, Credentials};
use ahorrista_core::ports::{AuthFailureAction, AuthFailurePolicy, BackendApi, Notifier};
use ahorrista_core::{Expense, ExpenseCategory, ExpenseDetail, ExpenseSummary, Goal, GoalFields, NewExpense};

pub const GOOD_PASSWORD: &str = "correct-horse";

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    pub summary: Mutex<Vec<ExpenseSummary>>,
    pub created: Mutex<Vec<NewExpense>>,
    /// Per-category delay for detail fetches
    pub detail_delays: Mutex<HashMap<i64, Duration>>,
    pub summary_delay: Mutex<Option<Duration>>,
    pub create_delay: Mutex<Option<Duration>>,
    /// (status, message) returned by summary fetches
    pub summary_failure: Mutex<Option<(u16, String)>>,
    /// (status, message) returned by detail fetches
    pub detail_failure: Mutex<Option<(u16, String)>>,
    /// (status, message) returned by create
    pub create_failure: Mutex<Option<(u16, String)>>,
    /// (status, message) returned by delete
    pub delete_failure: Mutex<Option<(u16, String)>>,
    pub categories_fail: AtomicBool,
    /// When set, every authenticated call is a 401
    pub token_rejected: AtomicBool,
    policy: Mutex<Option<Arc<dyn AuthFailurePolicy>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        *backend.summary.lock().unwrap() = vec![
            summary_row(1, 1, "Comida", 2025, 6, 10),
            summary_row(2, 2, "Transporte", 2025, 6, 20),
            summary_row(3, 1, "Comida", 2025, 5, 30),
        ];
        Arc::new(backend)
    }

    /// Route 401s through a policy, like the HTTP adapter does
    pub fn set_policy(&self, policy: Arc<dyn AuthFailurePolicy>) {
        *self.policy.lock().unwrap() = Some(policy);
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn check_token(&self) -> Result<()> {
        if self.token_rejected.load(Ordering::SeqCst) {
            return Err(self.unauthorized("Token expirado"));
        }
        Ok(())
    }

    fn injected_failure(slot: &Mutex<Option<(u16, String)>>) -> Result<()> {
        match slot.lock().unwrap().clone() {
            Some((status, message)) => Err(Error::backend(status, Some(message))),
            None => Ok(()),
        }
    }

    fn unauthorized(&self, message: &str) -> Error {
        let policy = self.policy.lock().unwrap().clone();
        match policy.map(|p| p.on_auth_failure()) {
            Some(AuthFailureAction::Abort) => Error::SessionExpired,
            _ => Error::backend(401, Some(message.to_string())),
        }
    }
}

pub fn summary_row(id: i64, category_id: i64, name: &str, year: i32, month: u32, amount: i64) -> ExpenseSummary {
    ExpenseSummary {
        id,
        category: Some(ExpenseCategory::new(category_id, name)),
        year,
        month,
        amount: Decimal::from(amount),
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.record("register");
        self.login_response(credentials)
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.record("login");
        self.login_response(credentials)
    }

    async fn list_categories(&self) -> Result<Vec<ExpenseCategory>> {
        self.record("categories");
        self.check_token()?;
        if self.categories_fail.load(Ordering::SeqCst) {
            return Err(Error::transport("Unable to connect"));
        }
        Ok(vec![
            ExpenseCategory::new(1, "Comida"),
            ExpenseCategory::new(2, "Transporte"),
        ])
    }

    async fn get_summary(&self, _year: Option<i32>, _month: Option<u32>) -> Result<Vec<ExpenseSummary>> {
        self.record("summary");
        let delay = *self.summary_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_token()?;
        Self::injected_failure(&self.summary_failure)?;
        Ok(self.summary.lock().unwrap().clone())
    }

    async fn get_details(&self, year: i32, month: u32, category_id: i64) -> Result<Vec<ExpenseDetail>> {
        self.record("details");
        let delay = self.detail_delays.lock().unwrap().get(&category_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_token()?;
        Self::injected_failure(&self.detail_failure)?;
        Ok(vec![ExpenseDetail {
            id: category_id * 1000 + month as i64,
            description: Some(format!("{}-{}", year, month)),
            amount: Decimal::from(5),
            date: Some(format!("{}-{:02}-01", year, month)),
            category: Some(ExpenseCategory::new(category_id, "x")),
        }])
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        self.record("create");
        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_token()?;
        Self::injected_failure(&self.create_failure)?;
        self.created.lock().unwrap().push(expense.clone());
        Ok(Expense {
            id: Some(99),
            ..Default::default()
        })
    }

    async fn delete_expense(&self, id: i64) -> Result<()> {
        self.record("delete");
        self.check_token()?;
        Self::injected_failure(&self.delete_failure)?;
        self.summary.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }

    async fn list_goals(&self) -> Result<Vec<Goal>> {
        self.record("goals");
        self.check_token()?;
        Ok(vec![serde_json::from_value(json!({"id": 1, "targetAmount": 500}))?])
    }

    async fn create_goal(&self, fields: &GoalFields) -> Result<Goal> {
        self.record("create_goal");
        self.check_token()?;
        Ok(Goal {
            id: 2,
            fields: fields.clone(),
        })
    }

    async fn update_goal(&self, id: i64, fields: &GoalFields) -> Result<Goal> {
        self.record("update_goal");
        self.check_token()?;
        Ok(Goal {
            id,
            fields: fields.clone(),
        })
    }
}

impl FakeBackend {
    fn login_response(&self, credentials: &Credentials) -> Result<AuthResponse> {
        if credentials.password != GOOD_PASSWORD {
            return Err(self.unauthorized("Credenciales inválidas"));
        }
        Ok(serde_json::from_value(json!({"token": "fake-token", "email": credentials.email}))?)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
