//! Workspace controller - the logged-in expense screen
//!
//! Holds everything the workspace shows: categories, the monthly summary,
//! the drill-down detail panel, the add-expense form, the active filter and
//! the inline error. Front ends call the async operations and render
//! `view()` snapshots.
//!
//! Each fetch takes a ticket from a generation counter. A response is only
//! applied if its ticket is still current, so a slow answer can never
//! overwrite a newer one or reopen a panel the user already closed.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Expense, ExpenseCategory, ExpenseDetail, ExpenseFilter, ExpenseSummary, NewExpense,
};
use crate::ports::{BackendApi, Notifier};

const CATEGORIES_ERROR: &str = "Error loading categories";
const INVALID_DETAIL_PARAMS: &str = "Invalid parameters for expense details";
const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

/// Identity of one drill-down: category, year and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailKey {
    pub category_id: i64,
    pub year: i32,
    pub month: u32,
}

impl DetailKey {
    pub fn new(category_id: i64, year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(INVALID_DETAIL_PARAMS));
        }
        Ok(Self {
            category_id,
            year,
            month,
        })
    }

    /// Parse from raw text fields
    pub fn parse(category_id: &str, year: &str, month: &str) -> Result<Self> {
        let invalid = |_| Error::validation(INVALID_DETAIL_PARAMS);
        Self::new(
            category_id.trim().parse().map_err(invalid)?,
            year.trim().parse().map_err(invalid)?,
            month.trim().parse().map_err(invalid)?,
        )
    }

    /// Key for a summary row; rows without a category cannot be drilled into
    pub fn for_summary(row: &ExpenseSummary) -> Result<Self> {
        let category_id = row
            .category_id()
            .ok_or_else(|| Error::validation(INVALID_DETAIL_PARAMS))?;
        Self::new(category_id, row.year, row.month)
    }
}

impl fmt::Display for DetailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.category_id, self.year, self.month)
    }
}

/// Drill-down panel state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DetailPanel {
    #[default]
    Closed,
    Loading {
        key: DetailKey,
    },
    Open {
        key: DetailKey,
        title: String,
        rows: Vec<ExpenseDetail>,
    },
}

impl DetailPanel {
    pub fn key(&self) -> Option<DetailKey> {
        match self {
            DetailPanel::Closed => None,
            DetailPanel::Loading { key } | DetailPanel::Open { key, .. } => Some(*key),
        }
    }
}

/// Raw text of the add-expense form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseForm {
    pub category_id: String,
    pub year: String,
    pub month: String,
    pub amount: String,
}

impl ExpenseForm {
    /// Empty category and amount, current year and month
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self {
            category_id: String::new(),
            year: today.year().to_string(),
            month: today.month().to_string(),
            amount: String::new(),
        }
    }

    /// Validate against the loaded categories
    ///
    /// The category is checked first and must be one the backend gave us.
    pub fn to_new_expense(&self, categories: &[ExpenseCategory]) -> Result<NewExpense> {
        let category = self
            .category_id
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| ExpenseCategory::find(categories, id))
            .cloned()
            .ok_or_else(|| Error::validation("Select a valid category"))?;

        let year = self
            .year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
            .ok_or_else(|| {
                Error::validation(format!("Year must be between {} and {}", MIN_YEAR, MAX_YEAR))
            })?;

        let month = self
            .month
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| Error::validation("Month must be between 1 and 12"))?;

        let amount = self
            .amount
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|a| !a.is_sign_negative())
            .ok_or_else(|| Error::validation("Amount must be a number greater than or equal to 0"))?;

        Ok(NewExpense {
            category,
            year,
            month,
            amount,
        })
    }
}

/// Snapshot of everything the workspace renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceView {
    pub categories: Vec<ExpenseCategory>,
    pub summary_visible: bool,
    pub summary_loading: bool,
    /// Last fetched summary, unfiltered
    pub summary: Option<Vec<ExpenseSummary>>,
    pub filter: Option<ExpenseFilter>,
    pub detail: DetailPanel,
    pub form: ExpenseForm,
    pub adding: bool,
    pub error: Option<String>,
}

impl WorkspaceView {
    /// Summary rows as shown: filtered when a filter is active
    pub fn displayed_summary(&self) -> Option<Vec<ExpenseSummary>> {
        let rows = self.summary.as_ref()?;
        Some(match &self.filter {
            Some(filter) => filter.apply(rows),
            None => rows.clone(),
        })
    }
}

struct Inner {
    view: WorkspaceView,
    summary_ticket: u64,
    detail_ticket: u64,
}

impl Inner {
    fn set_error(&mut self, error: &Error) {
        if !error.is_session_expired() {
            self.view.error = Some(error.user_message());
        }
    }

    fn close_detail(&mut self) {
        self.detail_ticket += 1;
        self.view.detail = DetailPanel::Closed;
        self.view.summary_visible = self.view.summary.is_some();
    }
}

/// Clears the busy flag however the submit ends, cancellation included
struct AddingGuard<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for AddingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.view.adding = false;
    }
}

pub struct WorkspaceController {
    api: Arc<dyn BackendApi>,
    notifier: Arc<dyn Notifier>,
    today: NaiveDate,
    inner: Mutex<Inner>,
}

impl WorkspaceController {
    pub fn new(api: Arc<dyn BackendApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_today(api, notifier, Local::now().date_naive())
    }

    /// Controller whose form defaults come from the given date
    pub fn with_today(
        api: Arc<dyn BackendApi>,
        notifier: Arc<dyn Notifier>,
        today: NaiveDate,
    ) -> Self {
        let view = WorkspaceView {
            categories: Vec::new(),
            summary_visible: false,
            summary_loading: false,
            summary: None,
            filter: None,
            detail: DetailPanel::Closed,
            form: ExpenseForm::with_defaults(today),
            adding: false,
            error: None,
        };
        Self {
            api,
            notifier,
            today,
            inner: Mutex::new(Inner {
                view,
                summary_ticket: 0,
                detail_ticket: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn view(&self) -> WorkspaceView {
        self.state().view.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state().view.error.clone()
    }

    pub fn dismiss_error(&self) {
        self.state().view.error = None;
    }

    /// First load of the screen
    pub async fn mount(&self) -> Result<()> {
        self.load_categories().await
    }

    pub async fn load_categories(&self) -> Result<()> {
        let result = self.api.list_categories().await;
        let mut inner = self.state();
        match result {
            Ok(categories) => {
                inner.view.categories = categories;
                Ok(())
            }
            Err(e) => {
                if !e.is_session_expired() {
                    inner.view.error = Some(CATEGORIES_ERROR.to_string());
                }
                Err(e)
            }
        }
    }

    /// Show the summary (fetching it) or hide it (discarding it)
    pub async fn toggle_summary(&self) -> Result<()> {
        {
            let mut inner = self.state();
            if inner.view.summary_visible {
                inner.summary_ticket += 1;
                inner.view.summary_loading = false;
                inner.view.summary = None;
                inner.close_detail();
                return Ok(());
            }
            inner.view.summary_visible = true;
        }
        self.refresh_summary().await
    }

    /// Fetch the summary; the detail panel is closed first
    pub async fn refresh_summary(&self) -> Result<()> {
        let ticket = {
            let mut inner = self.state();
            inner.summary_ticket += 1;
            inner.detail_ticket += 1;
            inner.view.detail = DetailPanel::Closed;
            inner.view.summary = None;
            inner.view.summary_loading = true;
            inner.view.error = None;
            inner.summary_ticket
        };

        let result = self.api.get_summary(None, None).await;

        let mut inner = self.state();
        if inner.summary_ticket != ticket {
            return Ok(());
        }
        inner.view.summary_loading = false;
        match result {
            Ok(rows) => {
                inner.view.summary = Some(rows);
                Ok(())
            }
            Err(e) => {
                inner.set_error(&e);
                Err(e)
            }
        }
    }

    /// Drill into a summary row, or close it if it is already selected
    pub async fn toggle_detail_for(&self, row: &ExpenseSummary) -> Result<()> {
        let key = match DetailKey::for_summary(row) {
            Ok(key) => key,
            Err(e) => {
                self.state().set_error(&e);
                return Err(e);
            }
        };
        let title = detail_title(row.category_name(), key);
        self.toggle_detail_key(key, title).await
    }

    /// Drill-down from raw fields
    pub async fn toggle_detail(&self, category_id: &str, year: &str, month: &str) -> Result<()> {
        let key = match DetailKey::parse(category_id, year, month) {
            Ok(key) => key,
            Err(e) => {
                self.state().set_error(&e);
                return Err(e);
            }
        };
        let title = {
            let inner = self.state();
            let name = ExpenseCategory::find(&inner.view.categories, key.category_id)
                .map(|c| c.name.clone());
            detail_title(name.as_deref(), key)
        };
        self.toggle_detail_key(key, title).await
    }

    async fn toggle_detail_key(&self, key: DetailKey, title: String) -> Result<()> {
        let ticket = {
            let mut inner = self.state();
            if inner.view.detail.key() == Some(key) {
                // Reselecting closes, including while still loading
                inner.close_detail();
                return Ok(());
            }
            inner.detail_ticket += 1;
            inner.view.detail = DetailPanel::Loading { key };
            inner.view.summary_visible = false;
            inner.view.error = None;
            inner.detail_ticket
        };

        let result = self
            .api
            .get_details(key.year, key.month, key.category_id)
            .await;

        let mut inner = self.state();
        if inner.detail_ticket != ticket {
            return Ok(());
        }
        match result {
            Ok(rows) => {
                inner.view.detail = DetailPanel::Open { key, title, rows };
                Ok(())
            }
            Err(e) => {
                inner.close_detail();
                inner.set_error(&e);
                Err(e)
            }
        }
    }

    pub fn close_detail(&self) {
        self.state().close_detail();
    }

    pub fn form(&self) -> ExpenseForm {
        self.state().view.form.clone()
    }

    pub fn edit_form<F: FnOnce(&mut ExpenseForm)>(&self, edit: F) {
        edit(&mut self.state().view.form);
    }

    /// Submit the add-expense form
    ///
    /// Rejected with `Error::Busy` while a previous submit is in flight.
    /// On success the form is reset and the summary refetched; a failed
    /// refetch only shows up as the inline error.
    pub async fn submit_expense(&self) -> Result<Expense> {
        let expense = {
            let mut inner = self.state();
            if inner.view.adding {
                return Err(Error::Busy);
            }
            inner.view.error = None;
            match inner.view.form.to_new_expense(&inner.view.categories) {
                Ok(expense) => {
                    inner.view.adding = true;
                    expense
                }
                Err(e) => {
                    inner.set_error(&e);
                    return Err(e);
                }
            }
        };

        let created = {
            let _busy = AddingGuard { inner: &self.inner };
            self.api.create_expense(&expense).await
        };

        match created {
            Ok(created) => {
                self.state().view.form = ExpenseForm::with_defaults(self.today);
                if let Err(e) = self.refresh_summary().await {
                    if e.is_session_expired() {
                        return Err(e);
                    }
                }
                Ok(created)
            }
            Err(e) => {
                self.state().set_error(&e);
                Err(e)
            }
        }
    }

    /// Delete an expense by id
    ///
    /// A failure keeps the summary as it was, shows the message inline and
    /// raises a blocking alert.
    pub async fn delete_expense(&self, id: i64) -> Result<()> {
        self.state().view.error = None;
        match self.api.delete_expense(id).await {
            Ok(()) => {
                if let Err(e) = self.refresh_summary().await {
                    if e.is_session_expired() {
                        return Err(e);
                    }
                }
                Ok(())
            }
            Err(e) => {
                if !e.is_session_expired() {
                    let message = e.user_message();
                    self.state().view.error = Some(message.clone());
                    self.notifier.alert(&message);
                }
                Err(e)
            }
        }
    }

    /// Filter the summary client-side until cleared
    pub fn apply_filter(&self, filter: ExpenseFilter) {
        self.state().view.filter = Some(filter);
    }

    pub fn clear_filter(&self) {
        self.state().view.filter = None;
    }

    pub fn displayed_summary(&self) -> Option<Vec<ExpenseSummary>> {
        self.state().view.displayed_summary()
    }
}

fn detail_title(category_name: Option<&str>, key: DetailKey) -> String {
    let name = category_name
        .map(str::to_string)
        .unwrap_or_else(|| format!("Category {}", key.category_id));
    format!("{} - {}/{}", name, key.month, key.year)
}
