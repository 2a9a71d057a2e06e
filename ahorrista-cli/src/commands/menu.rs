//! Menu command - the interactive app
//!
//! Runs the login, register and workspace views in one process. The view on
//! screen is whatever the navigator says; a 401 anywhere moves it to login.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password, Select};

use ahorrista_core::services::{DetailPanel, Route, WorkspaceController, WorkspaceView};
use ahorrista_core::{AhorristaContext, EntryPoint, ExpenseFilter, LogEvent};

use super::expenses::{print_details, print_summary};
use super::goals::print_goals;
use super::{get_interactive_context, get_logger, log_command, log_event, log_route, Logger};
use crate::output::{self, format_amount, with_spinner};

enum Next {
    Continue,
    Quit,
}

pub async fn run() -> Result<()> {
    let logger = get_logger(EntryPoint::Interactive);
    log_command(&logger, "menu");

    let ctx = get_interactive_context(&logger)?;

    loop {
        let route = ctx.open(ctx.navigator.current());
        log_route(&logger, route);

        let next = match route {
            Route::Login => login_view(&ctx, &logger).await?,
            Route::Register => register_view(&ctx, &logger).await?,
            Route::Workspace => workspace_view(&ctx, &logger).await?,
        };
        if let Next::Quit = next {
            break;
        }
    }

    Ok(())
}

async fn login_view(ctx: &AhorristaContext, logger: &Logger) -> Result<Next> {
    println!();
    println!("{}", "Ahorrista - Log in".bold());

    let choice = Select::new()
        .items(&["Log in", "Create an account", "Quit"])
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let email: String = Input::new().with_prompt("Email").interact_text()?;
            let password = Password::new().with_prompt("Password").interact()?;
            let result =
                with_spinner("Logging in...", ctx.auth_service.login(&email, &password)).await;
            match result {
                Ok(session) => {
                    log_event(logger, LogEvent::new("login_succeeded").with_route("/login"));
                    output::success(&format!("Welcome, {}", session.email));
                    ctx.navigator.sync_with_session(&ctx.session);
                }
                Err(e) => {
                    log_event(
                        logger,
                        LogEvent::new("login_failed").with_route("/login").with_failure(&e),
                    );
                    output::error(&e.user_message());
                }
            }
            Ok(Next::Continue)
        }
        1 => {
            ctx.navigator.navigate(Route::Register);
            Ok(Next::Continue)
        }
        _ => Ok(Next::Quit),
    }
}

async fn register_view(ctx: &AhorristaContext, logger: &Logger) -> Result<Next> {
    println!();
    println!("{}", "Ahorrista - Create an account".bold());

    let choice = Select::new()
        .items(&["Register", "Back to log in", "Quit"])
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let email: String = Input::new().with_prompt("Email").interact_text()?;
            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            let result = with_spinner(
                "Creating account...",
                ctx.auth_service.register(&email, &password),
            )
            .await;
            match result {
                Ok(session) => {
                    log_event(logger, LogEvent::new("register_succeeded").with_route("/register"));
                    output::success(&format!("Account created for {}", session.email));
                    ctx.navigator.sync_with_session(&ctx.session);
                }
                Err(e) => {
                    log_event(
                        logger,
                        LogEvent::new("register_failed")
                            .with_route("/register")
                            .with_failure(&e),
                    );
                    output::error(&e.user_message());
                }
            }
            Ok(Next::Continue)
        }
        1 => {
            ctx.navigator.navigate(Route::Login);
            Ok(Next::Continue)
        }
        _ => Ok(Next::Quit),
    }
}

#[derive(Clone, Copy)]
enum Action {
    ToggleSummary,
    Details,
    CloseDetails,
    Add,
    Delete,
    Filter,
    ClearFilter,
    Goals,
    Logout,
    Quit,
}

impl Action {
    fn label(self, view: &WorkspaceView) -> &'static str {
        match self {
            Action::ToggleSummary if view.summary_visible => "Hide summary",
            Action::ToggleSummary => "Show summary",
            Action::Details => "View details of a month",
            Action::CloseDetails => "Close details",
            Action::Add => "Add expense",
            Action::Delete => "Delete expense",
            Action::Filter => "Filter summary",
            Action::ClearFilter => "Clear filter",
            Action::Goals => "Goals",
            Action::Logout => "Log out",
            Action::Quit => "Quit",
        }
    }
}

fn actions(view: &WorkspaceView) -> Vec<Action> {
    let mut actions = vec![Action::ToggleSummary];
    if view.summary.as_ref().is_some_and(|rows| !rows.is_empty()) {
        actions.push(Action::Details);
    }
    if view.detail != DetailPanel::Closed {
        actions.push(Action::CloseDetails);
    }
    actions.extend([Action::Add, Action::Delete]);
    if view.summary.is_some() {
        actions.push(Action::Filter);
    }
    if view.filter.is_some() {
        actions.push(Action::ClearFilter);
    }
    actions.extend([Action::Goals, Action::Logout, Action::Quit]);
    actions
}

async fn workspace_view(ctx: &AhorristaContext, logger: &Logger) -> Result<Next> {
    let ws = ctx.workspace();
    let _ = with_spinner("Loading categories...", ws.mount()).await;

    // Leave as soon as the session is gone (logout or expiry)
    while ctx.navigator.current() == Route::Workspace {
        let view = ws.view();
        render(ctx, &view);

        let actions = actions(&view);
        let labels: Vec<&str> = actions.iter().map(|a| a.label(&view)).collect();
        let choice = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        ws.dismiss_error();
        match actions[choice] {
            Action::ToggleSummary => {
                let _ = with_spinner("Loading summary...", ws.toggle_summary()).await;
            }
            Action::Details => pick_details(&ws).await?,
            Action::CloseDetails => ws.close_detail(),
            Action::Add => add_expense(&ws, logger).await?,
            Action::Delete => {
                let id: i64 = Input::new().with_prompt("Expense ID").interact_text()?;
                match with_spinner("Deleting expense...", ws.delete_expense(id)).await {
                    Ok(()) => {
                        log_event(logger, LogEvent::new("expense_deleted").with_route("/menu"));
                        output::success(&format!("Expense {} deleted", id));
                    }
                    Err(e) => log_event(
                        logger,
                        LogEvent::new("expense_delete_failed")
                            .with_route("/menu")
                            .with_failure(&e),
                    ),
                }
            }
            Action::Filter => filter_summary(&ws)?,
            Action::ClearFilter => ws.clear_filter(),
            Action::Goals => match with_spinner("Loading goals...", ctx.goal_service.list()).await {
                Ok(goals) if goals.is_empty() => output::info("No goals yet."),
                Ok(goals) => print_goals(&goals),
                Err(e) if e.is_session_expired() => {}
                Err(e) => output::error(&e.user_message()),
            },
            Action::Logout => {
                ctx.auth_service.logout()?;
                log_event(logger, LogEvent::new("logout").with_route("/menu"));
                ctx.navigator.sync_with_session(&ctx.session);
            }
            Action::Quit => return Ok(Next::Quit),
        }
    }

    if ctx.session.current().is_none() {
        log_event(logger, LogEvent::new("session_ended").with_route("/menu"));
    }
    Ok(Next::Continue)
}

fn render(ctx: &AhorristaContext, view: &WorkspaceView) {
    println!();
    let email = ctx.session.current().map(|s| s.email).unwrap_or_default();
    println!("{} {}", "Ahorrista".bold(), email.dimmed());

    if let Some(error) = &view.error {
        output::error(error);
    }

    if view.summary_visible {
        if view.summary_loading {
            output::info("Loading summary...");
        } else if let Some(rows) = view.displayed_summary() {
            if let Some(filter) = &view.filter {
                output::info(&format!("Filter: {}", describe_filter(filter)));
            }
            if rows.is_empty() {
                output::info("No expenses to show.");
            } else {
                print_summary(&rows);
            }
        }
    }

    match &view.detail {
        DetailPanel::Closed => {}
        DetailPanel::Loading { key } => output::info(&format!("Loading details for {}...", key)),
        DetailPanel::Open { title, rows, .. } => {
            println!("{}", title.bold());
            if rows.is_empty() {
                output::info("No expenses in this month.");
            } else {
                print_details(rows);
            }
        }
    }
}

fn describe_filter(filter: &ExpenseFilter) -> String {
    let mut parts = Vec::new();
    if let Some(id) = filter.category_id {
        parts.push(format!("category {}", id));
    }
    if let Some(year) = filter.year {
        parts.push(format!("year {}", year));
    }
    if let Some(month) = filter.month {
        parts.push(format!("month {}", month));
    }
    if let Some(amount) = filter.amount {
        parts.push(format!("amount {} {}", filter.amount_op.symbol(), format_amount(amount)));
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

/// Pick a summary row to drill into; picking the open one closes it
async fn pick_details(ws: &WorkspaceController) -> Result<()> {
    let Some(rows) = ws.displayed_summary() else {
        return Ok(());
    };
    if rows.is_empty() {
        output::info("No rows to pick from.");
        return Ok(());
    }

    let labels: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{} {}/{}  {}",
                row.category_name().unwrap_or("-"),
                row.month,
                row.year,
                format_amount(row.amount)
            )
        })
        .collect();
    let choice = Select::new()
        .with_prompt("Month and category")
        .items(&labels)
        .default(0)
        .interact()?;

    let _ = with_spinner("Loading details...", ws.toggle_detail_for(&rows[choice])).await;
    Ok(())
}

async fn add_expense(ws: &WorkspaceController, logger: &Logger) -> Result<()> {
    let view = ws.view();
    if view.categories.is_empty() {
        output::error("No categories loaded; cannot add an expense.");
        return Ok(());
    }

    let labels: Vec<String> = view.categories.iter().map(|c| c.to_string()).collect();
    let choice = Select::new()
        .with_prompt("Category")
        .items(&labels)
        .default(0)
        .interact()?;
    let year: String = Input::new()
        .with_prompt("Year")
        .default(view.form.year.clone())
        .interact_text()?;
    let month: String = Input::new()
        .with_prompt("Month")
        .default(view.form.month.clone())
        .interact_text()?;
    let amount: String = Input::new().with_prompt("Amount").interact_text()?;

    let category_id = view.categories[choice].id.to_string();
    ws.edit_form(|form| {
        form.category_id = category_id;
        form.year = year;
        form.month = month;
        form.amount = amount;
    });

    match with_spinner("Saving expense...", ws.submit_expense()).await {
        Ok(_) => {
            log_event(logger, LogEvent::new("expense_created").with_route("/menu"));
            output::success("Expense added");
        }
        Err(e) => log_event(
            logger,
            LogEvent::new("expense_create_failed")
                .with_route("/menu")
                .with_failure(&e),
        ),
    }
    Ok(())
}

fn filter_summary(ws: &WorkspaceController) -> Result<()> {
    let ask = |prompt: &str| -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    };

    let category = ask("Category ID (blank for any)")?;
    let year = ask("Year (blank for any)")?;
    let month = ask("Month (blank for any)")?;
    let amount = ask("Amount (blank for any)")?;
    let op = if amount.trim().is_empty() {
        "eq"
    } else {
        let ops = ["eq", "gte", "lte"];
        let choice = Select::new()
            .with_prompt("Compare amount")
            .items(&["equal to", "at least", "at most"])
            .default(0)
            .interact()?;
        ops[choice]
    };

    match ExpenseFilter::from_fields(&category, &year, &month, &amount, op) {
        Ok(filter) => ws.apply_filter(filter),
        Err(e) => output::error(&e.user_message()),
    }
    Ok(())
}
