//! Expense commands: categories, summary, details, add, delete

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use ahorrista_core::services::{DetailKey, ExpenseForm};
use ahorrista_core::{
    EntryPoint, ExpenseCategory, ExpenseDetail, ExpenseFilter, ExpenseSummary, LogEvent,
};

use super::{get_logger, get_workspace_context, log_command, log_event, print_json};
use crate::output::{self, create_table, format_amount, with_spinner};

/// Arguments of `ahorrista summary`
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Ask the server for this year only
    #[arg(long)]
    pub year: Option<i32>,
    /// Ask the server for this month only
    #[arg(long)]
    pub month: Option<u32>,
    /// Show only this category id
    #[arg(long)]
    pub category: Option<String>,
    /// Show only rows of this year
    #[arg(long)]
    pub filter_year: Option<String>,
    /// Show only rows of this month
    #[arg(long)]
    pub filter_month: Option<String>,
    /// Compare amounts against this value
    #[arg(long)]
    pub amount: Option<String>,
    /// Amount comparison: eq, gte or lte
    #[arg(long, default_value = "eq")]
    pub op: String,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SummaryArgs {
    fn filter(&self) -> ahorrista_core::domain::result::Result<ExpenseFilter> {
        ExpenseFilter::from_fields(
            self.category.as_deref().unwrap_or(""),
            self.filter_year.as_deref().unwrap_or(""),
            self.filter_month.as_deref().unwrap_or(""),
            self.amount.as_deref().unwrap_or(""),
            &self.op,
        )
    }
}

pub async fn categories(json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "categories");

    let ctx = get_workspace_context(&logger)?;
    let result = with_spinner("Loading categories...", ctx.api.list_categories()).await;

    if json {
        return print_json(result);
    }

    let categories = result?;
    if categories.is_empty() {
        output::info("No categories found.");
        return Ok(());
    }
    print_categories(&categories);
    Ok(())
}

pub fn print_categories(categories: &[ExpenseCategory]) {
    let mut table = create_table();
    table.set_header(vec!["ID", "Name"]);
    for category in categories {
        table.add_row(vec![category.id.to_string(), category.name.clone()]);
    }
    println!("{}", table);
}

pub async fn summary(args: SummaryArgs) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "summary");

    // Bad filter input never reaches the network
    let filter = match args.filter() {
        Ok(filter) => filter,
        Err(e) if args.json => return print_json::<()>(Err(e)),
        Err(e) => return Err(e.into()),
    };

    let ctx = get_workspace_context(&logger)?;
    let result = with_spinner(
        "Loading summary...",
        ctx.api.get_summary(args.year, args.month),
    )
    .await
    .map(|rows| filter.apply(&rows));

    if args.json {
        return print_json(result);
    }

    let rows = result?;
    if rows.is_empty() {
        output::info("No expenses found.");
        return Ok(());
    }
    print_summary(&rows);
    if !filter.is_empty() {
        println!("{}", "Filtered view. Run without filter flags to see everything.".dimmed());
    }
    Ok(())
}

pub fn print_summary(rows: &[ExpenseSummary]) {
    let mut table = create_table();
    table.set_header(vec!["ID", "Category", "Year", "Month", "Amount"]);
    for row in rows {
        let category = row
            .category
            .as_ref()
            .map(|c| format!("{} ({})", c.name, c.id))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            row.id.to_string(),
            category,
            row.year.to_string(),
            row.month.to_string(),
            format_amount(row.amount),
        ]);
    }
    println!("{}", table);
}

pub async fn details(category: &str, year: &str, month: &str, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "details");

    let key = match DetailKey::parse(category, year, month) {
        Ok(key) => key,
        Err(e) if json => return print_json::<()>(Err(e)),
        Err(e) => return Err(e.into()),
    };

    let ctx = get_workspace_context(&logger)?;
    let result = with_spinner(
        "Loading details...",
        ctx.api.get_details(key.year, key.month, key.category_id),
    )
    .await;

    if json {
        return print_json(result);
    }

    let rows = result?;
    if rows.is_empty() {
        output::info(&format!("No expenses for {}", key));
        return Ok(());
    }
    print_details(&rows);
    Ok(())
}

pub fn print_details(rows: &[ExpenseDetail]) {
    let mut table = create_table();
    table.set_header(vec!["ID", "Date", "Description", "Amount"]);
    for row in rows {
        let date = row
            .date_value()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .or_else(|| row.date.clone())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            row.id.to_string(),
            date,
            row.description.clone().unwrap_or_else(|| "-".to_string()),
            format_amount(row.amount),
        ]);
    }
    println!("{}", table);
}

pub async fn add(
    category: &str,
    year: Option<String>,
    month: Option<String>,
    amount: &str,
    json: bool,
) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "add");

    let ctx = get_workspace_context(&logger)?;
    let today = Local::now().date_naive();
    let form = ExpenseForm {
        category_id: category.to_string(),
        year: year.unwrap_or_else(|| today.year().to_string()),
        month: month.unwrap_or_else(|| today.month().to_string()),
        amount: amount.to_string(),
    };

    let result = with_spinner("Saving expense...", async {
        let categories = ctx.api.list_categories().await?;
        let expense = form.to_new_expense(&categories)?;
        ctx.api.create_expense(&expense).await
    })
    .await;

    match &result {
        Ok(_) => log_event(&logger, LogEvent::new("expense_created").with_command("add")),
        Err(e) => log_event(
            &logger,
            LogEvent::new("expense_create_failed").with_command("add").with_failure(e),
        ),
    }

    if json {
        return print_json(result);
    }

    let created = result?;
    match created.id {
        Some(id) => output::success(&format!("Expense {} created", id)),
        None => output::success("Expense created"),
    }
    Ok(())
}

pub async fn delete(id: i64, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "delete");

    let ctx = get_workspace_context(&logger)?;
    let result = with_spinner("Deleting expense...", ctx.api.delete_expense(id)).await;

    match &result {
        Ok(()) => log_event(&logger, LogEvent::new("expense_deleted").with_command("delete")),
        Err(e) => log_event(
            &logger,
            LogEvent::new("expense_delete_failed").with_command("delete").with_failure(e),
        ),
    }

    if json {
        return print_json(result.map(|()| json!({ "deleted": id })));
    }

    result?;
    output::success(&format!("Expense {} deleted", id));
    Ok(())
}
