//! Goals command - list, create and update savings goals

use anyhow::Result;
use clap::Subcommand;

use ahorrista_core::services::parse_goal_fields;
use ahorrista_core::{EntryPoint, Goal};

use super::{get_logger, get_workspace_context, log_command, print_json};
use crate::output::{self, create_table, with_spinner};

#[derive(Subcommand)]
pub enum GoalsCommands {
    /// List goals
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a goal from key=value fields
    Create {
        /// Goal fields, e.g. targetAmount=500 month=8 year=2025
        #[arg(required = true)]
        fields: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update some fields of a goal
    Update {
        /// Goal ID
        id: i64,
        /// Fields to change, as key=value
        #[arg(required = true)]
        fields: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: GoalsCommands) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);

    match command {
        GoalsCommands::List { json } => {
            log_command(&logger, "goals list");
            let ctx = get_workspace_context(&logger)?;
            let result = with_spinner("Loading goals...", ctx.goal_service.list()).await;

            if json {
                return print_json(result);
            }

            let goals = result?;
            if goals.is_empty() {
                output::info("No goals yet.");
                return Ok(());
            }
            print_goals(&goals);
        }
        GoalsCommands::Create { fields, json } => {
            log_command(&logger, "goals create");
            let ctx = get_workspace_context(&logger)?;
            let result = match parse_goal_fields(&fields) {
                Ok(fields) => with_spinner("Creating goal...", ctx.goal_service.create(fields)).await,
                Err(e) => Err(e),
            };

            if json {
                return print_json(result);
            }

            let goal = result?;
            output::success(&format!("Goal {} created", goal.id));
            print_goals(&[goal]);
        }
        GoalsCommands::Update { id, fields, json } => {
            log_command(&logger, "goals update");
            let ctx = get_workspace_context(&logger)?;
            let result = match parse_goal_fields(&fields) {
                Ok(fields) => {
                    with_spinner("Updating goal...", ctx.goal_service.update(id, fields)).await
                }
                Err(e) => Err(e),
            };

            if json {
                return print_json(result);
            }

            let goal = result?;
            output::success(&format!("Goal {} updated", goal.id));
            print_goals(&[goal]);
        }
    }

    Ok(())
}

/// One row per goal; fields are shown as the backend sent them
pub fn print_goals(goals: &[Goal]) {
    let mut table = create_table();
    table.set_header(vec!["ID", "Fields"]);
    for goal in goals {
        let fields = goal
            .fields
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![goal.id.to_string(), fields]);
    }
    println!("{}", table);
}
