//! Ahorrista CLI - track your expenses from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod notifier;
mod output;

use commands::auth::AuthKind;
use commands::{auth, config, expenses, goals, logs, menu};

/// Ahorrista - expense tracking in your terminal
#[derive(Parser)]
#[command(name = "ahorrista", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: Option<String>,
        /// Prompted for when omitted (or read from AHORRISTA_PASSWORD)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log in
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Prompted for when omitted (or read from AHORRISTA_PASSWORD)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who is logged in
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List expense categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the monthly expense summary
    Summary(expenses::SummaryArgs),

    /// Show the expenses behind one category and month
    Details {
        /// Category ID
        #[arg(long)]
        category: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        month: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an expense
    Add {
        /// Category ID
        #[arg(long)]
        category: String,
        /// Defaults to the current year
        #[arg(long)]
        year: Option<String>,
        /// Defaults to the current month
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        command: goals::GoalsCommands,
    },

    /// Interactive workspace
    Menu,

    /// Show or change backend settings
    Config {
        /// Backend base URL
        #[arg(long)]
        api_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the local event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The expiry alert has already been shown
            let expired = e
                .downcast_ref::<ahorrista_core::Error>()
                .is_some_and(|e| e.is_session_expired());
            if expired {
                let logger = commands::get_logger(ahorrista_core::EntryPoint::Cli);
                commands::log_event(&logger, ahorrista_core::LogEvent::new("session_expired"));
            } else {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register { email, password, json } => {
            auth::run(AuthKind::Register, email, password, json).await
        }
        Commands::Login { email, password, json } => {
            auth::run(AuthKind::Login, email, password, json).await
        }
        Commands::Logout { json } => auth::logout(json),
        Commands::Whoami { json } => auth::whoami(json),
        Commands::Categories { json } => expenses::categories(json).await,
        Commands::Summary(args) => expenses::summary(args).await,
        Commands::Details { category, year, month, json } => {
            expenses::details(&category, &year, &month, json).await
        }
        Commands::Add { category, year, month, amount, json } => {
            expenses::add(&category, year, month, &amount, json).await
        }
        Commands::Delete { id, json } => expenses::delete(id, json).await,
        Commands::Goals { command } => goals::run(command).await,
        Commands::Menu => menu::run().await,
        Commands::Config { api_url, timeout_secs, json } => config::run(api_url, timeout_secs, json),
        Commands::Logs { command } => logs::run(command),
    }
}
