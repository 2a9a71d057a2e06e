//! Config command - show or change the backend settings

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use ahorrista_core::config::{Config, API_URL_ENV};
use ahorrista_core::{EntryPoint, LogEvent};

use super::{get_app_dir, get_logger, log_command, log_event};
use crate::output;

pub fn run(api_url: Option<String>, timeout_secs: Option<u64>, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "config");

    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)?;
    let mut config = Config::load(&app_dir)?;

    let changing = api_url.is_some() || timeout_secs.is_some();
    if let Some(url) = api_url.as_deref() {
        config.set_api_url(url)?;
    }
    if let Some(secs) = timeout_secs {
        config.set_timeout_secs(secs)?;
    }
    if changing {
        config.save(&app_dir)?;
        log_event(&logger, LogEvent::new("config_updated"));
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "apiUrl": config.api_url,
                "apiUrlFromEnv": config.api_url_from_env,
                "timeoutSecs": config.timeout.as_secs(),
                "settingsPath": app_dir.join("settings.json").to_string_lossy(),
            }))?
        );
        return Ok(());
    }

    if changing {
        output::success("Settings saved");
    }
    println!("{}", "Backend".bold());
    println!("  API URL: {}", config.api_url);
    if config.api_url_from_env {
        println!("  {}", format!("(from {})", API_URL_ENV).dimmed());
    }
    println!("  Timeout: {}s", config.timeout.as_secs());
    println!("  Settings: {}", app_dir.join("settings.json").display());
    Ok(())
}
