//! Register, login, logout and whoami

use std::env;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use serde_json::json;

use ahorrista_core::services::Route;
use ahorrista_core::{EntryPoint, LogEvent, OperationResult};

use super::{get_context, get_logger, log_command, log_event, print_json};
use crate::output::{self, with_spinner};

#[derive(Debug, Clone, Copy)]
pub enum AuthKind {
    Login,
    Register,
}

impl AuthKind {
    fn name(self) -> &'static str {
        match self {
            AuthKind::Login => "login",
            AuthKind::Register => "register",
        }
    }
}

fn get_email_or_prompt(email_flag: Option<String>) -> Result<String> {
    if let Some(e) = email_flag {
        return Ok(e);
    }
    let email = Input::<String>::new().with_prompt("Email").interact_text()?;
    Ok(email)
}

/// Password from --password, then AHORRISTA_PASSWORD, then a hidden prompt
fn get_password_or_prompt(password_flag: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }
    if let Ok(p) = env::var("AHORRISTA_PASSWORD") {
        return Ok(p);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub async fn run(
    kind: AuthKind,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, kind.name());

    let ctx = get_context(&logger)?;
    let email = get_email_or_prompt(email)?;
    let password = get_password_or_prompt(password, matches!(kind, AuthKind::Register))?;

    let route = match kind {
        AuthKind::Login => Route::Login,
        AuthKind::Register => Route::Register,
    };
    ctx.navigator.navigate(route);

    let result = with_spinner("Contacting server...", async {
        match kind {
            AuthKind::Login => ctx.auth_service.login(&email, &password).await,
            AuthKind::Register => ctx.auth_service.register(&email, &password).await,
        }
    })
    .await;

    match &result {
        Ok(_) => log_event(
            &logger,
            LogEvent::new(format!("{}_succeeded", kind.name())).with_route(route.path()),
        ),
        Err(e) => log_event(
            &logger,
            LogEvent::new(format!("{}_failed", kind.name()))
                .with_route(route.path())
                .with_failure(e),
        ),
    }

    if json {
        return print_json(result.map(|s| json!({ "email": s.email })));
    }

    let session = result?;
    ctx.navigator.sync_with_session(&ctx.session);
    match kind {
        AuthKind::Login => output::success(&format!("Logged in as {}", session.email)),
        AuthKind::Register => output::success(&format!("Account created for {}", session.email)),
    }
    Ok(())
}

pub fn logout(json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "logout");

    let ctx = get_context(&logger)?;
    let was_logged_in = ctx.session.current().is_some();
    ctx.auth_service.logout()?;
    log_event(&logger, LogEvent::new("logout"));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&OperationResult::ok(json!({ "wasLoggedIn": was_logged_in })))?
        );
    } else if was_logged_in {
        output::success("Logged out");
    } else {
        output::info("Not logged in");
    }
    Ok(())
}

pub fn whoami(json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    log_command(&logger, "whoami");

    let ctx = get_context(&logger)?;
    let session = ctx.session.current();
    let authenticated = ctx.session.is_authenticated();

    if json {
        let data = json!({
            "email": session.as_ref().map(|s| s.email.clone()),
            "authenticated": authenticated,
            "apiUrl": ctx.config.api_url,
        });
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
        return Ok(());
    }

    match session {
        Some(s) if authenticated => {
            println!("{} {}", "Logged in as".bold(), s.email);
            println!("{} {}", "Server:".dimmed(), ctx.config.api_url);
        }
        _ => output::warning("Not logged in. Run 'ahorrista login' first."),
    }
    Ok(())
}
