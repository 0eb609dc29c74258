use anyhow::{anyhow, Context, Result};
use chrono::Local;
use colored::Colorize;
use std::path::Path;

use super::args::{Commands, EmployeeCommands, QuoteCommands};
use crate::app::{init_config, AppState};
use crate::constants::LOGIN_PATH;
use crate::models::{EmployeePatch, NewEmployee, Quote, QuoteStatus};
use crate::utils::AdminError;

/// Handle one command against the application state
pub async fn handle_command(state: &AppState, command: &Commands) -> Result<()> {
    match command {
        Commands::Init => {
            match init_config(state.config_file.as_deref())? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!("Configuration already exists, leaving it untouched"),
            }
            Ok(())
        }
        Commands::Login { email, password } => login(state, email, password).await,
        Commands::Logout => {
            state.session.write().await.logout()?;
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            match state.session.read().await.user() {
                Some(user) => println!(
                    "{} <{}> ({}{})",
                    user.name.bold(),
                    user.email,
                    user.role,
                    if user.active { "" } else { ", inactive" }
                ),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Commands::Navigate { path } => {
            let nav = state.navigate(path).await;
            if nav.was_redirected() {
                println!("{} -> {}", nav.redirects.join(" -> "), nav.path.yellow());
            } else {
                println!("{}", nav.path.green());
            }
            match nav.route {
                Some(name) => println!("  page: {}", name),
                None => println!("  page: (none)"),
            }
            for (key, value) in &nav.params {
                println!("  {}: {}", key, value);
            }
            Ok(())
        }
        Commands::Quotes(command) => handle_quotes(state, command).await,
        Commands::Employees(command) => handle_employees(state, command).await,
        Commands::Shell => Err(anyhow!("Already in the shell")),
    }
}

async fn login(state: &AppState, email: &str, password: &str) -> Result<()> {
    let signed_in = state.session.write().await.login(email, password).await?;
    if !signed_in {
        return Err(anyhow!("Invalid email or password"));
    }

    let nav = state.navigate("/login").await;
    println!("{} Signed in, landing on {}", "OK".green(), nav.path);
    Ok(())
}

/// Run the guard for `page`; explains the refusal when the user is sent elsewhere.
///
/// Commands only act on known pages, so a path outside the route table is
/// refused rather than treated as unrestricted.
async fn open_page(state: &AppState, page: &str) -> Result<()> {
    let nav = state.navigate(page).await;
    if nav.route.is_none() {
        return Err(anyhow!("No page at {}", page));
    }
    if nav.path == page {
        return Ok(());
    }
    if nav.path == LOGIN_PATH {
        Err(anyhow!("Sign in first"))
    } else {
        Err(anyhow!("You do not have access to {}", page))
    }
}

/// Show the normalized message the store recorded rather than transport detail
fn store_error(err: AdminError) -> anyhow::Error {
    anyhow!(err.user_message())
}

async fn handle_quotes(state: &AppState, command: &QuoteCommands) -> Result<()> {
    let page = match command {
        QuoteCommands::Show { id } | QuoteCommands::Recalculate { id, .. } => {
            format!("/quotes/manage/{}", urlencoding::encode(id))
        }
        QuoteCommands::Metrics => "/dashboard".to_string(),
        _ => "/quotes".to_string(),
    };
    open_page(state, &page).await?;

    // Every quotes screen starts from a fresh list
    state.quotes.fetch_all().await.map_err(store_error)?;

    match command {
        QuoteCommands::List => {
            let quotes = state.quotes.list();
            if quotes.is_empty() {
                println!("No quotes");
            }
            for quote in &quotes {
                print_quote_line(quote);
            }
        }
        QuoteCommands::Show { id } => {
            let quote = state
                .quotes
                .get(id)
                .ok_or_else(|| anyhow!("Quote {} not found", id))?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        QuoteCommands::Metrics => {
            let metrics = state.quotes.metrics(Local::now().date_naive());
            println!("Total quotes:   {}", metrics.total_quotes);
            println!("Created today:  {}", metrics.today_quotes);
            println!("Personal use:   {}%", metrics.personal_use_percentage);
            println!("Other use:      {}%", metrics.others_use_percentage);
        }
        QuoteCommands::Recalculate { id, payload } => {
            let payload = match payload {
                Some(path) => read_payload(path)?,
                None => state
                    .quotes
                    .get(id)
                    .ok_or_else(|| anyhow!("Quote {} not found", id))?,
            };
            let updated = state
                .quotes
                .recalculate(id, &payload)
                .await
                .map_err(store_error)?;
            print_quote_line(&updated);
        }
        QuoteCommands::Status { id, status } => {
            let status: QuoteStatus = status.parse().map_err(store_error)?;
            let updated = state
                .quotes
                .set_status(id, status)
                .await
                .map_err(store_error)?;
            print_quote_line(&updated);
        }
    }
    Ok(())
}

fn read_payload(path: &Path) -> Result<Quote> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("{} is not a valid quote", path.display()))
}

fn print_quote_line(quote: &Quote) {
    let status = match quote.status {
        QuoteStatus::Lead => quote.status.as_str().cyan(),
        QuoteStatus::Pending => quote.status.as_str().yellow(),
        QuoteStatus::Approved => quote.status.as_str().green(),
        QuoteStatus::Rejected => quote.status.as_str().red(),
    };
    let premium = match (quote.final_premium, &quote.currency) {
        (Some(amount), Some(currency)) => format!("{:.2} {}", amount, currency),
        (Some(amount), None) => format!("{:.2}", amount),
        _ => "-".to_string(),
    };
    println!(
        "{:<12} {:<9} {} {} {} | {} | {}",
        quote.id,
        status,
        quote.vehicle_info.year,
        quote.vehicle_info.brand,
        quote.vehicle_info.model,
        premium,
        quote.created_at
    );
}

async fn handle_employees(state: &AppState, command: &EmployeeCommands) -> Result<()> {
    open_page(state, "/employees").await?;

    let mut employees = state.employees.write().await;
    match command {
        EmployeeCommands::List => {
            for e in employees.list() {
                let active = if e.active { "active".green() } else { "inactive".red() };
                println!("{:>4}  {:<28} {:<20} {:<9} {}", e.id, e.email, e.name, e.role, active);
            }
        }
        EmployeeCommands::Add {
            email,
            name,
            role,
            inactive,
        } => {
            let added = employees
                .add(NewEmployee {
                    email: email.clone(),
                    name: name.clone(),
                    role: *role,
                    active: !inactive,
                })
                .map_err(store_error)?;
            println!("Added employee {} ({})", added.id, added.email);
        }
        EmployeeCommands::Update {
            id,
            email,
            name,
            role,
            active,
        } => {
            let patch = EmployeePatch {
                email: email.clone(),
                name: name.clone(),
                role: *role,
                active: *active,
            };
            if patch.is_empty() {
                return Err(anyhow!("Nothing to update"));
            }
            if !employees.update(*id, &patch) {
                return Err(anyhow!("Employee {} not found", id));
            }
            println!("Updated employee {}", id);
        }
        EmployeeCommands::Delete { id } => {
            if !employees.delete(*id) {
                return Err(anyhow!("Employee {} not found", id));
            }
            println!("Deleted employee {}", id);
        }
    }
    Ok(())
}
