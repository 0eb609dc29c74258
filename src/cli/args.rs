use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Role;

#[derive(Parser, Debug)]
#[command(name = "electrysure")]
#[command(version)]
#[command(about = "Administrative client for Electrysure vehicle-insurance quotes", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// A line typed into the interactive shell
#[derive(Parser, Debug)]
#[command(name = "shell", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a default configuration file (to `--config` when given)
    Init,
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "ELECTRYSURE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check where a page request would end up
    Navigate {
        /// Page path, e.g. /quotes/manage/42
        path: String,
    },
    /// Browse and manage quotes
    #[command(subcommand)]
    Quotes(QuoteCommands),
    /// Manage employees (administrators only)
    #[command(subcommand)]
    Employees(EmployeeCommands),
    /// Interactive session that keeps state between commands
    Shell,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum QuoteCommands {
    /// List all quotes
    List,
    /// Show one quote as JSON
    Show { id: String },
    /// Dashboard totals
    Metrics,
    /// Send a quote for recalculation
    Recalculate {
        id: String,
        /// JSON file with the full quote; defaults to the current server copy
        #[arg(long)]
        payload: Option<PathBuf>,
    },
    /// Approve or reject a quote
    Status {
        id: String,
        /// approved | rejected
        status: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EmployeeCommands {
    /// List employees
    List,
    /// Add an employee
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "employee")]
        role: Role,
        /// Create the account disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Change fields of an employee
    Update {
        id: u32,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove an employee
    Delete { id: u32 },
}
