/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{Cli, Commands, EmployeeCommands, QuoteCommands, ShellLine};
pub use commands::handle_command;
