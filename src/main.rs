use anyhow::Result;
use clap::Parser;

use electrysure_admin::{
    app::{load_config, AppState},
    cli::{handle_command, Cli, Commands},
    runtime::run_shell,
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = match cli.command {
        // Writing the defaults must work even when the current config is broken
        Commands::Init => Default::default(),
        _ => load_config(cli.config.as_deref())?,
    };
    let state = AppState::from_config(config)?.with_config_file(cli.config.clone());

    match &cli.command {
        Commands::Shell => run_shell(&state).await,
        command => handle_command(&state, command).await,
    }
}
