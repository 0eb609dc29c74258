use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::AppState;
use crate::cli::{handle_command, ShellLine};

/// Interactive loop that keeps one `AppState` alive between commands,
/// so the session, the quote cache and the employee list carry over.
pub async fn run_shell(state: &AppState) -> Result<()> {
    println!(
        "{} Type {} for commands, {} to leave.",
        "Electrysure admin shell.".bold(),
        "help".cyan(),
        "exit".cyan()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(state).await;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let words = match split_args(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("{} {}", "error:".red(), e);
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit") | Some("quit") => break,
            Some("help") => {
                print_help();
                continue;
            }
            _ => {}
        }

        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // clap renders its own usage text
                let _ = e.print();
                continue;
            }
        };

        debug!(command = ?parsed.command, "Running shell command");
        if let Err(e) = handle_command(state, &parsed.command).await {
            eprintln!("{} {}", "error:".red(), e);
        }
    }

    Ok(())
}

async fn print_prompt(state: &AppState) {
    let who = state
        .session
        .read()
        .await
        .user()
        .map(|user| user.email.clone())
        .unwrap_or_else(|| "guest".to_string());
    print!("{}> ", who.green());
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("  login -e <email> -p <password>");
    println!("  logout | whoami");
    println!("  navigate <path>");
    println!("  quotes list | show <id> | metrics | recalculate <id> [--payload file] | status <id> <approved|rejected>");
    println!("  employees list | add | update <id> | delete <id>");
    println!("  exit");
}

/// Split a shell line on whitespace; double quotes group words and `\` escapes the next character
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| anyhow!("Trailing backslash"))?;
                current.push(escaped);
                in_word = true;
            }
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err(anyhow!("Unclosed quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
