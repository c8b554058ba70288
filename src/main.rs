// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use shopfloor::colors::*;
use shopfloor::config::{config_path, load_config, save_config, Config};
use shopfloor::security::SessionGuard;
use shopfloor::types::{Department, InfoUpdate, Machine, Part, Shift, User};
use shopfloor::validation::{ValidationResult, ValidatorRegistry};

const ERROR: i32 = 1;

#[derive(Parser)]
#[command(name = "shopfloor", version, about = "Shop-floor record keeping")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode: warnings and errors only
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Verbose mode: debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check admin credentials
    ///
    /// Example:
    ///   shopfloor login admin --password secret
    Login {
        username: String,

        #[arg(short, long, default_value = "")]
        password: String,
    },

    /// Run a record through its business rules
    Check {
        #[command(subcommand)]
        record: CheckCommands,
    },

    /// Show or initialize the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CheckCommands {
    /// Check a machine record
    ///
    /// Example:
    ///   shopfloor check machine --number 120 --set-id 4 --owner gear --status running
    Machine {
        #[arg(long, default_value = "")]
        number: String,
        #[arg(long, default_value = "")]
        set_id: String,
        /// gear, pinion, inspection or maintenance
        #[arg(long)]
        owner: Option<String>,
        #[arg(long, default_value = "")]
        status: String,
    },
    /// Check a part record
    Part {
        #[arg(long, default_value = "")]
        number: String,
        #[arg(long, default_value = "")]
        stamp: String,
        #[arg(long, default_value = "")]
        teeth: String,
    },
    /// Check a user record
    User {
        #[arg(long, default_value = "")]
        first: String,
        #[arg(long, default_value = "")]
        last: String,
        #[arg(long, default_value = "")]
        clock: String,
        /// day, afternoon or night
        #[arg(long)]
        shift: Option<String>,
    },
    /// Check a floor notice
    Info {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    Show,
    /// Write a default config file if none exists
    Init,
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_or_warn<T>(value: Option<String>, parse: fn(&str) -> Option<T>, what: &str) -> Option<T> {
    let value = value?;
    let parsed = parse(&value);
    if parsed.is_none() {
        eprintln!("{}", warning_line(&format!("Unknown {what} '{value}', treating as not selected")));
    }
    parsed
}

fn handle_login(config: &Config, username: &str, password: &str) -> Result<bool> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(async {
        let guard = SessionGuard::from_current(config.guard_config())?;
        let check = guard.authenticate(username, password);

        if check.is_successful() {
            println!(
                "{}",
                success_line(&format!(
                    "Admin session granted for {BOLD}{}{RESET}s",
                    guard.config().window.as_secs()
                ))
            );
        } else {
            for message in check.errors() {
                println!("{}", error_line(message));
            }
        }

        guard.dispose().await;
        Ok::<bool, anyhow::Error>(check.is_successful())
    })
}

fn handle_check(record: CheckCommands) -> Result<bool> {
    let registry = ValidatorRegistry::with_shop_floor_defaults();

    let result: ValidationResult = match record {
        CheckCommands::Machine { number, set_id, owner, status } => {
            let machine = Machine {
                id: None,
                machine_number: number,
                machine_set_id: set_id,
                owner: parse_or_warn(owner, Department::parse, "department"),
                status_message: status,
            };
            registry.validate(Some(&machine))?
        }
        CheckCommands::Part { number, stamp, teeth } => {
            let part = Part {
                id: None,
                part_number: number,
                part_stamp: stamp,
                part_tooth_count: teeth,
            };
            registry.validate(Some(&part))?
        }
        CheckCommands::User { first, last, clock, shift } => {
            let user = User {
                id: None,
                first_name: first,
                last_name: last,
                clock_number: clock,
                shift: parse_or_warn(shift, Shift::parse, "shift"),
            };
            tracing::debug!(user = %user.full_name(), "checking user record");
            registry.validate(Some(&user))?
        }
        CheckCommands::Info { title, body } => {
            let update = InfoUpdate { id: None, title, body };
            registry.validate(Some(&update))?
        }
    };

    if result.is_valid {
        println!("{}", success_line("Record is valid"));
    } else {
        println!("{}", error_line(&result.error_message));
    }
    Ok(result.is_valid)
}

fn handle_config(command: ConfigCommands) -> Result<()> {
    let path = config_path()?;
    match command {
        ConfigCommands::Show => {
            let mut config = load_config()?;
            config.admin_secret = "********".to_string();
            println!("{CYAN}{}{RESET}", path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Init => {
            if path.exists() {
                println!("{}", warning_line(&format!("{} already exists", path.display())));
            } else {
                save_config(&Config::default())?;
                println!("{}", success_line(&format!("Wrote {}", path.display())));
                println!("{DIM}Change admin_secret before use.{RESET}");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let ok = match cli.command {
        Commands::Login { username, password } => {
            let config = load_config()?;
            handle_login(&config, &username, &password)?
        }
        Commands::Check { record } => handle_check(record)?,
        Commands::Config { command } => {
            handle_config(command)?;
            true
        }
    };

    if !ok {
        std::process::exit(ERROR);
    }
    Ok(())
}
