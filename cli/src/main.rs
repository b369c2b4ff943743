//! User Directory — operator CLI
//!
//! Runs single account operations against the configured database.
//!
//! ```sh
//! # Run with default config (~/.config/user-directory/config.toml)
//! user-directory summary --search ali
//!
//! # Custom config path
//! user-directory --config /etc/user-directory/config.toml list
//!
//! # Password-gated mutations read the password from a flag or env
//! USER_DIRECTORY_PASSWORD=secret user-directory rename <id> --username alice2
//!
//! # Validate config without touching the database
//! user-directory check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};

use user_directory::config::AppConfig;
use user_directory::runtime::{init_tracing, DirectoryHandle, RuntimeOptions, SharedAccountService};
use user_directory::DomainError;

/// User Directory — account management from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "user-directory",
    version,
    about = "Manage user-directory accounts",
    long_about = "User Directory — create, search, rename and delete accounts.\n\n\
                  Default config: ~/.config/user-directory/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "USER_DIRECTORY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the database URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file and exit.
    Check,
    /// Run database migrations and exit.
    Migrate,
    /// List every account.
    List,
    /// Case-insensitive search on username or email.
    Search { term: Option<String> },
    /// Total account count, with matches when a search term is given.
    Summary {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one account.
    Show { id: String },
    /// Create an account.
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "USER_DIRECTORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change an account's username (requires its password).
    Rename {
        id: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "USER_DIRECTORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete an account (requires its password).
    Delete {
        id: String,
        #[arg(long, env = "USER_DIRECTORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Insert random sample accounts.
    Seed {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
        /// Print the generated plaintext passwords.
        #[arg(long)]
        show_passwords: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(user_directory::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if matches!(cli.command, Command::Check) {
                eprintln!("Configuration is invalid: {}", e);
                return ExitCode::FAILURE;
            }
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref url) = cli.database_url {
        config.database.url = url.clone();
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    // ── Config validation mode ─────────────────────────────────
    if let Command::Check = cli.command {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Database    : {}", config.database.url);
        println!("   Pool size   : {}", config.database.max_connections);
        println!("   bcrypt cost : {}", config.security.bcrypt_cost);
        println!("   Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    let handle = match DirectoryHandle::start(RuntimeOptions {
        config,
        auto_migrate: migrates_on_start(&cli),
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(handle.service(), cli.command).await;

    // The pool is drained on every exit path.
    handle.shutdown().await;

    match result {
        Ok(output) => {
            if let Some(output) = output {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(svc: SharedAccountService, command: Command) -> Result<Option<String>, DomainError> {
    let value = match command {
        Command::Check => return Ok(None),
        Command::Migrate => {
            info!("Database is up to date");
            return Ok(None);
        }
        Command::List => json!(svc.list_all().await?),
        Command::Search { term } => json!(svc.search(term.as_deref()).await?),
        Command::Summary { search } => json!(svc.get_summary(search.as_deref()).await?),
        Command::Show { id } => match svc.find(&id).await? {
            Some(profile) => json!(profile),
            None => return Err(DomainError::account_not_found(&id)),
        },
        Command::Create {
            username,
            email,
            password,
        } => json!(svc.create(&username, &email, &password).await?),
        Command::Rename {
            id,
            username,
            password,
        } => {
            svc.rename(&id, &username, &password).await?;
            json!({ "id": id, "username": username })
        }
        Command::Delete { id, password } => {
            svc.delete(&id, &password).await?;
            json!({ "id": id, "deleted": true })
        }
        Command::Seed {
            count,
            show_passwords,
        } => {
            let seeded = svc.seed(count).await?;
            let rows: Vec<_> = seeded
                .into_iter()
                .map(|(profile, input)| {
                    if show_passwords {
                        json!({ "account": profile, "password": input.password })
                    } else {
                        json!({ "account": profile })
                    }
                })
                .collect();
            json!(rows)
        }
    };

    Ok(Some(
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
    ))
}

/// `migrate` always migrates; `--no-migrate` only applies to other commands.
fn migrates_on_start(cli: &Cli) -> bool {
    !cli.no_migrate || matches!(cli.command, Command::Migrate)
}

/// Distinct exit codes so scripts can tell outcomes apart.
fn exit_code(e: &DomainError) -> u8 {
    match e {
        DomainError::Validation(_) => 2,
        DomainError::Conflict(_) | DomainError::DuplicateKey(_) => 3,
        DomainError::Unauthorized(_) => 4,
        DomainError::NotFound { .. } => 5,
        e if e.is_storage() => 6,
        _ => 1,
    }
}
