mod transport;


use std::path::{Path, PathBuf};

use catweight_client::storage::file::FileArea;
use catweight_client::{
    ApiError, ClientConfig, ConfigError, Credentials, PasswordChange, ProfileUpdate, Registration, SessionManager,
    SessionSnapshot, SessionStatus, TokenStore,
};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::transport::ReqwestTransport;

type Manager = SessionManager<ReqwestTransport, FileArea>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "catweight", about = "Cat weight tracker session CLI")]
struct Cli {
    /// API root including the `/api` prefix.
    #[arg(long, env = "CATWEIGHT_API_URL", default_value = "http://127.0.0.1:8000/api")]
    base_url: String,

    /// Directory holding the persisted bearer token.
    #[arg(long, env = "CATWEIGHT_STATE_DIR", default_value = ".catweight")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the issued token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CATWEIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account. Does not log in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CATWEIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted token.
    Logout,
    /// Print the user the persisted token resolves to.
    Whoami,
    /// Resolve the session and print the full snapshot.
    Status,
    /// Update username and/or email.
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change the account password.
    Passwd {
        #[arg(long, env = "CATWEIGHT_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let manager = build_manager(&cli.base_url, &cli.state_dir)?;

    match cli.command {
        Command::Login { username, password } => {
            let user = manager.login(Credentials::new(username, password)).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Register { username, email, password } => {
            let user = manager.register(Registration::new(username, email, password)).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Logout => {
            manager.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = manager.refresh().await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Status => {
            let snapshot = manager.start().await;
            print_json(&snapshot_json(&snapshot))
        }
        Command::Profile { username, email } => {
            let user = manager.update_profile(ProfileUpdate { username, email }).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Passwd { current, new } => {
            manager.change_password(PasswordChange::new(current, new)).await?;
            println!("password changed");
            Ok(())
        }
    }
}

fn build_manager(base_url: &str, state_dir: &Path) -> Result<Manager, CliError> {
    let base_url = validate_base_url(base_url)?;
    let config = ClientConfig::from_env()?.with_base_url(base_url);
    debug!(base_url, state_dir = %state_dir.display(), timeout_ms = config.request_timeout_ms, "session store ready");
    let tokens = TokenStore::new(current_area(state_dir), legacy_area(state_dir), &config);
    let client = reqwest::Client::builder().build()?;
    Ok(SessionManager::new(ReqwestTransport::new(client), tokens, config))
}

fn validate_base_url(base_url: &str) -> Result<&str, CliError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(base_url)
    } else {
        Err(CliError::InvalidBaseUrl(base_url.to_owned()))
    }
}

/// Tokens written by this version live under `session/`.
fn current_area(state_dir: &Path) -> FileArea {
    FileArea::new(state_dir.join("session"))
}

/// Older versions wrote the token straight into the state directory.
fn legacy_area(state_dir: &Path) -> FileArea {
    FileArea::new(state_dir)
}

fn status_label(status: &SessionStatus) -> &'static str {
    match status {
        SessionStatus::Anonymous => "anonymous",
        SessionStatus::Authenticating => "authenticating",
        SessionStatus::Authenticated => "authenticated",
        SessionStatus::Failed(_) => "failed",
    }
}

fn snapshot_json(snapshot: &SessionSnapshot) -> Value {
    json!({
        "status": status_label(&snapshot.status),
        "user": snapshot.user,
        "error": snapshot.error,
        "registration_enabled": snapshot.registration_enabled,
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
