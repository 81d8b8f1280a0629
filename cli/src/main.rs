use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use sms_session::net::RegisterRequest;
use sms_session::routes::{AppView, RouteTableError, app_routes};
use sms_session::{
    ApiClient, ApiError, BearerAuth, ClientConfig, FileStore, Navigation, Role, Session, SessionError, SessionManager,
};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no config directory for this platform; pass --store or set SMS_SESSION_FILE")]
    NoConfigDir,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteTableError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sms-cli", about = "SMS admin session CLI")]
struct Cli {
    #[arg(long, env = "SMS_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SMS_SESSION_FILE", help = "Session file [default: <config dir>/sms/session.json]")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted session.
    Logout,
    /// Print the role of the persisted session.
    Whoami,
    /// Create an account. Does not sign in.
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SMS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role: Role,
    },
    /// GET a service path with the session's credential attached.
    Get { path: String },
    /// Show what the web client would do when opening `path`.
    Route { path: String },
}

type CliSession = SessionManager<FileStore, ApiClient>;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = open_session(cli.base_url.as_deref(), cli.store)?;
    session.restore();

    match cli.command {
        Command::Login { email, password } => run_login(&session, &email, &password).await,
        Command::Logout => {
            session.logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = session.current_user().ok_or(CliError::NotLoggedIn)?;
            println!("{}", user.role());
            Ok(())
        }
        Command::Register { full_name, email, password, role } => {
            let request = RegisterRequest { full_name, email, password, role };
            let response = session.backend().register(&request).await?;
            println!("registered {} as {}", request.email, response.role);
            Ok(())
        }
        Command::Get { path } => {
            let json = session.backend().get_json::<Value>(&path).await?;
            print_json(&json)
        }
        Command::Route { path } => {
            let table = app_routes()?;
            println!("{}", describe_navigation(&table.navigate(session.current_user().as_ref(), &path)));
            Ok(())
        }
    }
}

fn open_session(base_url: Option<&str>, store: Option<PathBuf>) -> Result<CliSession, CliError> {
    let store_path = match store {
        Some(path) => path,
        None => default_store_path().ok_or(CliError::NoConfigDir)?,
    };
    let store = Arc::new(FileStore::new(store_path));
    let api = ApiClient::builder(client_config(base_url))
        .interceptor(BearerAuth::new(Arc::clone(&store)))
        .build()?;
    Ok(SessionManager::new(store, api))
}

async fn run_login(session: &CliSession, email: &str, password: &str) -> Result<(), CliError> {
    let user: Session = session.login(email, password).await?;
    println!("logged in as {}", user.role());
    Ok(())
}

/// Environment config, with `--base-url` taking precedence.
fn client_config(base_url: Option<&str>) -> ClientConfig {
    let env = ClientConfig::from_env();
    match base_url {
        Some(url) => ClientConfig { request_timeout: env.request_timeout, ..ClientConfig::new(url) },
        None => env,
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sms").join("session.json"))
}

fn describe_navigation(navigation: &Navigation<'_, AppView>) -> String {
    match navigation {
        Navigation::Render(view) => format!("render {view:?}"),
        Navigation::Redirect(target) => format!("redirect {target}"),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
