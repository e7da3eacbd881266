use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starter_kit::auth::AuthService;
use starter_kit::config::EnvConfig;
use starter_kit::constants::storage_keys;
use starter_kit::i18n::{detect_language, I18n};
use starter_kit::mock::{self, MockStateInner};
use starter_kit::store::{AppStore, FileStorage, Storage, Theme};
use starter_kit::validation::LoginForm;
use starter_kit::{metrics, ClientOptions, HttpClient, RequestConfig};

#[derive(Parser)]
#[command(name = "starter-kit", version, about = "Application client kit")]
struct Cli {
    /// Override API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Bearer token for this call instead of the stored one
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GET an endpoint and print the body
    Get { endpoint: String },
    /// POST a JSON body
    Post {
        endpoint: String,
        #[arg(long)]
        data: Option<String>,
    },
    /// PUT a JSON body
    Put {
        endpoint: String,
        #[arg(long)]
        data: Option<String>,
    },
    /// DELETE an endpoint
    Delete { endpoint: String },
    /// Sign in and keep the access token for later calls
    Login { email: String, password: String },
    /// Sign out and forget the access token
    Logout,
    /// Show the signed-in user
    Profile,
    /// Show or change persisted UI preferences
    Prefs {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        toggle_sidebar: bool,
    },
    /// Translate a key
    Translate {
        key: String,
        #[arg(long)]
        lang: Option<String>,
        /// Interpolation variable as name=value
        #[arg(long = "var")]
        vars: Vec<String>,
    },
    /// Run the mock API
    MockServer {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,starter_kit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = EnvConfig::from_env().context("Failed to load configuration")?;
    metrics::init_metrics();

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.store_path));

    match cli.command {
        Command::MockServer { port } => run_mock_server(port).await,
        Command::Prefs {
            theme,
            language,
            toggle_sidebar,
        } => {
            let mut store = AppStore::load(storage);
            if let Some(theme) = theme {
                store.set_theme(theme);
            }
            if let Some(language) = language {
                store.set_language(language);
            }
            if toggle_sidebar {
                store.toggle_sidebar();
            }
            print_json(&serde_json::to_value(store.persisted())?)
        }
        Command::Translate { key, lang, vars } => {
            let store = AppStore::load(storage);
            let language = detect_language(lang.as_deref(), Some(store.language()));
            let i18n = I18n::load(&config.locales_dir, &language);

            let vars = parse_vars(&vars)?;
            let vars: Vec<(&str, &str)> =
                vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            println!("{}", i18n.t_with(&key, &vars));
            Ok(())
        }
        command => {
            let mut base_url = cli.base_url.unwrap_or_else(|| config.api_base_url.clone());

            // MOCK_API answers calls from an in-process backend
            let _mock = if config.mock_api {
                let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
                let (addr, handle) = mock::spawn(addr, MockStateInner::shared()).await?;
                base_url = format!("http://{}/api", addr);
                Some(handle)
            } else {
                None
            };

            let client = HttpClient::new(
                ClientOptions::new()
                    .base_url(base_url)
                    .timeout(Duration::from_millis(config.api_timeout_ms)),
            );
            let request_config = cli
                .timeout
                .map(|ms| RequestConfig::new().timeout_ms(ms));

            run_client_command(command, client, request_config, cli.token, storage).await
        }
    }
}

async fn run_client_command(
    command: Command,
    mut client: HttpClient,
    request_config: Option<RequestConfig>,
    token: Option<String>,
    storage: Arc<dyn Storage>,
) -> Result<()> {
    let token = match token {
        Some(token) => Some(token),
        None => storage.get_item(storage_keys::ACCESS_TOKEN)?,
    };
    if let Some(token) = token {
        client
            .set_auth(token.trim())
            .context("Access token is not a valid header value")?;
    }

    match command {
        Command::Get { endpoint } => {
            send(&client, Method::GET, &endpoint, None, request_config).await
        }
        Command::Post { endpoint, data } => {
            let body = parse_body(data.as_deref())?;
            send(&client, Method::POST, &endpoint, body, request_config).await
        }
        Command::Put { endpoint, data } => {
            let body = parse_body(data.as_deref())?;
            send(&client, Method::PUT, &endpoint, body, request_config).await
        }
        Command::Delete { endpoint } => {
            send(&client, Method::DELETE, &endpoint, None, request_config).await
        }
        Command::Login { email, password } => {
            let mut service = AuthService::new(client, AppStore::load(storage.clone()));
            let auth = service.login(&LoginForm::new(email, password)).await?;
            storage.set_item(storage_keys::ACCESS_TOKEN, &auth.token)?;
            print_json(&serde_json::to_value(&auth.user)?)
        }
        Command::Logout => {
            let mut service = AuthService::new(client, AppStore::load(storage.clone()));
            service.logout().await;
            storage.remove_item(storage_keys::ACCESS_TOKEN)?;
            Ok(())
        }
        Command::Profile => {
            let mut service = AuthService::new(client, AppStore::load(storage.clone()));
            let result = service.refresh_profile().await;
            if !service.client().is_authenticated() {
                storage.remove_item(storage_keys::ACCESS_TOKEN)?;
            }
            print_json(&serde_json::to_value(result?)?)
        }
        Command::Prefs { .. } | Command::Translate { .. } | Command::MockServer { .. } => {
            Err(anyhow!("Command does not talk to the API"))
        }
    }
}

async fn send(
    client: &HttpClient,
    method: Method,
    endpoint: &str,
    body: Option<Value>,
    config: Option<RequestConfig>,
) -> Result<()> {
    let data = client
        .request_value(method, endpoint, body.as_ref(), config)
        .await?;
    print_json(&data)
}

async fn run_mock_server(port: u16) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind mock server")?;

    info!("Mock API listening on {}", addr);

    axum::serve(listener, mock::create_router(MockStateInner::shared()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Mock server error")?;

    info!("Mock server shutdown complete");
    Ok(())
}

fn parse_body(data: Option<&str>) -> Result<Option<Value>> {
    data.map(|raw| serde_json::from_str(raw).context("--data must be valid JSON"))
        .transpose()
}

fn parse_vars(vars: &[String]) -> Result<Vec<(String, String)>> {
    vars.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("--var expects name=value, got '{}'", pair))
        })
        .collect()
}

fn print_json(value: &Value) -> Result<()> {
    match value {
        Value::String(text) => println!("{}", text),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
