mod analyze_cmd;
mod api;
mod config;
mod config_cmd;
mod doctor_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use cropguard_config::{config_dir, config_file_path, load_and_prepare, CropGuardConfig};
use cropguard_logging::{init_logger, LoggerOptions};
use cropguard_session::SessionController;

use analyze_cmd::AnalyzeArgs;
use api::AppState;

#[derive(Parser)]
#[command(name = "cropguard")]
#[command(about = "CropGuard: crop disease and pest diagnosis from a photo")]
#[command(version)]
struct Cli {
    /// Config file (default: $CROPGUARD_CONFIG_DIR/config.yaml or ~/.cropguard/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MockFlag {
    /// Answer with a canned diagnosis instead of calling Gemini
    #[arg(long)]
    mock: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose one image and print the result
    Analyze {
        /// Image file to analyze
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,
        /// Read image bytes from stdin instead of a file
        #[arg(long, conflicts_with = "path")]
        stdin: bool,
        /// Content type of stdin bytes (sniffed when omitted)
        #[arg(long, requires = "stdin")]
        mime: Option<String>,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        mock: MockFlag,
    },
    /// Interactive terminal UI
    Ui {
        #[command(flatten)]
        mock: MockFlag,
    },
    /// Start the local HTTP API
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        #[command(flatten)]
        mock: MockFlag,
    },
    /// Check config and API key
    Doctor,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config with secrets masked
    Show,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        Commands::Doctor => {
            init_logger(&LoggerOptions::default());
            if !doctor_cmd::run(&config_path).await? {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            init_logger(&LoggerOptions::default());
            match action {
                ConfigAction::Show => config_cmd::show(&config_path).await?,
                ConfigAction::Init { force } => config_cmd::init(&config_path, force).await?,
            }
        }
        Commands::Analyze { path, stdin, mime, json, mock } => {
            let config = load_and_prepare(&config_path).await?;
            init_logger(&config::logger_options(&config, true));
            let controller = SessionController::new(config::build_analyzer(&config, mock.mock)?);
            let encoder = config::build_encoder(&config);
            let args = AnalyzeArgs { path, stdin, mime, json };
            let state = analyze_cmd::run(args, &controller, &encoder).await?;
            if analyze_cmd::is_failure(&state) {
                std::process::exit(1);
            }
        }
        Commands::Ui { mock } => {
            let config = load_and_prepare(&config_path).await?;
            init_logger(&ui_logger_options(&config));
            let controller = SessionController::new(config::build_analyzer(&config, mock.mock)?);
            cropguard_tui::run(controller, config::build_encoder(&config)).await?;
        }
        Commands::Serve { port, mock } => {
            let config = load_and_prepare(&config_path).await?;
            init_logger(&config::logger_options(&config, true));
            run_server(&config, port, mock.mock).await?;
        }
    }

    Ok(())
}

/// The UI owns the terminal, so logs only go to a file.
fn ui_logger_options(config: &CropGuardConfig) -> LoggerOptions {
    let mut options = config::logger_options(config, false);
    if options.dir.is_none() {
        options.dir = Some(config_dir().join("logs"));
    }
    options
}

async fn run_server(config: &CropGuardConfig, port: Option<u16>, mock: bool) -> Result<()> {
    let controller = SessionController::new(config::build_analyzer(config, mock)?);
    info!(session = %controller.session_id(), "Starting CropGuard API");

    let app_state = Arc::new(AppState {
        controller,
        encoder: config::build_encoder(config),
    });

    let app = api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = config::server_addr(config, port);

    info!(addr = %addr, "HTTP API listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
