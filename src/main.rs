use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use freeze3b::api;
use freeze3b::config::Settings;
use freeze3b::telemetry::HttpTelemetry;
use freeze_core::local::LocalWorkflowStore;
use freeze_core::models::{Bureau, IssueType, WorkflowStep};
use freeze_core::workflow::{AnonymousFlow, Checklist, CHECKLIST_ITEMS};
use freeze_core::WorkflowMigrator;

#[derive(Parser)]
#[command(name = "freeze3b")]
#[command(about = "Guided credit freezes at all three bureaus")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve,
    /// Walk the freeze workflow anonymously on this device
    Flow {
        /// Breach code this visit came from
        #[arg(long)]
        breach: Option<String>,

        #[command(subcommand)]
        action: FlowAction,
    },
    /// Sign in on this device and move its anonymous progress to the account
    Login {
        #[arg(long)]
        user: Uuid,
    },
    /// Check server status
    Status,
}

#[derive(Subcommand)]
enum FlowAction {
    /// Show where the workflow stands
    Show,
    /// Mark preparation items ready (1-based) and leave the checklist
    Checklist {
        /// Mark every item ready
        #[arg(long)]
        all: bool,

        items: Vec<usize>,
    },
    /// Confirm the freeze is in place at a bureau
    Confirm {
        #[arg(value_parser = parse_bureau)]
        bureau: Bureau,
    },
    /// Move past a bureau after running into a problem
    Skip {
        #[arg(value_parser = parse_bureau)]
        bureau: Bureau,

        #[arg(long, value_parser = parse_issue_type, default_value = "other")]
        issue: IssueType,

        #[arg(long)]
        details: Option<String>,
    },
    /// Jump to a step without changing what is recorded
    Goto {
        #[arg(value_parser = parse_step)]
        step: WorkflowStep,
    },
}

fn parse_bureau(s: &str) -> Result<Bureau, String> {
    Bureau::from_str(&s.to_lowercase()).ok_or_else(|| format!("unknown bureau: {s}"))
}

fn parse_issue_type(s: &str) -> Result<IssueType, String> {
    IssueType::from_str(s).ok_or_else(|| format!("unknown issue type: {s}"))
}

fn parse_step(s: &str) -> Result<WorkflowStep, String> {
    WorkflowStep::from_str(&s.to_lowercase()).ok_or_else(|| format!("unknown step: {s}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "freeze3b=debug,freeze_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&settings).await?,
        Commands::Flow { breach, action } => run_flow(&settings, breach.as_deref(), action).await?,
        Commands::Login { user } => {
            let db = settings.open_database()?;
            let local = LocalWorkflowStore::new(settings.device_store()?);
            let outcome = WorkflowMigrator::new(&local, &db).run(user);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Status => {
            let url = format!("{}/health", settings.server.trim_end_matches('/'));
            match reqwest::get(&url).await {
                Ok(response) if response.status().is_success() => {
                    println!("freeze3b server is running at {}", settings.server);
                }
                Ok(response) => println!("freeze3b server answered {}", response.status()),
                Err(e) => {
                    tracing::debug!(error = %e, "Health check failed");
                    println!("freeze3b server is not reachable at {}", settings.server);
                }
            }
        }
    }

    Ok(())
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let port = settings.port;
    tracing::info!("Starting freeze3b server on port {}", port);

    let db = settings.open_database()?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("freeze3b server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("freeze3b server stopped");
    Ok(())
}

async fn run_flow(settings: &Settings, breach: Option<&str>, action: FlowAction) -> anyhow::Result<()> {
    let local = LocalWorkflowStore::new(settings.device_store()?);
    let telemetry = HttpTelemetry::new(settings.server.clone());

    {
        let mut flow = match breach {
            Some(code) => AnonymousFlow::start_breach(&local, &telemetry, code),
            None => AnonymousFlow::start_direct(&local, &telemetry),
        };

        match action {
            FlowAction::Show => {}
            FlowAction::Checklist { all, items } => {
                let mut checklist = if all { Checklist::all_ready() } else { Checklist::new() };
                for item in items {
                    if item == 0 || !checklist.mark(item - 1, true) {
                        anyhow::bail!("no checklist item {item}");
                    }
                }
                flow.complete_checklist(&checklist)?;
            }
            FlowAction::Confirm { bureau } => {
                flow.confirm(bureau)?;
            }
            FlowAction::Skip { bureau, issue, details } => {
                flow.skip(bureau, issue, details)?;
            }
            FlowAction::Goto { step } => flow.navigate(step),
        }

        print_step(flow.current_step(), flow.state().progress.completed_bureaus());
    }

    if telemetry.pending() > 0 {
        let sent = telemetry.flush().await;
        tracing::debug!(sent, "Flushed anonymous telemetry");
    }
    Ok(())
}

fn print_step(step: WorkflowStep, completed: Vec<Bureau>) {
    println!("Current step: {step}");
    match step {
        WorkflowStep::Checklist => {
            for (i, item) in CHECKLIST_ITEMS.iter().enumerate() {
                println!("  {}. {item}", i + 1);
            }
        }
        WorkflowStep::Complete => {
            let done: Vec<_> = completed.iter().map(|b| b.display_name()).collect();
            println!("Frozen: {}", if done.is_empty() { "none".to_string() } else { done.join(", ") });
        }
        _ => {
            if let Some(bureau) = step.bureau() {
                println!("Freeze at {}: {}", bureau.display_name(), bureau.freeze_url());
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
