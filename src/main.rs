use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use nexo::routes::{self, Navigation};
use nexo::types::{OAuthProvider, RegisterProfile};
use nexo::{ApiError, AppState, ClientConfig, FileStorage, ThemePreference};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not signed in; run `nexo login` first")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "nexo", about = "Nexo project-management API client")]
struct Cli {
    /// API root, e.g. `http://localhost:5000/api`.
    #[arg(long, env = "NEXO_API_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the persisted token and theme.
    #[arg(long, env = "NEXO_STATE_DIR")]
    state_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe `GET /health`.
    Health,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NEXO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NEXO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in through `google` or `microsoft`.
    Oauth {
        provider: OAuthProvider,
    },
    Logout,
    /// Validate the stored token and print the signed-in user.
    Whoami,
    Project(ProjectCommand),
    Task(TaskCommand),
    Kpi(KpiCommand),
    Ai(AiCommand),
    Analytics {
        project_id: i64,
    },
    Theme(ThemeCommand),
    /// Show which view a path resolves to for the current session.
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProjectSubcommand {
    List {
        #[arg(long)]
        user_id: Option<i64>,
    },
    Get {
        project_id: i64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        project_id: i64,
        #[arg(long)]
        data: String,
    },
    Delete {
        project_id: i64,
    },
}

#[derive(Args, Debug)]
struct TaskCommand {
    #[command(subcommand)]
    command: TaskSubcommand,
}

#[derive(Subcommand, Debug)]
enum TaskSubcommand {
    List {
        project_id: i64,
    },
    Create {
        project_id: i64,
        #[arg(long)]
        data: String,
    },
    Update {
        task_id: i64,
        #[arg(long)]
        data: String,
    },
    Delete {
        task_id: i64,
    },
}

#[derive(Args, Debug)]
struct KpiCommand {
    #[command(subcommand)]
    command: KpiSubcommand,
}

#[derive(Subcommand, Debug)]
enum KpiSubcommand {
    List {
        project_id: i64,
    },
    Create {
        project_id: i64,
        #[arg(long)]
        data: String,
    },
    Update {
        kpi_id: i64,
        #[arg(long)]
        data: String,
    },
}

#[derive(Args, Debug)]
struct AiCommand {
    #[command(subcommand)]
    command: AiSubcommand,
}

#[derive(Subcommand, Debug)]
enum AiSubcommand {
    /// Turn a free-text description into a SMART objective.
    Objective {
        description: String,
    },
    /// Generate tasks for a project objective.
    Tasks {
        project_id: i64,
        objective: String,
    },
}

#[derive(Args, Debug)]
struct ThemeCommand {
    /// Treat the host as preferring dark mode when resolving `system`.
    #[arg(long, default_value_t = false, global = true)]
    system_dark: bool,

    #[command(subcommand)]
    command: ThemeSubcommand,
}

#[derive(Subcommand, Debug)]
enum ThemeSubcommand {
    Show,
    Set { preference: ThemePreference },
    Toggle,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env_with_base_url(cli.base_url.as_deref())?;
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let storage = Arc::new(FileStorage::new(&config.state_dir));
    let app = AppState::new(&config, storage)?;

    match cli.command {
        Command::Health => print_json(&app.gateway.health().await?),
        Command::Login { email, password } => {
            let user = app.session.login(&email, &password).await?;
            eprintln!("signed in as {}", user.display_name());
            Ok(())
        }
        Command::Register { email, password, username, name } => {
            let profile = RegisterProfile { email, password, username, name };
            let user = app.session.register(&profile).await?;
            eprintln!("registered and signed in as {}", user.display_name());
            Ok(())
        }
        Command::Oauth { provider } => {
            let user = app.session.login_with_oauth(provider).await?;
            eprintln!("signed in via {provider} as {}", user.display_name());
            Ok(())
        }
        Command::Logout => {
            app.session.logout().await;
            eprintln!("signed out");
            Ok(())
        }
        Command::Whoami => {
            if !app.session.restore().await {
                return Err(CliError::NotSignedIn);
            }
            let user = app.session.user().ok_or(CliError::NotSignedIn)?;
            print_json(&user)
        }
        Command::Project(project) => run_project(&app, project).await,
        Command::Task(task) => run_task(&app, task).await,
        Command::Kpi(kpi) => run_kpi(&app, kpi).await,
        Command::Ai(ai) => run_ai(&app, ai).await,
        Command::Analytics { project_id } => print_json(&app.gateway.project_analytics(project_id).await?),
        Command::Theme(theme) => run_theme(&app, theme),
        Command::Route { path } => {
            app.session.restore().await;
            let navigation = routes::resolve(&path, &app.session.snapshot());
            match navigation {
                Navigation::Render(view) => println!("render {}", view.path()),
                Navigation::Redirect(view) => println!("redirect {}", view.path()),
            }
            Ok(())
        }
    }
}

async fn run_project(app: &AppState, project: ProjectCommand) -> Result<(), CliError> {
    let gw = &app.gateway;
    match project.command {
        ProjectSubcommand::List { user_id } => print_json(&gw.projects(user_id).await?),
        ProjectSubcommand::Get { project_id } => print_json(&gw.project(project_id).await?),
        ProjectSubcommand::Create { data } => print_json(&gw.create_project(&parse_data(&data)?).await?),
        ProjectSubcommand::Update { project_id, data } => {
            print_json(&gw.update_project(project_id, &parse_data(&data)?).await?)
        }
        ProjectSubcommand::Delete { project_id } => {
            gw.delete_project(project_id).await?;
            eprintln!("deleted project {project_id}");
            Ok(())
        }
    }
}

async fn run_task(app: &AppState, task: TaskCommand) -> Result<(), CliError> {
    let gw = &app.gateway;
    match task.command {
        TaskSubcommand::List { project_id } => print_json(&gw.project_tasks(project_id).await?),
        TaskSubcommand::Create { project_id, data } => print_json(&gw.create_task(project_id, &parse_data(&data)?).await?),
        TaskSubcommand::Update { task_id, data } => print_json(&gw.update_task(task_id, &parse_data(&data)?).await?),
        TaskSubcommand::Delete { task_id } => {
            gw.delete_task(task_id).await?;
            eprintln!("deleted task {task_id}");
            Ok(())
        }
    }
}

async fn run_kpi(app: &AppState, kpi: KpiCommand) -> Result<(), CliError> {
    let gw = &app.gateway;
    match kpi.command {
        KpiSubcommand::List { project_id } => print_json(&gw.project_kpis(project_id).await?),
        KpiSubcommand::Create { project_id, data } => print_json(&gw.create_kpi(project_id, &parse_data(&data)?).await?),
        KpiSubcommand::Update { kpi_id, data } => print_json(&gw.update_kpi(kpi_id, &parse_data(&data)?).await?),
    }
}

async fn run_ai(app: &AppState, ai: AiCommand) -> Result<(), CliError> {
    match ai.command {
        AiSubcommand::Objective { description } => {
            print_json(&app.gateway.generate_smart_objective(&description).await?)
        }
        AiSubcommand::Tasks { project_id, objective } => {
            print_json(&app.gateway.generate_tasks(project_id, &objective).await?)
        }
    }
}

fn run_theme(app: &AppState, theme: ThemeCommand) -> Result<(), CliError> {
    match theme.command {
        ThemeSubcommand::Show => {}
        ThemeSubcommand::Set { preference } => app.theme.set(preference)?,
        ThemeSubcommand::Toggle => {
            app.theme.toggle(theme.system_dark)?;
        }
    }
    println!("{} ({})", app.theme.preference(), app.theme.resolve(theme.system_dark).as_str());
    Ok(())
}

fn parse_data(data: &str) -> Result<Value, CliError> {
    Ok(serde_json::from_str::<Value>(data)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
