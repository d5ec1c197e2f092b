pub mod account;
pub mod output;
pub mod report;
pub mod todos;

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{process_report_command, ReportCommand};
use todos::LifecycleAction;
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    provider::{
        auth::{AuthGateway, LocalAuthGateway},
        json_store::JsonRecordStore,
    },
    tasks::TodoEditForm,
    utils::{dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Tsumiage", version, long_about = None)]
#[command(about = "Track tasks, timers and breaks from the terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Create an account")]
    Signup {
        email: String,
        password: String,
    },
    #[command(about = "Sign in and store the session")]
    Signin {
        email: String,
        password: String,
    },
    #[command(about = "Drop the stored session")]
    Signout {},
    #[command(about = "Show the signed-in account and its daily goal")]
    Whoami {},
    #[command(about = "Set or clear today's goal for the account")]
    Goal {
        text: Option<String>,
        #[arg(long, help = "Remove the goal instead of setting it")]
        clear: bool,
    },
    #[command(about = "Create a task")]
    Add {
        title: String,
        #[arg(long, help = "Goal for the week attached to this task")]
        goal_week: Option<String>,
        #[arg(long, help = "Goal for today attached to this task")]
        goal_day: Option<String>,
    },
    #[command(about = "List your tasks, newest first, five per page")]
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, help = "Group tasks by their daily goal")]
        by_goal: bool,
    },
    #[command(about = "Start a task's timer")]
    Start { id: String },
    #[command(about = "Stop a task's timer")]
    Stop { id: String },
    #[command(about = "Begin a break on a running task")]
    BreakStart { id: String },
    #[command(about = "End the current break")]
    BreakEnd { id: String },
    #[command(about = "Edit a task in place")]
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = "Progress note. Pass an empty string to clear it")]
        report: Option<String>,
        #[arg(long, help = "Pass an empty string to clear it")]
        goal_week: Option<String>,
        #[arg(long, help = "Pass an empty string to clear it")]
        goal_day: Option<String>,
    },
    #[command(about = "Delete a task")]
    Delete {
        id: String,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Show today's and this week's progress charts")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = create_application_default_path()?;
    enable_logging(&app_dir, logging_level, args.log)?;

    let auth = LocalAuthGateway::new(app_dir.join("auth"))?;
    let store = JsonRecordStore::new(app_dir.join("store"))?;
    let mut session_changes = auth.subscribe();

    match args.commands {
        Commands::Signup { email, password } => {
            account::sign_up(&auth, &email, &password).await?
        }
        Commands::Signin { email, password } => {
            account::sign_in(&auth, store, &email, &password).await?
        }
        Commands::Signout {} => account::sign_out(&auth).await?,
        Commands::Whoami {} => account::whoami(&auth, store).await?,
        Commands::Goal { text, clear } => account::set_goal(&auth, store, text, clear).await?,
        Commands::Add {
            title,
            goal_week,
            goal_day,
        } => {
            let session = account::require_session(&auth).await?;
            todos::add(store, session, title, goal_week, goal_day).await?
        }
        Commands::List { page, by_goal } => {
            let session = account::require_session(&auth).await?;
            todos::list(store, session, page, by_goal).await?
        }
        Commands::Start { id } => {
            let session = account::require_session(&auth).await?;
            todos::lifecycle(store, session, &id, LifecycleAction::Start).await?
        }
        Commands::Stop { id } => {
            let session = account::require_session(&auth).await?;
            todos::lifecycle(store, session, &id, LifecycleAction::Stop).await?
        }
        Commands::BreakStart { id } => {
            let session = account::require_session(&auth).await?;
            todos::lifecycle(store, session, &id, LifecycleAction::BreakStart).await?
        }
        Commands::BreakEnd { id } => {
            let session = account::require_session(&auth).await?;
            todos::lifecycle(store, session, &id, LifecycleAction::BreakEnd).await?
        }
        Commands::Edit {
            id,
            title,
            report,
            goal_week,
            goal_day,
        } => {
            let session = account::require_session(&auth).await?;
            let form = TodoEditForm {
                title,
                report,
                goal_week,
                goal_day,
            };
            todos::edit(store, session, &id, form).await?
        }
        Commands::Delete { id, yes } => {
            let session = account::require_session(&auth).await?;
            if yes {
                todos::delete(store, session, &id, |_| Ok(true)).await?
            } else {
                todos::delete(store, session, &id, todos::interactive_confirm).await?
            }
        }
        Commands::Report { command } => {
            let session = account::require_session(&auth).await?;
            process_report_command(store, session, command).await?
        }
    }

    if session_changes.has_changed().unwrap_or(false) {
        debug!("Session changed during this invocation");
    }
    Ok(())
}
