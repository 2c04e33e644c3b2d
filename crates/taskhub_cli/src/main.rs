//! Operator CLI for TaskHub.
//!
//! # Responsibility
//! - Verify `taskhub_core` linkage and migrate the configured database.
//! - Run membership batches and reports from a shell.
//!
//! Database and logging come from `TASKHUB_DB_PATH`, `TASKHUB_LOG_LEVEL`
//! and `TASKHUB_LOG_DIR`.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use taskhub_api::{reports, ApiResponse, Caller, TaskhubConfig};
use taskhub_core::db::migrations::latest_version;

/// Membership batches from the CLI run with operator privileges.
const OPERATOR: Caller = Caller {
    user_id: 0,
    is_staff: true,
};

#[derive(Parser)]
#[command(name = "taskhub")]
#[command(about = "TaskHub operator tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core health and version
    Ping,
    /// Open the configured database and apply pending migrations
    Migrate,
    /// Add or remove project members
    #[command(subcommand)]
    Members(MembersCommand),
    /// Print project details as JSON
    Projects,
    /// Print a to-do report as JSON
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
enum MembersCommand {
    /// Add users to a project
    Add(MembersArgs),
    /// Remove users from a project
    Remove(MembersArgs),
}

#[derive(Args)]
struct MembersArgs {
    project_id: i64,
    /// JSON array of user ids, e.g. `[1, 2, 3]`
    #[arg(long = "user-ids")]
    user_ids: String,
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Completed and pending counts per user
    TodoStats,
    /// Users with the most pending to-dos
    TopPending {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Completed to-dos created in an inclusive epoch-ms range
    Completed {
        #[arg(long)]
        start: i64,
        #[arg(long)]
        end: i64,
    },
    /// Every to-do with its creator
    Todos,
    /// Users with exactly N pending to-dos
    Pending { count: u32 },
    /// Projects with a member whose name starts or ends with a letter
    NameEdge {
        #[arg(long, default_value_t = 'a')]
        letter: char,
    },
    /// Member to-do counts per project
    ProjectReport,
    /// Project names per user grouped by status
    UserProjects,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping => {
            println!("taskhub_core ping={}", taskhub_core::ping());
            println!("taskhub_core version={}", taskhub_core::core_version());
            Ok(())
        }
        command => run_with_db(command),
    }
}

fn run_with_db(command: Commands) -> anyhow::Result<()> {
    let config = TaskhubConfig::from_env();
    config.init_logging().context("logging init failed")?;
    let mut conn = config
        .open_db()
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    let response = match command {
        Commands::Ping | Commands::Migrate => {
            println!(
                "database {} at schema version {}",
                config.db_path.display(),
                latest_version()
            );
            return Ok(());
        }
        Commands::Members(MembersCommand::Add(args)) => {
            let body = members_body(&args)?;
            taskhub_api::add_members(&mut conn, &OPERATOR, args.project_id, &body)
        }
        Commands::Members(MembersCommand::Remove(args)) => {
            let body = members_body(&args)?;
            taskhub_api::remove_members(&mut conn, &OPERATOR, args.project_id, &body)
        }
        Commands::Projects => reports::project_details(&conn),
        Commands::Report(ReportCommand::TodoStats) => reports::user_todo_stats(&conn),
        Commands::Report(ReportCommand::TopPending { limit }) => {
            reports::top_pending_users(&conn, limit)
        }
        Commands::Report(ReportCommand::Completed { start, end }) => {
            reports::completed_todos_between(&conn, start, end)
        }
        Commands::Report(ReportCommand::Todos) => reports::todos_with_creator(&conn),
        Commands::Report(ReportCommand::Pending { count }) => {
            reports::users_with_pending_count(&conn, count)
        }
        Commands::Report(ReportCommand::NameEdge { letter }) => {
            reports::projects_with_member_name_edge(&conn, letter)
        }
        Commands::Report(ReportCommand::ProjectReport) => reports::project_wise_report(&conn),
        Commands::Report(ReportCommand::UserProjects) => reports::user_wise_project_status(&conn),
    };

    print_response(&response)
}

fn members_body(args: &MembersArgs) -> anyhow::Result<serde_json::Value> {
    let user_ids: serde_json::Value =
        serde_json::from_str(&args.user_ids).context("--user-ids must be JSON")?;
    Ok(serde_json::json!({ "user_ids": user_ids }))
}

fn print_response(response: &ApiResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if response.is_success() {
        Ok(())
    } else {
        Err(anyhow!("request failed with status {}", response.status))
    }
}
