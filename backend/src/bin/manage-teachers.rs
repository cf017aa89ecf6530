//! Maintain the teacher directory used to authorize announcement changes.
//!
//! Usage:
//!   manage-teachers add USERNAME [--display-name NAME]
//!   manage-teachers remove USERNAME
//!   manage-teachers list

use clap::{Parser, Subcommand};

use announcements_api::{config::Config, db, services::teachers::TeacherService};

#[derive(Parser)]
#[command(name = "manage-teachers", about = "Manage teachers allowed to edit announcements")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a teacher, or update the display name of an existing one
    Add {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Remove a teacher
    Remove { username: String },
    /// List all teachers
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, 2).await?;
    db::run_migrations(&pool).await?;

    match args.command {
        Command::Add { username, display_name } => {
            let teacher =
                TeacherService::upsert(&pool, &username, display_name.as_deref()).await?;
            tracing::info!("Teacher saved: {}", teacher.username);
        }
        Command::Remove { username } => {
            if TeacherService::remove(&pool, &username).await? {
                tracing::info!("Teacher removed: {}", username);
            } else {
                tracing::warn!("No teacher named {}", username);
            }
        }
        Command::List => {
            let teachers = TeacherService::list(&pool).await?;
            tracing::info!("{} teacher(s)", teachers.len());
            for t in teachers {
                tracing::info!(
                    "{}\t{}\t{}",
                    t.username,
                    t.display_name.as_deref().unwrap_or("-"),
                    t.created_at.format("%Y-%m-%d")
                );
            }
        }
    }

    Ok(())
}
