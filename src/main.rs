use anyhow::Result;
use clap::{Parser, Subcommand};
use leetspace_lib::dashboard::DashboardQuery;
use leetspace_lib::routes;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "leetspace")]
#[command(about = "Practice analytics and daily revision scheduling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the dashboard for an owner
    Dashboard {
        /// Authenticated owner id
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,

        /// Shift the rotation day index (dev overrides only)
        #[arg(long, allow_hyphen_values = true)]
        day_offset: Option<i64>,

        /// Show today's pick even if locked (dev overrides only)
        #[arg(long)]
        ignore_lock: bool,
    },
    /// Lock today's revision
    LockToday {
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,
    },
    /// Remove today's revision lock
    UnlockToday {
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,
    },
    /// Print the spaced-repetition summary
    SpacedRepetition {
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,
    },
    /// Grade a review of one record (quality 0-5)
    Review {
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,

        /// Record id
        #[arg(long)]
        id: String,

        #[arg(long)]
        quality: u8,
    },
    /// Skip today's review of one record
    Skip {
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,

        /// Record id
        #[arg(long)]
        id: String,
    },
    /// Insert deterministic demo records
    Seed {
        #[arg(long, env = "LEETSPACE_OWNER")]
        owner: String,

        #[arg(long, default_value = "20")]
        count: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let state = leetspace_lib::bootstrap();

    match cli.command {
        Commands::Dashboard { owner, day_offset, ignore_lock } => {
            let query = DashboardQuery { day_offset, ignore_lock };
            print_json(&routes::get_dashboard(&state, &owner, query).await?)
        }
        Commands::LockToday { owner } => print_json(&routes::lock_today(&state, &owner).await?),
        Commands::UnlockToday { owner } => print_json(&routes::unlock_today(&state, &owner).await?),
        Commands::SpacedRepetition { owner } => {
            print_json(&routes::get_spaced_repetition(&state, &owner).await?)
        }
        Commands::Review { owner, id, quality } => {
            print_json(&routes::review_problem(&state, &owner, &id, quality).await?)
        }
        Commands::Skip { owner, id } => print_json(&routes::skip_revision(&state, &owner, &id).await?),
        Commands::Seed { owner, count, seed } => {
            let inserted = routes::seed_demo_records(&state, &owner, count, seed).await?;
            print_json(&serde_json::json!({ "inserted": inserted }))
        }
    }
}
