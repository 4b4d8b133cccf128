use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobfeed::config::{FeedSettings, DEFAULT_PAGE_SIZE};
use jobfeed::models::{NewSubmission, Submission};
use jobfeed::store::{SqliteStore, SubmissionStore};
use jobfeed::view::{mount, FeedUpdate};

#[derive(Parser)]
#[command(name = "jobfeed")]
#[command(about = "Live feed over the job-application submission log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema if it does not exist yet
    Init {
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Append sample submissions, standing in for the automation process
    Seed {
        #[arg(short, long)]
        database: Option<PathBuf>,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, default_value_t = 5)]
        count: u32,
    },
    /// Fetch one older page and print it as JSON lines
    Page {
        #[arg(short, long)]
        database: Option<PathBuf>,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        before: Option<i64>,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Mount a live view: backfill the history, then tail new submissions
    Watch {
        #[arg(short, long)]
        database: Option<PathBuf>,
        #[arg(short, long)]
        email: String,
        #[arg(long, default_value_t = 10)]
        interval_secs: u64,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { database } => {
            let store = open_store(database).await?;
            store.ensure_schema().await?;
            println!("✓ Schema ready");
        }
        Commands::Seed {
            database,
            email,
            count,
        } => {
            let store = open_store(database).await?;
            store.ensure_schema().await?;
            let user_id = store.provision_user(&email).await?;

            for i in 0..count {
                let submission = sample_submission(i);
                let id = store.insert_submission(user_id, &submission).await?;
                println!("✓ Appended #{} {}: {}", id, submission.company, submission.title);
            }
        }
        Commands::Page {
            database,
            email,
            before,
            limit,
        } => {
            let store = open_store(database).await?;
            let user_id = resolve_user(&store, &email).await?;

            let rows = store.page_before(user_id, limit, before).await?;
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
        Commands::Watch {
            database,
            email,
            interval_secs,
            page_size,
        } => {
            let store = open_store(database).await?;
            let user_id = resolve_user(&store, &email).await?;

            let settings = FeedSettings {
                page_size,
                poll_interval: Duration::from_secs(interval_secs),
                ..FeedSettings::default()
            };

            let (handle, mut updates) = mount(store, user_id, settings);

            // the console has no scroll position; the sentinel is always
            // visible, so the whole history backfills before tailing
            handle.report_visibility(1.0).await;

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    update = updates.recv() => {
                        let Some(update) = update else { break };
                        match update {
                            FeedUpdate::Prepended(rows) => {
                                for row in &rows {
                                    print_row("new", row);
                                }
                            }
                            FeedUpdate::Appended(rows) => {
                                for row in &rows {
                                    print_row("log", row);
                                }
                            }
                            FeedUpdate::EndReached => {
                                println!("-- end of history, tailing --");
                            }
                            FeedUpdate::PageFailed(message) => {
                                eprintln!("✗ History load failed: {}", message);
                            }
                            FeedUpdate::PollFailed(message) => {
                                eprintln!("✗ Poll failed: {}", message);
                            }
                        }
                    }
                }
            }

            handle.unmount().await;
        }
    }

    Ok(())
}

/// Database path from the flag, falling back to JOBFEED_DB. A missing
/// path is a startup error, not something to discover per request.
async fn open_store(flag: Option<PathBuf>) -> Result<SqliteStore> {
    let path = match flag {
        Some(path) => path,
        None => std::env::var("JOBFEED_DB")
            .map(PathBuf::from)
            .map_err(|_| anyhow::anyhow!("no database configured: pass --database or set JOBFEED_DB"))?,
    };

    let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    Ok(store)
}

async fn resolve_user(store: &SqliteStore, email: &str) -> Result<i64> {
    store
        .user_id_for_email(email)
        .await?
        .with_context(|| format!("no user provisioned for {}", email))
}

fn print_row(tag: &str, row: &Submission) {
    let location = if row.location.is_empty() {
        "-"
    } else {
        &row.location
    };
    let link = row.link.as_deref().unwrap_or("no link");

    println!(
        "[{}] #{} {}: {} ({}) {}",
        tag, row.id, row.company, row.title, location, link
    );
}

fn sample_submission(index: u32) -> NewSubmission {
    let companies = ["Initech", "Globex", "Umbrella", "Hooli", "Stark Industries"];
    let titles = [
        "Backend Engineer",
        "Platform Engineer",
        "Site Reliability Engineer",
        "Data Engineer",
        "Staff Engineer",
    ];

    let company = companies[index as usize % companies.len()];
    let title = titles[index as usize % titles.len()];

    NewSubmission {
        company: company.to_string(),
        title: title.to_string(),
        location: "Remote".to_string(),
        recruiter_link: None,
        link: Some(format!(
            "https://jobs.example.com/{}/{}",
            company.to_lowercase().replace(' ', "-"),
            index
        )),
        pdf_path: None,
    }
}
