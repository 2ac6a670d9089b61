use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{ActivityIndex, EventId, RecommendedEvent, UserId};
use rand::Rng;
use server::{
    InteractionsCountRequest, RecommendationEngine, SimilarEventsRequest, UserPredictionsRequest,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// event-recs - Event Recommendation Engine
#[derive(Parser)]
#[command(name = "event-recs")]
#[command(about = "Item-based collaborative filtering over event interactions", long_about = None)]
struct Cli {
    /// Directory holding actions.dat and similarities.dat
    #[arg(short, long, env = "EVENT_RECS_DATA_DIR", default_value = "data/events")]
    data_dir: PathBuf,

    /// Print responses as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get personalized event recommendations for a user
    Recommend {
        #[arg(long)]
        user_id: UserId,

        /// Cap on recent actions used as seeds and on similarity rows read
        #[arg(long, default_value = "20", allow_negative_numbers = true)]
        limit: i32,
    },

    /// List events similar to one event that the user has not seen yet
    Similar {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        event_id: EventId,

        /// Number of similar events to return
        #[arg(long, default_value = "10", allow_negative_numbers = true)]
        limit: i32,
    },

    /// Sum interaction weights for a set of events
    Interactions {
        /// Comma-separated event ids
        #[arg(long, value_delimiter = ',', required = true)]
        event_ids: Vec<EventId>,
    },

    /// Show a user's interaction history
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Show dataset counts
    Stats,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.json {
        println!("Loading event activity from {}...", cli.data_dir.display());
    }
    let start = Instant::now();
    let index = Arc::new(
        ActivityIndex::load_from_files(&cli.data_dir)
            .context("Failed to load event activity")?,
    );
    if !cli.json {
        println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    }

    let engine = RecommendationEngine::with_memory_store(index.clone());

    match cli.command {
        Commands::Recommend { user_id, limit } => {
            let records = engine
                .get_recommendations_for_user(&UserPredictionsRequest {
                    user_id,
                    max_results: limit,
                })
                .await?;
            print_records(
                &format!("Recommendations for user {}", user_id),
                "Predicted",
                &records,
                cli.json,
            )?;
        }
        Commands::Similar {
            user_id,
            event_id,
            limit,
        } => {
            let records = engine
                .get_similar_events(&SimilarEventsRequest {
                    user_id,
                    event_id,
                    max_results: limit,
                })
                .await?;
            print_records(
                &format!("Events similar to {} (unseen by user {})", event_id, user_id),
                "Similarity",
                &records,
                cli.json,
            )?;
        }
        Commands::Interactions { event_ids } => {
            let records = engine
                .get_interactions_count(&InteractionsCountRequest { event_ids })
                .await?;
            print_records("Interaction weight per event", "Weight", &records, cli.json)?;
        }
        Commands::User { user_id } => handle_user(&index, user_id)?,
        Commands::Stats => handle_stats(&index),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, &index, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: &ActivityIndex, user_id: UserId) -> Result<()> {
    let actions = index.actions_by_user(user_id);
    if actions.is_empty() {
        bail!("User {} has no recorded actions", user_id);
    }

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    println!("{}Actions: {}", "• ".green(), actions.len());

    let mut totals: BTreeMap<EventId, f64> = BTreeMap::new();
    for action in actions {
        *totals.entry(action.event_id).or_insert(0.0) += action.weight;
    }
    println!("{}Distinct events: {}", "• ".green(), totals.len());

    let mut recent: Vec<_> = actions.iter().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    println!("Most recent actions:");
    for action in recent.iter().take(10) {
        println!(
            "  - event {} (weight {:.1}, at {})",
            action.event_id, action.weight, action.timestamp
        );
    }

    let mut heaviest: Vec<(EventId, f64)> = totals.into_iter().collect();
    heaviest.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    println!("Heaviest events:");
    for (event_id, total) in heaviest.iter().take(5) {
        println!("  - event {}: total weight {:.1}", event_id, total);
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(index: &ActivityIndex) {
    let (users, actions, similarities) = index.counts();
    println!("{}", "Dataset".bold().blue());
    println!("{}Users: {}", "• ".cyan(), users);
    println!("{}Actions: {}", "• ".cyan(), actions);
    println!("{}Similarity rows: {}", "• ".cyan(), similarities);
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: RecommendationEngine,
    index: &ActivityIndex,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let known_users = index.user_ids();
    if known_users.is_empty() || requests == 0 {
        bail!("Benchmark needs at least one user and one request");
    }

    // Pick users up front; the thread-local rng must not cross an await
    let user_ids: Vec<UserId> = {
        let mut rng = rand::rng();
        (0..requests)
            .map(|_| known_users[rng.random_range(0..known_users.len())])
            .collect()
    };

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for user_id in user_ids {
        let engine = engine.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            engine
                .get_recommendations_for_user(&UserPredictionsRequest {
                    user_id,
                    max_results: 20,
                })
                .await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print response records as a ranked table or as JSON
fn print_records(
    title: &str,
    score_label: &str,
    records: &[RecommendedEvent],
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!("{}", title.bold().blue());
    if records.is_empty() {
        println!("  {}", "(no results)".dimmed());
        return Ok(());
    }
    for (rank, record) in records.iter().enumerate() {
        println!(
            "{}. event {} - {}: {:.4}",
            (rank + 1).to_string().green(),
            record.event_id,
            score_label,
            record.score
        );
    }
    Ok(())
}
