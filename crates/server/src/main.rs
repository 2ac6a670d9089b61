//! Simple test harness for the recommendation engine.
//!
//! Loads an activity export into memory and prints the response of each
//! operation for one user/event pair.
//!
//! Usage: `server [DATA_DIR] [USER_ID] [EVENT_ID]`

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use data_loader::{ActivityIndex, EventId, UserId};
use server::{
    InteractionsCountRequest, RecommendationEngine, SimilarEventsRequest, UserPredictionsRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,server=debug,pipeline=debug")
                }),
        )
        .init();

    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data/events".to_string()));
    let user_id = args
        .next()
        .map(|s| s.parse::<UserId>())
        .transpose()
        .context("USER_ID must be an integer")?
        .unwrap_or(1);
    let event_id = args
        .next()
        .map(|s| s.parse::<EventId>())
        .transpose()
        .context("EVENT_ID must be an integer")?
        .unwrap_or(1);

    info!("Starting event recommendation test harness");
    let index = Arc::new(
        ActivityIndex::load_from_files(&data_dir)
            .with_context(|| format!("Failed to load activity from {}", data_dir.display()))?,
    );
    let engine = RecommendationEngine::with_memory_store(index);

    let recommendations = engine
        .get_recommendations_for_user(&UserPredictionsRequest {
            user_id,
            max_results: 20,
        })
        .await?;
    println!("\nRecommendations for user {}:", user_id);
    for rec in &recommendations {
        println!("  event {:>8}  score {:.4}", rec.event_id, rec.score);
    }

    let similar = engine
        .get_similar_events(&SimilarEventsRequest {
            user_id,
            event_id,
            max_results: 10,
        })
        .await?;
    println!("\nEvents similar to {}:", event_id);
    for rec in &similar {
        println!("  event {:>8}  similarity {:.4}", rec.event_id, rec.score);
    }

    let mut event_ids: Vec<_> = recommendations.iter().map(|r| r.event_id).collect();
    event_ids.push(event_id);
    let counts = engine
        .get_interactions_count(&InteractionsCountRequest { event_ids })
        .await?;
    println!("\nInteraction weight:");
    for rec in &counts {
        println!("  event {:>8}  weight {:.1}", rec.event_id, rec.score);
    }

    Ok(())
}
