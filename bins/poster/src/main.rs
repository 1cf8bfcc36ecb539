//! Partida batch poster
//!
//! Replays a JSON batch of ledger operations (open years, load rates and
//! accounts, commit drafts, close periods, revert journals) against an
//! in-memory ledger and prints one line per operation.
//!
//! Usage: partida <batch.json>

mod batch;

use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use partida_core::{CachedStore, JournalEngine, MemoryStore};
use partida_shared::AppConfig;
use partida_shared::config::LogConfig;

use crate::batch::{Batch, Runner};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: partida <batch.json>");
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let batch: Batch = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(path = %path.display(), operations = batch.operations.len(), "Batch loaded");

    let store = CachedStore::new(MemoryStore::new(), &config.cache);
    let engine = JournalEngine::new(store, &config.ledger);
    let mut runner = Runner::new(&engine);

    let mut rejected = 0usize;
    for op in &batch.operations {
        let outcome = runner.apply(op);
        if outcome.is_rejection() {
            rejected += 1;
        }
        println!("{outcome}");
    }

    info!(
        journals = engine.store().inner().journal_count(),
        rejected, "Batch finished"
    );
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(log.json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!log.json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}
