//! Probe: MyFantasyLeague export feeds
//!
//! Fetches every feed the announcer uses for the configured league and prints:
//! - Request URL and latency
//! - Top-level keys and list sizes
//! - A sample entry, to check the single-object / omitted-list quirks

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use mfl_announcer::api::{FeedType, MflClient};
use mfl_announcer::config::{AppConfig, CONFIG_PATH};
use serde_json::Value;

/// Descend through single-key wrapper objects to the first list or object
/// that carries data (`{"transactions": {"transaction": [...]}}`).
fn innermost(value: &Value) -> (Vec<&str>, &Value) {
    let mut path = Vec::new();
    let mut current = value;
    while let Some(obj) = current.as_object() {
        let mut entries = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "version" | "encoding"));
        match (entries.next(), entries.next()) {
            (Some((key, inner)), None) if inner.is_object() || inner.is_array() => {
                path.push(key.as_str());
                current = inner;
            }
            _ => break,
        }
    }
    (path, current)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load(Path::new(CONFIG_PATH))?;
    let client = MflClient::new(&config.league, config.settings.request_timeout())?;

    println!("=== Probe: MFL export feeds ===");
    println!("League: {} (season {})", config.league.id, config.league.season);
    println!();

    for feed in FeedType::ALL {
        println!("--- {} ---", feed.as_str());
        println!("URL: {}", client.export_url(feed)?);

        let start = Instant::now();
        let body = match client.fetch_raw(feed).await {
            Ok(body) => body,
            Err(e) => {
                println!("Error: {e:#}");
                println!();
                continue;
            }
        };
        println!("Latency: {:?}", start.elapsed());

        if let Some(obj) = body.as_object() {
            let keys: Vec<&String> = obj.keys().collect();
            println!("Top-level keys: {keys:?}");
        }

        let (path, inner) = innermost(&body);
        println!("Path: {}", path.join("."));
        match inner {
            Value::Array(items) => {
                println!("Entries: {}", items.len());
                if let Some(first) = items.first() {
                    println!("Sample entry (first):");
                    println!("{}", serde_json::to_string_pretty(first)?);
                }
            }
            Value::Object(_) => {
                println!("Single object (not a list):");
                println!("{}", serde_json::to_string_pretty(inner)?);
            }
            other => println!("Scalar: {other}"),
        }
        println!();
    }

    Ok(())
}
