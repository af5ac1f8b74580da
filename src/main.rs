use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::info;
use tokio::time::sleep;

use tripmeter::{Database, SimulatedLocationClient, TripEngine};

/// Scripted drive against the simulated GPS source: start, pause, resume,
/// stop, save, then browse and clear the history. Run with RUST_LOG=debug
/// for per-sample output.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let db_path = std::env::temp_dir().join("tripmeter.sqlite3");
    let db = Database::new(db_path)?;
    let engine = TripEngine::new(Arc::new(SimulatedLocationClient::new()), db.clone());

    let mut updates = engine.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            info!(
                "{:?}: {:>5.1} km/h  avg {:>5.1}  max {:>5.1}  {:.4} km  {} ms",
                snapshot.state,
                snapshot.current_speed_kmh,
                snapshot.avg_speed_kmh,
                snapshot.max_speed_kmh,
                snapshot.distance_km,
                snapshot.duration_ms,
            );
        }
    });

    engine.start().await?;
    sleep(Duration::from_secs(5)).await;

    engine.pause().await;
    sleep(Duration::from_secs(2)).await;

    engine.resume().await?;
    sleep(Duration::from_secs(5)).await;

    engine.stop().await;
    let trip = engine.save().await?.expect("a stopped trip to save");
    info!("Saved trip {} ({} -> {})", trip.id, trip.start, trip.end);

    let trips = db.list_trips().await?;
    println!("{}", serde_json::to_string_pretty(&trips)?);

    // Clear the demo rows so repeated runs start fresh.
    let ids: Vec<i64> = trips.iter().map(|trip| trip.id).collect();
    let deleted = db.delete_trips(&ids).await?;
    info!("Deleted {deleted} trips");

    Ok(())
}
