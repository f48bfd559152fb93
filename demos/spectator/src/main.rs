//! Watches a Sweepline lobby and logs what changes.
//!
//! ```text
//! cargo run -p spectator -- ws://127.0.0.1:8080 Watcher
//! RUST_LOG=debug cargo run -p spectator
//! ```
//!
//! Joins as a watcher (not a participant), so every team's board is
//! visible once a game is running. The assigned seat is remembered in
//! `SWEEPLINE_IDENTITY` (default `sweepline-identity.json`) and reclaimed
//! on the next run.

use std::sync::Arc;

use sweepline::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

fn log_snapshot(snapshot: &Snapshot) {
    info!(
        version = snapshot.version,
        status = ?snapshot.connection.status,
        players = snapshot.players.len(),
        teams = snapshot.teams.len(),
        in_game = snapshot.game.is_some(),
        "lobby"
    );

    let Some(game) = snapshot.game.as_ref() else {
        return;
    };
    for team in &snapshot.teams {
        let Some(data) = game.team_datas.get(&team.id) else {
            continue;
        };
        let members = snapshot.members(team.id).count();
        match data.progress.board() {
            Some(board) => info!(
                team_id = %team.id,
                name = %team.name,
                members,
                alive = data.is_alive,
                finish = ?data.finish_time,
                revealed = board.revealed_count(),
                flags = board.flag_count(),
                "team"
            ),
            None => info!(
                team_id = %team.id,
                name = %team.name,
                members,
                alive = data.is_alive,
                finish = ?data.finish_time,
                "team (hidden)"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .or_else(|| std::env::var("SWEEPLINE_URL").ok())
        .unwrap_or_else(|| ClientConfig::default().url);
    let name = args.next().unwrap_or_else(|| "Spectator".to_string());
    let identity_path = std::env::var("SWEEPLINE_IDENTITY")
        .unwrap_or_else(|_| "sweepline-identity.json".to_string());

    info!(%url, %name, identity = %identity_path, "connecting");
    let (mut client, source) = ClientBuilder::new()
        .config(ClientConfig {
            url,
            name,
            alive: false,
            ..ClientConfig::default()
        })
        .identity(Arc::new(FileIdentityStore::new(identity_path)))
        .connect()
        .await?;

    let mut snapshots = client.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            log_snapshot(&snapshot);
        }
    });

    client.join()?;
    client.run(source).await?;
    Ok(())
}
