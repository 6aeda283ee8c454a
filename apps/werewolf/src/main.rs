use std::process;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use werewolf::config::store::{redis_url, store_kind, StoreKind};
use werewolf::telemetry;
use werewolf::{
    Announcement, AppError, Delivery, GameConfig, GameId, GameOrchestrator, LobbyJoin,
    MemoryStore, PlayerEvent, PlayerId, PlayerTransport, RedisStore, Store,
};

/// Transport without a chat platform: joins come from the command line,
/// player input from stdin, and every delivery is only logged.
struct LoggingTransport {
    joins: Vec<LobbyJoin>,
    inputs: DashMap<PlayerId, mpsc::Sender<PlayerEvent>>,
}

impl LoggingTransport {
    fn new(joins: Vec<LobbyJoin>) -> Self {
        Self {
            joins,
            inputs: DashMap::new(),
        }
    }
}

#[async_trait]
impl PlayerTransport for LoggingTransport {
    async fn lobby_joins(&self, _game_id: &GameId) -> Result<Vec<LobbyJoin>, AppError> {
        Ok(self.joins.clone())
    }

    fn bind_player_input(
        &self,
        game_id: &GameId,
        player_id: &PlayerId,
        events: mpsc::Sender<PlayerEvent>,
    ) {
        debug!(game_id = %game_id, player_id = %player_id, "Input bound");
        self.inputs.insert(player_id.clone(), events);
    }

    async fn deliver(&self, player_id: &PlayerId, delivery: Delivery) -> Result<(), AppError> {
        info!(player_id = %player_id, ?delivery, "Delivery");
        Ok(())
    }

    async fn announce(&self, game_id: &GameId, announcement: Announcement) -> Result<(), AppError> {
        info!(game_id = %game_id, ?announcement, "Announcement");
        Ok(())
    }
}

/// One console line: `<player> pick <target>` or `<player> say <message>`.
fn parse_command(line: &str) -> Option<(PlayerId, PlayerEvent)> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let player = parts.next().filter(|p| !p.is_empty())?;
    let verb = parts.next()?;
    let rest = parts.next()?.trim();
    if rest.is_empty() {
        return None;
    }
    let event = match verb {
        "pick" => PlayerEvent::Select {
            target_id: PlayerId::from(rest),
            reactors: 2,
        },
        "say" => PlayerEvent::Chat {
            message: rest.to_string(),
            author_username: player.to_string(),
        },
        _ => return None,
    };
    Some((PlayerId::from(player), event))
}

/// Feed stdin commands into the bound player inputs.
///
/// Stdin is read on a plain thread so a pending read never holds up runtime
/// shutdown.
fn spawn_console(transport: Arc<LoggingTransport>) {
    let (lines_tx, mut lines) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines().map_while(Result::ok) {
            if lines_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            let Some((player_id, event)) = parse_command(&line) else {
                warn!(line = %line, "Unrecognized console command");
                continue;
            };
            let input = transport.inputs.get(&player_id).map(|entry| entry.value().clone());
            let Some(input) = input else {
                warn!(player_id = %player_id, "No input bound for player");
                continue;
            };
            if input.send(event).await.is_err() {
                debug!(player_id = %player_id, "Player input closed");
            }
        }
    });
}

/// `id` or `id=avatar`; the avatar defaults to the id.
fn parse_joins(args: impl Iterator<Item = String>) -> Vec<LobbyJoin> {
    args.filter(|arg| !arg.trim().is_empty())
        .map(|arg| match arg.split_once('=') {
            Some((id, avatar)) => LobbyJoin::new(id.trim(), avatar.trim()),
            None => LobbyJoin::new(arg.trim(), arg.trim()),
        })
        .collect()
}

async fn run() -> Result<(), AppError> {
    let config = Arc::new(GameConfig::from_env()?);

    let store: Arc<dyn Store> = match store_kind() {
        StoreKind::Redis => Arc::new(RedisStore::connect(&redis_url()).await?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };

    let joins = parse_joins(std::env::args().skip(1));
    let game_id = GameId::new(Uuid::new_v4().to_string());
    info!(game_id = %game_id, joiners = joins.len(), "Starting headless game");

    let transport = Arc::new(LoggingTransport::new(joins));
    spawn_console(transport.clone());
    let mut orchestrator = GameOrchestrator::new(game_id, config, store, transport);
    let outcome = orchestrator.run().await?;

    info!(
        winner = ?outcome.winner,
        rounds = outcome.rounds_played,
        round_limit_reached = outcome.round_limit_reached,
        "Game finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, code = %err.code(), "Game failed");
        eprintln!("❌ {err}");
        process::exit(1);
    }
}
