use std::sync::Arc;
use std::time::Duration;

use werewolf::domain::RoleDistribution;
use werewolf::repos::GameStateRepository;
use werewolf::store::keys;
use werewolf::{GameConfig, GameId, GameOrchestrator, MemoryStore, Store};

use super::slow_store::SlowPhaseStore;
use super::transport::RecordingTransport;

/// Short, distinct phase lengths so a whole match fits in paused time and
/// every phase can be told apart by its duration.
pub fn quick_config() -> GameConfig {
    GameConfig {
        min_players: 2,
        lobby_countdown: Duration::from_secs(2),
        start_countdown: Duration::from_secs(1),
        night: Duration::from_secs(5),
        day_discussion: Duration::from_secs(3),
        day_voting: Duration::from_secs(4),
        game_over_linger: Duration::from_secs(1),
        max_rounds: 3,
        role_distribution: RoleDistribution::default(),
    }
}

pub fn roles(table: &str) -> RoleDistribution {
    table.parse().expect("valid role table")
}

pub struct TestGame {
    pub game_id: GameId,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<RecordingTransport>,
    pub orchestrator: GameOrchestrator,
}

pub fn new_game(config: GameConfig, transport: RecordingTransport) -> TestGame {
    let store = Arc::new(MemoryStore::new());
    new_game_on(config, transport, store.clone(), store)
}

/// Like [`new_game`], but every phase write takes `latency` to land.
pub fn new_game_with_slow_phase_writes(
    config: GameConfig,
    transport: RecordingTransport,
    latency: Duration,
) -> TestGame {
    let store = Arc::new(MemoryStore::new());
    let slow: Arc<dyn Store> = Arc::new(SlowPhaseStore::new(store.as_ref().clone(), latency));
    new_game_on(config, transport, slow, store)
}

/// `backend` is what the orchestrator talks to; `store` must see the same data.
fn new_game_on(
    config: GameConfig,
    transport: RecordingTransport,
    backend: Arc<dyn Store>,
    store: Arc<MemoryStore>,
) -> TestGame {
    let game_id = GameId::new(format!("test-{}", uuid::Uuid::new_v4()));
    let transport = Arc::new(transport);
    let orchestrator =
        GameOrchestrator::new(game_id.clone(), Arc::new(config), backend, transport.clone());
    TestGame {
        game_id,
        store,
        transport,
        orchestrator,
    }
}

impl TestGame {
    /// Keys still stored under this game's namespace.
    pub async fn leftover_keys(&self) -> Vec<String> {
        self.store
            .keys_with_prefix(&keys::game_prefix(&self.game_id))
            .await
            .expect("scan keys")
    }

    pub async fn is_listed_open(&self) -> bool {
        GameStateRepository::open_games(self.store.as_ref())
            .await
            .expect("read open games")
            .contains(&self.game_id)
    }
}
