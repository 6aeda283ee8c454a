use werewolf::domain::ChatChannel;
use werewolf::realtime::SelectionKind;
use werewolf::{AppError, GamePhase};

use crate::support::game_setup::{new_game, quick_config, roles};
use crate::support::transport::{chat, RecordingTransport};

fn saw(seen: &[(ChatChannel, String, String)], message: &str) -> bool {
    seen.iter().any(|(_, _, m)| m == message)
}

/// Test: at night werewolves hear each other on their own channel and nobody
/// else hears anything; by day everyone alive talks in public.
#[tokio::test(start_paused = true)]
async fn night_talk_stays_among_werewolves() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    config.role_distribution = roles("werewolf,villager");
    let transport = RecordingTransport::with_joins(&["w1", "v1", "w2", "v2"])
        .on_phase("w1", GamePhase::Night, chat("w1", "hunt"))
        .on_phase("v1", GamePhase::Night, chat("v1", "help"))
        .on_phase("v1", GamePhase::DayDiscussion, chat("v1", "morning"));
    let mut game = new_game(config, transport);

    game.orchestrator.run().await?;

    let hunt = (ChatChannel::Werewolf, "w1".to_string(), "hunt".to_string());
    assert!(game.transport.chats_seen_by("w1").contains(&hunt));
    assert!(game.transport.chats_seen_by("w2").contains(&hunt));
    for villager in ["v1", "v2"] {
        assert!(!saw(&game.transport.chats_seen_by(villager), "hunt"));
    }

    let morning = (ChatChannel::Public, "v1".to_string(), "morning".to_string());
    for player in ["w1", "v1", "w2", "v2"] {
        let seen = game.transport.chats_seen_by(player);
        assert!(!saw(&seen, "help"), "{player} heard a closed input");
        assert!(seen.contains(&morning), "{player}");
    }
    Ok(())
}

/// Test: the dead whisper among themselves and still hear the living by day.
#[tokio::test(start_paused = true)]
async fn the_dead_talk_only_to_the_dead() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 2;
    config.role_distribution = roles("werewolf,villager,villager,werewolf");
    let transport = RecordingTransport::with_joins(&["w1", "ghost", "v2", "w2"])
        .on_prompt("w1", SelectionKind::NightKill, "ghost")
        .on_phase("ghost", GamePhase::Night, chat("ghost", "boo"))
        .on_phase("v2", GamePhase::DayDiscussion, chat("v2", "hello"));
    let mut game = new_game(config, transport);

    let outcome = game.orchestrator.run().await?;
    assert!(outcome.round_limit_reached);

    let boo = (ChatChannel::Dead, "ghost".to_string(), "boo".to_string());
    assert_eq!(
        game.transport
            .chats_seen_by("ghost")
            .iter()
            .filter(|line| **line == boo)
            .count(),
        1,
        "only the second night's line goes out; the first night the ghost was alive"
    );
    for living in ["w1", "v2", "w2"] {
        assert!(!saw(&game.transport.chats_seen_by(living), "boo"), "{living}");
    }

    let hello = (ChatChannel::Public, "v2".to_string(), "hello".to_string());
    assert!(game.transport.chats_seen_by("ghost").contains(&hello));
    Ok(())
}
