use werewolf::realtime::SelectionKind;
use werewolf::{AppError, Delivery, GamePhase};

use crate::support::game_setup::{new_game, quick_config, roles};
use crate::support::transport::RecordingTransport;

fn gating(deliveries: Vec<Delivery>) -> Vec<Delivery> {
    deliveries
        .into_iter()
        .filter(|d| {
            matches!(
                d,
                Delivery::PhaseChanged { .. } | Delivery::InputClosed | Delivery::InputOpened
            )
        })
        .collect()
}

/// Test: villagers lose input at nightfall and get it back at dawn;
/// werewolves keep theirs.
#[tokio::test(start_paused = true)]
async fn villagers_are_silenced_at_night() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    let mut game = new_game(config.clone(), RecordingTransport::with_joins(&["wolf", "seer"]));

    game.orchestrator.run().await?;

    assert_eq!(
        gating(game.transport.deliveries_to("seer")),
        vec![
            Delivery::PhaseChanged {
                phase: GamePhase::Night,
                duration: config.night
            },
            Delivery::InputClosed,
            Delivery::PhaseChanged {
                phase: GamePhase::DayDiscussion,
                duration: config.day_discussion
            },
            Delivery::InputOpened,
            Delivery::PhaseChanged {
                phase: GamePhase::DayVoting,
                duration: config.day_voting
            },
            Delivery::InputClosed,
        ]
    );
    assert_eq!(
        gating(game.transport.deliveries_to("wolf")),
        vec![
            Delivery::PhaseChanged {
                phase: GamePhase::Night,
                duration: config.night
            },
            Delivery::PhaseChanged {
                phase: GamePhase::DayDiscussion,
                duration: config.day_discussion
            },
            Delivery::PhaseChanged {
                phase: GamePhase::DayVoting,
                duration: config.day_voting
            },
            Delivery::InputClosed,
        ],
        "the trailing close comes with GAME_OVER"
    );
    Ok(())
}

/// Test: the dead get phase changes but no prompts or input changes.
#[tokio::test(start_paused = true)]
async fn the_dead_get_no_prompts() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    config.role_distribution = roles("werewolf,villager,villager");
    let transport = RecordingTransport::with_joins(&["wolf", "v1", "v2"])
        .on_prompt("wolf", SelectionKind::NightKill, "v1");
    let mut game = new_game(config, transport);

    game.orchestrator.run().await?;

    let to_victim = game.transport.deliveries_to("v1");
    assert!(!to_victim
        .iter()
        .any(|d| matches!(d, Delivery::SelectionPrompt { .. } | Delivery::InputOpened)));
    assert_eq!(
        to_victim
            .iter()
            .filter(|d| matches!(d, Delivery::PhaseChanged { .. }))
            .count(),
        3
    );
    Ok(())
}
