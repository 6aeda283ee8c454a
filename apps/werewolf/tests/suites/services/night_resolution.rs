use werewolf::realtime::{SelectionKind, SystemNotice};
use werewolf::{AppError, Delivery, PlayerEvent, PlayerId, RoleName};

use crate::support::game_setup::{new_game, quick_config, roles};
use crate::support::transport::{select, RecordingTransport};

fn killed_each_morning(deliveries: &[Delivery]) -> Vec<Vec<PlayerId>> {
    deliveries
        .iter()
        .filter_map(|d| match d {
            Delivery::Notice {
                notice: SystemNotice::DayStarted {
                    killed_by_werewolves,
                    ..
                },
            } => Some(killed_by_werewolves.clone()),
            _ => None,
        })
        .collect()
}

fn recorded(deliveries: &[Delivery], kind: SelectionKind) -> Vec<PlayerId> {
    deliveries
        .iter()
        .filter_map(|d| match d {
            Delivery::SelectionRecorded { kind: k, target_id } if *k == kind => {
                Some(target_id.clone())
            }
            _ => None,
        })
        .collect()
}

/// Test: a night kill lands once; the same pick on the next night targets a
/// dead player and is ignored, so nobody dies twice.
#[tokio::test(start_paused = true)]
async fn night_kill_is_applied_exactly_once() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 2;
    config.role_distribution = roles("werewolf,villager,villager");
    let transport = RecordingTransport::with_joins(&["wolf", "v1", "v2"])
        .on_prompt("wolf", SelectionKind::NightKill, "v1");
    let mut game = new_game(config, transport);

    let outcome = game.orchestrator.run().await?;

    assert!(outcome.round_limit_reached);
    let mornings = killed_each_morning(&game.transport.deliveries_to("v2"));
    assert_eq!(mornings, vec![vec![PlayerId::from("v1")], vec![]]);

    let picks = recorded(&game.transport.deliveries_to("wolf"), SelectionKind::NightKill);
    assert_eq!(picks, vec![PlayerId::from("v1")]);
    Ok(())
}

/// Test: the dead victim is left out of the next night's candidates.
#[tokio::test(start_paused = true)]
async fn dead_players_are_not_offered_as_targets() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 2;
    config.role_distribution = roles("werewolf,villager,villager");
    let transport = RecordingTransport::with_joins(&["wolf", "v1", "v2"])
        .on_prompt("wolf", SelectionKind::NightKill, "v1");
    let mut game = new_game(config, transport);

    game.orchestrator.run().await?;

    let prompts: Vec<Vec<String>> = game
        .transport
        .deliveries_to("wolf")
        .into_iter()
        .filter_map(|d| match d {
            Delivery::SelectionPrompt {
                kind: SelectionKind::NightKill,
                candidates,
            } => Some(
                candidates
                    .entries
                    .iter()
                    .map(|e| e.player_id.as_str().to_string())
                    .collect(),
            ),
            _ => None,
        })
        .collect();
    assert_eq!(prompts, vec![vec!["v1", "v2"], vec!["v2"]]);

    let dead_prompts = game
        .transport
        .deliveries_to("v1")
        .into_iter()
        .filter(|d| matches!(d, Delivery::SelectionPrompt { .. }))
        .count();
    assert_eq!(dead_prompts, 0, "the victim dies before the first vote");
    Ok(())
}

/// Test: picking someone else revokes the first pick and only the last pick
/// dies.
#[tokio::test(start_paused = true)]
async fn retargeting_replaces_the_previous_pick() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    config.role_distribution = roles("werewolf,villager,villager");
    let transport = RecordingTransport::with_joins(&["wolf", "v1", "v2"])
        .on_prompt("wolf", SelectionKind::NightKill, "v1")
        .on_prompt("wolf", SelectionKind::NightKill, "v2");
    let mut game = new_game(config, transport);

    game.orchestrator.run().await?;

    let to_wolf = game.transport.deliveries_to("wolf");
    let selection_traffic: Vec<&Delivery> = to_wolf
        .iter()
        .filter(|d| {
            matches!(
                d,
                Delivery::SelectionRecorded { .. } | Delivery::SelectionRevoked { .. }
            )
        })
        .collect();
    assert_eq!(
        selection_traffic,
        vec![
            &Delivery::SelectionRecorded {
                kind: SelectionKind::NightKill,
                target_id: PlayerId::from("v1"),
            },
            &Delivery::SelectionRevoked {
                kind: SelectionKind::NightKill,
                target_id: PlayerId::from("v1"),
            },
            &Delivery::SelectionRecorded {
                kind: SelectionKind::NightKill,
                target_id: PlayerId::from("v2"),
            },
        ]
    );
    assert_eq!(
        killed_each_morning(&to_wolf),
        vec![vec![PlayerId::from("v2")]]
    );
    Ok(())
}

/// Test: reactions below the threshold do not count as a pick.
#[tokio::test(start_paused = true)]
async fn weak_reactions_are_ignored() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    let transport = RecordingTransport::with_joins(&["wolf", "seer"]).when(
        "wolf",
        |d| {
            matches!(
                d,
                Delivery::SelectionPrompt {
                    kind: SelectionKind::NightKill,
                    ..
                }
            )
        },
        PlayerEvent::Select {
            target_id: PlayerId::from("seer"),
            reactors: 1,
        },
    );
    let mut game = new_game(config, transport);

    let outcome = game.orchestrator.run().await?;

    assert!(outcome.round_limit_reached);
    assert!(recorded(&game.transport.deliveries_to("wolf"), SelectionKind::NightKill).is_empty());
    assert_eq!(
        killed_each_morning(&game.transport.deliveries_to("seer")),
        vec![Vec::<PlayerId>::new()]
    );
    Ok(())
}

/// Test: the seer learns one role per night; a second pick the same night
/// reveals nothing.
#[tokio::test(start_paused = true)]
async fn seer_inspects_once_per_night() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 2;
    config.role_distribution = roles("werewolf,seer,villager");
    let transport = RecordingTransport::with_joins(&["wolf", "seer", "v1"])
        .on_prompt("seer", SelectionKind::NightInspect, "wolf")
        .on_prompt("seer", SelectionKind::NightInspect, "v1");
    let mut game = new_game(config, transport);

    let outcome = game.orchestrator.run().await?;
    assert_eq!(outcome.winner, None);

    let reveals: Vec<Delivery> = game
        .transport
        .deliveries_to("seer")
        .into_iter()
        .filter(|d| matches!(d, Delivery::RoleRevealed { .. }))
        .collect();
    let wolf_revealed = Delivery::RoleRevealed {
        player_id: PlayerId::from("wolf"),
        role: RoleName::Werewolf,
    };
    assert_eq!(reveals, vec![wolf_revealed.clone(), wolf_revealed]);

    assert!(
        !game
            .transport
            .deliveries_to("wolf")
            .iter()
            .any(|d| matches!(d, Delivery::RoleRevealed { .. })),
        "reveals are private to the seer"
    );
    Ok(())
}

/// Test: selecting yourself is never recorded.
#[tokio::test(start_paused = true)]
async fn self_selection_is_ignored() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    let transport = RecordingTransport::with_joins(&["wolf", "seer"]).when(
        "wolf",
        |d| matches!(d, Delivery::SelectionPrompt { .. }),
        select("wolf"),
    );
    let mut game = new_game(config, transport);

    let outcome = game.orchestrator.run().await?;

    assert_eq!(outcome.winner, None);
    let to_wolf = game.transport.deliveries_to("wolf");
    assert!(recorded(&to_wolf, SelectionKind::NightKill).is_empty());
    assert!(recorded(&to_wolf, SelectionKind::DayVote).is_empty());
    Ok(())
}

/// Test: two werewolves on the same victim produce a single kill.
#[tokio::test(start_paused = true)]
async fn shared_target_dies_once() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    config.role_distribution = roles("werewolf,werewolf,villager,villager,villager");
    let transport = RecordingTransport::with_joins(&["w1", "w2", "v1", "v2", "v3"])
        .on_prompt("w1", SelectionKind::NightKill, "v1")
        .on_prompt("w2", SelectionKind::NightKill, "v1");
    let mut game = new_game(config, transport);

    let outcome = game.orchestrator.run().await?;

    assert!(outcome.round_limit_reached);
    assert_eq!(
        killed_each_morning(&game.transport.deliveries_to("v2")),
        vec![vec![PlayerId::from("v1")]]
    );
    for wolf in ["w1", "w2"] {
        assert_eq!(
            recorded(&game.transport.deliveries_to(wolf), SelectionKind::NightKill),
            vec![PlayerId::from("v1")]
        );
    }
    Ok(())
}
