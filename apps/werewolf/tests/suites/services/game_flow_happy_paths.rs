use werewolf::realtime::{SelectionKind, SystemNotice};
use werewolf::{Announcement, AppError, Delivery, GamePhase, RoleName, Team};

use crate::support::game_setup::{new_game, quick_config, roles};
use crate::support::transport::RecordingTransport;

/// Test: the werewolf eats the seer on the first night and wins before
/// anyone gets to vote.
#[tokio::test(start_paused = true)]
async fn werewolf_wins_two_player_game_on_first_night() -> Result<(), AppError> {
    let transport =
        RecordingTransport::with_joins(&["wolf", "seer"]).on_prompt("wolf", SelectionKind::NightKill, "seer");
    let mut game = new_game(quick_config(), transport);

    let outcome = game.orchestrator.run().await?;

    assert_eq!(outcome.winner, Some(Team::Werewolves));
    assert_eq!(outcome.rounds_played, 1);
    assert!(!outcome.round_limit_reached);

    let config = quick_config();
    assert_eq!(
        game.transport.phases_seen_by("seer"),
        vec![
            (GamePhase::Night, config.night),
            (GamePhase::DayDiscussion, config.day_discussion),
        ],
        "the game ends right after the night kill"
    );

    let to_wolf = game.transport.deliveries_to("wolf");
    assert_eq!(
        to_wolf.first(),
        Some(&Delivery::RoleAssigned {
            role: RoleName::Werewolf
        })
    );
    assert!(to_wolf.contains(&Delivery::Countdown {
        duration: config.start_countdown
    }));
    assert_eq!(
        to_wolf.last(),
        Some(&Delivery::GameOver {
            winner: Some(Team::Werewolves)
        })
    );

    let announcements = game.transport.announcements();
    assert!(matches!(
        announcements.first(),
        Some(Announcement::LobbyOpened { .. })
    ));
    assert!(matches!(
        announcements.get(1),
        Some(Announcement::GameStarted { board }) if board.entries.len() == 2
    ));
    assert_eq!(
        announcements.last(),
        Some(&Announcement::GameEnded {
            winner: Some(Team::Werewolves)
        })
    );
    Ok(())
}

/// Test: with nobody acting, every phase is announced exactly once per round
/// with its configured duration until the round cap ends the game.
#[tokio::test(start_paused = true)]
async fn phases_follow_night_discussion_voting_until_round_cap() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 2;
    let transport = RecordingTransport::with_joins(&["a", "b"]);
    let mut game = new_game(config.clone(), transport);

    let outcome = game.orchestrator.run().await?;

    assert_eq!(outcome.winner, None);
    assert_eq!(outcome.rounds_played, 2);
    assert!(outcome.round_limit_reached);

    let round = [
        (GamePhase::Night, config.night),
        (GamePhase::DayDiscussion, config.day_discussion),
        (GamePhase::DayVoting, config.day_voting),
    ];
    let expected: Vec<_> = round.iter().chain(round.iter()).copied().collect();
    for player in ["a", "b"] {
        assert_eq!(game.transport.phases_seen_by(player), expected, "{player}");
        let deliveries = game.transport.deliveries_to(player);
        assert!(deliveries.contains(&Delivery::Notice {
            notice: SystemNotice::RoundLimitReached { rounds: 2 }
        }));
        assert_eq!(
            deliveries.last(),
            Some(&Delivery::GameOver { winner: None })
        );
    }
    assert_eq!(
        game.transport.announcements().last(),
        Some(&Announcement::GameEnded { winner: None })
    );
    Ok(())
}

/// Test: a custom role table is dealt in join order.
#[tokio::test(start_paused = true)]
async fn roles_are_dealt_in_join_order() -> Result<(), AppError> {
    let mut config = quick_config();
    config.max_rounds = 1;
    config.role_distribution = roles("villager,werewolf,seer");
    let transport = RecordingTransport::with_joins(&["p1", "p2", "p3", "p2"]);
    let mut game = new_game(config, transport);

    game.orchestrator.run().await?;

    for (player, role) in [
        ("p1", RoleName::Villager),
        ("p2", RoleName::Werewolf),
        ("p3", RoleName::Seer),
    ] {
        assert_eq!(
            game.transport.deliveries_to(player).first(),
            Some(&Delivery::RoleAssigned { role }),
            "{player}"
        );
    }
    let roles_dealt = game
        .transport
        .deliveries_to("p2")
        .iter()
        .filter(|d| matches!(d, Delivery::RoleAssigned { .. }))
        .count();
    assert_eq!(roles_dealt, 1, "a repeated join does not seat twice");
    Ok(())
}
