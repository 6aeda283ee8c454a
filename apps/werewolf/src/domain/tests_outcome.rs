use crate::domain::{check_for_winners, Player, PlayerId, RoleName, Team, WinCheck};

fn player(id: &str, role: RoleName, dead: bool) -> Player {
    let mut p = Player::new(PlayerId::from(id), 0, id, role);
    if dead {
        p.kill();
    }
    p
}

#[test]
fn werewolves_win_when_no_villager_is_alive() {
    let players = vec![
        player("w", RoleName::Werewolf, false),
        player("s", RoleName::Seer, true),
    ];
    assert_eq!(check_for_winners(&players), WinCheck::Winner(Team::Werewolves));
}

#[test]
fn villagers_win_when_no_werewolf_is_alive() {
    let players = vec![
        player("w", RoleName::Werewolf, true),
        player("s", RoleName::Seer, false),
        player("v", RoleName::Villager, true),
    ];
    assert_eq!(check_for_winners(&players), WinCheck::Winner(Team::Villagers));
}

#[test]
fn full_wipe_has_no_winner() {
    let players = vec![
        player("w", RoleName::Werewolf, true),
        player("s", RoleName::Seer, true),
    ];
    let check = check_for_winners(&players);
    assert_eq!(check, WinCheck::NoWinner);
    assert!(check.is_over());
    assert_eq!(check.winner(), None);
}

#[test]
fn mixed_population_continues() {
    let players = vec![
        player("w", RoleName::Werewolf, false),
        player("s", RoleName::Seer, false),
    ];
    assert_eq!(check_for_winners(&players), WinCheck::Continue);
    assert!(!WinCheck::Continue.is_over());
}
