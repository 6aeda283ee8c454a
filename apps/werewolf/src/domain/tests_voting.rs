use crate::domain::voting::{VoteChange, Voting, VotingResult};
use crate::domain::PlayerId;

fn id(s: &str) -> PlayerId {
    PlayerId::from(s)
}

#[test]
fn toggle_same_target_withdraws_vote() {
    let mut voting = Voting::new("day-village");
    assert_eq!(voting.set_vote(&id("a"), &id("x")), VoteChange::Cast);
    assert_eq!(voting.set_vote(&id("a"), &id("x")), VoteChange::Withdrawn);

    assert!(voting.votes_by(&id("a")).is_empty());
    assert!(voting.is_empty());
    assert!(voting.results().is_empty());
}

#[test]
fn changing_target_replaces_instead_of_appending() {
    let mut voting = Voting::new("day-village");
    voting.set_vote(&id("a"), &id("x"));
    assert_eq!(
        voting.set_vote(&id("a"), &id("y")),
        VoteChange::Changed { previous: id("x") }
    );

    assert_eq!(voting.votes_by(&id("a")), &[id("y")]);
    assert_eq!(voting.vote_count(&id("x")), 0);
    assert_eq!(voting.vote_count(&id("y")), 1);
}

#[test]
fn three_voters_two_for_x() {
    let mut voting = Voting::new("day-village");
    voting.set_vote(&id("A"), &id("X"));
    voting.set_vote(&id("B"), &id("Y"));
    voting.set_vote(&id("C"), &id("X"));

    let results = voting.results();
    assert_eq!(
        results[0],
        VotingResult {
            target_id: id("X"),
            count: 2
        }
    );
    assert_eq!(results[1].target_id, id("Y"));
}

#[test]
fn ties_rank_the_later_discovered_target_first() {
    let mut voting = Voting::new("day-village");
    voting.set_vote(&id("a"), &id("x"));
    voting.set_vote(&id("b"), &id("y"));
    voting.set_vote(&id("c"), &id("z"));

    let results = voting.results();
    let order: Vec<&str> = results.iter().map(|r| r.target_id.as_str()).collect();
    assert_eq!(order, vec!["z", "y", "x"]);
}

#[test]
fn withdrawn_voter_reenters_at_the_end() {
    let mut voting = Voting::new("day-village");
    voting.set_vote(&id("a"), &id("x"));
    voting.set_vote(&id("b"), &id("y"));
    // a withdraws, then votes x again: x is now discovered after y.
    voting.set_vote(&id("a"), &id("x"));
    voting.set_vote(&id("a"), &id("x"));

    let voters: Vec<&str> = voting.voters().map(|v| v.as_str()).collect();
    assert_eq!(voters, vec!["b", "a"]);
    let results = voting.results();
    let order: Vec<&str> = results.iter().map(|r| r.target_id.as_str()).collect();
    assert_eq!(order, vec!["x", "y"]);
}

#[test]
fn clear_empties_the_ledger_but_keeps_id() {
    let mut voting = Voting::new("day-village");
    voting.set_vote(&id("a"), &id("x"));
    voting.clear();
    assert!(voting.is_empty());
    assert_eq!(voting.id(), "day-village");
}

#[test]
fn json_keeps_voter_order() {
    let mut voting = Voting::new("day-village");
    voting.set_vote(&id("zed"), &id("x"));
    voting.set_vote(&id("amy"), &id("y"));

    let json = voting.to_json().unwrap();
    assert_eq!(
        json,
        r#"{"id":"day-village","votes":{"zed":["x"],"amy":["y"]}}"#
    );

    let decoded = Voting::from_json(&json).unwrap();
    assert_eq!(decoded, voting);
    let voters: Vec<&str> = decoded.voters().map(|v| v.as_str()).collect();
    assert_eq!(voters, vec!["zed", "amy"]);
}
