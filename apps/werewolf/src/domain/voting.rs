//! Voting ledger: one live vote per voter, ranked tallies.
//!
//! Voters are kept in first-vote order. A voter who withdraws loses their
//! slot and re-enters at the end when voting again. The ranking tie-break
//! depends on that order (see [`Voting::results`]).

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ids::PlayerId;

/// Well-known id of the village's daytime vote.
pub const VOTING_DAY_VILLAGE: &str = "day-village";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingResult {
    pub target_id: PlayerId,
    pub count: u32,
}

/// Effect of a [`Voting::set_vote`] call on the voter's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteChange {
    /// Voter had no live vote and now has one.
    Cast,
    /// Voter moved their vote away from `previous`.
    Changed { previous: PlayerId },
    /// Voter voted for their current target again and now abstains.
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voting {
    id: String,
    #[serde(with = "ordered_votes")]
    votes: Vec<(PlayerId, Vec<PlayerId>)>,
}

impl Voting {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            votes: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record `voter`'s vote with toggle semantics.
    ///
    /// Voting again for the current target removes the vote entirely.
    /// Otherwise the voter's list is replaced by the single new target.
    pub fn set_vote(&mut self, voter: &PlayerId, target: &PlayerId) -> VoteChange {
        match self.votes.iter().position(|(id, _)| id == voter) {
            Some(idx) => {
                let targets = &mut self.votes[idx].1;
                if targets.first() == Some(target) {
                    self.votes.remove(idx);
                    return VoteChange::Withdrawn;
                }
                let previous = targets.first().cloned();
                *targets = vec![target.clone()];
                match previous {
                    Some(previous) => VoteChange::Changed { previous },
                    None => VoteChange::Cast,
                }
            }
            None => {
                self.votes.push((voter.clone(), vec![target.clone()]));
                VoteChange::Cast
            }
        }
    }

    pub fn votes_by(&self, voter: &PlayerId) -> &[PlayerId] {
        self.votes
            .iter()
            .find(|(id, _)| id == voter)
            .map(|(_, targets)| targets.as_slice())
            .unwrap_or(&[])
    }

    /// Number of live votes naming `target`.
    pub fn vote_count(&self, target: &PlayerId) -> u32 {
        self.votes
            .iter()
            .flat_map(|(_, targets)| targets.iter())
            .filter(|t| *t == target)
            .count() as u32
    }

    /// Voters that currently hold a live vote, in ledger order.
    pub fn voters(&self) -> impl Iterator<Item = &PlayerId> {
        self.votes
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(id, _)| id)
    }

    pub fn is_empty(&self) -> bool {
        self.voters().next().is_none()
    }

    /// Tally per target, highest count first.
    ///
    /// Targets are discovered walking voters in ledger order. The tally is
    /// sorted ascending (stable) and then reversed, so among equal counts the
    /// target discovered last comes first.
    pub fn results(&self) -> Vec<VotingResult> {
        let mut tally: Vec<VotingResult> = Vec::new();
        for target in self.votes.iter().flat_map(|(_, targets)| targets.iter()) {
            match tally.iter_mut().find(|r| &r.target_id == target) {
                Some(result) => result.count += 1,
                None => tally.push(VotingResult {
                    target_id: target.clone(),
                    count: 1,
                }),
            }
        }
        tally.sort_by_key(|r| r.count);
        tally.reverse();
        tally
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// `votes` travels as a JSON object `{voterId: [targetId]}` whose key order
/// is the ledger order.
mod ordered_votes {
    use super::*;

    type Entries = Vec<(PlayerId, Vec<PlayerId>)>;

    pub fn serialize<S: Serializer>(entries: &Entries, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (voter, targets) in entries {
            map.serialize_entry(voter, targets)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Entries, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }

    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Entries;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of voter ids to target id lists")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((voter, targets)) = access.next_entry::<PlayerId, Vec<PlayerId>>()? {
                entries.push((voter, targets));
            }
            Ok(entries)
        }
    }
}
