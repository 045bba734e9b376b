//! Hand records and the in-progress hand builder.
//!
//! A hand is a zero-sum set of point transfers between session players.
//! `scores` and `transactions` are derived from `actions` and recomputed
//! after every mutation while the hand is being built.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::session::Session;
use crate::settlement::compute_transactions;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Net score per player name.
pub type Scores = BTreeMap<String, i64>;

/// One point transfer recorded during a hand: `giver` hands `points` to `owner`.
///
/// # Invariants
///
/// - `points > 0`
/// - `giver != owner`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionRecord")]
pub struct Action {
    giver: String,
    owner: String,
    points: u32,
}

impl Action {
    pub fn new(giver: &str, owner: &str, points: u32) -> Result<Self> {
        if giver == owner {
            return Err(EngineError::action(format!(
                "{} cannot give points to themselves",
                giver
            )));
        }
        if points == 0 {
            return Err(EngineError::action("points must be positive"));
        }
        Ok(Action {
            giver: giver.to_string(),
            owner: owner.to_string(),
            points,
        })
    }

    pub fn giver(&self) -> &str {
        &self.giver
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Adds this action's effect to `scores` (owner gains, giver loses).
    fn apply(&self, scores: &mut Scores) -> Result<()> {
        self.shift(scores, i64::from(self.points))
    }

    /// Exact inverse of [`Action::apply`].
    fn revert(&self, scores: &mut Scores) -> Result<()> {
        self.shift(scores, -i64::from(self.points))
    }

    /// Moves `delta` from giver to owner. `scores` is untouched on overflow.
    fn shift(&self, scores: &mut Scores, delta: i64) -> Result<()> {
        let current = |name: &str| scores.get(name).copied().unwrap_or(0);
        let (Some(owner), Some(giver)) = (
            current(&self.owner).checked_add(delta),
            current(&self.giver).checked_sub(delta),
        ) else {
            return Err(EngineError::action("score exceeds the score range"));
        };
        scores.insert(self.owner.clone(), owner);
        scores.insert(self.giver.clone(), giver);
        Ok(())
    }
}

#[derive(Deserialize)]
struct ActionRecord {
    giver: String,
    owner: String,
    points: u32,
}

impl TryFrom<ActionRecord> for Action {
    type Error = EngineError;

    fn try_from(record: ActionRecord) -> Result<Self> {
        Action::new(&record.giver, &record.owner, record.points)
    }
}

/// A settlement instruction: `from` pays `to` the given amount.
///
/// Not a game action; produced only by the settlement algorithms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    from: String,
    to: String,
    points: u64,
}

impl Transaction {
    pub fn new(from: &str, to: &str, points: u64) -> Result<Self> {
        if from == to || points == 0 {
            return Err(EngineError::action(format!(
                "invalid transfer {} -> {} of {}",
                from, to, points
            )));
        }
        Ok(Transaction {
            from: from.to_string(),
            to: to.to_string(),
            points,
        })
    }

    /// Builds a transfer the settlement algorithms already know is valid.
    pub(crate) fn settled(from: &str, to: &str, points: u64) -> Self {
        Transaction {
            from: from.to_string(),
            to: to.to_string(),
            points,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn points(&self) -> u64 {
        self.points
    }
}

#[derive(Deserialize)]
struct TransactionRecord {
    from: String,
    to: String,
    points: u64,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = EngineError;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        Transaction::new(&record.from, &record.to, record.points)
    }
}

/// A submitted, frozen hand.
///
/// # Invariants
///
/// - `scores` sums to exactly zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HandRecord")]
pub struct Hand {
    actions: Vec<Action>,
    scores: Scores,
    transactions: Vec<Transaction>,
}

impl Hand {
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

#[derive(Deserialize)]
struct HandRecord {
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(default)]
    scores: Scores,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

impl TryFrom<HandRecord> for Hand {
    type Error = EngineError;

    fn try_from(record: HandRecord) -> Result<Self> {
        let sum = record
            .scores
            .values()
            .try_fold(0i64, |sum, score| sum.checked_add(*score))
            .ok_or_else(|| EngineError::action("hand scores exceed the score range"))?;
        if sum != 0 {
            return Err(EngineError::action(format!(
                "hand scores sum to {} instead of zero",
                sum
            )));
        }
        Ok(Hand {
            actions: record.actions,
            scores: record.scores,
            transactions: record.transactions,
        })
    }
}

/// Mutable state of the hand currently being played in a session.
///
/// Every accepted mutation leaves `scores` zero-sum and `transactions`
/// recomputed from the new scores. Rejected calls change nothing.
#[derive(Debug, Clone)]
pub struct HandBuilder {
    session_id: Uuid,
    players: Vec<String>,
    max_actions: usize,
    actions: Vec<Action>,
    scores: Scores,
    transactions: Vec<Transaction>,
}

impl HandBuilder {
    /// Starts an empty hand for the given session.
    pub fn new(session: &Session, config: &EngineConfig) -> Self {
        let players = session.players().to_vec();
        HandBuilder {
            session_id: session.id(),
            scores: zeroed_scores(&players),
            players,
            max_actions: config.max_actions_per_hand,
            actions: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Records `giver` handing `points` to `owner`.
    pub fn add_action(&mut self, giver: &str, owner: &str, points: u32) -> Result<()> {
        let action = Action::new(giver, owner, points)?;

        for name in [giver, owner] {
            if !self.players.iter().any(|p| p == name) {
                return Err(EngineError::action(format!(
                    "{} is not playing this hand",
                    name
                )));
            }
        }

        if self.actions.len() >= self.max_actions {
            return Err(EngineError::action(format!(
                "hand already has the maximum of {} actions",
                self.max_actions
            )));
        }

        action.apply(&mut self.scores)?;
        self.actions.push(action);
        self.recompute();

        debug!("{} gave {} points to {}", giver, points, owner);
        Ok(())
    }

    /// Removes the action at `index`, reversing its score effect.
    pub fn remove_action(&mut self, index: usize) -> Result<Action> {
        if index >= self.actions.len() {
            return Err(EngineError::InvalidIndex {
                index,
                len: self.actions.len(),
            });
        }

        self.actions[index].revert(&mut self.scores)?;
        let action = self.actions.remove(index);
        self.recompute();

        debug!(
            "Removed action {}: {} -> {} ({} points)",
            index, action.giver, action.owner, action.points
        );
        Ok(action)
    }

    /// Freezes the hand, appends it to `session` and resets the builder.
    ///
    /// The builder must have been started for this session.
    pub fn submit<'s>(&mut self, session: &'s mut Session) -> Result<&'s Hand> {
        if session.id() != self.session_id {
            return Err(EngineError::session(format!(
                "hand was started for session {}, not {}",
                self.session_id,
                session.id()
            )));
        }

        let hand = Hand {
            actions: std::mem::take(&mut self.actions),
            scores: std::mem::replace(&mut self.scores, zeroed_scores(&self.players)),
            transactions: std::mem::take(&mut self.transactions),
        };

        debug!(
            "Submitted hand with {} actions to session {}",
            hand.actions.len(),
            self.session_id
        );
        Ok(session.push_hand(hand))
    }

    fn recompute(&mut self) {
        self.transactions = compute_transactions(&self.scores);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of actions that can still be added before the cap is reached.
    pub fn remaining_actions(&self) -> usize {
        self.max_actions.saturating_sub(self.actions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn zeroed_scores(players: &[String]) -> Scores {
    players.iter().map(|p| (p.clone(), 0)).collect()
}
