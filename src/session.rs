//! Game sessions.
//!
//! A session owns its submitted hands. Hands are only ever appended, by
//! submitting a [`HandBuilder`].

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::hand::{Hand, HandBuilder};
use crate::player::PlayerRegistry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sequence of hands played by a fixed set of players on one date.
///
/// # Invariants
///
/// - At least two players, names unique and non-empty
/// - `hands` only grows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct Session {
    id: Uuid,
    date: NaiveDate,
    players: Vec<String>,
    hands: Vec<Hand>,
}

impl Session {
    /// Creates an empty session after validating the player list.
    pub fn new(id: Uuid, date: NaiveDate, players: Vec<String>) -> Result<Self> {
        validate_players(&players)?;
        Ok(Session {
            id,
            date,
            players,
            hands: Vec::new(),
        })
    }

    /// Creates a session with a fresh id from players picked out of `registry`.
    pub fn create(registry: &PlayerRegistry, selected: &[&str], date: NaiveDate) -> Result<Self> {
        if let Some(unknown) = selected.iter().find(|name| !registry.contains(name)) {
            return Err(EngineError::session(format!(
                "player {} is not registered",
                unknown
            )));
        }
        let players = selected.iter().map(|name| name.to_string()).collect();
        Session::new(Uuid::new_v4(), date, players)
    }

    /// Starts building the next hand of this session.
    pub fn begin_hand(&self, config: &EngineConfig) -> HandBuilder {
        HandBuilder::new(self, config)
    }

    pub(crate) fn push_hand(&mut self, hand: Hand) -> &Hand {
        self.hands.push(hand);
        &self.hands[self.hands.len() - 1]
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }
}

fn validate_players(players: &[String]) -> Result<()> {
    if players.len() < 2 {
        return Err(EngineError::session(format!(
            "at least 2 players required, got {}",
            players.len()
        )));
    }
    for (i, name) in players.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(EngineError::session("player names must not be empty"));
        }
        if players[..i].contains(name) {
            return Err(EngineError::session(format!(
                "player {} listed twice",
                name
            )));
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct SessionRecord {
    id: Uuid,
    date: NaiveDate,
    players: Vec<String>,
    #[serde(default)]
    hands: Vec<Hand>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = EngineError;

    fn try_from(record: SessionRecord) -> Result<Self> {
        validate_players(&record.players)?;
        Ok(Session {
            id: record.id,
            date: record.date,
            players: record.players,
            hands: record.hands,
        })
    }
}
