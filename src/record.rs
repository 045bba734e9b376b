//! Ledger records for CSV parsing.

use serde::Deserialize;

/// Raw ledger row as read from CSV.
///
/// Column meaning depends on the row type:
///
/// | type     | player | counterparty | value  |
/// |----------|--------|--------------|--------|
/// | `player` | name   |              |        |
/// | `give`   | giver  | owner        | points |
/// | `remove` |        |              | index  |
/// | `submit` |        |              |        |
#[derive(Debug, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "type")]
    pub record_type: String,

    pub player: Option<String>,

    pub counterparty: Option<String>,

    pub value: Option<String>,
}

impl LedgerRecord {
    /// Parses the raw CSV row into a typed entry.
    ///
    /// Returns `None` for unknown types or missing/unparsable required fields.
    /// Range checks (positive points, distinct players) are left to the engine.
    pub fn parse(&self) -> Option<LedgerEntry> {
        let record_type = self.record_type.trim().to_lowercase();

        match record_type.as_str() {
            "player" => Some(LedgerEntry::Player(field(&self.player)?)),
            "give" => Some(LedgerEntry::Give {
                giver: field(&self.player)?,
                owner: field(&self.counterparty)?,
                points: field(&self.value)?.parse().ok()?,
            }),
            "remove" => Some(LedgerEntry::Remove(field(&self.value)?.parse().ok()?)),
            "submit" => Some(LedgerEntry::Submit),
            _ => None,
        }
    }
}

fn field(raw: &Option<String>) -> Option<String> {
    let trimmed = raw.as_deref()?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// A parsed ledger entry ready for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    /// Adds a player to the session roster. Only valid before the first action.
    Player(String),

    /// Records a point transfer in the current hand.
    Give {
        giver: String,
        owner: String,
        points: u32,
    },

    /// Removes an action from the current hand by position.
    Remove(usize),

    /// Submits the current hand.
    Submit,
}
