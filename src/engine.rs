//! Ledger replay engine.
//!
//! Streams a CSV ledger of roster, action, remove and submit rows through a
//! [`Session`] and its in-progress [`HandBuilder`], then writes the session
//! settlement as CSV.

use crate::config::EngineConfig;
use crate::error::{AppError, EngineError, Result};
use crate::hand::HandBuilder;
use crate::player::PlayerRegistry;
use crate::record::{LedgerEntry, LedgerRecord};
use crate::session::Session;
use crate::settlement::{settle_session, Settlement};
use chrono::{Local, NaiveDate};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::io::{Read, Write};

/// A session together with the hand currently being played in it.
struct Table {
    session: Session,
    hand: HandBuilder,
}

/// Replays a ledger into a session.
///
/// `player` rows build the roster. The session opens on the first row of any
/// other type, after which the roster is fixed.
pub struct SettlementEngine {
    config: EngineConfig,
    date: NaiveDate,
    registry: PlayerRegistry,
    table: Option<Table>,
}

impl SettlementEngine {
    /// Creates an engine whose session will be dated today.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_date(config, Local::now().date_naive())
    }

    pub fn with_date(config: EngineConfig, date: NaiveDate) -> Self {
        SettlementEngine {
            config,
            date,
            registry: PlayerRegistry::new(),
            table: None,
        }
    }

    /// Processes ledger rows from a CSV reader in streaming fashion.
    ///
    /// Invalid rows are logged at warn level and skipped. A hand still in
    /// progress at the end of input is discarded.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> std::result::Result<(), AppError> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<LedgerRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => {
                    if let Some(entry) = record.parse() {
                        if let Err(e) = self.process_entry(entry, row_num) {
                            warn!("Row {}: {}", row_num, e);
                        }
                    } else {
                        warn!("Row {}: Failed to parse ledger record", row_num);
                    }
                }
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        if let Some(table) = self.table.as_mut() {
            if !table.hand.is_empty() {
                warn!(
                    "Discarding unsubmitted hand with {} actions",
                    table.hand.actions().len()
                );
                table.hand = table.session.begin_hand(&self.config);
            }
        } else if let Err(e) = self.open_table() {
            warn!("No session recorded: {}", e);
        }

        Ok(())
    }

    /// Applies a single parsed ledger entry.
    fn process_entry(&mut self, entry: LedgerEntry, row: usize) -> Result<()> {
        match entry {
            LedgerEntry::Player(name) => {
                if self.table.is_some() {
                    return Err(EngineError::session(format!(
                        "cannot add {} after play has started",
                        name
                    )));
                }
                self.registry.add(&name)?;
                debug!("Row {}: Registered player {}", row, name);
            }
            LedgerEntry::Give {
                giver,
                owner,
                points,
            } => {
                let table = self.open_table()?;
                table.hand.add_action(&giver, &owner, points)?;
            }
            LedgerEntry::Remove(index) => {
                let table = self.open_table()?;
                table.hand.remove_action(index)?;
            }
            LedgerEntry::Submit => {
                let table = self.open_table()?;
                table.hand.submit(&mut table.session)?;
                debug!(
                    "Row {}: Hand {} submitted",
                    row,
                    table.session.hands().len()
                );
            }
        }

        Ok(())
    }

    /// Returns the open table, opening the session from the roster if needed.
    fn open_table(&mut self) -> Result<&mut Table> {
        let table = match self.table.take() {
            Some(table) => table,
            None => {
                let names: Vec<&str> = self.registry.names().iter().map(String::as_str).collect();
                let session = Session::create(&self.registry, &names, self.date)?;
                debug!(
                    "Opened session {} with {} players",
                    session.id(),
                    names.len()
                );
                Table {
                    hand: session.begin_hand(&self.config),
                    session,
                }
            }
        };
        Ok(self.table.insert(table))
    }

    /// The replayed session, if at least two players were registered.
    pub fn session(&self) -> Option<&Session> {
        self.table.as_ref().map(|t| &t.session)
    }

    /// Settlement of all submitted hands, if a session is open.
    pub fn settlement(&self) -> Result<Option<Settlement>> {
        self.session().map(settle_session).transpose()
    }

    /// Writes final scores and settlement transfers to CSV.
    ///
    /// One `score` row per player in roster order, then one `transfer` row
    /// per payment in settlement order.
    pub fn write_output<W: Write>(&self, writer: W) -> std::result::Result<(), AppError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["record", "player", "counterparty", "points"])?;

        if let Some(session) = self.session() {
            let settlement = settle_session(session)?;
            for player in session.players() {
                let score = settlement.final_scores.get(player).copied().unwrap_or(0);
                csv_writer.write_record(["score", player.as_str(), "", score.to_string().as_str()])?;
            }

            for transaction in &settlement.final_transactions {
                csv_writer.write_record([
                    "transfer",
                    transaction.from(),
                    transaction.to(),
                    transaction.points().to_string().as_str(),
                ])?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
