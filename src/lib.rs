//! # Hand Settlement
//!
//! Tracks multiplayer point-game sessions and settles the point transfers
//! between players, per hand and across a whole session.
//!
//! ## Design Principles
//!
//! - **Zero-sum hands**: every hand's scores add up to exactly zero
//! - **Validated records**: actions, hands and sessions can only be built
//!   (or deserialized) in a state that satisfies their invariants
//! - **Pure settlement**: both settlement algorithms are functions of their input
//! - **Storage behind a trait**: persistence goes through [`SessionRepository`]
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use hand_settlement::{settle_session, EngineConfig, PlayerRegistry, Session};
//!
//! let mut registry = PlayerRegistry::new();
//! registry.add("Alice").unwrap();
//! registry.add("Bob").unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut session = Session::create(&registry, &["Alice", "Bob"], date).unwrap();
//!
//! let mut hand = session.begin_hand(&EngineConfig::default());
//! hand.add_action("Alice", "Bob", 10).unwrap();
//! hand.submit(&mut session).unwrap();
//!
//! let settlement = settle_session(&session).unwrap();
//! assert_eq!(settlement.final_scores["Bob"], 10);
//! assert_eq!(settlement.final_transactions[0].from(), "Alice");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hand;
pub mod player;
pub mod record;
pub mod repository;
pub mod session;
pub mod settlement;

pub use config::EngineConfig;
pub use engine::SettlementEngine;
pub use error::{AppError, EngineError, Result, StoreError};
pub use hand::{Action, Hand, HandBuilder, Scores, Transaction};
pub use player::PlayerRegistry;
pub use record::{LedgerEntry, LedgerRecord};
pub use repository::{
    settle_stored_session, InMemoryRepository, JsonFileRepository, SessionRepository,
};
pub use session::Session;
pub use settlement::{compute_transactions, settle_session, Settlement};
