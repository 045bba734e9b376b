//! Hand Settlement CLI
//!
//! Replays a CSV ledger of a session and prints final scores and the
//! payments that settle them.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ledger.csv > settlement.csv
//! cargo run -- ledger.csv ./store > settlement.csv
//! ```
//!
//! With a store directory the session is saved to `sessions.json` and its
//! players are merged into `players.json`.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `HAND_SETTLEMENT_MAX_ACTIONS`: Actions allowed per hand (default 3)

use hand_settlement::{
    AppError, EngineConfig, EngineError, JsonFileRepository, Session, SessionRepository,
    SettlementEngine,
};
use log::{info, warn};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(AppError::MissingArgument);
    }

    let config = EngineConfig::from_env()?;

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let mut engine = SettlementEngine::new(config);
    engine.process_csv(reader)?;

    if let Some(store_dir) = args.get(2) {
        match engine.session() {
            Some(session) => store(store_dir, session)?,
            None => warn!("Nothing to store: ledger did not name at least two players"),
        }
    }

    let stdout = io::stdout();
    let handle = stdout.lock();
    engine.write_output(handle)?;

    Ok(())
}

/// Saves the session and merges its players into the stored registry.
fn store(dir: &str, session: &Session) -> Result<(), AppError> {
    let mut repository = JsonFileRepository::open(dir)?;

    let mut players = repository.load_players()?;
    for name in session.players() {
        match players.add(name) {
            Ok(()) | Err(EngineError::DuplicatePlayer { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }
    repository.save_players(&players)?;
    repository.save_session(session)?;

    info!(
        "Stored session {} in {}",
        session.id(),
        repository.dir().display()
    );
    Ok(())
}
