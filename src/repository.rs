//! Session and player persistence.
//!
//! The engine depends only on [`SessionRepository`]. Two implementations
//! are provided: an in-memory store for tests and embedding, and a
//! directory of JSON files.

use crate::error::{AppError, EngineError, StoreError};
use crate::player::PlayerRegistry;
use crate::session::Session;
use crate::settlement::{settle_session, Settlement};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage contract for sessions and the global player list.
///
/// Implementations report storage failures only; record validation happens
/// in the session and registry types themselves.
pub trait SessionRepository {
    /// Returns `Ok(None)` when no session has this id.
    fn load_session(&self, id: Uuid) -> StoreResult<Option<Session>>;

    /// Inserts the session, or replaces the stored one with the same id.
    fn save_session(&mut self, session: &Session) -> StoreResult<()>;

    fn list_sessions(&self) -> StoreResult<Vec<Session>>;

    fn load_players(&self) -> StoreResult<PlayerRegistry>;

    fn save_players(&mut self, players: &PlayerRegistry) -> StoreResult<()>;
}

/// Settles a stored session by id.
///
/// An unknown id is a validation failure (`InvalidSession`), not a storage one.
pub fn settle_stored_session<R: SessionRepository + ?Sized>(
    repository: &R,
    id: Uuid,
) -> std::result::Result<Settlement, AppError> {
    let session = repository
        .load_session(id)?
        .ok_or_else(|| EngineError::session(format!("no session with id {}", id)))?;
    Ok(settle_session(&session)?)
}

/// Keeps everything in memory. Sessions are listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    sessions: Vec<Session>,
    index: HashMap<Uuid, usize>,
    players: PlayerRegistry,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for InMemoryRepository {
    fn load_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.index.get(&id).map(|&i| self.sessions[i].clone()))
    }

    fn save_session(&mut self, session: &Session) -> StoreResult<()> {
        match self.index.get(&session.id()) {
            Some(&i) => self.sessions[i] = session.clone(),
            None => {
                self.index.insert(session.id(), self.sessions.len());
                self.sessions.push(session.clone());
            }
        }
        Ok(())
    }

    fn list_sessions(&self) -> StoreResult<Vec<Session>> {
        Ok(self.sessions.clone())
    }

    fn load_players(&self) -> StoreResult<PlayerRegistry> {
        Ok(self.players.clone())
    }

    fn save_players(&mut self, players: &PlayerRegistry) -> StoreResult<()> {
        self.players = players.clone();
        Ok(())
    }
}

/// Stores `sessions.json` and `players.json` in a directory.
///
/// Each file holds a single JSON array. Missing or blank files read as empty.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    pub const SESSIONS_FILE: &'static str = "sessions.json";
    pub const PLAYERS_FILE: &'static str = "players.json";

    /// Opens (creating if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonFileRepository { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned + Default>(&self, file: &str) -> StoreResult<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes via a temporary file, fsync and rename so readers never see a
    /// partial file.
    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> StoreResult<()> {
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{}.tmp", file));
        let bytes = serde_json::to_vec_pretty(value)?;

        let mut out = File::create(&tmp)?;
        out.write_all(&bytes)?;
        out.sync_all()?;
        drop(out);

        fs::rename(&tmp, &path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl SessionRepository for JsonFileRepository {
    fn load_session(&self, id: Uuid) -> StoreResult<Option<Session>> {
        let sessions: Vec<Session> = self.read(Self::SESSIONS_FILE)?;
        Ok(sessions.into_iter().find(|s| s.id() == id))
    }

    fn save_session(&mut self, session: &Session) -> StoreResult<()> {
        let mut sessions: Vec<Session> = self.read(Self::SESSIONS_FILE)?;
        match sessions.iter_mut().find(|s| s.id() == session.id()) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        self.write(Self::SESSIONS_FILE, &sessions)
    }

    fn list_sessions(&self) -> StoreResult<Vec<Session>> {
        self.read(Self::SESSIONS_FILE)
    }

    fn load_players(&self) -> StoreResult<PlayerRegistry> {
        self.read(Self::PLAYERS_FILE)
    }

    fn save_players(&mut self, players: &PlayerRegistry) -> StoreResult<()> {
        self.write(Self::PLAYERS_FILE, players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn session(players: &[&str]) -> Session {
        Session::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            players.iter().map(|p| p.to_string()).collect(),
        )
        .unwrap()
    }

    fn played_session() -> Session {
        let mut session = session(&["P1", "P2"]);
        let mut builder = session.begin_hand(&EngineConfig::default());
        builder.add_action("P1", "P2", 10).unwrap();
        builder.submit(&mut session).unwrap();
        let mut builder = session.begin_hand(&EngineConfig::default());
        builder.add_action("P2", "P1", 5).unwrap();
        builder.submit(&mut session).unwrap();
        session
    }

    /// Behaviour every repository must share.
    fn exercise(repository: &mut dyn SessionRepository) {
        assert!(repository.list_sessions().unwrap().is_empty());
        assert!(repository.load_players().unwrap().is_empty());

        let first = played_session();
        let second = session(&["P1", "P3"]);
        repository.save_session(&first).unwrap();
        repository.save_session(&second).unwrap();

        assert_eq!(repository.load_session(first.id()).unwrap(), Some(first.clone()));
        assert_eq!(repository.load_session(Uuid::new_v4()).unwrap(), None);

        let mut updated = second.clone();
        let mut builder = updated.begin_hand(&EngineConfig::default());
        builder.add_action("P3", "P1", 2).unwrap();
        builder.submit(&mut updated).unwrap();
        repository.save_session(&updated).unwrap();

        let listed = repository.list_sessions().unwrap();
        assert_eq!(listed, vec![first, updated]);

        let mut players = PlayerRegistry::new();
        players.add("P1").unwrap();
        players.add("P2").unwrap();
        repository.save_players(&players).unwrap();
        assert_eq!(repository.load_players().unwrap(), players);
    }

    #[test]
    fn test_in_memory_repository() {
        exercise(&mut InMemoryRepository::new());
    }

    #[test]
    fn test_json_file_repository() {
        let dir = TempDir::new().unwrap();
        exercise(&mut JsonFileRepository::open(dir.path()).unwrap());

        assert!(dir.path().join(JsonFileRepository::SESSIONS_FILE).exists());
        assert!(!dir.path().join("sessions.json.tmp").exists());
    }

    #[test]
    fn test_json_file_repository_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let mut repository = JsonFileRepository::open(dir.path()).unwrap();

        let mut players = PlayerRegistry::new();
        players.add("P1").unwrap();
        players.add("P2").unwrap();
        repository.save_players(&players).unwrap();
        assert!(players.remove("P2"));
        repository.save_players(&players).unwrap();

        let raw = fs::read_to_string(dir.path().join(JsonFileRepository::PLAYERS_FILE)).unwrap();
        let stored: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, ["P1"]);
        assert!(!dir.path().join("players.json.tmp").exists());
    }

    #[test]
    fn test_json_file_repository_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let stored = played_session();
        JsonFileRepository::open(dir.path())
            .unwrap()
            .save_session(&stored)
            .unwrap();

        let reopened = JsonFileRepository::open(dir.path()).unwrap();
        assert_eq!(reopened.load_session(stored.id()).unwrap(), Some(stored));
    }

    #[test]
    fn test_json_file_repository_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(JsonFileRepository::SESSIONS_FILE),
            "[{\"id\": 42}]",
        )
        .unwrap();

        let repository = JsonFileRepository::open(dir.path()).unwrap();
        assert!(matches!(
            repository.list_sessions(),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_settle_stored_session() {
        let mut repository = InMemoryRepository::new();
        let stored = played_session();
        repository.save_session(&stored).unwrap();

        let settlement = settle_stored_session(&repository, stored.id()).unwrap();
        assert_eq!(settlement.final_scores["P1"], -5);
        assert_eq!(settlement.final_scores["P2"], 5);
        assert_eq!(settlement.final_transactions.len(), 1);
    }

    #[test]
    fn test_settle_unknown_session() {
        let repository = InMemoryRepository::new();
        let result = settle_stored_session(&repository, Uuid::new_v4());
        assert!(matches!(
            result,
            Err(AppError::Engine(EngineError::InvalidSession { .. }))
        ));
    }
}
