//! Session manager for spawning and tracking session actors.

use std::collections::{BTreeMap, HashMap, hash_map::Entry};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    actor::{SessionActor, SessionHandle},
    config::SessionConfig,
    errors::{SessionError, SessionResult},
    messages::MoveResult,
};
use crate::{
    board::{BoardTopology, Color, PlayerId},
    game::{Chips, GameError, GameSession, SessionId, SessionSnapshot, SessionStatus},
};

/// Session metadata for discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub id: SessionId,
    pub players: BTreeMap<Color, PlayerId>,
    pub turn: Color,
    pub bet_amount: Chips,
    pub prize_amount: Chips,
    pub time_left_secs: u32,
    pub status: SessionStatus,
}

impl From<&SessionSnapshot> for SessionMetadata {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            players: snapshot.players.clone(),
            turn: snapshot.turn,
            bet_amount: snapshot.bet_amount,
            prize_amount: snapshot.prize_amount,
            time_left_secs: snapshot.time_left_secs,
            status: snapshot.status,
        }
    }
}

/// Session manager for running many matches side by side.
///
/// Sessions never share state; each lives in its own actor task.
pub struct SessionManager {
    /// Configuration applied to new sessions
    config: SessionConfig,

    /// Board every session is played on
    topology: Arc<BoardTopology>,

    /// Active session handles
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl SessionManager {
    /// Create a manager for the standard board
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `config` fails validation
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        Self::with_topology(config, Arc::new(BoardTopology::standard().clone()))
    }

    /// Create a manager for a custom board
    pub fn with_topology(config: SessionConfig, topology: Arc<BoardTopology>) -> SessionResult<Self> {
        config.validate().map_err(SessionError::InvalidConfig)?;

        Ok(Self {
            config,
            topology,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn topology(&self) -> &Arc<BoardTopology> {
        &self.topology
    }

    /// Create and spawn a new session
    ///
    /// # Arguments
    ///
    /// * `players` - Color to player mapping (2 or 4 entries)
    /// * `stake` - Bet per player in cents; must be one of the configured stakes
    ///
    /// # Returns
    ///
    /// * `SessionResult<SessionId>` - ID of the spawned session
    pub async fn create_session(
        &self,
        players: BTreeMap<Color, PlayerId>,
        stake: Chips,
    ) -> SessionResult<SessionId> {
        if !self.config.allows_stake(stake) {
            return Err(SessionError::StakeNotAllowed(stake));
        }
        if let Some(&color) = players.keys().find(|&&c| !self.topology.supports(c)) {
            return Err(GameError::UnknownColor(color).into());
        }

        let session = GameSession::with_settings(players, stake, &self.config.game_settings())?;
        self.spawn(session).await
    }

    /// Respawn a session from a persisted snapshot
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` if the snapshot is broken or a session
    /// with the same ID is already registered
    pub async fn restore_session(&self, snapshot: SessionSnapshot) -> SessionResult<SessionId> {
        let session = GameSession::from_snapshot(snapshot, &self.topology)?;
        log::info!("Restoring session {}", session.id());
        self.spawn(session).await
    }

    async fn spawn(&self, session: GameSession) -> SessionResult<SessionId> {
        let session_id = session.id().to_string();

        // Check and insert under one guard so two restores of the same
        // snapshot cannot both register.
        let mut sessions = self.sessions.write().await;
        let Entry::Vacant(slot) = sessions.entry(session_id.clone()) else {
            return Err(GameError::InvalidSnapshot(format!(
                "session {session_id} is already running"
            ))
            .into());
        };
        let (actor, handle) = SessionActor::new(session, self.topology.clone(), &self.config);
        slot.insert(handle);
        drop(sessions);

        // Spawn actor task
        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Spawned session {}", session_id);

        Ok(session_id)
    }

    /// Get a session handle
    pub async fn get_session(&self, session_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    async fn handle(&self, session_id: &str) -> SessionResult<SessionHandle> {
        self.get_session(session_id)
            .await
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Throw the die for `color` in a session
    pub async fn roll(&self, session_id: &str, color: Color) -> SessionResult<u8> {
        self.handle(session_id).await?.roll(color).await
    }

    /// Move a pawn in a session
    pub async fn move_pawn(
        &self,
        session_id: &str,
        color: Color,
        slot: usize,
    ) -> SessionResult<MoveResult> {
        self.handle(session_id).await?.move_pawn(color, slot).await
    }

    /// Get a snapshot of a session
    pub async fn snapshot(&self, session_id: &str) -> SessionResult<SessionSnapshot> {
        self.handle(session_id).await?.snapshot().await
    }

    /// End a session as finished or abandoned.
    ///
    /// Ended sessions, including those whose clock ran out, stay registered
    /// and keep serving snapshots until they are closed, either one by one
    /// with `close_session` or in bulk with `close_finished_sessions`.
    pub async fn end_session(
        &self,
        session_id: &str,
        status: SessionStatus,
    ) -> SessionResult<SessionSnapshot> {
        self.handle(session_id).await?.end(status).await
    }

    /// Stop a session's actor and forget it
    pub async fn close_session(&self, session_id: &str) -> SessionResult<()> {
        let handle = self.handle(session_id).await?;

        // An actor that already stopped is as good as closed.
        match handle.close().await {
            Ok(()) | Err(SessionError::Closed) => {}
            Err(e) => return Err(e),
        }

        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        drop(sessions);

        log::info!("Closed session {}", session_id);

        Ok(())
    }

    /// Close every session that is no longer playing
    ///
    /// # Returns
    ///
    /// * `Vec<SessionSnapshot>` - Final state of each closed session, sorted by ID
    pub async fn close_finished_sessions(&self) -> Vec<SessionSnapshot> {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();

        let mut closed = Vec::new();
        for handle in handles {
            let Ok(snapshot) = handle.snapshot().await else {
                continue;
            };
            if !snapshot.status.is_terminal() {
                continue;
            }
            match self.close_session(handle.session_id()).await {
                Ok(()) => closed.push(snapshot),
                Err(e) => log::debug!("Session {} not closed: {}", handle.session_id(), e),
            }
        }
        closed.sort_by(|a, b| a.id.cmp(&b.id));

        if !closed.is_empty() {
            log::info!("Closed {} finished session(s)", closed.len());
        }

        closed
    }

    /// List all sessions whose actors are still running
    pub async fn list_sessions(&self) -> Vec<SessionMetadata> {
        let handles: Vec<SessionHandle> = self.sessions.read().await.values().cloned().collect();

        let mut metadata_list = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.snapshot().await {
                Ok(snapshot) => metadata_list.push(SessionMetadata::from(&snapshot)),
                Err(e) => log::debug!("Skipping session {}: {}", handle.session_id(), e),
            }
        }
        metadata_list.sort_by(|a, b| a.id.cmp(&b.id));

        metadata_list
    }

    /// Get active session count
    pub async fn active_session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> BTreeMap<Color, PlayerId> {
        BTreeMap::from([
            (Color::Red, PlayerId::new("alice")),
            (Color::Yellow, PlayerId::new("bob")),
        ])
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SessionConfig {
            inbox_capacity: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            SessionManager::new(config),
            Err(SessionError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_create_and_close() {
        let manager = SessionManager::new(SessionConfig::default()).unwrap();
        let id = manager.create_session(players(), 50).await.unwrap();
        assert_eq!(manager.active_session_count().await, 1);

        let snapshot = manager.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.prize_amount, 100);

        manager.close_session(&id).await.unwrap();
        assert_eq!(manager.active_session_count().await, 0);
        assert_eq!(
            manager.snapshot(&id).await,
            Err(SessionError::NotFound(id.clone()))
        );
    }

    #[tokio::test]
    async fn test_stake_must_be_offered() {
        let manager = SessionManager::new(SessionConfig::default()).unwrap();
        assert_eq!(
            manager.create_session(players(), 75).await,
            Err(SessionError::StakeNotAllowed(75))
        );
        assert_eq!(manager.active_session_count().await, 0);
    }

    #[tokio::test]
    async fn test_restore_rejects_running_duplicate() {
        let manager = SessionManager::new(SessionConfig::default()).unwrap();
        let id = manager.create_session(players(), 0).await.unwrap();
        let snapshot = manager.snapshot(&id).await.unwrap();

        assert!(matches!(
            manager.restore_session(snapshot.clone()).await,
            Err(SessionError::Game(GameError::InvalidSnapshot(_)))
        ));

        manager.close_session(&id).await.unwrap();
        assert_eq!(manager.restore_session(snapshot).await, Ok(id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_restores_register_once() {
        let manager = Arc::new(SessionManager::new(SessionConfig::default()).unwrap());
        let snapshot = GameSession::two_player("alice", "bob", 0).unwrap().snapshot();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let manager = manager.clone();
            let snapshot = snapshot.clone();
            tasks.push(tokio::spawn(async move {
                manager.restore_session(snapshot).await
            }));
        }

        let mut restored = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(id) => {
                    assert_eq!(id, snapshot.id);
                    restored += 1;
                }
                Err(e) => assert!(matches!(
                    e,
                    SessionError::Game(GameError::InvalidSnapshot(_))
                )),
            }
        }

        assert_eq!(restored, 1);
        assert_eq!(manager.active_session_count().await, 1);
        assert_eq!(manager.snapshot(&snapshot.id).await.unwrap().id, snapshot.id);
    }

    #[tokio::test]
    async fn test_close_finished_sessions() {
        let manager = SessionManager::new(SessionConfig::default()).unwrap();
        let done = manager.create_session(players(), 0).await.unwrap();
        let live = manager.create_session(players(), 0).await.unwrap();

        manager
            .end_session(&done, SessionStatus::Finished)
            .await
            .unwrap();
        // Ended sessions stay listed until someone closes them
        assert_eq!(manager.list_sessions().await.len(), 2);

        let closed = manager.close_finished_sessions().await;
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, done);
        assert_eq!(closed[0].status, SessionStatus::Finished);

        assert_eq!(manager.active_session_count().await, 1);
        assert!(manager.get_session(&done).await.is_none());
        assert!(manager.get_session(&live).await.is_some());
        assert!(manager.close_finished_sessions().await.is_empty());
    }
}
