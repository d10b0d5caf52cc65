//! Session actor implementation with async message handling.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, MissedTickBehavior, interval},
};

use super::{
    config::SessionConfig,
    errors::{SessionError, SessionResult},
    messages::{MoveResult, SessionEvent, SessionMessage},
};
use crate::{
    board::{BoardTopology, Color},
    game::{
        DiceRoller, GameResult, GameSession, SessionId, SessionSnapshot, SessionStatus, SystemDice,
    },
};

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: SessionId,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(sender: mpsc::Sender<SessionMessage>, session_id: SessionId) -> Self {
        Self { sender, session_id }
    }

    /// Get session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> SessionResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Throw the die for `color`
    pub async fn roll(&self, color: Color) -> SessionResult<u8> {
        Ok(self
            .request(|response| SessionMessage::Roll { color, response })
            .await??)
    }

    /// Move pawn `slot` of `color` by the pending die value
    pub async fn move_pawn(&self, color: Color, slot: usize) -> SessionResult<MoveResult> {
        Ok(self
            .request(|response| SessionMessage::Move {
                color,
                slot,
                response,
            })
            .await??)
    }

    pub async fn snapshot(&self) -> SessionResult<SessionSnapshot> {
        self.request(|response| SessionMessage::Snapshot { response })
            .await
    }

    /// End the match, returning the final snapshot
    pub async fn end(&self, status: SessionStatus) -> SessionResult<SessionSnapshot> {
        Ok(self
            .request(|response| SessionMessage::End { status, response })
            .await??)
    }

    /// Subscribe to events. Events are dropped when the receiver lags
    /// more than `capacity` behind.
    pub async fn subscribe(
        &self,
        subscriber_id: u64,
        capacity: usize,
    ) -> SessionResult<mpsc::Receiver<SessionEvent>> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.send(SessionMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, subscriber_id: u64) -> SessionResult<()> {
        self.send(SessionMessage::Unsubscribe { subscriber_id })
            .await
    }

    /// Stop the actor. Pending messages queued behind this one are dropped.
    pub async fn close(&self) -> SessionResult<()> {
        self.request(|response| SessionMessage::Close { response })
            .await
    }
}

/// Actor owning a single game session.
///
/// Messages are handled one at a time, so a roll and the move that
/// consumes it can never interleave with another caller's roll or move.
pub struct SessionActor {
    /// Game state
    session: GameSession,

    /// Board the session is played on
    topology: Arc<BoardTopology>,

    /// Die source
    dice: Box<dyn DiceRoller + Send>,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Seconds between clock ticks
    tick_interval_secs: u32,

    /// Subscribers for session events
    subscribers: HashMap<u64, mpsc::Sender<SessionEvent>>,

    /// Is actor closed
    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor using the server die
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(
        session: GameSession,
        topology: Arc<BoardTopology>,
        config: &SessionConfig,
    ) -> (Self, SessionHandle) {
        Self::with_dice(session, topology, config, Box::new(SystemDice))
    }

    /// Create a new session actor with a specific die source
    pub fn with_dice(
        session: GameSession,
        topology: Arc<BoardTopology>,
        config: &SessionConfig,
        dice: Box<dyn DiceRoller + Send>,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        let handle = SessionHandle::new(sender, session.id().to_string());

        let actor = Self {
            session,
            topology,
            dice,
            inbox,
            tick_interval_secs: config.tick_interval_secs.max(1),
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, handle)
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!("Session {} starting", self.session.id());

        let mut tick_interval = interval(Duration::from_secs(u64::from(self.tick_interval_secs)));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        tick_interval.tick().await;

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        // Every handle is gone; nobody can reach this session.
                        None => break,
                    }

                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick(self.tick_interval_secs);
                }
            }
        }

        log::info!("Session {} closed", self.session.id());
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Roll { color, response } => {
                let result = self.handle_roll(color);
                let _ = response.send(result);
            }

            SessionMessage::Move {
                color,
                slot,
                response,
            } => {
                let result = self.handle_move(color, slot);
                let _ = response.send(result);
            }

            SessionMessage::Snapshot { response } => {
                let _ = response.send(self.session.snapshot());
            }

            SessionMessage::End { status, response } => {
                let result = self.handle_end(status);
                let _ = response.send(result);
            }

            SessionMessage::Tick { elapsed_secs } => {
                self.tick(elapsed_secs);
            }

            SessionMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!(
                    "Subscriber {} attached to session {}",
                    subscriber_id,
                    self.session.id()
                );
            }

            SessionMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "Subscriber {} detached from session {}",
                    subscriber_id,
                    self.session.id()
                );
            }

            SessionMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn handle_roll(&mut self, color: Color) -> GameResult<u8> {
        let value = self.session.roll_with(color, &mut self.dice)?;
        self.notify(SessionEvent::DiceRolled { color, value });
        Ok(value)
    }

    fn handle_move(&mut self, color: Color, slot: usize) -> GameResult<MoveResult> {
        let outcome = self.session.apply_move(color, slot, &self.topology)?;
        self.notify(SessionEvent::PawnMoved(outcome.clone()));
        Ok(MoveResult {
            outcome,
            snapshot: self.session.snapshot(),
        })
    }

    fn handle_end(&mut self, status: SessionStatus) -> GameResult<SessionSnapshot> {
        self.session.end(status)?;
        let snapshot = self.session.snapshot();
        self.notify(SessionEvent::SessionEnded(snapshot.clone()));
        Ok(snapshot)
    }

    /// Advance the match clock, finishing the match when it runs out.
    /// The actor stays registered with its manager until closed.
    fn tick(&mut self, elapsed_secs: u32) {
        if self.session.status().is_terminal() {
            return;
        }

        if self.session.advance_clock(elapsed_secs) {
            log::info!(
                "Session {} ran out of time, leader {}",
                self.session.id(),
                self.session.leader()
            );
            if let Err(e) = self.handle_end(SessionStatus::Finished) {
                log::error!("Session {}: failed to finish: {}", self.session.id(), e);
            }
        }
    }

    /// Broadcast an event to all subscribers
    fn notify(&mut self, event: SessionEvent) {
        let session_id = self.session.id();
        self.subscribers
            .retain(|subscriber_id, sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} of session {} is full, dropping event",
                        subscriber_id,
                        session_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameError;
    use std::collections::VecDeque;

    struct Loaded(VecDeque<u8>);

    impl DiceRoller for Loaded {
        fn roll_die(&mut self) -> u8 {
            self.0.pop_front().unwrap_or(1)
        }
    }

    fn spawn(values: &[u8]) -> SessionHandle {
        let session = GameSession::two_player("alice", "bob", 0).unwrap();
        let (actor, handle) = SessionActor::with_dice(
            session,
            Arc::new(BoardTopology::standard().clone()),
            &SessionConfig::default(),
            Box::new(Loaded(values.iter().copied().collect())),
        );
        tokio::spawn(actor.run());
        handle
    }

    #[tokio::test]
    async fn test_roll_and_move_through_handle() {
        let handle = spawn(&[6, 3]);

        assert_eq!(handle.roll(Color::Red).await, Ok(6));
        let result = handle.move_pawn(Color::Red, 0).await.unwrap();
        assert!(result.outcome.extra_turn);
        assert_eq!(result.snapshot.turn, Color::Red);

        assert_eq!(handle.roll(Color::Red).await, Ok(3));
        let result = handle.move_pawn(Color::Red, 0).await.unwrap();
        assert_eq!(result.outcome.to, 3);
        assert_eq!(result.snapshot.turn, Color::Yellow);
    }

    #[tokio::test]
    async fn test_rejections_are_typed() {
        let handle = spawn(&[2]);

        assert_eq!(
            handle.move_pawn(Color::Red, 0).await,
            Err(SessionError::Game(GameError::NotRolled))
        );
        assert!(matches!(
            handle.roll(Color::Yellow).await,
            Err(SessionError::Game(GameError::NotYourTurn { .. }))
        ));
        let before = handle.snapshot().await.unwrap();
        assert_eq!(before.dice, 0);
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let handle = spawn(&[4]);
        let mut events = handle.subscribe(1, 8).await.unwrap();

        handle.roll(Color::Red).await.unwrap();
        handle.move_pawn(Color::Red, 2).await.unwrap();

        assert_eq!(
            events.recv().await,
            Some(SessionEvent::DiceRolled {
                color: Color::Red,
                value: 4
            })
        );
        match events.recv().await {
            Some(SessionEvent::PawnMoved(outcome)) => {
                assert_eq!(outcome.slot, 2);
                assert!(outcome.from.is_base());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clock_expiry_finishes_session() {
        let handle = spawn(&[]);
        let mut events = handle.subscribe(7, 8).await.unwrap();

        handle
            .send(SessionMessage::Tick {
                elapsed_secs: u32::MAX,
            })
            .await
            .unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Finished);
        assert_eq!(snapshot.time_left_secs, 0);
        assert!(matches!(
            events.recv().await,
            Some(SessionEvent::SessionEnded(_))
        ));
        assert_eq!(
            handle.roll(Color::Red).await,
            Err(SessionError::Game(GameError::SessionNotPlaying))
        );
    }

    #[tokio::test]
    async fn test_close_stops_actor() {
        let handle = spawn(&[]);
        handle.close().await.unwrap();
        assert_eq!(handle.snapshot().await, Err(SessionError::Closed));
    }
}
