mod game;
mod judging;
mod query;
mod room;

use std::sync::Arc;

use crate::error::{GameError, GameResult};
use crate::llm::{CommentGenerator, TopicSupplier};
use crate::store::RecordStore;
use crate::types::{Room, RoomState};

/// The room state machine. All collaborators are injected; every operation
/// re-reads current state from the store before acting and writes back whole
/// records (last write wins).
#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn RecordStore>,
    topics: Arc<dyn TopicSupplier>,
    comments: Arc<dyn CommentGenerator>,
}

impl RoomService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        topics: Arc<dyn TopicSupplier>,
        comments: Arc<dyn CommentGenerator>,
    ) -> Self {
        Self {
            store,
            topics,
            comments,
        }
    }

    /// Fetch a room or fail with NotFound. Expired rooms are already
    /// invisible at the store layer.
    pub(crate) async fn require_room(&self, room_id: &str) -> GameResult<Room> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("room {room_id}")))
    }

    /// State guard used by every phase transition.
    pub(crate) fn guard_state(room: &Room, expected: RoomState, op: &str) -> GameResult<()> {
        if room.state != expected {
            return Err(GameError::InvalidState(format!(
                "{op} requires {expected}, room {} is {}",
                room.room_id, room.state
            )));
        }
        Ok(())
    }
}
