mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStore;

use crate::types::{Answer, Player, Room};

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Per-table deletion counts returned by [`RecordStore::wipe`].
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WipeCounts {
    pub rooms: usize,
    pub players: usize,
    pub answers: usize,
}

/// Keyed record storage for rooms, players and answers.
///
/// Rooms carry an `expires_at`; backends treat it as a TTL and must not
/// return expired rooms from reads. Writes are whole-record puts, last
/// write wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_room(&self, room: Room) -> StoreResult<()>;
    async fn get_room(&self, room_id: &str) -> StoreResult<Option<Room>>;
    async fn find_room_by_code(&self, room_code: &str) -> StoreResult<Option<Room>>;

    /// Field-scoped write for the comment pipeline: sets `comments`,
    /// `comments_ready_at` and `updated_at`, nothing else. A whole-record
    /// put here could revert a verdict persisted while generation was in
    /// flight. Silently a no-op when the room is gone or expired.
    async fn update_room_comments(
        &self,
        room_id: &str,
        comments: Vec<String>,
        ready_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn put_player(&self, player: Player) -> StoreResult<()>;
    async fn get_player(&self, player_id: &str) -> StoreResult<Option<Player>>;
    async fn delete_player(&self, player_id: &str) -> StoreResult<()>;
    /// Players of a room ordered by `joined_at`, then id.
    async fn list_players(&self, room_id: &str) -> StoreResult<Vec<Player>>;

    async fn put_answer(&self, answer: Answer) -> StoreResult<()>;
    async fn delete_answer(&self, answer_id: &str) -> StoreResult<()>;
    /// Answers of a room ordered by `submitted_at`, then id.
    async fn list_answers(&self, room_id: &str) -> StoreResult<Vec<Answer>>;

    /// Delete everything. Admin/dev tooling only.
    async fn wipe(&self) -> StoreResult<WipeCounts>;
}
