use chrono::Utc;

use super::RoomService;
use crate::error::{GameError, GameResult};
use crate::types::CommentBatch;

impl RoomService {
    /// Fire-and-forget comment pipeline. The handle is dropped; failures are
    /// logged and swallowed, the room's phase and verdict are never altered
    /// from here.
    pub(crate) fn spawn_comment_generation(&self, room_id: String) {
        let service = self.clone();
        tokio::spawn(async move {
            match service.generate_judging_comments(&room_id).await {
                Ok(batch) => {
                    tracing::info!(
                        room_id = %room_id,
                        comments = batch.comments.len(),
                        "comment batch ready"
                    );
                }
                Err(e) => {
                    tracing::warn!(room_id = %room_id, error = %e, "comment generation failed");
                }
            }
        });
    }

    /// Generate reaction comments for the room's current topic and answers,
    /// then overwrite the room's comment fields. Also exposed as its own
    /// HTTP operation for clients that want a synchronous regeneration.
    ///
    /// The write is field-scoped: a verdict the host persists while the
    /// generation call is in flight must survive.
    pub async fn generate_judging_comments(&self, room_id: &str) -> GameResult<CommentBatch> {
        let room = self.require_room(room_id).await?;
        let topic = room.current_topic.clone().ok_or_else(|| {
            GameError::InvalidState(format!(
                "generate_judging_comments requires an active topic, room {} is {}",
                room.room_id, room.state
            ))
        })?;
        let answers = self.store.list_answers(room_id).await?;

        let comments = self.comments.generate_comments(&topic, &answers).await?;
        let generated_at = Utc::now();

        self.store
            .update_room_comments(room_id, comments.clone(), generated_at)
            .await?;

        Ok(CommentBatch {
            room_id: room_id.to_string(),
            comments,
            generated_at,
        })
    }
}
