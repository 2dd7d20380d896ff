use chrono::Utc;
use ulid::Ulid;

use super::RoomService;
use crate::error::{GameError, GameResult};
use crate::llm::LlmError;
use crate::types::{Answer, AnswerType, JudgeOutcome, RoomState, RoomView};

/// A fresh supplier batch is requested once the pool drops to this size.
pub const POOL_LOW_WATER: usize = 3;

impl RoomService {
    /// WAITING → ANSWERING: fetch the initial topic batch and deal the first.
    pub async fn start_game(&self, room_id: &str) -> GameResult<RoomView> {
        let mut room = self.require_room(room_id).await?;
        Self::guard_state(&room, RoomState::Waiting, "start_game")?;

        let mut batch = self.topics.generate_topics(&room.used_topics).await?;
        if batch.is_empty() {
            return Err(GameError::Upstream(LlmError::EmptyBatch));
        }

        let topic = batch.remove(0);
        room.used_topics.push(topic.clone());
        room.current_topic = Some(topic);
        room.topic_pool = batch;
        room.state = RoomState::Answering;
        room.touch();
        self.store.put_room(room.clone()).await?;

        tracing::info!(
            room_id = %room.room_id,
            pool_size = room.topic_pool.len(),
            "game started"
        );

        self.compose_view(room).await
    }

    /// Record an answer for the current round. Duplicate submissions by the
    /// same player all persist; completion detection counts distinct players.
    pub async fn submit_answer(
        &self,
        room_id: &str,
        player_id: &str,
        answer_type: AnswerType,
        text_answer: Option<String>,
        drawing_data: Option<String>,
    ) -> GameResult<Answer> {
        let room = self.require_room(room_id).await?;
        Self::guard_state(&room, RoomState::Answering, "submit_answer")?;

        let text_answer = text_answer.filter(|t| !t.trim().is_empty());
        let drawing_data = drawing_data.filter(|d| !d.trim().is_empty());
        let (text_answer, drawing_data) = match answer_type {
            AnswerType::Text => {
                if text_answer.is_none() {
                    return Err(GameError::Validation(
                        "text answers require textAnswer".into(),
                    ));
                }
                (text_answer, None)
            }
            AnswerType::Drawing => {
                if drawing_data.is_none() {
                    return Err(GameError::Validation(
                        "drawing answers require drawingData".into(),
                    ));
                }
                (None, drawing_data)
            }
        };

        let player_name = self
            .store
            .get_player(player_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| "Unknown".to_string());

        let answer = Answer {
            answer_id: Ulid::new().to_string(),
            room_id: room.room_id,
            player_id: player_id.to_string(),
            player_name,
            answer_type,
            text_answer,
            drawing_data,
            submitted_at: Utc::now(),
        };
        self.store.put_answer(answer.clone()).await?;

        tracing::debug!(
            room_id = %answer.room_id,
            player_id = %answer.player_id,
            answer_type = ?answer.answer_type,
            "answer submitted"
        );

        Ok(answer)
    }

    /// ANSWERING → JUDGING. Returns immediately; reaction comments are
    /// produced by a detached task, so the previous round's comments stay
    /// visible until the new batch lands.
    pub async fn start_judging(&self, room_id: &str) -> GameResult<RoomView> {
        let mut room = self.require_room(room_id).await?;
        Self::guard_state(&room, RoomState::Answering, "start_judging")?;

        room.state = RoomState::Judging;
        room.touch();
        self.store.put_room(room.clone()).await?;

        self.spawn_comment_generation(room.room_id.clone());

        self.compose_view(room).await
    }

    /// Persist the host's match/no-match verdict. Comments are untouched;
    /// the returned outcome carries the decision timestamp.
    pub async fn judge_answers(&self, room_id: &str, is_match: bool) -> GameResult<JudgeOutcome> {
        let mut room = self.require_room(room_id).await?;
        Self::guard_state(&room, RoomState::Judging, "judge_answers")?;

        room.last_judge_result = Some(is_match);
        room.touch();
        self.store.put_room(room.clone()).await?;

        tracing::info!(room_id = %room.room_id, is_match, "answers judged");

        Ok(JudgeOutcome {
            room_id: room.room_id,
            is_match,
            judged_at: Utc::now(),
        })
    }

    /// JUDGING → ANSWERING with the next pooled topic. Clears answers and
    /// the verdict but leaves the comment batch stale on purpose; it is
    /// overwritten when the next judging cycle produces one.
    pub async fn next_round(&self, room_id: &str) -> GameResult<RoomView> {
        let mut room = self.require_room(room_id).await?;
        Self::guard_state(&room, RoomState::Judging, "next_round")?;

        let answers = self.store.list_answers(room_id).await?;
        for answer in &answers {
            if let Err(e) = self.store.delete_answer(&answer.answer_id).await {
                tracing::warn!(
                    answer_id = %answer.answer_id,
                    error = %e,
                    "failed to delete answer during round advance"
                );
            }
        }

        if room.topic_pool.len() <= POOL_LOW_WATER {
            let batch = self.topics.generate_topics(&room.used_topics).await?;
            tracing::info!(
                room_id = %room.room_id,
                fetched = batch.len(),
                "topic pool replenished"
            );
            room.topic_pool.extend(batch);
        }
        if room.topic_pool.is_empty() {
            return Err(GameError::Upstream(LlmError::EmptyBatch));
        }

        let topic = room.topic_pool.remove(0);
        room.used_topics.push(topic.clone());
        room.current_topic = Some(topic);
        room.state = RoomState::Answering;
        room.last_judge_result = None;
        room.comments_ready_at = None;
        room.touch();
        self.store.put_room(room.clone()).await?;

        self.compose_view(room).await
    }

    /// Back to the lobby from any state. Pools, history, comments and
    /// answers are all kept; only the phase and the active topic reset.
    pub async fn end_game(&self, room_id: &str) -> GameResult<RoomView> {
        let mut room = self.require_room(room_id).await?;

        room.state = RoomState::Waiting;
        room.current_topic = None;
        room.touch();
        self.store.put_room(room.clone()).await?;

        tracing::info!(room_id = %room.room_id, "game ended");

        self.compose_view(room).await
    }
}
