use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type AnswerId = String;

/// Rooms are considered garbage this long after creation; expiry is enforced
/// passively by the record store, not by the state machine.
pub const ROOM_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomState {
    Waiting,
    Answering,
    Judging,
}

impl RoomState {
    /// A topic is active exactly while a round is being played.
    pub fn has_active_topic(self) -> bool {
        matches!(self, RoomState::Answering | RoomState::Judging)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RoomState::Waiting => "WAITING",
            RoomState::Answering => "ANSWERING",
            RoomState::Judging => "JUDGING",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerRole {
    Host,
    Player,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerType {
    Text,
    Drawing,
}

/// One game session. Owns the topic pool, the used-topic history and the
/// current comment batch; players and answers reference it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    /// 6-character human-entry code, unique across live rooms (best effort).
    pub room_code: String,
    pub host_player_id: PlayerId,
    pub state: RoomState,
    /// Set iff `state` is ANSWERING or JUDGING.
    pub current_topic: Option<String>,
    /// Unused topics, front = next round's topic.
    pub topic_pool: Vec<String>,
    /// Append-only history, passed to the topic supplier to bias against repeats.
    pub used_topics: Vec<String>,
    pub last_judge_result: Option<bool>,
    /// When the comment batch for the current judging cycle landed.
    /// This is the comment-completion clock; the judging-decision clock lives
    /// on [`JudgeOutcome`] and never touches the room record.
    pub comments_ready_at: Option<DateTime<Utc>>,
    /// Reaction strings for the most recently commented round; overwritten
    /// (not appended) on each judging cycle.
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Room {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn expiry_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::hours(ROOM_TTL_HOURS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: PlayerId,
    pub room_id: RoomId,
    pub name: String,
    pub role: PlayerRole,
    pub connected: bool,
    pub joined_at: DateTime<Utc>,
}

/// One submission per player per round. Duplicate submissions are allowed and
/// all persist; prior-round answers are bulk-deleted when a round advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer_id: AnswerId,
    pub room_id: RoomId,
    pub player_id: PlayerId,
    /// Name snapshot at submission time; "Unknown" if the player record was gone.
    pub player_name: String,
    pub answer_type: AnswerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing_data: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Answer {
    /// Display text for prompts and logs; drawings carry no inline text.
    pub fn display_text(&self) -> &str {
        match self.answer_type {
            AnswerType::Text => self.text_answer.as_deref().unwrap_or("(no answer)"),
            AnswerType::Drawing => "(drawing)",
        }
    }
}

/// The composed aggregate returned to clients: room + players + answers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub players: Vec<Player>,
    pub answers: Vec<Answer>,
}

impl RoomView {
    /// Completion detection for the answering phase: every player in the room
    /// has at least one answer on record. Duplicate submissions count once.
    pub fn all_answered(&self) -> bool {
        !self.players.is_empty()
            && self.players.iter().all(|p| {
                self.answers.iter().any(|a| a.player_id == p.player_id)
            })
    }
}

/// Transient result of a judging decision. `judged_at` is the decision clock,
/// independent of the room's `comments_ready_at`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeOutcome {
    pub room_id: RoomId,
    pub is_match: bool,
    pub judged_at: DateTime<Utc>,
}

/// Transient result of a comment-generation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBatch {
    pub room_id: RoomId,
    pub comments: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
