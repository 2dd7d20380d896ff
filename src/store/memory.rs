use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{RecordStore, StoreResult, WipeCounts};
use crate::types::{Answer, Player, Room};

/// In-process record store backed by `RwLock`ed maps.
///
/// Room expiry is passive: expired rooms are simply invisible to reads and
/// linger until a wipe. Good enough for a single-process deployment.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, Room>>,
    players: RwLock<HashMap<String, Player>>,
    answers: RwLock<HashMap<String, Answer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put_room(&self, room: Room) -> StoreResult<()> {
        self.rooms.write().await.insert(room.room_id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> StoreResult<Option<Room>> {
        let now = Utc::now();
        Ok(self
            .rooms
            .read()
            .await
            .get(room_id)
            .filter(|r| !r.is_expired(now))
            .cloned())
    }

    async fn find_room_by_code(&self, room_code: &str) -> StoreResult<Option<Room>> {
        let now = Utc::now();
        Ok(self
            .rooms
            .read()
            .await
            .values()
            .find(|r| r.room_code == room_code && !r.is_expired(now))
            .cloned())
    }

    async fn update_room_comments(
        &self,
        room_id: &str,
        comments: Vec<String>,
        ready_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get_mut(room_id).filter(|r| !r.is_expired(now)) {
            room.comments = comments;
            room.comments_ready_at = Some(ready_at);
            room.updated_at = now;
        }
        Ok(())
    }

    async fn put_player(&self, player: Player) -> StoreResult<()> {
        self.players
            .write()
            .await
            .insert(player.player_id.clone(), player);
        Ok(())
    }

    async fn get_player(&self, player_id: &str) -> StoreResult<Option<Player>> {
        Ok(self.players.read().await.get(player_id).cloned())
    }

    async fn delete_player(&self, player_id: &str) -> StoreResult<()> {
        self.players.write().await.remove(player_id);
        Ok(())
    }

    async fn list_players(&self, room_id: &str) -> StoreResult<Vec<Player>> {
        let mut players: Vec<Player> = self
            .players
            .read()
            .await
            .values()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect();
        players.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        Ok(players)
    }

    async fn put_answer(&self, answer: Answer) -> StoreResult<()> {
        self.answers
            .write()
            .await
            .insert(answer.answer_id.clone(), answer);
        Ok(())
    }

    async fn delete_answer(&self, answer_id: &str) -> StoreResult<()> {
        self.answers.write().await.remove(answer_id);
        Ok(())
    }

    async fn list_answers(&self, room_id: &str) -> StoreResult<Vec<Answer>> {
        let mut answers: Vec<Answer> = self
            .answers
            .read()
            .await
            .values()
            .filter(|a| a.room_id == room_id)
            .cloned()
            .collect();
        answers.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.answer_id.cmp(&b.answer_id))
        });
        Ok(answers)
    }

    async fn wipe(&self) -> StoreResult<WipeCounts> {
        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;
        let mut answers = self.answers.write().await;
        let counts = WipeCounts {
            rooms: rooms.len(),
            players: players.len(),
            answers: answers.len(),
        };
        rooms.clear();
        players.clear();
        answers.clear();
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnswerType, PlayerRole, RoomState};
    use chrono::Duration;
    use ulid::Ulid;

    fn room(code: &str) -> Room {
        let now = Utc::now();
        Room {
            room_id: Ulid::new().to_string(),
            room_code: code.to_string(),
            host_player_id: Ulid::new().to_string(),
            state: RoomState::Waiting,
            current_topic: None,
            topic_pool: Vec::new(),
            used_topics: Vec::new(),
            last_judge_result: None,
            comments_ready_at: None,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
            expires_at: Room::expiry_from(now),
        }
    }

    fn player(room_id: &str, name: &str, joined_offset_secs: i64) -> Player {
        Player {
            player_id: Ulid::new().to_string(),
            room_id: room_id.to_string(),
            name: name.to_string(),
            role: PlayerRole::Player,
            connected: true,
            joined_at: Utc::now() + Duration::seconds(joined_offset_secs),
        }
    }

    fn answer(room_id: &str, player: &Player, text: &str, offset_secs: i64) -> Answer {
        Answer {
            answer_id: Ulid::new().to_string(),
            room_id: room_id.to_string(),
            player_id: player.player_id.clone(),
            player_name: player.name.clone(),
            answer_type: AnswerType::Text,
            text_answer: Some(text.to_string()),
            drawing_data: None,
            submitted_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn room_roundtrip_and_code_lookup() {
        let store = MemoryStore::new();
        let room = room("XK42PQ");
        let id = room.room_id.clone();
        store.put_room(room).await.unwrap();

        let fetched = store.get_room(&id).await.unwrap().unwrap();
        assert_eq!(fetched.room_code, "XK42PQ");

        let by_code = store.find_room_by_code("XK42PQ").await.unwrap().unwrap();
        assert_eq!(by_code.room_id, id);
        assert!(store.find_room_by_code("NOPE00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_rooms_are_invisible() {
        let store = MemoryStore::new();
        let mut room = room("DEAD00");
        room.expires_at = Utc::now() - Duration::seconds(1);
        let id = room.room_id.clone();
        store.put_room(room).await.unwrap();

        assert!(store.get_room(&id).await.unwrap().is_none());
        assert!(store.find_room_by_code("DEAD00").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_players_ordered_by_join_time() {
        let store = MemoryStore::new();
        let room = room("ORDER1");
        let late = player(&room.room_id, "Late", 20);
        let early = player(&room.room_id, "Early", 0);
        let other = player("other-room", "Elsewhere", 5);
        store.put_player(late).await.unwrap();
        store.put_player(early).await.unwrap();
        store.put_player(other).await.unwrap();

        let players = store.list_players(&room.room_id).await.unwrap();
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }

    #[tokio::test]
    async fn list_answers_ordered_by_submission() {
        let store = MemoryStore::new();
        let room = room("ORDER2");
        let p = player(&room.room_id, "Alice", 0);
        store
            .put_answer(answer(&room.room_id, &p, "second", 10))
            .await
            .unwrap();
        store
            .put_answer(answer(&room.room_id, &p, "first", 0))
            .await
            .unwrap();

        let answers = store.list_answers(&room.room_id).await.unwrap();
        let texts: Vec<_> = answers
            .iter()
            .map(|a| a.text_answer.as_deref().unwrap())
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn comment_update_leaves_other_fields_alone() {
        let store = MemoryStore::new();
        let mut room = room("SCOPED");
        room.state = RoomState::Judging;
        room.current_topic = Some("A red food".to_string());
        room.last_judge_result = Some(true);
        let id = room.room_id.clone();
        store.put_room(room).await.unwrap();

        let ready_at = Utc::now();
        store
            .update_room_comments(&id, vec!["nice".to_string()], ready_at)
            .await
            .unwrap();

        let fetched = store.get_room(&id).await.unwrap().unwrap();
        assert_eq!(fetched.comments, vec!["nice".to_string()]);
        assert_eq!(fetched.comments_ready_at, Some(ready_at));
        assert_eq!(fetched.last_judge_result, Some(true));
        assert_eq!(fetched.state, RoomState::Judging);
        assert_eq!(fetched.current_topic.as_deref(), Some("A red food"));

        // Vanished rooms are a silent no-op.
        store
            .update_room_comments("missing", Vec::new(), ready_at)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wipe_reports_counts_and_empties_store() {
        let store = MemoryStore::new();
        let room = room("WIPE01");
        let p = player(&room.room_id, "Alice", 0);
        store
            .put_answer(answer(&room.room_id, &p, "hi", 0))
            .await
            .unwrap();
        store.put_player(p).await.unwrap();
        let id = room.room_id.clone();
        store.put_room(room).await.unwrap();

        let counts = store.wipe().await.unwrap();
        assert_eq!(
            counts,
            WipeCounts {
                rooms: 1,
                players: 1,
                answers: 1
            }
        );
        assert!(store.get_room(&id).await.unwrap().is_none());
        assert_eq!(store.wipe().await.unwrap(), WipeCounts::default());
    }
}
