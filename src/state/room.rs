use chrono::Utc;
use rand::Rng;
use ulid::Ulid;

use super::RoomService;
use crate::error::{GameError, GameResult};
use crate::types::{Player, PlayerRole, Room, RoomState, RoomView};

const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ATTEMPTS: usize = 5;

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_CHARSET[rng.random_range(0..ROOM_CODE_CHARSET.len())] as char)
        .collect()
}

impl RoomService {
    /// Create a room in WAITING with the creator as host.
    pub async fn create_room(&self, host_name: &str) -> GameResult<RoomView> {
        let host_name = host_name.trim();
        if host_name.is_empty() {
            return Err(GameError::Validation("host name must not be blank".into()));
        }

        let room_code = self.unique_room_code().await?;
        let now = Utc::now();
        let host = Player {
            player_id: Ulid::new().to_string(),
            room_id: Ulid::new().to_string(),
            name: host_name.to_string(),
            role: PlayerRole::Host,
            connected: true,
            joined_at: now,
        };
        let room = Room {
            room_id: host.room_id.clone(),
            room_code,
            host_player_id: host.player_id.clone(),
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
        };

        self.store.put_room(room.clone()).await?;
        self.store.put_player(host.clone()).await?;

        tracing::info!(
            room_id = %room.room_id,
            room_code = %room.room_code,
            "room created"
        );

        Ok(RoomView {
            room,
            players: vec![host],
            answers: Vec::new(),
        })
    }

    /// Uniqueness is best effort: after a bounded number of collisions we
    /// proceed with the last candidate and let code lookup pick either room.
    async fn unique_room_code(&self) -> GameResult<String> {
        let mut code = generate_room_code();
        for _ in 0..ROOM_CODE_ATTEMPTS {
            if self.store.find_room_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            code = generate_room_code();
        }
        tracing::warn!(room_code = %code, "room code still colliding after retries");
        Ok(code)
    }

    /// Join a live room by its 6-character code.
    pub async fn join_room(&self, room_code: &str, player_name: &str) -> GameResult<Player> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(GameError::Validation(
                "player name must not be blank".into(),
            ));
        }

        let room = self
            .store
            .find_room_by_code(room_code)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("room with code {room_code}")))?;

        let player = Player {
            player_id: Ulid::new().to_string(),
            room_id: room.room_id.clone(),
            name: player_name.to_string(),
            role: PlayerRole::Player,
            connected: true,
            joined_at: Utc::now(),
        };
        self.store.put_player(player.clone()).await?;

        tracing::info!(
            room_id = %room.room_id,
            player_id = %player.player_id,
            "player joined"
        );

        Ok(player)
    }

    /// Remove a player from a room. Idempotent: leaving twice, or leaving a
    /// room that no longer exists, succeeds silently. If the host departs,
    /// the earliest-joined remaining player inherits the host role; an empty
    /// room is left alone to expire.
    pub async fn leave_room(&self, room_id: &str, player_id: &str) -> GameResult<()> {
        let departing = self.store.get_player(player_id).await?;
        self.store.delete_player(player_id).await?;

        let Some(mut room) = self.store.get_room(room_id).await? else {
            return Ok(());
        };

        let was_host = room.host_player_id == player_id
            || departing.is_some_and(|p| p.role == PlayerRole::Host);
        if !was_host {
            return Ok(());
        }

        let remaining = self.store.list_players(room_id).await?;
        let Some(mut successor) = remaining.into_iter().next() else {
            return Ok(());
        };

        successor.role = PlayerRole::Host;
        room.host_player_id = successor.player_id.clone();
        room.touch();
        tracing::info!(
            room_id = %room_id,
            new_host = %successor.player_id,
            "host left, promoting successor"
        );
        self.store.put_player(successor).await?;
        self.store.put_room(room).await?;
        Ok(())
    }

    /// Host-only removal of another player, including their answers.
    pub async fn kick_player(
        &self,
        room_id: &str,
        player_id: &str,
        kicked_player_id: &str,
    ) -> GameResult<()> {
        let room = self.require_room(room_id).await?;

        if room.host_player_id != player_id {
            return Err(GameError::Validation(
                "only the host can kick players".into(),
            ));
        }
        if player_id == kicked_player_id {
            return Err(GameError::Validation("the host cannot kick themselves".into()));
        }

        self.store.delete_player(kicked_player_id).await?;

        let answers = self.store.list_answers(room_id).await?;
        for answer in answers
            .iter()
            .filter(|a| a.player_id == kicked_player_id)
        {
            if let Err(e) = self.store.delete_answer(&answer.answer_id).await {
                tracing::warn!(
                    answer_id = %answer.answer_id,
                    error = %e,
                    "failed to delete answer of kicked player"
                );
            }
        }

        tracing::info!(
            room_id = %room_id,
            kicked_player_id = %kicked_player_id,
            "player kicked"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::service;
    use super::*;

    #[test]
    fn room_codes_are_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let code = generate_room_code();
            assert_eq!(code.len(), 6);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn create_room_rejects_blank_names() {
        let (service, _store, _topics) = service();
        assert!(matches!(
            service.create_room("   ").await.unwrap_err(),
            GameError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn create_room_seeds_host_and_waiting_state() {
        let (service, _store, _topics) = service();
        let view = service.create_room("Alice").await.unwrap();

        assert_eq!(view.room.state, RoomState::Waiting);
        assert!(view.room.current_topic.is_none());
        assert_eq!(view.players.len(), 1);
        assert_eq!(view.players[0].role, PlayerRole::Host);
        assert_eq!(view.room.host_player_id, view.players[0].player_id);
    }

    #[tokio::test]
    async fn join_room_requires_live_code() {
        let (service, _store, _topics) = service();
        assert!(matches!(
            service.join_room("ZZZZZZ", "Bob").await.unwrap_err(),
            GameError::NotFound(_)
        ));

        let view = service.create_room("Alice").await.unwrap();
        let player = service
            .join_room(&view.room.room_code, "Bob")
            .await
            .unwrap();
        assert_eq!(player.room_id, view.room.room_id);
        assert_eq!(player.role, PlayerRole::Player);
    }
}
