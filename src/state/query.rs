use super::RoomService;
use crate::error::GameResult;
use crate::store::WipeCounts;
use crate::types::{Answer, Player, Room, RoomView};

impl RoomService {
    /// Aggregate view by id. Absence (including expiry) is None, not an error.
    pub async fn get_room(&self, room_id: &str) -> GameResult<Option<RoomView>> {
        match self.store.get_room(room_id).await? {
            Some(room) => Ok(Some(self.compose_view(room).await?)),
            None => Ok(None),
        }
    }

    /// Aggregate view by join code, same null contract as [`get_room`].
    ///
    /// [`get_room`]: RoomService::get_room
    pub async fn get_room_by_code(&self, room_code: &str) -> GameResult<Option<RoomView>> {
        match self.store.find_room_by_code(room_code).await? {
            Some(room) => Ok(Some(self.compose_view(room).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_players(&self, room_id: &str) -> GameResult<Vec<Player>> {
        Ok(self.store.list_players(room_id).await?)
    }

    pub async fn list_answers(&self, room_id: &str) -> GameResult<Vec<Answer>> {
        Ok(self.store.list_answers(room_id).await?)
    }

    /// Delete every record. Admin/dev surface only.
    pub async fn wipe_all(&self) -> GameResult<WipeCounts> {
        let counts = self.store.wipe().await?;
        tracing::warn!(
            rooms = counts.rooms,
            players = counts.players,
            answers = counts.answers,
            "all data wiped"
        );
        Ok(counts)
    }

    pub(crate) async fn compose_view(&self, room: Room) -> GameResult<RoomView> {
        let players = self.store.list_players(&room.room_id).await?;
        let answers = self.store.list_answers(&room.room_id).await?;
        Ok(RoomView {
            room,
            players,
            answers,
        })
    }
}
