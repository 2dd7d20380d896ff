use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::GameResult;
use crate::state::RoomService;
use crate::store::WipeCounts;
use crate::types::{Answer, AnswerType, CommentBatch, JudgeOutcome, Player, RoomView};

/// Build the HTTP surface over the room state machine.
pub fn router(service: RoomService) -> Router {
    Router::new()
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/join", post(join_room))
        .route("/api/rooms/{room_id}", get(get_room))
        .route("/api/rooms/by-code/{room_code}", get(get_room_by_code))
        .route("/api/rooms/{room_id}/players", get(list_players))
        .route(
            "/api/rooms/{room_id}/answers",
            get(list_answers).post(submit_answer),
        )
        .route("/api/rooms/{room_id}/leave", post(leave_room))
        .route("/api/rooms/{room_id}/kick", post(kick_player))
        .route("/api/rooms/{room_id}/start", post(start_game))
        .route("/api/rooms/{room_id}/judging", post(start_judging))
        .route("/api/rooms/{room_id}/comments", post(generate_comments))
        .route("/api/rooms/{room_id}/judge", post(judge_answers))
        .route("/api/rooms/{room_id}/next-round", post(next_round))
        .route("/api/rooms/{room_id}/end", post(end_game))
        .route("/api/admin/data", delete(wipe_all))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    host_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomRequest {
    room_code: String,
    player_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaveRoomRequest {
    player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KickPlayerRequest {
    player_id: String,
    kicked_player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnswerRequest {
    player_id: String,
    answer_type: AnswerType,
    text_answer: Option<String>,
    drawing_data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JudgeRequest {
    is_match: bool,
}

async fn create_room(
    State(service): State<RoomService>,
    Json(req): Json<CreateRoomRequest>,
) -> GameResult<Json<RoomView>> {
    Ok(Json(service.create_room(&req.host_name).await?))
}

async fn join_room(
    State(service): State<RoomService>,
    Json(req): Json<JoinRoomRequest>,
) -> GameResult<Json<Player>> {
    Ok(Json(
        service.join_room(&req.room_code, &req.player_name).await?,
    ))
}

// Absent rooms answer 200 with a JSON null body, clients poll this.
async fn get_room(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<Option<RoomView>>> {
    Ok(Json(service.get_room(&room_id).await?))
}

async fn get_room_by_code(
    State(service): State<RoomService>,
    Path(room_code): Path<String>,
) -> GameResult<Json<Option<RoomView>>> {
    Ok(Json(service.get_room_by_code(&room_code).await?))
}

async fn list_players(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<Vec<Player>>> {
    Ok(Json(service.list_players(&room_id).await?))
}

async fn list_answers(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<Vec<Answer>>> {
    Ok(Json(service.list_answers(&room_id).await?))
}

async fn leave_room(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
    Json(req): Json<LeaveRoomRequest>,
) -> GameResult<Json<serde_json::Value>> {
    service.leave_room(&room_id, &req.player_id).await?;
    Ok(Json(serde_json::json!({ "left": true })))
}

async fn kick_player(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
    Json(req): Json<KickPlayerRequest>,
) -> GameResult<Json<serde_json::Value>> {
    service
        .kick_player(&room_id, &req.player_id, &req.kicked_player_id)
        .await?;
    Ok(Json(serde_json::json!({ "kicked": true })))
}

async fn start_game(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<RoomView>> {
    Ok(Json(service.start_game(&room_id).await?))
}

async fn submit_answer(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> GameResult<Json<Answer>> {
    Ok(Json(
        service
            .submit_answer(
                &room_id,
                &req.player_id,
                req.answer_type,
                req.text_answer,
                req.drawing_data,
            )
            .await?,
    ))
}

async fn start_judging(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<RoomView>> {
    Ok(Json(service.start_judging(&room_id).await?))
}

async fn generate_comments(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<CommentBatch>> {
    Ok(Json(service.generate_judging_comments(&room_id).await?))
}

async fn judge_answers(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
    Json(req): Json<JudgeRequest>,
) -> GameResult<Json<JudgeOutcome>> {
    Ok(Json(service.judge_answers(&room_id, req.is_match).await?))
}

async fn next_round(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<RoomView>> {
    Ok(Json(service.next_round(&room_id).await?))
}

async fn end_game(
    State(service): State<RoomService>,
    Path(room_id): Path<String>,
) -> GameResult<Json<RoomView>> {
    Ok(Json(service.end_game(&room_id).await?))
}

async fn wipe_all(State(service): State<RoomService>) -> GameResult<Json<WipeCounts>> {
    Ok(Json(service.wipe_all().await?))
}
