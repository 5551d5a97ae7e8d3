//! Co Tu Lenh Web API
//!
//! Serves any number of isolated games over REST. Every game lives behind its
//! own lock in the registry; the engine itself carries no shared state.
//!
//! Configuration comes from the environment (a `.env` file is honored), see
//! [`config::ApiConfig::from_env`]. Log verbosity follows `RUST_LOG`.

mod config;
mod registry;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use cotulenh_core::square::{FILES, RANKS};
use cotulenh_core::{
    DeployView, Game, GameError, GameStatus, MoveFilter, MoveView, PieceType, Side, Square,
};

use config::ApiConfig;
use registry::{ApiError, GameRegistry};

type AppState = Arc<GameRegistry>;
type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct GameStateModel {
    id: u64,
    fen: String,
    /// Rows from rank 12 down to rank 1, files a..k. Each cell is a piece code or null.
    board: Vec<Vec<Option<String>>>,
    turn: Side,
    status: GameStatus,
    in_check: bool,
    halfmoves: u32,
    fullmoves: u32,
    history_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    deploy: Option<DeployView>,
}

#[derive(Deserialize, Default)]
struct CreateRequest {
    #[serde(default)]
    fen: Option<String>,
}

#[derive(Serialize)]
struct CreatedModel {
    id: u64,
    state: GameStateModel,
}

#[derive(Deserialize)]
struct MovesQuery {
    square: Option<String>,
    piece: Option<String>,
}

#[derive(Deserialize)]
struct MoveRequest {
    san: String,
}

#[derive(Serialize)]
struct MovePlayedModel {
    played: MoveView,
    state: GameStateModel,
}

#[derive(Serialize)]
struct UndoModel {
    undone: Option<String>,
    state: GameStateModel,
}

#[derive(Serialize)]
struct HistoryEntryModel {
    index: usize,
    notation: String,
}

#[derive(Serialize, Deserialize)]
struct FenModel {
    fen: String,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
    games: usize,
}

// =============================================================================
// Model Conversion
// =============================================================================

fn board_rows(game: &Game) -> Vec<Vec<Option<String>>> {
    (0..RANKS)
        .rev()
        .map(|rank| {
            (0..FILES)
                .map(|file| {
                    Square::new(file, rank)
                        .and_then(|sq| game.board().get(sq))
                        .map(|piece| piece.fen_code())
                })
                .collect()
        })
        .collect()
}

fn state_model(id: u64, game: &Game) -> GameStateModel {
    GameStateModel {
        id,
        fen: game.fen(),
        board: board_rows(game),
        turn: game.turn(),
        status: game.status(),
        in_check: game.is_check(),
        halfmoves: game.halfmoves(),
        fullmoves: game.fullmoves(),
        history_len: game.history().len(),
        deploy: game.deploy_view(),
    }
}

fn parse_filter(query: &MovesQuery) -> Result<MoveFilter, GameError> {
    let square = query.square.as_deref().map(str::parse::<Square>).transpose()?;
    let piece = match query.piece.as_deref() {
        Some(text) => {
            let mut chars = text.chars();
            match (chars.next().and_then(PieceType::from_char), chars.next()) {
                (Some(kind), None) => Some(kind),
                _ => return Err(GameError::MalformedInput(format!("unknown piece letter {text:?}"))),
            }
        }
        None => None,
    };
    Ok(MoveFilter { square, piece })
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreatedModel>), ApiError> {
    let id = state.create(req.fen.as_deref())?;
    let model = state.with_game(id, |game| Ok(state_model(id, game)))?;
    Ok((StatusCode::CREATED, Json(CreatedModel { id, state: model })))
}

async fn get_game(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<GameStateModel> {
    let model = state.with_game(id, |game| Ok(state_model(id, game)))?;
    Ok(Json(model))
}

async fn delete_game(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, ApiError> {
    state.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_moves(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<MovesQuery>,
) -> ApiResult<Vec<MoveView>> {
    let filter = parse_filter(&query)?;
    let moves = state.with_game(id, |game| Ok(game.move_views(filter)))?;
    Ok(Json(moves))
}

async fn make_move(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<MovePlayedModel> {
    let model = state.with_game(id, |game| {
        let mv = game.parse_move(&req.san)?;
        let played = MoveView { san: game.san(&mv), mv: mv.clone() };
        game.apply(&mv)?;
        tracing::debug!(id, san = %played.san, "move played");
        Ok(MovePlayedModel { played, state: state_model(id, game) })
    })?;
    Ok(Json(model))
}

async fn get_deploy(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Option<DeployView>> {
    let view = state.with_game(id, |game| Ok(game.deploy_view()))?;
    Ok(Json(view))
}

async fn commit_deploy(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<GameStateModel> {
    let model = state.with_game(id, |game| {
        game.commit_deploy()?;
        Ok(state_model(id, game))
    })?;
    Ok(Json(model))
}

async fn cancel_deploy(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<GameStateModel> {
    let model = state.with_game(id, |game| {
        game.cancel_deploy()?;
        Ok(state_model(id, game))
    })?;
    Ok(Json(model))
}

async fn undo(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<UndoModel> {
    let model = state.with_game(id, |game| {
        let undone = game.undo();
        Ok(UndoModel { undone, state: state_model(id, game) })
    })?;
    Ok(Json(model))
}

async fn get_history(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Vec<HistoryEntryModel>> {
    let entries = state.with_game(id, |game| {
        Ok(game
            .history()
            .iter()
            .enumerate()
            .map(|(index, record)| HistoryEntryModel { index, notation: record.notation().to_string() })
            .collect())
    })?;
    Ok(Json(entries))
}

async fn export_fen(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<FenModel> {
    let fen = state.with_game(id, |game| Ok(game.fen()))?;
    Ok(Json(FenModel { fen }))
}

/// Replace the game with a loaded position. The old game survives a rejected load.
async fn import_fen(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<FenModel>,
) -> ApiResult<GameStateModel> {
    let model = state.with_game(id, |game| {
        *game = Game::from_fen(&req.fen)?;
        Ok(state_model(id, game))
    })?;
    Ok(Json(model))
}

async fn health(State(state): State<AppState>) -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
        games: state.len(),
    })
}

// =============================================================================
// Main
// =============================================================================

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/moves", get(get_moves))
        .route("/games/{id}/move", post(make_move))
        .route("/games/{id}/deploy", get(get_deploy))
        .route("/games/{id}/deploy/commit", post(commit_deploy))
        .route("/games/{id}/deploy/cancel", post(cancel_deploy))
        .route("/games/{id}/undo", post(undo))
        .route("/games/{id}/history", get(get_history))
        .route("/games/{id}/fen", get(export_fen).post(import_fen))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = ApiConfig::from_env();
    let state: AppState = Arc::new(GameRegistry::new(config.max_games));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, max_games = config.max_games, "Co Tu Lenh API listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
