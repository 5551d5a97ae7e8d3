//! Open games, one isolated `Game` per id.
//!
//! The map lock is only held to look a game up; each game has its own mutex,
//! so requests against different games never wait on each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use cotulenh_core::{Game, GameError};

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("game {0} not found")]
    NotFound(u64),

    #[error("limit of {0} open games reached")]
    TooManyGames(usize),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Game(GameError::MalformedInput(_) | GameError::IllegalMove(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Game(GameError::SessionState(_)) => StatusCode::CONFLICT,
            ApiError::Game(GameError::InvariantViolation(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyGames(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Game(err) => err.kind(),
            ApiError::NotFound(_) => "not_found",
            ApiError::TooManyGames(_) => "too_many_games",
        }
    }
}

#[derive(Serialize)]
struct ErrorModel {
    kind: &'static str,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), kind = self.kind(), "request rejected: {self}");
        let body = ErrorModel { kind: self.kind(), detail: self.to_string() };
        (status, Json(body)).into_response()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct GameRegistry {
    games: Mutex<HashMap<u64, Arc<Mutex<Game>>>>,
    next_id: AtomicU64,
    max_games: usize,
}

impl GameRegistry {
    pub fn new(max_games: usize) -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_games,
        }
    }

    /// Open a game, from the start position or from position text.
    pub fn create(&self, fen: Option<&str>) -> Result<u64, ApiError> {
        let game = match fen {
            Some(text) => Game::from_fen(text)?,
            None => Game::new(),
        };
        let mut games = lock(&self.games);
        if games.len() >= self.max_games {
            return Err(ApiError::TooManyGames(self.max_games));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        games.insert(id, Arc::new(Mutex::new(game)));
        tracing::info!(id, open = games.len(), "game created");
        Ok(id)
    }

    pub fn remove(&self, id: u64) -> Result<(), ApiError> {
        let mut games = lock(&self.games);
        games.remove(&id).ok_or(ApiError::NotFound(id))?;
        tracing::info!(id, open = games.len(), "game deleted");
        Ok(())
    }

    pub fn len(&self) -> usize {
        lock(&self.games).len()
    }

    /// Run `f` against one game while holding that game's lock.
    pub fn with_game<T>(
        &self,
        id: u64,
        f: impl FnOnce(&mut Game) -> Result<T, GameError>,
    ) -> Result<T, ApiError> {
        let entry = lock(&self.games).get(&id).cloned().ok_or(ApiError::NotFound(id))?;
        let mut game = lock(&*entry);
        Ok(f(&mut *game)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotulenh_core::DEFAULT_POSITION;

    #[test]
    fn test_create_and_remove() {
        let registry = GameRegistry::new(4);
        let id = registry.create(None).unwrap();
        assert_eq!(registry.len(), 1);
        let fen = registry.with_game(id, |game| Ok(game.fen())).unwrap();
        assert_eq!(fen, DEFAULT_POSITION);
        registry.remove(id).unwrap();
        assert!(matches!(registry.remove(id), Err(ApiError::NotFound(_))));
        assert!(matches!(registry.with_game(id, |_| Ok(())), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_games_are_isolated() {
        let registry = GameRegistry::new(4);
        let a = registry.create(None).unwrap();
        let b = registry.create(None).unwrap();
        assert_ne!(a, b);
        registry.with_game(a, |game| game.apply_san("I&c4").map(|_| ())).unwrap();
        let fen_b = registry.with_game(b, |game| Ok(game.fen())).unwrap();
        assert_eq!(fen_b, DEFAULT_POSITION);
    }

    #[test]
    fn test_limit() {
        let registry = GameRegistry::new(1);
        registry.create(None).unwrap();
        let err = registry.create(None).unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_bad_fen_is_rejected() {
        let registry = GameRegistry::new(4);
        let err = registry.create(Some("not a position")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "malformed_input");
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_error_status_mapping() {
        let registry = GameRegistry::new(4);
        let id = registry.create(None).unwrap();
        let illegal = registry.with_game(id, |game| game.apply_san("Ic7")).unwrap_err();
        assert_eq!(illegal.status(), StatusCode::BAD_REQUEST);
        let session = registry.with_game(id, |game| game.commit_deploy()).unwrap_err();
        assert_eq!(session.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound(9).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_foreign_move_during_deploy_conflicts() {
        let registry = GameRegistry::new(4);
        let id = registry
            .create(Some("3c7/11/11/11/11/11/11/5T(I)5/11/11/11/10C r - - 0 1"))
            .unwrap();
        registry.with_game(id, |game| game.apply_san("T>f7")).unwrap();
        let err = registry.with_game(id, |game| game.apply_san("Ck2")).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "session_state");
    }
}
