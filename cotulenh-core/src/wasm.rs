//! WASM bindings for cotulenh-core
//!
//! Provides a JavaScript-friendly API for the game logic. Structured values
//! cross the boundary as plain JS objects through `serde-wasm-bindgen`.

use wasm_bindgen::prelude::*;

use crate::{Game, GameError, MoveFilter, PieceType, Square};

fn js_error(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(Into::into)
}

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game at the start position
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { inner: Game::new() }
    }

    /// Load a game from position text
    #[wasm_bindgen(js_name = fromFen)]
    pub fn from_fen(fen: &str) -> Result<WasmGame, JsValue> {
        Game::from_fen(fen).map(|inner| WasmGame { inner }).map_err(js_error)
    }

    /// Position text, including an open deploy session
    pub fn fen(&self) -> String {
        self.inner.fen()
    }

    /// Side to move: "r" or "b"
    pub fn turn(&self) -> String {
        self.inner.turn().to_char().to_string()
    }

    /// Piece code on a square ("N(FT)", "+c"), or undefined when empty
    #[wasm_bindgen(js_name = pieceAt)]
    pub fn piece_at(&self, square: &str) -> Result<Option<String>, JsValue> {
        let sq: Square = square.parse().map_err(js_error)?;
        Ok(self.inner.board().get(sq).map(|p| p.fen_code()))
    }

    /// Legal moves as an array of { san, from, to, piece, captured, mode, deploy }.
    /// Both filters are optional: an origin square and a piece letter.
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, square: Option<String>, piece: Option<String>) -> Result<JsValue, JsValue> {
        let square = square.map(|s| s.parse::<Square>()).transpose().map_err(js_error)?;
        let piece = match piece.as_deref().and_then(|p| p.chars().next()) {
            Some(c) => Some(
                PieceType::from_char(c).ok_or_else(|| JsValue::from_str("unknown piece letter"))?,
            ),
            None => None,
        };
        to_js(&self.inner.move_views(MoveFilter { square, piece }))
    }

    /// Apply a move written in notation. Throws on malformed or illegal moves.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, san: &str) -> Result<(), JsValue> {
        self.inner.apply_san(san).map(|_| ()).map_err(js_error)
    }

    /// Open deploy session as { origin, side, stack, remaining, moves, deployed }, or null
    #[wasm_bindgen(js_name = deploySession)]
    pub fn deploy_session(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.deploy_view())
    }

    #[wasm_bindgen(js_name = commitDeploy)]
    pub fn commit_deploy(&mut self) -> Result<(), JsValue> {
        self.inner.commit_deploy().map_err(js_error)
    }

    #[wasm_bindgen(js_name = cancelDeploy)]
    pub fn cancel_deploy(&mut self) -> Result<(), JsValue> {
        self.inner.cancel_deploy().map_err(js_error)
    }

    /// Undo the latest sub-move or turn. Returns its notation, or undefined
    pub fn undo(&mut self) -> Option<String> {
        self.inner.undo()
    }

    /// Notation of every completed turn
    pub fn history(&self) -> Vec<String> {
        self.inner.history().iter().map(|r| r.notation().to_string()).collect()
    }

    #[wasm_bindgen(js_name = isCheck)]
    pub fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }

    /// Game status as { result, winner? }
    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.status())
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
