//! Error type shared by every fallible engine operation.

/// Errors surfaced by the rules engine.
///
/// Every player-facing operation that returns one of these leaves the game
/// untouched. `InvariantViolation` is the exception: it reports a logic defect
/// and is raised as a panic by the undo machinery rather than returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Position or move text that cannot be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A move that is not in the legal move list, or a commit the board cannot support.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A request that does not fit the current deploy-session state.
    #[error("deploy session error: {0}")]
    SessionState(String),

    /// Board state that breaks a rule invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl GameError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        GameError::MalformedInput(msg.into())
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        GameError::IllegalMove(msg.into())
    }

    pub(crate) fn session(msg: impl Into<String>) -> Self {
        GameError::SessionState(msg.into())
    }

    /// Short machine-readable tag, used by the API layer.
    pub const fn kind(&self) -> &'static str {
        match self {
            GameError::MalformedInput(_) => "malformed_input",
            GameError::IllegalMove(_) => "illegal_move",
            GameError::SessionState(_) => "session_state",
            GameError::InvariantViolation(_) => "invariant_violation",
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = GameError::illegal("Tc5 is not legal");
        assert_eq!(err.to_string(), "illegal move: Tc5 is not legal");
        assert_eq!(err.kind(), "illegal_move");
    }
}
