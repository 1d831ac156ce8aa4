use std::path::PathBuf;

/// Errors decoding a fixed-width board key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("board key must be 32 or 34 digits, got {0}")]
    Length(usize),

    #[error("non-digit field {field:?} at offset {offset}")]
    NotANumber { offset: usize, field: String },

    #[error("field value {value} at offset {offset} exceeds 16")]
    OutOfRange { offset: usize, value: u8 },

    #[error("chromosome key must be a multiple of 4 digits, got {0}")]
    ChromosomeLength(usize),
}

/// A game state whose available sets do not agree with its board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("piece value {0} is out of range")]
    InvalidPiece(u8),

    #[error("piece {0} is on the board and also listed as available")]
    PlacedPieceAvailable(u8),

    #[error("piece {0} appears more than once")]
    DuplicatePiece(u8),

    #[error("position {0} is occupied but listed as available")]
    OccupiedPositionAvailable(u8),

    #[error("position {0} is empty but not listed as available")]
    EmptyPositionMissing(u8),

    #[error("piece accounting does not sum to 16 (available {available}, placed {placed}, pending {pending})")]
    PieceCount {
        available: usize,
        placed: usize,
        pending: usize,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Why a move was rejected. `Ok(())` from move application means "applied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("index {0} is out of range")]
    OutOfRange(u8),

    #[error("position {0} is not available")]
    PositionUnavailable(u8),

    #[error("piece {0} is not available")]
    PieceUnavailable(u8),

    #[error("a next piece must be handed over while pieces remain")]
    MissingNextPiece,

    #[error("no piece is pending placement")]
    NoPendingPiece,

    #[error("the opening piece has already been handed over")]
    OpeningAlreadyMade,

    #[error("the game is already over")]
    GameOver,
}

/// Errors raised by a persisted transposition store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read transposition table {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse transposition table {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::OutOfRange {
            offset: 4,
            value: 42,
        };
        assert_eq!(err.to_string(), "field value 42 at offset 4 exceeds 16");
    }

    #[test]
    fn test_move_error_display() {
        assert_eq!(
            MoveError::PositionUnavailable(3).to_string(),
            "position 3 is not available"
        );
        assert_eq!(MoveError::OutOfRange(17).to_string(), "index 17 is out of range");
    }

    #[test]
    fn test_state_error_display() {
        assert_eq!(
            StateError::InvalidPiece(20).to_string(),
            "piece value 20 is out of range"
        );
    }

    #[test]
    fn test_state_error_wraps_codec() {
        let err: StateError = CodecError::Length(5).into();
        assert_eq!(err.to_string(), "board key must be 32 or 34 digits, got 5");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("negamax.depth must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: negamax.depth must be >= 1"
        );
    }
}
