//! Error types for board/FEN validation and PGN scanning/parsing.

/// Errors that occur when parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// The FEN string does not have exactly 6 space-separated fields.
    #[error("expected 6 FEN fields, found {found}")]
    WrongFieldCount {
        /// Number of fields found.
        found: usize,
    },
    /// The piece placement section does not have exactly 8 ranks.
    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount {
        /// Number of ranks found.
        found: usize,
    },
    /// A rank in the piece placement describes more or fewer than 8 squares.
    #[error("rank {rank_index} describes {length} squares, expected 8")]
    BadRankLength {
        /// Zero-based rank index (0 = rank 8 in FEN, 7 = rank 1).
        rank_index: usize,
        /// Number of squares described.
        length: usize,
    },
    /// An unrecognized character appeared in the piece placement.
    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar {
        /// The invalid character.
        character: char,
    },
    /// The active color field is not "w" or "b".
    #[error("invalid active color: \"{found}\"")]
    InvalidColor {
        /// The invalid color string.
        found: String,
    },
    /// An unrecognized character appeared in the castling rights field.
    #[error("invalid castling character: '{character}'")]
    InvalidCastlingChar {
        /// The invalid character.
        character: char,
    },
    /// The en passant field is not "-" or a valid algebraic square.
    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant {
        /// The invalid en passant string.
        found: String,
    },
    /// A move counter (halfmove clock or fullmove number) is not a valid number.
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter {
        /// The field name ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The invalid string.
        found: String,
    },
    /// The parsed board fails structural validation.
    #[error("invalid board: {source}")]
    InvalidBoard {
        #[from]
        /// The underlying board validation error.
        source: BoardError,
    },
}

/// Errors from structural validation of a [`Board`](crate::board::Board).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A side does not have exactly one king.
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount {
        /// Which side has the wrong king count.
        color: &'static str,
        /// Number of kings found.
        count: u32,
    },
    /// Pawns occupy the first or eighth rank.
    #[error("pawns found on back rank")]
    PawnsOnBackRank,
    /// Two different piece kinds claim the same square.
    #[error("overlapping piece bitboards")]
    OverlappingPieces,
    /// The occupied bitboard does not equal the union of both sides.
    #[error("occupied bitboard is inconsistent with side bitboards")]
    InconsistentOccupied,
    /// The two side bitboards overlap.
    #[error("white and black side bitboards overlap")]
    InconsistentSides,
}

/// Unified error type for scanning, parsing, and playing a PGN stream.
///
/// Carries no line number of its own — [`crate::reader::LineError`] wraps one
/// of these with the line the scanner was on when it was raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PgnError {
    /// The scanner encountered a byte it could not classify as the start of any token.
    #[error("unrecognized character: '{character}'")]
    BadCharacter {
        /// The offending character.
        character: char,
    },
    /// A tag pair was malformed (missing key, unterminated value, etc).
    #[error("malformed tag pair: {reason}")]
    BadPgnTag {
        /// Human-readable description of what was wrong.
        reason: String,
    },
    /// A move-number indicator (e.g. `5.` or `5...`) disagreed with the board's actual ply.
    #[error("move number {found} does not match current ply (expected {expected})")]
    UnexpectedMoveNum {
        /// The move number the PGN text stated.
        found: u32,
        /// The move number implied by the board's current ply.
        expected: u32,
    },
    /// The parser encountered a token that is not valid at the current grammar position.
    #[error("unexpected token: {token}")]
    UnexpectedToken {
        /// Debug text for the offending token.
        token: String,
    },
    /// A FEN-setup tag or board load failed.
    #[error(transparent)]
    BadFen(#[from] FenError),
    /// The SAN text does not resolve to any legal move on the current board.
    #[error("illegal move: {san}")]
    IllegalMove {
        /// The SAN text that could not be resolved.
        san: String,
    },
    /// The SAN text resolves to more than one legal move on the current board.
    #[error("ambiguous move: {san}")]
    AmbiguousMove {
        /// The SAN text that matched more than one legal move.
        san: String,
    },
    /// Reserved for recognized-but-unsupported input.
    #[error("unimplemented: {feature}")]
    Unimplemented {
        /// What feature was requested.
        feature: &'static str,
    },
    /// An invariant the library cannot explain was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{BoardError, FenError, PgnError};

    #[test]
    fn fen_error_display() {
        let err = FenError::WrongFieldCount { found: 4 };
        assert_eq!(format!("{err}"), "expected 6 FEN fields, found 4");
    }

    #[test]
    fn board_error_display() {
        let err = BoardError::PawnsOnBackRank;
        assert_eq!(format!("{err}"), "pawns found on back rank");
    }

    #[test]
    fn fen_error_from_board_error() {
        let board_err = BoardError::OverlappingPieces;
        let fen_err: FenError = board_err.into();
        assert!(matches!(fen_err, FenError::InvalidBoard { .. }));
    }

    #[test]
    fn pgn_error_wraps_fen_error() {
        let fen_err = FenError::WrongFieldCount { found: 3 };
        let pgn_err: PgnError = fen_err.into();
        assert!(format!("{pgn_err}").contains("expected 6 FEN fields"));
    }

    #[test]
    fn pgn_error_display_variants() {
        assert_eq!(
            format!("{}", PgnError::IllegalMove { san: "e9e9".to_string() }),
            "illegal move: e9e9"
        );
        assert_eq!(
            format!("{}", PgnError::AmbiguousMove { san: "Nbd2".to_string() }),
            "ambiguous move: Nbd2"
        );
    }
}
