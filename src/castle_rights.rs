//! Castling rights as castling-rook squares, supporting Chess960/Shredder-FEN.
//!
//! Rather than four boolean flags, rights are stored as the actual square of
//! each castling-eligible rook. This is what lets the move generator and FEN
//! loader treat standard chess as the special case of Chess960 where the
//! rooks always start on the `a`/`h` files.

use std::fmt;

use crate::color::Color;
use crate::error::FenError;
use crate::square::Square;

/// Which side of the board to castle toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

const fn slot(color: Color, side: CastleSide) -> usize {
    match (color, side) {
        (Color::White, CastleSide::QueenSide) => 0,
        (Color::White, CastleSide::KingSide) => 1,
        (Color::Black, CastleSide::QueenSide) => 2,
        (Color::Black, CastleSide::KingSide) => 3,
    }
}

/// Castling rights: the starting square of each side's king, plus the
/// square of each castling-eligible rook (`None` once castling that way is
/// no longer possible).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    king_start: [Square; 2],
    rooks: [Option<Square>; 4],
}

impl CastlingRights {
    /// No castling rights at all, with kings starting on the standard `e1`/`e8` squares.
    pub const NONE: CastlingRights = CastlingRights {
        king_start: [Square::E1, Square::E8],
        rooks: [None; 4],
    };

    /// Build castling rights for a non-Chess960 setup (kings on `e1`/`e8`,
    /// rooks on `a1`/`h1`/`a8`/`h8`) with the requested rights present.
    pub const fn standard(white_king: bool, white_queen: bool, black_king: bool, black_queen: bool) -> CastlingRights {
        CastlingRights {
            king_start: [Square::E1, Square::E8],
            rooks: [
                if white_queen { Some(Square::A1) } else { None },
                if white_king { Some(Square::H1) } else { None },
                if black_queen { Some(Square::A8) } else { None },
                if black_king { Some(Square::H8) } else { None },
            ],
        }
    }

    /// All four standard castling rights.
    pub const ALL: CastlingRights = CastlingRights::standard(true, true, true, true);

    /// Build Chess960-capable rights from explicit king-start squares and
    /// per-slot rook squares (`[white-queen, white-king, black-queen, black-king]`).
    pub const fn new(king_start: [Square; 2], rooks: [Option<Square>; 4]) -> CastlingRights {
        CastlingRights { king_start, rooks }
    }

    /// The square the king of `color` starts on.
    #[inline]
    pub const fn king_start(&self, color: Color) -> Square {
        self.king_start[color.index()]
    }

    /// The square of the castling rook for `color`/`side`, if that right still exists.
    #[inline]
    pub const fn rook_square(&self, color: Color, side: CastleSide) -> Option<Square> {
        self.rooks[slot(color, side)]
    }

    /// Return `true` if `color` can still castle `side`.
    #[inline]
    pub const fn has(&self, color: Color, side: CastleSide) -> bool {
        self.rook_square(color, side).is_some()
    }

    /// Return `true` if no castling rights remain.
    pub const fn is_empty(&self) -> bool {
        self.rooks[0].is_none() && self.rooks[1].is_none() && self.rooks[2].is_none() && self.rooks[3].is_none()
    }

    /// Return rights with the given rook square set (replacing whatever was there).
    pub const fn with_rook(mut self, color: Color, side: CastleSide, rook: Square) -> CastlingRights {
        self.rooks[slot(color, side)] = Some(rook);
        self
    }

    /// Return rights with `color`'s king start square overridden (Chess960 setups).
    pub const fn with_king_start(mut self, color: Color, sq: Square) -> CastlingRights {
        self.king_start[color.index()] = sq;
        self
    }

    /// Remove both castling rights for `color` (the king moved).
    pub fn remove_color(mut self, color: Color) -> CastlingRights {
        let (q, k) = match color {
            Color::White => (0, 1),
            Color::Black => (2, 3),
        };
        self.rooks[q] = None;
        self.rooks[k] = None;
        self
    }

    /// Drop whichever castling right (if any) corresponds to a castling rook
    /// on `sq`. Called whenever `sq` is the source or destination of a move,
    /// since either a rook moving away or a rook being captured revokes it.
    pub fn revoke_rook_on(mut self, sq: Square) -> CastlingRights {
        for slot in self.rooks.iter_mut() {
            if *slot == Some(sq) {
                *slot = None;
            }
        }
        self
    }

    /// Parse the FEN/Shredder-FEN/X-FEN castling field given the actual
    /// board layout (needed to resolve `K`/`Q`/`k`/`q` to concrete rook
    /// squares, and to accept Chess960 file-letter rooks).
    pub fn from_fen_field(
        field: &str,
        king_start: [Square; 2],
        rook_files: [&[Square]; 2],
    ) -> Result<CastlingRights, FenError> {
        let mut rights = CastlingRights::new(king_start, [None; 4]);
        if field == "-" {
            return Ok(rights);
        }
        for c in field.chars() {
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let king_sq = king_start[color.index()];
            let rooks = rook_files[color.index()];
            let rook_sq = match c.to_ascii_uppercase() {
                'K' => rooks.iter().copied().filter(|r| r.index() > king_sq.index()).max_by_key(|r| r.index()),
                'Q' => rooks.iter().copied().filter(|r| r.index() < king_sq.index()).min_by_key(|r| r.index()),
                letter @ 'A'..='H' => {
                    let file = (letter as u8) - b'A';
                    rooks.iter().copied().find(|r| r.file().index() as u8 == file)
                }
                _ => return Err(FenError::InvalidCastlingChar { character: c }),
            };
            let Some(rook_sq) = rook_sq else {
                return Err(FenError::InvalidCastlingChar { character: c });
            };
            let side = if rook_sq.index() > king_sq.index() { CastleSide::KingSide } else { CastleSide::QueenSide };
            rights = rights.with_rook(color, side, rook_sq);
        }
        Ok(rights)
    }

    /// Serialize to a FEN castling field. Uses the classical `KQkq` letters
    /// when every right matches a standard (`e1/e8` king, `a`/`h`-file rook)
    /// layout; otherwise falls back to Shredder-FEN file letters.
    pub fn to_fen(&self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let is_standard = self.king_start[0] == Square::E1
            && self.king_start[1] == Square::E8
            && matches!(self.rooks[0], None | Some(Square::A1))
            && matches!(self.rooks[1], None | Some(Square::H1))
            && matches!(self.rooks[2], None | Some(Square::A8))
            && matches!(self.rooks[3], None | Some(Square::H8));

        if is_standard {
            let mut s = String::with_capacity(4);
            if self.rooks[1].is_some() {
                s.push('K');
            }
            if self.rooks[0].is_some() {
                s.push('Q');
            }
            if self.rooks[3].is_some() {
                s.push('k');
            }
            if self.rooks[2].is_some() {
                s.push('q');
            }
            return s;
        }

        let mut s = String::with_capacity(4);
        for &(color, side) in &[
            (Color::White, CastleSide::KingSide),
            (Color::White, CastleSide::QueenSide),
            (Color::Black, CastleSide::KingSide),
            (Color::Black, CastleSide::QueenSide),
        ] {
            if let Some(rook) = self.rook_square(color, side) {
                let letter = (b'A' + rook.file().index() as u8) as char;
                s.push(if color == Color::White { letter } else { letter.to_ascii_lowercase() });
            }
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastlingRights({})", self.to_fen())
    }
}
