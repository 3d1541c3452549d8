//! FEN string parsing and serialization for [`Board`].

use std::str::FromStr;
use std::fmt;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castle_rights::CastlingRights;
use crate::color::Color;
use crate::error::FenError;
use crate::file::File;
use crate::piece_kind::PieceKind;
use crate::rank::Rank;
use crate::square::Square;

/// A FEN fullmove number above this is almost certainly a malformed input
/// rather than a real game (standard FEN practice caps it far below this).
const MAX_FULLMOVE_NUMBER: u32 = 99_999;

/// The FEN string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Board, FenError> {
        let _span = tracing::trace_span!("fen::parse", fen).entered();
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount {
                found: fields.len(),
            });
        }

        // Parse piece placement
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount {
                found: ranks.len(),
            });
        }

        let mut pieces = [Bitboard::EMPTY; PieceKind::COUNT];
        let mut sides = [Bitboard::EMPTY; Color::COUNT];

        for (rank_index, rank_str) in ranks.iter().enumerate() {
            // FEN ranks go from 8 to 1 (top to bottom)
            let rank = Rank::from_index(7 - rank_index as u8).unwrap();
            let mut file_index: u8 = 0;

            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(FenError::InvalidPieceChar { character: c });
                    }
                    file_index += digit as u8;
                } else {
                    let kind = PieceKind::from_fen_char(c).ok_or(FenError::InvalidPieceChar {
                        character: c,
                    })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };

                    if file_index >= 8 {
                        return Err(FenError::BadRankLength {
                            rank_index,
                            length: file_index as usize + 1,
                        });
                    }

                    let file = File::from_index(file_index).unwrap();
                    let sq = Square::new(rank, file);
                    let bb = sq.bitboard();

                    pieces[kind.index()] = pieces[kind.index()] | bb;
                    sides[color.index()] = sides[color.index()] | bb;
                    file_index += 1;
                }
            }

            if file_index != 8 {
                return Err(FenError::BadRankLength {
                    rank_index,
                    length: file_index as usize,
                });
            }
        }

        let occupied = sides[Color::White.index()] | sides[Color::Black.index()];

        // Parse active color
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidColor {
                    found: other.to_string(),
                })
            }
        };

        // Parse castling rights: resolve K/Q/k/q (or Shredder-FEN file letters)
        // against the king and rook squares actually present on the board.
        let white_king = (pieces[PieceKind::King.index()] & sides[Color::White.index()])
            .lsb()
            .unwrap_or(Square::E1);
        let black_king = (pieces[PieceKind::King.index()] & sides[Color::Black.index()])
            .lsb()
            .unwrap_or(Square::E8);
        let white_rooks: Vec<Square> = (pieces[PieceKind::Rook.index()] & sides[Color::White.index()]).collect();
        let black_rooks: Vec<Square> = (pieces[PieceKind::Rook.index()] & sides[Color::Black.index()]).collect();
        let castling = CastlingRights::from_fen_field(
            fields[2],
            [white_king, black_king],
            [&white_rooks, &black_rooks],
        )?;

        // Parse en passant
        let en_passant = if fields[3] == "-" {
            None
        } else {
            let sq = Square::from_algebraic(fields[3]).ok_or_else(|| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            // A target square is only meaningful if an enemy pawn could
            // actually recapture there; otherwise it is silently dropped.
            let capturing_pawns = pieces[PieceKind::Pawn.index()] & sides[side_to_move.index()];
            if en_passant_is_capturable(sq, side_to_move, capturing_pawns) {
                Some(sq)
            } else {
                None
            }
        };

        // Parse halfmove clock
        let halfmove_clock = fields[4].parse::<u16>().map_err(|_| FenError::InvalidMoveCounter {
            field: "halfmove clock",
            found: fields[4].to_string(),
        })?;

        // Parse fullmove number
        let fullmove_number = fields[5].parse::<u32>().map_err(|_| FenError::InvalidMoveCounter {
            field: "fullmove number",
            found: fields[5].to_string(),
        })?;
        if fullmove_number == 0 || fullmove_number > MAX_FULLMOVE_NUMBER {
            return Err(FenError::InvalidMoveCounter {
                field: "fullmove number",
                found: fields[5].to_string(),
            });
        }

        let board = Board::from_raw(
            pieces,
            sides,
            occupied,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        );

        board.validate()?;
        Ok(board)
    }
}

/// Return `true` if a pawn of `capturing_side` sits where it could legally
/// capture on `sq` en passant.
///
/// `capturing_side_pawns` is the bitboard of `capturing_side`'s pawns. Used
/// both to silently drop a stale FEN ep field and, from [`crate::do_move`],
/// to decide whether a double pawn push actually opens en passant.
pub(crate) fn en_passant_is_capturable(
    sq: Square,
    capturing_side: Color,
    capturing_side_pawns: Bitboard,
) -> bool {
    let (target_rank, capturing_rank) = match capturing_side {
        Color::White => (Rank::Rank6, Rank::Rank5),
        Color::Black => (Rank::Rank3, Rank::Rank4),
    };
    if sq.rank() != target_rank {
        return false;
    }
    let file = sq.file().index();
    [file.checked_sub(1), (file + 1 < 8).then_some(file + 1)]
        .into_iter()
        .flatten()
        .any(|f| {
            let candidate = Square::new(capturing_rank, File::from_index(f as u8).unwrap());
            capturing_side_pawns.contains(candidate)
        })
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Piece placement
        for rank_idx in (0u8..8).rev() {
            let rank = Rank::from_index(rank_idx).unwrap();
            let mut empty_count = 0u8;

            for file_idx in 0u8..8 {
                let file = File::from_index(file_idx).unwrap();
                let sq = Square::new(rank, file);

                match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(kind), Some(color)) => {
                        if empty_count > 0 {
                            write!(f, "{empty_count}")?;
                            empty_count = 0;
                        }
                        let c = match color {
                            Color::White => kind.fen_char().to_ascii_uppercase(),
                            Color::Black => kind.fen_char(),
                        };
                        write!(f, "{c}")?;
                    }
                    _ => {
                        empty_count += 1;
                    }
                }
            }

            if empty_count > 0 {
                write!(f, "{empty_count}")?;
            }

            if rank_idx > 0 {
                write!(f, "/")?;
            }
        }

        // Side to move
        write!(f, " {}", self.side_to_move())?;

        // Castling
        write!(f, " {}", self.castling())?;

        // En passant
        match self.en_passant() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }

        // Move counters
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}
