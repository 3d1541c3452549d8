//! King move and castling generation.

use crate::attacks::{between, king_attacks};
use crate::board::Board;
use crate::castle_rights::CastleSide;
use crate::chess_move::Move;
use crate::file::File;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::MoveSink;
use super::is_attacked;

/// Generate legal king moves (normal moves + castling). Returns `false` if
/// `sink` asked to stop early.
pub(super) fn gen_king(board: &Board, king_sq: Square, sink: &mut impl MoveSink) -> bool {
    let us = board.side_to_move();
    let them = us.flip();
    let friendly = board.side(us);
    // Remove king from occupied so sliding pieces "see through" the king when
    // checking destination safety (prevents the king from blocking its own retreat).
    let occupied_no_king = board.occupied() ^ king_sq.bitboard();

    // Normal king moves
    let mut targets = king_attacks(king_sq) & !friendly;
    while let Some((dst, rest)) = targets.pop_lsb() {
        targets = rest;
        if !is_attacked(board, dst, them, occupied_no_king) {
            let capture = board.is_occupied(dst);
            if !sink.accept(Move::new(king_sq, dst, PieceKind::King, capture)) {
                return false;
            }
        }
    }

    // Castling — only when not currently in check
    if is_attacked(board, king_sq, them, board.occupied()) {
        return true;
    }

    let castling = board.castling();
    let rank = king_sq.rank();

    for side in [CastleSide::KingSide, CastleSide::QueenSide] {
        let Some(rook_sq) = castling.rook_square(us, side) else {
            continue;
        };
        let (king_dest_file, rook_dest_file) = match side {
            CastleSide::KingSide => (File::FileG, File::FileF),
            CastleSide::QueenSide => (File::FileC, File::FileD),
        };
        let king_dest = Square::new(rank, king_dest_file);
        let rook_dest = Square::new(rank, rook_dest_file);

        // Every square the king or rook needs to occupy along the way must be
        // empty, except for the squares the king and rook themselves already
        // stand on.
        let mut required_empty = between(king_sq, king_dest)
            | king_dest.bitboard()
            | between(rook_sq, rook_dest)
            | rook_dest.bitboard();
        required_empty &= !king_sq.bitboard();
        required_empty &= !rook_sq.bitboard();
        if (required_empty & board.occupied()).is_nonempty() {
            continue;
        }

        // The king must not pass through or land on an attacked square.
        let king_path = between(king_sq, king_dest) | king_dest.bitboard();
        let king_travels_through_check = {
            let mut path = king_path;
            let mut blocked = false;
            while let Some((sq, rest)) = path.pop_lsb() {
                path = rest;
                if is_attacked(board, sq, them, board.occupied()) {
                    blocked = true;
                    break;
                }
            }
            blocked
        };
        if king_travels_through_check {
            continue;
        }

        let mv = match side {
            CastleSide::KingSide => Move::new_short_castle(king_sq, rook_sq),
            CastleSide::QueenSide => Move::new_long_castle(king_sq, rook_sq),
        };
        if !sink.accept(mv) {
            return false;
        }
    }

    true
}
