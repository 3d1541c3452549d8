//! Sliding piece (bishop, rook, queen) move generation.

use crate::attacks::{bishop_attacks, line, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::MoveSink;
use super::check::CheckType;

/// Generate legal slider moves (bishops, rooks, queens). Returns `false` if
/// `sink` asked to stop early.
pub(super) fn gen_sliders<T: CheckType>(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    check_mask: Bitboard,
    sink: &mut impl MoveSink,
) -> bool {
    let us = board.side_to_move();
    let friendly = board.side(us);
    let occupied = board.occupied();

    if !gen_slider_type(board, king_sq, pinned, check_mask, sink, friendly, occupied, PieceKind::Bishop, bishop_attacks) {
        return false;
    }
    if !gen_slider_type(board, king_sq, pinned, check_mask, sink, friendly, occupied, PieceKind::Rook, rook_attacks) {
        return false;
    }
    gen_slider_type(
        board,
        king_sq,
        pinned,
        check_mask,
        sink,
        friendly,
        occupied,
        PieceKind::Queen,
        |sq, occ| rook_attacks(sq, occ) | bishop_attacks(sq, occ),
    )
}

#[allow(clippy::too_many_arguments)]
fn gen_slider_type(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    check_mask: Bitboard,
    sink: &mut impl MoveSink,
    friendly: Bitboard,
    occupied: Bitboard,
    kind: PieceKind,
    attacks_fn: impl Fn(Square, Bitboard) -> Bitboard,
) -> bool {
    let us = board.side_to_move();
    let mut pieces = board.pieces(kind) & board.side(us);

    while let Some((src, rest)) = pieces.pop_lsb() {
        pieces = rest;
        let mut targets = attacks_fn(src, occupied) & !friendly & check_mask;

        // Pinned sliders can only move along the pin ray
        if pinned.contains(src) {
            targets &= line(king_sq, src);
        }

        while let Some((dst, rest2)) = targets.pop_lsb() {
            targets = rest2;
            let capture = board.is_occupied(dst);
            if !sink.accept(Move::new(src, dst, kind, capture)) {
                return false;
            }
        }
    }

    true
}
