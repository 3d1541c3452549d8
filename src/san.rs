//! Standard Algebraic Notation rendering.

use crate::board::Board;
use crate::chess_move::Move;
use crate::error::PgnError;
use crate::movegen::{generate_legal_moves, has_legal_move};
use crate::piece_kind::PieceKind;
use crate::square::Square;

fn piece_letter(kind: PieceKind) -> char {
    match kind {
        PieceKind::Knight => 'N',
        PieceKind::Bishop => 'B',
        PieceKind::Rook => 'R',
        PieceKind::Queen => 'Q',
        PieceKind::King => 'K',
        PieceKind::Pawn => unreachable!("pawn moves never carry a piece letter"),
    }
}

fn file_char(sq: Square) -> char {
    (b'a' + sq.file().index() as u8) as char
}

fn rank_char(sq: Square) -> char {
    (b'1' + sq.rank().index() as u8) as char
}

/// Candidates that share `mv`'s piece kind and destination, used to work out
/// how much of the source square SAN disambiguation needs to print.
fn other_candidates(board: &Board, mv: Move, kind: PieceKind) -> Vec<Move> {
    generate_legal_moves(board)
        .as_slice()
        .iter()
        .filter(|&&cand| {
            cand != mv
                && cand.dest() == mv.dest()
                && board.piece_on(cand.source()) == Some(kind)
        })
        .copied()
        .collect()
}

/// Render `mv` (which must be legal on `board`) as SAN, without mutating `board`.
///
/// Disambiguation and the check/mate suffix both require knowing which piece
/// is moving and what the position looks like after the move, so this is the
/// building block both [`Board::to_san`] and [`Board::move_to_san_and_play`]
/// share.
fn render(board: &Board, mv: Move) -> String {
    let mut san = String::with_capacity(7);

    if mv.is_castle() {
        san.push_str(if mv.is_short_castle() { "O-O" } else { "O-O-O" });
    } else {
        let moving_kind = board
            .piece_on(mv.source())
            .expect("move source must hold a piece");
        let is_capture = mv.is_en_passant() || board.is_occupied(mv.dest());

        if moving_kind == PieceKind::Pawn {
            if is_capture {
                san.push(file_char(mv.source()));
                san.push('x');
            }
            san.push_str(&mv.dest().to_string());
            if mv.is_promotion() {
                san.push('=');
                san.push(mv.promotion_piece().letter());
            }
        } else {
            san.push(piece_letter(moving_kind));

            let rivals = other_candidates(board, mv, moving_kind);
            if !rivals.is_empty() {
                let same_file = rivals.iter().any(|c| c.source().file() == mv.source().file());
                let same_rank = rivals.iter().any(|c| c.source().rank() == mv.source().rank());
                if !same_file {
                    san.push(file_char(mv.source()));
                } else if !same_rank {
                    san.push(rank_char(mv.source()));
                } else {
                    san.push(file_char(mv.source()));
                    san.push(rank_char(mv.source()));
                }
            }

            if is_capture {
                san.push('x');
            }
            san.push_str(&mv.dest().to_string());
        }
    }

    let mut after = *board;
    after.do_move(mv);
    if after.in_check() {
        san.push(if has_legal_move(&after) { '+' } else { '#' });
    }

    san
}

impl Board {
    /// Render `mv` as SAN without applying it.
    ///
    /// Caller is responsible for ensuring `mv` is one of [`crate::generate_legal_moves`]`(self)`;
    /// passing a move this board cannot legally make produces nonsense text
    /// rather than an error, since this function never re-validates legality.
    pub fn to_san(&self, mv: Move) -> String {
        render(self, mv)
    }

    /// Render `mv` as SAN and apply it to `self`.
    ///
    /// Unlike [`Board::to_san`], this validates that `mv` is actually legal
    /// on the current position first.
    pub fn move_to_san_and_play(&mut self, mv: Move) -> Result<String, PgnError> {
        if mv.is_illegal() || !generate_legal_moves(self).as_slice().contains(&mv) {
            return Err(PgnError::IllegalMove {
                san: format!("{mv}"),
            });
        }
        let san = render(self, mv);
        self.do_move(mv);
        Ok(san)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::generate_legal_moves;
    use crate::square::Square;

    fn find_move(board: &Board, src: Square, dst: Square) -> Move {
        generate_legal_moves(board)
            .as_slice()
            .iter()
            .find(|m| m.source() == src && m.dest() == dst)
            .copied()
            .unwrap_or_else(|| panic!("no legal move {src}{dst}"))
    }

    #[test]
    fn pawn_push_san() {
        let board = Board::starting_position();
        let mv = find_move(&board, Square::E2, Square::E4);
        assert_eq!(board.to_san(mv), "e4");
    }

    #[test]
    fn knight_develop_san() {
        let board = Board::starting_position();
        let mv = find_move(&board, Square::G1, Square::F3);
        assert_eq!(board.to_san(mv), "Nf3");
    }

    #[test]
    fn capture_uses_x() {
        let board: Board = "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, Square::E4, Square::D5);
        assert_eq!(board.to_san(mv), "exd5");
    }

    #[test]
    fn promotion_suffix() {
        let board: Board = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&board);
        let mv = moves
            .as_slice()
            .iter()
            .find(|m| m.is_promotion() && m.promotion_piece().letter() == 'Q')
            .copied()
            .unwrap();
        assert_eq!(board.to_san(mv), "a8=Q");
    }

    #[test]
    fn castling_san() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&board);
        let short = moves.as_slice().iter().find(|m| m.is_short_castle()).copied().unwrap();
        let long = moves.as_slice().iter().find(|m| m.is_long_castle()).copied().unwrap();
        assert_eq!(board.to_san(short), "O-O");
        assert_eq!(board.to_san(long), "O-O-O");
    }

    #[test]
    fn disambiguation_by_file() {
        // Knights on b1 and f1 both reach d2.
        let board: Board = "4k3/8/8/8/8/8/8/1N2K1N1 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, Square::B1, Square::D2);
        assert_eq!(board.to_san(mv), "Nbd2");
    }

    #[test]
    fn disambiguation_by_rank() {
        let board: Board = "4k3/8/8/8/8/7N/8/4K2N w - - 0 1".parse().unwrap();
        let mv = find_move(&board, Square::H1, Square::F2);
        assert_eq!(board.to_san(mv), "N1f2");
    }

    #[test]
    fn check_suffix() {
        let board: Board = "4k3/8/8/8/R7/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, Square::A4, Square::E4);
        assert_eq!(board.to_san(mv), "Re4+");
    }

    #[test]
    fn checkmate_suffix() {
        // Black king boxed in by its own pawns; queen delivers back-rank mate.
        let board: Board = "6k1/5ppp/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let mv = find_move(&board, Square::D1, Square::D8);
        assert_eq!(board.to_san(mv), "Qd8#");
    }

    #[test]
    fn move_to_san_and_play_rejects_illegal() {
        let mut board = Board::starting_position();
        let bogus = Move::new(Square::E2, Square::E5, PieceKind::Pawn, false);
        assert!(matches!(
            board.move_to_san_and_play(bogus),
            Err(PgnError::IllegalMove { .. })
        ));
    }

    #[test]
    fn move_to_san_and_play_applies_move() {
        let mut board = Board::starting_position();
        let mv = find_move(&board, Square::E2, Square::E4);
        let san = board.move_to_san_and_play(mv).unwrap();
        assert_eq!(san, "e4");
        assert_eq!(board.piece_on(Square::E4), Some(PieceKind::Pawn));
        assert_eq!(board.piece_on(Square::E2), None);
    }
}
