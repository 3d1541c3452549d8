//! Chess move representation, bit-packed into a u16.

use std::fmt;

use crate::piece_kind::PieceKind;
use crate::square::Square;

// Private bit-field constants. Layout: src(0..6) | kind(6..10) | dst(10..16).
const SRC_MASK: u16 = 0x003F;
const KIND_MASK: u16 = 0x03C0;
const DST_MASK: u16 = 0xFC00;
const KIND_SHIFT: u32 = 6;
const DST_SHIFT: u32 = 10;

/// The 4-bit move-type-and-promotion tag packed into bits 6..10.
///
/// Values 10-13 double as both "this move is a promotion" and "to which
/// piece"; a plain piece move never needs to distinguish capture from
/// quiet (the board's occupancy at `dest()` answers that at apply time) —
/// only pawn moves do, because SAN and the scanner need to know whether a
/// pawn moved straight or diagonally without consulting the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    PawnAdvance = 0,
    PawnCapture = 1,
    KnightMove = 2,
    BishopMove = 3,
    RookMove = 4,
    QueenMove = 5,
    KingMove = 6,
    EnPassant = 7,
    ShortCastle = 8,
    LongCastle = 9,
    PromoKnight = 10,
    PromoBishop = 11,
    PromoRook = 12,
    PromoQueen = 13,
    /// Sentinel: no legal move / more than one legal move matched a SAN token.
    /// Never produced by the move generator.
    Illegal = 15,
}

impl MoveKind {
    #[inline]
    const fn from_bits(bits: u16) -> MoveKind {
        match bits {
            0 => MoveKind::PawnAdvance,
            1 => MoveKind::PawnCapture,
            2 => MoveKind::KnightMove,
            3 => MoveKind::BishopMove,
            4 => MoveKind::RookMove,
            5 => MoveKind::QueenMove,
            6 => MoveKind::KingMove,
            7 => MoveKind::EnPassant,
            8 => MoveKind::ShortCastle,
            9 => MoveKind::LongCastle,
            10 => MoveKind::PromoKnight,
            11 => MoveKind::PromoBishop,
            12 => MoveKind::PromoRook,
            13 => MoveKind::PromoQueen,
            _ => MoveKind::Illegal,
        }
    }

    #[inline]
    const fn bits(self) -> u16 {
        (self as u16) << KIND_SHIFT
    }

    /// The non-pawn, non-king piece-move tag for `kind`, if one exists.
    const fn for_piece(kind: PieceKind) -> MoveKind {
        match kind {
            PieceKind::Knight => MoveKind::KnightMove,
            PieceKind::Bishop => MoveKind::BishopMove,
            PieceKind::Rook => MoveKind::RookMove,
            PieceKind::Queen => MoveKind::QueenMove,
            PieceKind::King => MoveKind::KingMove,
            PieceKind::Pawn => MoveKind::PawnAdvance,
        }
    }
}

/// The piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotionPiece {
    Knight = 0,
    Bishop = 1,
    Rook = 2,
    Queen = 3,
}

impl PromotionPiece {
    /// All promotion pieces in index order.
    pub const ALL: [PromotionPiece; 4] = [
        PromotionPiece::Knight,
        PromotionPiece::Bishop,
        PromotionPiece::Rook,
        PromotionPiece::Queen,
    ];

    /// Convert to the corresponding [`PieceKind`].
    pub const fn to_piece_kind(self) -> PieceKind {
        match self {
            PromotionPiece::Knight => PieceKind::Knight,
            PromotionPiece::Bishop => PieceKind::Bishop,
            PromotionPiece::Rook => PieceKind::Rook,
            PromotionPiece::Queen => PieceKind::Queen,
        }
    }

    /// Return the SAN/UCI character for this promotion (uppercase for SAN,
    /// lowercase for UCI-style debug output — callers pick the case).
    pub const fn letter(self) -> char {
        match self {
            PromotionPiece::Knight => 'N',
            PromotionPiece::Bishop => 'B',
            PromotionPiece::Rook => 'R',
            PromotionPiece::Queen => 'Q',
        }
    }

    const fn move_kind(self) -> MoveKind {
        match self {
            PromotionPiece::Knight => MoveKind::PromoKnight,
            PromotionPiece::Bishop => MoveKind::PromoBishop,
            PromotionPiece::Rook => MoveKind::PromoRook,
            PromotionPiece::Queen => MoveKind::PromoQueen,
        }
    }

    const fn from_move_kind(kind: MoveKind) -> PromotionPiece {
        match kind {
            MoveKind::PromoBishop => PromotionPiece::Bishop,
            MoveKind::PromoRook => PromotionPiece::Rook,
            MoveKind::PromoQueen => PromotionPiece::Queen,
            _ => PromotionPiece::Knight,
        }
    }
}

/// A legal (or sentinel) chess move encoded in 16 bits.
///
/// ```text
/// bits  0-5:  source square           (0-63)
/// bits  6-9:  move kind / promotion   (see MoveKind)
/// bits 10-15: destination square      (0-63)
/// ```
///
/// Castling moves encode `src = king's starting square`, `dst = the
/// castling rook's square` — this is the Chess960/Shredder-FEN-compatible
/// form: it identifies a unique castling move even when more than one rook
/// could otherwise be inferred from "the king moved two files".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// Sentinel meaning "no legal move exists" (used where a SAN token or
    /// lookup resolves to nothing).
    pub const ILLEGAL_NO_MOVE: Move = Move::pack(Square::A1, Square::H8, MoveKind::Illegal);

    /// Sentinel meaning "more than one legal move matched" (SAN was ambiguous).
    pub const ILLEGAL_AMBIGUOUS_MOVE: Move = Move::pack(Square::A2, Square::H8, MoveKind::Illegal);

    /// Kept for callers that just need an inert placeholder value (e.g. to
    /// fill a fixed-size array before any real move is generated).
    pub const NULL: Move = Move::ILLEGAL_NO_MOVE;

    #[inline]
    const fn pack(source: Square, dest: Square, kind: MoveKind) -> Move {
        Move((source.index() as u16) | kind.bits() | ((dest.index() as u16) << DST_SHIFT))
    }

    /// Create a regular (non-promotion, non-castle, non-en-passant) move of
    /// `piece`, which may or may not be a capture.
    ///
    /// For a pawn, `capture` selects between the advance and capture tags;
    /// for every other piece kind the tag doesn't vary with `capture` (the
    /// board's occupancy at `dest` is authoritative for those).
    pub const fn new(source: Square, dest: Square, piece: PieceKind, capture: bool) -> Move {
        let kind = match piece {
            PieceKind::Pawn if capture => MoveKind::PawnCapture,
            _ => MoveKind::for_piece(piece),
        };
        Move::pack(source, dest, kind)
    }

    /// Create a promotion move (with or without capture — not distinguished
    /// by the encoding; see [`MoveKind`]).
    pub const fn new_promotion(source: Square, dest: Square, promo: PromotionPiece) -> Move {
        Move::pack(source, dest, promo.move_kind())
    }

    /// Create an en passant capture.
    pub const fn new_en_passant(source: Square, dest: Square) -> Move {
        Move::pack(source, dest, MoveKind::EnPassant)
    }

    /// Create a short (kingside) castling move. `rook_square` is the square
    /// of the castling rook, which under Chess960 need not be `h1`/`h8`.
    pub const fn new_short_castle(king_start: Square, rook_square: Square) -> Move {
        Move::pack(king_start, rook_square, MoveKind::ShortCastle)
    }

    /// Create a long (queenside) castling move. `rook_square` is the square
    /// of the castling rook, which under Chess960 need not be `a1`/`a8`.
    pub const fn new_long_castle(king_start: Square, rook_square: Square) -> Move {
        Move::pack(king_start, rook_square, MoveKind::LongCastle)
    }

    /// Extract the source square (for castling: the king's starting square).
    pub const fn source(self) -> Square {
        Square::from_index_unchecked((self.0 & SRC_MASK) as u8)
    }

    /// Extract the destination square (for castling: the castling rook's square).
    pub const fn dest(self) -> Square {
        Square::from_index_unchecked(((self.0 & DST_MASK) >> DST_SHIFT) as u8)
    }

    /// Extract the move kind tag.
    pub const fn kind(self) -> MoveKind {
        MoveKind::from_bits((self.0 & KIND_MASK) >> KIND_SHIFT)
    }

    /// Extract the promotion piece.
    ///
    /// Only meaningful when [`Move::is_promotion`] is `true`.
    pub const fn promotion_piece(self) -> PromotionPiece {
        PromotionPiece::from_move_kind(self.kind())
    }

    /// Return `true` if either illegal-move sentinel.
    pub const fn is_illegal(self) -> bool {
        matches!(self.kind(), MoveKind::Illegal)
    }

    /// Return `true` if this is a promotion move.
    pub const fn is_promotion(self) -> bool {
        matches!(
            self.kind(),
            MoveKind::PromoKnight | MoveKind::PromoBishop | MoveKind::PromoRook | MoveKind::PromoQueen
        )
    }

    /// Return `true` if this is an en passant capture.
    pub const fn is_en_passant(self) -> bool {
        matches!(self.kind(), MoveKind::EnPassant)
    }

    /// Return `true` if this is a castling move (either side).
    pub const fn is_castle(self) -> bool {
        matches!(self.kind(), MoveKind::ShortCastle | MoveKind::LongCastle)
    }

    /// Return `true` if this is a short (kingside) castle.
    pub const fn is_short_castle(self) -> bool {
        matches!(self.kind(), MoveKind::ShortCastle)
    }

    /// Return `true` if this is a long (queenside) castle.
    pub const fn is_long_castle(self) -> bool {
        matches!(self.kind(), MoveKind::LongCastle)
    }

    /// Return `true` if the encoding marks this as a pawn move (advance or capture).
    pub const fn is_pawn_move(self) -> bool {
        matches!(self.kind(), MoveKind::PawnAdvance | MoveKind::PawnCapture)
    }

    /// Return the raw u16 bit representation.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Create a move from a raw u16 bit representation.
    #[inline]
    pub const fn from_raw(bits: u16) -> Move {
        Move(bits)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_illegal() {
            return write!(f, "(illegal)");
        }
        write!(f, "{}{}", self.source(), self.dest())?;
        if self.is_promotion() {
            write!(f, "={}", self.promotion_piece().letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} kind={:?})", self, self.kind())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{Move, MoveKind, PromotionPiece};
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    #[test]
    fn size_of_move() {
        assert_eq!(std::mem::size_of::<Move>(), 2);
    }

    #[test]
    fn normal_move_roundtrip() {
        let mv = Move::new(Square::E2, Square::E4, PieceKind::Pawn, false);
        assert_eq!(mv.source(), Square::E2);
        assert_eq!(mv.dest(), Square::E4);
        assert_eq!(mv.kind(), MoveKind::PawnAdvance);
        assert!(mv.is_pawn_move());
        assert!(!mv.is_promotion());
        assert!(!mv.is_en_passant());
        assert!(!mv.is_castle());
        assert!(!mv.is_illegal());
    }

    #[test]
    fn pawn_capture_tag() {
        let mv = Move::new(Square::E4, Square::D5, PieceKind::Pawn, true);
        assert_eq!(mv.kind(), MoveKind::PawnCapture);
    }

    #[test]
    fn piece_move_tag_independent_of_capture() {
        let quiet = Move::new(Square::G1, Square::F3, PieceKind::Knight, false);
        let capture = Move::new(Square::G1, Square::F3, PieceKind::Knight, true);
        assert_eq!(quiet.kind(), MoveKind::KnightMove);
        assert_eq!(quiet, capture);
    }

    #[test]
    fn edge_squares() {
        let mv1 = Move::new(Square::A1, Square::H8, PieceKind::Queen, false);
        assert_eq!(mv1.source(), Square::A1);
        assert_eq!(mv1.dest(), Square::H8);

        let mv2 = Move::new(Square::H1, Square::A8, PieceKind::Queen, true);
        assert_eq!(mv2.source(), Square::H1);
        assert_eq!(mv2.dest(), Square::A8);
    }

    #[test]
    fn promotion_all_pieces() {
        for promo in PromotionPiece::ALL {
            let mv = Move::new_promotion(Square::E7, Square::E8, promo);
            assert_eq!(mv.source(), Square::E7);
            assert_eq!(mv.dest(), Square::E8);
            assert_eq!(mv.promotion_piece(), promo);
            assert!(mv.is_promotion());
        }
    }

    #[test]
    fn en_passant_roundtrip() {
        let mv = Move::new_en_passant(Square::E5, Square::D6);
        assert_eq!(mv.source(), Square::E5);
        assert_eq!(mv.dest(), Square::D6);
        assert_eq!(mv.kind(), MoveKind::EnPassant);
        assert!(mv.is_en_passant());
        assert!(!mv.is_promotion());
        assert!(!mv.is_castle());
        assert!(!mv.is_illegal());
    }

    #[test]
    fn castling_chess960_rook_square() {
        // king on e1, short-castle rook sitting on h1 in a non-standard setup.
        let mv = Move::new_short_castle(Square::E1, Square::H1);
        assert_eq!(mv.source(), Square::E1);
        assert_eq!(mv.dest(), Square::H1);
        assert!(mv.is_castle());
        assert!(mv.is_short_castle());
        assert!(!mv.is_long_castle());

        let mv2 = Move::new_long_castle(Square::E8, Square::A8);
        assert!(mv2.is_long_castle());
        assert!(!mv2.is_short_castle());
    }

    #[test]
    fn illegal_sentinels_collapse_under_threshold() {
        assert!(Move::ILLEGAL_NO_MOVE.is_illegal());
        assert!(Move::ILLEGAL_AMBIGUOUS_MOVE.is_illegal());
        assert_eq!(Move::ILLEGAL_NO_MOVE.source(), Square::A1);
        assert_eq!(Move::ILLEGAL_AMBIGUOUS_MOVE.source(), Square::A2);
        assert!(Move::ILLEGAL_NO_MOVE.raw() >= 0xFFC0);
        assert!(Move::ILLEGAL_AMBIGUOUS_MOVE.raw() >= 0xFFC0);
        assert_ne!(Move::ILLEGAL_NO_MOVE, Move::ILLEGAL_AMBIGUOUS_MOVE);
    }

    #[test]
    fn null_alias_is_illegal_no_move() {
        assert_eq!(Move::NULL, Move::ILLEGAL_NO_MOVE);
    }

    #[test]
    fn display_normal_and_promotion() {
        let mv = Move::new(Square::D2, Square::D4, PieceKind::Pawn, false);
        assert_eq!(format!("{mv}"), "d2d4");
        let promo = Move::new_promotion(Square::E7, Square::E8, PromotionPiece::Queen);
        assert_eq!(format!("{promo}"), "e7e8=Q");
    }

    #[test]
    fn display_illegal() {
        assert_eq!(format!("{}", Move::ILLEGAL_NO_MOVE), "(illegal)");
    }

    #[test]
    fn debug_contains_kind() {
        let mv = Move::new(Square::D2, Square::D4, PieceKind::Pawn, false);
        let debug_str = format!("{:?}", mv);
        assert!(debug_str.contains("d2d4"));
        assert!(debug_str.contains("PawnAdvance"));
    }

    #[test]
    fn equality_and_hash() {
        let mv1 = Move::new(Square::E2, Square::E4, PieceKind::Pawn, false);
        let mv2 = Move::new(Square::E2, Square::E4, PieceKind::Pawn, false);
        let mv3 = Move::new(Square::D2, Square::D4, PieceKind::Pawn, false);

        assert_eq!(mv1, mv2);
        assert_ne!(mv1, mv3);

        let mut set = HashSet::new();
        set.insert(mv1);
        set.insert(mv2);
        assert_eq!(set.len(), 1);
        set.insert(mv3);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn promotion_piece_to_piece_kind() {
        assert_eq!(PromotionPiece::Knight.to_piece_kind(), PieceKind::Knight);
        assert_eq!(PromotionPiece::Bishop.to_piece_kind(), PieceKind::Bishop);
        assert_eq!(PromotionPiece::Rook.to_piece_kind(), PieceKind::Rook);
        assert_eq!(PromotionPiece::Queen.to_piece_kind(), PieceKind::Queen);
    }

    #[test]
    fn exhaustive_normal_roundtrip() {
        for src in 0u8..64 {
            for dst in 0u8..64 {
                let src_sq = Square::from_index(src).unwrap();
                let dst_sq = Square::from_index(dst).unwrap();
                let mv = Move::new(src_sq, dst_sq, PieceKind::Queen, false);
                assert_eq!(mv.source(), src_sq, "source mismatch for {src}→{dst}");
                assert_eq!(mv.dest(), dst_sq, "dest mismatch for {src}→{dst}");
                assert_eq!(mv.kind(), MoveKind::QueenMove, "kind mismatch for {src}→{dst}");
            }
        }
    }
}
