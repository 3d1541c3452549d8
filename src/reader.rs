//! Drives the parser over a full PGN stream: resolves SAN tokens against a
//! live [`Board`], tracks the variation board stack, and recovers from
//! malformed games according to an [`ErrorPolicy`].

use std::fmt;
use std::ops::BitOr;

use crate::board::Board;
use crate::chess_move::{Move, MoveKind};
use crate::error::PgnError;
use crate::parser::{ParseSink, Parser};
use crate::scanner::{GameResult, MoveNumIndicator, Scanner, Token};

/// Which callback categories a [`Reader`] actually invokes.
///
/// Disabling a category never changes what the reader *does* to its board
/// state — moves still apply, variations still push/pop — it only silences
/// the corresponding [`Actions`] callback, trading callback overhead for a
/// caller that only cares about, say, tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFilter(u8);

impl ActionFilter {
    pub const TAG: ActionFilter = ActionFilter(1 << 0);
    pub const MOVE: ActionFilter = ActionFilter(1 << 1);
    pub const NAG: ActionFilter = ActionFilter(1 << 2);
    pub const VARIATION: ActionFilter = ActionFilter(1 << 3);
    pub const COMMENT: ActionFilter = ActionFilter(1 << 4);
    pub const NONE: ActionFilter = ActionFilter(0);
    pub const ALL: ActionFilter = ActionFilter(0b1_1111);

    #[inline]
    pub const fn contains(self, other: ActionFilter) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ActionFilter {
    type Output = ActionFilter;
    fn bitor(self, rhs: ActionFilter) -> ActionFilter {
        ActionFilter(self.0 | rhs.0)
    }
}

/// What a [`Reader`] should do after [`Actions::on_error`] reports a
/// recoverable problem with the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop reading immediately; the error is returned to the caller.
    Abort,
    /// Discard the rest of the current game (scanning lenient tokens up to
    /// its `RESULT` or end of input) and resume with the next game on a
    /// fresh board. No further callbacks, including [`Actions::on_game_end`],
    /// fire for the discarded game.
    ContinueFromNextGame,
}

/// A [`PgnError`] together with the line the scanner was on when it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: u32,
    pub inner: PgnError,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.inner)
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

/// Callbacks a [`Reader`] drives while walking a PGN stream.
///
/// Every method has a no-op default; implement only the ones a particular
/// consumer (a perft-against-PGN checker, a database importer, a UI move
/// list) needs.
pub trait Actions {
    /// Fires once per game attempted, including one that later errors out —
    /// only [`Actions::on_game_end`] is withheld for an aborted game.
    fn on_game_start(&mut self) {}
    fn on_tag(&mut self, _key: &str, _value: &str) {}
    /// `board_before` is the position the move was played from.
    fn on_move(&mut self, _san: &str, _mv: Move, _board_before: &Board) {}
    fn on_nag(&mut self, _nag: u8) {}
    fn on_variation_start(&mut self) {}
    fn on_variation_end(&mut self) {}
    fn on_comment(&mut self, _text: &str) {}
    fn on_game_end(&mut self, _result: GameResult) {}
    /// A recoverable error was encountered while reading the current game.
    /// Defaults to aborting the whole read.
    fn on_error(&mut self, _err: &PgnError, _line: u32) -> ErrorPolicy {
        ErrorPolicy::Abort
    }
}

/// Reads a full multi-game PGN stream, applying every move to a live board
/// and dispatching [`Actions`] callbacks as it goes.
#[derive(Debug)]
pub struct Reader<A: Actions> {
    actions: A,
    filter: ActionFilter,
    current: Board,
    previous: Board,
    variation_stack: Vec<(Board, Board)>,
    game_index: u32,
    /// Nesting depth inside a variation that is being ignored because
    /// [`ActionFilter::VARIATION`] is off. `0` means we are on the main line
    /// (or inside a variation that is not being suppressed).
    suppressed_variation_depth: u32,
}

impl<A: Actions> Reader<A> {
    /// Build a reader. Fails if `filter` enables [`ActionFilter::NAG`]
    /// without [`ActionFilter::MOVE`] — a NAG with no move to attach it to
    /// is never meaningful to report.
    pub fn new(actions: A, filter: ActionFilter) -> Result<Reader<A>, PgnError> {
        if filter.contains(ActionFilter::NAG) && !filter.contains(ActionFilter::MOVE) {
            return Err(PgnError::Internal(
                "ActionFilter::NAG requires ActionFilter::MOVE".to_string(),
            ));
        }
        Ok(Reader {
            actions,
            filter,
            current: Board::starting_position(),
            previous: Board::starting_position(),
            variation_stack: Vec::new(),
            game_index: 0,
            suppressed_variation_depth: 0,
        })
    }

    /// Consume `self`, returning the wrapped [`Actions`] implementation.
    pub fn into_actions(self) -> A {
        self.actions
    }

    /// Read every game in `pgn`, stopping at the first error whose policy is
    /// [`ErrorPolicy::Abort`] (the default).
    pub fn read_all(&mut self, pgn: &str) -> Result<(), LineError> {
        let mut scanner = Scanner::new(pgn);
        loop {
            self.current = Board::starting_position();
            self.previous = Board::starting_position();
            self.variation_stack.clear();
            self.suppressed_variation_depth = 0;

            let span = tracing::debug_span!("reader::read_game", game_index = self.game_index);
            let _enter = span.enter();

            let mut parser = Parser::new(&mut scanner);
            let outcome = parser.parse_game(self);
            let line = parser.line();
            drop(parser);

            match outcome {
                Ok(false) => return Ok(()),
                Ok(true) => {
                    self.game_index += 1;
                }
                Err(err) => {
                    tracing::warn!(%err, line, "recoverable error while reading game");
                    if let PgnError::Internal(_) = err {
                        tracing::error!(%err, "internal invariant violated");
                    }
                    match self.actions.on_error(&err, line) {
                        ErrorPolicy::Abort => return Err(LineError { line, inner: err }),
                        ErrorPolicy::ContinueFromNextGame => {
                            loop {
                                match scanner.next_token_lenient() {
                                    Token::Result(_) | Token::Eof => break,
                                    _ => {}
                                }
                            }
                            self.game_index += 1;
                        }
                    }
                }
            }
        }
    }

    fn resolve_move(&self, token: &Token) -> Result<Move, PgnError> {
        let legal = crate::movegen::generate_legal_moves(&self.current);
        let candidates: Vec<Move> = match token {
            Token::ShortCastle => legal
                .as_slice()
                .iter()
                .copied()
                .filter(|m| m.is_short_castle())
                .collect(),
            Token::LongCastle => legal
                .as_slice()
                .iter()
                .copied()
                .filter(|m| m.is_long_castle())
                .collect(),
            Token::PawnMove { src_mask, dst, capture } => legal
                .as_slice()
                .iter()
                .copied()
                .filter(|m| {
                    m.dest() == *dst
                        && src_mask.contains(m.source())
                        && pawn_kind_matches(m.kind(), *capture)
                })
                .collect(),
            Token::PawnPromo { src_mask, dst, capture: _, promotion } => legal
                .as_slice()
                .iter()
                .copied()
                .filter(|m| {
                    m.is_promotion()
                        && m.dest() == *dst
                        && src_mask.contains(m.source())
                        && m.promotion_piece() == *promotion
                })
                .collect(),
            Token::PieceMove { piece, src_mask, dst, capture: _ } => legal
                .as_slice()
                .iter()
                .copied()
                .filter(|m| {
                    m.dest() == *dst
                        && src_mask.contains(m.source())
                        && self.current.piece_on(m.source()) == Some(*piece)
                })
                .collect(),
            other => {
                return Err(PgnError::UnexpectedToken {
                    token: format!("{other:?}"),
                });
            }
        };

        match candidates.len() {
            0 => Err(PgnError::IllegalMove {
                san: format!("{token:?}"),
            }),
            1 => Ok(candidates[0]),
            _ => Err(PgnError::AmbiguousMove {
                san: format!("{token:?}"),
            }),
        }
    }
}

fn pawn_kind_matches(kind: MoveKind, capture: bool) -> bool {
    match (capture, kind) {
        (true, MoveKind::PawnCapture) | (true, MoveKind::EnPassant) => true,
        (false, MoveKind::PawnAdvance) => true,
        _ => false,
    }
}

impl<A: Actions> ParseSink for Reader<A> {
    fn on_game_start(&mut self) {
        self.actions.on_game_start();
    }

    fn on_tag(&mut self, key: String, value: String) {
        if self.filter.contains(ActionFilter::TAG) {
            self.actions.on_tag(&key, &value);
        }
    }

    fn on_movetext_start(&mut self) {}

    fn on_move_num(&mut self, number: u32, _indicator: MoveNumIndicator) -> Result<(), PgnError> {
        if self.suppressed_variation_depth > 0 {
            return Ok(());
        }
        let expected = self.current.fullmove_number();
        if number != expected {
            return Err(PgnError::UnexpectedMoveNum { found: number, expected });
        }
        Ok(())
    }

    fn on_move(&mut self, token: Token) -> Result<(), PgnError> {
        if self.suppressed_variation_depth > 0 {
            return Ok(());
        }
        let mv = self.resolve_move(&token)?;
        self.previous = self.current;
        let san = self.current.move_to_san_and_play(mv)?;
        if self.filter.contains(ActionFilter::MOVE) {
            self.actions.on_move(&san, mv, &self.previous);
        }
        Ok(())
    }

    fn on_nag(&mut self, nag: u8) {
        if self.suppressed_variation_depth == 0 && self.filter.contains(ActionFilter::NAG) {
            self.actions.on_nag(nag);
        }
    }

    fn on_variation_start(&mut self) {
        if !self.filter.contains(ActionFilter::VARIATION) {
            self.suppressed_variation_depth += 1;
            return;
        }
        self.variation_stack.push((self.current, self.previous));
        self.current = self.previous;
        self.actions.on_variation_start();
    }

    fn on_variation_end(&mut self) {
        if self.suppressed_variation_depth > 0 {
            self.suppressed_variation_depth -= 1;
            return;
        }
        if let Some((current, previous)) = self.variation_stack.pop() {
            self.current = current;
            self.previous = previous;
        }
        if self.filter.contains(ActionFilter::VARIATION) {
            self.actions.on_variation_end();
        }
    }

    fn on_comment(&mut self, text: String) {
        if self.suppressed_variation_depth == 0 && self.filter.contains(ActionFilter::COMMENT) {
            self.actions.on_comment(&text);
        }
    }

    fn on_result(&mut self, result: GameResult) {
        self.actions.on_game_end(result);
    }
}
