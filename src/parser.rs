//! Grammar-level PGN parsing: turns a token stream into structural callbacks.
//!
//! ```text
//! PGN        ::= (COMMENT* GAME)* EOF
//! GAME       ::= TAGPAIRS MOVETEXT
//! TAGPAIRS   ::= (COMMENT* TAGPAIR)*
//! TAGPAIR    ::= TAG_START TAG_KEY TAG_VALUE TAG_END
//! MOVETEXT   ::= LINE RESULT
//! LINE       ::= COMMENT* (MOVE_ITEM COMMENT* VARIATION* COMMENT*)*
//! VARIATION  ::= VARIATION_START LINE VARIATION_END
//! MOVE_ITEM  ::= MOVENUM? MOVE NAG*
//! MOVE       ::= <one of the six MOVE_* tokens>
//! ```

use crate::error::PgnError;
use crate::scanner::{GameResult, MoveNumIndicator, Scanner, Token};

/// Maximum nesting depth of `( ... )` variations the parser tracks as real
/// structure; deeper nesting still parses (grammar balance is preserved) but
/// is silently dropped rather than reported as an error, per the reader's
/// "grammar-level limit, not a parser error" contract.
pub const MAX_VARIATION_DEPTH: usize = 64;

/// Structural callbacks the parser drives as it recognizes each production.
///
/// This is deliberately ignorant of chess semantics — move legality,
/// board application, and the variation *board* stack all live in
/// [`crate::reader::Reader`], which implements this trait.
pub trait ParseSink {
    /// Fires once a game is confirmed to exist (i.e. the parser is not
    /// sitting at end of input), before any of its tag pairs are read.
    fn on_game_start(&mut self) {}
    fn on_tag(&mut self, key: String, value: String);
    fn on_movetext_start(&mut self);
    fn on_move_num(&mut self, number: u32, indicator: MoveNumIndicator) -> Result<(), PgnError>;
    fn on_move(&mut self, token: Token) -> Result<(), PgnError>;
    fn on_nag(&mut self, nag: u8);
    fn on_variation_start(&mut self);
    fn on_variation_end(&mut self);
    fn on_comment(&mut self, text: String);
    fn on_comment_newline(&mut self) {}
    fn on_result(&mut self, result: GameResult);
}

/// A comment token seen before `on_movetext_start` has fired, held until
/// that callback has run so movetext comments never arrive out of order.
enum PendingComment {
    Text(String),
    Newline,
}

/// A push-down parser driving one [`ParseSink`] over a [`Scanner`]'s tokens.
pub struct Parser<'a> {
    scanner: &'a mut Scanner,
    lookahead: Option<Token>,
    depth: usize,
    overflow_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(scanner: &'a mut Scanner) -> Parser<'a> {
        Parser {
            scanner,
            lookahead: None,
            depth: 0,
            overflow_depth: 0,
        }
    }

    /// The line the scanner is currently on — used to attach `Line N:` to
    /// propagated errors.
    pub fn line(&self) -> u32 {
        self.scanner.line()
    }

    fn peek(&mut self) -> &Token {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scanner.next_token());
        }
        self.lookahead.as_ref().unwrap()
    }

    fn bump(&mut self) -> Token {
        match self.lookahead.take() {
            Some(tok) => tok,
            None => self.scanner.next_token(),
        }
    }

    /// Parse one `(COMMENT* GAME)`, i.e. everything up to and including the
    /// game's result token. Returns `Ok(false)` at end of input with no game
    /// pending.
    ///
    /// Comments seen before `on_movetext_start` fires (leading comments and
    /// any interspersed among the tag pairs) are buffered and flushed
    /// immediately after that callback, per the reader's documented
    /// callback ordering: tag callbacks precede the movetext marker, which
    /// in turn precedes every movetext-section comment.
    pub fn parse_game(&mut self, sink: &mut impl ParseSink) -> Result<bool, PgnError> {
        let mut pretext_comments = Vec::new();
        self.collect_comments(&mut pretext_comments)?;
        if matches!(self.peek(), Token::Eof) {
            return Ok(false);
        }
        sink.on_game_start();

        self.parse_tag_pairs(sink, &mut pretext_comments)?;
        sink.on_movetext_start();
        for pending in pretext_comments {
            match pending {
                PendingComment::Text(text) => sink.on_comment(text),
                PendingComment::Newline => sink.on_comment_newline(),
            }
        }

        self.parse_line(sink)?;
        self.parse_result(sink)?;
        Ok(true)
    }

    fn collect_comments(&mut self, buf: &mut Vec<PendingComment>) -> Result<(), PgnError> {
        loop {
            match self.peek() {
                Token::CommentStart => self.collect_brace_comment(buf)?,
                Token::CommentText(_) => {
                    if let Token::CommentText(text) = self.bump() {
                        buf.push(PendingComment::Text(text));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn collect_brace_comment(&mut self, buf: &mut Vec<PendingComment>) -> Result<(), PgnError> {
        self.bump(); // CommentStart
        loop {
            match self.bump() {
                Token::CommentText(text) => buf.push(PendingComment::Text(text)),
                Token::CommentNewline => buf.push(PendingComment::Newline),
                Token::CommentEnd => return Ok(()),
                other => {
                    return Err(PgnError::UnexpectedToken {
                        token: format!("{other:?}"),
                    });
                }
            }
        }
    }

    fn parse_tag_pairs(
        &mut self,
        sink: &mut impl ParseSink,
        pretext_comments: &mut Vec<PendingComment>,
    ) -> Result<(), PgnError> {
        loop {
            self.collect_comments(pretext_comments)?;
            if !matches!(self.peek(), Token::TagStart) {
                return Ok(());
            }
            self.bump(); // TagStart
            let key = match self.bump() {
                Token::TagKey(k) => k,
                other => {
                    return Err(PgnError::BadPgnTag {
                        reason: format!("expected tag key, found {other:?}"),
                    });
                }
            };
            let value = match self.bump() {
                Token::TagValue(v) => v,
                other => {
                    return Err(PgnError::BadPgnTag {
                        reason: format!("expected tag value, found {other:?}"),
                    });
                }
            };
            match self.bump() {
                Token::TagEnd => {}
                other => {
                    return Err(PgnError::BadPgnTag {
                        reason: format!("expected ']', found {other:?}"),
                    });
                }
            }
            sink.on_tag(key, value);
        }
    }

    fn parse_brace_comment(&mut self, sink: &mut impl ParseSink) -> Result<(), PgnError> {
        self.bump(); // CommentStart
        loop {
            match self.bump() {
                Token::CommentText(text) => sink.on_comment(text),
                Token::CommentNewline => sink.on_comment_newline(),
                Token::CommentEnd => return Ok(()),
                other => {
                    return Err(PgnError::UnexpectedToken {
                        token: format!("{other:?}"),
                    });
                }
            }
        }
    }

    fn parse_line(&mut self, sink: &mut impl ParseSink) -> Result<(), PgnError> {
        loop {
            self.skip_comments_in_line(sink)?;
            match self.peek() {
                Token::MoveNum { .. } | Token::PawnMove { .. } | Token::PawnPromo { .. }
                | Token::PieceMove { .. } | Token::ShortCastle | Token::LongCastle => {
                    self.parse_move_item(sink)?;
                    self.skip_comments_in_line(sink)?;
                    while matches!(self.peek(), Token::VariationStart) {
                        self.parse_variation(sink)?;
                        self.skip_comments_in_line(sink)?;
                    }
                }
                Token::VariationStart => {
                    // A variation with no preceding move in this line (rare
                    // but grammatically reachable after a bare move number).
                    self.parse_variation(sink)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_comments_in_line(&mut self, sink: &mut impl ParseSink) -> Result<(), PgnError> {
        loop {
            match self.peek() {
                Token::CommentStart => self.parse_brace_comment(sink)?,
                Token::CommentText(_) => {
                    if let Token::CommentText(text) = self.bump() {
                        sink.on_comment(text);
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_move_item(&mut self, sink: &mut impl ParseSink) -> Result<(), PgnError> {
        if let Token::MoveNum { .. } = self.peek() {
            let Token::MoveNum { number, indicator } = self.bump() else {
                unreachable!()
            };
            sink.on_move_num(number, indicator)?;
        }

        let mv_token = self.bump();
        if !matches!(
            mv_token,
            Token::PawnMove { .. }
                | Token::PawnPromo { .. }
                | Token::PieceMove { .. }
                | Token::ShortCastle
                | Token::LongCastle
        ) {
            return Err(PgnError::UnexpectedToken {
                token: format!("{mv_token:?}"),
            });
        }
        sink.on_move(mv_token)?;

        while let Token::Nag(n) = self.peek() {
            let n = *n;
            self.bump();
            sink.on_nag(n);
        }
        Ok(())
    }

    fn parse_variation(&mut self, sink: &mut impl ParseSink) -> Result<(), PgnError> {
        self.bump(); // VariationStart
        if self.depth >= MAX_VARIATION_DEPTH {
            self.overflow_depth += 1;
        } else {
            self.depth += 1;
            sink.on_variation_start();
        }

        self.parse_line(sink)?;

        match self.bump() {
            Token::VariationEnd => {}
            other => {
                return Err(PgnError::UnexpectedToken {
                    token: format!("{other:?}"),
                });
            }
        }

        if self.overflow_depth > 0 {
            self.overflow_depth -= 1;
        } else {
            self.depth -= 1;
            sink.on_variation_end();
        }
        Ok(())
    }

    fn parse_result(&mut self, sink: &mut impl ParseSink) -> Result<(), PgnError> {
        match self.bump() {
            Token::Result(result) => {
                sink.on_result(result);
                Ok(())
            }
            other => Err(PgnError::UnexpectedToken {
                token: format!("{other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ParseSink for Recorder {
        fn on_tag(&mut self, key: String, value: String) {
            self.events.push(format!("tag {key}={value}"));
        }
        fn on_movetext_start(&mut self) {
            self.events.push("movetext_start".to_string());
        }
        fn on_move_num(&mut self, number: u32, _indicator: MoveNumIndicator) -> Result<(), PgnError> {
            self.events.push(format!("movenum {number}"));
            Ok(())
        }
        fn on_move(&mut self, token: Token) -> Result<(), PgnError> {
            self.events.push(format!("move {token:?}"));
            Ok(())
        }
        fn on_nag(&mut self, nag: u8) {
            self.events.push(format!("nag {nag}"));
        }
        fn on_variation_start(&mut self) {
            self.events.push("variation_start".to_string());
        }
        fn on_variation_end(&mut self) {
            self.events.push("variation_end".to_string());
        }
        fn on_comment(&mut self, text: String) {
            self.events.push(format!("comment {text}"));
        }
        fn on_result(&mut self, result: GameResult) {
            self.events.push(format!("result {result:?}"));
        }
    }

    fn run(pgn: &str) -> Vec<String> {
        let mut scanner = Scanner::new(pgn);
        let mut parser = Parser::new(&mut scanner);
        let mut rec = Recorder::default();
        parser.parse_game(&mut rec).unwrap();
        rec.events
    }

    #[test]
    fn tag_pairs_then_movetext() {
        let events = run("[Event \"Test\"]\n1. e4 e5 1-0");
        assert_eq!(events[0], "tag Event=Test");
        assert_eq!(events[1], "movetext_start");
        assert_eq!(events[2], "movenum 1");
        assert!(events[3].starts_with("move"));
        assert!(events[4].starts_with("move"));
        assert_eq!(events.last().unwrap(), "result WhiteWin");
    }

    #[test]
    fn nag_after_move() {
        let events = run("1. e4! e5 1-0");
        assert!(events.iter().any(|e| e == "nag 1"));
    }

    #[test]
    fn variation_nesting() {
        let events = run("1. e4 (1. d4 d5) e5 1-0");
        assert!(events.contains(&"variation_start".to_string()));
        assert!(events.contains(&"variation_end".to_string()));
    }

    #[test]
    fn comment_in_movetext() {
        let events = run("1. e4 {good move} e5 1-0");
        assert!(events.iter().any(|e| e == "comment good move"));
    }

    #[test]
    fn deep_variation_overflow_truncates() {
        let mut pgn = String::from("1. e4 ");
        for _ in 0..MAX_VARIATION_DEPTH + 5 {
            pgn.push_str("(1. d4 ");
        }
        pgn.push_str("d5");
        for _ in 0..MAX_VARIATION_DEPTH + 5 {
            pgn.push(')');
        }
        pgn.push_str(" e5 1-0");

        let mut scanner = Scanner::new(&pgn);
        let mut parser = Parser::new(&mut scanner);
        let mut rec = Recorder::default();
        parser.parse_game(&mut rec).unwrap();
        let starts = rec.events.iter().filter(|e| *e == "variation_start").count();
        let ends = rec.events.iter().filter(|e| *e == "variation_end").count();
        assert_eq!(starts, MAX_VARIATION_DEPTH);
        assert_eq!(ends, MAX_VARIATION_DEPTH);
    }
}
