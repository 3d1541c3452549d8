//! Hand-written PGN tokenizer.

use crate::bitboard::Bitboard;
use crate::chess_move::PromotionPiece;
use crate::file::File;
use crate::piece_kind::PieceKind;
use crate::rank::Rank;
use crate::square::Square;

/// Zero, one, or three trailing dots on a move-number indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveNumIndicator {
    /// The conventional single-dot form (`12.`).
    Plain,
    /// The three-dot black-resumption form (`12...`), used after a comment
    /// or variation breaks up the line.
    BlackContinuation,
    /// A bare number with no dot at all (`12`), seen in some PGN dialects.
    BlackContinuationAlt,
}

/// The outcome recorded in a PGN's `Result` tag and its movetext terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
    Unknown,
}

/// One lexical unit of PGN text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Sentinel: no token has been read yet.
    None,
    Eof,
    TagStart,
    TagKey(String),
    TagValue(String),
    TagEnd,
    VariationStart,
    VariationEnd,
    MoveNum {
        number: u32,
        indicator: MoveNumIndicator,
    },
    PawnMove {
        src_mask: Bitboard,
        dst: Square,
        capture: bool,
    },
    PawnPromo {
        src_mask: Bitboard,
        dst: Square,
        capture: bool,
        promotion: PromotionPiece,
    },
    PieceMove {
        piece: PieceKind,
        src_mask: Bitboard,
        dst: Square,
        capture: bool,
    },
    ShortCastle,
    LongCastle,
    Nag(u8),
    CommentStart,
    CommentText(String),
    CommentNewline,
    CommentEnd,
    Result(GameResult),
    Error(String),
}

/// Scans a PGN text buffer into a stream of [`Token`]s.
///
/// Operates over the whole input held in memory (the "single growing byte
/// buffer" the original scanner hand-rolls is just the caller's `String`
/// here), tracking only a cursor and a line counter.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    /// Set while skipping to the next game after a recoverable error; in
    /// this mode unrecognized bytes are silently dropped instead of
    /// producing `Token::Error`.
    lenient: bool,
    /// Set right after a `TagStart` token; the next identifier is a tag key
    /// rather than a move, which the scanner otherwise can't tell apart from
    /// context alone.
    expect_tag_key: bool,
}

impl Scanner {
    pub fn new(input: &str) -> Scanner {
        Scanner {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            lenient: false,
            expect_tag_key: false,
        }
    }

    /// The 1-based line the scanner is currently positioned on.
    pub fn line(&self) -> u32 {
        self.line
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Read the next token, surfacing unrecognized bytes as `Token::Error`.
    pub fn next_token(&mut self) -> Token {
        self.lenient = false;
        self.scan()
    }

    /// Read the next token, silently dropping unrecognized bytes instead of
    /// producing `Token::Error`. Used while skipping to the next game after
    /// a recoverable error.
    pub fn next_token_lenient(&mut self) -> Token {
        self.lenient = true;
        self.scan()
    }

    fn scan(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                return Token::Eof;
            };

            if self.expect_tag_key && c.is_ascii_alphabetic() {
                return self.scan_tag_key();
            }

            match c {
                '[' => {
                    self.advance();
                    self.expect_tag_key = true;
                    return Token::TagStart;
                }
                ']' => {
                    self.advance();
                    return Token::TagEnd;
                }
                '"' => return self.scan_tag_value(),
                '(' => {
                    self.advance();
                    return Token::VariationStart;
                }
                ')' => {
                    self.advance();
                    return Token::VariationEnd;
                }
                '{' => {
                    self.advance();
                    return Token::CommentStart;
                }
                ';' => {
                    if let Some(tok) = self.scan_line_comment() {
                        return tok;
                    }
                    continue;
                }
                '$' => return self.scan_numeric_nag(),
                '!' | '?' => return self.scan_shorthand_nag(),
                '*' => {
                    self.advance();
                    return Token::Result(GameResult::Unknown);
                }
                c if c.is_ascii_digit() => return self.scan_digit_led(),
                'O' | '0' => {
                    if let Some(tok) = self.try_scan_castle() {
                        return tok;
                    }
                    return self.scan_bad_char();
                }
                'N' | 'B' | 'R' | 'Q' | 'K' => return self.scan_piece_move(),
                'a'..='h' => return self.scan_pawn_move(),
                _ => return self.scan_bad_char(),
            }
        }
    }

    fn scan_bad_char(&mut self) -> Token {
        let c = self.advance().unwrap();
        if self.lenient {
            return self.scan();
        }
        Token::Error(format!("unrecognized character '{c}'"))
    }

    fn scan_tag_key(&mut self) -> Token {
        self.expect_tag_key = false;
        let mut key = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            key.push(self.advance().unwrap());
        }
        Token::TagKey(key)
    }

    fn scan_tag_value(&mut self) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Token::Error("unterminated tag value".to_string()),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Token::Error("unterminated tag value".to_string()),
                },
                Some(other) => value.push(other),
            }
        }
        Token::TagValue(value)
    }

    fn scan_line_comment(&mut self) -> Option<Token> {
        self.advance(); // ';'
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        if text.trim().is_empty() {
            None
        } else {
            Some(Token::CommentText(text))
        }
    }

    fn scan_numeric_nag(&mut self) -> Token {
        self.advance(); // '$'
        let mut digits = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            digits.push(self.advance().unwrap());
        }
        match digits.parse::<u16>() {
            Ok(n) if n <= u8::MAX as u16 => Token::Nag(n as u8),
            _ => Token::Error(format!("invalid NAG: ${digits}")),
        }
    }

    fn scan_shorthand_nag(&mut self) -> Token {
        let first = self.advance().unwrap();
        let second = if matches!(self.peek(), Some('!') | Some('?')) {
            self.advance()
        } else {
            None
        };
        let nag = match (first, second) {
            ('!', Some('!')) => 3,
            ('?', Some('?')) => 4,
            ('!', Some('?')) => 5,
            ('?', Some('!')) => 6,
            ('!', None) => 1,
            ('?', None) => 2,
            _ => unreachable!("scan_shorthand_nag only called on '!'/'?'"),
        };
        Token::Nag(nag)
    }

    fn scan_digit_led(&mut self) -> Token {
        let mut digits = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            digits.push(self.advance().unwrap());
        }

        // Game result ("1-0", "0-1", "1/2-1/2") vs. move number ("12.", "12...", "12").
        if self.peek() == Some('-') {
            let mut lookahead = 1;
            let mut rest = String::new();
            while let Some(c) = self.peek_at(lookahead) {
                if c.is_ascii_digit() || c == '-' || c == '/' {
                    rest.push(c);
                    lookahead += 1;
                } else {
                    break;
                }
            }
            let candidate = format!("{digits}-{rest}");
            let result = match candidate.as_str() {
                "1-0" => Some(GameResult::WhiteWin),
                "0-1" => Some(GameResult::BlackWin),
                "1/2-1/2" => Some(GameResult::Draw),
                _ => None,
            };
            if let Some(result) = result {
                for _ in 0..(1 + rest.len()) {
                    self.advance();
                }
                return Token::Result(result);
            }
        }

        let number: u32 = match digits.parse() {
            Ok(n) => n,
            Err(_) => return Token::Error(format!("invalid move number: {digits}")),
        };

        let mut dots = 0u32;
        while self.peek() == Some('.') {
            dots += 1;
            self.advance();
        }
        let indicator = match dots {
            0 => MoveNumIndicator::BlackContinuationAlt,
            3 => MoveNumIndicator::BlackContinuation,
            _ => MoveNumIndicator::Plain,
        };
        Token::MoveNum { number, indicator }
    }

    fn try_scan_castle(&mut self) -> Option<Token> {
        let start = self.pos;
        let king_char = self.peek()?;
        if !matches!(king_char, 'O' | '0') {
            return None;
        }
        let mut depth = 1;
        let mut offset = 1;
        loop {
            if self.peek_at(offset) != Some('-') {
                break;
            }
            if self.peek_at(offset + 1) != Some(king_char) {
                break;
            }
            depth += 1;
            offset += 2;
        }
        if depth < 2 {
            self.pos = start;
            return None;
        }
        for _ in 0..offset {
            self.advance();
        }
        self.consume_move_suffix();
        Some(if depth == 2 {
            Token::ShortCastle
        } else {
            Token::LongCastle
        })
    }

    /// Eats a trailing `+`/`#` after a move token; per the scanner spec
    /// these are not surfaced as separate tokens since the reader
    /// re-derives check/mate status itself.
    fn consume_move_suffix(&mut self) {
        if matches!(self.peek(), Some('+') | Some('#')) {
            self.advance();
        }
    }

    fn read_square(&mut self) -> Option<Square> {
        let file_c = self.peek()?;
        if !('a'..='h').contains(&file_c) {
            return None;
        }
        let rank_c = self.peek_at(1)?;
        if !('1'..='8').contains(&rank_c) {
            return None;
        }
        self.advance();
        self.advance();
        Some(Square::new(
            Rank::from_index(rank_c as u8 - b'1').unwrap(),
            File::from_index(file_c as u8 - b'a').unwrap(),
        ))
    }

    fn read_promotion(&mut self) -> Option<PromotionPiece> {
        if self.peek() == Some('=') {
            self.advance();
            let letter = self.advance()?;
            return match letter {
                'N' => Some(PromotionPiece::Knight),
                'B' => Some(PromotionPiece::Bishop),
                'R' => Some(PromotionPiece::Rook),
                'Q' => Some(PromotionPiece::Queen),
                _ => None,
            };
        }
        None
    }

    fn scan_pawn_move(&mut self) -> Token {
        let Some(first_file_c) = self.peek() else {
            return self.scan_bad_char();
        };
        let Some(first_file) = File::from_index(first_file_c as u8 - b'a') else {
            return self.scan_bad_char();
        };

        // Disambiguate "e4" (advance) from "exd5" (capture: source file e, 'x', dest d5).
        let is_capture = self.peek_at(1) == Some('x');
        let (src_mask, dst) = if is_capture {
            self.advance(); // source file
            self.advance(); // 'x'
            let Some(dst) = self.read_square() else {
                return Token::Error("expected destination square after pawn capture".to_string());
            };
            (Bitboard::file_mask(first_file), dst)
        } else {
            let Some(dst) = self.read_square() else {
                return self.scan_bad_char();
            };
            (Bitboard::FULL, dst)
        };

        let token = match self.read_promotion() {
            Some(promotion) => Token::PawnPromo {
                src_mask,
                dst,
                capture: is_capture,
                promotion,
            },
            None => Token::PawnMove {
                src_mask,
                dst,
                capture: is_capture,
            },
        };
        self.consume_move_suffix();
        token
    }

    fn scan_piece_move(&mut self) -> Token {
        let letter = self.advance().unwrap();
        let piece = match letter {
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => unreachable!("scan_piece_move only called on piece letters"),
        };

        // Gather every square/'x' component before the trailing suffix; the
        // destination is always the last two (file, rank) characters, 'x'
        // (wherever it falls) marks a capture, and whatever square chars
        // remain before the destination are the disambiguator.
        let mut component = String::new();
        while matches!(self.peek(), Some('a'..='h') | Some('1'..='8') | Some('x')) {
            component.push(self.advance().unwrap());
        }

        let is_capture = component.contains('x');
        let squares: String = component.chars().filter(|c| *c != 'x').collect();
        let square_chars: Vec<char> = squares.chars().collect();
        if square_chars.len() < 2 {
            return Token::Error(format!("expected destination square after '{letter}'"));
        }
        let dst_chars = &square_chars[square_chars.len() - 2..];
        let Some(dst) = parse_square(dst_chars[0], dst_chars[1]) else {
            return Token::Error(format!("invalid destination square after '{letter}'"));
        };

        let disambig = &square_chars[..square_chars.len() - 2];
        let src_mask = match disambig {
            [] => Bitboard::FULL,
            [f] if ('a'..='h').contains(f) => Bitboard::file_mask(File::from_index(*f as u8 - b'a').unwrap()),
            [r] if ('1'..='8').contains(r) => Bitboard::rank_mask(Rank::from_index(*r as u8 - b'1').unwrap()),
            [f, r] => match parse_square(*f, *r) {
                Some(sq) => sq.bitboard(),
                None => return Token::Error(format!("invalid disambiguator '{f}{r}'")),
            },
            _ => return Token::Error(format!("malformed move near '{letter}{squares}'")),
        };

        let token = Token::PieceMove {
            piece,
            src_mask,
            dst,
            capture: is_capture,
        };
        self.consume_move_suffix();
        token
    }
}

fn parse_square(file_c: char, rank_c: char) -> Option<Square> {
    if !('a'..='h').contains(&file_c) || !('1'..='8').contains(&rank_c) {
        return None;
    }
    Some(Square::new(
        Rank::from_index(rank_c as u8 - b'1')?,
        File::from_index(file_c as u8 - b'a')?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_pair() {
        let mut s = Scanner::new("[Event \"F/S Return Match\"]");
        assert_eq!(s.next_token(), Token::TagStart);
        assert_eq!(s.next_token(), Token::TagKey("Event".to_string()));
        assert_eq!(s.next_token(), Token::TagValue("F/S Return Match".to_string()));
        assert_eq!(s.next_token(), Token::TagEnd);
    }

    #[test]
    fn simple_pawn_advance() {
        let mut s = Scanner::new("e4");
        assert_eq!(
            s.next_token(),
            Token::PawnMove {
                src_mask: Bitboard::FULL,
                dst: Square::E4,
                capture: false,
            }
        );
    }

    #[test]
    fn pawn_capture() {
        let mut s = Scanner::new("exd5");
        assert_eq!(
            s.next_token(),
            Token::PawnMove {
                src_mask: Bitboard::file_mask(File::FileE),
                dst: Square::D5,
                capture: true,
            }
        );
    }

    #[test]
    fn pawn_promotion() {
        let mut s = Scanner::new("e8=Q");
        assert_eq!(
            s.next_token(),
            Token::PawnPromo {
                src_mask: Bitboard::FULL,
                dst: Square::E8,
                capture: false,
                promotion: PromotionPiece::Queen,
            }
        );
    }

    #[test]
    fn piece_move_no_disambiguation() {
        let mut s = Scanner::new("Nf3");
        assert_eq!(
            s.next_token(),
            Token::PieceMove {
                piece: PieceKind::Knight,
                src_mask: Bitboard::FULL,
                dst: Square::F3,
                capture: false,
            }
        );
    }

    #[test]
    fn piece_move_file_disambiguation() {
        let mut s = Scanner::new("Nbd2");
        assert_eq!(
            s.next_token(),
            Token::PieceMove {
                piece: PieceKind::Knight,
                src_mask: Bitboard::file_mask(File::FileB),
                dst: Square::D2,
                capture: false,
            }
        );
    }

    #[test]
    fn piece_move_rank_disambiguation() {
        let mut s = Scanner::new("N1f2");
        assert_eq!(
            s.next_token(),
            Token::PieceMove {
                piece: PieceKind::Knight,
                src_mask: Bitboard::rank_mask(Rank::Rank1),
                dst: Square::F2,
                capture: false,
            }
        );
    }

    #[test]
    fn piece_capture() {
        let mut s = Scanner::new("Qxh8+");
        assert_eq!(
            s.next_token(),
            Token::PieceMove {
                piece: PieceKind::Queen,
                src_mask: Bitboard::FULL,
                dst: Square::H8,
                capture: true,
            }
        );
    }

    #[test]
    fn castling() {
        let mut s = Scanner::new("O-O O-O-O");
        assert_eq!(s.next_token(), Token::ShortCastle);
        assert_eq!(s.next_token(), Token::LongCastle);
    }

    #[test]
    fn move_number_plain() {
        let mut s = Scanner::new("12.");
        assert_eq!(
            s.next_token(),
            Token::MoveNum {
                number: 12,
                indicator: MoveNumIndicator::Plain,
            }
        );
    }

    #[test]
    fn move_number_black_continuation() {
        let mut s = Scanner::new("12...");
        assert_eq!(
            s.next_token(),
            Token::MoveNum {
                number: 12,
                indicator: MoveNumIndicator::BlackContinuation,
            }
        );
    }

    #[test]
    fn nag_shorthand() {
        let mut s = Scanner::new("!! ?? !? ?! ! ?");
        assert_eq!(s.next_token(), Token::Nag(3));
        assert_eq!(s.next_token(), Token::Nag(4));
        assert_eq!(s.next_token(), Token::Nag(5));
        assert_eq!(s.next_token(), Token::Nag(6));
        assert_eq!(s.next_token(), Token::Nag(1));
        assert_eq!(s.next_token(), Token::Nag(2));
    }

    #[test]
    fn numeric_nag() {
        let mut s = Scanner::new("$3");
        assert_eq!(s.next_token(), Token::Nag(3));
    }

    #[test]
    fn result_tokens() {
        assert_eq!(Scanner::new("1-0").next_token(), Token::Result(GameResult::WhiteWin));
        assert_eq!(Scanner::new("0-1").next_token(), Token::Result(GameResult::BlackWin));
        assert_eq!(Scanner::new("1/2-1/2").next_token(), Token::Result(GameResult::Draw));
        assert_eq!(Scanner::new("*").next_token(), Token::Result(GameResult::Unknown));
    }

    #[test]
    fn brace_comment() {
        let mut s = Scanner::new("{a good move}");
        assert_eq!(s.next_token(), Token::CommentStart);
        assert_eq!(s.next_token(), Token::CommentText("a good move".to_string()));
        assert_eq!(s.next_token(), Token::CommentEnd);
    }

    #[test]
    fn brace_comment_multiline() {
        let mut s = Scanner::new("{line one\nline two}");
        assert_eq!(s.next_token(), Token::CommentStart);
        assert_eq!(s.next_token(), Token::CommentText("line one".to_string()));
        assert_eq!(s.next_token(), Token::CommentNewline);
        assert_eq!(s.next_token(), Token::CommentText("line two".to_string()));
        assert_eq!(s.next_token(), Token::CommentEnd);
    }

    #[test]
    fn line_comment_with_content() {
        let mut s = Scanner::new("; a remark\ne4");
        assert_eq!(s.next_token(), Token::CommentText(" a remark".to_string()));
        assert_eq!(
            s.next_token(),
            Token::PawnMove {
                src_mask: Bitboard::FULL,
                dst: Square::E4,
                capture: false,
            }
        );
    }

    #[test]
    fn whitespace_only_line_comment_discarded() {
        let mut s = Scanner::new(";   \ne4");
        assert_eq!(
            s.next_token(),
            Token::PawnMove {
                src_mask: Bitboard::FULL,
                dst: Square::E4,
                capture: false,
            }
        );
    }

    #[test]
    fn variation_brackets() {
        let mut s = Scanner::new("(e4)");
        assert_eq!(s.next_token(), Token::VariationStart);
        let _ = s.next_token();
        assert_eq!(s.next_token(), Token::VariationEnd);
    }

    #[test]
    fn unrecognized_byte_errors() {
        let mut s = Scanner::new("@");
        assert!(matches!(s.next_token(), Token::Error(_)));
    }

    #[test]
    fn lenient_mode_skips_bad_bytes() {
        let mut s = Scanner::new("@@@e4");
        assert_eq!(
            s.next_token_lenient(),
            Token::PawnMove {
                src_mask: Bitboard::FULL,
                dst: Square::E4,
                capture: false,
            }
        );
    }

    #[test]
    fn line_tracking() {
        let mut s = Scanner::new("e4\ne5\nNf3");
        assert_eq!(s.line(), 1);
        let _ = s.next_token();
        assert_eq!(s.line(), 1);
        let _ = s.next_token();
        assert_eq!(s.line(), 2);
        let _ = s.next_token();
        assert_eq!(s.line(), 3);
    }

    #[test]
    fn eof_token() {
        let mut s = Scanner::new("   ");
        assert_eq!(s.next_token(), Token::Eof);
    }
}
