//! The token scanner for worm-program source text.
//!
//! Scanning never aborts: an unrecognizable character is recorded as a
//! syntax error and skipped, so the parser still sees every token that
//! follows and one parse reports as many problems as possible.

use std::sync::OnceLock;

use regex::Regex;
use wl_core::{ProgramError, SourcePos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Identifier,
    Assign,
    Semicolon,
    Comma,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Plus,
    Minus,
    Star,
    Slash,
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    LessThanOrEqual,
    GreaterThanOrEqual,
    LessThan,
    GreaterThan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: SourcePos,
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]+(\.[0-9]+)?").expect("number token pattern must compile")
    })
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("identifier token pattern must compile")
    })
}

/// Scan the whole source into a token list, collecting lexical errors into
/// `errors` instead of failing fast.
pub fn tokenize(source: &str, errors: &mut Vec<ProgramError>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1u32;
    let mut column = 1u32;

    while !rest.is_empty() {
        let ch = rest.chars().next().expect("non-empty input has a first char");

        if ch == '\n' {
            rest = &rest[1..];
            line += 1;
            column = 1;
            continue;
        }
        if ch.is_whitespace() {
            rest = &rest[ch.len_utf8()..];
            column += 1;
            continue;
        }
        if let Some(after) = rest.strip_prefix("//") {
            let skipped = after.find('\n').map_or(after.len(), |index| index);
            rest = &after[skipped..];
            column += 2 + skipped as u32;
            continue;
        }

        let pos = SourcePos::new(line, column);

        if let Some(matched) = number_pattern().find(rest) {
            tokens.push(Token {
                kind: TokenKind::Number,
                text: matched.as_str().to_string(),
                pos,
            });
            column += matched.end() as u32;
            rest = &rest[matched.end()..];
            continue;
        }

        if let Some(matched) = identifier_pattern().find(rest) {
            tokens.push(Token {
                kind: TokenKind::Identifier,
                text: matched.as_str().to_string(),
                pos,
            });
            column += matched.end() as u32;
            rest = &rest[matched.end()..];
            continue;
        }

        let two = [
            (":=", TokenKind::Assign),
            ("&&", TokenKind::And),
            ("||", TokenKind::Or),
            ("==", TokenKind::Equal),
            ("!=", TokenKind::NotEqual),
            ("<=", TokenKind::LessThanOrEqual),
            (">=", TokenKind::GreaterThanOrEqual),
        ]
        .into_iter()
        .find(|(text, _)| rest.starts_with(text));
        if let Some((text, kind)) = two {
            tokens.push(Token {
                kind,
                text: text.to_string(),
                pos,
            });
            column += 2;
            rest = &rest[2..];
            continue;
        }

        let one = match ch {
            ';' => Some(TokenKind::Semicolon),
            ',' => Some(TokenKind::Comma),
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            '{' => Some(TokenKind::LeftBrace),
            '}' => Some(TokenKind::RightBrace),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '!' => Some(TokenKind::Not),
            '<' => Some(TokenKind::LessThan),
            '>' => Some(TokenKind::GreaterThan),
            _ => None,
        };
        match one {
            Some(kind) => {
                tokens.push(Token {
                    kind,
                    text: ch.to_string(),
                    pos,
                });
            }
            None => {
                errors.push(ProgramError::syntax(
                    pos,
                    format!("unexpected character '{}'", ch),
                ));
            }
        }
        column += 1;
        rest = &rest[ch.len_utf8()..];
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut errors = Vec::new();
        let tokens = tokenize(source, &mut errors);
        assert!(errors.is_empty(), "unexpected lexical errors: {:?}", errors);
        tokens.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn scans_assignment_with_operators() {
        assert_eq!(
            kinds("x := 1.5 + y * 2;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::Star,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn two_character_operators_win_over_their_prefixes() {
        assert_eq!(
            kinds("<= < >= > == != := ! && ||"),
            vec![
                TokenKind::LessThanOrEqual,
                TokenKind::LessThan,
                TokenKind::GreaterThanOrEqual,
                TokenKind::GreaterThan,
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Assign,
                TokenKind::Not,
                TokenKind::And,
                TokenKind::Or,
            ]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let mut errors = Vec::new();
        let tokens = tokenize("x // the whole rest is skipped ;\ny", &mut errors);
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[1].text, "y");
        assert_eq!(tokens[1].pos, SourcePos::new(2, 1));
    }

    #[test]
    fn positions_are_one_based_line_and_column() {
        let mut errors = Vec::new();
        let tokens = tokenize("ab\n  cd", &mut errors);
        assert_eq!(tokens[0].pos, SourcePos::new(1, 1));
        assert_eq!(tokens[1].pos, SourcePos::new(2, 3));
    }

    #[test]
    fn unknown_characters_are_reported_and_skipped() {
        let mut errors = Vec::new();
        let tokens = tokenize("x @ y", &mut errors);
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains('@'));
    }
}
