// ABOUTME: Lexer producing a flat token stream from Lispy source text

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{opt, recognize, value},
    IResult, Parser,
};

use crate::error::LispyError;

/// Token kinds. Reserved words get dedicated kinds; the same enum tags
/// symbols in the value model, so the evaluator can dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    LSquare,
    RSquare,
    Quote,
    Integer,
    Float,
    String,
    Symbol,
    Define,
    If,
    True,
    False,
    Do,
    Macro,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Token {
            kind,
            literal: literal.into(),
        }
    }
}

/// Characters that terminate a symbol run.
fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '[' | ']' | '\'' | ';' | '"')
}

/// Parse a number token.
/// Handles: 42, -42, 3.14, -3.14, 42., .5
/// A leading '-' counts as a minus sign only when a digit follows.
fn lex_number(input: &str) -> IResult<&str, Token> {
    let (rest, literal) = alt((
        recognize((opt(char('-')), digit1, opt((char('.'), opt(digit1))))),
        recognize((char('.'), digit1)),
    ))
    .parse(input)?;

    let kind = if literal.contains('.') {
        TokenKind::Float
    } else {
        TokenKind::Integer
    };
    Ok((rest, Token::new(kind, literal)))
}

/// Parse a string token: "…" with no escape processing.
/// The closing quote is consumed but not included in the literal.
fn lex_string(input: &str) -> IResult<&str, Token> {
    let (rest, _) = char('"')(input)?;
    let (rest, content) = take_while(|c| c != '"')(rest)?;
    let (rest, _) = char('"')(rest)?;
    Ok((rest, Token::new(TokenKind::String, content)))
}

/// Parse a symbol token, mapping reserved words to their dedicated kinds.
fn lex_symbol(input: &str) -> IResult<&str, Token> {
    let (rest, name) = take_while1(is_symbol_char)(input)?;
    let token = match name {
        "define" => Token::new(TokenKind::Define, "define"),
        "if" => Token::new(TokenKind::If, "if"),
        "true" => Token::new(TokenKind::True, "true"),
        // nil is an alias for false at the lexical level
        "false" | "nil" => Token::new(TokenKind::False, "false"),
        "do" => Token::new(TokenKind::Do, "do"),
        "macro" => Token::new(TokenKind::Macro, "macro"),
        _ => Token::new(TokenKind::Symbol, name),
    };
    Ok((rest, token))
}

fn lex_token(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::new(TokenKind::LParen, "("), char('(')),
        value(Token::new(TokenKind::RParen, ")"), char(')')),
        value(Token::new(TokenKind::LSquare, "["), char('[')),
        value(Token::new(TokenKind::RSquare, "]"), char(']')),
        value(Token::new(TokenKind::Quote, "'"), char('\'')),
        lex_string,
        lex_number,
        lex_symbol,
    ))
    .parse(input)
}

/// Skip whitespace and comments. `;` runs to the next newline; `;;` opens
/// a block comment that runs to the next `;;` (or EOF if unterminated).
fn skip_trivia(mut input: &str) -> &str {
    loop {
        input = input.trim_start();
        if let Some(after) = input.strip_prefix(";;") {
            input = match after.find(";;") {
                Some(close) => &after[close + 2..],
                None => "",
            };
        } else if input.starts_with(';') {
            input = match input.find('\n') {
                Some(nl) => &input[nl + 1..],
                None => "",
            };
        } else {
            return input;
        }
    }
}

/// Convert source text into a token sequence terminated by an EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LispyError> {
    let mut rest = source;
    let mut tokens = Vec::new();

    loop {
        rest = skip_trivia(rest);
        if rest.is_empty() {
            break;
        }
        if rest.starts_with('"') && !rest[1..].contains('"') {
            return Err(LispyError::Lex("unterminated string literal".to_string()));
        }
        match lex_token(rest) {
            Ok((next, token)) => {
                tokens.push(token);
                rest = next;
            }
            Err(_) => {
                let snippet: String = rest.chars().take(16).collect();
                return Err(LispyError::Lex(format!(
                    "unexpected input near {:?}",
                    snippet
                )));
            }
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "EOF"));
    Ok(tokens)
}
