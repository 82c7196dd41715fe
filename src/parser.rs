// ABOUTME: Parser folding the token stream into S-expression trees

use crate::error::LispyError;
use crate::lexer::{Token, TokenKind};
use crate::value::{make_list, Function, Symbol, Value};
use std::rc::Rc;

/// Parse a whole token sequence into the ordered top-level forms.
pub fn parse(tokens: &[Token]) -> Result<Vec<Value>, LispyError> {
    let mut nodes = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() && tokens[idx].kind != TokenKind::Eof {
        let (expr, used) = parse_expr(&tokens[idx..])?;
        idx += used;
        nodes.push(expr);
    }
    Ok(nodes)
}

fn unexpected_end() -> LispyError {
    LispyError::Parse("unexpected end of input".to_string())
}

/// Parses one expression from the front of the slice, returning the value
/// and the number of tokens consumed.
fn parse_expr(tokens: &[Token]) -> Result<(Value, usize), LispyError> {
    let token = tokens.first().ok_or_else(unexpected_end)?;
    match token.kind {
        TokenKind::Integer => {
            let n = token.literal.parse::<i64>().map_err(|_| {
                LispyError::Parse(format!("invalid integer literal {:?}", token.literal))
            })?;
            Ok((Value::Int(n), 1))
        }
        TokenKind::Float => {
            let n = token.literal.parse::<f64>().map_err(|_| {
                LispyError::Parse(format!("invalid float literal {:?}", token.literal))
            })?;
            Ok((Value::Float(n), 1))
        }
        TokenKind::String
        | TokenKind::True
        | TokenKind::False
        | TokenKind::If
        | TokenKind::Do
        | TokenKind::Define
        | TokenKind::Macro
        | TokenKind::Symbol => Ok((
            Value::Sym(Symbol::new(token.kind, token.literal.clone())),
            1,
        )),
        TokenKind::Quote => {
            // 'EXPR expands to (quote EXPR)
            let (inner, used) = parse_expr(&tokens[1..])?;
            let quote = Value::Sym(Symbol::new(TokenKind::Quote, "quote"));
            Ok((make_list(vec![quote, inner]), 1 + used))
        }
        TokenKind::LSquare => parse_array(tokens),
        TokenKind::LParen => parse_form(tokens),
        TokenKind::RParen => Err(LispyError::Parse("unexpected )".to_string())),
        TokenKind::RSquare => Err(LispyError::Parse("unexpected ]".to_string())),
        TokenKind::Eof => Err(unexpected_end()),
    }
}

/// Parses a parenthesized form, dispatching on the token after the opener:
/// empty list, define form, macro form, anonymous fn, or plain list.
fn parse_form(tokens: &[Token]) -> Result<(Value, usize), LispyError> {
    let next = tokens.get(1).ok_or_else(unexpected_end)?;
    match next.kind {
        TokenKind::RParen => Ok((Value::empty(), 2)),
        TokenKind::Define => parse_define(tokens),
        TokenKind::Macro => parse_macro(tokens),
        TokenKind::Symbol
            if next.literal == "fn"
                && matches!(
                    tokens.get(2).map(|t| t.kind),
                    Some(TokenKind::LSquare)
                ) =>
        {
            let (func, used) = parse_function_literal(&tokens[2..], "fn", false)?;
            Ok((func, 2 + used))
        }
        TokenKind::Eof => Err(LispyError::Parse("unbalanced parentheses".to_string())),
        _ => parse_list(tokens),
    }
}

/// Parses `(define NAME [params] BODY)` into a function literal, or
/// `(define NAME EXPR)` into a binding form `(define NAME EXPR)`.
fn parse_define(tokens: &[Token]) -> Result<(Value, usize), LispyError> {
    let name_token = tokens.get(2).ok_or_else(unexpected_end)?;
    if name_token.kind != TokenKind::Symbol {
        return Err(LispyError::Parse(format!(
            "define: expected a name symbol, found {:?}",
            name_token.literal
        )));
    }
    let name = name_token.literal.clone();

    if matches!(tokens.get(3).map(|t| t.kind), Some(TokenKind::LSquare)) {
        let (func, used) = parse_function_literal(&tokens[3..], &name, false)?;
        return Ok((func, 3 + used));
    }

    let (value, used) = parse_expr(&tokens[3..])?;
    let mut idx = 3 + used;
    expect_rparen(tokens, idx, "define")?;
    idx += 1;
    let form = make_list(vec![
        Value::Sym(Symbol::new(TokenKind::Define, "define")),
        Value::Sym(Symbol::new(TokenKind::Symbol, name)),
        value,
    ]);
    Ok((form, idx))
}

/// Parses `(macro NAME [param] BODY)`. Macros take exactly one formal,
/// which is bound to the unevaluated argument list at expansion time.
fn parse_macro(tokens: &[Token]) -> Result<(Value, usize), LispyError> {
    let name_token = tokens.get(2).ok_or_else(unexpected_end)?;
    if name_token.kind != TokenKind::Symbol {
        return Err(LispyError::Parse(format!(
            "macro: expected a name symbol, found {:?}",
            name_token.literal
        )));
    }
    let name = name_token.literal.clone();
    if !matches!(tokens.get(3).map(|t| t.kind), Some(TokenKind::LSquare)) {
        return Err(LispyError::Parse(format!(
            "macro {}: expected a parameter vector",
            name
        )));
    }
    let (func, used) = parse_function_literal(&tokens[3..], &name, true)?;
    Ok((func, 3 + used))
}

/// Parses `[params] BODY )` starting at the parameter vector and consuming
/// the closing paren of the surrounding form.
fn parse_function_literal(
    tokens: &[Token],
    name: &str,
    is_macro: bool,
) -> Result<(Value, usize), LispyError> {
    let first = tokens.first().ok_or_else(unexpected_end)?;
    if first.kind != TokenKind::LSquare {
        return Err(LispyError::Parse(format!(
            "{}: expected a parameter vector",
            name
        )));
    }
    let (params, mut idx) = parse_params(tokens)?;
    if is_macro && params.len() != 1 {
        return Err(LispyError::Parse(format!(
            "macro {}: expected exactly one parameter, found {}",
            name,
            params.len()
        )));
    }

    let (body, used) = parse_expr(&tokens[idx..])?;
    idx += used;
    expect_rparen(tokens, idx, name)?;
    idx += 1;

    let func = Function {
        name: name.to_string(),
        params,
        body: Some(body),
        is_macro,
        native: None,
        env: None,
    };
    Ok((Value::Fn(Rc::new(func)), idx))
}

fn parse_params(tokens: &[Token]) -> Result<(Vec<Symbol>, usize), LispyError> {
    let mut idx = 1; // past the [
    let mut params = Vec::new();
    loop {
        let token = tokens.get(idx).ok_or_else(unexpected_end)?;
        match token.kind {
            TokenKind::RSquare => return Ok((params, idx + 1)),
            TokenKind::Symbol => {
                params.push(Symbol::new(TokenKind::Symbol, token.literal.clone()));
                idx += 1;
            }
            TokenKind::Eof => {
                return Err(LispyError::Parse("unbalanced brackets".to_string()));
            }
            _ => {
                return Err(LispyError::Parse(format!(
                    "parameter vectors may contain only symbols, found {:?}",
                    token.literal
                )));
            }
        }
    }
}

/// Parses `[e1 e2 ...]` into an array value.
fn parse_array(tokens: &[Token]) -> Result<(Value, usize), LispyError> {
    let mut idx = 1; // past the [
    let mut items = Vec::new();
    loop {
        let token = tokens.get(idx).ok_or_else(unexpected_end)?;
        match token.kind {
            TokenKind::RSquare => return Ok((Value::Array(items), idx + 1)),
            TokenKind::Eof => {
                return Err(LispyError::Parse("unbalanced brackets".to_string()));
            }
            _ => {
                let (expr, used) = parse_expr(&tokens[idx..])?;
                items.push(expr);
                idx += used;
            }
        }
    }
}

/// Parses `(e1 e2 ...)` into a right-folded chain of pairs.
fn parse_list(tokens: &[Token]) -> Result<(Value, usize), LispyError> {
    let mut idx = 1; // past the (
    let mut items = Vec::new();
    loop {
        let token = tokens.get(idx).ok_or_else(unexpected_end)?;
        match token.kind {
            TokenKind::RParen => return Ok((make_list(items), idx + 1)),
            TokenKind::Eof => {
                return Err(LispyError::Parse("unbalanced parentheses".to_string()));
            }
            _ => {
                let (expr, used) = parse_expr(&tokens[idx..])?;
                items.push(expr);
                idx += used;
            }
        }
    }
}

fn expect_rparen(tokens: &[Token], idx: usize, context: &str) -> Result<(), LispyError> {
    match tokens.get(idx) {
        Some(t) if t.kind == TokenKind::RParen => Ok(()),
        Some(t) if t.kind == TokenKind::Eof => Err(LispyError::Parse(format!(
            "{}: unbalanced parentheses",
            context
        ))),
        Some(t) => Err(LispyError::Parse(format!(
            "{}: expected ) but found {:?}",
            context, t.literal
        ))),
        None => Err(unexpected_end()),
    }
}
