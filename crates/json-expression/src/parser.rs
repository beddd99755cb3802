//! Expression parser.
//!
//! A hand-written precedence-climbing parser over the raw source text.
//! Positions in errors are byte offsets into the source.

use crate::ast::{BinaryOp, Expr, LogicalOp, PropKey, UnaryOp};
use crate::error::ExprError;
use crate::util;
use serde_json::Value;

const PRECEDENCE_NULLISH: u8 = 1;
const PRECEDENCE_LOGICAL_OR: u8 = 2;
const PRECEDENCE_LOGICAL_AND: u8 = 3;
const PRECEDENCE_EQUALITY: u8 = 4;
const PRECEDENCE_RELATIONAL: u8 = 5;
const PRECEDENCE_ADDITIVE: u8 = 6;
const PRECEDENCE_MULTIPLICATIVE: u8 = 7;

/// An infix operator recognised at the current position.
#[derive(Clone, Copy)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl Infix {
    fn precedence(self) -> u8 {
        match self {
            Infix::Logical(LogicalOp::Nullish) => PRECEDENCE_NULLISH,
            Infix::Logical(LogicalOp::Or) => PRECEDENCE_LOGICAL_OR,
            Infix::Logical(LogicalOp::And) => PRECEDENCE_LOGICAL_AND,
            Infix::Binary(BinaryOp::Eq | BinaryOp::Ne) => PRECEDENCE_EQUALITY,
            Infix::Binary(BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge) => {
                PRECEDENCE_RELATIONAL
            }
            Infix::Binary(BinaryOp::Add | BinaryOp::Sub) => PRECEDENCE_ADDITIVE,
            Infix::Binary(BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod) => {
                PRECEDENCE_MULTIPLICATIVE
            }
        }
    }
}

// Longest operators first so `===` is not read as `==`.
const INFIX_OPERATORS: &[(&str, Infix)] = &[
    ("===", Infix::Binary(BinaryOp::Eq)),
    ("!==", Infix::Binary(BinaryOp::Ne)),
    ("==", Infix::Binary(BinaryOp::Eq)),
    ("!=", Infix::Binary(BinaryOp::Ne)),
    ("<=", Infix::Binary(BinaryOp::Le)),
    (">=", Infix::Binary(BinaryOp::Ge)),
    ("&&", Infix::Logical(LogicalOp::And)),
    ("||", Infix::Logical(LogicalOp::Or)),
    ("??", Infix::Logical(LogicalOp::Nullish)),
    ("<", Infix::Binary(BinaryOp::Lt)),
    (">", Infix::Binary(BinaryOp::Gt)),
    ("+", Infix::Binary(BinaryOp::Add)),
    ("-", Infix::Binary(BinaryOp::Sub)),
    ("*", Infix::Binary(BinaryOp::Mul)),
    ("/", Infix::Binary(BinaryOp::Div)),
    ("%", Infix::Binary(BinaryOp::Mod)),
];

/// Expression parser.
pub struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    /// Parse an expression source into a syntax tree.
    pub fn parse(input: &'a str) -> Result<Expr, ExprError> {
        let mut parser = Self { input, pos: 0 };
        parser.skip_whitespace();
        if parser.is_at_end() {
            return Err(ExprError::syntax("empty expression", 0));
        }
        let expr = parser.parse_sequence()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(expr),
            Some(c) => Err(ExprError::syntax(
                format!("unexpected character '{}'", c),
                parser.pos,
            )),
        }
    }

    fn parse_sequence(&mut self) -> Result<Expr, ExprError> {
        let mut statements = vec![self.parse_assignment()?];
        loop {
            self.skip_whitespace();
            if self.peek() != Some(';') {
                break;
            }
            self.advance();
            self.skip_whitespace();
            // Trailing semicolon.
            if self.is_at_end() {
                break;
            }
            statements.push(self.parse_assignment()?);
        }
        if statements.len() == 1 {
            Ok(statements.remove(0))
        } else {
            Ok(Expr::Sequence(statements))
        }
    }

    fn parse_assignment(&mut self) -> Result<Expr, ExprError> {
        let start = self.pos;
        let target = self.parse_conditional()?;
        self.skip_whitespace();
        if self.peek() == Some('=') && !self.rest().starts_with("==") {
            if !target.is_assignable() {
                return Err(ExprError::syntax("invalid assignment target", start));
            }
            self.advance();
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        Ok(target)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ExprError> {
        let test = self.parse_binary(PRECEDENCE_NULLISH)?;
        self.skip_whitespace();
        if self.peek() == Some('?') && !self.rest().starts_with("??") {
            self.advance();
            let consequent = self.parse_assignment()?;
            self.skip_whitespace();
            self.expect(':')?;
            let alternate = self.parse_assignment()?;
            return Ok(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            });
        }
        Ok(test)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            let Some((symbol, infix)) = self.peek_infix() else {
                break;
            };
            let precedence = infix.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += symbol.len();
            let right = self.parse_binary(precedence + 1)?;
            left = match infix {
                Infix::Binary(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Infix::Logical(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn peek_infix(&self) -> Option<(&'static str, Infix)> {
        let rest = self.rest();
        INFIX_OPERATORS
            .iter()
            .find(|(symbol, _)| rest.starts_with(symbol))
            .copied()
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        let op = match self.peek() {
            Some('!') => Some(UnaryOp::Not),
            Some('-') => Some(UnaryOp::Neg),
            Some('+') => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        if self.peek_keyword("typeof") {
            self.pos += "typeof".len();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::TypeOf,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('.') => {
                    self.advance();
                    self.skip_whitespace();
                    let name = self.parse_identifier()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(Expr::Literal(Value::String(name))),
                    };
                }
                Some('[') => {
                    self.advance();
                    let property = self.parse_assignment()?;
                    self.skip_whitespace();
                    self.expect(']')?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                    };
                }
                Some('(') => {
                    self.advance();
                    let args = self.parse_list(')')?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        match self.peek() {
            Some('0'..='9') => self.parse_number(),
            Some('.') if matches!(self.peek_nth(1), Some('0'..='9')) => self.parse_number(),
            Some('\'') | Some('"') => Ok(Expr::Literal(Value::String(self.parse_string()?))),
            Some('(') => {
                self.advance();
                let expr = self.parse_assignment()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(expr)
            }
            Some('[') => {
                self.advance();
                Ok(Expr::Array(self.parse_list(']')?))
            }
            Some('{') => self.parse_object(),
            Some(c) if is_identifier_start(c) => {
                let name = self.parse_identifier()?;
                Ok(match name.as_str() {
                    "true" => Expr::Literal(Value::Bool(true)),
                    "false" => Expr::Literal(Value::Bool(false)),
                    "null" => Expr::Literal(Value::Null),
                    "undefined" => Expr::Undefined,
                    _ => Expr::Ident(name),
                })
            }
            Some(c) => Err(ExprError::syntax(
                format!("unexpected character '{}'", c),
                self.pos,
            )),
            None => Err(ExprError::syntax("unexpected end of expression", self.pos)),
        }
    }

    /// Comma separated expressions up to `close`, trailing comma allowed.
    fn parse_list(&mut self, close: char) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.advance();
                break;
            }
            items.push(self.parse_assignment()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(c) if c == close => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    return Err(ExprError::syntax(
                        format!("expected ',' or '{}', found '{}'", close, c),
                        self.pos,
                    ))
                }
                None => {
                    return Err(ExprError::syntax(
                        format!("expected '{}'", close),
                        self.pos,
                    ))
                }
            }
        }
        Ok(items)
    }

    fn parse_object(&mut self) -> Result<Expr, ExprError> {
        self.expect('{')?;
        let mut props = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.advance();
                break;
            }
            let key = match self.peek() {
                Some('\'') | Some('"') => PropKey::Static(self.parse_string()?),
                Some('[') => {
                    self.advance();
                    let key = self.parse_assignment()?;
                    self.skip_whitespace();
                    self.expect(']')?;
                    PropKey::Computed(key)
                }
                Some('0'..='9') => match self.parse_number()? {
                    Expr::Literal(n) => PropKey::Static(n.to_string()),
                    _ => return Err(ExprError::syntax("invalid property key", self.pos)),
                },
                Some(c) if is_identifier_start(c) => {
                    let name = self.parse_identifier()?;
                    self.skip_whitespace();
                    if matches!(self.peek(), Some(',') | Some('}')) {
                        // Shorthand `{name}`.
                        props.push((PropKey::Static(name.clone()), Expr::Ident(name)));
                        if self.object_separator()? {
                            break;
                        }
                        continue;
                    }
                    PropKey::Static(name)
                }
                Some(c) => {
                    return Err(ExprError::syntax(
                        format!("unexpected character '{}' in object literal", c),
                        self.pos,
                    ))
                }
                None => return Err(ExprError::syntax("unterminated object literal", self.pos)),
            };
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_assignment()?;
            props.push((key, value));
            if self.object_separator()? {
                break;
            }
        }
        Ok(Expr::Object(props))
    }

    /// Consumes `,` or `}` after an object property. Returns true on `}`.
    fn object_separator(&mut self) -> Result<bool, ExprError> {
        self.skip_whitespace();
        match self.peek() {
            Some(',') => {
                self.advance();
                Ok(false)
            }
            Some('}') => {
                self.advance();
                Ok(true)
            }
            Some(c) => Err(ExprError::syntax(
                format!("expected ',' or '}}', found '{}'", c),
                self.pos,
            )),
            None => Err(ExprError::syntax("unterminated object literal", self.pos)),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, ExprError> {
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_nth(1), Some('0'..='9')) {
            self.advance();
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if matches!(self.peek(), Some('0'..='9')) {
                while matches!(self.peek(), Some('0'..='9')) {
                    self.advance();
                }
            } else {
                self.pos = mark;
            }
        }
        let text = &self.input[start..self.pos];
        let n: f64 = text
            .parse()
            .map_err(|_| ExprError::syntax(format!("invalid number '{}'", text), start))?;
        util::number_value(n)
            .map(Expr::Literal)
            .ok_or_else(|| ExprError::syntax(format!("invalid number '{}'", text), start))
    }

    fn parse_string(&mut self) -> Result<String, ExprError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(ExprError::syntax("expected string", start)),
        };
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(ExprError::syntax("unclosed string", start)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{0008}',
                        Some('f') => '\u{000C}',
                        Some('0') => '\0',
                        Some('u') => {
                            self.advance();
                            let code = self.parse_hex4()?;
                            result.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                            continue;
                        }
                        Some(c) => c,
                        None => return Err(ExprError::syntax("unclosed string", start)),
                    };
                    result.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
        Ok(result)
    }

    fn parse_hex4(&mut self) -> Result<u32, ExprError> {
        let start = self.pos;
        let digits = self.rest().get(..4).unwrap_or("");
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ExprError::syntax("invalid unicode escape", start));
        }
        self.pos += 4;
        u32::from_str_radix(digits, 16).map_err(|_| ExprError::syntax("invalid unicode escape", start))
    }

    fn parse_identifier(&mut self) -> Result<String, ExprError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_identifier_start(c) => self.advance(),
            Some(c) => {
                return Err(ExprError::syntax(
                    format!("expected identifier, found '{}'", c),
                    start,
                ))
            }
            None => return Err(ExprError::syntax("expected identifier", start)),
        }
        while matches!(self.peek(), Some(c) if is_identifier_part(c)) {
            self.advance();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(keyword)
            && !rest[keyword.len()..]
                .chars()
                .next()
                .is_some_and(is_identifier_part)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ExprError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(ExprError::syntax(
                format!("expected '{}', found '{}'", expected, c),
                self.pos,
            )),
            None => Err(ExprError::syntax(
                format!("expected '{}', found end of expression", expected),
                self.pos,
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
