//! Parser for indicator formulas.
//!
//! A recursive-descent parser over the token stream with one token of
//! lookahead. Each routine is told which token kind should follow the
//! construct it parses; that terminator is peeked, never consumed.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::FormulaError;
use super::functions::FunctionTable;
use super::token::{Token, TokenKind};

/// Deepest nesting of groups, lists, calls and prefix operators accepted.
pub const MAX_DEPTH: usize = 128;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    functions: &'a FunctionTable,
}

impl<'a> Parser<'a> {
    /// `source` is the formula the tokens were lexed from; it is only used
    /// to report the unparsed remainder in errors.
    pub fn new(source: &'a str, mut tokens: Vec<Token>, functions: &'a FunctionTable) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::End) {
            tokens.push(Token::end(source.len()));
        }
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
            functions,
        }
    }

    /// Parse a complete formula.
    pub fn parse(&mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_expression(TokenKind::End)?;
        self.expect(TokenKind::End)?;
        Ok(expr)
    }

    /// Parse operands joined by binary operators until `terminator` is next.
    ///
    /// A `Comma` terminator also stops at `)`, so the last call argument
    /// ends cleanly; an `RBracket` terminator also stops at `,` between
    /// list elements.
    pub fn parse_expression(&mut self, terminator: TokenKind) -> Result<Expr, FormulaError> {
        let first = self.parse_primary()?;
        let mut rest = Vec::new();

        while !accepts(terminator, self.peek().kind) {
            let op = self.parse_binary_operator()?;
            let operand = self.parse_primary()?;
            rest.push((op, operand));
        }

        Ok(Expr::chain(first, rest))
    }

    /// Parse comma-separated expressions for a call (`Comma`) or an array
    /// literal (`RBracket`). The closer itself is left for the caller.
    pub fn parse_list(&mut self, terminator: TokenKind) -> Result<Vec<Expr>, FormulaError> {
        let mut items = Vec::new();
        if self.peek().kind.is_closer() {
            return Ok(items);
        }

        loop {
            items.push(self.parse_expression(terminator)?);
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        let token = self.advance();
        match token.kind {
            TokenKind::End => Err(FormulaError::UnexpectedEnd),
            TokenKind::Identifier if is_logical_keyword(&token) => Err(self.unexpected(&token)),
            TokenKind::Identifier => {
                if self.check(TokenKind::LParen) {
                    self.nested(token.offset, |p| p.parse_call(token.text))
                } else {
                    Ok(Expr::Identifier(token.text))
                }
            }
            TokenKind::Field => Ok(Expr::Field(token.text[1..].to_string())),
            TokenKind::Str => Ok(Expr::Str(token.text)),
            TokenKind::Number => Ok(Expr::Number(token.text)),
            TokenKind::Plus | TokenKind::Minus => {
                let next = self.peek();
                if next.kind.is_sign() {
                    return Err(FormulaError::ConsecutiveSigns {
                        offset: next.offset,
                        remaining: self.remaining_from(next.offset),
                    });
                }
                let op = if token.kind == TokenKind::Plus {
                    UnaryOp::Plus
                } else {
                    UnaryOp::Minus
                };
                self.nested(token.offset, |p| p.unary(op))
            }
            TokenKind::Bang => self.nested(token.offset, |p| p.unary(UnaryOp::Not)),
            TokenKind::LParen => self.nested(token.offset, |p| {
                let inner = p.parse_expression(TokenKind::RParen)?;
                p.expect(TokenKind::RParen)?;
                Ok(Expr::Group(Box::new(inner)))
            }),
            TokenKind::LBracket => self.nested(token.offset, |p| {
                let items = p.parse_list(TokenKind::RBracket)?;
                p.expect(TokenKind::RBracket)?;
                Ok(Expr::List(items))
            }),
            _ => Err(self.unexpected(&token)),
        }
    }

    fn unary(&mut self, op: UnaryOp) -> Result<Expr, FormulaError> {
        let operand = self.parse_primary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// `name` has been consumed and `(` is next.
    fn parse_call(&mut self, name: String) -> Result<Expr, FormulaError> {
        let functions = self.functions;
        let rule = functions.resolve(&name)?;
        self.expect(TokenKind::LParen)?;
        let args = self.parse_list(TokenKind::Comma)?;
        self.expect(TokenKind::RParen)?;
        rule.check(&name, &args)?;
        Ok(Expr::Call { name, args })
    }

    fn parse_binary_operator(&mut self) -> Result<BinaryOp, FormulaError> {
        let token = self.advance();
        match token.kind {
            TokenKind::End => Err(FormulaError::UnexpectedEnd),
            kind if kind.is_transparent_operator() => {
                transparent_operator(kind).ok_or_else(|| self.unexpected(&token))
            }
            TokenKind::Equal => Ok(BinaryOp::Equal),
            TokenKind::NotEqual => Ok(BinaryOp::NotEqual),
            TokenKind::Identifier if token.is_word("AND") => Ok(BinaryOp::And),
            TokenKind::Identifier if token.is_word("OR") => Ok(BinaryOp::Or),
            _ => Err(self.unexpected(&token)),
        }
    }

    // --- Utility methods ---

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::NestingTooDeep { offset });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Consume the next token. `End` is never consumed past.
    fn advance(&mut self) -> Token {
        let t = self.peek().clone();
        if t.kind != TokenKind::End {
            self.pos += 1;
        }
        t
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, FormulaError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let t = self.peek().clone();
        if t.kind == TokenKind::End {
            Err(FormulaError::UnexpectedEnd)
        } else {
            Err(self.unexpected(&t))
        }
    }

    fn unexpected(&self, token: &Token) -> FormulaError {
        FormulaError::UnexpectedToken {
            found: token.to_string(),
            offset: token.offset,
            remaining: self.remaining_from(token.offset + token.text.len()),
        }
    }

    fn remaining_from(&self, offset: usize) -> String {
        self.source.get(offset..).unwrap_or("").trim().to_string()
    }
}

fn accepts(terminator: TokenKind, kind: TokenKind) -> bool {
    match terminator {
        TokenKind::Comma => matches!(kind, TokenKind::Comma | TokenKind::RParen),
        TokenKind::RBracket => matches!(kind, TokenKind::RBracket | TokenKind::Comma),
        other => kind == other,
    }
}

fn is_logical_keyword(token: &Token) -> bool {
    token.is_word("AND") || token.is_word("OR")
}

/// Operators copied to the output as written.
fn transparent_operator(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Less => Some(BinaryOp::Less),
        TokenKind::LessEqual => Some(BinaryOp::LessEqual),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
        _ => None,
    }
}
