//! Expression tree for indicator formulas.
//!
//! The grammar has no precedence levels, so a run of binary operators is
//! kept as one flat [`Expr::Chain`] in source order.

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare name passed through unchanged.
    Identifier(String),
    /// A field reference, stored without its `$` marker.
    Field(String),
    /// A string literal including its quotes and escapes.
    Str(String),
    /// A numeric literal as written.
    Number(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// A parenthesized sub-expression.
    Group(Box<Expr>),
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
}

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Binary operator between two operands of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl Expr {
    /// Fold an operand and its trailing operators into one expression.
    pub fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
        if rest.is_empty() {
            first
        } else {
            Expr::Chain {
                first: Box::new(first),
                rest,
            }
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }
}
