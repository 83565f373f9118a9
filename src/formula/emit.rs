//! Code emission — turns an [`Expr`] tree into JavaScript expression text.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::FormulaError;
use super::functions::FunctionTable;

/// Delimiter wrapped around field names when no other is configured.
pub const DEFAULT_FIELD_DELIMITER: &str = "**";

/// Writes target text for expressions using one function table.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'t> {
    functions: &'t FunctionTable,
    field_delimiter: &'t str,
}

impl<'t> Emitter<'t> {
    pub fn new(functions: &'t FunctionTable, field_delimiter: &'t str) -> Self {
        Self {
            functions,
            field_delimiter,
        }
    }

    pub fn emit(&self, expr: &Expr) -> Result<String, FormulaError> {
        match expr {
            Expr::Identifier(text) | Expr::Str(text) | Expr::Number(text) => Ok(text.clone()),
            Expr::Field(name) => Ok(format!(
                "{delim}{name}{delim}",
                delim = self.field_delimiter
            )),
            Expr::Unary { op, operand } => {
                Ok(format!("{}{}", unary_symbol(*op), self.emit(operand)?))
            }
            Expr::Group(inner) => Ok(format!("({})", self.emit(inner)?)),
            Expr::Chain { first, rest } => {
                let mut out = self.emit(first)?;
                for (op, operand) in rest {
                    out.push(' ');
                    out.push_str(binary_symbol(*op));
                    out.push(' ');
                    out.push_str(&self.emit(operand)?);
                }
                Ok(out)
            }
            Expr::Call { name, args } => {
                let rule = self.functions.resolve(name)?;
                rule.check(name, args)?;
                rule.emit(args, self)
            }
            Expr::List(items) => Ok(format!("[{}]", self.emit_list(items)?)),
        }
    }

    /// Emit expressions separated by `, `.
    pub fn emit_list(&self, items: &[Expr]) -> Result<String, FormulaError> {
        let parts = items
            .iter()
            .map(|item| self.emit(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(", "))
    }
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Minus => "-",
        UnaryOp::Not => "!",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Less => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::Equal => "===",
        BinaryOp::NotEqual => "!==",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}
