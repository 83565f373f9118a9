//! Formula translator — indicator formula → tokens → expression tree →
//! JavaScript expression text.

pub mod ast;
pub mod config;
pub mod emit;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use config::{ConfigError, FormulaConfig};
pub use error::{ErrorKind, FormulaError};
pub use functions::{Arity, FunctionRule, FunctionTable};
pub use lexer::tokenize;
pub use token::{Token, TokenKind};

use lazy_static::lazy_static;
use tracing::{debug, trace};

use emit::{Emitter, DEFAULT_FIELD_DELIMITER};
use parser::Parser;

lazy_static! {
    static ref DEFAULT_TRANSLATOR: Translator = Translator::new();
}

/// Translate a formula with the built-in function table.
pub fn translate(formula: &str) -> Result<String, FormulaError> {
    DEFAULT_TRANSLATOR.translate(formula)
}

/// The formula translator.
///
/// Holds an immutable function table and output settings; each call owns its
/// own tokens, so one translator can be shared across threads.
#[derive(Debug, Clone)]
pub struct Translator {
    functions: FunctionTable,
    field_delimiter: String,
}

impl Translator {
    pub fn new() -> Self {
        Self::with_functions(FunctionTable::builtin())
    }

    pub fn with_functions(functions: FunctionTable) -> Self {
        Self {
            functions,
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
        }
    }

    /// Build a translator from a loaded configuration.
    pub fn from_config(config: &FormulaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            functions: config.function_table()?,
            field_delimiter: config.field_delimiter.clone(),
        })
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn field_delimiter(&self) -> &str {
        &self.field_delimiter
    }

    /// Parse a formula into an expression tree.
    pub fn parse(&self, formula: &str) -> Result<Expr, FormulaError> {
        let tokens = tokenize(formula)?;
        trace!(count = tokens.len(), "tokenized formula");
        let mut parser = Parser::new(formula, tokens, &self.functions);
        parser.parse()
    }

    /// Translate a formula into JavaScript expression text.
    pub fn translate(&self, formula: &str) -> Result<String, FormulaError> {
        debug!(formula, "translating");
        let result = self
            .parse(formula)
            .and_then(|expr| Emitter::new(&self.functions, &self.field_delimiter).emit(&expr));
        match &result {
            Ok(output) => debug!(%output, "translated"),
            Err(err) => debug!(%err, "formula rejected"),
        }
        result
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn translate_arithmetic_passes_operators_through() {
        assert_eq!(translate("1 + 2 * 3 / 4 - 5").unwrap(), "1 + 2 * 3 / 4 - 5");
        assert_eq!(
            translate("$a < 1 <= 2 > 3 >= $b").unwrap(),
            "**a** < 1 <= 2 > 3 >= **b**"
        );
    }

    #[test]
    fn translate_field_reference() {
        assert_eq!(translate("$age").unwrap(), "**age**");
    }

    #[test]
    fn translate_equality_and_logic() {
        assert_eq!(translate("$a = 1").unwrap(), "**a** === 1");
        assert_eq!(translate("$a == 1").unwrap(), "**a** === 1");
        assert_eq!(translate("$a != 1").unwrap(), "**a** !== 1");
        assert_eq!(
            translate("$a > 1 AND $b OR !$c").unwrap(),
            "**a** > 1 && **b** || !**c**"
        );
    }

    #[test]
    fn translate_includes() {
        assert_eq!(
            translate(r#"INCLUDES($tags, "urgent")"#).unwrap(),
            r#"(**tags**).includes("urgent")"#
        );
        assert_eq!(
            translate("INCLUDES([1, 2, 3], $n + 1)").unwrap(),
            "([1, 2, 3]).includes(**n** + 1)"
        );
    }

    #[test]
    fn translate_percent() {
        assert_eq!(
            translate("PERCENT($done, $total) > 50").unwrap(),
            "percent(**done**, **total**) > 50"
        );
    }

    #[test]
    fn translate_countforms() {
        assert_eq!(
            translate("COUNTFORMS(Visit)").unwrap(),
            "countForms('Visit', [])"
        );
        assert_eq!(
            translate(r#"COUNTFORMS(Visit, $status = "done") >= 2"#).unwrap(),
            r#"countFormsWhere('Visit', [], `**status** === "done"`) >= 2"#
        );
    }

    #[test]
    fn translate_generic_renames() {
        assert_eq!(translate("MAX($a, 0)").unwrap(), "Math.max(**a**, 0)");
        assert_eq!(translate("TODAY()").unwrap(), "today()");
        assert_eq!(translate("SUM([])").unwrap(), "sum([])");
    }

    #[test]
    fn translate_unsupported_function() {
        assert_eq!(
            translate("FOO(1)").unwrap_err(),
            FormulaError::UnsupportedFunction {
                name: "FOO".to_string()
            }
        );
    }

    #[test]
    fn translate_reports_lex_and_syntax_kinds() {
        assert_eq!(translate(r#""abc"#).unwrap_err().kind(), ErrorKind::Lex);
        assert_eq!(translate("(1 + 2").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(translate("1 AND").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn translator_from_config() {
        let mut functions = BTreeMap::new();
        functions.insert("MEDIAN".to_string(), "median".to_string());
        let config = FormulaConfig {
            field_delimiter: "%%".to_string(),
            functions,
        };
        let translator = Translator::from_config(&config).unwrap();
        assert_eq!(translator.field_delimiter(), "%%");
        assert_eq!(
            translator.translate("MEDIAN($a, $b)").unwrap(),
            "median(%%a%%, %%b%%)"
        );
        assert!(translate("MEDIAN(1)").is_err());
    }

    #[test]
    fn translator_with_empty_table_rejects_calls() {
        let translator = Translator::with_functions(FunctionTable::empty());
        assert!(matches!(
            translator.translate("ABS(1)"),
            Err(FormulaError::UnsupportedFunction { .. })
        ));
        assert_eq!(translator.translate("1 + 1").unwrap(), "1 + 1");
    }

    #[test]
    fn translator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
    }
}
