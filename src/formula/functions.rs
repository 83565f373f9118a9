//! Function dispatch table.
//!
//! Every callable name in a formula must appear here. An entry either renames
//! the call and passes its arguments through, or applies a bespoke rewrite.

use std::collections::BTreeMap;

use super::ast::Expr;
use super::emit::Emitter;
use super::error::FormulaError;

/// Generic renames shipped with the translator.
const BUILTIN_RENAMES: &[(&str, &str)] = &[
    ("ABS", "Math.abs"),
    ("CEIL", "Math.ceil"),
    ("FLOOR", "Math.floor"),
    ("ROUND", "Math.round"),
    ("SQRT", "Math.sqrt"),
    ("POW", "Math.pow"),
    ("MIN", "Math.min"),
    ("MAX", "Math.max"),
    ("SUM", "sum"),
    ("AVG", "avg"),
    ("COUNT", "count"),
    ("LEN", "len"),
    ("IF", "iif"),
    ("ISEMPTY", "isEmpty"),
    ("TODAY", "today"),
    ("DAYS", "daysBetween"),
];

/// Number of arguments a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::Between(lo, hi) => (lo..=hi).contains(&n),
            Arity::Any => true,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exactly(k) => k.to_string(),
            Arity::Between(lo, hi) => format!("{lo} to {hi}"),
            Arity::Any => unreachable!("Arity::Any accepts every argument count"),
        }
    }
}

/// How one function name is translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionRule {
    /// `NAME(a, b)` becomes `target(a, b)`.
    Rename { target: String },
    /// `INCLUDES(list, item)` becomes `(list).includes(item)`.
    Includes,
    /// `PERCENT(a, b)` becomes `percent(a, b)`.
    Percent,
    /// `COUNTFORMS(Form)` becomes `countForms('Form', [])`; with a second
    /// argument the condition is embedded as a template string in a call to
    /// `countFormsWhere`.
    CountForms,
}

impl FunctionRule {
    pub fn rename(target: impl Into<String>) -> Self {
        FunctionRule::Rename {
            target: target.into(),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            FunctionRule::Rename { .. } => Arity::Any,
            FunctionRule::Includes | FunctionRule::Percent => Arity::Exactly(2),
            FunctionRule::CountForms => Arity::Between(1, 2),
        }
    }

    pub fn is_bespoke(&self) -> bool {
        !matches!(self, FunctionRule::Rename { .. })
    }

    /// Validate the argument shape of a call to `name`.
    pub fn check(&self, name: &str, args: &[Expr]) -> Result<(), FormulaError> {
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: arity.describe(),
                found: args.len(),
            });
        }

        if *self == FunctionRule::CountForms && args[0].as_identifier().is_none() {
            return Err(FormulaError::InvalidArgument {
                function: name.to_string(),
                message: "first argument must be a bare form name".to_string(),
            });
        }

        Ok(())
    }

    /// Produce the translation of a call whose arguments passed [`check`](Self::check).
    pub fn emit(&self, args: &[Expr], emitter: &Emitter<'_>) -> Result<String, FormulaError> {
        match self {
            FunctionRule::Rename { target } => {
                Ok(format!("{target}({})", emitter.emit_list(args)?))
            }
            FunctionRule::Includes => Ok(format!(
                "({}).includes({})",
                emitter.emit(&args[0])?,
                emitter.emit(&args[1])?
            )),
            FunctionRule::Percent => Ok(format!("percent({})", emitter.emit_list(args)?)),
            FunctionRule::CountForms => {
                let form = args[0].as_identifier().unwrap_or_default();
                match args.get(1) {
                    None => Ok(format!("countForms('{form}', [])")),
                    Some(condition) => Ok(format!(
                        "countFormsWhere('{form}', [], `{}`)",
                        escape_template(&emitter.emit(condition)?)
                    )),
                }
            }
        }
    }
}

/// Escape text for embedding in a JavaScript template literal.
fn escape_template(code: &str) -> String {
    code.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Closed mapping from allow-listed function names to their rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTable {
    rules: BTreeMap<String, FunctionRule>,
}

impl FunctionTable {
    /// An empty table; every call is rejected.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The bespoke functions plus the built-in rename table.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.insert("INCLUDES", FunctionRule::Includes);
        table.insert("PERCENT", FunctionRule::Percent);
        table.insert("COUNTFORMS", FunctionRule::CountForms);
        for (name, target) in BUILTIN_RENAMES {
            table.insert(*name, FunctionRule::rename(*target));
        }
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: FunctionRule) -> Option<FunctionRule> {
        self.rules.insert(name.into(), rule)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionRule> {
        self.rules.get(name)
    }

    /// Look up `name`, failing for anything outside the allow-list.
    pub fn resolve(&self, name: &str) -> Result<&FunctionRule, FormulaError> {
        self.get(name).ok_or_else(|| FormulaError::UnsupportedFunction {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Expr {
        Expr::Number(s.to_string())
    }

    #[test]
    fn builtin_contains_bespoke_and_renames() {
        let table = FunctionTable::builtin();
        assert_eq!(table.get("INCLUDES"), Some(&FunctionRule::Includes));
        assert_eq!(table.get("PERCENT"), Some(&FunctionRule::Percent));
        assert_eq!(table.get("COUNTFORMS"), Some(&FunctionRule::CountForms));
        assert_eq!(table.get("ABS"), Some(&FunctionRule::rename("Math.abs")));
        assert_eq!(table.len(), 3 + BUILTIN_RENAMES.len());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = FunctionTable::builtin();
        assert!(table.get("includes").is_none());
    }

    #[test]
    fn resolve_unknown_name_is_unsupported() {
        let table = FunctionTable::builtin();
        assert_eq!(
            table.resolve("FOO"),
            Err(FormulaError::UnsupportedFunction {
                name: "FOO".to_string()
            })
        );
    }

    #[test]
    fn empty_table_rejects_everything() {
        let table = FunctionTable::empty();
        assert!(table.is_empty());
        assert!(table.resolve("ABS").is_err());
    }

    #[test]
    fn arity_accepts() {
        assert!(Arity::Exactly(2).accepts(2));
        assert!(!Arity::Exactly(2).accepts(3));
        assert!(Arity::Between(1, 2).accepts(1));
        assert!(!Arity::Between(1, 2).accepts(0));
        assert!(Arity::Any.accepts(0));
    }

    #[test]
    fn includes_checks_argument_count() {
        let err = FunctionRule::Includes
            .check("INCLUDES", &[num("1")])
            .unwrap_err();
        assert_eq!(
            err,
            FormulaError::ArgumentCount {
                function: "INCLUDES".to_string(),
                expected: "2".to_string(),
                found: 1,
            }
        );
    }

    #[test]
    fn countforms_requires_form_name() {
        let err = FunctionRule::CountForms
            .check("COUNTFORMS", &[num("1")])
            .unwrap_err();
        assert!(matches!(err, FormulaError::InvalidArgument { .. }));
        assert!(FunctionRule::CountForms
            .check("COUNTFORMS", &[Expr::Identifier("Visit".to_string())])
            .is_ok());
    }

    #[test]
    fn rename_accepts_any_argument_count() {
        assert!(FunctionRule::rename("today").check("TODAY", &[]).is_ok());
        let args: Vec<Expr> = (0..20).map(|i| num(&i.to_string())).collect();
        assert!(FunctionRule::rename("Math.max").check("MAX", &args).is_ok());
    }

    #[test]
    fn escape_template_special_characters() {
        assert_eq!(escape_template(r"a\b"), r"a\\b");
        assert_eq!(escape_template("`x`"), r"\`x\`");
        assert_eq!(escape_template("${x}"), r"\${x}");
    }
}
