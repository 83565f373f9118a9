//! indicator-formula — translates indicator formulas into JavaScript
//! expression text.

pub mod formula;

pub use formula::{translate, FormulaError, Translator};
