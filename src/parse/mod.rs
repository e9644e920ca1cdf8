pub mod ast;
mod error;
mod lexer;
mod parser;
mod substitute;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::TokenKind;

use crate::{config::EngineConfig, error::DiceError};

pub(crate) use substitute::substitute;
pub use substitute::Variables;

/// Parses a formula into its flat token list, validating every dice
/// sub-expression against `config`.
pub(crate) fn parse(s: &str, config: &EngineConfig) -> Result<Vec<ast::FormulaToken>, DiceError> {
    parser::Parser::new(s, config).parse()
}

/// Like [`parse`], reading each `@name` placeholder as the static value
/// `variables` holds for it.
pub(crate) fn parse_with_variables(
    s: &str,
    config: &EngineConfig,
    variables: &Variables,
) -> Result<Vec<ast::FormulaToken>, DiceError> {
    parser::Parser::new(s, config)
        .with_variables(variables)
        .parse()
}
