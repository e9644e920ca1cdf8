use crate::parse::ParseError;
use crate::roll::EvalError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    #[error("{0}")]
    Syntax(#[from] ParseError),
    #[error("Invalid dice type: d{sides}")]
    InvalidDiceType { sides: u64 },
    #[error("Dice count exceeded: {count} dice requested, the maximum is {max}")]
    DiceCountExceeded { count: u64, max: usize },
    #[error("Unknown variable: @{0}")]
    UnknownVariable(String),
    #[error("{0}")]
    Eval(#[from] EvalError),
}
