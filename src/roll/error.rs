use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("result is too large")]
    Overflow,
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
}
