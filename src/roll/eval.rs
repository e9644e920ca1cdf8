use super::error::EvalError;
use super::token::{Resolved, ResolvedToken};
use crate::common::{Int, Operator};

type EResult<T = Int> = Result<T, EvalError>;

/// Reduces resolved tokens to a single total, honoring `*` and `/` over `+`
/// and `-` and parentheses. Division truncates toward zero.
pub fn reduce(tokens: &[ResolvedToken]) -> EResult {
    let mut reducer = Reducer { tokens, position: 0 };
    let total = reducer.reduce_addition()?;
    if reducer.position < tokens.len() {
        return Err(EvalError::UnexpectedToken(reducer.position));
    }
    Ok(total)
}

struct Reducer<'t> {
    tokens: &'t [ResolvedToken],
    position: usize,
}

impl<'t> Reducer<'t> {
    fn peek_operator(&self) -> Option<Operator> {
        self.tokens.get(self.position).and_then(ResolvedToken::as_operator)
    }

    fn advance(&mut self) -> Option<&'t ResolvedToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn reduce_addition(&mut self) -> EResult {
        let mut lhs = self.reduce_multiplication()?;

        while let Some(op) = self.peek_operator().filter(|op| op.is_additive()) {
            self.position += 1;
            let rhs = self.reduce_multiplication()?;
            lhs = match op {
                Operator::Add => lhs.checked_add(rhs),
                _ => lhs.checked_sub(rhs),
            }
            .ok_or(EvalError::Overflow)?;
        }

        Ok(lhs)
    }

    fn reduce_multiplication(&mut self) -> EResult {
        let mut lhs = self.reduce_unary_prefix()?;

        while let Some(op) = self.peek_operator().filter(|op| op.is_multiplicative()) {
            self.position += 1;
            let rhs = self.reduce_unary_prefix()?;
            lhs = match op {
                Operator::Mul => lhs.checked_mul(rhs).ok_or(EvalError::Overflow)?,
                _ if rhs == 0 => return Err(EvalError::DivisionByZero),
                _ => lhs.checked_div(rhs).ok_or(EvalError::Overflow)?,
            };
        }

        Ok(lhs)
    }

    fn reduce_unary_prefix(&mut self) -> EResult {
        match self.peek_operator() {
            Some(Operator::Add) => {
                self.position += 1;
                self.reduce_unary_prefix()
            }
            Some(Operator::Sub) => {
                self.position += 1;
                self.reduce_unary_prefix()?
                    .checked_neg()
                    .ok_or(EvalError::Overflow)
            }
            _ => self.reduce_atom(),
        }
    }

    fn reduce_atom(&mut self) -> EResult {
        let position = self.position;
        let token = self.advance().ok_or(EvalError::UnexpectedEnd)?;
        if let Some(value) = token.value() {
            return Ok(value);
        }

        if token.as_operator() == Some(Operator::LeftParen) {
            let inner = self.reduce_addition()?;
            return match self.advance() {
                Some(t) if t.as_operator() == Some(Operator::RightParen) => Ok(inner),
                Some(_) => Err(EvalError::UnexpectedToken(self.position - 1)),
                None => Err(EvalError::UnexpectedEnd),
            };
        }

        Err(EvalError::UnexpectedToken(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiceFormulaOptions, EngineConfig};
    use crate::roll::{RollContext, ScriptedRoller};

    fn resolve(s: &str, script: &[u32]) -> Vec<ResolvedToken> {
        let config = EngineConfig::default();
        let tokens = crate::parse::parse(s, &config).unwrap();
        let mut roller = ScriptedRoller::new(script.to_vec());
        let options = DiceFormulaOptions::default();
        RollContext::new(&config, &options, &mut roller).resolve(tokens)
    }

    fn check(s: &str, script: &[u32], expected: Int) {
        assert_eq!(reduce(&resolve(s, script)), Ok(expected), "{}", s);
    }

    fn check_err(s: &str, expected: EvalError) {
        assert_eq!(reduce(&resolve(s, &[])), Err(expected), "{}", s);
    }

    #[test]
    fn test_eval_number() {
        check("2", &[], 2);
        check("-2", &[], -2);
        check("--2", &[], 2);
        check("+-+2", &[], -2);
    }

    #[test]
    fn test_eval_binary() {
        check("2 + 3", &[], 5);
        check("2 * (1 - 3)", &[], -4);
        check("10 - 4 - 3", &[], 3);
        check("1 + 2 * 3", &[], 7);
        check("(1 + 2) * 3", &[], 9);
        check("24 / 4 / 2", &[], 3);
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        check("7 / 2", &[], 3);
        check("-7 / 2", &[], -3);
        check("7 / -2", &[], -3);
    }

    #[test]
    fn test_eval_dice() {
        check("2d6 + 5", &[4, 3], 12);
        check("1d20 + 4", &[10], 14);
        check("2 * 2d4", &[1, 3], 8);
        check("(1d8 + 1d6) / 2", &[7, 2], 4);
    }

    #[test]
    fn test_eval_errors() {
        check_err("1 / 0", EvalError::DivisionByZero);
        check_err("5 / (2 - 2)", EvalError::DivisionByZero);
        check_err("9223372036854775807 + 1", EvalError::Overflow);
        check_err("9223372036854775807 * 2", EvalError::Overflow);
    }

    #[test]
    fn test_malformed_tokens() {
        use crate::roll::{OperatorToken, StaticValue};

        let two: ResolvedToken = StaticValue { value: 2 }.into();
        let plus: ResolvedToken = OperatorToken {
            symbol: Operator::Add,
        }
        .into();
        let close: ResolvedToken = OperatorToken {
            symbol: Operator::RightParen,
        }
        .into();

        assert_eq!(reduce(&[]), Err(EvalError::UnexpectedEnd));
        assert_eq!(reduce(&[two.clone(), plus]), Err(EvalError::UnexpectedEnd));
        assert_eq!(reduce(&[two.clone(), two.clone()]), Err(EvalError::UnexpectedToken(1)));
        assert_eq!(reduce(&[close, two]), Err(EvalError::UnexpectedToken(0)));
    }
}
