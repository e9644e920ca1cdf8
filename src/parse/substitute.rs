use super::lexer::TokenKind;
use crate::common::Int;
use crate::error::DiceError;
use logos::Logos;
use std::collections::HashMap;

/// Values for `@name` placeholders, keyed without the `@`.
pub type Variables = HashMap<String, Int>;

/// Writes `formula` back out with every `@name` placeholder replaced by its
/// value, for echoing to callers. The parser reads placeholders itself, so
/// this text is never parsed.
///
/// Returns `Ok(None)` when the formula has no placeholders. Negative values
/// are parenthesized.
pub(crate) fn substitute(formula: &str, variables: &Variables) -> Result<Option<String>, DiceError> {
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;
    let mut replaced = false;

    for (kind, span) in TokenKind::lexer(formula).spanned() {
        if kind != TokenKind::Variable {
            continue;
        }
        let name = &formula[span.start + 1..span.end];
        let value = variables
            .get(name)
            .ok_or_else(|| DiceError::UnknownVariable(name.to_string()))?;

        out.push_str(&formula[last..span.start]);
        if *value < 0 {
            out.push_str(&format!("({})", value));
        } else {
            out.push_str(&value.to_string());
        }
        last = span.end;
        replaced = true;
    }

    if !replaced {
        return Ok(None);
    }
    out.push_str(&formula[last..]);
    Ok(Some(out))
}
