use super::token::*;
use crate::common::*;

/// Turns a resolved formula into text.
///
/// The default methods produce the plain `[4] + [3] + 5 = 12` form; other
/// stringifiers override the pieces they render differently.
pub trait Stringify {
    fn stringify(&mut self, tokens: &[ResolvedToken], total: Int) -> String {
        let body = self.str_tokens(tokens);
        let total = self.str_total(total);
        format!("{} = {}", body, total)
    }

    fn str_tokens(&mut self, tokens: &[ResolvedToken]) -> String {
        let mut ret = String::new();
        for (i, token) in tokens.iter().enumerate() {
            let s = match token {
                ResolvedToken::Static(x) => self.str_static(x.value),
                ResolvedToken::Operator(op) => self.str_operator(op.symbol, is_unary(tokens, i)),
                ResolvedToken::Dice(dice) => self.str_dice(dice, is_operand_of_product(tokens, i)),
            };
            ret.push_str(&s);
        }
        ret
    }

    fn str_total(&mut self, total: Int) -> String {
        total.to_string()
    }

    fn str_static(&mut self, value: Int) -> String {
        value.to_string()
    }

    fn str_operator(&mut self, op: Operator, unary: bool) -> String {
        match op {
            Operator::LeftParen | Operator::RightParen => op.to_string(),
            _ if unary => op.to_string(),
            _ => format!(" {} ", op),
        }
    }

    /// `grouped` is set when the token is an operand of `*`, `/` or a unary
    /// operator, so a multi-die sum needs parentheses.
    fn str_dice(&mut self, dice: &ResolvedDice, grouped: bool) -> String {
        let shown: Vec<_> = dice
            .groups()
            .iter()
            .filter(|g| g.kept())
            .map(|g| self.str_die(g, dice.tens_indexing))
            .collect();
        let joined = shown.join(" + ");
        if grouped && shown.len() > 1 {
            format!("({})", joined)
        } else {
            joined
        }
    }

    fn str_die(&mut self, die: &DieGroup<'_>, indexing: TensIndexing) -> String {
        format!("[{}]", die.value(indexing))
    }
}

fn is_unary(tokens: &[ResolvedToken], i: usize) -> bool {
    match i.checked_sub(1).and_then(|prev| tokens.get(prev)) {
        None => true,
        Some(prev) => !matches!(prev.as_operator(), None | Some(Operator::RightParen)),
    }
}

fn is_operand_of_product(tokens: &[ResolvedToken], i: usize) -> bool {
    let before = i.checked_sub(1).map_or(false, |prev| {
        tokens[prev]
            .as_operator()
            .map_or(false, |op| op.is_multiplicative() || (op.is_additive() && is_unary(tokens, prev)))
    });
    let after = tokens
        .get(i + 1)
        .and_then(ResolvedToken::as_operator)
        .map_or(false, Operator::is_multiplicative);
    before || after
}

/// Plain text, suitable for chat replies and logs.
#[derive(Debug, Default)]
pub struct PlainStringifier;

impl PlainStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for PlainStringifier {}

/// Markdown for chat integrations: every die is listed, dropped dice are
/// struck through, critical and exploded dice are bold, fumbles underlined
/// and vicious dice italic.
#[derive(Debug, Default)]
pub struct MarkdownStringifier;

impl MarkdownStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for MarkdownStringifier {
    fn str_total(&mut self, total: Int) -> String {
        format!("`{}`", total)
    }

    fn str_dice(&mut self, dice: &ResolvedDice, _grouped: bool) -> String {
        let the_dice = dice
            .groups()
            .iter()
            .map(|g| self.str_die(g, dice.tens_indexing))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", dice, the_dice)
    }

    fn str_die(&mut self, die: &DieGroup<'_>, indexing: TensIndexing) -> String {
        let value = die.value(indexing);
        match die.category() {
            DieCategory::Normal => value.to_string(),
            DieCategory::Dropped => format!("~~{}~~", value),
            DieCategory::Critical | DieCategory::Explosion => format!("**{}**", value),
            DieCategory::Fumble => format!("__{}__", value),
            DieCategory::Vicious => format!("*{}*", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiceFormulaOptions, EngineConfig};
    use crate::roll::{reduce, RollContext, ScriptedRoller};

    macro_rules! check {
        ($cls:ident, $input:expr, $script:expr, $expected:expr) => {{
            check!($cls, $input, DiceFormulaOptions::default(), $script, $expected)
        }};
        ($cls:ident, $input:expr, $options:expr, $script:expr, $expected:expr) => {{
            let config = EngineConfig::default();
            let options = $options;
            let script: &[u32] = &$script;
            let tokens = crate::parse::parse($input, &config).unwrap();
            let mut roller = ScriptedRoller::new(script.to_vec());
            let resolved = RollContext::new(&config, &options, &mut roller).resolve(tokens);
            let total = reduce(&resolved).unwrap();
            let actual = $cls::new().stringify(&resolved, total);
            assert_eq!(&actual, $expected);
        }};
    }

    #[test]
    fn test_plain_stringify() {
        check!(PlainStringifier, "2 + 3", [], "2 + 3 = 5");
        check!(PlainStringifier, "2d6+5", [4, 3], "[4] + [3] + 5 = 12");
        check!(PlainStringifier, "-1d4 + 1", [3], "-[3] + 1 = -2");
        check!(PlainStringifier, "2d6 * 2", [4, 3], "([4] + [3]) * 2 = 14");
        check!(PlainStringifier, "(2d6 + 1) * 2", [4, 3], "([4] + [3] + 1) * 2 = 16");
        check!(PlainStringifier, "1d66", [2, 5], "[25] = 25");
        check!(PlainStringifier, "1d8v + 2", [5, 6], "[5] + [6] + 2 = 13");
    }

    #[test]
    fn test_plain_stringify_hides_dropped() {
        check!(
            PlainStringifier,
            "1d20",
            DiceFormulaOptions::default().with_advantage(1),
            [10, 18],
            "[18] = 18"
        );
    }

    #[test]
    fn test_markdown_stringify() {
        check!(MarkdownStringifier, "2 + 3", [], "2 + 3 = `5`");
        check!(MarkdownStringifier, "2d6+5", [4, 3], "2d6 (4, 3) + 5 = `12`");
        check!(
            MarkdownStringifier,
            "1d20 + 2",
            DiceFormulaOptions::default().with_advantage(1),
            [10, 18],
            "1d20 (~~10~~, 18) + 2 = `20`"
        );
        check!(MarkdownStringifier, "2d6!", [6, 2, 3], "2d6! (6, 2, **3**) = `11`");
        check!(
            MarkdownStringifier,
            "1d20",
            DiceFormulaOptions::default().with_fumbles(),
            [1],
            "1d20 (__1__) = `1`"
        );
        check!(MarkdownStringifier, "1d6v", [2, 4], "1d6v (2, *4*) = `6`");
    }
}
