use crate::common::Int;
use crate::config::{DiceFormulaOptions, EngineConfig};
use crate::error::DiceError;
use crate::parse::{self, ast::FormulaToken, Variables};
use crate::roll::{reduce, PlainStringifier, Resolved, ResolvedToken, RollContext, Roller, Stringify};
use serde::Serialize;
use tracing::debug;

/// Parses, rolls and totals dice formulas under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses and validates `formula` without rolling anything.
    pub fn parse(&self, formula: &str) -> Result<Vec<FormulaToken>, DiceError> {
        parse::parse(formula, &self.config)
    }

    pub fn evaluate<R: Roller + ?Sized>(
        &self,
        formula: &str,
        options: &DiceFormulaOptions,
        roller: &mut R,
    ) -> Result<DiceFormulaResult, DiceError> {
        self.evaluate_with_variables(formula, &Variables::new(), options, roller)
    }

    /// Like [`Engine::evaluate`], first replacing `@name` placeholders with
    /// values from `variables`.
    pub fn evaluate_with_variables<R: Roller + ?Sized>(
        &self,
        formula: &str,
        variables: &Variables,
        options: &DiceFormulaOptions,
        roller: &mut R,
    ) -> Result<DiceFormulaResult, DiceError> {
        let span = tracing::debug_span!("evaluate", formula);
        let _enter = span.enter();

        let substituted_formula = parse::substitute(formula, variables)?;
        let parsed = parse::parse_with_variables(formula, &self.config, variables)?;
        self.check_advantage(&parsed, options)?;

        let tokens = RollContext::new(&self.config, options, roller).resolve(parsed);
        let total = reduce(&tokens)?;
        debug!(total, "evaluated formula");

        let display_string = PlainStringifier::new().stringify(&tokens, total);
        Ok(DiceFormulaResult {
            num_criticals: tokens.iter().map(Resolved::num_criticals).sum(),
            is_fumble: tokens.iter().any(Resolved::is_fumble),
            is_miss: tokens.iter().any(Resolved::is_miss),
            tokens,
            display_string,
            total,
            formula: formula.to_string(),
            substituted_formula,
        })
    }

    /// Advantage on a single-die primary token rolls `1 + |level|` dice, which
    /// must stay within the dice count limit.
    fn check_advantage(&self, tokens: &[FormulaToken], options: &DiceFormulaOptions) -> Result<(), DiceError> {
        let primary = tokens.iter().find_map(|t| match t {
            FormulaToken::Dice { count, .. } => Some(*count),
            _ => None,
        });
        let max = self.config.max_dice_count;
        let count = 1 + u64::from(options.advantage_level.unsigned_abs());
        if primary == Some(1) && options.advantage_level != 0 && count > max as u64 {
            return Err(DiceError::DiceCountExceeded { count, max });
        }
        Ok(())
    }
}

/// Everything one evaluation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormulaResult {
    pub tokens: Vec<ResolvedToken>,
    pub display_string: String,
    pub total: Int,
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substituted_formula: Option<String>,
    pub num_criticals: usize,
    pub is_fumble: bool,
    pub is_miss: bool,
}

impl DiceFormulaResult {
    /// Renders the result with a stringifier other than the plain one.
    pub fn stringify<S: Stringify + Default>(&self) -> String {
        S::default().stringify(&self.tokens, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DiceType, TensIndexing};
    use crate::roll::{DieCategory, MarkdownStringifier, Place, ScriptedRoller};
    use rand::{rngs::StdRng, SeedableRng};

    fn eval(formula: &str, options: DiceFormulaOptions, script: &[u32]) -> Result<DiceFormulaResult, DiceError> {
        let mut roller = ScriptedRoller::new(script.to_vec());
        Engine::default().evaluate(formula, &options, &mut roller)
    }

    #[test]
    fn test_basic_formula() {
        let result = eval("2d6+5", DiceFormulaOptions::default(), &[4, 3]).unwrap();
        assert_eq!(result.total, 12);
        assert_eq!(result.display_string, "[4] + [3] + 5 = 12");
        assert_eq!(result.formula, "2d6+5");
        assert_eq!(result.substituted_formula, None);
        assert_eq!(result.num_criticals, 0);
        assert!(!result.is_fumble);
        assert!(!result.is_miss);
    }

    #[test]
    fn test_advantage() {
        let options = DiceFormulaOptions::default().with_advantage(1);
        let result = eval("1d20", options, &[10, 18]).unwrap();
        assert_eq!(result.total, 18);
        let dice = result.tokens[0].as_dice().unwrap();
        assert_eq!(dice.dice.len(), 2);
        assert_eq!(dice.dice[0].category, DieCategory::Dropped);
        assert!(dice.dice[1].kept);

        let options = DiceFormulaOptions::default().with_advantage(-1);
        assert_eq!(eval("1d20", options, &[10, 18]).unwrap().total, 10);
    }

    #[test]
    fn test_invalid_dice_type() {
        let err = eval("1d7", DiceFormulaOptions::default(), &[]).unwrap_err();
        assert_eq!(err, DiceError::InvalidDiceType { sides: 7 });
        assert_eq!(err.to_string(), "Invalid dice type: d7");
    }

    #[test]
    fn test_errors_before_rolling() {
        let engine = Engine::default();
        let options = DiceFormulaOptions::default();
        for formula in ["101d6", "1d7", "2d6 +", "1d6 + @missing"] {
            let mut roller = ScriptedRoller::new(vec![3]);
            assert!(engine.evaluate(formula, &options, &mut roller).is_err(), "{}", formula);
            assert_eq!(roller.rolls(), 0, "{}", formula);
        }

        let mut roller = ScriptedRoller::new(vec![3]);
        let err = engine.evaluate("101d6", &options, &mut roller).unwrap_err();
        assert_eq!(err, DiceError::DiceCountExceeded { count: 101, max: 100 });
    }

    #[test]
    fn test_eval_error_returns_no_result() {
        let err = eval("1d6 / 0", DiceFormulaOptions::default(), &[3]).unwrap_err();
        assert_eq!(err, DiceError::Eval(crate::roll::EvalError::DivisionByZero));
        assert_eq!(err.to_string(), "cannot divide by zero");
    }

    #[test]
    fn test_reduce_matches_total() {
        let mut rng = StdRng::seed_from_u64(42);
        let engine = Engine::default();
        let options = DiceFormulaOptions::default().with_criticals().with_vicious();
        for formula in ["2d6+5", "1d20! - 2", "(1d8 + 1d6) * 2", "3d4v / 2", "1d66 + 1d100", "-2d10"] {
            let result = engine.evaluate(formula, &options, &mut rng).unwrap();
            assert_eq!(reduce(&result.tokens), Ok(result.total), "{}", formula);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let engine = Engine::default();
        let options = DiceFormulaOptions::default().with_advantage(2).with_explode_all();
        let a = engine
            .evaluate("1d20 + 4d6", &options, &mut StdRng::seed_from_u64(1234))
            .unwrap();
        let b = engine
            .evaluate("1d20 + 4d6", &options, &mut StdRng::seed_from_u64(1234))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_double_digit() {
        let result = eval("1d66", DiceFormulaOptions::default(), &[3, 5]).unwrap();
        let dice = result.tokens[0].as_dice().unwrap();
        assert_eq!(dice.dice_type, DiceType::D66);
        assert_eq!(dice.dice.len() % 2, 0);
        assert_eq!(dice.dice[0].place, Place::Tens);
        assert_eq!(dice.dice[1].place, Place::Ones);
        assert_eq!(result.total, 35);

        let engine = Engine::new(EngineConfig::default().with_tens_indexing(TensIndexing::ZeroIndexed));
        let mut roller = ScriptedRoller::new(vec![3, 5]);
        let result = engine
            .evaluate("1d66", &DiceFormulaOptions::default(), &mut roller)
            .unwrap();
        assert_eq!(result.total, 25);
    }

    #[test]
    fn test_variables() {
        let engine = Engine::default();
        let variables: Variables = [("str".to_string(), 3), ("penalty".to_string(), -2)]
            .into_iter()
            .collect();
        let mut roller = ScriptedRoller::new(vec![12]);
        let result = engine
            .evaluate_with_variables(
                "1d20 + @str * @penalty",
                &variables,
                &DiceFormulaOptions::default(),
                &mut roller,
            )
            .unwrap();
        assert_eq!(result.substituted_formula.as_deref(), Some("1d20 + 3 * (-2)"));
        assert_eq!(result.formula, "1d20 + @str * @penalty");
        assert_eq!(result.total, 6);

        let err = engine
            .evaluate_with_variables("@dex", &variables, &DiceFormulaOptions::default(), &mut roller)
            .unwrap_err();
        assert_eq!(err, DiceError::UnknownVariable("dex".to_string()));
    }

    #[test]
    fn test_variables_stay_separate_operands() {
        let engine = Engine::default();
        let variables: Variables = [("x".to_string(), 3), ("low".to_string(), Int::MIN)]
            .into_iter()
            .collect();
        let options = DiceFormulaOptions::default();

        for formula in ["2@x", "@x@x", "1d6@x"] {
            let mut roller = ScriptedRoller::new(vec![4]);
            let err = engine
                .evaluate_with_variables(formula, &variables, &options, &mut roller)
                .unwrap_err();
            assert!(matches!(err, DiceError::Syntax(_)), "{}", formula);
            assert_eq!(roller.rolls(), 0, "{}", formula);
        }

        let mut roller = ScriptedRoller::new(vec![4]);
        let result = engine
            .evaluate_with_variables("@x + 1d6", &variables, &options, &mut roller)
            .unwrap();
        assert_eq!(result.display_string, "3 + [4] = 7");

        let result = engine
            .evaluate_with_variables("@low", &variables, &options, &mut roller)
            .unwrap();
        assert_eq!(result.total, Int::MIN);
    }

    #[test]
    fn test_advantage_within_dice_limit() {
        let engine = Engine::default();
        for level in [500, -500, i32::MAX, i32::MIN] {
            let options = DiceFormulaOptions::default().with_advantage(level);
            let mut roller = ScriptedRoller::new(vec![3]);
            let err = engine.evaluate("1d20 + 2", &options, &mut roller).unwrap_err();
            assert!(
                matches!(err, DiceError::DiceCountExceeded { max: 100, .. }),
                "{}",
                level
            );
            assert_eq!(roller.rolls(), 0);
        }

        let options = DiceFormulaOptions::default().with_advantage(99);
        let mut roller = ScriptedRoller::new(vec![3]);
        let result = engine.evaluate("1d20", &options, &mut roller).unwrap();
        assert_eq!(result.tokens[0].as_dice().map(|d| d.dice.len()), Some(100));

        // advantage is ignored for multi-die primaries, so it is not counted
        let options = DiceFormulaOptions::default().with_advantage(500);
        assert!(engine.evaluate("2d20", &options, &mut roller).is_ok());
    }

    #[test]
    fn test_flags() {
        let result = eval("1d20", DiceFormulaOptions::default().with_fumbles(), &[1]).unwrap();
        assert!(result.is_fumble);

        let result = eval("1d20 + 5", DiceFormulaOptions::attack(), &[1]).unwrap();
        assert!(result.is_miss);
        assert_eq!(result.total, 6);

        let result = eval("1d6!", DiceFormulaOptions::default(), &[6, 6, 2]).unwrap();
        assert_eq!(result.num_criticals, 2);
        assert_eq!(result.total, 14);
    }

    #[test]
    fn test_markdown() {
        let options = DiceFormulaOptions::default().with_advantage(1);
        let result = eval("1d20 + 2", options, &[10, 18]).unwrap();
        assert_eq!(
            result.stringify::<MarkdownStringifier>(),
            "1d20 (~~10~~, 18) + 2 = `20`"
        );
    }

    #[test]
    fn test_serialize() {
        let result = eval("1d4 + 1", DiceFormulaOptions::default(), &[2]).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["displayString"], "[2] + 1 = 3");
        assert!(json.get("substitutedFormula").is_none());
        assert_eq!(json["tokens"][0]["type"], "dice");
        assert_eq!(json["tokens"][0]["dice"][0]["category"], "normal");
        assert_eq!(json["tokens"][1]["symbol"], "+");
        assert_eq!(json["tokens"][2]["value"], 1);
    }
}
