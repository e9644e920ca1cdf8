use super::ast::FormulaToken;
use super::error::{ParseError, ParseErrorKind};
use super::lexer::{lexer, Lexer, TokenKind};
use super::substitute::Variables;
use crate::common::*;
use crate::config::EngineConfig;
use crate::error::DiceError;
use logos_iter::LogosIter;
use std::ops::Range;

type PResult<T = ()> = Result<T, DiceError>;

/// Recursive-descent parser that checks the arithmetic grammar and records
/// every consumed token into a flat list.
///
/// `@name` placeholders become static values as they are read, so a value
/// never merges with a neighbouring token.
pub(crate) struct Parser<'a, 'c> {
    source: &'a str,
    lexer: Lexer<'a>,
    config: &'c EngineConfig,
    variables: Option<&'c Variables>,
    tokens: Vec<FormulaToken>,
}

impl<'a, 'c> Parser<'a, 'c> {
    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MULTIPLICATION_OPS: &'static [TokenKind] = &[TokenKind::Star, TokenKind::Slash];

    const UNARY_PREFIX_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    pub fn new(source: &'a str, config: &'c EngineConfig) -> Self {
        Self {
            source,
            lexer: lexer(source),
            config,
            variables: None,
            tokens: Vec::new(),
        }
    }

    pub fn with_variables(mut self, variables: &'c Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn parse(mut self) -> PResult<Vec<FormulaToken>> {
        self.parse_addition()?;
        if self.lexer.peek().is_some() {
            return self.unexpected_token(vec1![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash
            ]);
        }
        Ok(self.tokens)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn matches_any(&mut self, options: &[TokenKind]) -> Option<TokenKind> {
        self.lexer
            .peek()
            .copied()
            .filter(|peeked| options.contains(peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> PResult {
        if self.matches(expected) {
            self.lexer.next();
            Ok(())
        } else {
            self.unexpected_token(vec1![expected])
        }
    }

    fn consume_operator(&mut self, kind: TokenKind) -> PResult {
        self.consume(kind)?;
        if let Some(symbol) = kind.as_operator() {
            self.tokens.push(FormulaToken::new_operator(symbol));
        }
        Ok(())
    }

    fn error_at<T>(&self, kind: ParseErrorKind, span: Range<usize>) -> PResult<T> {
        let slice = self.source.get(span.clone()).unwrap_or_default().to_string();
        Err(ParseError { kind, span, slice }.into())
    }

    fn error<T>(&mut self, kind: ParseErrorKind) -> PResult<T> {
        let span = self.lexer.span();
        self.error_at(kind, span)
    }

    fn unexpected_token<T>(&mut self, expected: NonEmpty<TokenKind>) -> PResult<T> {
        match self.lexer.next() {
            Some(TokenKind::ErrMissingSides) => self.error(ParseErrorKind::MissingSides),
            Some(TokenKind::Error) => self.error(ParseErrorKind::UnexpectedString { expected }),
            Some(found) => self.error(ParseErrorKind::UnexpectedToken { found, expected }),
            None => {
                let end = self.source.len();
                self.error_at(ParseErrorKind::UnexpectedEnd { expected }, end..end)
            }
        }
    }

    fn parse_addition(&mut self) -> PResult {
        self.parse_multiplication()?;

        while let Some(op) = self.matches_any(Self::ADDITION_OPS) {
            self.consume_operator(op)?;
            self.parse_multiplication()?;
        }

        Ok(())
    }

    fn parse_multiplication(&mut self) -> PResult {
        self.parse_unary_prefix()?;

        while let Some(op) = self.matches_any(Self::MULTIPLICATION_OPS) {
            self.consume_operator(op)?;
            self.parse_unary_prefix()?;
        }

        Ok(())
    }

    fn parse_unary_prefix(&mut self) -> PResult {
        if let Some(op) = self.matches_any(Self::UNARY_PREFIX_OPS) {
            self.consume_operator(op)?;
            self.parse_unary_prefix()
        } else {
            self.parse_atom()
        }
    }

    fn parse_atom(&mut self) -> PResult {
        match self.lexer.peek().copied() {
            Some(TokenKind::LeftParen) => self.parse_parens(),
            Some(TokenKind::Integer) => self.parse_integer(),
            Some(TokenKind::Dice) => self.parse_dice(),
            Some(TokenKind::Variable) => self.parse_variable(),
            _ => self.unexpected_token(vec1![
                TokenKind::Integer,
                TokenKind::Dice,
                TokenKind::LeftParen
            ]),
        }
    }

    fn parse_parens(&mut self) -> PResult {
        self.consume_operator(TokenKind::LeftParen)?;
        self.parse_addition()?;
        self.consume_operator(TokenKind::RightParen)
    }

    fn parse_integer(&mut self) -> PResult {
        self.consume(TokenKind::Integer)?;
        match self.lexer.slice().parse::<Int>() {
            Ok(value) => {
                self.tokens.push(FormulaToken::new_static(value));
                Ok(())
            }
            Err(_) => self.error(ParseErrorKind::NumberTooLarge),
        }
    }

    fn parse_variable(&mut self) -> PResult {
        self.consume(TokenKind::Variable)?;
        let name = self.lexer.slice().trim_start_matches('@');
        let value = self
            .variables
            .and_then(|vars| vars.get(name))
            .copied()
            .ok_or_else(|| DiceError::UnknownVariable(name.to_string()))?;
        self.tokens.push(FormulaToken::new_static(value));
        Ok(())
    }

    fn parse_dice(&mut self) -> PResult {
        self.consume(TokenKind::Dice)?;
        let source = self.source;
        let slice = &source[self.lexer.span()];

        let Some((count, rest)) = slice.split_once(['d', 'D']) else {
            return self.error(ParseErrorKind::MissingSides);
        };
        let sides_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (sides, modifiers) = rest.split_at(sides_len);

        let count = if count.is_empty() {
            1
        } else {
            match count.parse::<u64>() {
                Ok(0) => return self.error(ParseErrorKind::ZeroDice),
                Ok(n) => n,
                // all digits, so the only failure is overflow
                Err(_) => u64::MAX,
            }
        };
        let Ok(sides) = sides.parse::<u64>() else {
            return self.error(ParseErrorKind::NumberTooLarge);
        };

        let dice_type = UInt::try_from(sides)
            .ok()
            .and_then(DiceType::from_sides)
            .filter(|&t| self.config.allows(t))
            .ok_or(DiceError::InvalidDiceType { sides })?;

        let max = self.config.max_dice_count;
        let count = usize::try_from(count)
            .ok()
            .filter(|&n| n <= max)
            .ok_or(DiceError::DiceCountExceeded { count, max })?;

        let mut mods = DiceModifiers::default();
        for c in modifiers.chars() {
            match c {
                '!' => mods.explode = true,
                'v' | 'V' => mods.vicious = true,
                _ => {}
            }
        }

        self.tokens
            .push(FormulaToken::new_dice(count, dice_type, mods));
        Ok(())
    }
}
