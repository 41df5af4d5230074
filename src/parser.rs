use std::rc::Rc;

use chumsky::prelude::*;
use thiserror::Error;

use crate::term::{Term, TermRef, Variable};

#[derive(PartialEq, Eq, Clone, Error, Debug)]
pub enum ParseError {
    #[error("illegal use of character '{0}'")]
    IllegalCharacter(char),
    #[error("no parse")]
    MalformedSyntax,
}

impl<I> chumsky::Error<I> for ParseError {
    type Span = std::ops::Range<usize>;
    type Label = &'static str;

    fn expected_input_found<Iter: IntoIterator<Item = Option<I>>>(
        _span: Self::Span,
        _expected: Iter,
        _found: Option<I>,
    ) -> Self {
        ParseError::MalformedSyntax
    }

    // An illegal-character report wins over the catch-all, whichever
    // branch produced it.
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (e @ ParseError::IllegalCharacter(_), _) => e,
            (_, e) => e,
        }
    }

    fn with_label(self, _label: Self::Label) -> Self {
        self
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Token {
    LParen,
    RParen,
    Dot,
    Lambda,
    Space,
    Var(char),
}

trait LambdaParser<I: Clone, O>: Parser<I, O, Error = ParseError> {}
impl<I: Clone, O, T> LambdaParser<I, O> for T where T: Parser<I, O, Error = ParseError> {}

fn lexer() -> impl LambdaParser<char, Vec<Token>> {
    let token = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('.').to(Token::Dot),
        just(' ').to(Token::Space),
        just('λ').to(Token::Lambda),
        just('\\').to(Token::Lambda),
        filter(|c: &char| !matches!(c, '(' | ')' | '.' | ' ' | 'λ' | '\\')).try_map(
            |c, _span| {
                if c.is_ascii_digit() || c == '_' {
                    Err(ParseError::IllegalCharacter(c))
                } else {
                    Ok(Token::Var(c))
                }
            },
        ),
    ));
    token.repeated().then_ignore(end())
}

/// The contents of one parenthesized unit.
fn inner_parser() -> impl LambdaParser<Token, TermRef> {
    recursive(|inner: Recursive<_, TermRef, _>| {
        let var = select! {
            Token::Var(c) => Variable::new(c),
        };

        let atom = var.map(|v| Rc::new(Term::Var(v))).or(inner
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen)));

        // One unit of an application: whatever fits between separator
        // spaces. An abstraction here binds a single parameter and its body
        // must itself be spaceless.
        let element = recursive(|element: Recursive<_, TermRef, _>| {
            just(Token::Lambda)
                .ignore_then(var)
                .then_ignore(just(Token::Dot))
                .then(element)
                .map(|(param, body)| Rc::new(Term::Abs(param, body)))
                .or(atom.clone())
        });

        // At the head of a unit the body extends to the closing
        // parenthesis: `(λx.x y)` is `(λx.(x y))`.
        let abstraction = just(Token::Lambda)
            .ignore_then(var.separated_by(just(Token::Space)).at_least(1))
            .then_ignore(just(Token::Dot))
            .then(inner.clone())
            .map(|(params, body)| {
                params
                    .into_iter()
                    .rev()
                    .fold(body, |body, param| Rc::new(Term::Abs(param, body)))
            });

        let application = element
            .clone()
            .then(just(Token::Space).ignore_then(element).repeated().at_least(1))
            .foldl(|lhs, rhs| Rc::new(Term::Apply(lhs, rhs)));

        choice((abstraction, application, atom))
    })
}

fn expr_parser() -> impl LambdaParser<Token, TermRef> {
    let var = select! {
        Token::Var(c) => Variable::new(c),
    };
    var.map(|v| Rc::new(Term::Var(v)))
        .or(inner_parser().delimited_by(just(Token::LParen), just(Token::RParen)))
        .then_ignore(end())
}

/// Parses one whitespace-collapsed expression into a term.
pub fn parse(input: &str) -> Result<TermRef, ParseError> {
    let tokens = lexer().parse(input).map_err(take_first)?;
    let eoi = tokens.len()..tokens.len() + 1;
    expr_parser()
        .parse(chumsky::Stream::from_iter(
            eoi,
            tokens
                .into_iter()
                .enumerate()
                .map(|(i, token)| (token, i..i + 1)),
        ))
        .map_err(take_first)
}

fn take_first(errors: Vec<ParseError>) -> ParseError {
    errors
        .into_iter()
        .next()
        .unwrap_or(ParseError::MalformedSyntax)
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! var {
        ($c:expr) => {
            Rc::new(Term::Var(Variable::new($c)))
        };
    }
    macro_rules! lambda {
        ($c:expr, $body:expr) => {
            Rc::new(Term::Abs(Variable::new($c), $body))
        };
    }
    macro_rules! apply {
        ($lhs:expr, $rhs:expr) => {
            Rc::new(Term::Apply($lhs, $rhs))
        };
    }

    #[test]
    fn parses_bare_and_parenthesized_variables() {
        assert_eq!(parse("x"), Ok(var!('x')));
        assert_eq!(parse("(x)"), Ok(var!('x')));
        assert_eq!(parse("((x))"), Ok(var!('x')));
    }

    #[test]
    fn parses_abstractions_with_either_marker() {
        let id = lambda!('x', var!('x'));
        assert_eq!(parse("(λx.x)"), Ok(id.clone()));
        assert_eq!(parse("(\\x.x)"), Ok(id));
    }

    #[test]
    fn multi_parameter_sugar_nests_inward() {
        assert_eq!(
            parse("(λx y z.x)"),
            Ok(lambda!('x', lambda!('y', lambda!('z', var!('x')))))
        );
    }

    #[test]
    fn application_groups_to_the_left() {
        assert_eq!(
            parse("(a b c)"),
            Ok(apply!(apply!(var!('a'), var!('b')), var!('c')))
        );
    }

    #[test]
    fn nested_application_argument() {
        assert_eq!(
            parse("(x (y z))"),
            Ok(apply!(var!('x'), apply!(var!('y'), var!('z'))))
        );
    }

    #[test]
    fn abstraction_body_extends_to_the_closing_parenthesis() {
        assert_eq!(
            parse("(λx.x y)"),
            Ok(lambda!('x', apply!(var!('x'), var!('y'))))
        );
    }

    #[test]
    fn abstraction_as_one_unit_of_an_application() {
        assert_eq!(
            parse("(a λx.x b)"),
            Ok(apply!(apply!(var!('a'), lambda!('x', var!('x'))), var!('b')))
        );
        // The parameter space splits the unit apart.
        assert_eq!(parse("(a λx y.x)"), Err(ParseError::MalformedSyntax));
    }

    #[test]
    fn rejects_digits_and_reserved_characters() {
        assert_eq!(parse("1"), Err(ParseError::IllegalCharacter('1')));
        assert_eq!(parse("_"), Err(ParseError::IllegalCharacter('_')));
        assert_eq!(parse("(λ1.x)"), Err(ParseError::IllegalCharacter('1')));
        assert_eq!(parse("(x 9)"), Err(ParseError::IllegalCharacter('9')));
    }

    #[test]
    fn rejects_malformed_input() {
        for s in [
            "", "(", ")", "()", "(x", "x)", "(a)b", "ab", "(λx)", "(λ.x)", "(λx y.x",
        ] {
            assert_eq!(parse(s), Err(ParseError::MalformedSyntax), "input: {s:?}");
        }
    }

    #[test]
    fn display_and_reparse_round_trip() {
        for s in [
            "x",
            "(λx.x)",
            "(λx y.(x y))",
            "(a b c)",
            "(x (y z))",
            "((λx.x) (λy.y))",
            "(λx.(λy.(y x)))",
            "(a (λx.x) b)",
        ] {
            let term = parse(s).unwrap();
            assert_eq!(parse(&term.to_string()).unwrap(), term, "input: {s:?}");
        }
    }
}
