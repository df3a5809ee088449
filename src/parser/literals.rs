//! Literal recognition using nom.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::{char, digit0, digit1, one_of},
    combinator::{all_consuming, map, opt, recognize, value},
    multi::fold_many0,
    sequence::{delimited, pair, tuple},
    IResult,
};

/// A number recognized in text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// A parsed SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Number(Number),
    String(String),
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?`
///
/// A leading zero followed by more digits (`007`) is rejected so that
/// zero-padded codes stay strings.
fn number_text(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        alt((recognize(pair(one_of("123456789"), digit0)), tag("0"))),
        opt(pair(char('.'), digit1)),
    )))(input)
}

/// Recognize `input` as a number if the whole string looks like one.
pub fn parse_number(input: &str) -> Option<Number> {
    let (_, text) = all_consuming(number_text)(input).ok()?;
    if text.contains('.') {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Number::Float)
    } else {
        text.parse::<i64>().ok().map(Number::Int)
    }
}

fn quoted_piece(input: &str) -> IResult<&str, &str> {
    alt((value("'", tag("''")), is_not("'")))(input)
}

/// `'...'` with `''` as the escaped quote.
fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        fold_many0(quoted_piece, String::new, |mut acc: String, piece| {
            acc.push_str(piece);
            acc
        }),
        char('\''),
    )(input)
}

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((
        value(Literal::Null, tag_no_case("NULL")),
        map(quoted_string, Literal::String),
        map(number_text, |text: &str| {
            parse_number(text)
                .map(Literal::Number)
                .unwrap_or_else(|| Literal::String(text.to_string()))
        }),
    ))(input)
}

/// Parse a complete SQL literal as produced by the value caster.
pub fn parse_literal(input: &str) -> Option<Literal> {
    all_consuming(literal)(input.trim()).ok().map(|(_, lit)| lit)
}
