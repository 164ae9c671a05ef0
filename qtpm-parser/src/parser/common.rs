use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until};
use nom::character::complete::{char, digit1, multispace1};
use nom::combinator::{map_res, opt, recognize, value};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{IResult, Parser};

use super::errors::ParseError;

/// Skip whitespace and `//` or `/* */` comments.
pub fn ws(input: &str) -> IResult<&str, ()> {
    let line_comment = value((), pair(tag("//"), opt(is_not("\n"))));
    let block_comment = value((), delimited(tag("/*"), take_until("*/"), tag("*/")));
    let mut parser = value((), many0(alt((value((), multispace1), line_comment, block_comment))));

    parser(input)
}

pub fn op0<'a>(op: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| -> IResult<&'a str, &'a str> {
        let mut parser = delimited(ws, tag(op), ws);
        parser(input)
    }
}

pub fn natural(input: &str) -> IResult<&str, usize> {
    map_res(digit1, usize::from_str)(input)
}

pub fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), i64::from_str)(input)
}

/// A variable such as `x3`, returning its index.
pub fn variable<'a>(prefix: char) -> impl FnMut(&'a str) -> IResult<&'a str, usize> {
    move |input: &'a str| preceded(char(prefix), natural)(input)
}

/// A list of items enclosed in braces and separated by commas.
pub fn braced_list<'a, O, P>(item: P) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    P: Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    delimited(
        terminated(char('{'), ws),
        separated_list0(op0(","), item),
        preceded(ws, char('}')),
    )
}

/// Run a parser over the whole input, ignoring surrounding whitespace and comments.
pub fn parse_all<'a, O, P>(parser: P, input: &'a str) -> Result<O, ParseError>
where
    P: Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    let mut parser = preceded(ws, parser);

    match parser.parse(input) {
        Ok((rest, parsed)) => match ws(rest) {
            Ok(("", _)) => Ok(parsed),
            Ok((rest, _)) => Err(ParseError::Incomplete(rest.to_string())),
            Err(_) => Err(ParseError::Incomplete(rest.to_string())),
        },
        Err(nom::Err::Error(err) | nom::Err::Failure(err)) => Err(ParseError::Syntax(err.input.to_string())),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::Syntax(input.to_string())),
    }
}
