//! Parser for boolean combinations of arithmetic comparisons.
//!
//! ```text
//! disjunction := conjunction ("||" conjunction)*
//! conjunction := negation ("&&" negation)*
//! negation    := "!" negation | comparison | "(" disjunction ")"
//! comparison  := sum ("<" | "<=" | "==" | ">=" | ">") sum
//! sum         := product (("+" | "-") product)*
//! product     := factor ("*" factor)*
//! factor      := integer | "x" index | "m" index | "(" sum ")"
//! ```

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, value};
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use qtpm_core::expression::{BooleanConstraint, ComplexConstraint, Expression, Relation};

use super::common::{integer, op0, parse_all, variable, ws};
use super::errors::ParseError;

fn factor(input: &str) -> IResult<&str, Expression> {
    let mut parser = alt((
        map(integer, Expression::Int),
        map(variable('x'), Expression::Signal),
        map(variable('m'), Expression::Memory),
        delimited(pair(char('('), ws), sum, pair(ws, char(')'))),
    ));

    parser(input)
}

fn product(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = factor(input)?;
    let mut parser = fold_many0(preceded(op0("*"), factor), move || first.clone(), |acc, rhs| acc * rhs);

    parser(rest)
}

fn sum(input: &str) -> IResult<&str, Expression> {
    let (rest, first) = product(input)?;
    let operator = alt((value('+', op0("+")), value('-', op0("-"))));
    let mut parser = fold_many0(pair(operator, product), move || first.clone(), |acc, (op, rhs)| match op {
        '+' => acc + rhs,
        _ => acc - rhs,
    });

    parser(rest)
}

fn relation(input: &str) -> IResult<&str, Relation> {
    let mut parser = alt((
        value(Relation::Le, tag("<=")),
        value(Relation::Ge, tag(">=")),
        value(Relation::Eq, tag("==")),
        value(Relation::Lt, tag("<")),
        value(Relation::Gt, tag(">")),
    ));

    parser(input)
}

fn comparison(input: &str) -> IResult<&str, ComplexConstraint> {
    let parser = tuple((sum, ws, relation, ws, sum));
    let mut parser = map(parser, |(lhs, _, relation, _, rhs)| ComplexConstraint::new(lhs, relation, rhs));

    parser(input)
}

fn negation(input: &str) -> IResult<&str, BooleanConstraint> {
    let mut parser = alt((
        map(preceded(pair(char('!'), ws), negation), BooleanConstraint::not),
        map(comparison, BooleanConstraint::from),
        delimited(pair(char('('), ws), disjunction, pair(ws, char(')'))),
    ));

    parser(input)
}

fn conjunction(input: &str) -> IResult<&str, BooleanConstraint> {
    let (rest, first) = negation(input)?;
    let mut parser = fold_many0(preceded(op0("&&"), negation), move || first.clone(), BooleanConstraint::and);

    parser(rest)
}

pub fn disjunction(input: &str) -> IResult<&str, BooleanConstraint> {
    let (rest, first) = conjunction(input)?;
    let mut parser = fold_many0(preceded(op0("||"), conjunction), move || first.clone(), BooleanConstraint::or);

    parser(rest)
}

/// Parse a boolean combination of comparisons between integer expressions over signal variables
/// `x<i>` and memory variables `m<i>`.
///
/// ```rust
/// use qtpm_parser::parse_boolean_constraint;
///
/// let label = parse_boolean_constraint("x0 < 100 && x0 * x1 > x0 + x1").unwrap();
/// assert_eq!(label.to_string(), "x0<100&&x0*x1>x0+x1");
/// ```
pub fn parse_boolean_constraint(input: &str) -> Result<BooleanConstraint, ParseError> {
    parse_all(disjunction, input.trim())
}
