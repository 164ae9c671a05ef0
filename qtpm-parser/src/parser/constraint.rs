//! Parsers for clock constraints, guards and reset sets.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{map, value};
use nom::sequence::tuple;
use nom::IResult;

use qtpm_core::constraint::{Constraint, Guard, Order};

use super::common::{braced_list, integer, natural, parse_all, variable, ws};
use super::errors::ParseError;

fn order(input: &str) -> IResult<&str, Order> {
    let mut parser = alt((
        value(Order::Le, tag("<=")),
        value(Order::Ge, tag(">=")),
        value(Order::Lt, tag("<")),
        value(Order::Gt, tag(">")),
    ));

    parser(input)
}

pub fn constraint(input: &str) -> IResult<&str, Constraint> {
    let parser = tuple((variable('x'), ws, order, ws, integer));
    let mut parser = map(parser, |(var, _, order, _, constant)| Constraint::new(var, order, constant));

    parser(input)
}

pub fn guard(input: &str) -> IResult<&str, Guard> {
    map(braced_list(constraint), Guard::from)(input)
}

/// A set of clocks written either as `{0, 1}` or as `{x0, x1}`.
pub fn resets(input: &str) -> IResult<&str, Vec<usize>> {
    braced_list(alt((variable('x'), natural)))(input)
}

/// Parse a single comparison such as `x0 < 70`.
///
/// ```rust
/// use qtpm_core::constraint::Constraint;
/// use qtpm_parser::parse_constraint;
///
/// assert_eq!(parse_constraint("x1 >= 4").unwrap(), Constraint::ge(1, 4));
/// ```
pub fn parse_constraint(input: &str) -> Result<Constraint, ParseError> {
    parse_all(constraint, input)
}

/// Parse a conjunction of comparisons written as `{x0 > 1, x2 < 10}`.
pub fn parse_guard(input: &str) -> Result<Guard, ParseError> {
    parse_all(guard, input)
}

pub fn parse_resets(input: &str) -> Result<Vec<usize>, ParseError> {
    parse_all(resets, input)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use qtpm_core::constraint::{Constraint, Guard};

    use super::{parse_constraint, parse_guard, parse_resets};
    use crate::parser::errors::ParseError;

    #[test]
    fn parse_comparisons() -> Result<(), Box<dyn Error>> {
        assert_eq!(parse_constraint("x0 < 70")?, Constraint::lt(0, 70));
        assert_eq!(parse_constraint("x0<=70")?, Constraint::le(0, 70));
        assert_eq!(parse_constraint("x12 > -3")?, Constraint::gt(12, -3));
        assert_eq!(parse_constraint(" x2 >= 0 ")?, Constraint::ge(2, 0));

        Ok(())
    }

    #[test]
    fn reject_malformed_comparisons() {
        assert!(parse_constraint("y0 < 1").is_err());
        assert!(parse_constraint("x0 = 1").is_err());
        assert!(parse_constraint("x0 < 1.5").is_err());
        assert_eq!(parse_constraint("x0 < 1 x1"), Err(ParseError::Incomplete("x1".to_string())));
    }

    #[test]
    fn parse_guards() -> Result<(), Box<dyn Error>> {
        let guard = parse_guard("{x0 > 1, x2 < 10}")?;

        assert_eq!(guard, Guard::from([Constraint::gt(0, 1), Constraint::lt(2, 10)]));
        assert!(parse_guard("{}")?.is_empty());
        assert!(parse_guard("\t{ }\n")?.is_empty());
        assert!(parse_guard("x0 > 1").is_err());

        Ok(())
    }

    #[test]
    fn parse_reset_sets() -> Result<(), Box<dyn Error>> {
        assert_eq!(parse_resets("{0, 1}")?, vec![0, 1]);
        assert_eq!(parse_resets("{x0, x3}")?, vec![0, 3]);
        assert_eq!(parse_resets("{ }")?, Vec::<usize>::new());
        assert_eq!(parse_resets("  {x1}  ")?, vec![1]);

        Ok(())
    }
}
