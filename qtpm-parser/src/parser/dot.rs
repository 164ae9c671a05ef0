//! Reader for timed automata written in a subset of the Graphviz DOT language.
//!
//! Locations are nodes, transitions are edges. The attributes understood are
//!
//! - on nodes: `init` and `match` (`0`, `1`, `true` or `false`), and `label`, a guard over the
//!   signal variables such as `"{x0 < 70}"`;
//! - on edges: `guard`, a guard over the clocks, and `reset`, a set of clocks such as `"{0, 1}"`.
//!
//! Every other attribute, and graph, node and edge default statements, are ignored.

use std::collections::HashMap;

use log::debug;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while1};
use nom::character::complete::{char, one_of};
use nom::combinator::{map, opt, recognize, value};
use nom::multi::{many0, many1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

use qtpm_core::automaton::{Location, LocationId, TimedAutomaton, Transition};

use super::common::{op0, parse_all, ws};
use super::constraint::{guard, resets};
use super::errors::ParseError;

type Attributes = Vec<(String, String)>;

#[derive(Clone)]
enum Statement {
    Node(String, Attributes),
    Edge(String, String, Attributes),
    Ignored,
}

fn identifier(input: &str) -> IResult<&str, String> {
    let plain = map(
        recognize(pair(opt(char('-')), take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'))),
        String::from,
    );
    let escape = escaped_transform(is_not("\\\""), '\\', alt((value("\"", char('"')), value("\\", char('\\')))));
    let quoted = delimited(char('"'), map(opt(escape), Option::unwrap_or_default), char('"'));

    alt((quoted, plain))(input)
}

fn attribute(input: &str) -> IResult<&str, (String, String)> {
    let assignment = tuple((identifier, op0("="), identifier));
    let separator = opt(preceded(ws, one_of(",;")));

    map(terminated(assignment, separator), |(name, _, value)| (name, value))(input)
}

/// One or more bracketed attribute lists, such as `[init=1][label="{x0 < 1}", match=0]`.
fn attributes(input: &str) -> IResult<&str, Attributes> {
    let list = delimited(
        pair(char('['), ws),
        many0(terminated(attribute, ws)),
        char(']'),
    );

    map(many1(terminated(list, ws)), |lists| lists.into_iter().flatten().collect())(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    let defaults = value(
        Statement::Ignored,
        pair(alt((tag("graph"), tag("node"), tag("edge"))), preceded(ws, attributes)),
    );
    let graph_attribute = value(Statement::Ignored, tuple((identifier, op0("="), identifier)));
    let edge = map(
        tuple((identifier, op0("->"), identifier, ws, opt(attributes))),
        |(from, _, to, _, attrs)| Statement::Edge(from, to, attrs.unwrap_or_default()),
    );
    let node = map(pair(terminated(identifier, ws), opt(attributes)), |(id, attrs)| {
        Statement::Node(id, attrs.unwrap_or_default())
    });

    alt((defaults, edge, graph_attribute, node))(input)
}

fn graph(input: &str) -> IResult<&str, Vec<Statement>> {
    let header = tuple((ws, opt(pair(tag("strict"), ws)), tag("digraph"), ws, opt(identifier), ws));
    let statements = many0(terminated(statement, pair(ws, opt(pair(char(';'), ws)))));

    preceded(header, delimited(pair(char('{'), ws), statements, char('}')))(input)
}

fn flag(name: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ParseError::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn location(attrs: &[(String, String)]) -> Result<Location, ParseError> {
    let mut location = Location::default();

    for (name, value) in attrs {
        match name.as_str() {
            "init" => location.initial = flag(name, value)?,
            "match" => location.accepting = flag(name, value)?,
            "label" => {
                location.label = parse_all(guard, value.trim()).map_err(|_| ParseError::InvalidAttribute {
                    name: name.clone(),
                    value: value.clone(),
                })?
            }
            _ => {}
        }
    }

    Ok(location)
}

fn transition(attrs: &[(String, String)]) -> Result<Transition, ParseError> {
    let mut transition = Transition::default();

    for (name, value) in attrs {
        let invalid = || ParseError::InvalidAttribute {
            name: name.clone(),
            value: value.clone(),
        };

        match name.as_str() {
            "guard" => transition.guard = parse_all(guard, value.trim()).map_err(|_| invalid())?,
            "reset" => transition.resets = parse_all(resets, value.trim()).map_err(|_| invalid())?,
            _ => {}
        }
    }

    Ok(transition)
}

/// Read a timed automaton from its DOT description.
///
/// Locations are added in increasing order of their identifiers when every identifier is an
/// integer, and in order of first declaration otherwise. Every location used by a transition must
/// be declared by a node statement.
///
/// ```rust
/// use qtpm_parser::parse_automaton;
///
/// let automaton = parse_automaton(r#"
///     digraph G {
///         0 [init=1][match=0][label="{x0 < 70}"];
///         1 [init=0][match=1][label="{}"];
///         0 -> 1 [guard="{x0 < 5}"][reset="{}"];
///     }
/// "#).unwrap();
///
/// assert_eq!(automaton.num_locations(), 2);
/// assert_eq!(automaton.max_constant(), 5);
/// ```
pub fn parse_automaton(input: &str) -> Result<TimedAutomaton, ParseError> {
    let statements = parse_all(graph, input)?;

    let mut nodes: Vec<(String, Attributes)> = Vec::new();
    let mut edges = Vec::new();

    for statement in statements {
        match statement {
            Statement::Node(id, attrs) => match nodes.iter_mut().find(|(other, _)| *other == id) {
                Some((_, existing)) => existing.extend(attrs),
                None => nodes.push((id, attrs)),
            },
            Statement::Edge(from, to, attrs) => edges.push((from, to, attrs)),
            Statement::Ignored => {}
        }
    }

    if nodes.iter().all(|(id, _)| id.parse::<u64>().is_ok()) {
        nodes.sort_by_key(|(id, _)| id.parse::<u64>().unwrap_or_default());
    }

    let mut automaton = TimedAutomaton::new();
    let mut ids: HashMap<String, LocationId> = HashMap::new();

    for (id, attrs) in &nodes {
        let added = automaton.add_location(location(attrs)?);
        ids.insert(id.clone(), added);
    }

    for (from, to, attrs) in &edges {
        let (source, target) = match (ids.get(from), ids.get(to)) {
            (Some(source), Some(target)) => (*source, *target),
            _ => {
                return Err(ParseError::UndefinedLocation {
                    from: from.clone(),
                    to: to.clone(),
                })
            }
        };

        automaton.add_transition(source, target, transition(attrs)?);
    }

    debug!(
        "read automaton with {} locations and {} transitions",
        automaton.num_locations(),
        automaton.num_transitions()
    );

    Ok(automaton)
}
