//! Integration tests: read automata from DOT descriptions and match them against signals.

use std::error::Error;

use approx::assert_relative_eq;

use qtpm_core::robustness::SpaceRobustness;
use qtpm_core::semiring::{MaxMin, MinPlus};
use qtpm_core::Matcher;
use qtpm_parser::{parse_automaton, ParseError};

const HIGH_THEN_LOW: &str = r#"
digraph G {
    // high revolutions in a low gear, followed by a short stay in a high gear
    0 [init=1][match=0][label="{x0 > 100, x1 < 30}"];
    1 [init=0][match=0][label="{x1 > 60}"];
    2 [init=0][match=1][label="{}"];
    0 -> 1 [reset="{0}"][guard="{}"];
    1 -> 2 [guard="{x0 < 4}"];
}
"#;

#[test]
fn automaton_properties() -> Result<(), Box<dyn Error>> {
    let automaton = parse_automaton(HIGH_THEN_LOW)?;
    let locations: Vec<_> = automaton.locations().map(|(_, l)| l.clone()).collect();

    assert_eq!(automaton.max_constant(), 4);
    assert_eq!(automaton.num_clocks(), 1);
    assert_eq!(automaton.num_signals(), 2);

    assert_eq!(locations.iter().map(|l| l.initial).collect::<Vec<_>>(), vec![true, false, false]);
    assert_eq!(locations.iter().map(|l| l.accepting).collect::<Vec<_>>(), vec![false, false, true]);
    assert_eq!(locations.iter().map(|l| l.label.len()).collect::<Vec<_>>(), vec![2, 1, 0]);

    let ids: Vec<_> = automaton.locations().map(|(id, _)| id).collect();
    let transition = automaton.find_transition(ids[0], ids[1]).ok_or("missing transition")?;

    assert_eq!(transition.resets, vec![0]);
    assert!(transition.guard.is_empty());

    Ok(())
}

#[test]
fn match_parsed_automaton() -> Result<(), Box<dyn Error>> {
    let automaton = parse_automaton(HIGH_THEN_LOW)?;
    let mut matcher = Matcher::<MaxMin, _>::new(automaton, SpaceRobustness);

    matcher.feed(&[130.0, 20.0], 1.0)?;

    // Windows inside the first piece see x1 < 60 in location 1.
    assert!(!matcher.result().is_empty());
    assert!(matcher.result().values().all(|w| *w == MaxMin(-40.0)));

    matcher.feed(&[150.0, 80.0], 1.0)?;

    let best = matcher.result().values().fold(MaxMin(f64::NEG_INFINITY), |acc, w| acc + *w);

    // min(130 - 100, 30 - 20, 80 - 60) for the windows covering both pieces
    assert_relative_eq!(best.value(), 10.0);

    Ok(())
}

#[test]
fn match_counts_every_piece() -> Result<(), Box<dyn Error>> {
    let automaton = parse_automaton(HIGH_THEN_LOW)?;
    let mut matcher = Matcher::<MinPlus, _>::new(automaton, SpaceRobustness);

    matcher.feed(&[130.0, 20.0], 1.0)?;
    matcher.feed(&[150.0, 80.0], 1.0)?;

    assert!(!matcher.result().is_empty());
    assert!(matcher.result().values().all(|w| w.value().is_finite()));

    Ok(())
}

#[test]
fn reject_malformed_automata() {
    assert!(matches!(
        parse_automaton("digraph G { 0 [init=1]; 0 -> 3; }"),
        Err(ParseError::UndefinedLocation { .. })
    ));
    assert!(matches!(
        parse_automaton(r#"digraph G { 0 [init=1]; 0 -> 0 [guard="{y0 < 1}"]; }"#),
        Err(ParseError::InvalidAttribute { .. })
    ));
    assert!(matches!(parse_automaton("graph G { }"), Err(ParseError::Syntax(_))));
}
