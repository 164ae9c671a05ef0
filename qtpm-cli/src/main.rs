//! qtpm Command Line Interface
//!
//! Matches a pattern timed automaton against a piecewise-constant signal read line by line, and
//! prints the matching windows found after each piece.

use std::fmt::Display;
use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::Context;
use clap::Parser;
use log::{debug, info};

use qtpm_core::{Boolean, MaxMin, MaxPlus, Matcher, MinPlus, Semiring, SpaceRobustness, TimedAutomaton};

use cli::{format_match, initialize_logger, parse_sample, read_automaton, Cli, SemiringKind};

mod cli;

fn run<W>(automaton: TimedAutomaton, input: impl BufRead, quiet: bool) -> Result<(), anyhow::Error>
where
    W: Semiring + Eq + Hash + From<f64> + Display,
{
    let mut matcher = Matcher::<W, _>::new(automaton, SpaceRobustness);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut found = 0;

    for (number, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", number + 1))?;
        let Some(sample) = parse_sample(&line).with_context(|| format!("Invalid sample on line {}", number + 1))?
        else {
            continue;
        };

        matcher
            .feed(&sample.values, sample.duration)
            .with_context(|| format!("Invalid sample on line {}", number + 1))?;

        let result = matcher.take_result();
        found += result.len();

        debug!(
            "line {}: {} new matches, {} partial matches",
            number + 1,
            result.len(),
            matcher.configuration_len()
        );

        if !quiet {
            for (bounds, weight) in &result {
                write!(out, "{}", format_match(bounds, weight))?;
            }
        }
    }

    out.flush()?;
    info!("Found {found} matches until time {}", matcher.absolute_time());

    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    initialize_logger(cli.log_config)?;

    let automaton = read_automaton(&cli.automaton)?;
    info!(
        "Read pattern with {} locations and {} transitions",
        automaton.num_locations(),
        automaton.num_transitions()
    );

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open signal file {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    match cli.semiring {
        SemiringKind::MaxMin => run::<MaxMin>(automaton, input, cli.quiet),
        SemiringKind::MinPlus => run::<MinPlus>(automaton, input, cli.quiet),
        SemiringKind::MaxPlus => run::<MaxPlus>(automaton, input, cli.quiet),
        SemiringKind::Boolean => run::<Boolean>(automaton, input, cli.quiet),
    }
}
