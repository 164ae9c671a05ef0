//! Command line options of the `qtpm` binary and the helpers applying them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, ValueEnum};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use qtpm_core::{Interval, MatchBounds, TimedAutomaton};
use qtpm_parser::parse_automaton;

/// Quantitative timed pattern matching
///
/// Reads a pattern timed automaton in DOT form and a piecewise-constant signal, one piece per
/// line written as `<duration> <x0> <x1> ...`, and prints for every piece the windows of the
/// signal matching the pattern together with their weight.
#[derive(Parser, Debug)]
#[command(version, name = "qtpm", about, long_about)]
pub(crate) struct Cli {
    /// Pattern timed automaton in DOT form
    #[arg(short = 'f', long)]
    pub(crate) automaton: PathBuf,

    /// Signal file, read from stdin if omitted
    #[arg(short, long)]
    pub(crate) input: Option<PathBuf>,

    /// Do not print the matching windows
    #[arg(short, long, default_value_t = false)]
    pub(crate) quiet: bool,

    /// Semiring used to weight the matches
    #[arg(short, long, value_enum, default_value_t = SemiringKind::MaxMin)]
    pub(crate) semiring: SemiringKind,

    #[command(flatten)]
    pub(crate) log_config: LoggerConfig,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SemiringKind {
    /// Space robustness: the best path is the one whose worst step is the most robust
    #[value(name = "maxmin")]
    MaxMin,
    /// Smallest accumulated robustness
    #[value(name = "minplus")]
    MinPlus,
    /// Largest accumulated robustness
    #[value(name = "maxplus")]
    MaxPlus,
    /// Plain satisfaction
    #[value(name = "boolean")]
    Boolean,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct LoggerConfig {
    /// Read the logger configuration from a log4rs configuration file
    #[arg(long)]
    logger_config_file: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Initialize log4rs. Log messages go to stderr, stdout is reserved for the matches.
pub(crate) fn initialize_logger(cfg: LoggerConfig) -> Result<(), anyhow::Error> {
    if let Some(file) = cfg.logger_config_file {
        return log4rs::init_file(&file, Default::default())
            .with_context(|| format!("Failed to load logger configuration from {}", file.display()));
    }

    let (pattern, level) = if cfg.debug {
        (
            "{d(%Y-%m-%d %H:%M:%S)} - {h({l})} - [{f}:{L} - {M}] - {m}{n}",
            LevelFilter::Debug,
        )
    } else {
        ("{d(%H:%M:%S)} - {h({l})} - {m}{n}", LevelFilter::Info)
    };

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .context("Failed to build logger configuration")?;

    log4rs::init_config(config).context("Failed to initialize logger")?;

    Ok(())
}

pub(crate) fn read_automaton(path: &Path) -> Result<TimedAutomaton, anyhow::Error> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read automaton file {}", path.display()))?;

    parse_automaton(&content).with_context(|| format!("Failed to parse automaton file {}", path.display()))
}

/// One constant piece of the input signal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sample {
    pub(crate) duration: f64,
    pub(crate) values: Vec<f64>,
}

/// Parse a line `<duration> <x0> <x1> ...`. Blank lines and lines starting with `#` yield `None`.
pub(crate) fn parse_sample(line: &str) -> Result<Option<Sample>, anyhow::Error> {
    let line = line.trim();

    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut numbers = line.split_whitespace().map(|word| {
        word.parse::<f64>()
            .with_context(|| format!("Invalid number \"{word}\""))
    });

    let duration = numbers
        .next()
        .ok_or_else(|| anyhow!("Missing duration"))??;
    let values = numbers.collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Sample { duration, values }))
}

fn format_interval(interval: &Interval, name: &str) -> String {
    let op = |closed: bool| if closed { "<=" } else { "<" };

    format!(
        "{} {} {} {} {}",
        interval.lower.value(),
        op(interval.lower.is_closed()),
        name,
        op(interval.upper.is_closed()),
        interval.upper.value()
    )
}

/// Render a set of matching windows in the block format printed by the binary.
pub(crate) fn format_match<W: std::fmt::Display>(bounds: &MatchBounds, weight: &W) -> String {
    format!(
        "----- Weight: {weight} -----\n{}\n{}\n{}\n=====\n",
        format_interval(&bounds.start(), "t"),
        format_interval(&bounds.end(), "t'"),
        format_interval(&bounds.duration(), "t' - t"),
    )
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use approx::assert_relative_eq;
    use clap::Parser;

    use super::{format_match, parse_sample, Cli, Sample, SemiringKind};
    use qtpm_core::constraint::{Constraint, Guard};
    use qtpm_core::{Location, Matcher, MinPlus, SpaceRobustness, TimedAutomaton, Transition};

    #[test]
    fn parse_samples() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            parse_sample("0.1  50 20\n")?,
            Some(Sample {
                duration: 0.1,
                values: vec![50.0, 20.0]
            })
        );
        assert_eq!(parse_sample("   ")?, None);
        assert_eq!(parse_sample("# duration x0")?, None);
        assert!(parse_sample("0.1 fifty").is_err());

        let single = parse_sample("2")?.ok_or("missing sample")?;
        assert_relative_eq!(single.duration, 2.0);
        assert!(single.values.is_empty());

        Ok(())
    }

    #[test]
    fn parse_arguments() -> Result<(), Box<dyn Error>> {
        let cli = Cli::try_parse_from(["qtpm", "-f", "pattern.dot", "-s", "minplus", "-q"])?;

        assert_eq!(cli.semiring, SemiringKind::MinPlus);
        assert!(cli.quiet);
        assert!(cli.input.is_none());

        let defaults = Cli::try_parse_from(["qtpm", "--automaton", "pattern.dot", "-i", "signal.txt"])?;

        assert_eq!(defaults.semiring, SemiringKind::MaxMin);
        assert!(!defaults.quiet);
        assert!(Cli::try_parse_from(["qtpm"]).is_err());
        assert!(Cli::try_parse_from(["qtpm", "-f", "a.dot", "-s", "tropical"]).is_err());

        Ok(())
    }

    #[test]
    fn print_match() -> Result<(), Box<dyn Error>> {
        let mut automaton = TimedAutomaton::new();
        let low = automaton.add_location(Location {
            initial: true,
            accepting: false,
            label: Guard::from([Constraint::lt(0, 70)]),
        });
        let done = automaton.add_location(Location {
            initial: false,
            accepting: true,
            label: Guard::default(),
        });
        automaton.add_transition(low, done, Transition::default());

        let mut matcher = Matcher::<MinPlus, _>::new(automaton, SpaceRobustness);
        matcher.feed(&[50.0], 1.0)?;

        let (bounds, weight) = matcher.result().iter().next().ok_or("missing match")?;
        let block = format_match(bounds, weight);
        let lines: Vec<_> = block.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "----- Weight: 20 -----");
        assert!(lines[1].contains(" t "));
        assert!(lines[2].contains(" t' "));
        assert!(lines[3].contains(" t' - t "));
        assert_eq!(lines[4], "=====");
        assert!(block.ends_with("=====\n"));

        Ok(())
    }
}
