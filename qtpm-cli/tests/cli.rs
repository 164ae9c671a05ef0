//! Run the qtpm binary on the automata and signals under tests/resources.

use std::error::Error;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn qtpm(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_qtpm"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(args)
        .output()?;

    Ok(output)
}

#[test]
fn help() -> Result<(), Box<dyn Error>> {
    let output = qtpm(&["--help"])?;

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("--automaton"));

    Ok(())
}

#[test]
fn match_signal_file() -> Result<(), Box<dyn Error>> {
    let output = qtpm(&["-f", "tests/resources/high_then_low.dot", "-i", "tests/resources/signal.txt"])?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("----- Weight: -40 -----"));
    assert!(stdout.contains("----- Weight: 10 -----"));
    assert_eq!(
        stdout.lines().filter(|line| line.starts_with("-----")).count(),
        stdout.lines().filter(|line| *line == "=====").count()
    );

    Ok(())
}

#[test]
fn read_signal_from_stdin() -> Result<(), Box<dyn Error>> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_qtpm"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["-f", "tests/resources/high_then_low.dot", "-s", "boolean"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    child
        .stdin
        .take()
        .ok_or("missing stdin")?
        .write_all(b"1.0 130 20\n1.0 150 80\n")?;

    let output = child.wait_with_output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert!(stdout.contains("----- Weight: 1 -----"));

    Ok(())
}

#[test]
fn quiet() -> Result<(), Box<dyn Error>> {
    let output = qtpm(&[
        "-q",
        "-f",
        "tests/resources/high_then_low.dot",
        "-i",
        "tests/resources/signal.txt",
    ])?;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    Ok(())
}

#[test]
fn reject_malformed_input() -> Result<(), Box<dyn Error>> {
    let broken = qtpm(&["-f", "tests/resources/broken.dot", "-i", "tests/resources/signal.txt"])?;
    let missing = qtpm(&["-f", "tests/resources/missing.dot", "-i", "tests/resources/signal.txt"])?;

    assert!(!broken.status.success());
    assert!(!missing.status.success());

    Ok(())
}
