use clap::{CommandFactory, Parser};
use inputtimeout::{read_with, InputError, Reply, Strategy, TimedRead};
use owo_colors::OwoColorize;
use std::io;
use std::process::exit;
use std::time::Duration;

mod args;

use args::Args;

const EXIT_CANCELED: i32 = 125;
const EXIT_INTERRUPTED: i32 = 128 + 2;

fn invalid(input: &str, reason: String) -> InputError {
    InputError::InvalidTimeout {
        input: input.to_string(),
        reason,
    }
}

/// Parse `10`, `10s`, `1.5m`, `2h` or `1d` into a positive duration
fn parse_duration(input: &str) -> Result<Duration, InputError> {
    let input = input.trim();

    let last_alpha = input.chars().last().filter(|c| c.is_alphabetic());
    let (value_str, multiplier) = if let Some(last) = last_alpha {
        let (val, suffix) = input.split_at(input.len() - last.len_utf8());
        let mult = match suffix {
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86400,
            _ => return Err(invalid(input, format!("invalid time suffix '{}'", suffix))),
        };
        (val, mult)
    } else {
        (input, 1)
    };

    let value: f64 = value_str
        .parse()
        .map_err(|_| invalid(input, format!("invalid numeric value '{}'", value_str)))?;

    inputtimeout::reader::timeout_from_secs(value * multiplier as f64)
}

fn main() {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        clap_complete::generate(shell, &mut Args::command(), "inputtimeout", &mut io::stdout());
        return;
    }

    let timeout = match parse_duration(&args.timeout) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            exit(EXIT_CANCELED);
        }
    };

    let strategy = Strategy::active();
    if args.verbose {
        eprintln!(
            "{}: using {} input, timeout {:?}",
            "Info".cyan(),
            strategy,
            timeout
        );
    }

    let request = TimedRead::default()
        .prompt(args.prompt)
        .timeout(timeout)
        .default_value(args.default_value);

    match read_with(&request) {
        Ok(Reply::Line(line)) => {
            println!("{}", line);
        }
        Ok(Reply::Defaulted(value)) => {
            if args.verbose {
                eprintln!("{}: no input after {:?}", "Timeout".yellow(), timeout);
            }
            println!("{}", value);
            if let Some(status) = args.status_on_timeout {
                exit(status);
            }
        }
        Err(e) if e.is_interrupt() => {
            eprintln!();
            exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            exit(EXIT_CANCELED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_units() {
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1.5m").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration(" 1d ").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("0.05").unwrap(), Duration::from_millis(50));
    }

    #[test]
    fn duration_rejects_bad_input() {
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("-3").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5é").is_err());
    }
}
