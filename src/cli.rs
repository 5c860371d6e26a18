use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::history::DATE_FORMAT;

pub const USAGE: &str = "\
Usage: masi_crawler <command>

Commands:
  fetch                 fetch the current MASI value and print it
  update                fetch the current value and append it to the history file
  predict [YYYY-MM-DD]  forecast the next value for a future trading day
                        (defaults to the next trading day)
  schedule              run the daily update on the configured cron schedule
  help                  print this message

Settings come from app.json and MASI_* environment variables.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Fetch,
    Update,
    Predict(Option<NaiveDate>),
    Schedule,
    Help,
}

pub fn parse<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let command = match args.next() {
        None => return Ok(Command::Help),
        Some(a) => a,
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "fetch" => Command::Fetch,
        "update" => Command::Update,
        "predict" => match args.next() {
            Some(d) => Command::Predict(Some(
                NaiveDate::parse_from_str(d.trim(), DATE_FORMAT)
                    .map_err(|why| anyhow!("Invalid date '{}': {}", d, why))?,
            )),
            None => Command::Predict(None),
        },
        "schedule" => Command::Schedule,
        "help" | "-h" | "--help" => Command::Help,
        other => return Err(anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    };

    if let Some(extra) = args.next() {
        return Err(anyhow!("Unexpected argument: {}", extra));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse(args(&[])).unwrap(), Command::Help);
        assert_eq!(parse(args(&["fetch"])).unwrap(), Command::Fetch);
        assert_eq!(parse(args(&["UPDATE"])).unwrap(), Command::Update);
        assert_eq!(parse(args(&["schedule"])).unwrap(), Command::Schedule);
        assert_eq!(parse(args(&["--help"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_predict() {
        assert_eq!(parse(args(&["predict"])).unwrap(), Command::Predict(None));
        assert_eq!(
            parse(args(&["predict", "2024-05-06"])).unwrap(),
            Command::Predict(NaiveDate::from_ymd_opt(2024, 5, 6))
        );
        assert!(parse(args(&["predict", "06/05/2024"])).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse(args(&["train"])).is_err());
        assert!(parse(args(&["update", "now"])).is_err());
    }
}
