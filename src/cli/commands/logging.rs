use clap::{Arg, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Accepts a level name or a number from 0 to 5, as `CROPSIGHT_LOG_LEVEL` may
/// carry either.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>()
            && parsed <= 5
        {
            return Ok(parsed);
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err(format!(
                "invalid log level '{level}', expected error, warn, info, debug or trace"
            )),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log to stderr: -v warn, -vv info, -vvv debug, -vvvv trace (default: error)")
            .long_help(
                "Log verbosity. Logs always go to stderr so they never mix with the console \
                 panels or the `predict` output on stdout.",
            )
            .env("CROPSIGHT_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
