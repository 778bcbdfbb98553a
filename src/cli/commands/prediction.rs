use clap::{Arg, ArgMatches, Command};

pub const ARG_API_BASE_URL: &str = "api-base-url";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_base_url: String,
}

impl Options {
    /// Parse prediction API arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the base URL is empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        match matches.get_one::<String>(ARG_API_BASE_URL) {
            Some(value) if !value.trim().is_empty() => Ok(Self {
                api_base_url: value.clone(),
            }),
            _ => anyhow::bail!("missing required argument: --{ARG_API_BASE_URL}"),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_API_BASE_URL)
            .long(ARG_API_BASE_URL)
            .help("Prediction API base URL")
            .default_value(DEFAULT_API_BASE_URL)
            .env("CROPSIGHT_API_BASE_URL")
            .global(true),
    )
}

/// Positional readings of the `predict` subcommand, in request order.
pub const READINGS: [(&str, &str); 7] = [
    ("N", "Nitrogen content of the soil"),
    ("P", "Phosphorus content of the soil"),
    ("K", "Potassium content of the soil"),
    ("temperature", "Temperature in degrees Celsius"),
    ("humidity", "Relative humidity in percent"),
    ("ph", "Soil pH"),
    ("rainfall", "Rainfall in mm"),
];

#[must_use]
pub fn predict_command() -> Command {
    READINGS.iter().fold(
        Command::new("predict")
            .about("Request a crop recommendation with the stored session"),
        |command, (name, help)| {
            command.arg(
                Arg::new(*name)
                    .help(*help)
                    .required(true)
                    .allow_negative_numbers(true)
                    .value_parser(clap::value_parser!(f64)),
            )
        },
    )
}

/// Reads the seven positional values in request order.
///
/// # Errors
/// Returns an error if a value is missing.
pub fn readings(matches: &ArgMatches) -> anyhow::Result<[f64; 7]> {
    let mut values = [0.0_f64; 7];
    for (slot, (name, _)) in values.iter_mut().zip(READINGS) {
        *slot = matches
            .get_one::<f64>(name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: <{name}>"))?;
    }
    Ok(values)
}
