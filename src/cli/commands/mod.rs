pub mod identity;
pub mod logging;
pub mod prediction;

use clap::{
    ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const CMD_CONSOLE: &str = "console";
pub const CMD_PREDICT: &str = "predict";
pub const CMD_STATUS: &str = "status";
pub const CMD_SIGNOUT: &str = "signout";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("cropsight")
        .about("Crop recommendation client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand(
            Command::new(CMD_CONSOLE).about("Interactive sign-in and prediction (default)"),
        )
        .subcommand(prediction::predict_command())
        .subcommand(
            Command::new(CMD_STATUS).about("Check the stored session and show the active panel"),
        )
        .subcommand(Command::new(CMD_SIGNOUT).about("Forget the stored session"));

    let command = identity::with_args(command);
    let command = prediction::with_args(command);
    logging::with_args(command)
}
