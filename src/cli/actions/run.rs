use crate::cli::{
    actions::{Action, console, predict, signout, status},
    telemetry,
};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions; the tracer is flushed whatever the outcome.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Console(args) => console::execute(args).await,
        Action::Predict { args, readings } => predict::execute(args, readings).await,
        Action::Status(args) => status::execute(args).await,
        Action::SignOut(args) => signout::execute(args).await,
    };

    telemetry::shutdown_tracer();

    result
}
