use crate::{cli::actions::{Args, session}, console::Console};
use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::debug;

/// Recover the stored session, then read commands from stdin until EOF or `quit`.
/// # Errors
/// Returns an error if configuration is invalid or the terminal cannot be read.
pub async fn execute(args: Args) -> Result<()> {
    let (mut app, notices) = session::connect(&args)?;

    let view = app.bootstrap().await;
    debug!("starting console on {view:?}");

    let mut console = Console::new(app, notices, std::io::stdout());
    console
        .run(BufReader::new(tokio::io::stdin()))
        .await
        .context("console I/O failed")?;

    Ok(())
}
