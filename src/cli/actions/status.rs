use crate::cli::actions::{Args, session};
use anyhow::Result;

/// Run session recovery and report where the console would start.
/// # Errors
/// Returns an error if configuration is invalid.
pub async fn execute(args: Args) -> Result<()> {
    let (mut app, _notices) = session::connect(&args)?;

    let view = app.bootstrap().await;
    println!("panel:     {view}");
    println!(
        "principal: {}",
        app.session().principal_email().unwrap_or("none")
    );

    Ok(())
}
