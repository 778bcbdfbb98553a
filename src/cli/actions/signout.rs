use crate::cli::actions::{Args, session};
use anyhow::Result;
use tracing::info;

/// Clear the stored session, if there is one. Works offline: only the local
/// token store is read.
/// # Errors
/// Returns an error if configuration is invalid.
pub async fn execute(args: Args) -> Result<()> {
    let (mut app, _notices) = session::connect(&args)?;

    match app.adopt_stored_user() {
        Some(username) => {
            app.sign_out().await;
            info!("signed out {username}");
            println!("Signed out {username}.");
        }
        None => println!("No stored session."),
    }

    Ok(())
}
