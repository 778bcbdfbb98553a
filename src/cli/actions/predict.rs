use crate::{
    cli::actions::{Args, session},
    predict::PredictionRequest,
    view::ViewState,
};
use anyhow::{Context, Result, bail};

/// One-shot prediction with the stored session.
/// # Errors
/// Returns an error if nobody is signed in, a reading is invalid, or the
/// prediction API call fails.
pub async fn execute(args: Args, readings: [f64; 7]) -> Result<()> {
    let request = PredictionRequest::from_values(readings)?;

    let (mut app, _notices) = session::connect(&args)?;
    if app.bootstrap().await != ViewState::App {
        bail!("no signed-in session, sign in with `cropsight console` first");
    }

    let result = app
        .predict(&request)
        .await
        .context(crate::app::PREDICTION_FAILED)?;

    println!("{}", result.predicted_crop);

    Ok(())
}
