pub mod console;
pub mod predict;
pub mod session;
pub mod signout;
pub mod status;

// Internal "interpreter" for `Action`.
mod run;

use std::path::PathBuf;

/// Settings shared by every action.
#[derive(Debug, Clone)]
pub struct Args {
    pub user_pool_id: String,
    pub client_id: String,
    pub identity_endpoint: Option<String>,
    pub session_dir: PathBuf,
    pub api_base_url: String,
}

#[derive(Debug)]
pub enum Action {
    Console(Args),
    Predict { args: Args, readings: [f64; 7] },
    Status(Args),
    SignOut(Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
