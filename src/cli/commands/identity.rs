use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_USER_POOL_ID: &str = "user-pool-id";
pub const ARG_CLIENT_ID: &str = "client-id";
pub const ARG_IDENTITY_ENDPOINT: &str = "identity-endpoint";
pub const ARG_SESSION_DIR: &str = "session-dir";

/// Directory under `$HOME` holding stored sessions when `--session-dir` is not given.
pub const DEFAULT_SESSION_DIR: &str = ".cropsight";

#[derive(Debug, Clone)]
pub struct Options {
    pub user_pool_id: String,
    pub client_id: String,
    pub identity_endpoint: Option<String>,
    pub session_dir: PathBuf,
}

impl Options {
    /// Parse identity arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the pool or client id is missing, or no session
    /// directory can be determined.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(user_pool_id) = get_non_empty(ARG_USER_POOL_ID) else {
            anyhow::bail!("missing required argument: --{ARG_USER_POOL_ID}");
        };
        let Some(client_id) = get_non_empty(ARG_CLIENT_ID) else {
            anyhow::bail!("missing required argument: --{ARG_CLIENT_ID}");
        };

        let session_dir = match get_non_empty(ARG_SESSION_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_session_dir().ok_or_else(|| {
                anyhow::anyhow!("cannot determine home directory, use --{ARG_SESSION_DIR}")
            })?,
        };

        Ok(Self {
            user_pool_id,
            client_id,
            identity_endpoint: get_non_empty(ARG_IDENTITY_ENDPOINT),
            session_dir,
        })
    }
}

fn default_session_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(DEFAULT_SESSION_DIR))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_USER_POOL_ID)
                .long(ARG_USER_POOL_ID)
                .help("Cognito user pool id, example: us-east-1_AbCdEf123")
                .env("CROPSIGHT_USER_POOL_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_CLIENT_ID)
                .long(ARG_CLIENT_ID)
                .help("Cognito app client id (public client, no secret)")
                .env("CROPSIGHT_CLIENT_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_ENDPOINT)
                .long(ARG_IDENTITY_ENDPOINT)
                .help("Override the identity endpoint derived from the pool region")
                .env("CROPSIGHT_IDENTITY_ENDPOINT")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_DIR)
                .long(ARG_SESSION_DIR)
                .help("Directory for stored sessions (default: $HOME/.cropsight)")
                .env("CROPSIGHT_SESSION_DIR")
                .global(true),
        )
}
