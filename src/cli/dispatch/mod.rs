//! Maps validated CLI matches to an [`Action`]. A missing subcommand runs the
//! interactive console.

use crate::cli::actions::{Action, Args};
use crate::cli::commands::{
    CMD_CONSOLE, CMD_PREDICT, CMD_SIGNOUT, CMD_STATUS, identity, prediction,
};
use anyhow::{Result, anyhow};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let identity_opts = identity::Options::parse(matches)?;
    let prediction_opts = prediction::Options::parse(matches)?;

    let args = Args {
        user_pool_id: identity_opts.user_pool_id,
        client_id: identity_opts.client_id,
        identity_endpoint: identity_opts.identity_endpoint,
        session_dir: identity_opts.session_dir,
        api_base_url: prediction_opts.api_base_url,
    };

    match matches.subcommand() {
        None | Some((CMD_CONSOLE, _)) => Ok(Action::Console(args)),
        Some((CMD_PREDICT, sub_m)) => Ok(Action::Predict {
            args,
            readings: prediction::readings(sub_m)?,
        }),
        Some((CMD_STATUS, _)) => Ok(Action::Status(args)),
        Some((CMD_SIGNOUT, _)) => Ok(Action::SignOut(args)),
        Some((other, _)) => Err(anyhow!("unknown subcommand: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const POOL: &str = "us-east-1_AbCdEf123";

    fn matches(argv: &[&str]) -> clap::ArgMatches {
        crate::cli::commands::new().get_matches_from(argv)
    }

    #[test]
    fn user_pool_id_required() {
        temp_env::with_vars(
            [
                ("CROPSIGHT_USER_POOL_ID", None::<&str>),
                ("CROPSIGHT_CLIENT_ID", Some("client")),
            ],
            || {
                let result = handler(&matches(&["cropsight"]));
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(
                        err.to_string()
                            .contains("missing required argument: --user-pool-id")
                    );
                }
            },
        );
    }

    #[test]
    fn default_is_console_with_home_session_dir() {
        temp_env::with_vars(
            [
                ("CROPSIGHT_USER_POOL_ID", Some(POOL)),
                ("CROPSIGHT_CLIENT_ID", Some("client")),
                ("CROPSIGHT_SESSION_DIR", None),
                ("HOME", Some("/home/farmer")),
            ],
            || {
                let action = handler(&matches(&["cropsight"]));
                match action {
                    Ok(Action::Console(args)) => {
                        assert_eq!(args.user_pool_id, POOL);
                        assert_eq!(args.session_dir, PathBuf::from("/home/farmer/.cropsight"));
                    }
                    other => panic!("unexpected action {other:?}"),
                }
            },
        );
    }

    #[test]
    fn subcommands_map_to_actions() {
        temp_env::with_vars(
            [
                ("CROPSIGHT_USER_POOL_ID", Some(POOL)),
                ("CROPSIGHT_CLIENT_ID", Some("client")),
                ("CROPSIGHT_SESSION_DIR", Some("/tmp/cropsight")),
            ],
            || {
                assert!(matches!(
                    handler(&matches(&["cropsight", "status"])),
                    Ok(Action::Status(_))
                ));
                assert!(matches!(
                    handler(&matches(&["cropsight", "signout"])),
                    Ok(Action::SignOut(_))
                ));
                match handler(&matches(&[
                    "cropsight", "predict", "90", "42", "43", "20.8", "82", "6.5", "202.9",
                ])) {
                    Ok(Action::Predict { args, readings }) => {
                        assert_eq!(args.session_dir, PathBuf::from("/tmp/cropsight"));
                        assert_eq!(readings[0], 90.0);
                        assert_eq!(readings[6], 202.9);
                    }
                    other => panic!("unexpected action {other:?}"),
                }
            },
        );
    }
}
