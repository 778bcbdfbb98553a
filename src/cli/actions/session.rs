//! Wiring shared by every action: validated configuration, token store,
//! identity provider, prediction client and the notice channel.

use crate::{
    app::App,
    cli::actions::Args,
    config::Config,
    identity::{cognito::CognitoProvider, store::TokenStore},
    notify::{Notice, Notifier},
    predict::PredictionClient,
};
use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

/// Build the session context from CLI settings.
/// # Errors
/// Returns an error if the configuration is invalid or an HTTP client cannot be built.
pub fn connect(args: &Args) -> Result<(App<CognitoProvider>, UnboundedReceiver<Notice>)> {
    let mut config = Config::new(&args.user_pool_id, &args.client_id, &args.api_base_url)
        .context("invalid configuration")?;
    if let Some(endpoint) = &args.identity_endpoint {
        config = config
            .with_identity_endpoint(endpoint)
            .context("invalid identity endpoint")?;
    }

    log_startup(&config, args);

    let store = TokenStore::new(&args.session_dir, config.client_id());
    let provider = CognitoProvider::new(&config, store)?;
    let predictor = PredictionClient::new(config.api_base_url())?;
    let (notifier, notices) = Notifier::channel();

    Ok((App::new(provider, predictor, notifier), notices))
}

fn log_startup(config: &Config, args: &Args) {
    let entries = [
        ("user_pool_id", config.user_pool_id().to_string()),
        ("region", config.region().to_string()),
        ("identity_endpoint", config.identity_endpoint().to_string()),
        ("api_base_url", config.api_base_url().to_string()),
        ("session_dir", args.session_dir.display().to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    BANNER.replace(
        "{VERSION}",
        &format!(
            " - {} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

const BANNER: &str = r"
     \ | /
   -- (*) --   C R O P S I G H T {VERSION}
     / | \
  ~~~~~|~~~~~
       |";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> Args {
        Args {
            user_pool_id: "us-east-1_AbCdEf123".to_string(),
            client_id: "client".to_string(),
            identity_endpoint: None,
            session_dir: PathBuf::from("/tmp/cropsight-test"),
            api_base_url: "http://localhost:8000".to_string(),
        }
    }

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit(" abc "), "abc");
    }

    #[test]
    fn banner_carries_version() {
        assert!(banner().contains(env!("CARGO_PKG_VERSION")));
        assert!(!banner().contains("{VERSION}"));
    }

    #[test]
    fn connect_starts_on_sign_in() {
        let (app, _notices) = connect(&args()).unwrap();
        assert_eq!(app.current_view(), crate::view::ViewState::AuthSignIn);
    }

    #[test]
    fn connect_rejects_placeholder_pool() {
        let mut args = args();
        args.user_pool_id = crate::config::PLACEHOLDER_POOL_ID.to_string();
        let err = connect(&args).err().unwrap();
        assert_eq!(err.to_string(), "invalid configuration");
    }

    #[test]
    fn connect_rejects_bad_identity_endpoint() {
        let mut args = args();
        args.identity_endpoint = Some("ftp://example.com".to_string());
        assert!(connect(&args).is_err());
    }
}
