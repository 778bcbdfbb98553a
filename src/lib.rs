//! # Cropsight (Crop Recommendation Client)
//!
//! `cropsight` is a terminal front-end for a crop recommendation service. Users
//! authenticate against a managed identity provider (Cognito user pools) and then
//! submit soil and weather readings to a prediction API that returns a crop label.
//!
//! ## Identity
//!
//! Sign-up, email verification, sign-in, sign-out and password reset are delegated
//! to the provider through the [`identity::IdentityProvider`] boundary. The
//! [`identity::adapter::IdentityAdapter`] keeps exactly one pending operation (the
//! user a confirmation code applies to). Tokens are persisted by the
//! [`identity::store::TokenStore`] so a later run can recover the session.
//!
//! ## Session & Views
//!
//! [`app::App`] is the single session context. It owns the adapter, the prediction
//! client, the [`view::ViewController`] and the [`notify::Notifier`]. State changes
//! are published as snapshots; the [`console`] renderer subscribes to them rather
//! than being called from business code.
//!
//! ## Bootstrap
//!
//! On start the stored session is checked in a fixed order: existence, validity
//! (refreshing expired tokens once), then user attributes. Any failure falls back to
//! the sign-in panel.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod identity;
pub mod notify;
pub mod predict;
pub mod view;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_user_agent_has_version() {
        assert!(APP_USER_AGENT.starts_with("cropsight/"));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
