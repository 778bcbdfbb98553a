//! Identity-provider boundary. The provider owns the authentication protocol and
//! token issuance; this crate only drives its operations and keeps track of which
//! user a pending confirmation code belongs to.
//!
//! Flow Overview: sign-up registers the user and leaves a pending handle that
//! `verify`/`resend` act on. Sign-in replaces the handle and, on success, the
//! provider persists tokens locally. Forgot-password replaces the handle and
//! `reset` applies the emailed code plus the new password to it. Passwords and
//! tokens are held in `secrecy` wrappers or redacted types and must never be logged.

pub mod adapter;
pub mod cognito;
pub mod store;

use crate::error::AuthError;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Handle naming the user an in-flight identity flow applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingUser {
    username: String,
}

impl PendingUser {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Name/value pair as exchanged with the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserAttribute {
    pub name: String,
    pub value: String,
}

impl UserAttribute {
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Looks up an attribute value by name.
#[must_use]
pub fn find_attribute<'a>(attributes: &'a [UserAttribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}

/// Result of a password authentication attempt that did not fail outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    NewPasswordRequired,
}

/// Operations consumed from the identity provider.
///
/// Implementations persist tokens on successful authentication so that
/// [`IdentityProvider::current_user`] can find them on a later run.
pub trait IdentityProvider {
    /// Registers a new user and returns the handle to confirm it with.
    fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        attributes: &[UserAttribute],
    ) -> impl Future<Output = Result<PendingUser, AuthError>> + Send;

    fn confirm_registration(
        &self,
        user: &PendingUser,
        code: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn resend_confirmation_code(
        &self,
        user: &PendingUser,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn authenticate(
        &self,
        user: &PendingUser,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthOutcome, AuthError>> + Send;

    /// Drops the locally stored tokens for `user`.
    fn sign_out(&self, user: &PendingUser) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn forgot_password(
        &self,
        user: &PendingUser,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn confirm_password(
        &self,
        user: &PendingUser,
        code: &str,
        new_password: &SecretString,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Returns the user of the locally stored session, if any. No network access.
    ///
    /// # Errors
    /// Returns `AuthError::Store` if the local store cannot be read.
    fn current_user(&self) -> Result<Option<PendingUser>, AuthError>;

    /// Checks the stored session of `user`, refreshing expired tokens if possible.
    fn session_is_valid(
        &self,
        user: &PendingUser,
    ) -> impl Future<Output = Result<bool, AuthError>> + Send;

    fn user_attributes(
        &self,
        user: &PendingUser,
    ) -> impl Future<Output = Result<Vec<UserAttribute>, AuthError>> + Send;
}
