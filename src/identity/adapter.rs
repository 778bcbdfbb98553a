//! Identity adapter: the eight identity operations over an [`IdentityProvider`],
//! plus the single pending-operation handle they share. Operations take
//! `&mut self`, so a new operation can only start once the previous one has
//! resolved and the handle is never written by a superseded call.

use super::{AuthOutcome, IdentityProvider, PendingUser, UserAttribute, find_attribute};
use crate::error::AuthError;
use secrecy::SecretString;
use tracing::{debug, warn};

/// Shown as the principal when a restored session has no email attribute.
pub const FALLBACK_PRINCIPAL: &str = "User";

/// Result of checking the locally stored session at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    NoSession,
    Invalid,
    AttributesUnavailable(AuthError),
    Restored { email: String },
}

#[derive(Debug)]
pub struct IdentityAdapter<P> {
    provider: P,
    pending: Option<PendingUser>,
}

impl<P: IdentityProvider> IdentityAdapter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            pending: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingUser> {
        self.pending.as_ref()
    }

    fn pending_or_err(&self) -> Result<&PendingUser, AuthError> {
        self.pending.as_ref().ok_or(AuthError::NoPendingOperation)
    }

    /// Registers `email` with the `email` and `name` attributes and keeps the
    /// returned handle for verification.
    ///
    /// # Errors
    /// Returns `AuthError::Provider` if the provider rejects the registration.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &SecretString,
        display_name: &str,
    ) -> Result<(), AuthError> {
        let attributes = [
            UserAttribute::new("email", email),
            UserAttribute::new("name", display_name),
        ];
        let user = self.provider.sign_up(email, password, &attributes).await?;
        self.pending = Some(user);
        Ok(())
    }

    /// # Errors
    /// Returns `AuthError::NoPendingOperation` without a prior sign-up, or the provider's error.
    pub async fn verify(&mut self, code: &str) -> Result<(), AuthError> {
        let user = self.pending_or_err()?;
        self.provider.confirm_registration(user, code.trim()).await
    }

    /// # Errors
    /// Returns `AuthError::NoPendingOperation` without a prior sign-up, or the provider's error.
    pub async fn resend_code(&mut self) -> Result<(), AuthError> {
        let user = self.pending_or_err()?;
        self.provider.resend_confirmation_code(user).await
    }

    /// Starts a fresh handle for `email` and authenticates it.
    ///
    /// # Errors
    /// Returns the provider's error, or `AuthError::NewPasswordRequired` when the
    /// provider answers with that challenge.
    pub async fn sign_in(&mut self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        let user = PendingUser::new(email);
        self.pending = Some(user.clone());

        match self.provider.authenticate(&user, password).await? {
            AuthOutcome::Authenticated => Ok(()),
            AuthOutcome::NewPasswordRequired => Err(AuthError::NewPasswordRequired),
        }
    }

    /// Drops local tokens of the current handle, if any. Never fails: a store
    /// error is logged and the sign-out still counts.
    pub async fn sign_out(&mut self) {
        if let Some(user) = self.pending.as_ref()
            && let Err(err) = self.provider.sign_out(user).await
        {
            warn!("failed to clear local session: {err}");
        }
    }

    /// Starts a fresh handle for `email` and asks the provider to send a reset code.
    ///
    /// # Errors
    /// Returns `AuthError::Provider` if the provider rejects the request.
    pub async fn forgot_password(&mut self, email: &str) -> Result<(), AuthError> {
        let user = PendingUser::new(email);
        self.pending = Some(user.clone());
        self.provider.forgot_password(&user).await
    }

    /// # Errors
    /// Returns `AuthError::NoPendingOperation` without a prior forgot-password, or the
    /// provider's error.
    pub async fn reset_password(
        &mut self,
        code: &str,
        new_password: &SecretString,
    ) -> Result<(), AuthError> {
        let user = self.pending_or_err()?;
        self.provider
            .confirm_password(user, code.trim(), new_password)
            .await
    }

    /// Adopts the locally stored user as the pending handle. Reads the local
    /// store only; the provider is not contacted.
    pub fn adopt_stored_user(&mut self) -> Option<&PendingUser> {
        match self.provider.current_user() {
            Ok(user) => self.pending = user,
            Err(err) => {
                warn!("failed to read local session: {err}");
                self.pending = None;
            }
        }
        self.pending.as_ref()
    }

    /// Recovers the stored session: existence, then validity, then attributes.
    /// A found user becomes the pending handle so a later sign-out can clear it.
    pub async fn restore(&mut self) -> RestoreOutcome {
        let user = match self.provider.current_user() {
            Ok(Some(user)) => user,
            Ok(None) => return RestoreOutcome::NoSession,
            Err(err) => {
                warn!("failed to read local session: {err}");
                return RestoreOutcome::NoSession;
            }
        };
        self.pending = Some(user.clone());

        match self.provider.session_is_valid(&user).await {
            Ok(true) => {}
            Ok(false) => return RestoreOutcome::Invalid,
            Err(err) => {
                debug!("session validation failed: {err}");
                return RestoreOutcome::Invalid;
            }
        }

        match self.provider.user_attributes(&user).await {
            Ok(attributes) => RestoreOutcome::Restored {
                email: find_attribute(&attributes, "email")
                    .unwrap_or(FALLBACK_PRINCIPAL)
                    .to_string(),
            },
            Err(err) => RestoreOutcome::AttributesUnavailable(err),
        }
    }
}
