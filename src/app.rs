//! Application controller: the one session context constructed at startup and
//! handed to the front-end. Each operation runs the identity or prediction call,
//! then applies the session/panel transition and pushes a notice. Failures never
//! advance the panel.

use crate::{
    error::{AuthError, PredictError},
    identity::{
        IdentityProvider,
        adapter::{IdentityAdapter, RestoreOutcome},
    },
    notify::Notifier,
    predict::{PredictionClient, PredictionRequest, PredictionResult},
    view::{Session, ViewController, ViewSnapshot, ViewState},
};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const PREDICTION_FAILED: &str =
    "Could not get a prediction. Check that the prediction API is running and try again.";

pub struct App<P> {
    identity: IdentityAdapter<P>,
    predictor: PredictionClient,
    view: ViewController,
    notifier: Notifier,
    last_result: Option<PredictionResult>,
}

impl<P: IdentityProvider> App<P> {
    pub fn new(provider: P, predictor: PredictionClient, notifier: Notifier) -> Self {
        Self {
            identity: IdentityAdapter::new(provider),
            predictor,
            view: ViewController::new(),
            notifier,
            last_result: None,
        }
    }

    pub fn identity(&self) -> &IdentityAdapter<P> {
        &self.identity
    }

    pub fn session(&self) -> &Session {
        self.view.session()
    }

    pub fn current_view(&self) -> ViewState {
        self.view.current()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.view.subscribe()
    }

    pub fn last_result(&self) -> Option<&PredictionResult> {
        self.last_result.as_ref()
    }

    /// Navigation without a business action, e.g. "forgot password?" links.
    pub fn show(&mut self, target: ViewState) {
        if let Err(err) = self.view.navigate(target) {
            warn!("cannot show {target}: {err}");
            self.notifier.error(err.to_string());
        }
    }

    /// `hint` replaces the generic text when no identity operation is pending.
    fn fail(&self, err: &AuthError, hint: Option<&str>) {
        debug!("identity operation failed: {err:?}");
        match (err, hint) {
            (AuthError::NoPendingOperation, Some(hint)) => self.notifier.error(hint),
            (other, _) => self.notifier.error(other.to_string()),
        }
    }

    /// Recovers a stored session: app panel when it is valid and the user's
    /// attributes load, otherwise the sign-in panel.
    pub async fn bootstrap(&mut self) -> ViewState {
        match self.identity.restore().await {
            RestoreOutcome::Restored { email } => {
                info!("restored session for {email}");
                self.view.enter_app(&email);
            }
            RestoreOutcome::NoSession => {
                debug!("no stored session");
                self.view.enter_auth();
            }
            RestoreOutcome::Invalid => {
                debug!("stored session is no longer valid");
                self.view.enter_auth();
            }
            RestoreOutcome::AttributesUnavailable(err) => {
                error!("Error getting user attributes: {err}");
                self.view.enter_auth();
            }
        }
        self.view.current()
    }

    /// # Errors
    /// Returns the adapter's error after notifying the user.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &SecretString,
        display_name: &str,
    ) -> Result<(), AuthError> {
        if let Err(err) = self.identity.sign_up(email, password, display_name).await {
            self.fail(&err, None);
            return Err(err);
        }

        self.view.set_principal(email);
        self.notifier
            .success("Sign-up successful. Check your email for the verification code.");
        self.show(ViewState::AuthVerify);
        Ok(())
    }

    /// # Errors
    /// Returns `AuthError::NoPendingOperation` before any sign-up, or the provider's error.
    pub async fn verify(&mut self, code: &str) -> Result<(), AuthError> {
        if let Err(err) = self.identity.verify(code).await {
            self.fail(&err, Some("No account to verify. Please sign up first."));
            return Err(err);
        }

        self.notifier
            .success("Email verified. You can now sign in.");
        self.show(ViewState::AuthSignIn);
        Ok(())
    }

    /// # Errors
    /// Returns `AuthError::NoPendingOperation` before any sign-up, or the provider's error.
    pub async fn resend_code(&mut self) -> Result<(), AuthError> {
        if let Err(err) = self.identity.resend_code().await {
            self.fail(&err, Some("No account found. Please sign up first."));
            return Err(err);
        }

        self.notifier
            .success("Verification code sent to your email.");
        Ok(())
    }

    /// # Errors
    /// Returns the provider's error or `AuthError::NewPasswordRequired`.
    pub async fn sign_in(&mut self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        if let Err(err) = self.identity.sign_in(email, password).await {
            self.fail(&err, None);
            return Err(err);
        }

        info!("signed in as {email}");
        self.notifier.success("Signed in.");
        self.view.enter_app(email);
        Ok(())
    }

    /// Picks up the locally stored user without contacting the provider, so
    /// [`App::sign_out`] can clear it. Returns the stored username.
    pub fn adopt_stored_user(&mut self) -> Option<String> {
        self.identity
            .adopt_stored_user()
            .map(|user| user.username().to_string())
    }

    pub async fn sign_out(&mut self) {
        self.identity.sign_out().await;
        self.view.sign_out();
        self.notifier.success("Signed out.");
    }

    /// The principal is recorded before the provider answers.
    ///
    /// # Errors
    /// Returns the provider's error after notifying the user.
    pub async fn forgot_password(&mut self, email: &str) -> Result<(), AuthError> {
        self.view.set_principal(email);

        if let Err(err) = self.identity.forgot_password(email).await {
            self.fail(&err, None);
            return Err(err);
        }

        self.notifier.success("Reset code sent to your email.");
        self.show(ViewState::AuthReset);
        Ok(())
    }

    /// # Errors
    /// Returns `AuthError::NoPendingOperation` before any forgot-password, or the
    /// provider's error.
    pub async fn reset_password(
        &mut self,
        code: &str,
        new_password: &SecretString,
    ) -> Result<(), AuthError> {
        if let Err(err) = self.identity.reset_password(code, new_password).await {
            self.fail(&err, Some("Please request a password reset first."));
            return Err(err);
        }

        self.notifier
            .success("Password reset. You can now sign in with your new password.");
        self.show(ViewState::AuthSignIn);
        Ok(())
    }

    /// Drops the previous result, then asks the prediction API for a crop.
    ///
    /// # Errors
    /// Returns the client's error after notifying the user.
    pub async fn predict(
        &mut self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictError> {
        self.last_result = None;

        match self.predictor.predict(request).await {
            Ok(result) => {
                self.last_result = Some(result.clone());
                Ok(result)
            }
            Err(err) => {
                error!("prediction failed: {err}");
                match &err {
                    PredictError::InvalidRequest(message) => self.notifier.error(message.clone()),
                    _ => self.notifier.error(PREDICTION_FAILED),
                }
                Err(err)
            }
        }
    }
}
