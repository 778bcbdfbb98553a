//! Session and panel state. The controller owns the [`Session`] so the rule
//! "the app panel needs a principal" is enforced in one place. Every transition
//! publishes a [`ViewSnapshot`] on a watch channel; renderers subscribe to it and
//! are never called from the transitions themselves.

use crate::error::ViewError;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// Mutually exclusive panels. Exactly one is visible at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewState {
    AuthSignIn,
    AuthSignUp,
    AuthVerify,
    AuthForgot,
    AuthReset,
    App,
}

impl ViewState {
    pub const ALL: [Self; 6] = [
        Self::AuthSignIn,
        Self::AuthSignUp,
        Self::AuthVerify,
        Self::AuthForgot,
        Self::AuthReset,
        Self::App,
    ];

    #[must_use]
    pub const fn is_auth(self) -> bool {
        !matches!(self, Self::App)
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::AuthSignIn => "Sign in",
            Self::AuthSignUp => "Create account",
            Self::AuthVerify => "Verify email",
            Self::AuthForgot => "Forgot password",
            Self::AuthReset => "Reset password",
            Self::App => "Crop recommendation",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The authenticated principal as tracked client-side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    principal_email: Option<String>,
}

impl Session {
    #[must_use]
    pub fn principal_email(&self) -> Option<&str> {
        self.principal_email.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal_email.is_some()
    }
}

/// What a renderer needs to draw the current screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub view: ViewState,
    pub principal: Option<String>,
}

impl ViewSnapshot {
    #[must_use]
    pub fn is_visible(&self, panel: ViewState) -> bool {
        self.view == panel
    }

    /// Panels currently shown; always exactly one.
    #[must_use]
    pub fn visible_panels(&self) -> Vec<ViewState> {
        ViewState::ALL
            .into_iter()
            .filter(|panel| self.is_visible(*panel))
            .collect()
    }
}

#[derive(Debug)]
pub struct ViewController {
    view: ViewState,
    last_auth: ViewState,
    session: Session,
    tx: watch::Sender<ViewSnapshot>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    /// Starts on the sign-in panel with no principal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewSnapshot {
            view: ViewState::AuthSignIn,
            principal: None,
        });
        Self {
            view: ViewState::AuthSignIn,
            last_auth: ViewState::AuthSignIn,
            session: Session::default(),
            tx,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            view: self.view,
            principal: self.session.principal_email.clone(),
        }
    }

    fn publish(&self) {
        // send_replace stores the value even without receivers
        self.tx.send_replace(self.snapshot());
    }

    /// Shows exactly `target`. Re-publishes even when `target` is already active.
    ///
    /// # Errors
    /// Returns `ViewError::NoPrincipal` when `target` is the app panel and nobody
    /// is signed in; the visible panel is left unchanged.
    pub fn navigate(&mut self, target: ViewState) -> Result<(), ViewError> {
        if target == ViewState::App && !self.session.is_authenticated() {
            return Err(ViewError::NoPrincipal);
        }
        if target.is_auth() {
            self.last_auth = target;
        }
        debug!("navigate {:?} -> {:?}", self.view, target);
        self.view = target;
        self.publish();
        Ok(())
    }

    /// Binds the principal and shows the app panel.
    pub fn enter_app(&mut self, email: &str) {
        self.session.principal_email = Some(email.to_string());
        self.view = ViewState::App;
        self.publish();
    }

    /// Leaves the app: clears the principal and shows the auth sub-form that was
    /// requested last.
    pub fn enter_auth(&mut self) {
        self.session.principal_email = None;
        self.view = self.last_auth;
        self.publish();
    }

    /// Records the principal without changing the panel.
    pub fn set_principal(&mut self, email: &str) {
        self.session.principal_email = Some(email.to_string());
        self.publish();
    }

    /// Sign-out transition: the sign-in form becomes the remembered one.
    pub fn sign_out(&mut self) {
        self.last_auth = ViewState::AuthSignIn;
        self.enter_auth();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_navigation_leaves_exactly_one_panel_visible() {
        let mut view = ViewController::new();
        view.set_principal("a@b.com");
        for target in ViewState::ALL {
            view.navigate(target).unwrap();
            let snapshot = view.snapshot();
            assert_eq!(snapshot.visible_panels(), vec![target]);
        }
    }

    #[test]
    fn navigate_is_idempotent_and_republishes() {
        let mut view = ViewController::new();
        let mut rx = view.subscribe();
        view.navigate(ViewState::AuthForgot).unwrap();
        assert!(rx.has_changed().unwrap());
        let first = rx.borrow_and_update().clone();

        view.navigate(ViewState::AuthForgot).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), first);
        assert_eq!(view.current(), ViewState::AuthForgot);
    }

    #[test]
    fn app_panel_requires_principal() {
        let mut view = ViewController::new();
        view.navigate(ViewState::AuthSignUp).unwrap();
        assert_eq!(view.navigate(ViewState::App), Err(ViewError::NoPrincipal));
        assert_eq!(view.current(), ViewState::AuthSignUp);
    }

    #[test]
    fn enter_app_binds_principal() {
        let mut view = ViewController::new();
        view.enter_app("a@b.com");
        assert_eq!(
            view.snapshot(),
            ViewSnapshot {
                view: ViewState::App,
                principal: Some("a@b.com".to_string()),
            }
        );
    }

    #[test]
    fn enter_auth_returns_to_last_requested_form() {
        let mut view = ViewController::new();
        view.navigate(ViewState::AuthReset).unwrap();
        view.enter_app("a@b.com");
        view.enter_auth();
        assert_eq!(view.current(), ViewState::AuthReset);
    }

    #[test]
    fn enter_auth_clears_principal() {
        let mut view = ViewController::new();
        let mut rx = view.subscribe();
        view.enter_app("a@b.com");
        view.enter_auth();
        assert_eq!(view.current(), ViewState::AuthSignIn);
        assert_eq!(view.session().principal_email(), None);
        assert_eq!(rx.borrow_and_update().principal, None);
    }

    #[test]
    fn enter_auth_clears_optimistic_principal() {
        let mut view = ViewController::new();
        view.navigate(ViewState::AuthVerify).unwrap();
        view.set_principal("a@b.com");
        view.enter_auth();
        assert_eq!(view.current(), ViewState::AuthVerify);
        assert!(!view.session().is_authenticated());
    }

    #[test]
    fn sign_out_resets_to_sign_in() {
        let mut view = ViewController::new();
        view.navigate(ViewState::AuthForgot).unwrap();
        view.enter_app("a@b.com");
        view.sign_out();
        assert_eq!(view.current(), ViewState::AuthSignIn);
        assert_eq!(view.session().principal_email(), None);

        view.enter_auth();
        assert_eq!(view.current(), ViewState::AuthSignIn);
    }
}
