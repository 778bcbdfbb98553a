//! Error taxonomy shared by the identity adapter, the prediction client and the
//! configuration loader. Every variant is terminal for the operation that raised it
//! and is surfaced to the user as a notice; nothing here is retried.

use thiserror::Error;

/// Failures of identity-provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Any provider-side failure, message passed through verbatim.
    #[error("{0}")]
    Provider(String),
    /// Verify, resend or reset called before sign-up, sign-in or forgot-password.
    #[error("no identity operation in progress")]
    NoPendingOperation,
    /// The provider demands a new password; that flow is not supported.
    #[error("new password required, please contact an administrator")]
    NewPasswordRequired,
    /// Reading or writing the local token store failed.
    #[error("session store error: {0}")]
    Store(String),
}

/// Failures of the prediction round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("network error: {0}")]
    Network(String),
    #[error("prediction service returned HTTP {0}")]
    HttpStatus(u16),
    #[error("invalid prediction response: {0}")]
    Decode(String),
    #[error("invalid prediction request: {0}")]
    InvalidRequest(String),
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),
    #[error("{0} still holds the placeholder value")]
    Placeholder(&'static str),
    #[error("invalid user pool id: {0}")]
    InvalidPoolId(String),
    #[error("invalid URL for {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("the app panel requires a signed-in user")]
    NoPrincipal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_is_passed_through() {
        let err = AuthError::Provider("Incorrect username or password.".to_string());
        assert_eq!(err.to_string(), "Incorrect username or password.");
    }

    #[test]
    fn http_status_names_the_code() {
        assert_eq!(
            PredictError::HttpStatus(500).to_string(),
            "prediction service returned HTTP 500"
        );
    }
}
