//! Cognito user-pool implementation of [`IdentityProvider`] over the public JSON
//! API. Every operation is a `POST` to the regional endpoint with an
//! `X-Amz-Target` header naming the action. Only unauthenticated, client-id based
//! actions are used plus `GetUser`, which takes the stored access token.

use super::{
    AuthOutcome, IdentityProvider, PendingUser, UserAttribute,
    store::{StoredSession, TokenStore, unix_now},
};
use crate::{APP_USER_AGENT, config::Config, error::AuthError};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CHALLENGE_NEW_PASSWORD: &str = "NEW_PASSWORD_REQUIRED";
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: &'a [UserAttribute],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    #[serde(default)]
    user_confirmed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    force_alias_creation: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UsernameRequest<'a> {
    client_id: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmForgotPasswordRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserRequest<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    #[serde(default)]
    user_attributes: Vec<UserAttribute>,
}

#[derive(Clone, Debug)]
pub struct CognitoProvider {
    client: Client,
    endpoint: String,
    client_id: String,
    store: TokenStore,
}

impl CognitoProvider {
    /// Builds a provider for the configured pool and app client.
    ///
    /// # Errors
    /// Returns `AuthError::Provider` if the HTTP client cannot be built.
    pub fn new(config: &Config, store: TokenStore) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| AuthError::Provider(format!("Error creating HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.identity_endpoint().to_string(),
            client_id: config.client_id().to_string(),
            store,
        })
    }

    #[must_use]
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    async fn send<B: Serialize>(&self, action: &str, body: &B) -> Result<Response, AuthError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .json(body)
            .send()
            .await
            .map_err(|err| {
                warn!("{action} request failed: {err}");
                AuthError::Provider(format!("Unable to reach the identity provider: {err}"))
            })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = provider_error_message(&body, status.as_u16());
        debug!("{action} rejected with {status}: {message}");

        Err(AuthError::Provider(message))
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self.send(action, body).await?;
        response.json::<T>().await.map_err(|err| {
            AuthError::Provider(format!("Invalid {action} response from identity provider: {err}"))
        })
    }

    async fn call_empty<B: Serialize>(&self, action: &str, body: &B) -> Result<(), AuthError> {
        self.send(action, body).await.map(|_| ())
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: HashMap<&str, &str>,
    ) -> Result<InitiateAuthResponse, AuthError> {
        let request = InitiateAuthRequest {
            auth_flow: flow,
            client_id: &self.client_id,
            auth_parameters: parameters,
        };
        self.call("InitiateAuth", &request).await
    }

    fn stored_session_for(&self, user: &PendingUser) -> Result<Option<StoredSession>, AuthError> {
        Ok(self
            .store
            .load()?
            .filter(|stored| stored.username == user.username()))
    }

    /// Exchanges the refresh token for new access/id tokens and stores them.
    async fn refresh(&self, stored: StoredSession) -> Result<bool, AuthError> {
        let Some(refresh_token) = stored.refresh_token.as_deref() else {
            debug!("stored session has no refresh token");
            return Ok(false);
        };

        let parameters = HashMap::from([("REFRESH_TOKEN", refresh_token)]);
        let response = self.initiate_auth("REFRESH_TOKEN_AUTH", parameters).await?;

        let Some(result) = response.authentication_result else {
            return Ok(false);
        };

        // refresh responses omit the refresh token; keep the old one
        let renewed = StoredSession {
            username: stored.username.clone(),
            access_token: result.access_token,
            id_token: result.id_token.or(stored.id_token.clone()),
            refresh_token: result.refresh_token.or(stored.refresh_token.clone()),
            expires_at: unix_now().saturating_add(result.expires_in),
        };
        self.store.save(&renewed)?;

        Ok(true)
    }
}

impl IdentityProvider for CognitoProvider {
    #[instrument(skip(self, password, attributes))]
    async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        attributes: &[UserAttribute],
    ) -> Result<PendingUser, AuthError> {
        let request = SignUpRequest {
            client_id: &self.client_id,
            username,
            password: password.expose_secret(),
            user_attributes: attributes,
        };
        let response: SignUpResponse = self.call("SignUp", &request).await?;
        debug!("sign-up accepted, confirmed: {}", response.user_confirmed);

        Ok(PendingUser::new(username))
    }

    #[instrument(skip(self, code))]
    async fn confirm_registration(&self, user: &PendingUser, code: &str) -> Result<(), AuthError> {
        let request = ConfirmSignUpRequest {
            client_id: &self.client_id,
            username: user.username(),
            confirmation_code: code,
            force_alias_creation: true,
        };
        self.call_empty("ConfirmSignUp", &request).await
    }

    #[instrument(skip(self))]
    async fn resend_confirmation_code(&self, user: &PendingUser) -> Result<(), AuthError> {
        let request = UsernameRequest {
            client_id: &self.client_id,
            username: user.username(),
        };
        self.call_empty("ResendConfirmationCode", &request).await
    }

    #[instrument(skip(self, password))]
    async fn authenticate(
        &self,
        user: &PendingUser,
        password: &SecretString,
    ) -> Result<AuthOutcome, AuthError> {
        let parameters = HashMap::from([
            ("USERNAME", user.username()),
            ("PASSWORD", password.expose_secret()),
        ]);
        let response = self.initiate_auth("USER_PASSWORD_AUTH", parameters).await?;

        if let Some(result) = response.authentication_result {
            let stored = StoredSession {
                username: user.username().to_string(),
                access_token: result.access_token,
                id_token: result.id_token,
                refresh_token: result.refresh_token,
                expires_at: unix_now().saturating_add(result.expires_in),
            };
            self.store.save(&stored)?;
            return Ok(AuthOutcome::Authenticated);
        }

        match response.challenge_name.as_deref() {
            Some(CHALLENGE_NEW_PASSWORD) => Ok(AuthOutcome::NewPasswordRequired),
            Some(other) => Err(AuthError::Provider(format!(
                "Unsupported authentication challenge: {other}"
            ))),
            None => Err(AuthError::Provider(
                "Identity provider returned no authentication result".to_string(),
            )),
        }
    }

    #[instrument(skip(self))]
    async fn sign_out(&self, user: &PendingUser) -> Result<(), AuthError> {
        if self.stored_session_for(user)?.is_some() {
            self.store.clear()?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn forgot_password(&self, user: &PendingUser) -> Result<(), AuthError> {
        let request = UsernameRequest {
            client_id: &self.client_id,
            username: user.username(),
        };
        self.call_empty("ForgotPassword", &request).await
    }

    #[instrument(skip(self, code, new_password))]
    async fn confirm_password(
        &self,
        user: &PendingUser,
        code: &str,
        new_password: &SecretString,
    ) -> Result<(), AuthError> {
        let request = ConfirmForgotPasswordRequest {
            client_id: &self.client_id,
            username: user.username(),
            confirmation_code: code,
            password: new_password.expose_secret(),
        };
        self.call_empty("ConfirmForgotPassword", &request).await
    }

    fn current_user(&self) -> Result<Option<PendingUser>, AuthError> {
        Ok(self
            .store
            .load()?
            .map(|stored| PendingUser::new(stored.username)))
    }

    #[instrument(skip(self))]
    async fn session_is_valid(&self, user: &PendingUser) -> Result<bool, AuthError> {
        let Some(stored) = self.stored_session_for(user)? else {
            return Ok(false);
        };

        if !stored.is_expired(unix_now()) {
            return Ok(true);
        }

        debug!("stored tokens expired, refreshing");
        self.refresh(stored).await
    }

    #[instrument(skip(self))]
    async fn user_attributes(&self, user: &PendingUser) -> Result<Vec<UserAttribute>, AuthError> {
        let stored = self
            .stored_session_for(user)?
            .ok_or_else(|| AuthError::Provider("User is not authenticated".to_string()))?;

        let request = GetUserRequest {
            access_token: &stored.access_token,
        };
        let response: GetUserResponse = self.call("GetUser", &request).await?;

        Ok(response.user_attributes)
    }
}

/// Extracts the provider's error message, falling back to the raw JSON body.
fn provider_error_message(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("Request failed ({status})");
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => json
            .get("message")
            .or_else(|| json.get("Message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map_or_else(|| json.to_string(), str::to_string),
        Err(_) => trimmed.chars().take(MAX_ERROR_CHARS).collect(),
    }
}
