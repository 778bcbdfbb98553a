//! Runtime configuration: identity pool identifiers and the prediction API base
//! URL. Values are validated once when the `Config` is built and never change
//! afterwards. None of these values are secrets.

use crate::error::ConfigError;
use regex::Regex;
use tracing::warn;
use url::Url;

/// Values shipped in sample configuration files. Unlike a warn-only check,
/// [`Config::new`] rejects them with `ConfigError::Placeholder`.
pub const PLACEHOLDER_POOL_ID: &str = "YOUR_USER_POOL_ID";
pub const PLACEHOLDER_CLIENT_ID: &str = "YOUR_CLIENT_ID";

const POOL_ID_PATTERN: &str = r"^([a-z]{2}(?:-[a-z]+)+-\d+)_([0-9A-Za-z]+)$";

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    user_pool_id: String,
    client_id: String,
    api_base_url: String,
    region: String,
    identity_endpoint: String,
}

impl Config {
    /// Validates and builds the configuration. The region, and from it the
    /// identity endpoint, is derived from the pool id.
    ///
    /// # Errors
    /// Returns `ConfigError` if a value is empty, still a placeholder, or malformed.
    pub fn new(
        user_pool_id: &str,
        client_id: &str,
        api_base_url: &str,
    ) -> Result<Self, ConfigError> {
        let user_pool_id =
            normalize_value(user_pool_id).ok_or(ConfigError::Missing("user pool id"))?;
        let client_id = normalize_value(client_id).ok_or(ConfigError::Missing("client id"))?;
        let api_base_url =
            normalize_value(api_base_url).ok_or(ConfigError::Missing("API base URL"))?;

        if user_pool_id == PLACEHOLDER_POOL_ID {
            warn!("user pool id is not configured");
            return Err(ConfigError::Placeholder("user pool id"));
        }
        if client_id == PLACEHOLDER_CLIENT_ID {
            warn!("client id is not configured");
            return Err(ConfigError::Placeholder("client id"));
        }

        let region = region_from_pool_id(&user_pool_id)?;
        let api_base_url = parse_http_url("API base URL", &api_base_url)?;
        let identity_endpoint = format!("https://cognito-idp.{region}.amazonaws.com/");

        Ok(Self {
            user_pool_id,
            client_id,
            api_base_url,
            region,
            identity_endpoint,
        })
    }

    /// Points identity calls at another endpoint, e.g. a local emulator.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidUrl` if the endpoint is not an http(s) URL.
    pub fn with_identity_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = normalize_value(endpoint).ok_or(ConfigError::Missing("identity endpoint"))?;
        let parsed = parse_http_url("identity endpoint", &endpoint)?;
        self.identity_endpoint = format!("{parsed}/");
        Ok(self)
    }

    #[must_use]
    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn identity_endpoint(&self) -> &str {
        &self.identity_endpoint
    }

    /// Builds a URL under the prediction API base.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        build_url_with_base(&self.api_base_url, path)
    }
}

fn region_from_pool_id(pool_id: &str) -> Result<String, ConfigError> {
    let re = Regex::new(POOL_ID_PATTERN)
        .map_err(|err| ConfigError::InvalidPoolId(format!("{pool_id} ({err})")))?;
    re.captures(pool_id)
        .and_then(|caps| caps.get(1))
        .map(|region| region.as_str().to_string())
        .ok_or_else(|| ConfigError::InvalidPoolId(pool_id.to_string()))
}

/// Parses an http(s) URL and returns it without a trailing slash.
fn parse_http_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        name,
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ConfigError::InvalidUrl {
                name,
                reason: format!("unsupported scheme {scheme}"),
            });
        }
    }

    if url.host().is_none() {
        return Err(ConfigError::InvalidUrl {
            name,
            reason: "no host specified".to_string(),
        });
    }

    Ok(value.trim_end_matches('/').to_string())
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Joins a base URL and a path with exactly one slash between them.
#[must_use]
pub fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn region_is_derived_from_pool_id() {
        let config = Config::new(
            "us-east-1_u1DWWcNBh",
            "2uoocl8sgimbdqmk41soiurq9p",
            "http://localhost:8000",
        )
        .unwrap();
        assert_eq!(config.region(), "us-east-1");
        assert_eq!(
            config.identity_endpoint(),
            "https://cognito-idp.us-east-1.amazonaws.com/"
        );
    }

    #[test]
    fn values_are_trimmed_and_base_url_loses_trailing_slash() {
        let config = Config::new(
            "  eu-west-2_abc123 ",
            " client ",
            " https://api.cropsight.dev/ ",
        )
        .unwrap();
        assert_eq!(config.user_pool_id(), "eu-west-2_abc123");
        assert_eq!(config.client_id(), "client");
        assert_eq!(config.api_base_url(), "https://api.cropsight.dev");
        assert_eq!(config.api_url("/predict"), "https://api.cropsight.dev/predict");
    }

    #[test]
    fn placeholders_are_rejected() {
        let err = Config::new(PLACEHOLDER_POOL_ID, "client", "http://localhost:8000").unwrap_err();
        assert_eq!(err, ConfigError::Placeholder("user pool id"));

        let err = Config::new("us-east-1_abc", PLACEHOLDER_CLIENT_ID, "http://localhost:8000")
            .unwrap_err();
        assert_eq!(err, ConfigError::Placeholder("client id"));
    }

    #[test]
    fn empty_values_are_rejected() {
        assert_eq!(
            Config::new("", "client", "http://localhost:8000").unwrap_err(),
            ConfigError::Missing("user pool id")
        );
        assert_eq!(
            Config::new("us-east-1_abc", "   ", "http://localhost:8000").unwrap_err(),
            ConfigError::Missing("client id")
        );
        assert_eq!(
            Config::new("us-east-1_abc", "client", "").unwrap_err(),
            ConfigError::Missing("API base URL")
        );
    }

    #[test]
    fn malformed_pool_id_is_rejected() {
        let err = Config::new("not-a-pool", "client", "http://localhost:8000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPoolId(_)));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = Config::new("us-east-1_abc", "client", "ftp://files.example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "API base URL", .. }));

        let err = Config::new("us-east-1_abc", "client", "localhost:8000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn identity_endpoint_can_be_overridden() {
        let config = Config::new("us-east-1_abc", "client", "http://localhost:8000")
            .unwrap()
            .with_identity_endpoint("http://127.0.0.1:9229/")
            .unwrap();
        assert_eq!(config.identity_endpoint(), "http://127.0.0.1:9229/");
        assert_eq!(config.region(), "us-east-1");
    }

    #[test]
    fn build_url_with_base_joins_with_single_slash() {
        assert_eq!(build_url_with_base("http://a/", "/predict"), "http://a/predict");
        assert_eq!(build_url_with_base("http://a", "predict"), "http://a/predict");
        assert_eq!(build_url_with_base("", "/predict"), "/predict");
    }
}
