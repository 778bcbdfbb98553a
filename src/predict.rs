//! Prediction API client. One `POST {base}/predict` per submission with the seven
//! soil and weather readings as JSON; the response names the recommended crop.
//! A single attempt is made: no retry, backoff or timeout.

use crate::{APP_USER_AGENT, config::build_url_with_base, error::PredictError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const PREDICT_PATH: &str = "/predict";

/// Soil nutrients and weather readings for one field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl PredictionRequest {
    /// Field names in wire order, as accepted by [`PredictionRequest::from_values`].
    pub const FIELDS: [&'static str; 7] =
        ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

    /// Builds a request from values in [`PredictionRequest::FIELDS`] order.
    ///
    /// # Errors
    /// Returns `PredictError::InvalidRequest` if a value is not finite.
    pub fn from_values(values: [f64; 7]) -> Result<Self, PredictError> {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
        let request = Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        };
        request.validate()?;
        Ok(request)
    }

    fn values(&self) -> [f64; 7] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Non-finite numbers would serialize as JSON `null`.
    ///
    /// # Errors
    /// Returns `PredictError::InvalidRequest` naming the first non-finite field.
    pub fn validate(&self) -> Result<(), PredictError> {
        match Self::FIELDS
            .iter()
            .zip(self.values())
            .find(|(_, value)| !value.is_finite())
        {
            Some((name, value)) => Err(PredictError::InvalidRequest(format!(
                "{name} must be a number, got {value}"
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_crop: String,
}

#[derive(Clone, Debug)]
pub struct PredictionClient {
    client: Client,
    url: String,
}

impl PredictionClient {
    /// # Errors
    /// Returns `PredictError::Network` if the HTTP client cannot be built.
    pub fn new(api_base_url: &str) -> Result<Self, PredictError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| PredictError::Network(format!("Error creating HTTP client: {err}")))?;

        Ok(Self {
            client,
            url: build_url_with_base(api_base_url, PREDICT_PATH),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submits `request` and returns the predicted crop.
    ///
    /// # Errors
    /// - `PredictError::InvalidRequest` if a field is not finite (nothing is sent).
    /// - `PredictError::Network` if the exchange cannot complete.
    /// - `PredictError::HttpStatus` for non-2xx responses; the body is not read.
    /// - `PredictError::Decode` if a 2xx body is not JSON or lacks `predicted_crop`.
    #[instrument(skip(self))]
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictError> {
        request.validate()?;

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|err| PredictError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("prediction request rejected with {status}");
            return Err(PredictError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| PredictError::Network(err.to_string()))?;

        let result: PredictionResult =
            serde_json::from_slice(&body).map_err(|err| PredictError::Decode(err.to_string()))?;

        debug!("predicted crop: {}", result.predicted_crop);

        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn sample() -> PredictionRequest {
        PredictionRequest::from_values([90.0, 42.0, 43.0, 20.87, 82.0, 6.5, 202.93]).unwrap()
    }

    #[test]
    fn request_serializes_with_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            json!({
                "N": 90.0,
                "P": 42.0,
                "K": 43.0,
                "temperature": 20.87,
                "humidity": 82.0,
                "ph": 6.5,
                "rainfall": 202.93
            })
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = PredictionRequest::from_values([1.0, f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, PredictError::InvalidRequest(ref m) if m.starts_with("P ")));

        let err = PredictionRequest::from_values([1.0, 1.0, 1.0, 1.0, 1.0, 1.0, f64::INFINITY])
            .unwrap_err();
        assert!(matches!(err, PredictError::InvalidRequest(ref m) if m.starts_with("rainfall")));
    }

    #[test]
    fn url_is_joined_under_base() {
        let client = PredictionClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url(), "http://localhost:8000/predict");
    }

    #[tokio::test]
    async fn predict_returns_crop() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::to_value(sample())?))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "predicted_crop": "rice"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PredictionClient::new(&server.uri())?;
        let result = client.predict(&sample()).await?;
        assert_eq!(
            result,
            PredictionResult {
                predicted_crop: "rice".to_string()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn server_error_is_http_status() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(500).set_body_string("{\"predicted_crop\":"))
            .mount(&server)
            .await;

        let client = PredictionClient::new(&server.uri())?;
        assert_eq!(
            client.predict(&sample()).await,
            Err(PredictError::HttpStatus(500))
        );
        Ok(())
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = PredictionClient::new(&server.uri())?;
        let result = client.predict(&sample()).await;
        assert!(matches!(result, Err(PredictError::Decode(_))));
        Ok(())
    }

    #[tokio::test]
    async fn missing_field_is_decode_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "crop": "rice" })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(&server.uri())?;
        let result = client.predict(&sample()).await;
        assert!(matches!(result, Err(PredictError::Decode(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() -> Result<()> {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .map(|addr| addr.port());
        let Ok(port) = port else {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        };

        let client = PredictionClient::new(&format!("http://127.0.0.1:{port}"))?;
        let result = client.predict(&sample()).await;
        assert!(matches!(result, Err(PredictError::Network(_))));
        Ok(())
    }
}
