use crate::errors::{AppError, ResultExt};
use crate::form::FormInput;
use crate::models::{PredictionResult, ServiceErrorBody};
use reqwest;
use tracing;

/// Client for the fraud Prediction Service.
///
/// No request timeout is configured: an outstanding prediction waits for
/// the service for as long as the connection stays open.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    predict_url: String,
    health_url: String,
}

impl PredictionClient {
    /// Creates a new `PredictionClient`.
    ///
    /// # Arguments
    ///
    /// * `predict_url` - Full URL of the predict endpoint.
    /// * `health_url` - Root URL of the service, used by `health`.
    pub fn new(predict_url: String, health_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            AppError::InternalError(format!("Failed to create prediction client: {}", e))
        })?;

        Ok(Self {
            client,
            predict_url,
            health_url,
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Sends one form payload for scoring.
    ///
    /// # Arguments
    ///
    /// * `input` - The payload built from the submitted form.
    ///
    /// # Returns
    ///
    /// * `Result<PredictionResult, AppError>` - The verdict, or an
    ///   `ExternalApiError` (possibly wrapped with the failing step as
    ///   context) for connection, status and parse failures alike.
    pub async fn predict(&self, input: &FormInput) -> Result<PredictionResult, AppError> {
        tracing::info!(
            "Requesting prediction from {} ({} fields)",
            self.predict_url,
            input.len()
        );

        let response = self
            .client
            .post(&self.predict_url)
            .header("Content-Type", "application/json")
            .json(input)
            .send()
            .await
            .with_context(|| format!("POST {}", self.predict_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let detail = serde_json::from_str::<ServiceErrorBody>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);
            return Err(AppError::ExternalApiError(format!(
                "Prediction service returned {}: {}",
                status, detail
            )));
        }

        let body = response
            .text()
            .await
            .context("Failed to read prediction response")?;

        let result: PredictionResult = serde_json::from_str::<PredictionResult>(&body)
            .map_err(AppError::from)
            .context("Failed to parse prediction response")?;

        tracing::info!(
            "✓ Prediction received: {} ({:.4})",
            result.prediction,
            result.probability_score
        );
        Ok(result)
    }

    /// Fetches the service banner from its root route.
    pub async fn health(&self) -> Result<String, AppError> {
        tracing::debug!("Checking prediction service at {}", self.health_url);

        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.health_url))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Prediction service health returned {}",
                response.status()
            )));
        }

        response.text().await.context("Failed to read health banner")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = PredictionClient::new(
            "http://127.0.0.1:5000/predict".to_string(),
            "http://127.0.0.1:5000/".to_string(),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().predict_url(), "http://127.0.0.1:5000/predict");
    }

    #[tokio::test]
    async fn test_connection_failure_names_the_request() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let predict_url = format!("http://{}/predict", addr);
        let client =
            PredictionClient::new(predict_url.clone(), format!("http://{}/", addr)).unwrap();
        let input = FormInput::from_fields([("Amount", "1")]).unwrap();

        let err = client.predict(&input).await.unwrap_err();
        match &err {
            AppError::WithContext { source, context } => {
                assert_eq!(context, &format!("POST {}", predict_url));
                assert!(matches!(**source, AppError::ExternalApiError(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.is_validation());

        let err = client.health().await.unwrap_err();
        assert!(err.to_string().starts_with(&format!("GET http://{}/", addr)));
    }
}
