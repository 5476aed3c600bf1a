use crate::errors::AppError;
use url::Url;

/// Endpoint the fraud form posts to when `PREDICT_URL` is not set.
pub const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:5000/predict";

#[derive(Debug, Clone)]
pub struct Config {
    pub predict_url: String,
    pub strict_fields: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            predict_url: DEFAULT_PREDICT_URL.to_string(),
            strict_fields: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            predict_url: {
                let url = std::env::var("PREDICT_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PREDICT_URL.to_string());
                validate_endpoint(&url)?;
                url.trim().to_string()
            },
            strict_fields: match std::env::var("STRICT_FIELDS") {
                Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                    anyhow::anyhow!("STRICT_FIELDS must be one of true/false/1/0/yes/no")
                })?,
                Err(_) => false,
            },
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Predict URL: {}", config.predict_url);
        tracing::debug!("Strict fields: {}", config.strict_fields);

        Ok(config)
    }

    /// Returns a copy with the endpoint replaced, validating the new URL.
    pub fn with_predict_url(mut self, url: &str) -> anyhow::Result<Self> {
        validate_endpoint(url)?;
        self.predict_url = url.trim().to_string();
        Ok(self)
    }

    /// Root of the Prediction Service, used for the health banner.
    pub fn health_url(&self) -> anyhow::Result<String> {
        let url = validate_endpoint(&self.predict_url)?;
        Ok(url.join("/")?.to_string())
    }
}

fn validate_endpoint(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        AppError::ConfigError(format!("PREDICT_URL is not a valid URL ({}): {}", e, raw))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::ConfigError(
            "PREDICT_URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(url)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
