use serde::{Deserialize, Serialize};

/// Verdict label that marks a transaction as fraud.
pub const FRAUDULENT: &str = "Fraudulent";

/// Verdict returned by the Prediction Service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Verdict label (e.g., "Fraudulent", "Legitimate").
    pub prediction: String,
    /// Model probability in [0, 1].
    pub probability_score: f64,
}

impl PredictionResult {
    /// Exact, case-sensitive match on the fraud label.
    pub fn is_fraudulent(&self) -> bool {
        self.prediction == FRAUDULENT
    }

    /// Probability as a percentage with two decimals (e.g., "87.00").
    pub fn confidence_percent(&self) -> String {
        format_two_decimals(self.probability_score * 100.0)
    }
}

/// Formats `value` with two decimals, rounding like JavaScript's `toFixed(2)`.
///
/// `{:.2}` already rounds the exact binary value correctly except on an exact
/// tie, where it picks the even digit; `toFixed` picks the larger magnitude.
/// A tie at the third decimal is only possible for odd multiples of 1/8.
pub fn format_two_decimals(value: f64) -> String {
    if value == 0.0 {
        // -0.0 prints as "0.00"
        return "0.00".to_string();
    }
    let eighths = value * 8.0;
    if eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return format!("{:.2}", (value * 100.0).round() / 100.0);
    }
    format!("{:.2}", value)
}

/// Error payload the Prediction Service sends with 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}
