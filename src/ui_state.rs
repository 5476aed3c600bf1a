use crate::models::PredictionResult;
use serde::Serialize;

pub const LOADING_LABEL: &str = "Checking...";
pub const LOADING_DETAIL: &str = "Please wait.";
pub const ERROR_LABEL: &str = "Error";
pub const ERROR_DETAIL: &str = "Could not connect to the API. Is the server running?";
pub const INVALID_LABEL: &str = "Invalid input";

/// Colour class applied to the prediction label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StyleClass {
    Fraud,
    Legitimate,
}

impl StyleClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            StyleClass::Fraud => "prediction-fraud",
            StyleClass::Legitimate => "prediction-legitimate",
        }
    }
}

/// Content of the result panel.
///
/// One variant is shown at a time; `Hidden` is the state before the
/// first submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Hidden,
    Loading,
    Result {
        label: String,
        detail: String,
        class: StyleClass,
    },
    Error,
    /// Client-side validation failure; no request was sent.
    Invalid {
        message: String,
    },
}

/// What a render target actually draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub visible: bool,
    pub label: String,
    pub detail: String,
    pub class: Option<StyleClass>,
}

impl UiState {
    pub fn from_prediction(result: &PredictionResult) -> Self {
        let class = if result.is_fraudulent() {
            StyleClass::Fraud
        } else {
            StyleClass::Legitimate
        };

        UiState::Result {
            label: result.prediction.clone(),
            detail: format!("Confidence Score: {}%", result.confidence_percent()),
            class,
        }
    }

    /// True for the states that report a failed submission.
    pub fn is_failure(&self) -> bool {
        matches!(self, UiState::Error | UiState::Invalid { .. })
    }

    pub fn panel(&self) -> Panel {
        match self {
            UiState::Hidden => Panel {
                visible: false,
                label: String::new(),
                detail: String::new(),
                class: None,
            },
            UiState::Loading => Panel {
                visible: true,
                label: LOADING_LABEL.to_string(),
                detail: LOADING_DETAIL.to_string(),
                class: None,
            },
            UiState::Result {
                label,
                detail,
                class,
            } => Panel {
                visible: true,
                label: label.clone(),
                detail: detail.clone(),
                class: Some(*class),
            },
            UiState::Error => Panel {
                visible: true,
                label: ERROR_LABEL.to_string(),
                detail: ERROR_DETAIL.to_string(),
                class: Some(StyleClass::Fraud),
            },
            UiState::Invalid { message } => Panel {
                visible: true,
                label: INVALID_LABEL.to_string(),
                detail: message.clone(),
                class: Some(StyleClass::Fraud),
            },
        }
    }
}
