/// Submission handling for the fraud form
///
/// One call to `SubmissionHandler::submit` covers a full cycle:
/// 1. Suppress the event's default action
/// 2. Show the loading panel
/// 3. Build and validate the payload
/// 4. POST it to the Prediction Service
/// 5. Render the verdict, or the error panel on any failure
///
/// Every submission gets a sequence number. Only the most recent one may
/// update the panel once its response arrives; older responses are dropped.
use crate::errors::AppError;
use crate::form::{FormInput, FormSource};
use crate::prediction_client::PredictionClient;
use crate::render::UiContext;
use crate::ui_state::UiState;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

/// A form submit trigger, carrying the field values at submit time.
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    fields: Vec<(String, String)>,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self {
            fields,
            default_prevented: false,
        }
    }

    pub fn from_source(source: &dyn FormSource) -> Self {
        Self::new(source.fields())
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The request went out and its outcome was drawn.
    Rendered(UiState),
    /// Input failed validation; nothing was sent.
    Rejected(UiState),
    /// A newer submission was issued before this one finished.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub sequence: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: SubmissionOutcome,
}

impl SubmissionReceipt {
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// The state this submission left on screen, if it still owned the panel.
    pub fn final_state(&self) -> Option<&UiState> {
        match &self.outcome {
            SubmissionOutcome::Rendered(state) | SubmissionOutcome::Rejected(state) => {
                Some(state)
            }
            SubmissionOutcome::Superseded => None,
        }
    }
}

pub struct SubmissionHandler {
    client: PredictionClient,
    ui: UiContext,
    strict: bool,
    latest: Mutex<u64>,
}

impl SubmissionHandler {
    /// Creates a handler bound to a Prediction Service client and a UI.
    ///
    /// # Arguments
    ///
    /// * `client` - Client for the predict endpoint.
    /// * `ui` - Where the result panel is drawn.
    /// * `strict` - Also require every field the service needs before sending.
    pub fn new(client: PredictionClient, ui: UiContext, strict: bool) -> Self {
        Self {
            client,
            ui,
            strict,
            latest: Mutex::new(0),
        }
    }

    /// Sequence number of the most recently issued submission (0 before any).
    pub fn latest_sequence(&self) -> u64 {
        *self.lock_latest()
    }

    fn lock_latest(&self) -> MutexGuard<'_, u64> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one request/response/render cycle for a submit event.
    pub async fn submit(&self, event: &mut SubmitEvent) -> SubmissionReceipt {
        event.prevent_default();
        let started_at = Utc::now();

        let sequence = {
            let mut latest = self.lock_latest();
            *latest += 1;
            self.ui.render(&UiState::Loading);
            *latest
        };
        tracing::debug!("Submission #{} started", sequence);

        let outcome = match self.build_input(event.fields()) {
            Err(e) => {
                tracing::warn!("Submission #{} rejected: {}", sequence, e);
                let state = UiState::Invalid {
                    message: validation_message(e),
                };
                match self.render_if_current(sequence, state) {
                    Some(state) => SubmissionOutcome::Rejected(state),
                    None => SubmissionOutcome::Superseded,
                }
            }
            Ok(input) => {
                let state = match self.client.predict(&input).await {
                    Ok(result) => UiState::from_prediction(&result),
                    Err(e) => {
                        tracing::error!("Submission #{} failed: {}", sequence, e);
                        UiState::Error
                    }
                };
                match self.render_if_current(sequence, state) {
                    Some(state) => SubmissionOutcome::Rendered(state),
                    None => SubmissionOutcome::Superseded,
                }
            }
        };

        SubmissionReceipt {
            sequence,
            started_at,
            finished_at: Utc::now(),
            outcome,
        }
    }

    /// Convenience wrapper: snapshot a form and submit it.
    pub async fn submit_form(&self, source: &dyn FormSource) -> SubmissionReceipt {
        let mut event = SubmitEvent::from_source(source);
        self.submit(&mut event).await
    }

    fn build_input(&self, fields: &[(String, String)]) -> Result<FormInput, AppError> {
        let input = FormInput::from_fields(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        if self.strict {
            input.ensure_complete()?;
        }
        Ok(input)
    }

    fn render_if_current(&self, sequence: u64, state: UiState) -> Option<UiState> {
        let latest = self.lock_latest();
        if *latest != sequence {
            tracing::debug!(
                "Discarding response for submission #{} (latest is #{})",
                sequence,
                *latest
            );
            return None;
        }
        self.ui.render(&state);
        Some(state)
    }
}

fn validation_message(err: AppError) -> String {
    match err {
        AppError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
