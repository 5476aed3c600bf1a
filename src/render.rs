//! Render targets for the result panel.

use crate::ui_state::UiState;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

/// Something that can display the result panel.
pub trait RenderTarget: Send + Sync {
    fn render(&self, state: &UiState);
}

/// The UI the Submission Handler draws into, passed in explicitly.
#[derive(Clone)]
pub struct UiContext {
    target: Arc<dyn RenderTarget>,
}

impl UiContext {
    pub fn new(target: Arc<dyn RenderTarget>) -> Self {
        Self { target }
    }

    pub fn render(&self, state: &UiState) {
        self.target.render(state);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes one line per state change to a terminal or any other writer.
pub struct TerminalPanel<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalPanel<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> RenderTarget for TerminalPanel<W> {
    fn render(&self, state: &UiState) {
        let panel = state.panel();
        if !panel.visible {
            return;
        }

        let marker = match panel.class {
            Some(class) => format!("[{}] ", class.css_class()),
            None => String::new(),
        };
        let mut out = lock(&self.out);
        if let Err(e) = writeln!(out, "{}{} | {}", marker, panel.label, panel.detail)
            .and_then(|_| out.flush())
        {
            tracing::warn!("Failed to write result panel: {}", e);
        }
    }
}

/// Keeps every rendered state in memory.
#[derive(Default)]
pub struct RecordingTarget {
    states: Mutex<Vec<UiState>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<UiState> {
        lock(&self.states).clone()
    }

    pub fn last(&self) -> Option<UiState> {
        lock(&self.states).last().cloned()
    }
}

impl RenderTarget for RecordingTarget {
    fn render(&self, state: &UiState) {
        lock(&self.states).push(state.clone());
    }
}
