//! Fraud Check Client Library
//!
//! This library submits transaction forms to a fraud Prediction Service
//! and turns its verdict into the content of a result panel.
//!
//! # Modules
//!
//! - `core`: Form handling, wire models and errors.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `form`: Form sources and payload construction.
//! - `models`: Prediction Service wire types.
//! - `prediction_client`: Prediction Service client.
//! - `render`: Render targets for the result panel.
//! - `submission`: Submission handler (submit, request, render).
//! - `ui_state`: Result panel states.

pub mod core;
pub mod integrations;

pub mod config;
pub mod errors;
pub mod form;
pub mod models;
pub mod prediction_client;
pub mod render;
pub mod submission;
pub mod ui_state;
