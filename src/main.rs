use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fraud_check_client::config::Config;
use fraud_check_client::form::{sample_transaction, FormSource, StaticForm};
use fraud_check_client::prediction_client::PredictionClient;
use fraud_check_client::render::{TerminalPanel, UiContext};
use fraud_check_client::submission::SubmissionHandler;
use fraud_check_client::ui_state::ERROR_DETAIL;

#[derive(Parser, Debug)]
#[command(name = "fraud-check", about = "Submit transactions to the fraud Prediction Service")]
struct Cli {
    /// Predict endpoint (overrides PREDICT_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    /// Refuse to send a form that lacks any field the service requires
    #[arg(long, global = true)]
    strict: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one transaction form and print the result panel
    Submit {
        /// File with KEY=VALUE lines
        #[arg(long)]
        form: Option<PathBuf>,
        /// File with a flat JSON object
        #[arg(long)]
        json: Option<PathBuf>,
        /// Start from the built-in reference transaction
        #[arg(long)]
        sample: bool,
        /// Set a single field, e.g. --field "Amount=120.50"
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Check that the Prediction Service is up
    Health,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", raw))?;
    if key.trim().is_empty() {
        return Err("field name is empty".to_string());
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn load_form(
    form: Option<PathBuf>,
    json: Option<PathBuf>,
    sample: bool,
    fields: Vec<(String, String)>,
) -> anyhow::Result<StaticForm> {
    let mut merged = if sample {
        sample_transaction()
    } else {
        StaticForm::new()
    };

    if let Some(path) = form {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading form file {}", path.display()))?;
        for (k, v) in StaticForm::parse_kv(&text)?.fields() {
            merged = merged.with_field(k, v);
        }
    }
    if let Some(path) = json {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading JSON form {}", path.display()))?;
        for (k, v) in StaticForm::parse_json(&text)?.fields() {
            merged = merged.with_field(k, v);
        }
    }
    for (k, v) in fields {
        merged = merged.with_field(k, v);
    }

    if merged == StaticForm::new() {
        anyhow::bail!("no form fields given; use --sample, --form, --json or --field");
    }
    Ok(merged)
}

/// Entry point for the `fraud-check` command.
///
/// Logs go to stderr so that stdout only carries the result panel.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraud_check_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.url.as_deref() {
        config = config.with_predict_url(url)?;
    }
    if cli.strict {
        config.strict_fields = true;
    }

    let client = PredictionClient::new(config.predict_url.clone(), config.health_url()?)?;
    tracing::info!("✓ Prediction client initialized: {}", config.predict_url);

    match cli.command {
        Command::Submit {
            form,
            json,
            sample,
            fields,
        } => {
            let form = load_form(form, json, sample, fields)?;
            let panel = Arc::new(TerminalPanel::new(std::io::stdout()));
            let handler = SubmissionHandler::new(client, UiContext::new(panel), config.strict_fields);

            let receipt = handler.submit_form(&form).await;
            tracing::info!(
                "Submission #{} finished in {} ms",
                receipt.sequence,
                receipt.elapsed_ms()
            );

            match receipt.final_state() {
                Some(state) if !state.is_failure() => Ok(ExitCode::SUCCESS),
                _ => Ok(ExitCode::FAILURE),
            }
        }
        Command::Health => match client.health().await {
            Ok(banner) => {
                println!("{}", banner);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                tracing::error!("{}", e);
                eprintln!("{}", ERROR_DETAIL);
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraud_check_client::form::FormInput;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("Type of Card=Visa").unwrap(),
            ("Type of Card".to_string(), "Visa".to_string())
        );
        assert_eq!(
            parse_field("Note=a=b").unwrap(),
            ("Note".to_string(), "a=b".to_string())
        );
        assert!(parse_field("Amount").is_err());
        assert!(parse_field("=1").is_err());
    }

    #[test]
    fn test_fields_override_sample() {
        let form = load_form(None, None, true, vec![("Amount".into(), "9000".into())]).unwrap();
        let input = FormInput::from_fields(form.fields()).unwrap();
        assert_eq!(input.get("Amount"), Some(&serde_json::json!(9000.0)));
        assert!(load_form(None, None, false, Vec::new()).is_err());
    }

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from([
            "fraud-check",
            "--strict",
            "submit",
            "--sample",
            "--field",
            "Age=41",
        ])
        .unwrap();
        assert!(cli.strict);
        match cli.command {
            Command::Submit { sample, fields, .. } => {
                assert!(sample);
                assert_eq!(fields, vec![("Age".to_string(), "41".to_string())]);
            }
            Command::Health => panic!("expected submit"),
        }
    }
}
