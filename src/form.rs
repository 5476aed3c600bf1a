/// Form handling for the fraud check
///
/// Turns raw form fields (always strings, the way an HTML form hands them
/// over) into the JSON payload the Prediction Service expects:
/// 1. `Amount` and `Age` become JSON numbers
/// 2. Every other field is forwarded unchanged as a string
/// 3. Malformed numbers are rejected here, before any request is made
use crate::errors::AppError;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;

/// Fields coerced to numbers. Matched exactly and case-sensitively.
pub const NUMERIC_FIELDS: [&str; 2] = ["Amount", "Age"];

/// Fields the Prediction Service refuses to score without.
pub const REQUIRED_FIELDS: [&str; 12] = [
    "Amount",
    "Age",
    "Type of Card",
    "Entry Mode",
    "Type of Transaction",
    "Merchant Group",
    "Bank",
    "Day of Week",
    "Gender",
    "Country of Transaction",
    "Country of Residence",
    "Shipping Address",
];

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
            .expect("decimal pattern is a valid regex")
    })
}

/// Returns true if `key` is coerced to a number in the payload.
pub fn is_numeric_field(key: &str) -> bool {
    NUMERIC_FIELDS.contains(&key)
}

/// Parses a numeric form value.
///
/// Accepts plain decimal literals with optional sign, fraction and exponent.
/// Surrounding whitespace is ignored. `NaN`, `inf`, hex, empty strings and
/// values that overflow `f64` are rejected.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if !decimal_pattern().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// JSON payload built from one form submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormInput {
    fields: Map<String, Value>,
}

impl FormInput {
    /// Builds the payload from raw `(name, value)` pairs.
    ///
    /// Later pairs overwrite earlier ones with the same name. All malformed
    /// numeric fields are reported together in a single `Validation` error.
    pub fn from_fields<I, K, V>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut fields = Map::new();
        let mut invalid = Vec::new();

        for (key, value) in pairs {
            let key = key.into();
            let raw = value.as_ref();

            if is_numeric_field(&key) {
                match parse_numeric(raw).and_then(Number::from_f64) {
                    Some(number) => {
                        invalid.retain(|(k, _): &(String, String)| k != &key);
                        fields.insert(key, Value::Number(number));
                    }
                    None => {
                        invalid.retain(|(k, _): &(String, String)| k != &key);
                        invalid.push((key.clone(), raw.to_string()));
                        fields.remove(&key);
                    }
                }
            } else {
                fields.insert(key, Value::String(raw.to_string()));
            }
        }

        if !invalid.is_empty() {
            let detail = invalid
                .iter()
                .map(|(k, v)| format!("{} must be a number (got {:?})", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::Validation(detail));
        }

        Ok(Self { fields })
    }

    /// Fails if any field the Prediction Service requires is absent.
    pub fn ensure_complete(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| !self.fields.contains_key(*key))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing input data for: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Anything that can hand over the current form values at submit time.
pub trait FormSource: Send + Sync {
    fn fields(&self) -> Vec<(String, String)>;
}

/// In-memory form, filled programmatically or from a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticForm {
    pairs: Vec<(String, String)>,
}

impl StaticForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Appends a field. A later duplicate wins when the payload is built.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Parses `key=value` lines. Blank lines and `#` comments are skipped.
    pub fn parse_kv(text: &str) -> Result<Self, AppError> {
        let mut form = Self::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                AppError::Validation(format!("line {}: expected KEY=VALUE", idx + 1))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(AppError::Validation(format!(
                    "line {}: field name is empty",
                    idx + 1
                )));
            }
            form = form.with_field(key, value.trim());
        }
        Ok(form)
    }

    /// Parses a flat JSON object. Scalars are converted to their text form,
    /// `null` to an empty string. Nested values are rejected.
    pub fn parse_json(text: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| AppError::Validation(format!("form file is not JSON: {}", e)))?;
        let object = match value {
            Value::Object(object) => object,
            _ => {
                return Err(AppError::Validation(
                    "form file must contain a JSON object".to_string(),
                ))
            }
        };

        let mut form = Self::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::Validation(format!(
                        "field {:?} must be a scalar",
                        key
                    )))
                }
            };
            form = form.with_field(key, text);
        }
        Ok(form)
    }
}

impl FormSource for StaticForm {
    fn fields(&self) -> Vec<(String, String)> {
        self.pairs.clone()
    }
}

/// Reference transaction the service should score as legitimate.
pub fn sample_transaction() -> StaticForm {
    StaticForm::from_pairs([
        ("Amount", "120.50"),
        ("Age", "35.0"),
        ("Type of Card", "Visa"),
        ("Entry Mode", "Tap"),
        ("Type of Transaction", "POS"),
        ("Merchant Group", "Restaurant"),
        ("Gender", "M"),
        ("Bank", "Lloyds"),
        ("Day of Week", "Wednesday"),
        ("Country of Transaction", "United Kingdom"),
        ("Country of Residence", "United Kingdom"),
        ("Shipping Address", "United Kingdom"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_fields_become_numbers() {
        let input = FormInput::from_fields([
            ("Amount", "123.45"),
            ("Age", "35"),
            ("Bank", "Lloyds"),
        ])
        .unwrap();

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"Amount": 123.45, "Age": 35.0, "Bank": "Lloyds"})
        );
    }

    #[test]
    fn test_other_fields_pass_through_verbatim() {
        let input = FormInput::from_fields([("amount", " 12 "), ("Day of Week", "Friday")]).unwrap();
        // lowercase "amount" is not a numeric key
        assert_eq!(input.get("amount"), Some(&json!(" 12 ")));
        assert_eq!(input.get("Day of Week"), Some(&json!("Friday")));
    }

    #[test]
    fn test_parse_numeric_rejects_non_decimal() {
        assert_eq!(parse_numeric(" 42.5 "), Some(42.5));
        assert_eq!(parse_numeric("-1e3"), Some(-1000.0));
        assert_eq!(parse_numeric(".5"), Some(0.5));
        assert_eq!(parse_numeric("7."), Some(7.0));
        for bad in ["", "abc", "12abc", "NaN", "inf", "-infinity", "0x10", "1e999", "1,000"] {
            assert_eq!(parse_numeric(bad), None, "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_invalid_numbers_reported_together() {
        let err = FormInput::from_fields([("Amount", "lots"), ("Age", "")]).unwrap_err();
        assert!(err.is_validation());
        let msg = err.to_string();
        assert!(msg.contains("Amount must be a number"));
        assert!(msg.contains("Age must be a number"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let input = FormInput::from_fields([("Amount", "oops"), ("Amount", "10")]).unwrap();
        assert_eq!(input.get("Amount"), Some(&json!(10.0)));
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn test_ensure_complete_names_missing_fields() {
        let input = FormInput::from_fields([("Amount", "1"), ("Age", "2")]).unwrap();
        let err = input.ensure_complete().unwrap_err();
        assert!(err.to_string().contains("Type of Card"));
        assert!(err.to_string().contains("Shipping Address"));
        assert!(!err.to_string().contains("Amount,"));

        let sample = FormInput::from_fields(sample_transaction().fields()).unwrap();
        assert!(sample.ensure_complete().is_ok());
    }

    #[test]
    fn test_parse_kv_file() {
        let form = StaticForm::parse_kv(
            "# card details\nType of Card = Visa\n\nAmount=99.99\nNote=a=b\n",
        )
        .unwrap();
        assert_eq!(
            form.fields(),
            vec![
                ("Type of Card".to_string(), "Visa".to_string()),
                ("Amount".to_string(), "99.99".to_string()),
                ("Note".to_string(), "a=b".to_string()),
            ]
        );
        assert!(StaticForm::parse_kv("Amount 12").is_err());
        assert!(StaticForm::parse_kv("=12").is_err());
    }

    #[test]
    fn test_parse_json_file() {
        let form = StaticForm::parse_json(r#"{"Amount": 12.5, "Bank": "HSBC", "Gender": null}"#)
            .unwrap();
        let input = FormInput::from_fields(form.fields()).unwrap();
        assert_eq!(input.get("Amount"), Some(&json!(12.5)));
        assert_eq!(input.get("Gender"), Some(&json!("")));

        assert!(StaticForm::parse_json("[1, 2]").is_err());
        assert!(StaticForm::parse_json(r#"{"Bank": {"name": "x"}}"#).is_err());
    }
}
