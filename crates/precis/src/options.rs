//! Agent options: string-typed configuration with defaults, validation, and
//! per-event resolution into typed settings.
//!
//! Every option may be a `{{ path }}` template, so options are stored as
//! strings and only parsed after [`AgentOptions::resolve`] has interpolated
//! them against an event payload. Parsing happens once per event, in
//! [`ResolvedOptions::settings`], before any engine call.
//!
//! # Examples
//!
//! ```
//! use precis::options::AgentOptions;
//! use serde_json::json;
//!
//! let options = AgentOptions::from_json_str(r#"{"mode": "sentences", "length": 2}"#).unwrap();
//! assert_eq!(options.length, "2");
//! assert_eq!(options.threshold, "0.2");
//!
//! let payload = json!({"data": "Some text."});
//! let settings = options.resolve(payload.as_object().unwrap()).unwrap().settings().unwrap();
//! assert_eq!(settings.text, "Some text.");
//! assert!(settings.merge);
//! ```

use std::path::Path;

use schemars::JsonSchema;
use schemars::schema::{InstanceType, Schema, SchemaObject, SingleOrVec};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::interpolate::{self, interpolate};
use crate::dispatch::SummaryRequest;
use crate::error::{Result, SummaryError};
use crate::json_schema_for;

/// Raw agent options, as written in an options file or form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AgentOptions {
    /// `percentage` (length is a decimal ratio of the original text) or
    /// `sentences` (length is a sentence count). Default: `percentage`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(schema_with = "scalar_schema")]
    pub mode: String,
    /// Target summary size; meaning depends on `mode`. Default: `0.3`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(schema_with = "scalar_schema")]
    pub length: String,
    /// Relevance threshold between 0.1 and 0.3; 0.2 gives the best results.
    /// Default: `0.2`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(schema_with = "scalar_schema")]
    pub threshold: String,
    /// Text to summarize, usually a template over the incoming event.
    /// Default: `{{data}}`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(schema_with = "scalar_schema")]
    pub data: String,
    /// Keep the incoming payload and add the summary to it. Default: `true`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(schema_with = "scalar_schema")]
    pub merge: String,
    /// Payload key that receives the summary. Default: `summary`.
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(schema_with = "scalar_schema")]
    pub result_key: String,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            mode: "percentage".to_string(),
            length: "0.3".to_string(),
            threshold: "0.2".to_string(),
            data: "{{data}}".to_string(),
            merge: "true".to_string(),
            result_key: "summary".to_string(),
        }
    }
}

impl AgentOptions {
    /// JSON Schema describing the options document.
    pub fn schema() -> Value {
        json_schema_for::<AgentOptions>()
    }

    /// Parse an options document, checking it against [`schema`](Self::schema)
    /// first. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        validate_against_schema(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Load an options document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check that every required option is present and that every option
    /// is a well-formed template.
    ///
    /// Runs before any event is processed. Values that are templates are
    /// only parsed as numbers or modes later, per event.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = [
            ("data", &self.data),
            ("length", &self.length),
            ("threshold", &self.threshold),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| format!("{name} needs to be present"))
        .collect();

        for (name, value) in self.fields() {
            if let Err(e) = interpolate::check(value) {
                errors.push(format!("{name} is not a valid template: {e}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SummaryError::Configuration(errors))
        }
    }

    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("mode", &self.mode),
            ("length", &self.length),
            ("threshold", &self.threshold),
            ("data", &self.data),
            ("merge", &self.merge),
            ("result_key", &self.result_key),
        ]
    }

    /// Interpolate every option against an event payload.
    ///
    /// A template that fails to render is an
    /// [`InvalidOption`](SummaryError::InvalidOption) naming the option.
    pub fn resolve(&self, payload: &Map<String, Value>) -> Result<ResolvedOptions> {
        let render = |field: &'static str, template: &str| {
            interpolate(template, payload)
                .map_err(|e| SummaryError::invalid(field, template, e.to_string()))
        };
        Ok(ResolvedOptions {
            mode: render("mode", &self.mode)?,
            length: render("length", &self.length)?,
            threshold: render("threshold", &self.threshold)?,
            data: render("data", &self.data)?,
            merge: render("merge", &self.merge)?,
            result_key: render("result_key", &self.result_key)?,
        })
    }
}

/// Options after interpolation for one event, still string-typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub mode: String,
    pub length: String,
    pub threshold: String,
    pub data: String,
    pub merge: String,
    pub result_key: String,
}

impl ResolvedOptions {
    /// Parse into typed settings.
    pub fn settings(self) -> Result<SummarySettings> {
        let request = SummaryRequest::parse(&self.mode, &self.length, &self.threshold)?;
        Ok(SummarySettings {
            merge: boolify(&self.merge),
            text: self.data,
            request,
            result_key: self.result_key,
        })
    }
}

/// Typed settings for summarizing one event.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySettings {
    /// Text to summarize.
    pub text: String,
    pub request: SummaryRequest,
    /// Keep the incoming payload in the emitted event.
    pub merge: bool,
    pub result_key: String,
}

/// `"true"` (any case) is true; everything else, including blanks, is false.
pub fn boolify(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn validate_against_schema(value: &Value) -> Result<()> {
    let schema = AgentOptions::schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| SummaryError::Configuration(vec![format!("invalid options schema: {e}")]))?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SummaryError::Configuration(errors))
    }
}

/// Accept strings, booleans, and numbers for an option; store as a string.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string, boolean, or number, found {other}"
        ))),
    }
}

fn scalar_schema(_generator: &mut schemars::r#gen::SchemaGenerator) -> Schema {
    SchemaObject {
        instance_type: Some(SingleOrVec::Vec(vec![
            InstanceType::String,
            InstanceType::Boolean,
            InstanceType::Number,
            InstanceType::Null,
        ])),
        ..Default::default()
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let options = AgentOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.mode, "percentage");
        assert_eq!(options.length, "0.3");
        assert_eq!(options.threshold, "0.2");
        assert_eq!(options.data, "{{data}}");
        assert_eq!(options.merge, "true");
        assert_eq!(options.result_key, "summary");
    }

    #[test]
    fn blank_required_options_are_reported_together() {
        let options = AgentOptions {
            data: String::new(),
            length: "  ".to_string(),
            threshold: String::new(),
            ..Default::default()
        };
        match options.validate().unwrap_err() {
            SummaryError::Configuration(errors) => assert_eq!(
                errors,
                vec![
                    "data needs to be present",
                    "length needs to be present",
                    "threshold needs to be present",
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn each_required_option_is_checked() {
        for field in ["data", "length", "threshold"] {
            let mut options = AgentOptions::default();
            match field {
                "data" => options.data.clear(),
                "length" => options.length.clear(),
                _ => options.threshold.clear(),
            }
            assert!(options.validate().is_err(), "{field}");
        }
    }

    #[test]
    fn json_scalars_become_strings() {
        let options = AgentOptions::from_json_str(
            r#"{"length": 0.5, "merge": false, "result_key": "tl;dr"}"#,
        )
        .unwrap();
        assert_eq!(options.length, "0.5");
        assert_eq!(options.merge, "false");
        assert_eq!(options.result_key, "tl;dr");
        assert_eq!(options.mode, "percentage");
    }

    #[test]
    fn schema_rejects_structured_values() {
        let err = AgentOptions::from_json_str(r#"{"length": [1, 2]}"#).unwrap_err();
        match err {
            SummaryError::Configuration(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("/length"), "{}", errors[0]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = AgentOptions::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SummaryError::Json(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mode": "sentences", "length": "3"}}"#).unwrap();

        let options = AgentOptions::from_path(file.path()).unwrap();
        assert_eq!(options.mode, "sentences");
        assert_eq!(options.length, "3");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgentOptions::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SummaryError::Io(_)));
    }

    #[test]
    fn resolve_interpolates_every_option() {
        let options = AgentOptions {
            mode: "{{ cfg.mode }}".to_string(),
            length: "{{ cfg.length }}".to_string(),
            merge: "{{ cfg.merge }}".to_string(),
            result_key: "{{ cfg.key }}".to_string(),
            ..Default::default()
        };
        let payload = json!({
            "data": "Body.",
            "cfg": {"mode": "sentences", "length": 2, "merge": false, "key": "short"}
        });
        let settings = options
            .resolve(payload.as_object().unwrap())
            .unwrap()
            .settings()
            .unwrap();

        assert_eq!(settings.text, "Body.");
        assert_eq!(
            settings.request.target,
            crate::dispatch::LengthTarget::Sentences(2)
        );
        assert!(!settings.merge);
        assert_eq!(settings.result_key, "short");
    }

    #[test]
    fn malformed_templates_are_configuration_errors() {
        let options = AgentOptions {
            data: "{{ body".to_string(),
            length: "{% if %}".to_string(),
            ..Default::default()
        };
        match options.validate().unwrap_err() {
            SummaryError::Configuration(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].starts_with("length is not a valid template"));
                assert!(errors[1].starts_with("data is not a valid template"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolve_follows_array_indices_and_blanks_missing_keys() {
        let options = AgentOptions {
            data: "{{ items.1 }}{{ absent }}".to_string(),
            ..Default::default()
        };
        let payload = json!({"items": ["First.", "Second."]});
        let resolved = options.resolve(payload.as_object().unwrap()).unwrap();
        assert_eq!(resolved.data, "Second.");
        assert_eq!(resolved.length, "0.3");
    }

    #[test]
    fn boolify_only_accepts_true() {
        assert!(boolify("true"));
        assert!(boolify(" TRUE "));
        assert!(!boolify("false"));
        assert!(!boolify("yes"));
        assert!(!boolify(""));
    }

    #[test]
    fn schema_lists_every_option() {
        let schema = AgentOptions::schema();
        let properties = schema["properties"].as_object().unwrap();
        for key in ["mode", "length", "threshold", "data", "merge", "result_key"] {
            assert!(properties.contains_key(key), "{key}");
        }
    }
}
