//! Tool domain traits
//!
//! Contains pure domain logic for validating an [`Intent`] against the
//! [`ToolDescriptor`] it names. The async process port lives in the
//! application layer.

use serde_json::Value;
use thiserror::Error;

use super::entities::{ParamType, ParameterSpec, ToolDescriptor};
use super::intent::Intent;
use super::value_objects::{ParamValue, ValidatedParams};

/// Reasons an intent's parameters were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required parameter '{param}' for tool '{tool}'")]
    MissingParameter { tool: String, param: String },

    #[error("parameter '{param}' for tool '{tool}' expected {expected}, got {found}")]
    TypeMismatch {
        tool: String,
        param: String,
        expected: String,
        found: String,
    },

    #[error("unknown parameter '{param}' for tool '{tool}'")]
    UnknownParameter { tool: String, param: String },
}

/// Validator for intents
///
/// Pure: turns untrusted, loosely typed intent parameters into
/// [`ValidatedParams`] without any I/O.
pub trait ToolValidator: Send + Sync {
    fn validate(
        &self,
        intent: &Intent,
        descriptor: &ToolDescriptor,
    ) -> Result<ValidatedParams, ValidationError>;
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(
        &self,
        intent: &Intent,
        descriptor: &ToolDescriptor,
    ) -> Result<ValidatedParams, ValidationError> {
        for name in intent.parameters.keys() {
            if descriptor.parameter(name).is_none() {
                return Err(ValidationError::UnknownParameter {
                    tool: descriptor.id.clone(),
                    param: name.clone(),
                });
            }
        }

        let mut validated = ValidatedParams::new();
        for spec in &descriptor.parameters {
            let supplied = intent.parameters.get(&spec.name).filter(|v| !v.is_null());
            match supplied {
                Some(raw) => {
                    let value = coerce(raw, spec).ok_or_else(|| ValidationError::TypeMismatch {
                        tool: descriptor.id.clone(),
                        param: spec.name.clone(),
                        expected: expected_description(&spec.param_type),
                        found: describe_json(raw),
                    })?;
                    validated.insert(spec.name.clone(), value);
                }
                None => {
                    if let Some(default) = &spec.default {
                        validated.insert(spec.name.clone(), default.clone());
                    } else if spec.required {
                        return Err(ValidationError::MissingParameter {
                            tool: descriptor.id.clone(),
                            param: spec.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(validated)
    }
}

/// Convert one raw JSON value to the parameter's declared type.
fn coerce(raw: &Value, spec: &ParameterSpec) -> Option<ParamValue> {
    match &spec.param_type {
        ParamType::String => match raw {
            Value::String(s) => Some(ParamValue::Text(s.clone())),
            Value::Number(n) => Some(ParamValue::Text(n.to_string())),
            _ => None,
        },
        ParamType::Integer => match raw {
            Value::Number(n) => n.as_i64().map(ParamValue::Integer),
            Value::String(s) => s.trim().parse::<i64>().ok().map(ParamValue::Integer),
            _ => None,
        },
        ParamType::Flag => match raw {
            Value::Bool(b) => Some(ParamValue::Flag(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(ParamValue::Flag(true)),
                "false" => Some(ParamValue::Flag(false)),
                _ => None,
            },
            _ => None,
        },
        ParamType::Choice(choices) => match raw {
            Value::String(s) if choices.iter().any(|c| c == s) => {
                Some(ParamValue::Text(s.clone()))
            }
            _ => None,
        },
    }
}

fn expected_description(param_type: &ParamType) -> String {
    match param_type {
        ParamType::Choice(choices) => format!("one of [{}]", choices.join(", ")),
        other => other.name().to_string(),
    }
}

fn describe_json(raw: &Value) -> String {
    match raw {
        Value::String(s) => format!("\"{}\"", crate::util::truncate_str(s, 64)),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
        Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParameterSpec, ToolCategory};
    use serde_json::json;

    fn gobuster() -> ToolDescriptor {
        ToolDescriptor::new("gobuster", ToolCategory::WebScan, "Brute forcer")
            .with_parameter(ParameterSpec::required("target", "URL or domain"))
            .with_parameter(
                ParameterSpec::optional("mode", "Mode")
                    .choice(["dir", "dns", "vhost"])
                    .with_default("dir"),
            )
            .with_parameter(
                ParameterSpec::optional("threads", "Threads")
                    .with_type(ParamType::Integer)
                    .with_default(10),
            )
            .with_parameter(
                ParameterSpec::optional("quiet", "Quiet output").with_type(ParamType::Flag),
            )
    }

    #[test]
    fn test_validator_missing_required() {
        let intent = Intent::new("gobuster").with_param("mode", "dns");
        let err = DefaultToolValidator.validate(&intent, &gobuster()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingParameter {
                tool: "gobuster".into(),
                param: "target".into()
            }
        );
    }

    #[test]
    fn test_validator_unknown_param() {
        let intent = Intent::new("gobuster")
            .with_param("target", "http://x")
            .with_param("wat", "1");
        let err = DefaultToolValidator.validate(&intent, &gobuster()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownParameter { .. }));
        assert!(err.to_string().contains("unknown parameter 'wat'"));
    }

    #[test]
    fn test_validator_fills_defaults() {
        let intent = Intent::new("gobuster").with_param("target", "http://x");
        let params = DefaultToolValidator.validate(&intent, &gobuster()).unwrap();
        assert_eq!(params.get_str("mode"), Some("dir"));
        assert_eq!(params.get_i64("threads"), Some(10));
        assert!(!params.contains("quiet"));
    }

    #[test]
    fn test_validator_coerces_loose_values() {
        let intent = Intent::new("gobuster")
            .with_param("target", "http://x")
            .with_param("threads", "25")
            .with_param("quiet", "TRUE");
        let params = DefaultToolValidator.validate(&intent, &gobuster()).unwrap();
        assert_eq!(params.get_i64("threads"), Some(25));
        assert_eq!(params.get_bool("quiet"), Some(true));
    }

    #[test]
    fn test_validator_null_counts_as_absent() {
        let intent = Intent::new("gobuster").with_param("target", Value::Null);
        let err = DefaultToolValidator.validate(&intent, &gobuster()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingParameter { .. }));
    }

    #[test]
    fn test_validator_type_mismatch() {
        let intent = Intent::new("gobuster")
            .with_param("target", "http://x")
            .with_param("threads", "many");
        let err = DefaultToolValidator.validate(&intent, &gobuster()).unwrap_err();
        match err {
            ValidationError::TypeMismatch {
                param, expected, ..
            } => {
                assert_eq!(param, "threads");
                assert_eq!(expected, "integer");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let intent = Intent::new("gobuster")
            .with_param("target", "http://x")
            .with_param("mode", "fuzz");
        let err = DefaultToolValidator.validate(&intent, &gobuster()).unwrap_err();
        assert!(err.to_string().contains("one of [dir, dns, vhost]"));

        let intent = Intent::new("gobuster").with_param("target", json!(["a", "b"]));
        assert!(matches!(
            DefaultToolValidator.validate(&intent, &gobuster()),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validator_rejects_fractional_integer() {
        let intent = Intent::new("gobuster")
            .with_param("target", "http://x")
            .with_param("threads", 2.5);
        assert!(DefaultToolValidator.validate(&intent, &gobuster()).is_err());
    }
}
