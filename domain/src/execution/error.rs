//! Dispatch error taxonomy.

use thiserror::Error;

use super::report::{ExecutionReport, FailureReason};
use crate::tool::builder::BuildError;
use crate::tool::catalog::CatalogError;
use crate::tool::traits::ValidationError;

/// Errors raised by the dispatcher before or instead of producing a report.
///
/// Everything except [`DispatchError::Fatal`] converts into a failed
/// [`ExecutionReport`]. `Fatal` means the engine itself is unusable
/// (process creation failed, catalog lock poisoned) and propagates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required parameter '{param}' for tool '{tool}'")]
    MissingParameter { tool: String, param: String },

    #[error("parameter '{param}' for tool '{tool}' expected {expected}, got {found}")]
    TypeMismatch {
        tool: String,
        param: String,
        expected: String,
        found: String,
    },

    #[error("invalid parameter '{param}' for tool '{tool}': {reason}")]
    InvalidParameter {
        tool: String,
        param: String,
        reason: String,
    },

    #[error("execution of '{tool}' was cancelled")]
    Cancelled { tool: String },

    #[error("fatal dispatch error: {0}")]
    Fatal(String),
}

impl DispatchError {
    /// `None` for fatal errors.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            DispatchError::UnknownTool(_) => Some(FailureReason::UnknownTool),
            DispatchError::MissingParameter { .. } => Some(FailureReason::MissingParameter),
            DispatchError::TypeMismatch { .. } => Some(FailureReason::TypeMismatch),
            DispatchError::InvalidParameter { .. } => Some(FailureReason::InvalidParameter),
            DispatchError::Cancelled { .. } => Some(FailureReason::Cancelled),
            DispatchError::Fatal(_) => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DispatchError::Fatal(_))
    }

    pub fn tool_id(&self) -> Option<&str> {
        match self {
            DispatchError::UnknownTool(tool)
            | DispatchError::MissingParameter { tool, .. }
            | DispatchError::TypeMismatch { tool, .. }
            | DispatchError::InvalidParameter { tool, .. }
            | DispatchError::Cancelled { tool } => Some(tool),
            DispatchError::Fatal(_) => None,
        }
    }

    /// Failed report for a non-fatal error.
    pub fn to_report(&self) -> Option<ExecutionReport> {
        let reason = self.failure_reason()?;
        let tool = self.tool_id().unwrap_or_default();
        Some(ExecutionReport::failure(tool, reason, self.to_string()))
    }

    pub fn from_build(tool: &str, err: BuildError) -> Self {
        match err {
            BuildError::InvalidParameter { param, reason } => DispatchError::InvalidParameter {
                tool: tool.to_string(),
                param,
                reason,
            },
        }
    }
}

impl From<ValidationError> for DispatchError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingParameter { tool, param } => {
                DispatchError::MissingParameter { tool, param }
            }
            ValidationError::TypeMismatch {
                tool,
                param,
                expected,
                found,
            } => DispatchError::TypeMismatch {
                tool,
                param,
                expected,
                found,
            },
            ValidationError::UnknownParameter { tool, param } => DispatchError::InvalidParameter {
                tool,
                param,
                reason: "not a parameter of this tool".to_string(),
            },
        }
    }
}

impl From<CatalogError> for DispatchError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownTool(id) => DispatchError::UnknownTool(id),
            other => DispatchError::Fatal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_parameter_maps_to_invalid_parameter() {
        let err: DispatchError = ValidationError::UnknownParameter {
            tool: "dig".into(),
            param: "bogus".into(),
        }
        .into();
        assert_eq!(err.failure_reason(), Some(FailureReason::InvalidParameter));
    }

    #[test]
    fn test_catalog_errors() {
        let err: DispatchError = CatalogError::UnknownTool("x".into()).into();
        assert_eq!(err, DispatchError::UnknownTool("x".into()));
        let err: DispatchError = CatalogError::Poisoned.into();
        assert!(err.is_fatal());
        assert!(err.to_report().is_none());
    }

    #[test]
    fn test_to_report() {
        let err = DispatchError::MissingParameter {
            tool: "whois".into(),
            param: "target".into(),
        };
        let report = err.to_report().unwrap();
        assert!(!report.success);
        assert_eq!(report.tool_id, "whois");
        assert_eq!(report.failure_reason, Some(FailureReason::MissingParameter));
        assert!(report.summary.contains("target"));
    }

    #[test]
    fn test_from_build_error() {
        let err = DispatchError::from_build("nmap", BuildError::invalid("ports", "out of range"));
        assert_eq!(
            err.to_string(),
            "invalid parameter 'ports' for tool 'nmap': out of range"
        );
    }
}
