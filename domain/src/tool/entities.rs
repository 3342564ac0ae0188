//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use super::value_objects::ParamValue;

/// Timeout applied when a descriptor is built without an explicit one.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(300);

/// Fixed set of tool categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    NetworkScan,
    WebScan,
    Exploitation,
    Password,
    Wireless,
    Enumeration,
    Dns,
    InfoGathering,
    Sniffing,
    Forensics,
    Utilities,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 11] = [
        ToolCategory::NetworkScan,
        ToolCategory::WebScan,
        ToolCategory::Exploitation,
        ToolCategory::Password,
        ToolCategory::Wireless,
        ToolCategory::Enumeration,
        ToolCategory::Dns,
        ToolCategory::InfoGathering,
        ToolCategory::Sniffing,
        ToolCategory::Forensics,
        ToolCategory::Utilities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::NetworkScan => "network_scan",
            ToolCategory::WebScan => "web_scan",
            ToolCategory::Exploitation => "exploitation",
            ToolCategory::Password => "password",
            ToolCategory::Wireless => "wireless",
            ToolCategory::Enumeration => "enumeration",
            ToolCategory::Dns => "dns",
            ToolCategory::InfoGathering => "info_gathering",
            ToolCategory::Sniffing => "sniffing",
            ToolCategory::Forensics => "forensics",
            ToolCategory::Utilities => "utilities",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown tool category: {}", s))
    }
}

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "choices", rename_all = "snake_case")]
pub enum ParamType {
    /// Free-form text
    String,
    /// Signed integer
    Integer,
    /// One of a fixed set of values
    Choice(Vec<String>),
    /// Boolean switch
    Flag,
}

impl ParamType {
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Choice(_) => "choice",
            ParamType::Flag => "flag",
        }
    }

    /// Whether an already-typed value fits this parameter type.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamType::String, ParamValue::Text(_)) => true,
            (ParamType::Integer, ParamValue::Integer(_)) => true,
            (ParamType::Flag, ParamValue::Flag(_)) => true,
            (ParamType::Choice(choices), ParamValue::Text(s)) => choices.iter().any(|c| c == s),
            _ => false,
        }
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Semantic type
    pub param_type: ParamType,
    /// Value used when the parameter is omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl ParameterSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
        param_type: ParamType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type,
            default: None,
        }
    }

    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, true, ParamType::String)
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, false, ParamType::String)
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn choice<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_type = ParamType::Choice(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Catalog entry describing one external command-line tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique identifier (e.g., "nmap", "git_clone")
    pub id: String,
    /// Category used for grouping and listing
    pub category: ToolCategory,
    /// Human-readable description
    pub description: String,
    /// Executable the tool needs on the host (used by discovery)
    pub binary: String,
    /// Ordered parameter specifications
    pub parameters: Vec<ParameterSpec>,
    /// Wall-clock budget for one execution
    #[serde(with = "crate::util::duration_secs", rename = "timeout_secs")]
    pub timeout: Duration,
}

impl ToolDescriptor {
    pub fn new(
        id: impl Into<String>,
        category: ToolCategory,
        description: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            binary: id.clone(),
            id,
            category,
            description: description.into(),
            parameters: Vec::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_parameter(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_secs(self, secs: u64) -> Self {
        self.with_timeout(Duration::from_secs(secs))
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Check the descriptor's own invariants: unique parameter names,
    /// defaults that fit their declared type, and a non-zero timeout.
    pub fn check_schema(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("tool identifier must not be empty".to_string());
        }
        if self.timeout.is_zero() {
            return Err(format!("tool '{}' has a zero timeout", self.id));
        }
        let mut seen = std::collections::HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(format!(
                    "duplicate parameter '{}' in tool '{}'",
                    param.name, self.id
                ));
            }
            if let Some(default) = &param.default
                && !param.param_type.accepts(default)
            {
                return Err(format!(
                    "default for parameter '{}' in tool '{}' is not a valid {}",
                    param.name,
                    self.id,
                    param.param_type.name()
                ));
            }
        }
        Ok(())
    }
}
