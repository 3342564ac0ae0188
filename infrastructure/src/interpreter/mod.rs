//! Intent interpreters
//!
//! [`StructuredIntentInterpreter`] is the local, model-free implementation of
//! the [`IntentInterpreter`] port. It understands two shapes of request:
//!
//! - a JSON intent: `{"toolId": "dig", "parameters": {"domain": "example.com"}}`
//! - shorthand: `dig domain=example.com record_type=MX`
//!
//! Anything else, or shorthand naming a tool the catalog does not know,
//! yields a clarification listing the available tools. A well-formed JSON
//! intent is passed through even for an unknown tool, so the dispatcher
//! reports it as `UnknownTool`.

use async_trait::async_trait;
use serde_json::Value;
use toolbench_application::ports::intent_interpreter::{IntentInterpreter, InterpretError};
use toolbench_domain::tool::{
    ClarificationRequest, HistoryEntry, Intent, Interpretation, ToolDescriptor,
};
use toolbench_domain::util::truncate_str;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredIntentInterpreter;

impl StructuredIntentInterpreter {
    pub fn new() -> Self {
        Self
    }

    fn parse(text: &str) -> Result<Intent, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("The request is empty.".to_string());
        }

        if text.starts_with('{') {
            return Intent::from_json(text).map_err(|e| format!("Invalid intent JSON: {}", e));
        }

        let mut tokens = text.split_whitespace();
        let tool_id = tokens.next().unwrap_or_default();
        let mut intent = Intent::new(tool_id);
        for token in tokens {
            let Some((key, value)) = token.split_once('=') else {
                return Err(format!(
                    "Expected key=value after the tool name, got '{}'.",
                    truncate_str(token, 40)
                ));
            };
            if key.is_empty() {
                return Err(format!("Missing parameter name in '{}'.", token));
            }
            intent = intent.with_param(key, Value::String(value.to_string()));
        }
        Ok(intent)
    }
}

#[async_trait]
impl IntentInterpreter for StructuredIntentInterpreter {
    async fn interpret(
        &self,
        text: &str,
        _history: &[HistoryEntry],
        tools: &[ToolDescriptor],
    ) -> Result<Interpretation, InterpretError> {
        let intent = match Self::parse(text) {
            Ok(intent) => intent,
            Err(reason) => {
                debug!("Could not read request: {}", reason);
                return Ok(Interpretation::Clarification(ClarificationRequest::new(
                    format!("{} {}", reason, available_tools(tools)),
                )));
            }
        };

        let structured = text.trim_start().starts_with('{');
        if !structured && !tools.iter().any(|t| t.id == intent.tool_id) {
            return Ok(Interpretation::Clarification(ClarificationRequest::new(
                format!(
                    "I don't know a tool called '{}'. {}",
                    truncate_str(&intent.tool_id, 40),
                    available_tools(tools)
                ),
            )));
        }

        Ok(Interpretation::Intent(intent))
    }
}

fn available_tools(tools: &[ToolDescriptor]) -> String {
    if tools.is_empty() {
        return "No tools are available.".to_string();
    }
    let ids: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
    format!("Available tools: {}.", ids.join(", "))
}
