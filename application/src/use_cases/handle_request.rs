//! Handle Request use case.
//!
//! Entry point for a caller holding free text or an already structured
//! [`Intent`]. Free text goes through the [`IntentInterpreter`] port first;
//! a clarification request is returned as-is and nothing is dispatched.
//! Every handled request is recorded through the [`ExecutionLogger`] port.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use toolbench_domain::execution::{DispatchError, ExecutionReport};
use toolbench_domain::tool::{
    ClarificationRequest, HistoryEntry, Intent, Interpretation, ToolDescriptor,
};
use toolbench_domain::util::truncate_str;
use tracing::{debug, info};

use crate::ports::execution_logger::{ExecutionEvent, ExecutionLogger, NoExecutionLogger};
use crate::ports::intent_interpreter::{IntentInterpreter, InterpretError};
use crate::use_cases::dispatch::Dispatcher;

/// Errors that can occur while handling a request.
///
/// Validation and execution failures are reports, not errors; only
/// interpreter failures and fatal dispatch errors end up here.
#[derive(Error, Debug)]
pub enum HandleRequestError {
    #[error("Interpreter error: {0}")]
    Interpret(#[from] InterpretError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// What came of one request.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Report(ExecutionReport),
    Clarification(ClarificationRequest),
}

pub struct HandleRequestUseCase {
    dispatcher: Arc<Dispatcher>,
    interpreter: Option<Arc<dyn IntentInterpreter>>,
    execution_logger: Arc<dyn ExecutionLogger>,
}

impl HandleRequestUseCase {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            interpreter: None,
            execution_logger: Arc::new(NoExecutionLogger),
        }
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn IntentInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn with_execution_logger(mut self, logger: Arc<dyn ExecutionLogger>) -> Self {
        self.execution_logger = logger;
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Interpret free text, then dispatch the resulting intent.
    pub async fn execute(
        &self,
        text: &str,
        history: &[HistoryEntry],
    ) -> Result<RequestOutcome, HandleRequestError> {
        let interpreter = self
            .interpreter
            .as_ref()
            .ok_or_else(|| InterpretError::Unavailable("no interpreter configured".to_string()))?;

        let tools: Vec<ToolDescriptor> = self
            .dispatcher
            .catalog()
            .list()
            .map_err(DispatchError::from)?
            .iter()
            .map(|d| d.as_ref().clone())
            .collect();

        debug!(
            "Interpreting request ({} tools known): {}",
            tools.len(),
            truncate_str(text, 100)
        );

        match interpreter.interpret(text, history, &tools).await? {
            Interpretation::Clarification(clarification) => {
                info!("Interpreter asked for clarification");
                self.execution_logger.log(ExecutionEvent::new(
                    "clarification",
                    json!({
                        "request": text,
                        "message": clarification.message,
                    }),
                ));
                Ok(RequestOutcome::Clarification(clarification))
            }
            Interpretation::Intent(intent) => {
                self.execute_intent(&intent).await.map(RequestOutcome::Report)
            }
        }
    }

    /// Dispatch a structured intent.
    pub async fn execute_intent(
        &self,
        intent: &Intent,
    ) -> Result<ExecutionReport, HandleRequestError> {
        if let Some(explanation) = &intent.explanation {
            info!("{}: {}", intent.tool_id, truncate_str(explanation, 200));
        }

        match self.dispatcher.dispatch_report(intent).await {
            Ok(report) => {
                self.execution_logger.log(ExecutionEvent::new(
                    "report",
                    json!({
                        "intent": intent,
                        "report": report,
                    }),
                ));
                Ok(report)
            }
            Err(err) => {
                self.execution_logger.log(ExecutionEvent::new(
                    "fatal_error",
                    json!({
                        "intent": intent,
                        "error": err.to_string(),
                    }),
                ));
                Err(err.into())
            }
        }
    }
}
