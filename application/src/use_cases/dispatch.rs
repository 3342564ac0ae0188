//! Dispatch use case.
//!
//! The [`Dispatcher`] takes an [`Intent`] through
//! `Received → Validated → Built → Running → Normalized → Done`, or into
//! `Errored` from any of those states:
//!
//! 1. Resolve the tool in the [`ToolCatalog`] and validate parameters
//! 2. Build the argument vector with the tool's [`CommandBuilder`](toolbench_domain::CommandBuilder)
//! 3. Run it through the [`ProcessSupervisorPort`] with the tool's timeout
//! 4. Normalize the outcome into an [`ExecutionReport`]
//!
//! There is no retry. Validation errors never reach the supervisor.
//! Every in-flight execution can be cancelled by its [`ExecutionId`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use toolbench_domain::execution::{
    DispatchError, DispatchRecord, DispatchState, ExecutionId, ExecutionOutcome, ExecutionReport,
    ExecutionRequest, PostProcessor, ResultNormalizer,
};
use toolbench_domain::tool::{
    BuilderTable, CatalogError, DefaultToolValidator, Intent, ToolBinding, ToolCatalog,
    ToolDescriptor, ToolValidator, ValidatedParams,
};
use tracing::{debug, error, info, warn};

use crate::config::ExecutionParams;
use crate::ports::dispatch_observer::{DispatchObserver, NoDispatchObserver};
use crate::ports::process_supervisor::{ProcessSupervisorPort, SupervisorError};
use crate::use_cases::shared::check_cancelled;

type InFlightMap = Arc<Mutex<HashMap<ExecutionId, CancellationToken>>>;

/// Registration of one running dispatch; removed from the registry on drop.
struct InFlight {
    id: ExecutionId,
    token: CancellationToken,
    registry: InFlightMap,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut map) = self.registry.lock() {
            map.remove(&self.id);
        }
    }
}

/// Orchestrates validation, command building, supervised execution and
/// normalization for each intent.
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    bindings: Arc<BuilderTable>,
    supervisor: Arc<dyn ProcessSupervisorPort>,
    validator: Arc<dyn ToolValidator>,
    normalizer: ResultNormalizer,
    observer: Arc<dyn DispatchObserver>,
    params: ExecutionParams,
    next_id: AtomicU64,
    in_flight: InFlightMap,
    /// Held across each install/uninstall so catalog and builder table
    /// change together.
    catalog_changes: Mutex<()>,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        bindings: Arc<BuilderTable>,
        supervisor: Arc<dyn ProcessSupervisorPort>,
    ) -> Self {
        Self {
            catalog,
            bindings,
            supervisor,
            validator: Arc::new(DefaultToolValidator),
            normalizer: ResultNormalizer::default(),
            observer: Arc::new(NoDispatchObserver),
            params: ExecutionParams::default(),
            next_id: AtomicU64::new(0),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            catalog_changes: Mutex::new(()),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ToolValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_normalizer(mut self, normalizer: ResultNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    // ==================== Dispatch ====================

    /// Dispatch one intent and wait for its report.
    ///
    /// Validation failures, cancellation and fatal errors come back as
    /// `Err`. Non-zero exits, timeouts and missing binaries are failed
    /// reports, not errors.
    pub async fn dispatch(&self, intent: &Intent) -> Result<ExecutionReport, DispatchError> {
        let entry = self.begin();
        self.execute(entry, intent).await
    }

    /// Like [`dispatch`](Self::dispatch), but folds every non-fatal error
    /// into a failed report. Only fatal errors remain `Err`.
    pub async fn dispatch_report(
        &self,
        intent: &Intent,
    ) -> Result<ExecutionReport, DispatchError> {
        let entry = self.begin();
        let id = entry.id;
        match self.execute(entry, intent).await {
            Ok(report) => Ok(report),
            Err(err) => match err.to_report() {
                Some(report) => Ok(report.with_execution_id(id)),
                None => Err(err),
            },
        }
    }

    /// Start a dispatch on the runtime and return its id immediately, so
    /// the caller can cancel it while it runs.
    pub fn spawn(
        self: &Arc<Self>,
        intent: Intent,
    ) -> (ExecutionId, JoinHandle<Result<ExecutionReport, DispatchError>>) {
        let entry = self.begin();
        let id = entry.id;
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.execute(entry, &intent).await });
        (id, handle)
    }

    /// Request cancellation of an in-flight execution.
    ///
    /// Returns `false` if no execution with that id is running.
    pub fn cancel(&self, id: ExecutionId) -> bool {
        let token = match self.in_flight.lock() {
            Ok(map) => map.get(&id).cloned(),
            Err(_) => None,
        };
        match token {
            Some(token) => {
                info!(execution = %id, "Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel everything that is running. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let tokens: Vec<CancellationToken> = match self.in_flight.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        for token in &tokens {
            token.cancel();
        }
        tokens.len()
    }

    /// Ids of executions currently in flight, ascending.
    pub fn in_flight(&self) -> Vec<ExecutionId> {
        let mut ids: Vec<ExecutionId> = match self.in_flight.lock() {
            Ok(map) => map.keys().copied().collect(),
            Err(_) => Vec::new(),
        };
        ids.sort();
        ids
    }

    // ==================== Runtime catalog changes ====================

    /// Register a descriptor together with its binding ("install then
    /// register"). On failure neither the catalog nor the builder table
    /// changes.
    pub fn install_tool(
        &self,
        descriptor: ToolDescriptor,
        binding: ToolBinding,
    ) -> Result<(), CatalogError> {
        let _changing = self
            .catalog_changes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.catalog.contains(&descriptor.id) {
            return Err(CatalogError::DuplicateTool(descriptor.id));
        }
        let id = descriptor.id.clone();
        self.bindings.insert(id.clone(), binding);
        if let Err(e) = self.catalog.register(descriptor) {
            self.bindings.remove(&id);
            return Err(e);
        }
        info!(tool = %id, "Installed tool");
        Ok(())
    }

    /// Remove a tool and its binding.
    pub fn uninstall_tool(&self, tool_id: &str) -> Result<(), CatalogError> {
        let _changing = self
            .catalog_changes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.catalog.unregister(tool_id)?;
        self.bindings.remove(tool_id);
        info!(tool = %tool_id, "Uninstalled tool");
        Ok(())
    }

    // ==================== Internals ====================

    fn begin(&self) -> InFlight {
        let id = ExecutionId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let token = CancellationToken::new();
        if let Ok(mut map) = self.in_flight.lock() {
            map.insert(id, token.clone());
        }
        InFlight {
            id,
            token,
            registry: Arc::clone(&self.in_flight),
        }
    }

    async fn execute(
        &self,
        entry: InFlight,
        intent: &Intent,
    ) -> Result<ExecutionReport, DispatchError> {
        let mut record = DispatchRecord::new(entry.id, &intent.tool_id);
        self.observer
            .on_transition(record.id, &record.tool_id, record.state());

        match self.drive(&mut record, intent, &entry.token).await {
            Ok(report) => Ok(report),
            Err(err) => {
                record.fail(err.failure_reason());
                self.observer
                    .on_transition(record.id, &record.tool_id, record.state());
                let elapsed_ms = record.elapsed_ms();
                if err.is_fatal() {
                    error!(execution = %record.id, tool = %record.tool_id, elapsed_ms, error = %err, "Dispatch failed fatally");
                } else {
                    debug!(execution = %record.id, tool = %record.tool_id, elapsed_ms, error = %err, "Dispatch rejected");
                }
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        record: &mut DispatchRecord,
        intent: &Intent,
        token: &CancellationToken,
    ) -> Result<ExecutionReport, DispatchError> {
        let id = record.id;
        check_cancelled(token, &intent.tool_id)?;

        let descriptor = self.catalog.lookup(&intent.tool_id)?;
        let params = self.validator.validate(intent, &descriptor)?;
        self.advance(record, DispatchState::Validated)?;

        let binding = self.bindings.get(&descriptor.id).ok_or_else(|| {
            DispatchError::Fatal(format!(
                "no command builder registered for tool '{}'",
                descriptor.id
            ))
        })?;
        let command = binding
            .builder
            .build(&params)
            .map_err(|e| DispatchError::from_build(&descriptor.id, e))?;
        self.advance(record, DispatchState::Built)?;

        check_cancelled(token, &descriptor.id)?;
        let timeout = self.params.timeout_for(&descriptor);
        let mut request = ExecutionRequest::new(id, command.clone(), timeout);
        if let Some(dir) = &self.params.working_dir {
            request = request.with_working_dir(dir.clone());
        }

        self.advance(record, DispatchState::Running)?;
        self.observer.on_process_start(id, &command);
        info!(
            execution = %id,
            tool = %descriptor.id,
            command = %command,
            timeout_secs = timeout.as_secs(),
            "Starting tool"
        );

        let report = match self.supervisor.run(request, token.clone()).await {
            Ok(outcome) if outcome.cancelled => {
                return Err(DispatchError::Cancelled {
                    tool: descriptor.id.clone(),
                });
            }
            Ok(outcome) => {
                self.normalize(
                    &descriptor.id,
                    outcome,
                    params,
                    command.artifact.clone(),
                    binding.post_processor.clone(),
                )
                .await?
            }
            Err(SupervisorError::ProgramNotFound { program }) => {
                warn!(execution = %id, tool = %descriptor.id, program = %program, "Program not found");
                self.normalizer.not_found(&descriptor.id, &program)
            }
            Err(e) => return Err(DispatchError::Fatal(e.to_string())),
        };
        self.advance(record, DispatchState::Normalized)?;

        let report = report
            .with_execution_id(id)
            .with_command(command.to_string());
        self.advance(record, DispatchState::Done)?;

        info!(
            execution = %id,
            tool = %descriptor.id,
            success = report.success,
            reason = report.failure_reason.map(|r| r.as_str()).unwrap_or("-"),
            duration_ms = report.duration_ms,
            "Tool finished"
        );
        self.observer.on_report(id, &report);
        Ok(report)
    }

    fn advance(
        &self,
        record: &mut DispatchRecord,
        next: DispatchState,
    ) -> Result<(), DispatchError> {
        record
            .advance(next)
            .map_err(|e| DispatchError::Fatal(e.to_string()))?;
        self.observer.on_transition(record.id, &record.tool_id, next);
        Ok(())
    }

    /// Normalize on the blocking pool when a post-processor may read an
    /// artifact; inline otherwise.
    async fn normalize(
        &self,
        tool_id: &str,
        outcome: ExecutionOutcome,
        params: ValidatedParams,
        artifact: Option<PathBuf>,
        post: Option<Arc<dyn PostProcessor>>,
    ) -> Result<ExecutionReport, DispatchError> {
        let Some(post) = post else {
            return Ok(self
                .normalizer
                .normalize(tool_id, &outcome, &params, artifact.as_deref(), None));
        };

        let normalizer = self.normalizer.clone();
        let tool_id = tool_id.to_string();
        tokio::task::spawn_blocking(move || {
            normalizer.normalize(
                &tool_id,
                &outcome,
                &params,
                artifact.as_deref(),
                Some(post.as_ref()),
            )
        })
        .await
        .map_err(|e| DispatchError::Fatal(format!("normalization task failed: {}", e)))
    }
}
