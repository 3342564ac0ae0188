//! Shared utilities for use cases.

use tokio_util::sync::CancellationToken;
use toolbench_domain::execution::DispatchError;

/// Check if cancellation has been requested.
///
/// Returns `Err(DispatchError::Cancelled)` if the token is cancelled.
pub(crate) fn check_cancelled(token: &CancellationToken, tool: &str) -> Result<(), DispatchError> {
    if token.is_cancelled() {
        return Err(DispatchError::Cancelled {
            tool: tool.to_string(),
        });
    }
    Ok(())
}
