//! Command building
//!
//! Each tool identifier maps to exactly one [`CommandBuilder`] through the
//! [`BuilderTable`]. A builder turns [`ValidatedParams`] into a
//! [`CommandLine`]: a program plus an ordered argument vector that goes to
//! process creation as-is. No shell is ever involved, so a parameter value
//! always occupies the argument slot the builder put it in.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value_objects::ValidatedParams;
use crate::execution::normalizer::PostProcessor;

/// Program and argument vector for one process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// File or directory the tool is told to produce, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact = Some(path.into());
        self
    }

    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append only when `cond` holds.
    pub fn arg_if(self, cond: bool, arg: impl Into<String>) -> Self {
        if cond { self.arg(arg) } else { self }
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Full vector: program first, then arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Human-readable rendering for logs and `--dry-run` style output.
/// Never used to start a process.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.argv().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let plain = !token.is_empty()
                && token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@%+".contains(c));
            if plain {
                f.write_str(token)?;
            } else {
                write!(f, "'{}'", token.replace('\'', "'\\''"))?;
            }
        }
        Ok(())
    }
}

/// Semantic rejection of a value that passed type validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid value for '{param}': {reason}")]
    InvalidParameter { param: String, reason: String },
}

impl BuildError {
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        BuildError::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Turns validated parameters into a command line. Must not perform I/O.
pub trait CommandBuilder: Send + Sync {
    fn build(&self, params: &ValidatedParams) -> Result<CommandLine, BuildError>;
}

impl<F> CommandBuilder for F
where
    F: Fn(&ValidatedParams) -> Result<CommandLine, BuildError> + Send + Sync,
{
    fn build(&self, params: &ValidatedParams) -> Result<CommandLine, BuildError> {
        self(params)
    }
}

/// Builder plus optional artifact post-processor for one tool.
#[derive(Clone)]
pub struct ToolBinding {
    pub builder: Arc<dyn CommandBuilder>,
    pub post_processor: Option<Arc<dyn PostProcessor>>,
}

impl ToolBinding {
    pub fn new(builder: impl CommandBuilder + 'static) -> Self {
        Self {
            builder: Arc::new(builder),
            post_processor: None,
        }
    }

    pub fn with_post_processor(mut self, post: impl PostProcessor + 'static) -> Self {
        self.post_processor = Some(Arc::new(post));
        self
    }
}

impl fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBinding")
            .field("post_processor", &self.post_processor.is_some())
            .finish_non_exhaustive()
    }
}

/// Lookup table from tool identifier to its [`ToolBinding`].
#[derive(Debug, Default)]
pub struct BuilderTable {
    bindings: RwLock<HashMap<String, ToolBinding>>,
}

impl BuilderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the binding for `tool_id`.
    pub fn insert(&self, tool_id: impl Into<String>, binding: ToolBinding) {
        if let Ok(mut bindings) = self.bindings.write() {
            bindings.insert(tool_id.into(), binding);
        }
    }

    pub fn with(self, tool_id: impl Into<String>, binding: ToolBinding) -> Self {
        self.insert(tool_id, binding);
        self
    }

    pub fn get(&self, tool_id: &str) -> Option<ToolBinding> {
        self.bindings.read().ok()?.get(tool_id).cloned()
    }

    pub fn remove(&self, tool_id: &str) -> Option<ToolBinding> {
        self.bindings.write().ok()?.remove(tool_id)
    }

    pub fn contains(&self, tool_id: &str) -> bool {
        self.bindings
            .read()
            .map(|b| b.contains_key(tool_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
