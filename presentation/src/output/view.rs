//! Plain rows handed to the console formatter.
//!
//! The cli binary fills these from infrastructure types so that this crate
//! only depends on the domain and application layers.

use std::path::Path;
use toolbench_domain::tool::ToolDescriptor;

/// One catalog entry
#[derive(Debug, Clone, Copy)]
pub struct ToolRow<'a> {
    pub descriptor: &'a ToolDescriptor,
    /// Whether the tool's binary was found on this host
    pub installed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct MissingToolRow<'a> {
    pub id: &'a str,
    pub binary: &'a str,
    pub install_hint: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSourceRow<'a> {
    pub label: &'a str,
    pub location: Option<&'a Path>,
    pub found: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigIssueRow<'a> {
    pub is_error: bool,
    pub message: &'a str,
}
