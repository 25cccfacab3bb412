//! Rendering of strict queries to AQL text.
//!
//! [`RenderedQuery`] pairs the generated query string with the map of
//! bound parameter values; [`AssembleOptions`] carries the cross-cutting
//! knobs (default iteration variable, strict mode, function registry).

mod aql;
mod path;

pub(crate) use aql::AqlAssembler;
pub use path::{render_label, sanitize};

use crate::functions::FunctionRegistry;
use serde_json::Value;
use std::collections::HashMap;

/// Output from assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    /// The generated AQL query string
    pub aql: String,
    /// Parameters to bind to the query, keyed by placeholder name
    pub params: HashMap<String, Value>,
}

/// Cross-cutting assembly options.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Default iteration variable; falls back to
    /// [`crate::DEFAULT_DOCUMENT`]
    pub document: Option<String>,
    /// Upgrade unsupported function references and unresolvable
    /// properties to errors instead of degrading silently
    pub strict: bool,
    /// Function compatibility table consulted for scalar wraps
    pub functions: FunctionRegistry,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            document: None,
            strict: false,
            functions: FunctionRegistry::aql(),
        }
    }
}
