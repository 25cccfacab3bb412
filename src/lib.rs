//! Declarative AQL query assembly.
//!
//! Translates a JSON-like query description into an AQL query string
//! plus a parallel map of bound parameter values. Descriptions may be
//! supplied as strict objects, as shorthand (bare strings, `(name,
//! path)` pairs, partial objects), or built fluently; all three forms
//! render identical output.
//!
//! ```
//! use aqlify::{assemble, Query};
//!
//! let mut query = Query::new("responses");
//! query.filters.push("url.domain".into());
//! query.aggregates.push("status".into());
//!
//! let rendered = assemble(&query)?;
//! assert!(rendered.aql.starts_with("FOR doc IN responses"));
//! assert!(rendered.aql.contains("COLLECT status = doc.status"));
//! # Ok::<(), aqlify::QueryError>(())
//! ```
//!
//! The crate only produces text and bind parameters; executing the
//! query against a database is the caller's concern.

mod builder;
mod error;
mod expand;
mod functions;
mod ir;
mod render;

pub use builder::QueryBuilder;
pub use error::{QueryError, QueryResult};
pub use expand::{expand, DEFAULT_COUNT_LABEL, DEFAULT_DOCUMENT};
pub use functions::{FunctionRegistry, TypeTag};
pub use ir::{
    Aggregate, AggregateFunction, AggregateSpec, Collection, CollectionHandle, Count, Filter,
    FilterSpec, Property, PropertySpec, PropertyType, Query, Remove, RemoveDirective, RemoveSpec,
    Scope, Sort, SortDirection, SortSpec, Sorts, StrictQuery, StrictSubquery, Subquery,
};
pub use render::{render_label, sanitize, AssembleOptions, RenderedQuery};

use render::AqlAssembler;

/// Expand and assemble a query description with default options.
pub fn assemble(query: &Query) -> QueryResult<RenderedQuery> {
    assemble_with(query, &AssembleOptions::default())
}

/// Expand and assemble a query description.
pub fn assemble_with(query: &Query, options: &AssembleOptions) -> QueryResult<RenderedQuery> {
    let strict = expand(query, options)?;
    assemble_strict(&strict, options)
}

/// Assemble an already-strict query.
pub fn assemble_strict(query: &StrictQuery, options: &AssembleOptions) -> QueryResult<RenderedQuery> {
    AqlAssembler::new(options).render(query)
}
