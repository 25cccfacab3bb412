//! Path and label rendering for property-like objects.
//!
//! Computes the dotted-path expression (with document-variable prefix
//! and optional function wrap) and the sanitized output label for any
//! property.

use crate::error::{QueryError, QueryResult};
use crate::functions::FunctionRegistry;
use crate::ir::{Aggregate, AggregateFunction, Property, PropertyType, Scope};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel rendered for a property lacking both `name` and `path`.
pub(crate) const UNRESOLVED: &str = "_unresolved_";

static LABEL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[\].\-@\s]").unwrap());

/// Replace characters that are not legal in a bare AQL identifier
/// (array brackets, dots, hyphens, whitespace, `@`) with `_`.
pub fn sanitize(label: &str) -> String {
    LABEL_CHARS.replace_all(label, "_").into_owned()
}

/// Sanitized output label: `name ?? path`.
pub fn render_label(property: &Property) -> String {
    let raw = property
        .name
        .as_deref()
        .or(property.path.as_deref())
        .unwrap_or(UNRESOLVED);
    sanitize(raw)
}

/// Shared state for path rendering.
pub(crate) struct PathContext<'a> {
    pub functions: &'a FunctionRegistry,
    pub strict: bool,
}

/// Render the full dotted-path expression for a property.
///
/// Prefix resolution: `Unscoped` drops the prefix, `Doc` uses the
/// explicit variable, `Ambient` falls back to `ambient` (itself `None`
/// when the surrounding position has no scope). A scalar `function`
/// wraps the path only when the registry accepts it for the declared
/// type; otherwise the bare path is rendered, or strict mode errors.
pub(crate) fn render_path(
    property: &Property,
    ambient: Option<&str>,
    ctx: &PathContext<'_>,
    aggregate_context: bool,
) -> QueryResult<String> {
    let base = match property.path.as_deref().or(property.name.as_deref()) {
        Some(base) => base,
        None if ctx.strict => return Err(QueryError::UnresolvableProperty),
        None => UNRESOLVED,
    };

    let prefix = match &property.document {
        Scope::Unscoped => None,
        Scope::Doc(document) => Some(document.as_str()),
        Scope::Ambient => ambient,
    };

    let rendered = match prefix {
        Some(prefix) => format!("{prefix}.{base}"),
        None => base.to_string(),
    };

    match &property.function {
        Some(function) => {
            if ctx
                .functions
                .is_supported(function, aggregate_context, property.value_type)
            {
                Ok(format!("{}({rendered})", function.to_uppercase()))
            } else if ctx.strict {
                Err(QueryError::UnsupportedFunction {
                    name: function.clone(),
                })
            } else {
                Ok(rendered)
            }
        }
        None => Ok(rendered),
    }
}

/// Render the accumulation expression for an aggregate.
///
/// `collect` yields the bare path (it is a grouping key, not a function
/// call). Numeric reductions on a property not typed `number` reduce
/// over `LENGTH(path)` instead; a string or array column has no direct
/// numeric reduction, its length does.
pub(crate) fn render_aggregate_path(
    aggregate: &Aggregate,
    ambient: Option<&str>,
    ctx: &PathContext<'_>,
) -> QueryResult<String> {
    let inner = render_path(&aggregate.property, ambient, ctx, true)?;
    let numeric = aggregate.property.value_type == Some(PropertyType::Number);

    let rendered = match aggregate.aggregate {
        AggregateFunction::Collect => inner,
        AggregateFunction::Distinct => format!("COUNT_DISTINCT({inner})"),
        AggregateFunction::Empty => format!("SUM(LENGTH({inner}) == 0 ? 1 : 0)"),
        AggregateFunction::NonEmpty => format!("SUM(LENGTH({inner}) > 0 ? 1 : 0)"),
        AggregateFunction::Min => reduce("MIN", &inner, numeric),
        AggregateFunction::Max => reduce("MAX", &inner, numeric),
        AggregateFunction::Avg => reduce("AVG", &inner, numeric),
        AggregateFunction::Sum => reduce("SUM", &inner, numeric),
    };
    Ok(rendered)
}

fn reduce(keyword: &str, inner: &str, numeric: bool) -> String {
    if numeric {
        format!("{keyword}({inner})")
    } else {
        format!("{keyword}(LENGTH({inner}))")
    }
}
