//! Shorthand expansion.
//!
//! Normalizes a loosely-typed [`Query`] into the [`StrictQuery`] the
//! assembler accepts: shorthand entries become full typed objects,
//! `document` and `count` are defaulted, and whichever of a property's
//! `name`/`path` is missing is copied from the other. The input is
//! never mutated; expanding an already-strict query yields an equal
//! strict query.

use crate::error::{QueryError, QueryResult};
use crate::ir::{
    Aggregate, AggregateFunction, AggregateSpec, Collection, Count, Filter, FilterSpec, Property,
    PropertySpec, Query, Remove, RemoveDirective, RemoveSpec, Sort, SortDirection, SortSpec, Sorts,
    StrictQuery, StrictSubquery, Subquery,
};
use crate::render::AssembleOptions;
use serde_json::Value;

/// Default iteration variable when neither the query nor the options
/// name one.
pub const DEFAULT_DOCUMENT: &str = "doc";

/// Default label for the generated group count.
pub const DEFAULT_COUNT_LABEL: &str = "length";

/// Primary key attribute targeted by the `remove: true` shorthand.
const PRIMARY_KEY: &str = "_key";

/// Expand a query description into its strict form.
///
/// Fails with [`QueryError::ReturnRemoveConflict`] when both `return`
/// properties and `remove` directives are present after expansion, at
/// any nesting level.
pub fn expand(query: &Query, options: &AssembleOptions) -> QueryResult<StrictQuery> {
    expand_level(
        query,
        options.document.as_deref().unwrap_or(DEFAULT_DOCUMENT),
    )
}

fn expand_level(query: &Query, default_document: &str) -> QueryResult<StrictQuery> {
    let returns: Vec<Property> = query.returns.iter().map(expand_property).collect();
    let removes: Vec<Remove> = query
        .remove
        .iter()
        .map(|spec| expand_remove(spec, &query.collection))
        .collect();

    if !returns.is_empty() && !removes.is_empty() {
        return Err(QueryError::ReturnRemoveConflict);
    }

    let subqueries = query
        .subqueries
        .iter()
        .map(expand_subquery)
        .collect::<QueryResult<Vec<_>>>()?;

    Ok(StrictQuery {
        collection: query.collection.clone(),
        document: query
            .document
            .clone()
            .unwrap_or_else(|| default_document.to_string()),
        comment: query.comment.clone(),
        filters: query.filters.iter().map(expand_filter).collect(),
        aggregates: query.aggregates.iter().map(expand_aggregate).collect(),
        sorts: match &query.sorts {
            Sorts::Default => Sorts::Default,
            Sorts::Null => Sorts::Null,
            Sorts::Fields(sorts) => Sorts::Fields(sorts.iter().map(expand_sort).collect()),
        },
        subqueries,
        returns,
        removes,
        count: match &query.count {
            Count::Default => Some(DEFAULT_COUNT_LABEL.to_string()),
            Count::Disabled => None,
            Count::Label(label) => Some(label.clone()),
        },
        limit: query.limit,
        inline: query.inline,
    })
}

/// Copy `name`/`path` across so both are resolvable. A property missing
/// both stays as-is and later renders the unresolvable sentinel.
fn normalize(mut property: Property) -> Property {
    match (&property.name, &property.path) {
        (None, Some(path)) => property.name = Some(path.clone()),
        (Some(name), None) => property.path = Some(name.clone()),
        _ => {}
    }
    property
}

fn expand_property(spec: &PropertySpec) -> Property {
    match spec {
        PropertySpec::Path(path) => normalize(Property::from_path(path.clone())),
        PropertySpec::Labeled(name, path) => Property::labeled(name.clone(), path.clone()),
        PropertySpec::Full(property) => normalize(property.clone()),
    }
}

fn expand_filter(spec: &FilterSpec) -> Filter {
    match spec {
        // A bare path means "attribute is not null"
        FilterSpec::Path(path) => Filter {
            property: normalize(Property::from_path(path.clone())),
            eq: Some(Value::Null),
            negate: true,
            ..Filter::default()
        },
        FilterSpec::Labeled(name, path) => Filter {
            property: Property::labeled(name.clone(), path.clone()),
            eq: Some(Value::Null),
            negate: true,
            ..Filter::default()
        },
        FilterSpec::Full(filter) => Filter {
            property: normalize(filter.property.clone()),
            ..filter.clone()
        },
    }
}

fn expand_aggregate(spec: &AggregateSpec) -> Aggregate {
    match spec {
        // Bare paths and pairs are grouping keys
        AggregateSpec::Path(path) => Aggregate::new(
            normalize(Property::from_path(path.clone())),
            AggregateFunction::Collect,
        ),
        AggregateSpec::Labeled(name, path) => Aggregate::new(
            Property::labeled(name.clone(), path.clone()),
            AggregateFunction::Collect,
        ),
        AggregateSpec::Full(aggregate) => Aggregate {
            property: normalize(aggregate.property.clone()),
            aggregate: aggregate.aggregate,
        },
    }
}

fn expand_sort(spec: &SortSpec) -> Sort {
    match spec {
        SortSpec::Path(path) => Sort {
            property: normalize(Property::from_path(path.clone())),
            direction: SortDirection::Desc,
        },
        SortSpec::Labeled(name, path) => Sort {
            property: Property::labeled(name.clone(), path.clone()),
            direction: SortDirection::Desc,
        },
        SortSpec::Full(sort) => Sort {
            property: normalize(sort.property.clone()),
            direction: sort.direction,
        },
    }
}

fn expand_remove(spec: &RemoveSpec, collection: &Collection) -> Remove {
    match spec {
        RemoveSpec::PrimaryKey => Remove {
            property: normalize(Property::from_path(PRIMARY_KEY)),
            collection: collection.clone(),
        },
        RemoveSpec::Directive(RemoveDirective {
            property,
            collection: target,
        }) => Remove {
            property: normalize(property.clone()),
            collection: target.clone().unwrap_or_else(|| collection.clone()),
        },
    }
}

fn expand_subquery(subquery: &Subquery) -> QueryResult<StrictSubquery> {
    let default_document = subquery.document.as_deref().unwrap_or(DEFAULT_DOCUMENT);
    let mut strict = expand_level(&subquery.query, default_document)?;
    // Unnamed subqueries are correlated iterations without their own
    // terminal clause
    if subquery.name.is_none() {
        strict.inline = true;
    }
    Ok(StrictSubquery {
        query: strict,
        name: subquery.name.clone(),
        function: subquery.function.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Scope;
    use serde_json::json;

    fn expand_default(query: &Query) -> QueryResult<StrictQuery> {
        expand(query, &AssembleOptions::default())
    }

    // =========================================================================
    // Defaulting
    // =========================================================================

    #[test]
    fn test_document_and_count_defaults() {
        let query = Query::new("responses");
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.document, "doc");
        assert_eq!(strict.count, Some("length".to_string()));
    }

    #[test]
    fn test_options_document_override() {
        let query = Query::new("responses");
        let options = AssembleOptions {
            document: Some("resp".to_string()),
            ..AssembleOptions::default()
        };
        let strict = expand(&query, &options).unwrap();

        assert_eq!(strict.document, "resp");
    }

    #[test]
    fn test_explicit_document_wins_over_options() {
        let mut query = Query::new("responses");
        query.document = Some("r".to_string());
        let options = AssembleOptions {
            document: Some("resp".to_string()),
            ..AssembleOptions::default()
        };
        let strict = expand(&query, &options).unwrap();

        assert_eq!(strict.document, "r");
    }

    #[test]
    fn test_count_false_expands_to_none() {
        let mut query = Query::new("responses");
        query.count = Count::Disabled;
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.count, None);
    }

    // =========================================================================
    // Per-list shorthand rules
    // =========================================================================

    #[test]
    fn test_bare_filter_means_not_null() {
        let mut query = Query::new("responses");
        query.filters.push("url.domain".into());
        let strict = expand_default(&query).unwrap();

        let filter = &strict.filters[0];
        assert_eq!(filter.eq, Some(Value::Null));
        assert!(filter.negate);
        assert_eq!(filter.property.path.as_deref(), Some("url.domain"));
        assert_eq!(filter.property.name.as_deref(), Some("url.domain"));
    }

    #[test]
    fn test_pair_filter_keeps_label() {
        let mut query = Query::new("responses");
        query.filters.push(("domain", "url.domain").into());
        let strict = expand_default(&query).unwrap();

        let filter = &strict.filters[0];
        assert_eq!(filter.property.name.as_deref(), Some("domain"));
        assert_eq!(filter.property.path.as_deref(), Some("url.domain"));
        assert!(filter.negate);
    }

    #[test]
    fn test_bare_aggregate_is_collect() {
        let mut query = Query::new("responses");
        query.aggregates.push("status".into());
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.aggregates[0].aggregate, AggregateFunction::Collect);
    }

    #[test]
    fn test_bare_sort_is_descending() {
        let mut query = Query::new("responses");
        query.sorts = Sorts::Fields(vec!["total".into()]);
        let strict = expand_default(&query).unwrap();

        match &strict.sorts {
            Sorts::Fields(sorts) => assert_eq!(sorts[0].direction, SortDirection::Desc),
            other => panic!("expected sort fields, got {other:?}"),
        }
    }

    #[test]
    fn test_null_sort_sentinel_survives() {
        let mut query = Query::new("responses");
        query.sorts = Sorts::Null;
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.sorts, Sorts::Null);
    }

    #[test]
    fn test_remove_shorthand_targets_primary_key() {
        let mut query = Query::new("responses");
        query.remove.push(RemoveSpec::PrimaryKey);
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.removes[0].property.path.as_deref(), Some("_key"));
        assert_eq!(strict.removes[0].collection.name(), "responses");
    }

    #[test]
    fn test_remove_directive_defaults_collection() {
        let mut query = Query::new("responses");
        query.remove.push(RemoveSpec::Directive(RemoveDirective {
            property: Property::from_path("_id"),
            collection: None,
        }));
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.removes[0].collection.name(), "responses");
    }

    // =========================================================================
    // Conflict and idempotence
    // =========================================================================

    #[test]
    fn test_return_remove_conflict() {
        let mut query = Query::new("responses");
        query.returns.push("status".into());
        query.remove.push(RemoveSpec::PrimaryKey);

        assert_eq!(
            expand_default(&query),
            Err(QueryError::ReturnRemoveConflict)
        );
    }

    #[test]
    fn test_nested_conflict_propagates() {
        let mut inner = Query::new("responses");
        inner.returns.push("status".into());
        inner.remove.push(RemoveSpec::PrimaryKey);

        let mut query = Query::new("pages");
        query.subqueries.push(Subquery::inline(inner));

        assert_eq!(
            expand_default(&query),
            Err(QueryError::ReturnRemoveConflict)
        );
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let query: Query = serde_json::from_value(json!({
            "collection": "responses",
            "filters": ["url.domain", { "path": "status", "eq": 200 }],
            "aggregates": ["status", { "path": "size", "type": "number", "aggregate": "sum" }],
            "sorts": ["total"],
            "count": "total",
            "limit": 10,
        }))
        .unwrap();

        let strict = expand_default(&query).unwrap();
        let again = expand_default(&Query::from(strict.clone())).unwrap();

        assert_eq!(strict, again);
    }

    // =========================================================================
    // Subqueries
    // =========================================================================

    #[test]
    fn test_unnamed_subquery_forced_inline() {
        let mut query = Query::new("pages");
        query
            .subqueries
            .push(Subquery::inline(Query::new("responses")));
        let strict = expand_default(&query).unwrap();

        assert!(strict.subqueries[0].query.inline);
    }

    #[test]
    fn test_subquery_document_override() {
        let mut query = Query::new("pages");
        query.subqueries.push(
            Subquery::assigned("total", Query::new("responses"))
                .with_document("r")
                .with_function("count"),
        );
        let strict = expand_default(&query).unwrap();

        let sub = &strict.subqueries[0];
        assert_eq!(sub.query.document, "r");
        assert!(!sub.query.inline);
        assert_eq!(sub.function.as_deref(), Some("count"));
    }

    #[test]
    fn test_expansion_does_not_touch_input() {
        let mut query = Query::new("responses");
        query.filters.push("url.domain".into());
        let before = query.clone();

        expand_default(&query).unwrap();

        assert_eq!(query, before);
        assert!(matches!(query.filters[0], FilterSpec::Path(_)));
    }

    #[test]
    fn test_unscoped_filter_scope_preserved() {
        let mut query = Query::new("responses");
        query
            .filters
            .push(Filter::one_of("status", json!([200, 404])).post_aggregation().into());
        let strict = expand_default(&query).unwrap();

        assert_eq!(strict.filters[0].property.document, Scope::Unscoped);
    }
}
