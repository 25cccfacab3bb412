//! Fluent construction of query descriptions.
//!
//! [`QueryBuilder`] is a thin mutation-oriented facade over a [`Query`]
//! accumulator; all rendering is delegated to the expander and
//! assembler, so a query built fluently is byte-identical to the same
//! query supplied as a shorthand or strict description.

use crate::error::QueryResult;
use crate::ir::{
    Aggregate, AggregateFunction, AggregateSpec, Collection, Count, FilterSpec, Property,
    PropertySpec, Query, RemoveDirective, RemoveSpec, SortSpec, Sorts, Subquery,
};
use crate::render::{AssembleOptions, RenderedQuery};

/// Chainable builder over a query description.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
    options: AssembleOptions,
}

impl QueryBuilder {
    pub fn new(collection: impl Into<Collection>) -> Self {
        Self {
            query: Query::new(collection),
            options: AssembleOptions::default(),
        }
    }

    /// Replace the assembly options (strict mode, function registry,
    /// default document).
    pub fn with_options(mut self, options: AssembleOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the iteration variable.
    pub fn document(mut self, document: impl Into<String>) -> Self {
        self.query.document = Some(document.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.query.comment = Some(comment.into());
        self
    }

    /// Add a filter; accepts a bare path, a `(name, path)` pair, or a
    /// full [`crate::Filter`].
    pub fn filter_by(mut self, filter: impl Into<FilterSpec>) -> Self {
        self.query.filters.push(filter.into());
        self
    }

    /// Add a grouping key.
    pub fn group_by(mut self, key: impl Into<AggregateSpec>) -> Self {
        self.query.aggregates.push(key.into());
        self
    }

    /// Alias for [`Self::group_by`].
    pub fn collect(self, key: impl Into<AggregateSpec>) -> Self {
        self.group_by(key)
    }

    /// Add a scalar reduction over a property.
    pub fn aggregate(
        mut self,
        property: impl Into<PropertySpec>,
        function: AggregateFunction,
    ) -> Self {
        let property = Property::from(property.into());
        self.query
            .aggregates
            .push(AggregateSpec::Full(Aggregate::new(property, function)));
        self
    }

    /// Add a sort key; a bare path sorts descending.
    pub fn sort_by(mut self, sort: impl Into<SortSpec>) -> Self {
        match &mut self.query.sorts {
            Sorts::Fields(sorts) => sorts.push(sort.into()),
            _ => self.query.sorts = Sorts::Fields(vec![sort.into()]),
        }
        self
    }

    /// Emit an explicit `SORT null` clause, disabling default ordering.
    pub fn unsorted(mut self) -> Self {
        self.query.sorts = Sorts::Null;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Label the generated group count.
    pub fn count(mut self, label: impl Into<String>) -> Self {
        self.query.count = Count::Label(label.into());
        self
    }

    /// Suppress the generated group count.
    pub fn without_count(mut self) -> Self {
        self.query.count = Count::Disabled;
        self
    }

    /// Add a return property. Mutually exclusive with the remove
    /// directives; the conflict surfaces on [`Self::build`].
    pub fn returning(mut self, property: impl Into<PropertySpec>) -> Self {
        self.query.returns.push(property.into());
        self
    }

    /// Remove matched documents by primary key instead of returning
    /// them.
    pub fn remove(mut self) -> Self {
        self.query.remove.push(RemoveSpec::PrimaryKey);
        self
    }

    /// Remove through an explicit directive.
    pub fn remove_where(mut self, directive: RemoveDirective) -> Self {
        self.query.remove.push(RemoveSpec::Directive(directive));
        self
    }

    /// Attach a subquery; a plain [`Query`] converts to an inline
    /// correlated subquery.
    pub fn subquery(mut self, subquery: impl Into<Subquery>) -> Self {
        self.query.subqueries.push(subquery.into());
        self
    }

    /// Attach a subquery assigned to a named variable
    /// (`LET name = (...)`).
    pub fn let_subquery(mut self, name: impl Into<String>, query: Query) -> Self {
        self.query.subqueries.push(Subquery::assigned(name, query));
        self
    }

    /// Mark this query as a subquery body (no terminal clause).
    pub fn inline(mut self) -> Self {
        self.query.inline = true;
        self
    }

    /// The accumulated description, for embedding as a subquery.
    pub fn into_query(self) -> Query {
        self.query
    }

    /// Expand and assemble the accumulated description.
    pub fn build(self) -> QueryResult<RenderedQuery> {
        crate::assemble_with(&self.query, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Filter;
    use crate::{assemble, assemble_strict, expand};
    use serde_json::json;

    /// The reference query: filter `responses` by domain, group by
    /// status and mime, count into `total`, post-filter on status, sort
    /// by the count.
    fn fluent() -> QueryResult<RenderedQuery> {
        QueryBuilder::new("responses")
            .filter_by(Filter::one_of("url.domain", json!(["example.com", "test.com"])))
            .group_by("status")
            .group_by("mime")
            .count("total")
            .filter_by(Filter::one_of("status", json!([200, 404])).post_aggregation())
            .sort_by("total")
            .build()
    }

    fn shorthand() -> Query {
        serde_json::from_value(json!({
            "collection": "responses",
            "filters": [
                { "path": "url.domain", "in": ["example.com", "test.com"] },
                { "path": "status", "in": [200, 404], "document": false },
            ],
            "aggregates": ["status", "mime"],
            "count": "total",
            "sorts": ["total"],
        }))
        .unwrap()
    }

    // =========================================================================
    // Equivalence of construction forms
    // =========================================================================

    #[test]
    fn test_three_forms_render_identically() {
        let options = AssembleOptions::default();

        let from_builder = fluent().unwrap();
        let from_shorthand = assemble(&shorthand()).unwrap();
        let strict = expand(&shorthand(), &options).unwrap();
        let from_strict = assemble_strict(&strict, &options).unwrap();

        assert_eq!(from_builder.aql, from_shorthand.aql);
        assert_eq!(from_builder.params, from_shorthand.params);
        assert_eq!(from_builder.aql, from_strict.aql);
        assert_eq!(from_builder.params, from_strict.params);
    }

    #[test]
    fn test_reference_query_text() {
        let rendered = fluent().unwrap();

        assert_eq!(
            rendered.aql,
            "FOR doc IN responses\n\
             FILTER doc.url.domain IN @value0\n\
             COLLECT status = doc.status,\n\
             \x20\x20mime = doc.mime\n\
             WITH COUNT INTO total\n\
             FILTER status IN @value1\n\
             SORT total DESC\n\
             RETURN { status: status, mime: mime, total: total }"
        );
        assert_eq!(
            rendered.params.get("value0"),
            Some(&json!(["example.com", "test.com"]))
        );
        assert_eq!(rendered.params.get("value1"), Some(&json!([200, 404])));
    }

    // =========================================================================
    // Builder surface
    // =========================================================================

    #[test]
    fn test_document_and_comment() {
        let rendered = QueryBuilder::new("responses")
            .document("r")
            .comment("latest crawl")
            .build()
            .unwrap();

        assert_eq!(rendered.aql, "// latest crawl\nFOR r IN responses\nRETURN r");
    }

    #[test]
    fn test_aggregate_method() {
        use crate::ir::PropertyType;

        let rendered = QueryBuilder::new("responses")
            .group_by("status")
            .aggregate(
                PropertySpec::Full(Property::labeled("bytes", "size").typed(PropertyType::Number)),
                AggregateFunction::Sum,
            )
            .without_count()
            .build()
            .unwrap();

        assert!(rendered.aql.contains("AGGREGATE bytes = SUM(doc.size)"));
    }

    #[test]
    fn test_unsorted_and_limit() {
        let rendered = QueryBuilder::new("responses")
            .unsorted()
            .limit(5)
            .build()
            .unwrap();

        assert_eq!(
            rendered.aql,
            "FOR doc IN responses\nSORT null\nLIMIT @value0\nRETURN doc"
        );
    }

    #[test]
    fn test_remove_builder() {
        let rendered = QueryBuilder::new("responses")
            .filter_by(Filter::equals("status", 404))
            .remove()
            .build()
            .unwrap();

        assert!(rendered.aql.ends_with("REMOVE doc._key IN responses"));
    }

    #[test]
    fn test_subquery_embedding() {
        let inner = QueryBuilder::new("responses")
            .document("r")
            .filter_by(Filter::equals("page", "doc._id").dynamic_operand())
            .into_query();

        let rendered = QueryBuilder::new("pages")
            .subquery(inner)
            .build()
            .unwrap();

        assert!(rendered.aql.contains("  FOR r IN responses"));
        assert!(rendered.aql.contains("  FILTER r.page == doc._id"));
    }

    #[test]
    fn test_let_subquery_assignment() {
        let inner = QueryBuilder::new("responses")
            .document("r")
            .filter_by(Filter::equals("page", "doc._id").dynamic_operand())
            .into_query();

        let rendered = QueryBuilder::new("pages")
            .let_subquery("related", inner)
            .build()
            .unwrap();

        assert!(rendered.aql.contains("LET related = ("));
        assert!(rendered.aql.contains("  FOR r IN responses"));
        assert!(rendered.aql.contains("  RETURN r"));
    }

    #[test]
    fn test_conflict_surfaces_on_build() {
        let result = QueryBuilder::new("responses")
            .returning("status")
            .remove()
            .build();

        assert!(result.is_err());
    }
}
