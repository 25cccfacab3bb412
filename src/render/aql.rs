//! AQL query assembler.
//!
//! Walks a [`StrictQuery`] and emits clauses in the order AQL requires:
//! comment, iteration, subqueries, pre-aggregation filters, collect /
//! aggregate block, post-aggregation filters, sort, limit, terminal
//! return or remove. Subqueries recurse at `depth + 1` and share one
//! bind-parameter map, so placeholders are numbered in first-use order
//! across the whole query.

use crate::error::QueryResult;
use crate::ir::{Aggregate, AggregateFunction, Filter, Scope, Sorts, StrictQuery};
use crate::render::path::{render_aggregate_path, render_label, render_path, PathContext};
use crate::render::{AssembleOptions, RenderedQuery};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

/// One-shot assembler carrying the shared bind map.
pub(crate) struct AqlAssembler<'a> {
    options: &'a AssembleOptions,
    params: HashMap<String, Value>,
}

impl<'a> AqlAssembler<'a> {
    pub fn new(options: &'a AssembleOptions) -> Self {
        Self {
            options,
            params: HashMap::new(),
        }
    }

    pub fn render(mut self, query: &StrictQuery) -> QueryResult<RenderedQuery> {
        let aql = self.assemble(query, 0)?;
        debug!(params = self.params.len(), "assembled AQL query");
        Ok(RenderedQuery {
            aql,
            params: self.params,
        })
    }

    fn ctx(&self) -> PathContext<'_> {
        PathContext {
            functions: &self.options.functions,
            strict: self.options.strict,
        }
    }

    /// Bind a literal value, returning its `@valueN` placeholder.
    fn bind(&mut self, value: Value) -> String {
        let name = format!("value{}", self.params.len());
        let placeholder = format!("@{name}");
        self.params.insert(name, value);
        placeholder
    }

    /// Comparison operand: a fresh placeholder, or the raw variable
    /// reference for dynamic filters.
    fn operand(&mut self, value: &Value, dynamic: bool) -> String {
        if dynamic {
            match value {
                Value::String(reference) => reference.clone(),
                other => other.to_string(),
            }
        } else {
            self.bind(value.clone())
        }
    }

    fn assemble(&mut self, query: &StrictQuery, depth: usize) -> QueryResult<String> {
        trace!(
            collection = query.collection.name(),
            depth,
            "assembling query level"
        );

        let indent = "  ".repeat(depth);
        let mut lines: Vec<String> = Vec::new();

        if let Some(comment) = &query.comment {
            lines.push(format!("{indent}// {comment}"));
        }
        lines.push(format!(
            "{indent}FOR {} IN {}",
            query.document,
            query.collection.name()
        ));

        let document = Some(query.document.as_str());
        let grouping = !query.aggregates.is_empty();

        // Once COLLECT resets local bindings, ungrouped return properties
        // would be unreachable; they survive as grouping keys instead and
        // the return list is cleared.
        let mut aggregates: Vec<Aggregate> = query.aggregates.clone();
        if grouping {
            for property in &query.returns {
                if property.document == Scope::Unscoped {
                    continue;
                }
                aggregates.push(Aggregate::new(
                    property.clone(),
                    AggregateFunction::Collect,
                ));
            }
        }

        let mut collected: Vec<(String, String)> = Vec::new();
        let mut aggregated: Vec<(String, String)> = Vec::new();
        for aggregate in &aggregates {
            let label = render_label(&aggregate.property);
            let value = render_aggregate_path(aggregate, document, &self.ctx())?;
            if aggregate.aggregate == AggregateFunction::Collect {
                upsert(&mut collected, label, value);
            } else {
                upsert(&mut aggregated, label, value);
            }
        }

        // Inline subqueries come before the filters so their bindings are
        // visible to correlated conditions below
        for subquery in &query.subqueries {
            if subquery.name.is_none() {
                lines.push(self.assemble(&subquery.query, depth + 1)?);
            }
        }
        for subquery in &query.subqueries {
            let Some(name) = subquery.name.as_deref() else {
                continue;
            };
            let body = self.assemble(&subquery.query, depth + 1)?;
            match &subquery.function {
                Some(function) => {
                    lines.push(format!("{indent}LET {name} = {}(", function.to_uppercase()));
                }
                None => lines.push(format!("{indent}LET {name} = (")),
            }
            lines.push(body);
            lines.push(format!("{indent})"));
        }

        // Pre-aggregation filters, still scoped to the iteration variable
        for filter in &query.filters {
            if filter.property.document != Scope::Unscoped {
                self.filter_clauses(filter, document, &indent, &mut lines)?;
            }
        }

        let mut group_names: Vec<String> = collected.iter().map(|(label, _)| label.clone()).collect();
        if !collected.is_empty() || !aggregated.is_empty() {
            if collected.is_empty() {
                lines.push(format!("{indent}COLLECT"));
            } else {
                lines.extend(assignment_block(&indent, "COLLECT", &collected));
            }
            if !aggregated.is_empty() {
                let mut reductions = aggregated;
                if let Some(label) = &query.count {
                    upsert(&mut reductions, label.clone(), "COUNT(1)".to_string());
                }
                lines.extend(assignment_block(&indent, "AGGREGATE", &reductions));
                group_names.extend(reductions.into_iter().map(|(label, _)| label));
            } else if let Some(label) = &query.count {
                lines.push(format!("{indent}WITH COUNT INTO {label}"));
                group_names.push(label.clone());
            }
        }

        // Post-aggregation filters reference grouped output names
        for filter in &query.filters {
            if filter.property.document == Scope::Unscoped {
                self.filter_clauses(filter, None, &indent, &mut lines)?;
            }
        }

        match &query.sorts {
            Sorts::Default => {}
            Sorts::Null => lines.push(format!("{indent}SORT null")),
            Sorts::Fields(sorts) => {
                // Grouped queries sort on output names, not the iteration
                // variable, unless a sort overrides its scope
                let ambient = if grouping { None } else { document };
                for sort in sorts {
                    let path = render_path(&sort.property, ambient, &self.ctx(), false)?;
                    lines.push(format!("{indent}SORT {path} {}", sort.direction.keyword()));
                }
            }
        }

        if let Some(limit) = query.limit {
            if limit > 0 {
                let placeholder = self.bind(Value::from(limit));
                lines.push(format!("{indent}LIMIT {placeholder}"));
            }
        }

        if !query.inline {
            if query.removes.is_empty() {
                lines.push(self.return_clause(query, grouping, group_names, &indent)?);
            } else {
                for remove in &query.removes {
                    let key = render_path(&remove.property, document, &self.ctx(), false)?;
                    lines.push(format!(
                        "{indent}REMOVE {key} IN {}",
                        remove.collection.name()
                    ));
                }
            }
        }

        Ok(lines.join("\n"))
    }

    fn return_clause(
        &mut self,
        query: &StrictQuery,
        grouping: bool,
        group_names: Vec<String>,
        indent: &str,
    ) -> QueryResult<String> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        if grouping {
            // Inside the grouping scope, label and value are identical
            for name in group_names {
                pairs.push((name.clone(), name));
            }
        } else {
            for property in &query.returns {
                let value = render_path(property, Some(&query.document), &self.ctx(), false)?;
                pairs.push((render_label(property), value));
            }
        }

        let clause = match pairs.len() {
            0 => format!("{indent}RETURN {}", query.document),
            1 => format!("{indent}RETURN {}", pairs[0].1),
            _ => {
                let fields = pairs
                    .iter()
                    .map(|(label, value)| format!("{label}: {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{indent}RETURN {{ {fields} }}")
            }
        };
        Ok(clause)
    }

    /// One `FILTER` clause per comparison key, in fixed
    /// `eq, lt, gt, in, contains` order.
    fn filter_clauses(
        &mut self,
        filter: &Filter,
        ambient: Option<&str>,
        indent: &str,
        lines: &mut Vec<String>,
    ) -> QueryResult<()> {
        let path = render_path(&filter.property, ambient, &self.ctx(), false)?;

        let comparisons = [
            ("==", "!=", &filter.eq),
            ("<", ">=", &filter.lt),
            (">", "<=", &filter.gt),
            ("IN", "NOT IN", &filter.r#in),
        ];
        for (op, negated, value) in comparisons {
            if let Some(value) = value {
                let operand = self.operand(value, filter.dynamic);
                let op = if filter.negate { negated } else { op };
                lines.push(format!("{indent}FILTER {path} {op} {operand}"));
            }
        }
        if let Some(value) = &filter.contains {
            let operand = self.operand(value, filter.dynamic);
            let not = if filter.negate { "NOT " } else { "" };
            lines.push(format!("{indent}FILTER {not}CONTAINS({path}, {operand})"));
        }
        Ok(())
    }
}

/// Insert-or-update keyed by label, preserving first-insertion order.
fn upsert(pairs: &mut Vec<(String, String)>, label: String, value: String) {
    if let Some(pair) = pairs.iter_mut().find(|(existing, _)| *existing == label) {
        pair.1 = value;
    } else {
        pairs.push((label, value));
    }
}

/// Multi-line `COLLECT` / `AGGREGATE` block: one assignment per line,
/// continuations indented one extra level.
fn assignment_block(indent: &str, keyword: &str, pairs: &[(String, String)]) -> Vec<String> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let lead = if i == 0 {
                format!("{indent}{keyword} ")
            } else {
                format!("{indent}  ")
            };
            let comma = if i + 1 < pairs.len() { "," } else { "" };
            format!("{lead}{label} = {value}{comma}")
        })
        .collect()
}
