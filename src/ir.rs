//! Query description data model.
//!
//! Two parallel shapes exist: the loosely-typed [`Query`], which accepts
//! shorthand entries (bare strings, `(name, path)` pairs, partial objects),
//! and the fully-typed [`StrictQuery`] that the assembler consumes. The
//! expander in [`crate::expand`] converts the former into the latter.

use serde::de::{self, IntoDeserializer, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Value type of a document attribute, used to disambiguate
/// aggregate-function rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

/// Document scope a property is read from.
///
/// JSON shape: absent (`Ambient`), `false` (`Unscoped`, no prefix at all),
/// or a variable name (`Doc`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Inherit the surrounding iteration variable
    #[default]
    Ambient,
    /// No scope prefix at all (`document: false`)
    Unscoped,
    /// An explicit iteration variable
    Doc(String),
}

impl Scope {
    pub fn is_ambient(&self) -> bool {
        matches!(self, Scope::Ambient)
    }
}

/// Reference to a single document attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Property {
    /// Display label; sanitized on render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Dotted access expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Scope::is_ambient")]
    pub document: Scope,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<PropertyType>,
    /// Scalar function wrap, validated against the function registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Property {
    /// Property addressed by path only; the expander copies the path
    /// across as the label.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Property with an explicit label and path.
    pub fn labeled(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Drop the scope prefix entirely (`document: false`).
    pub fn unscoped(mut self) -> Self {
        self.document = Scope::Unscoped;
        self
    }

    /// Read from an explicit iteration variable.
    pub fn scoped(mut self, document: impl Into<String>) -> Self {
        self.document = Scope::Doc(document.into());
        self
    }

    pub fn typed(mut self, value_type: PropertyType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Wrap the rendered path in a scalar function call.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

/// A filter condition on a property.
///
/// Any subset of the comparison operands may be set; each renders an
/// independent `FILTER` clause (implicitly ANDed).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(flatten)]
    pub property: Property,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#in: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<Value>,
    /// Invert the comparison operator
    #[serde(default, skip_serializing_if = "is_false")]
    pub negate: bool,
    /// Treat the operand as a raw variable reference instead of a bound
    /// literal
    #[serde(default, skip_serializing_if = "is_false")]
    pub dynamic: bool,
}

impl Filter {
    /// The bare-string filter shorthand: "attribute is not null".
    pub fn not_null(path: impl Into<String>) -> Self {
        Self {
            property: Property::from_path(path),
            eq: Some(Value::Null),
            negate: true,
            ..Self::default()
        }
    }

    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            property: Property::from_path(path),
            eq: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn one_of(path: impl Into<String>, values: impl Into<Value>) -> Self {
        Self {
            property: Property::from_path(path),
            r#in: Some(values.into()),
            ..Self::default()
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Mark the operand as a reference to another query variable.
    pub fn dynamic_operand(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Scope the filter past the grouping boundary (`document: false`).
    pub fn post_aggregation(mut self) -> Self {
        self.property.document = Scope::Unscoped;
        self
    }
}

/// Reduction applied by an [`Aggregate`].
///
/// `Collect` is a grouping key, not a reduction; every other value
/// produces a scalar aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Collect,
    Distinct,
    Empty,
    NonEmpty,
    Min,
    Max,
    Avg,
    Sum,
}

impl AggregateFunction {
    /// Numeric reductions redirect non-numeric properties through
    /// `LENGTH(...)`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Min | Self::Max | Self::Avg | Self::Sum)
    }
}

/// A grouping key or scalar reduction over a property.
///
/// The reduction accepts two JSON spellings, `aggregate` and
/// `function`; when an `aggregate` key is present, `function` keeps its
/// scalar-wrap meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    #[serde(flatten)]
    pub property: Property,
    pub aggregate: AggregateFunction,
}

impl Aggregate {
    pub fn new(property: Property, aggregate: AggregateFunction) -> Self {
        Self {
            property,
            aggregate,
        }
    }

    /// Grouping key over a path (the shorthand expansion).
    pub fn collect(path: impl Into<String>) -> Self {
        Self::new(Property::from_path(path), AggregateFunction::Collect)
    }
}

/// Sort direction; shorthand sorts default to descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(flatten)]
    pub property: Property,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    pub fn desc(path: impl Into<String>) -> Self {
        Self {
            property: Property::from_path(path),
            direction: SortDirection::Desc,
        }
    }

    pub fn asc(path: impl Into<String>) -> Self {
        Self {
            property: Property::from_path(path),
            direction: SortDirection::Asc,
        }
    }
}

/// Target collection of a query: a literal name or an opaque handle to
/// an existing collection. Both render into the `FOR ... IN` slot
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Collection {
    Name(String),
    Handle(CollectionHandle),
}

/// Opaque handle to an existing collection, as produced by a database
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHandle {
    pub name: String,
}

impl Collection {
    pub fn is_handle(&self) -> bool {
        matches!(self, Self::Handle(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Handle(handle) => &handle.name,
        }
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::Name(String::new())
    }
}

impl From<&str> for Collection {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Collection {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<CollectionHandle> for Collection {
    fn from(handle: CollectionHandle) -> Self {
        Self::Handle(handle)
    }
}

/// A nested query, either assigned to a variable (`name`) or rendered
/// inline as a correlated iteration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subquery {
    pub query: Box<Query>,
    /// Variable the subquery result is assigned to; `None` renders the
    /// body inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Overrides the nested call's default iteration variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// Scalar function wrapping the assigned result, e.g. `count`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Subquery {
    /// Correlated inline subquery.
    pub fn inline(query: Query) -> Self {
        Self {
            query: Box::new(query),
            ..Self::default()
        }
    }

    /// Subquery assigned to a named variable.
    pub fn assigned(name: impl Into<String>, query: Query) -> Self {
        Self {
            query: Box::new(query),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Wrap the assigned result in a scalar function call.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

impl From<Query> for Subquery {
    fn from(query: Query) -> Self {
        Self::inline(query)
    }
}

// ============================================================================
// Shorthand spec enums
// ============================================================================

/// Shorthand for a return property: a bare path, a `(name, path)` pair,
/// or the full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertySpec {
    Path(String),
    Labeled(String, String),
    Full(Property),
}

/// Shorthand for a filter: a bare path ("attribute is not null"), a
/// `(name, path)` pair, or the full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    Path(String),
    Labeled(String, String),
    Full(Filter),
}

/// Shorthand for an aggregate: bare paths and pairs become `collect`
/// grouping keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateSpec {
    Path(String),
    Labeled(String, String),
    Full(Aggregate),
}

/// Shorthand for a sort key: a bare path sorts descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortSpec {
    Path(String),
    Labeled(String, String),
    Full(Sort),
}

macro_rules! spec_conversions {
    ($spec:ident, $full:ty) => {
        impl From<&str> for $spec {
            fn from(path: &str) -> Self {
                Self::Path(path.to_string())
            }
        }

        impl From<String> for $spec {
            fn from(path: String) -> Self {
                Self::Path(path)
            }
        }

        impl From<(&str, &str)> for $spec {
            fn from((name, path): (&str, &str)) -> Self {
                Self::Labeled(name.to_string(), path.to_string())
            }
        }

        impl From<$full> for $spec {
            fn from(full: $full) -> Self {
                Self::Full(full)
            }
        }
    };
}

spec_conversions!(PropertySpec, Property);

impl From<PropertySpec> for Property {
    fn from(spec: PropertySpec) -> Self {
        match spec {
            PropertySpec::Path(path) => Property::from_path(path),
            PropertySpec::Labeled(name, path) => Property::labeled(name, path),
            PropertySpec::Full(property) => property,
        }
    }
}
spec_conversions!(FilterSpec, Filter);
spec_conversions!(AggregateSpec, Aggregate);
spec_conversions!(SortSpec, Sort);

/// Sort state of a query.
///
/// `Null` is an explicit sentinel (JSON `null`) that renders a single
/// `SORT null` clause disabling default ordering; it is distinct from
/// `Default`/empty, which emit no sort clause at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Sorts<T> {
    Default,
    Null,
    Fields(Vec<T>),
}

impl<T> Default for Sorts<T> {
    fn default() -> Self {
        Self::Default
    }
}

impl<T> Sorts<T> {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl<T, S: Into<T>> FromIterator<S> for Sorts<T> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Fields(iter.into_iter().map(Into::into).collect())
    }
}

/// Group-count state of a query.
///
/// JSON shape: absent (default label), `false` (suppressed), or an
/// explicit label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Count {
    #[default]
    Default,
    Disabled,
    Label(String),
}

impl Count {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

/// A remove directive, shorthand (`true`, keyed on the primary key
/// attribute) or explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveSpec {
    PrimaryKey,
    Directive(RemoveDirective),
}

/// Explicit remove directive; the collection defaults to the query's
/// own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoveDirective {
    #[serde(flatten)]
    pub property: Property,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
}

// ============================================================================
// Query roots
// ============================================================================

/// The loosely-typed query description accepted from callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub collection: Collection,
    /// Iteration variable; defaults during expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aggregates: Vec<AggregateSpec>,
    #[serde(skip_serializing_if = "Sorts::is_default")]
    pub sorts: Sorts<SortSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subqueries: Vec<Subquery>,
    #[serde(rename = "return", skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<PropertySpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<RemoveSpec>,
    #[serde(skip_serializing_if = "Count::is_default")]
    pub count: Count,
    /// Row cap; JSON `false` (or absence) means unlimited
    #[serde(deserialize_with = "de_limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Marks this query as a subquery body: suppresses its terminal
    /// output clause
    #[serde(skip_serializing_if = "is_false")]
    pub inline: bool,
}

impl Query {
    pub fn new(collection: impl Into<Collection>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }
}

/// The fully-expanded query shape the assembler consumes. Produced by
/// [`crate::expand`]; every shorthand entry is in its full typed form
/// and `document`/`count` are defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrictQuery {
    pub collection: Collection,
    pub document: String,
    pub comment: Option<String>,
    pub filters: Vec<Filter>,
    pub aggregates: Vec<Aggregate>,
    pub sorts: Sorts<Sort>,
    pub subqueries: Vec<StrictSubquery>,
    pub returns: Vec<Property>,
    pub removes: Vec<Remove>,
    /// Label for the generated group count; `None` suppresses it
    pub count: Option<String>,
    pub limit: Option<u64>,
    pub inline: bool,
}

/// Expanded subquery: the body is strict, and inline bodies already
/// carry `inline: true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrictSubquery {
    pub query: StrictQuery,
    pub name: Option<String>,
    pub function: Option<String>,
}

/// Expanded remove directive with a resolved target collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Remove {
    pub property: Property,
    pub collection: Collection,
}

impl From<StrictQuery> for Query {
    fn from(strict: StrictQuery) -> Self {
        Self {
            collection: strict.collection,
            document: Some(strict.document),
            comment: strict.comment,
            filters: strict.filters.into_iter().map(FilterSpec::Full).collect(),
            aggregates: strict
                .aggregates
                .into_iter()
                .map(AggregateSpec::Full)
                .collect(),
            sorts: match strict.sorts {
                Sorts::Default => Sorts::Default,
                Sorts::Null => Sorts::Null,
                Sorts::Fields(sorts) => {
                    Sorts::Fields(sorts.into_iter().map(SortSpec::Full).collect())
                }
            },
            subqueries: strict
                .subqueries
                .into_iter()
                .map(|sub| Subquery {
                    document: Some(sub.query.document.clone()),
                    query: Box::new(Query::from(sub.query)),
                    name: sub.name,
                    function: sub.function,
                })
                .collect(),
            returns: strict
                .returns
                .into_iter()
                .map(PropertySpec::Full)
                .collect(),
            remove: strict
                .removes
                .into_iter()
                .map(|remove| {
                    RemoveSpec::Directive(RemoveDirective {
                        property: remove.property,
                        collection: Some(remove.collection),
                    })
                })
                .collect(),
            count: match strict.count {
                Some(label) => Count::Label(label),
                None => Count::Disabled,
            },
            limit: strict.limit,
            inline: strict.inline,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !flag
}

// ============================================================================
// JSON-facing serde for the tri-state fields
// ============================================================================

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ambient => serializer.serialize_unit(),
            Self::Unscoped => serializer.serialize_bool(false),
            Self::Doc(document) => serializer.serialize_str(document),
        }
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScopeVisitor;

        impl<'de> Visitor<'de> for ScopeVisitor {
            type Value = Scope;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`false` or a document variable name")
            }

            fn visit_bool<E: de::Error>(self, flag: bool) -> Result<Scope, E> {
                if flag {
                    Err(E::invalid_value(de::Unexpected::Bool(flag), &self))
                } else {
                    Ok(Scope::Unscoped)
                }
            }

            fn visit_str<E: de::Error>(self, document: &str) -> Result<Scope, E> {
                Ok(Scope::Doc(document.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Scope, E> {
                Ok(Scope::Ambient)
            }
        }

        deserializer.deserialize_any(ScopeVisitor)
    }
}

impl<T: Serialize> Serialize for Sorts<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Default | Self::Null => serializer.serialize_unit(),
            Self::Fields(sorts) => sorts.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sorts<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SortsVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for SortsVisitor<T> {
            type Value = Sorts<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`null` or a list of sort keys")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Sorts<T>, E> {
                Ok(Sorts::Null)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Sorts<T>, A::Error> {
                let mut sorts = Vec::new();
                while let Some(sort) = seq.next_element()? {
                    sorts.push(sort);
                }
                Ok(Sorts::Fields(sorts))
            }
        }

        deserializer.deserialize_any(SortsVisitor(std::marker::PhantomData))
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Default => serializer.serialize_unit(),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Label(label) => serializer.serialize_str(label),
        }
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = Count;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`false` or a count label")
            }

            fn visit_bool<E: de::Error>(self, flag: bool) -> Result<Count, E> {
                if flag {
                    Err(E::invalid_value(de::Unexpected::Bool(flag), &self))
                } else {
                    Ok(Count::Disabled)
                }
            }

            fn visit_str<E: de::Error>(self, label: &str) -> Result<Count, E> {
                Ok(Count::Label(label.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Count, E> {
                Ok(Count::Default)
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

fn de_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    struct LimitVisitor;

    impl<'de> Visitor<'de> for LimitVisitor {
        type Value = Option<u64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("`false` or a row cap")
        }

        fn visit_bool<E: de::Error>(self, flag: bool) -> Result<Option<u64>, E> {
            if flag {
                Err(E::invalid_value(de::Unexpected::Bool(flag), &self))
            } else {
                Ok(None)
            }
        }

        fn visit_u64<E: de::Error>(self, limit: u64) -> Result<Option<u64>, E> {
            Ok(Some(limit))
        }
    }

    deserializer.deserialize_any(LimitVisitor)
}

impl<'de> Deserialize<'de> for Aggregate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Shape {
            #[serde(flatten)]
            property: Property,
            #[serde(default)]
            aggregate: Option<AggregateFunction>,
        }

        let mut shape = Shape::deserialize(deserializer)?;
        let aggregate = match shape.aggregate {
            Some(aggregate) => aggregate,
            // The `function` spelling lands on the flattened property;
            // reclaim it as the reduction name
            None => match shape.property.function.take() {
                Some(function) => {
                    AggregateFunction::deserialize(function.as_str().into_deserializer())?
                }
                None => return Err(de::Error::missing_field("aggregate")),
            },
        };
        Ok(Aggregate {
            property: shape.property,
            aggregate,
        })
    }
}

impl Serialize for RemoveSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::PrimaryKey => serializer.serialize_bool(true),
            Self::Directive(directive) => directive.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RemoveSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RemoveVisitor;

        impl<'de> Visitor<'de> for RemoveVisitor {
            type Value = RemoveSpec;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`true` or a remove directive")
            }

            fn visit_bool<E: de::Error>(self, flag: bool) -> Result<RemoveSpec, E> {
                if flag {
                    Ok(RemoveSpec::PrimaryKey)
                } else {
                    Err(E::invalid_value(de::Unexpected::Bool(flag), &self))
                }
            }

            fn visit_map<A: de::MapAccess<'de>>(self, map: A) -> Result<RemoveSpec, A::Error> {
                let directive =
                    RemoveDirective::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(RemoveSpec::Directive(directive))
            }
        }

        deserializer.deserialize_any(RemoveVisitor)
    }
}
