//! Function compatibility registry.
//!
//! Maps scalar/aggregate function identifiers to the value types they
//! accept. The renderer consults this table before wrapping a path in a
//! function call; an explicit registry value is carried on
//! [`crate::AssembleOptions`] so alternate dialect tables can be
//! substituted without global state.

use crate::ir::PropertyType;
use std::collections::HashMap;

/// Type tag a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Array,
    /// Accepts any value type
    Any,
    /// Usable inside an aggregation context
    Aggregate,
}

impl TypeTag {
    fn matches(self, value_type: PropertyType) -> bool {
        match self {
            Self::Any => true,
            Self::String => value_type == PropertyType::String,
            Self::Number => value_type == PropertyType::Number,
            Self::Boolean => value_type == PropertyType::Boolean,
            Self::Object => value_type == PropertyType::Object,
            Self::Array => value_type == PropertyType::Array,
            Self::Aggregate => false,
        }
    }
}

/// Registry of supported functions keyed by lower-cased identifier.
///
/// Unknown identifiers always fail closed.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    entries: HashMap<String, Vec<TypeTag>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function with the type tags it accepts.
    pub fn register(&mut self, name: impl Into<String>, tags: impl Into<Vec<TypeTag>>) {
        self.entries.insert(name.into().to_lowercase(), tags.into());
    }

    /// Check whether `name` may wrap a value in the given position.
    ///
    /// In an aggregation context the function must carry the
    /// [`TypeTag::Aggregate`] tag. When `value_type` is given, the
    /// function must accept that type (or `Any`); without it the check
    /// is type-agnostic.
    pub fn is_supported(
        &self,
        name: &str,
        aggregate_context: bool,
        value_type: Option<PropertyType>,
    ) -> bool {
        let Some(tags) = self.entries.get(&name.to_lowercase()) else {
            return false;
        };

        if aggregate_context && !tags.contains(&TypeTag::Aggregate) {
            return false;
        }

        match value_type {
            Some(value_type) => tags.iter().any(|tag| tag.matches(value_type)),
            None => true,
        }
    }

    /// The default AQL dialect table.
    pub fn aql() -> Self {
        use TypeTag::*;

        let mut registry = Self::new();

        registry.register("length", [Any, Aggregate]);
        registry.register("count", [Any, Aggregate]);
        registry.register("count_distinct", [Any, Aggregate]);
        registry.register("min", [Number, Aggregate]);
        registry.register("max", [Number, Aggregate]);
        registry.register("sum", [Number, Aggregate]);
        registry.register("avg", [Number, Aggregate]);

        registry.register("abs", [Number]);
        registry.register("floor", [Number]);
        registry.register("ceil", [Number]);
        registry.register("round", [Number]);

        registry.register("lower", [String]);
        registry.register("upper", [String]);
        registry.register("trim", [String]);
        registry.register("md5", [String]);
        registry.register("sha1", [String]);

        registry.register("first", [Array]);
        registry.register("last", [Array]);
        registry.register("unique", [Array]);
        registry.register("flatten", [Array]);

        registry.register("attributes", [Object]);
        registry.register("values", [Object]);

        registry.register("to_string", [Any]);
        registry.register("to_number", [Any]);
        registry.register("to_bool", [Any]);

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_function_fails_closed() {
        let registry = FunctionRegistry::aql();

        assert!(!registry.is_supported("frobnicate", false, None));
        assert!(!registry.is_supported("frobnicate", true, None));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let registry = FunctionRegistry::aql();

        assert!(registry.is_supported("LENGTH", false, None));
        assert!(registry.is_supported("Length", true, Some(PropertyType::Array)));
    }

    #[test]
    fn test_aggregate_context_requires_tag() {
        let registry = FunctionRegistry::aql();

        // UPPER is a plain string function
        assert!(registry.is_supported("upper", false, Some(PropertyType::String)));
        assert!(!registry.is_supported("upper", true, Some(PropertyType::String)));
    }

    #[test]
    fn test_type_match() {
        let registry = FunctionRegistry::aql();

        assert!(registry.is_supported("sum", true, Some(PropertyType::Number)));
        assert!(!registry.is_supported("sum", true, Some(PropertyType::String)));
        // No declared type answers only the existence/context question
        assert!(registry.is_supported("sum", true, None));
    }

    #[test]
    fn test_custom_dialect() {
        let mut registry = FunctionRegistry::new();
        registry.register("position", [TypeTag::String]);

        assert!(registry.is_supported("position", false, Some(PropertyType::String)));
        assert!(!registry.is_supported("length", false, None));
    }
}
