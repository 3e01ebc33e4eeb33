//! Argument filter policies.
//!
//! Any `Fn(&Value) -> bool + Send + Sync` closure is also a filter.

use std::fmt;

use serde_json::Value;

use callcache_core::constants::DEFAULT_MARKER_FIELD;
use callcache_core::traits::ArgumentFilter;

/// Keeps every argument. The default policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepAll;

impl ArgumentFilter for KeepAll {
    fn excludes(&self, _argument: &Value) -> bool {
        false
    }
}

/// Excludes JSON objects that carry a given marker field.
///
/// Scalars and arrays are never excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerField {
    field: String,
}

impl MarkerField {
    /// Excludes objects carrying `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    /// Excludes objects carrying `apiType`.
    pub fn api_type() -> Self {
        Self::new(DEFAULT_MARKER_FIELD)
    }

    /// Returns the marker field name.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl ArgumentFilter for MarkerField {
    fn excludes(&self, argument: &Value) -> bool {
        argument
            .as_object()
            .is_some_and(|object| object.contains_key(&self.field))
    }
}

/// Excludes an argument if any of its filters does.
#[derive(Default)]
pub struct AnyOf {
    filters: Vec<Box<dyn ArgumentFilter>>,
}

impl AnyOf {
    /// Creates an empty union, which excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the union.
    pub fn or(mut self, filter: impl ArgumentFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Returns the number of filters in the union.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the union has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ArgumentFilter for AnyOf {
    fn excludes(&self, argument: &Value) -> bool {
        self.filters.iter().any(|filter| filter.excludes(argument))
    }
}

impl fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyOf")
            .field("filters", &self.filters.len())
            .finish()
    }
}
