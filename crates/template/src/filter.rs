//! Filter registration
//!
//! The filter library itself lives outside the engine; this module only
//! defines the registry the expression evaluator consults. Filters are
//! registered at engine setup and the registry is read-only during
//! rendering.

use crate::{error::FilterError, value::Value};
use indexmap::IndexMap;
use std::fmt::{self, Debug};

/// A filter evaluator: takes the piped-in value and the filter's parameter
/// list, returns the transformed value or an error. Errors propagate to the
/// embedder as hard render failures.
pub type FilterFunction =
    Box<dyn Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync>;

/// A table of filters keyed by identifier
#[derive(Default)]
pub struct FilterRegistry {
    filters: IndexMap<String, FilterFunction>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter under an identifier, replacing any previous filter
    /// with the same name
    pub fn register(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn(&Value, &[Value]) -> Result<Value, FilterError>
        + Send
        + Sync
        + 'static,
    ) {
        self.filters.insert(name.into(), Box::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&FilterFunction> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

impl Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
