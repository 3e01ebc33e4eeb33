//! Call identity: the scope, operation, and arguments of a cached call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::QUALIFIED_NAME_SEPARATOR;
use crate::error::{CacheError, Result};
use crate::types::to_argument;

/// Describes "what is being cached".
///
/// Two structurally equal identities always fingerprint to the same key.
/// Arguments are held as [`serde_json::Value`] so heterogeneous argument
/// lists can be compared and serialized uniformly.
///
/// # Example
///
/// ```rust
/// use callcache_core::CallIdentity;
/// use serde_json::json;
///
/// let identity = CallIdentity::new("search")
///     .arg(&"rust")?
///     .arg_value(json!({ "limit": 10 }));
///
/// assert_eq!(identity.arguments.len(), 2);
/// # Ok::<(), callcache_core::CacheError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallIdentity {
    /// Owning type or module, absent for free functions
    pub scope: Option<String>,
    /// Name of the function or method
    pub operation: String,
    /// Ordered argument values
    pub arguments: Vec<Value>,
}

impl CallIdentity {
    /// Creates an identity for a free function with no arguments.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            scope: None,
            operation: operation.into(),
            arguments: Vec::new(),
        }
    }

    /// Sets the owning scope (type or module name).
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Appends a serializable argument.
    ///
    /// Fails with [`CacheError::Fingerprint`] when the value has no canonical
    /// JSON form (a map with non-string keys, NaN, or an infinity).
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let value = to_argument(value).map_err(|e| match e {
            CacheError::Fingerprint(reason) => {
                CacheError::Fingerprint(format!("argument {}: {reason}", self.arguments.len()))
            }
            other => other,
        })?;
        self.arguments.push(value);
        Ok(self)
    }

    /// Appends an argument that is already a JSON value.
    pub fn arg_value(mut self, value: Value) -> Self {
        self.arguments.push(value);
        self
    }

    /// Replaces the argument list.
    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Returns `scope.operation`, or just `operation` without a scope.
    pub fn qualified_name(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{scope}{QUALIFIED_NAME_SEPARATOR}{}", self.operation),
            None => self.operation.clone(),
        }
    }

    /// Validates the identity.
    pub fn validate(&self) -> Result<()> {
        if self.operation.is_empty() {
            return Err(CacheError::EmptyOperation);
        }
        Ok(())
    }
}
