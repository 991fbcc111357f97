use thiserror::Error;

/// Errors surfaced by cached methods and cache stores.
///
/// Digesting a key never fails; every variant here comes from the store, from
/// (de)serializing a cached value, or from registering a method.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store failed. Propagated to the caller unchanged.
    #[error("cache store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    /// The store could not resolve a type referenced by a cached entry.
    ///
    /// This is a transient load-order failure: the binder asks the registry's
    /// type resolver to load `type_name` and retries the fetch once.
    #[error("unresolved type `{type_name}`: {message}")]
    UnresolvedType { type_name: String, message: String },

    /// A freshly computed value could not be serialized for the store.
    #[error("failed to encode cached value: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored payload could not be decoded into the method's value type.
    #[error("failed to decode cached value: {0}")]
    Decode(#[source] serde_json::Error),

    /// A method name was empty or contained the `:` key separator.
    #[error("invalid cached method name `{0}`")]
    InvalidMethodName(String),
}

impl CacheError {
    /// Wraps any backend error.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CacheError::Store(Box::new(err))
    }

    pub fn unresolved_type(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::UnresolvedType {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
