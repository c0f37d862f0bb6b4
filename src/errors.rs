use thiserror::Error;

/// 构造函数返回的错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = InjectError> = std::result::Result<T, E>;

/// Errors raised while registering or resolving types
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Registration of '{type_name}' rejected: {reason}")]
    Registration {
        type_name: &'static str,
        reason: String,
    },

    #[error("Type '{type_name}' is not registered")]
    UnregisteredType { type_name: &'static str },

    #[error("Parameter '{parameter}' of '{owner}' has no explicit value, declared type or default")]
    UnresolvableParameter {
        owner: &'static str,
        parameter: String,
    },

    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<&'static str> },

    #[error("Resolution depth limit {limit} exceeded while resolving '{type_name}'")]
    DepthExceeded {
        type_name: &'static str,
        limit: usize,
    },

    #[error("Parameter '{parameter}' of '{owner}' expected '{expected}', found '{found}'")]
    TypeMismatch {
        owner: &'static str,
        parameter: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{owner}' has no parameter named '{parameter}'")]
    UnknownParameter {
        owner: &'static str,
        parameter: String,
    },

    #[error("Failed to construct '{type_name}': {source}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

impl InjectError {
    pub(crate) fn registration(type_name: &'static str, reason: impl Into<String>) -> Self {
        InjectError::Registration {
            type_name,
            reason: reason.into(),
        }
    }

    /// 将构造函数错误还原：容器自身的错误原样返回，其余包装为 `Construction`
    pub(crate) fn from_constructor(type_name: &'static str, err: BoxError) -> Self {
        match err.downcast::<InjectError>() {
            Ok(inner) => *inner,
            Err(source) => InjectError::Construction { type_name, source },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
    #[error("Failed to read file '{0}': {1}")]
    Io(String, #[source] std::io::Error),
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
