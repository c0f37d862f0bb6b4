//! 类型驱动的轻量依赖注入容器
//!
//! 注册类型及其构造参数描述，按声明类型递归解析依赖，支持显式位置/命名参数、
//! 接口绑定以及瞬态/单例两种生命周期。

pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::{DuplicatePolicy, InjectorConfig};
pub use errors::{BoxError, ConfigError, InjectError};
pub use infrastructure::container::{
    global, Arguments, ContainerStats, Injectable, Injector, Instance, Parameter, Registration,
    Registry, ResolvedArgs, ServiceLifetime, TypeKey,
};
