//! 基础设施层
//!
//! 提供依赖注入容器的具体实现

pub mod container;

pub use container::{Injector, ServiceLifetime};
