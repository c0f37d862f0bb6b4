//! 依赖注入容器
//!
//! - 注册表：类型键到构造方式（参数描述、显式参数、生命周期）的映射
//! - 解析器：递归满足构造参数并创建实例
//! - 单例：每个注册表内只构造一次，惰性创建

pub mod arguments;
pub mod parameter;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use arguments::{Arguments, ResolvedArgs};
pub use parameter::{Instance, Parameter, TypeKey};
pub use provider::Injectable;
pub use registry::{Registration, Registry};
pub use resolver::{ContainerStats, Injector};

/// 服务生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceLifetime {
    /// 每次解析创建新实例
    #[default]
    Transient,
    /// 注册表内共享同一实例
    Singleton,
}

lazy_static::lazy_static! {
    static ref GLOBAL_INJECTOR: Injector = Injector::new();
}

/// 进程级默认容器，首次使用时创建
pub fn global() -> &'static Injector {
    &GLOBAL_INJECTOR
}
