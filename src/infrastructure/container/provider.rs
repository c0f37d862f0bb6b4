//! 可注入类型的构造协议

use super::arguments::ResolvedArgs;
use super::parameter::{Instance, Parameter};
use super::ServiceLifetime;
use crate::errors::BoxError;
use std::sync::Arc;

/// 可由容器构造的类型
///
/// `parameters` 声明构造参数（顺序即位置参数的填充顺序），
/// `construct` 从解析好的参数中取值并构建实例。
///
/// ```rust
/// use injector::{Injectable, Injector, Parameter, ResolvedArgs, BoxError};
///
/// struct Engine;
///
/// impl Injectable for Engine {
///     fn construct(_: &ResolvedArgs) -> Result<Self, BoxError> {
///         Ok(Engine)
///     }
/// }
///
/// struct Car {
///     engine: std::sync::Arc<Engine>,
/// }
///
/// impl Injectable for Car {
///     fn parameters() -> Vec<Parameter> {
///         vec![Parameter::typed::<Engine>("engine")]
///     }
///
///     fn construct(args: &ResolvedArgs) -> Result<Self, BoxError> {
///         Ok(Car { engine: args.get("engine")? })
///     }
/// }
///
/// let injector = Injector::new();
/// injector.add::<Engine>().unwrap();
/// injector.add::<Car>().unwrap();
/// let car = injector.get::<Car>().unwrap();
/// # let _ = &car.engine;
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// `add` 时使用的生命周期
    const LIFETIME: ServiceLifetime = ServiceLifetime::Transient;

    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn construct(args: &ResolvedArgs) -> Result<Self, BoxError>;
}

/// 类型擦除的构造函数
pub(crate) type Constructor =
    Arc<dyn Fn(&ResolvedArgs) -> Result<Instance, BoxError> + Send + Sync>;

pub(crate) fn injectable_constructor<T: Injectable>() -> Constructor {
    Arc::new(|args: &ResolvedArgs| T::construct(args).map(Instance::new))
}

pub(crate) fn factory_constructor<T, F>(factory: F) -> Constructor
where
    F: Fn(&ResolvedArgs) -> Result<T, BoxError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    Arc::new(move |args: &ResolvedArgs| factory(args).map(Instance::new))
}
