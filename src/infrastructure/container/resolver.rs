//! 解析器
//!
//! 按声明顺序为每个构造参数取值：位置参数、命名参数、按声明类型递归解析、默认值。
//! 解析栈随调用传递，用于检测循环依赖；单例通过 `OnceCell` 保证最多构造一次。

use super::arguments::{Arguments, ResolvedArgs};
use super::parameter::{Instance, Parameter, TypeKey};
use super::provider::{factory_constructor, injectable_constructor, Constructor, Injectable};
use super::registry::{Registration, Registry};
use super::ServiceLifetime;
use crate::config::InjectorConfig;
use crate::errors::{BoxError, InjectError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 绑定注册使用的参数名
const BINDING_PARAMETER: &str = "implementation";

/// 依赖注入容器：注册表加解析器
///
/// 克隆后共享同一注册表和统计信息。
#[derive(Clone)]
pub struct Injector {
    registry: Registry,
    config: Arc<InjectorConfig>,
    stats: Arc<InnerStats>,
}

/// 内部统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    transient_creations: AtomicUsize,
}

impl Injector {
    pub fn new() -> Self {
        Self::with_config(InjectorConfig::default())
    }

    pub fn with_config(config: InjectorConfig) -> Self {
        Self {
            registry: Registry::new(config.duplicate_policy),
            config: Arc::new(config),
            stats: Arc::new(InnerStats::default()),
        }
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 注册类型，使用 `T::LIFETIME`，无显式参数
    pub fn add<T: Injectable>(&self) -> Result<()> {
        self.register::<T>(Arguments::new(), T::LIFETIME)
    }

    /// 注册类型并提供显式构造参数
    pub fn add_with<T: Injectable>(&self, arguments: Arguments) -> Result<()> {
        self.register::<T>(arguments, T::LIFETIME)
    }

    /// 注册为单例
    pub fn add_singleton<T: Injectable>(&self) -> Result<()> {
        self.register::<T>(Arguments::new(), ServiceLifetime::Singleton)
    }

    pub fn register<T: Injectable>(&self, arguments: Arguments, lifetime: ServiceLifetime) -> Result<()> {
        self.insert(
            TypeKey::of::<T>(),
            T::parameters(),
            arguments,
            lifetime,
            injectable_constructor::<T>(),
        )
    }

    /// 以闭包和显式参数描述注册，适用于无法实现 [`Injectable`] 的类型
    pub fn register_factory<T, F>(
        &self,
        parameters: Vec<Parameter>,
        arguments: Arguments,
        lifetime: ServiceLifetime,
        factory: F,
    ) -> Result<()>
    where
        F: Fn(&ResolvedArgs) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.insert(
            TypeKey::of::<T>(),
            parameters,
            arguments,
            lifetime,
            factory_constructor(factory),
        )
    }

    /// 将接口类型（通常是 `dyn Trait`）绑定到已注册的实现类型
    ///
    /// 解析 `I` 时先按 `T` 自身的注册（生命周期、显式参数）解析，再向上转型，
    /// 因此单例实现通过两个键得到的是同一个对象。
    pub fn bind<I, T, F>(&self, upcast: F) -> Result<()>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move |args: &ResolvedArgs| -> std::result::Result<Instance, BoxError> {
                let implementation = args.get::<T>(BINDING_PARAMETER)?;
                Ok(Instance::from_arc(upcast(implementation)))
            });
        self.insert(
            TypeKey::of::<I>(),
            vec![Parameter::typed::<T>(BINDING_PARAMETER)],
            Arguments::new(),
            ServiceLifetime::Transient,
            constructor,
        )
    }

    fn insert(
        &self,
        target: TypeKey,
        parameters: Vec<Parameter>,
        arguments: Arguments,
        lifetime: ServiceLifetime,
        constructor: Constructor,
    ) -> Result<()> {
        let registration = Registration::new(target, parameters, arguments, lifetime, constructor)?;
        self.registry.add(registration)
    }

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.registry.contains(TypeKey::of::<T>())
    }

    /// 解析类型实例
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        let instance = self.get_instance(key)?;
        instance.downcast::<T>().ok_or_else(|| InjectError::TypeMismatch {
            owner: key.name(),
            parameter: String::from("<root>"),
            expected: key.name(),
            found: instance.type_name(),
        })
    }

    /// 按类型键解析，返回类型擦除的实例
    pub fn get_instance(&self, key: TypeKey) -> Result<Instance> {
        let mut stack = Vec::new();
        self.resolve(key, &mut stack)
    }

    fn resolve(&self, key: TypeKey, stack: &mut Vec<TypeKey>) -> Result<Instance> {
        if stack.contains(&key) {
            let mut chain: Vec<&'static str> = stack.iter().map(TypeKey::name).collect();
            chain.push(key.name());
            tracing::warn!(chain = ?chain, "Circular dependency detected");
            return Err(InjectError::CircularDependency { chain });
        }
        if stack.len() >= self.config.max_depth {
            return Err(InjectError::DepthExceeded {
                type_name: key.name(),
                limit: self.config.max_depth,
            });
        }

        let registration = self.registry.get(key)?;
        self.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        if let Some(instance) = registration.cached_instance() {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(instance.clone());
        }

        stack.push(key);
        let result = if registration.is_singleton() {
            registration
                .cache()
                .get_or_try_init(|| {
                    self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(service = key.name(), "Constructing singleton");
                    self.construct(&registration, stack)
                })
                .cloned()
        } else {
            self.stats.transient_creations.fetch_add(1, Ordering::Relaxed);
            self.construct(&registration, stack)
        };
        stack.pop();
        result
    }

    fn construct(&self, registration: &Registration, stack: &mut Vec<TypeKey>) -> Result<Instance> {
        let owner = registration.target();
        let arguments = registration.arguments();
        let mut resolved = ResolvedArgs::new(owner);

        for (index, parameter) in registration.parameters().iter().enumerate() {
            let value = if let Some(value) = arguments.positional(index) {
                Some(value.clone())
            } else if let Some(value) = arguments.named_value(parameter.name()) {
                Some(value.clone())
            } else if let Some(dependency) = parameter.declared_type() {
                if parameter.has_default() && !self.registry.contains(dependency) {
                    None
                } else {
                    Some(self.resolve(dependency, stack)?)
                }
            } else if parameter.has_default() {
                None
            } else {
                return Err(InjectError::UnresolvableParameter {
                    owner: owner.name(),
                    parameter: parameter.name().to_string(),
                });
            };

            tracing::trace!(
                service = owner.name(),
                parameter = parameter.name(),
                provided = value.is_some(),
                "Resolved parameter"
            );
            resolved.push(parameter.name(), value);
        }

        (registration.constructor())(&resolved)
            .map_err(|err| InjectError::from_constructor(owner.name(), err))
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
            transient_creations: self.stats.transient_creations.load(Ordering::Relaxed),
            registered_services: self.registry.len(),
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

/// 容器统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub transient_creations: usize,
    pub registered_services: usize,
}

impl ContainerStats {
    /// 单例缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
