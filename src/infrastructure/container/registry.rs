//! 注册表
//!
//! 每个类型对应一条注册信息：参数描述、显式参数、生命周期、构造函数和单例缓存。
//! 注册是惰性的，不会在注册时创建任何实例。

use super::arguments::Arguments;
use super::parameter::{Instance, Parameter, TypeKey};
use super::provider::Constructor;
use super::ServiceLifetime;
use crate::config::DuplicatePolicy;
use crate::errors::{InjectError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// 单个类型的注册信息
///
/// 参数描述在注册后不可变；单例缓存最多从空变为有值一次。
pub struct Registration {
    target: TypeKey,
    parameters: Vec<Parameter>,
    arguments: Arguments,
    lifetime: ServiceLifetime,
    constructor: Constructor,
    cached: OnceCell<Instance>,
}

impl Registration {
    /// 创建注册信息并校验显式参数与参数描述是否匹配
    pub(crate) fn new(
        target: TypeKey,
        parameters: Vec<Parameter>,
        arguments: Arguments,
        lifetime: ServiceLifetime,
        constructor: Constructor,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for parameter in &parameters {
            if !seen.insert(parameter.name()) {
                return Err(InjectError::registration(
                    target.name(),
                    format!("duplicate parameter name '{}'", parameter.name()),
                ));
            }
        }

        if arguments.positional_len() > parameters.len() {
            return Err(InjectError::registration(
                target.name(),
                format!(
                    "{} positional arguments supplied but only {} parameters declared",
                    arguments.positional_len(),
                    parameters.len()
                ),
            ));
        }

        for name in arguments.named_keys() {
            let index = parameters
                .iter()
                .position(|parameter| parameter.name() == name)
                .ok_or_else(|| {
                    InjectError::registration(
                        target.name(),
                        format!("named argument '{}' matches no parameter", name),
                    )
                })?;
            if index < arguments.positional_len() {
                return Err(InjectError::registration(
                    target.name(),
                    format!("parameter '{}' supplied both by position and by name", name),
                ));
            }
        }

        Ok(Self {
            target,
            parameters,
            arguments,
            lifetime,
            constructor,
            cached: OnceCell::new(),
        })
    }

    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime == ServiceLifetime::Singleton
    }

    pub fn cached_instance(&self) -> Option<&Instance> {
        self.cached.get()
    }

    pub(crate) fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub(crate) fn cache(&self) -> &OnceCell<Instance> {
        &self.cached
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("target", &self.target)
            .field("parameters", &self.parameters)
            .field("lifetime", &self.lifetime)
            .field("cached", &self.cached.get().is_some())
            .finish()
    }
}

/// 类型到注册信息的映射
///
/// 克隆后共享同一张表。
#[derive(Clone)]
pub struct Registry {
    entries: Arc<DashMap<TypeKey, Arc<Registration>>>,
    policy: DuplicatePolicy,
}

impl Registry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn add(&self, registration: Registration) -> Result<()> {
        let key = registration.target();
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => match self.policy {
                DuplicatePolicy::Replace => {
                    tracing::debug!(service = key.name(), "Replacing existing registration");
                    entry.insert(Arc::new(registration));
                }
                DuplicatePolicy::Reject => {
                    return Err(InjectError::registration(key.name(), "type is already registered"));
                }
            },
            Entry::Vacant(entry) => {
                tracing::debug!(
                    service = key.name(),
                    lifetime = ?registration.lifetime(),
                    parameters = registration.parameters().len(),
                    "Registered service"
                );
                entry.insert(Arc::new(registration));
            }
        }
        Ok(())
    }

    /// 查找注册信息，返回的 `Arc` 不持有表上的锁
    pub fn get(&self, key: TypeKey) -> Result<Arc<Registration>> {
        self.entries
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(InjectError::UnregisteredType {
                type_name: key.name(),
            })
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已注册类型名（排序后）
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.iter().map(|entry| entry.key().name()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::container::provider::factory_constructor;

    struct Widget;

    fn widget_registration(parameters: Vec<Parameter>, arguments: Arguments) -> Result<Registration> {
        Registration::new(
            TypeKey::of::<Widget>(),
            parameters,
            arguments,
            ServiceLifetime::Transient,
            factory_constructor(|_| Ok(Widget)),
        )
    }

    #[test]
    fn test_add_and_get() {
        let registry = Registry::default();
        assert!(registry.is_empty());

        registry.add(widget_registration(vec![], Arguments::new()).unwrap()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(TypeKey::of::<Widget>()));
        let registration = registry.get(TypeKey::of::<Widget>()).unwrap();
        assert_eq!(registration.target(), TypeKey::of::<Widget>());
        assert!(!registration.is_singleton());
        assert!(registration.cached_instance().is_none());
    }

    #[test]
    fn test_get_unregistered() {
        let registry = Registry::default();
        let result = registry.get(TypeKey::of::<Widget>());
        assert!(matches!(result, Err(InjectError::UnregisteredType { .. })));
    }

    #[test]
    fn test_duplicate_policy_replace() {
        let registry = Registry::new(DuplicatePolicy::Replace);
        registry.add(widget_registration(vec![], Arguments::new()).unwrap()).unwrap();
        registry
            .add(widget_registration(vec![Parameter::untyped("x")], Arguments::new().arg(1u8)).unwrap())
            .unwrap();

        assert_eq!(registry.len(), 1);
        let registration = registry.get(TypeKey::of::<Widget>()).unwrap();
        assert_eq!(registration.parameters().len(), 1);
    }

    #[test]
    fn test_duplicate_policy_reject() {
        let registry = Registry::new(DuplicatePolicy::Reject);
        registry.add(widget_registration(vec![], Arguments::new()).unwrap()).unwrap();
        let result = registry.add(widget_registration(vec![], Arguments::new()).unwrap());
        assert!(matches!(result, Err(InjectError::Registration { .. })));
    }

    #[test]
    fn test_registration_validation() {
        let duplicate = widget_registration(
            vec![Parameter::untyped("a"), Parameter::untyped("a")],
            Arguments::new(),
        );
        assert!(matches!(duplicate, Err(InjectError::Registration { .. })));

        let too_many = widget_registration(
            vec![Parameter::untyped("a")],
            Arguments::new().arg(1u8).arg(2u8),
        );
        assert!(matches!(too_many, Err(InjectError::Registration { .. })));

        let unknown_name = widget_registration(
            vec![Parameter::untyped("a")],
            Arguments::new().named("b", 1u8),
        );
        assert!(matches!(unknown_name, Err(InjectError::Registration { .. })));

        let both = widget_registration(
            vec![Parameter::untyped("a"), Parameter::untyped("b")],
            Arguments::new().arg(1u8).named("a", 2u8),
        );
        assert!(matches!(both, Err(InjectError::Registration { .. })));

        let ok = widget_registration(
            vec![Parameter::untyped("a"), Parameter::untyped("b")],
            Arguments::new().arg(1u8).named("b", 2u8),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_registered_types_sorted() {
        struct Alpha;
        let registry = Registry::default();
        registry.add(widget_registration(vec![], Arguments::new()).unwrap()).unwrap();
        registry
            .add(
                Registration::new(
                    TypeKey::of::<Alpha>(),
                    vec![],
                    Arguments::new(),
                    ServiceLifetime::Singleton,
                    factory_constructor(|_| Ok(Alpha)),
                )
                .unwrap(),
            )
            .unwrap();

        let names = registry.registered_types();
        assert_eq!(names.len(), 2);
        assert!(names[0] < names[1]);
    }
}
