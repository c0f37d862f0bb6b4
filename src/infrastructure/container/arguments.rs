//! 显式构造参数与解析结果

use super::parameter::{Instance, TypeKey};
use crate::errors::{InjectError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// 注册时提供的显式参数：按位置的值和按名称的值
///
/// 位置参数按声明顺序填充前 N 个参数，命名参数按名称匹配。
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    positional: Vec<Instance>,
    named: HashMap<String, Instance>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个位置参数
    pub fn arg<V: Send + Sync + 'static>(self, value: V) -> Self {
        self.arg_arc(Arc::new(value))
    }

    /// 追加一个已共享的位置参数（可以是 `Arc<dyn Trait>`）
    pub fn arg_arc<V: ?Sized + Send + Sync + 'static>(mut self, value: Arc<V>) -> Self {
        self.positional.push(Instance::from_arc(value));
        self
    }

    /// 设置一个命名参数，同名时后者覆盖前者
    pub fn named<V: Send + Sync + 'static>(self, name: impl Into<String>, value: V) -> Self {
        self.named_arc(name, Arc::new(value))
    }

    pub fn named_arc<V: ?Sized + Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        value: Arc<V>,
    ) -> Self {
        self.named.insert(name.into(), Instance::from_arc(value));
        self
    }

    pub fn positional(&self, index: usize) -> Option<&Instance> {
        self.positional.get(index)
    }

    pub fn named_value(&self, name: &str) -> Option<&Instance> {
        self.named.get(name)
    }

    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    pub fn named_keys(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// 构建 [`Arguments`]：`args![1, 2, 3; param = String::from("123")]`
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($value:expr),* $(; $($name:ident = $named:expr),+ )? $(,)?) => {{
        #[allow(unused_mut)]
        let mut arguments = $crate::Arguments::new();
        $( arguments = arguments.arg($value); )*
        $( $( arguments = arguments.named(stringify!($name), $named); )+ )?
        arguments
    }};
}

#[derive(Debug)]
struct Slot {
    name: String,
    value: Option<Instance>,
}

/// 解析完成、交给构造函数的参数值，按参数名访问
///
/// 留给默认值的参数没有值，通过 [`ResolvedArgs::optional`] 或
/// [`ResolvedArgs::value_or`] 取用。
#[derive(Debug)]
pub struct ResolvedArgs {
    owner: TypeKey,
    slots: Vec<Slot>,
}

impl ResolvedArgs {
    pub(crate) fn new(owner: TypeKey) -> Self {
        Self {
            owner,
            slots: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: &str, value: Option<Instance>) {
        self.slots.push(Slot {
            name: name.to_string(),
            value,
        });
    }

    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 参数是否得到了值（而不是留给默认值）
    pub fn is_provided(&self, name: &str) -> Result<bool> {
        Ok(self.slot(name)?.value.is_some())
    }

    /// 取必需参数的共享实例
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        self.optional::<T>(name)?
            .ok_or_else(|| InjectError::UnresolvableParameter {
                owner: self.owner.name(),
                parameter: name.to_string(),
            })
    }

    /// 取可选参数，留给默认值时返回 `None`
    pub fn optional<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Option<Arc<T>>> {
        let slot = self.slot(name)?;
        match &slot.value {
            None => Ok(None),
            Some(instance) => instance.downcast::<T>().map(Some).ok_or_else(|| {
                InjectError::TypeMismatch {
                    owner: self.owner.name(),
                    parameter: slot.name.clone(),
                    expected: std::any::type_name::<T>(),
                    found: instance.type_name(),
                }
            }),
        }
    }

    /// 取必需参数的值副本
    pub fn value<V: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<V> {
        Ok(self.get::<V>(name)?.as_ref().clone())
    }

    /// 取参数的值副本，未提供时使用 `default`
    pub fn value_or<V: Clone + Send + Sync + 'static>(&self, name: &str, default: V) -> Result<V> {
        Ok(self
            .optional::<V>(name)?
            .map_or(default, |value| value.as_ref().clone()))
    }

    fn slot(&self, name: &str) -> Result<&Slot> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .ok_or_else(|| InjectError::UnknownParameter {
                owner: self.owner.name(),
                parameter: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owner;

    fn resolved() -> ResolvedArgs {
        let mut args = ResolvedArgs::new(TypeKey::of::<Owner>());
        args.push("a", Some(Instance::new(1i32)));
        args.push("label", Some(Instance::new(String::from("x"))));
        args.push("param", None);
        args
    }

    #[test]
    fn test_args_macro_builds_positional_and_named() {
        let arguments = args![1i32, 2i32, 3i32; param = String::from("123")];
        assert_eq!(arguments.positional_len(), 3);
        assert_eq!(
            arguments.positional(2).unwrap().downcast::<i32>().as_deref(),
            Some(&3)
        );
        let param = arguments.named_value("param").unwrap();
        assert_eq!(param.downcast::<String>().unwrap().as_str(), "123");

        assert!(args![].is_empty());
        let only_named = args![; flag = true];
        assert_eq!(only_named.positional_len(), 0);
        assert_eq!(only_named.named_keys().collect::<Vec<_>>(), vec!["flag"]);
    }

    #[test]
    fn test_named_argument_overwrites_same_name() {
        let arguments = Arguments::new().named("x", 1u8).named("x", 2u8);
        let value = arguments.named_value("x").unwrap().downcast::<u8>().unwrap();
        assert_eq!(*value, 2);
    }

    #[test]
    fn test_resolved_args_lookup() {
        let args = resolved();
        assert_eq!(args.len(), 3);
        assert_eq!(args.value::<i32>("a").unwrap(), 1);
        assert_eq!(args.get::<String>("label").unwrap().as_str(), "x");
        assert!(args.optional::<String>("param").unwrap().is_none());
        assert_eq!(
            args.value_or("param", String::from("fallback")).unwrap(),
            "fallback"
        );
        assert!(!args.is_provided("param").unwrap());
    }

    #[test]
    fn test_resolved_args_errors() {
        let args = resolved();

        assert!(matches!(
            args.value::<i64>("a"),
            Err(InjectError::TypeMismatch { expected: "i64", found: "i32", .. })
        ));
        assert!(matches!(
            args.get::<String>("param"),
            Err(InjectError::UnresolvableParameter { .. })
        ));
        assert!(matches!(
            args.get::<String>("missing"),
            Err(InjectError::UnknownParameter { .. })
        ));
    }
}
