//! Type proxies: the bridge between generic handles and user node types.
//!
//! The handle engine manipulates user-defined AST types without knowing
//! their layout. Each enum, base and class named by a grammar gets one
//! [`TypeProxy`] in a [`ProxyRegistry`], keyed by type name; handles
//! resolve their proxy once at build time and call through it on every
//! reduction.
//!
//! User code rarely implements [`TypeProxy`] directly: [`EnumProxy`],
//! [`ClassProxy`] and [`BaseProxy`] adapt the two small traits
//! [`AstEnum`](crate::ast::item::AstEnum) and
//! [`AstClass`](crate::ast::item::AstClass). [`DummyProxy`] stands in when
//! only tables are wanted and fails loudly if driven.

use std::marker::PhantomData;

use indexmap::IndexMap;
use smartstring::alias::String;

use crate::arena::Arena;
use crate::ast::item::{AstClass, AstEnum, AstItem, ObjRef, VecRef};
use crate::error::RuntimeError;

/// Type-erased constructor/mutator interface for one AST type.
///
/// Proxies must be shareable: a built parser may be used from any number of
/// threads at once.
pub trait TypeProxy: Send + Sync {
    /// Builds an enum item carrying `ordinal`.
    fn construct_enum<'a>(&self, ordinal: u32) -> Result<AstItem<'a>, RuntimeError> {
        let _ = ordinal;
        Err(RuntimeError::Proxy("not an enum type".into()))
    }

    /// Allocates a fresh node of this type in the arena.
    fn construct_object<'a>(&self, arena: &'a Arena) -> Result<AstItem<'a>, RuntimeError> {
        let _ = arena;
        Err(RuntimeError::Proxy("not a class type".into()))
    }

    /// Allocates a fresh, empty element vector in the arena.
    fn construct_vector<'a>(&self, arena: &'a Arena) -> Result<AstItem<'a>, RuntimeError> {
        Ok(AstItem::from_vector(VecRef::new(arena.alloc(Vec::new()))))
    }

    /// Builds an empty optional item.
    fn construct_optional<'a>(&self) -> Result<AstItem<'a>, RuntimeError> {
        Ok(AstItem::optional_none())
    }

    /// Stores `value` into member `member` of `object`.
    fn assign_field<'a>(
        &self,
        object: &AstItem<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        let _ = (object, member, value);
        Err(RuntimeError::Proxy("not a class type".into()))
    }

    /// Appends `element` to the vector item `vector`.
    fn push_back<'a>(&self, vector: &AstItem<'a>, element: AstItem<'a>) -> Result<(), RuntimeError> {
        let vec = vector
            .vector()
            .ok_or_else(|| RuntimeError::Proxy("push target is not a vector item".into()))?;
        vec.push(element);
        Ok(())
    }
}

/// Proxy that rejects every operation. Used when a parser is built for
/// recognition only.
pub struct DummyProxy;

impl DummyProxy {
    fn refuse<T>() -> Result<T, RuntimeError> {
        Err(RuntimeError::Proxy("dummy proxy cannot perform any operation".into()))
    }
}

impl TypeProxy for DummyProxy {
    fn construct_enum<'a>(&self, _ordinal: u32) -> Result<AstItem<'a>, RuntimeError> {
        Self::refuse()
    }

    fn construct_object<'a>(&self, _arena: &'a Arena) -> Result<AstItem<'a>, RuntimeError> {
        Self::refuse()
    }

    fn construct_vector<'a>(&self, _arena: &'a Arena) -> Result<AstItem<'a>, RuntimeError> {
        Self::refuse()
    }

    fn construct_optional<'a>(&self) -> Result<AstItem<'a>, RuntimeError> {
        Self::refuse()
    }

    fn assign_field<'a>(
        &self,
        _object: &AstItem<'a>,
        _member: usize,
        _value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        Self::refuse()
    }

    fn push_back<'a>(&self, _vector: &AstItem<'a>, _element: AstItem<'a>) -> Result<(), RuntimeError> {
        Self::refuse()
    }
}

/// Proxy for an enum type `E`.
pub struct EnumProxy<E: AstEnum> {
    _marker: PhantomData<fn() -> E>,
}

impl<E: AstEnum> EnumProxy<E> {
    pub fn new() -> Self {
        EnumProxy { _marker: PhantomData }
    }
}

impl<E: AstEnum> Default for EnumProxy<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: AstEnum> TypeProxy for EnumProxy<E> {
    fn construct_enum<'a>(&self, ordinal: u32) -> Result<AstItem<'a>, RuntimeError> {
        if E::from_ordinal(ordinal).is_none() {
            return Err(RuntimeError::Proxy(format!("enum ordinal {ordinal} out of range")));
        }
        Ok(AstItem::from_enum(ordinal))
    }
}

/// Proxy for a concrete class family `C`.
pub struct ClassProxy<C: AstClass> {
    _marker: PhantomData<fn() -> C>,
}

impl<C: AstClass> ClassProxy<C> {
    pub fn new() -> Self {
        ClassProxy { _marker: PhantomData }
    }
}

impl<C: AstClass> Default for ClassProxy<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: AstClass> TypeProxy for ClassProxy<C> {
    fn construct_object<'a>(&self, arena: &'a Arena) -> Result<AstItem<'a>, RuntimeError> {
        let node = arena.alloc(C::fresh());
        Ok(AstItem::from_object(ObjRef::new::<C>(node)))
    }

    fn assign_field<'a>(
        &self,
        object: &AstItem<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        let node = object
            .object()
            .ok_or_else(|| RuntimeError::Proxy("assign target is not an object item".into()))?
            .get_mut::<C>()
            .ok_or_else(|| RuntimeError::Proxy("assign target has a different class".into()))?;
        C::assign(node, member, value)
    }
}

/// Proxy for an abstract base type: supports the container operations but
/// can never be instantiated itself.
pub struct BaseProxy;

impl TypeProxy for BaseProxy {}

/// Name-keyed proxy map handed to the parser at build time.
///
/// Insertion order is preserved, so handle→proxy indices are deterministic.
#[derive(Default)]
pub struct ProxyRegistry {
    proxies: IndexMap<String, Box<dyn TypeProxy>>,
}

impl ProxyRegistry {
    pub fn new() -> ProxyRegistry {
        ProxyRegistry { proxies: IndexMap::new() }
    }

    /// Registers an explicit proxy under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, proxy: Box<dyn TypeProxy>) {
        self.proxies.insert(String::from(name), proxy);
    }

    pub fn register_enum<E: AstEnum + 'static>(&mut self, name: &str) {
        self.register(name, Box::new(EnumProxy::<E>::new()));
    }

    pub fn register_class<C: AstClass>(&mut self, name: &str) {
        self.register(name, Box::new(ClassProxy::<C>::new()));
    }

    pub fn register_base(&mut self, name: &str) {
        self.register(name, Box::new(BaseProxy));
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<usize> {
        self.proxies.get_index_of(name)
    }

    pub(crate) fn get(&self, index: usize) -> &dyn TypeProxy {
        self.proxies[index].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
    }

    impl AstEnum for Color {
        fn from_ordinal(ordinal: u32) -> Option<Self> {
            match ordinal {
                0 => Some(Color::Red),
                1 => Some(Color::Green),
                _ => None,
            }
        }
    }

    struct PairClass;

    #[derive(Default)]
    struct Pair {
        left: Option<u32>,
        right: Option<u32>,
    }

    impl AstClass for PairClass {
        type Node<'a> = Pair;

        fn fresh<'a>() -> Self::Node<'a> {
            Pair::default()
        }

        fn assign<'a>(node: &mut Pair, member: usize, value: AstItem<'a>) -> Result<(), RuntimeError> {
            let ordinal = match value.value() {
                crate::ast::item::AstValue::Enum(v) => v,
                _ => return Err(RuntimeError::Proxy("expected an enum item".into())),
            };
            match member {
                0 => node.left = Some(ordinal),
                1 => node.right = Some(ordinal),
                _ => return Err(RuntimeError::Proxy("unknown member".into())),
            }
            Ok(())
        }
    }

    #[test]
    fn enum_proxy_checks_range() {
        let proxy = EnumProxy::<Color>::new();
        assert!(proxy.construct_enum(1).is_ok());
        assert!(proxy.construct_enum(2).is_err());
    }

    #[test]
    fn class_proxy_constructs_and_assigns() {
        let arena = Arena::new();
        let proxy = ClassProxy::<PairClass>::new();
        let object = proxy.construct_object(&arena).unwrap();
        let value = EnumProxy::<Color>::new().construct_enum(1).unwrap();
        proxy.assign_field(&object, 0, value).unwrap();
        let pair = object.node::<PairClass>().unwrap();
        assert_eq!(pair.left, Some(1));
        assert_eq!(pair.right, None);
    }

    #[test]
    fn base_proxy_supports_containers_only() {
        let arena = Arena::new();
        let proxy = BaseProxy;
        let vec = proxy.construct_vector(&arena).unwrap();
        proxy.push_back(&vec, AstItem::optional_none()).unwrap();
        assert_eq!(vec.items().unwrap().len(), 1);
        assert!(proxy.construct_object(&arena).is_err());
        assert!(proxy.construct_enum(0).is_err());
    }

    #[test]
    fn dummy_proxy_fails_loudly() {
        let arena = Arena::new();
        let proxy = DummyProxy;
        assert!(proxy.construct_vector(&arena).is_err());
        assert!(proxy.construct_optional().is_err());
    }

    #[test]
    fn registry_indices_follow_insertion_order() {
        let mut registry = ProxyRegistry::new();
        registry.register_enum::<Color>("Color");
        registry.register_base("Literal");
        registry.register_class::<PairClass>("Pair");
        assert_eq!(registry.lookup("Color"), Some(0));
        assert_eq!(registry.lookup("Pair"), Some(2));
        assert_eq!(registry.lookup("Missing"), None);
    }
}
