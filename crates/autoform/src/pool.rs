//! Provider pool: one shared instance per strategy type
//!
//! Schema attributes name strategy *types* (`layout = TextLayout`). The pool
//! turns such a [`ProviderRef`] into the single `Arc` instance shared by every
//! form that uses the type, creating it with `Default` on first use.
//!
//! Pools are cheap to clone and clones share storage. Pass one explicitly to
//! keep forms isolated (tests do this), or use [`ProviderPool::global`] for
//! the process-wide pool.

use crate::provider::{FormItemValidator, HintProvider, LayoutProvider};
use once_cell::sync::Lazy;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Compile-time reference to a strategy type
///
/// Carries the type's identity and a constructor, so the type can be named in
/// a schema without creating an instance.
pub struct ProviderRef<P: ?Sized> {
    type_id: TypeId,
    type_name: &'static str,
    make: fn() -> Arc<P>,
}

impl<P: ?Sized> ProviderRef<P> {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl<P: ?Sized> Clone for ProviderRef<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for ProviderRef<P> {}

impl<P: ?Sized> PartialEq for ProviderRef<P> {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl<P: ?Sized> fmt::Debug for ProviderRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProviderRef").field(&self.type_name).finish()
    }
}

fn make_layout<L: LayoutProvider + Default>() -> Arc<dyn LayoutProvider> {
    Arc::new(L::default())
}

fn make_validator<V: FormItemValidator + Default>() -> Arc<dyn FormItemValidator> {
    Arc::new(V::default())
}

fn make_hint_provider<H: HintProvider + Default>() -> Arc<dyn HintProvider> {
    Arc::new(H::default())
}

impl ProviderRef<dyn LayoutProvider> {
    pub fn layout<L: LayoutProvider + Default>() -> Self {
        Self {
            type_id: TypeId::of::<L>(),
            type_name: type_name::<L>(),
            make: make_layout::<L>,
        }
    }
}

impl ProviderRef<dyn FormItemValidator> {
    pub fn validator<V: FormItemValidator + Default>() -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
            make: make_validator::<V>,
        }
    }
}

impl ProviderRef<dyn HintProvider> {
    pub fn hint_provider<H: HintProvider + Default>() -> Self {
        Self {
            type_id: TypeId::of::<H>(),
            type_name: type_name::<H>(),
            make: make_hint_provider::<H>,
        }
    }
}

type Slots<P> = RwLock<HashMap<TypeId, Arc<P>>>;

#[derive(Default)]
struct PoolInner {
    layouts: Slots<dyn LayoutProvider>,
    validators: Slots<dyn FormItemValidator>,
    hint_providers: Slots<dyn HintProvider>,
}

/// Registry of shared, stateless strategy instances keyed by type
#[derive(Clone, Default)]
pub struct ProviderPool {
    inner: Arc<PoolInner>,
}

static GLOBAL_POOL: Lazy<ProviderPool> = Lazy::new(ProviderPool::new);

fn get_or_create<P: ?Sized>(slots: &Slots<P>, provider: &ProviderRef<P>) -> Arc<P> {
    if let Some(instance) = slots
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&provider.type_id)
    {
        return Arc::clone(instance);
    }

    let mut slots = slots.write().unwrap_or_else(PoisonError::into_inner);
    let instance = slots.entry(provider.type_id).or_insert_with(|| {
        tracing::debug!(provider = provider.type_name, "instantiating shared provider");
        (provider.make)()
    });
    Arc::clone(instance)
}

fn insert<P: ?Sized>(slots: &Slots<P>, type_id: TypeId, instance: Arc<P>) {
    slots
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(type_id, instance);
}

fn count<P: ?Sized>(slots: &Slots<P>) -> usize {
    slots.read().unwrap_or_else(PoisonError::into_inner).len()
}

impl ProviderPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide pool
    pub fn global() -> ProviderPool {
        GLOBAL_POOL.clone()
    }

    pub fn resolve_layout(&self, provider: &ProviderRef<dyn LayoutProvider>) -> Arc<dyn LayoutProvider> {
        get_or_create(&self.inner.layouts, provider)
    }

    pub fn resolve_validator(
        &self,
        provider: &ProviderRef<dyn FormItemValidator>,
    ) -> Arc<dyn FormItemValidator> {
        get_or_create(&self.inner.validators, provider)
    }

    pub fn resolve_hint_provider(&self, provider: &ProviderRef<dyn HintProvider>) -> Arc<dyn HintProvider> {
        get_or_create(&self.inner.hint_providers, provider)
    }

    /// Shared instance of layout provider `L`
    pub fn layout<L: LayoutProvider + Default>(&self) -> Arc<dyn LayoutProvider> {
        self.resolve_layout(&ProviderRef::layout::<L>())
    }

    /// Shared instance of validator `V`
    pub fn validator<V: FormItemValidator + Default>(&self) -> Arc<dyn FormItemValidator> {
        self.resolve_validator(&ProviderRef::validator::<V>())
    }

    /// Shared instance of hint provider `H`
    pub fn hint_provider<H: HintProvider + Default>(&self) -> Arc<dyn HintProvider> {
        self.resolve_hint_provider(&ProviderRef::hint_provider::<H>())
    }

    /// Seed the pool with a configured layout provider instead of `L::default()`
    ///
    /// Later lookups of `L`, including those made while building forms, get
    /// this instance. An instance already handed out is replaced for future
    /// lookups only.
    pub fn register_layout<L: LayoutProvider + Default>(&self, instance: L) {
        insert(&self.inner.layouts, TypeId::of::<L>(), Arc::new(instance));
    }

    /// Seed the pool with a configured validator instead of `V::default()`
    pub fn register_validator<V: FormItemValidator + Default>(&self, instance: V) {
        insert(&self.inner.validators, TypeId::of::<V>(), Arc::new(instance));
    }

    /// Seed the pool with a configured hint provider instead of `H::default()`
    pub fn register_hint_provider<H: HintProvider + Default>(&self, instance: H) {
        insert(&self.inner.hint_providers, TypeId::of::<H>(), Arc::new(instance));
    }

    /// Number of instances held, across all strategy kinds
    pub fn len(&self) -> usize {
        count(&self.inner.layouts) + count(&self.inner.validators) + count(&self.inner.hint_providers)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ProviderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderPool")
            .field("layouts", &count(&self.inner.layouts))
            .field("validators", &count(&self.inner.validators))
            .field("hint_providers", &count(&self.inner.hint_providers))
            .finish()
    }
}
