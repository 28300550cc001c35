// File: src/manager.rs
// Purpose: Form session: ordering, data binding, view production, validation, results

use crate::config::{DuplicateKeyPolicy, FormConfig};
use crate::entity::{DynamicFormItem, FormItemEntity};
use crate::error::FormError;
use crate::pool::ProviderPool;
use crate::provider::{FormItemValidator, LayoutProvider, ViewContainer, ViewHandle};
use crate::schema::{self, FormSchema};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result of a validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Every item passed
    Passed,
    /// Validation stopped at the first failing item
    Failed { key: String },
    /// The cancellation token fired before the chain finished
    Cancelled,
}

impl ValidationOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ValidationOutcome::Passed)
    }

    /// Key of the item that failed, if validation failed
    pub fn failed_key(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Failed { key } => Some(key),
            _ => None,
        }
    }
}

/// Sort by ascending order; equal orders keep their relative position
fn resort(entities: &mut [FormItemEntity]) {
    entities.sort_by(|a, b| a.order.total_cmp(&b.order));
}

/// Remove an inline error left on the item's control by an earlier failed pass
fn clear_error(entity: &FormItemEntity) {
    if let Some(view) = entity.view() {
        if let Ok(mut view) = view.try_borrow_mut() {
            view.set_error(None);
        }
    }
}

/// Apply the duplicate-key policy to freshly extracted items
fn dedupe(entities: Vec<FormItemEntity>, policy: DuplicateKeyPolicy) -> Result<Vec<FormItemEntity>, FormError> {
    match policy {
        DuplicateKeyPolicy::Allow => Ok(entities),
        DuplicateKeyPolicy::Reject => {
            let mut seen = HashSet::new();
            for entity in &entities {
                if !seen.insert(entity.key.as_str()) {
                    return Err(FormError::DuplicateKey(entity.key.clone()));
                }
            }
            Ok(entities)
        }
        DuplicateKeyPolicy::Replace => {
            let mut index: HashMap<String, usize> = HashMap::new();
            let mut kept: Vec<Option<FormItemEntity>> = Vec::with_capacity(entities.len());
            for entity in entities {
                if let Some(previous) = index.insert(entity.key.clone(), kept.len()) {
                    tracing::debug!(key = %entity.key, "later form field replaces earlier one with the same key");
                    kept[previous] = None;
                }
                kept.push(Some(entity));
            }
            Ok(kept.into_iter().flatten().collect())
        }
    }
}

/// Drives one form built from schema type `T`
///
/// Owns the form items in rendering/validation order. All mutation happens on
/// the owning (UI) thread; the manager is deliberately `!Send`.
pub struct FormManager<T> {
    entities: Vec<FormItemEntity>,
    pool: ProviderPool,
    config: FormConfig,
    _schema: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for FormManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormManager")
            .field("form", &std::any::type_name::<T>())
            .field("entities", &self.entities)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: FormSchema> FormManager<T> {
    /// Build an empty form using the global provider pool and default config
    pub fn build() -> Result<Self, FormError> {
        Self::build_with(&ProviderPool::global(), FormConfig::default())
    }

    /// Build an empty form with an explicit provider pool and config
    pub fn build_with(pool: &ProviderPool, config: FormConfig) -> Result<Self, FormError> {
        let entities = schema::extract::<T>(pool)?;
        let mut entities = dedupe(entities, config.duplicate_keys)?;
        resort(&mut entities);

        tracing::debug!(
            form = std::any::type_name::<T>(),
            fields = entities.len(),
            "built form"
        );

        Ok(Self {
            entities,
            pool: pool.clone(),
            config,
            _schema: PhantomData,
        })
    }

    /// Build a form pre-filled from an existing instance
    pub fn from_instance(data: &T) -> Result<Self, FormError> {
        Self::from_instance_with(data, &ProviderPool::global(), FormConfig::default())
    }

    pub fn from_instance_with(data: &T, pool: &ProviderPool, config: FormConfig) -> Result<Self, FormError> {
        let mut manager = Self::build_with(pool, config)?;
        manager.init_data(data);
        Ok(manager)
    }

    /// Copy the values of `data`'s form fields into the matching items
    ///
    /// Fields that cannot be read are logged and skipped. Appended items have
    /// no backing field and keep their value.
    pub fn init_data(&mut self, data: &T) -> &mut Self {
        for entity in &self.entities {
            let Some(field_name) = entity.field_name.as_deref() else {
                continue;
            };
            match data.read_field(field_name) {
                Ok(value) => entity.set_result(Some(value)),
                Err(e) => tracing::warn!(key = %entity.key, "Failed to read form field: {}", e),
            }
        }
        self
    }

    /// Merge values by key; items whose key is absent keep their value
    pub fn init_data_map(&mut self, data: &HashMap<String, Value>) -> &mut Self {
        for entity in &self.entities {
            if let Some(value) = data.get(&entity.key) {
                entity.set_result(Some(value.clone()));
            }
        }
        self
    }

    /// Add an item that has no backing schema field
    ///
    /// The item is placed by its order, after existing items with the same
    /// order. A colliding key is handled by the configured duplicate policy.
    pub fn append(&mut self, item: DynamicFormItem) -> Result<&mut Self, FormError> {
        let entity = item.into_entity(&self.pool);

        if self.entities.iter().any(|existing| existing.key == entity.key) {
            match self.config.duplicate_keys {
                DuplicateKeyPolicy::Reject => return Err(FormError::DuplicateKey(entity.key)),
                DuplicateKeyPolicy::Replace => self.entities.retain(|existing| existing.key != entity.key),
                DuplicateKeyPolicy::Allow => {}
            }
        }

        tracing::debug!(key = %entity.key, order = entity.order, "appended form field");

        self.entities.push(entity);
        resort(&mut self.entities);
        Ok(self)
    }

    /// Produce one bound control per item, in form order
    ///
    /// Each control gets the item's display data and a watcher writing edits
    /// back into the item. Items without a layout provider are skipped.
    pub fn get_all_form_views(&mut self, container: &dyn ViewContainer) -> Vec<ViewHandle> {
        let mut views = Vec::with_capacity(self.entities.len());

        for entity in &mut self.entities {
            let Some(layout) = entity.layout.clone() else {
                tracing::warn!(key = %entity.key, "Skipping form field without layout provider");
                continue;
            };

            let mut view = layout.create_view(container);
            layout.bind_data(&mut *view, entity);
            layout.result_watcher(&mut *view, entity.watcher());

            let handle: ViewHandle = Rc::new(RefCell::new(view));
            entity.attach_view(&handle);
            views.push(handle);
        }

        views
    }

    /// Validate every item in order, stopping at the first failure
    ///
    /// An item without a layout provider always fails. A failing validator
    /// gets to display its error through `on_validate_failed`; a passing item
    /// has any inline error on its control cleared.
    pub async fn validate(&self) -> ValidationOutcome {
        self.run_validation(None).await
    }

    /// Like [`validate`](Self::validate), but abandons the chain once `token` is cancelled
    pub async fn validate_until_cancelled(&self, token: &CancellationToken) -> ValidationOutcome {
        self.run_validation(Some(token)).await
    }

    async fn run_validation(&self, cancel: Option<&CancellationToken>) -> ValidationOutcome {
        for entity in &self.entities {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                tracing::debug!(key = %entity.key, "validation cancelled");
                return ValidationOutcome::Cancelled;
            }

            let Some(layout) = entity.layout.as_deref() else {
                tracing::debug!(key = %entity.key, "validation failed: no layout provider");
                return ValidationOutcome::Failed {
                    key: entity.key.clone(),
                };
            };

            let pending = entity.validator.validate(entity.result());
            let passed = match cancel {
                Some(token) => {
                    let finished = tokio::select! {
                        biased;
                        _ = token.cancelled() => None,
                        passed = pending => Some(passed),
                    };
                    match finished {
                        Some(passed) => passed,
                        None => {
                            tracing::debug!(key = %entity.key, "validation cancelled");
                            return ValidationOutcome::Cancelled;
                        }
                    }
                }
                None => pending.await,
            };

            if passed {
                tracing::debug!(key = %entity.key, "validation passed");
                clear_error(entity);
                continue;
            }

            tracing::debug!(key = %entity.key, "validation failed");
            if let Err(mismatch) = entity.validator.on_validate_failed(entity, layout) {
                tracing::error!(
                    "Validator type does not match: validator is {}, but layout provider is {} ({})",
                    entity.validator.name(),
                    layout.name(),
                    mismatch
                );
            }
            return ValidationOutcome::Failed {
                key: entity.key.clone(),
            };
        }

        ValidationOutcome::Passed
    }

    /// Current values keyed by item key; items without a value map to `null`
    ///
    /// Run [`validate`](Self::validate) first if validity matters.
    pub fn get_result(&self) -> HashMap<String, Value> {
        self.entities
            .iter()
            .map(|entity| (entity.key.clone(), entity.result().unwrap_or(Value::Null)))
            .collect()
    }

    /// Materialize the current values into a fresh `T`
    ///
    /// Starts from `T::default()`. Appended items are skipped; fields that
    /// cannot take their value are logged and left at the default.
    pub fn get_data(&self) -> T
    where
        T: Default,
    {
        let mut data = T::default();
        for entity in &self.entities {
            let Some(field_name) = entity.field_name.as_deref() else {
                continue;
            };
            let value = entity.result().unwrap_or(Value::Null);
            if let Err(e) = data.write_field(field_name, value) {
                tracing::warn!(key = %entity.key, "Failed to write form field: {}", e);
            }
        }
        data
    }
}

impl<T> FormManager<T> {
    pub fn find_form_entity_by_key(&self, key: &str) -> Option<&FormItemEntity> {
        self.entities.iter().find(|entity| entity.key == key)
    }

    pub fn find_layout_provider_by_key(&self, key: &str) -> Option<&Arc<dyn LayoutProvider>> {
        self.find_form_entity_by_key(key)?.layout.as_ref()
    }

    pub fn find_validator_by_key(&self, key: &str) -> Option<&Arc<dyn FormItemValidator>> {
        self.find_form_entity_by_key(key).map(|entity| &entity.validator)
    }

    /// Layout provider of `key` as its concrete type
    pub fn find_layout_provider_as<L: LayoutProvider>(&self, key: &str) -> Option<&L> {
        self.find_layout_provider_by_key(key)?.downcast_ref::<L>()
    }

    /// Validator of `key` as its concrete type
    pub fn find_validator_as<V: FormItemValidator>(&self, key: &str) -> Option<&V> {
        self.find_validator_by_key(key)?.downcast_ref::<V>()
    }

    /// Items in rendering/validation order
    pub fn entities(&self) -> &[FormItemEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }
}
