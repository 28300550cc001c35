// File: src/entity.rs
// Purpose: Per-field form item descriptor and ad-hoc item builder

use crate::pool::ProviderPool;
use crate::provider::{FormItemValidator, FormView, LayoutProvider, ViewHandle};
use crate::validators::RequiredValidator;
use crate::value::{ResultCell, ResultWatcher};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// One form item: display metadata, current value and its strategies
pub struct FormItemEntity {
    /// Lookup key and key in the result map
    pub key: String,
    /// Backing field on the schema type; `None` for appended items
    pub field_name: Option<String>,
    pub label: String,
    pub hint: String,
    /// Rendering and validation position
    pub order: f32,
    /// `None` when neither the field nor the form names a layout
    pub layout: Option<Arc<dyn LayoutProvider>>,
    pub validator: Arc<dyn FormItemValidator>,
    result: ResultCell,
    view: Option<Weak<RefCell<Box<dyn FormView>>>>,
}

impl FormItemEntity {
    pub fn new(key: impl Into<String>, validator: Arc<dyn FormItemValidator>) -> Self {
        Self {
            key: key.into(),
            field_name: None,
            label: String::new(),
            hint: String::new(),
            order: 0.0,
            layout: None,
            validator,
            result: ResultCell::new(),
            view: None,
        }
    }

    /// Current value, if any
    pub fn result(&self) -> Option<Value> {
        self.result.get()
    }

    pub fn set_result(&self, result: Option<Value>) {
        self.result.set(result);
    }

    /// Hook that writes edits into this item's result
    pub fn watcher(&self) -> ResultWatcher {
        ResultWatcher::new(&self.key, self.result.clone())
    }

    /// Control produced for this item by the last view pass, if still alive
    pub fn view(&self) -> Option<ViewHandle> {
        self.view.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn attach_view(&mut self, view: &ViewHandle) {
        self.view = Some(Rc::downgrade(view));
    }
}

impl fmt::Debug for FormItemEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormItemEntity")
            .field("key", &self.key)
            .field("field_name", &self.field_name)
            .field("label", &self.label)
            .field("hint", &self.hint)
            .field("order", &self.order)
            .field("layout", &self.layout.as_ref().map(|layout| layout.name()))
            .field("validator", &self.validator.name())
            .field("result", &self.result.get())
            .finish()
    }
}

/// A form item added at runtime, with no backing schema field
///
/// ```ignore
/// manager.append(
///     DynamicFormItem::new("coupon")
///         .label("Coupon")
///         .order(2.5)
///         .layout(pool.layout::<TextLayout>())
///         .validator(pool.validator::<PassValidator>()),
/// )?;
/// ```
#[derive(Clone)]
pub struct DynamicFormItem {
    key: String,
    label: String,
    hint: String,
    order: f32,
    layout: Option<Arc<dyn LayoutProvider>>,
    validator: Option<Arc<dyn FormItemValidator>>,
}

impl DynamicFormItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            hint: String::new(),
            order: 0.0,
            layout: None,
            validator: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn order(mut self, order: f32) -> Self {
        self.order = order;
        self
    }

    pub fn layout(mut self, layout: Arc<dyn LayoutProvider>) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Defaults to the pool's `RequiredValidator`
    pub fn validator(mut self, validator: Arc<dyn FormItemValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub(crate) fn into_entity(self, pool: &ProviderPool) -> FormItemEntity {
        let validator = self
            .validator
            .unwrap_or_else(|| pool.validator::<RequiredValidator>());

        let mut entity = FormItemEntity::new(self.key, validator);
        entity.label = self.label;
        entity.hint = self.hint;
        entity.order = self.order;
        entity.layout = self.layout;
        entity
    }
}

impl fmt::Debug for DynamicFormItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicFormItem")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("hint", &self.hint)
            .field("order", &self.order)
            .field("layout", &self.layout.as_ref().map(|layout| layout.name()))
            .field("validator", &self.validator.as_ref().map(|validator| validator.name()))
            .finish()
    }
}
