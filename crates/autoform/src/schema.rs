// File: src/schema.rs
// Purpose: Schema description trait and extraction of form items from it

use crate::entity::FormItemEntity;
use crate::error::{FieldAccessError, FormError};
use crate::pool::{ProviderPool, ProviderRef};
use crate::provider::{FormItemValidator, HintProvider, LayoutProvider};
use crate::validators::RequiredValidator;
use serde_json::Value;

/// A data type that describes a form
///
/// Implemented by `#[derive(Form)]`; can also be written by hand.
pub trait FormSchema: Sized + 'static {
    /// Form-wide defaults; `None` when the type is not marked as a form
    fn form_attrs() -> Option<FormAttrs>;

    /// One spec per form field, in declaration order
    fn field_specs() -> Vec<FieldSpec>;

    /// Current value of a form field
    fn read_field(&self, field_name: &str) -> Result<Value, FieldAccessError>;

    /// Overwrite a form field
    fn write_field(&mut self, field_name: &str, value: Value) -> Result<(), FieldAccessError>;
}

/// Form-wide defaults from the `#[form]` marker
#[derive(Debug, Clone, Default)]
pub struct FormAttrs {
    pub layout: Option<ProviderRef<dyn LayoutProvider>>,
    pub validator: Option<ProviderRef<dyn FormItemValidator>>,
    pub hint_provider: Option<ProviderRef<dyn HintProvider>>,
}

/// Declaration of one form field from `#[form_field]`
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field_name: &'static str,
    pub key: &'static str,
    pub label: &'static str,
    pub hint: &'static str,
    pub order: f32,
    pub layout: Option<ProviderRef<dyn LayoutProvider>>,
    pub validator: Option<ProviderRef<dyn FormItemValidator>>,
    pub hint_provider: Option<ProviderRef<dyn HintProvider>>,
}

impl FieldSpec {
    /// Spec keyed by the field's own name, everything else empty
    pub fn new(field_name: &'static str) -> Self {
        Self {
            field_name,
            key: field_name,
            label: "",
            hint: "",
            order: 0.0,
            layout: None,
            validator: None,
            hint_provider: None,
        }
    }

    pub fn key(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn hint(mut self, hint: &'static str) -> Self {
        self.hint = hint;
        self
    }

    pub fn order(mut self, order: f32) -> Self {
        self.order = order;
        self
    }

    pub fn layout<L: LayoutProvider + Default>(mut self) -> Self {
        self.layout = Some(ProviderRef::layout::<L>());
        self
    }

    pub fn validator<V: FormItemValidator + Default>(mut self) -> Self {
        self.validator = Some(ProviderRef::validator::<V>());
        self
    }

    pub fn hint_provider<H: HintProvider + Default>(mut self) -> Self {
        self.hint_provider = Some(ProviderRef::hint_provider::<H>());
        self
    }
}

/// Build one form item per declared field of `T`, in declaration order
///
/// Strategy resolution falls back field → form default; a missing validator
/// becomes `RequiredValidator`, a missing layout stays `None`.
pub fn extract<T: FormSchema>(pool: &ProviderPool) -> Result<Vec<FormItemEntity>, FormError> {
    let form = T::form_attrs().ok_or(FormError::MissingFormMarker {
        type_name: std::any::type_name::<T>(),
    })?;

    Ok(T::field_specs()
        .into_iter()
        .map(|spec| materialize(&form, spec, pool))
        .collect())
}

fn materialize(form: &FormAttrs, spec: FieldSpec, pool: &ProviderPool) -> FormItemEntity {
    let validator = match spec.validator.as_ref().or(form.validator.as_ref()) {
        Some(validator) => pool.resolve_validator(validator),
        None => pool.validator::<RequiredValidator>(),
    };

    let hint = if spec.hint.is_empty() {
        spec.hint_provider
            .as_ref()
            .or(form.hint_provider.as_ref())
            .and_then(|provider| pool.resolve_hint_provider(provider).hint(spec.key, spec.label))
            .unwrap_or_default()
    } else {
        spec.hint.to_string()
    };

    let mut entity = FormItemEntity::new(spec.key, validator);
    entity.field_name = Some(spec.field_name.to_string());
    entity.label = spec.label.to_string();
    entity.hint = hint;
    entity.order = spec.order;
    entity.layout = spec
        .layout
        .as_ref()
        .or(form.layout.as_ref())
        .map(|layout| pool.resolve_layout(layout));

    if entity.layout.is_none() {
        tracing::debug!(key = %entity.key, "form field has no layout provider");
    }

    entity
}
