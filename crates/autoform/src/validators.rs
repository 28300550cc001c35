//! Built-in validators

use crate::entity::FormItemEntity;
use crate::error::ProviderMismatch;
use crate::provider::{FormItemValidator, LayoutProvider};
use async_trait::async_trait;
use serde_json::Value;

pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Whether a value counts as "filled in"
///
/// Null, blank strings and empty arrays/objects are empty; numbers and
/// booleans always have content.
pub fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Default validator: the item must have a non-empty value
#[derive(Debug, Default, Clone, Copy)]
pub struct RequiredValidator;

#[async_trait(?Send)]
impl FormItemValidator for RequiredValidator {
    async fn validate(&self, result: Option<Value>) -> bool {
        result.as_ref().is_some_and(has_content)
    }

    fn on_validate_failed(
        &self,
        entity: &FormItemEntity,
        _layout: &dyn LayoutProvider,
    ) -> Result<(), ProviderMismatch> {
        if let Some(view) = entity.view() {
            if let Ok(mut view) = view.try_borrow_mut() {
                view.set_error(Some(REQUIRED_MESSAGE));
            }
        }
        Ok(())
    }
}

/// Accepts every value; opts an item out of the required check
#[derive(Debug, Default, Clone, Copy)]
pub struct PassValidator;

#[async_trait(?Send)]
impl FormItemValidator for PassValidator {
    async fn validate(&self, _result: Option<Value>) -> bool {
        true
    }
}
