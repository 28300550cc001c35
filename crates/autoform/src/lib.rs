//! # autoform
//!
//! Declarative data-entry forms. Describe a form as a plain struct, and
//! `autoform` discovers its fields, orders them, asks your UI toolkit for one
//! control per field, writes edits back, validates the result and hands it
//! back as the struct or as a key/value map.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use autoform::{Form, FormManager, PassValidator};
//!
//! #[derive(Default, Form)]
//! #[form(layout = TextLayout)]
//! struct Signup {
//!     #[form_field(label = "Name", order = 1)]
//!     name: String,
//!
//!     #[form_field(key = "mail", label = "Email", order = 2)]
//!     email: String,
//!
//!     #[form_field(label = "Referral", order = 3, validator = PassValidator)]
//!     referral: Option<String>,
//! }
//!
//! let mut form = FormManager::<Signup>::build()?;
//! for view in form.get_all_form_views(&screen) {
//!     screen.mount(view);
//! }
//!
//! // later, on submit
//! if form.validate().await.is_passed() {
//!     let signup: Signup = form.get_data();
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`schema`] - the [`FormSchema`] description (usually `#[derive(Form)]`) and extraction into items
//! - [`entity`] - [`FormItemEntity`], one per field, plus [`DynamicFormItem`] for runtime additions
//! - [`pool`] - [`ProviderPool`], one shared instance per strategy type
//! - [`provider`] - the [`LayoutProvider`] / [`FormItemValidator`] / [`HintProvider`] seams
//! - [`manager`] - [`FormManager`], ordering, binding, validation and results
//!
//! Widgets themselves live in the host toolkit; the crate only defines the
//! contracts they implement.

pub mod config;
pub mod entity;
pub mod error;
pub mod manager;
pub mod pool;
pub mod provider;
pub mod schema;
pub mod validators;
pub mod value;

pub use autoform_derive::Form;

pub use config::{DuplicateKeyPolicy, FormConfig};
pub use entity::{DynamicFormItem, FormItemEntity};
pub use error::{FieldAccessError, FormError, ProviderMismatch};
pub use manager::{FormManager, ValidationOutcome};
pub use pool::{ProviderPool, ProviderRef};
pub use provider::{
    downcast_layout, AsAny, FormItemValidator, FormView, HintProvider, LayoutProvider, ViewContainer,
    ViewHandle,
};
pub use schema::{FieldSpec, FormAttrs, FormSchema};
pub use validators::{PassValidator, RequiredValidator};
pub use value::{ResultCell, ResultWatcher};

// Re-exported for implementors of async validators
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
