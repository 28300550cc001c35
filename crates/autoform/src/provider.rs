//! Strategy contracts a UI toolkit implements to plug into a form
//!
//! The core never knows what a control is. A [`LayoutProvider`] turns a form
//! item into an opaque [`FormView`] inside an opaque [`ViewContainer`]; a
//! [`FormItemValidator`] judges a value and may report errors on that view.
//! Toolkits recover their concrete types with the `downcast_*` helpers.
//!
//! Providers are shared through the [`ProviderPool`](crate::ProviderPool), one
//! instance per type, so implementations must not keep per-form state.

use crate::entity::FormItemEntity;
use crate::error::ProviderMismatch;
use crate::value::ResultWatcher;
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Type-erased access to the concrete type behind a trait object
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Mount point handed to layout providers when creating controls
pub trait ViewContainer: AsAny {}

impl dyn ViewContainer {
    pub fn downcast_ref<C: ViewContainer>(&self) -> Option<&C> {
        self.as_any().downcast_ref()
    }
}

/// A control produced for one form item
pub trait FormView: AsAny {
    /// Show or clear an inline error
    fn set_error(&mut self, message: Option<&str>) {
        let _ = message;
    }
}

impl dyn FormView {
    pub fn downcast_ref<V: FormView>(&self) -> Option<&V> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<V: FormView>(&mut self) -> Option<&mut V> {
        self.as_any_mut().downcast_mut()
    }
}

/// Shared handle to a produced control
pub type ViewHandle = Rc<RefCell<Box<dyn FormView>>>;

/// Produces and binds the control for a form item
pub trait LayoutProvider: AsAny + Send + Sync {
    /// Create a fresh control inside `container`
    fn create_view(&self, container: &dyn ViewContainer) -> Box<dyn FormView>;

    /// Copy label, hint and current value of `entity` into the control
    fn bind_data(&self, view: &mut dyn FormView, entity: &FormItemEntity);

    /// Attach the write-back hook; the control calls it on every edit
    fn result_watcher(&self, view: &mut dyn FormView, watcher: ResultWatcher);

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn LayoutProvider {
    pub fn downcast_ref<L: LayoutProvider>(&self) -> Option<&L> {
        self.as_any().downcast_ref()
    }
}

/// Recover a concrete layout provider, reporting a mismatch otherwise
///
/// Validators call this from `on_validate_failed` when they need a specific
/// layout to display their error.
pub fn downcast_layout<L: LayoutProvider>(layout: &dyn LayoutProvider) -> Result<&L, ProviderMismatch> {
    layout.downcast_ref::<L>().ok_or_else(|| ProviderMismatch {
        expected: std::any::type_name::<L>(),
        found: layout.name(),
    })
}

/// Judges the value of a form item
///
/// `validate` may complete on a later turn of the event loop (awaiting a
/// network check, a dialog, ...). The form waits for it before moving on.
#[async_trait(?Send)]
pub trait FormItemValidator: AsAny + Send + Sync {
    async fn validate(&self, result: Option<Value>) -> bool;

    /// Display the failure for `entity` through its layout provider
    fn on_validate_failed(
        &self,
        entity: &FormItemEntity,
        layout: &dyn LayoutProvider,
    ) -> Result<(), ProviderMismatch> {
        let _ = (entity, layout);
        Ok(())
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn FormItemValidator {
    pub fn downcast_ref<V: FormItemValidator>(&self) -> Option<&V> {
        self.as_any().downcast_ref()
    }
}

/// Supplies hint text for items that declare none
pub trait HintProvider: AsAny + Send + Sync {
    fn hint(&self, key: &str, label: &str) -> Option<String>;
}
