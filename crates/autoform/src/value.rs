//! Result slots shared between a form item and its rendered control

use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Current value of one form item
///
/// Cloning a cell shares the slot, so a control holding a clone writes
/// straight into the owning entity.
#[derive(Debug, Clone, Default)]
pub struct ResultCell(Rc<RefCell<Option<Value>>>);

impl ResultCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current value
    pub fn get(&self) -> Option<Value> {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: Option<Value>) {
        *self.0.borrow_mut() = value;
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }
}

/// Write-back hook a layout provider attaches to its control
///
/// Every user edit should be reported through `update_result`, which stores
/// the value on the form item synchronously.
#[derive(Debug, Clone)]
pub struct ResultWatcher {
    key: Rc<str>,
    cell: ResultCell,
}

impl ResultWatcher {
    pub(crate) fn new(key: &str, cell: ResultCell) -> Self {
        Self {
            key: Rc::from(key),
            cell,
        }
    }

    /// Key of the form item this watcher writes into
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn update_result(&self, result: impl Into<Value>) {
        let result = result.into();
        tracing::trace!(key = %self.key, ?result, "form result updated");
        self.cell.set(Some(result));
    }

    /// Reset the item to "no value"
    pub fn clear_result(&self) {
        tracing::trace!(key = %self.key, "form result cleared");
        self.cell.set(None);
    }
}
