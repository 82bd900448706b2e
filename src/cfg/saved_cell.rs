use std::cell::Cell;
use std::rc::Rc;

use crate::cfg::storage::{self, PrefsStore};
use serde::{Deserialize, Serialize};

/// A value mirrored into the preferences file under `key`.
///
/// The stored value is read lazily on first access; a missing or
/// unreadable entry leaves the default in place.
pub struct SavedCell<T>
where
    T: Serialize + for<'d> Deserialize<'d>,
{
    key: &'static str,
    cell: Cell<T>,
    uninit: Cell<bool>,
    store: Rc<PrefsStore>,
}

impl<T> SavedCell<T>
where
    T: Serialize + for<'d> Deserialize<'d> + Copy + PartialEq,
{
    pub fn new(key: &'static str, default: T, store: Rc<PrefsStore>) -> Self {
        Self {
            key,
            cell: Cell::new(default),
            uninit: Cell::new(true),
            store,
        }
    }

    pub fn get(&self) -> T {
        if self.uninit.get() {
            self.uninit.set(false);
            if let Err(e) = self.load() {
                tracing::debug!("Preference {} not loaded: {e}", self.key);
            }
        }

        self.cell.get()
    }

    pub fn set(&self, value: T) -> Result<(), storage::SaveError> {
        let old = self.get();
        if old == value {
            return Ok(());
        }
        self.cell.set(value);
        self.save()
    }

    pub fn save(&self) -> Result<(), storage::SaveError> {
        self.store.save(self.key, self.cell.get())
    }

    pub fn load(&self) -> Result<T, storage::LoadError> {
        let res = self.store.load(self.key)?;
        self.uninit.set(false);
        self.cell.set(res);
        Ok(res)
    }
}
