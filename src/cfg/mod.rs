use std::rc::Rc;

pub mod saved_cell;
pub mod storage;
pub mod system;

use saved_cell::SavedCell;
use storage::PrefsStore;

/// User preferences that outlive a run.
pub struct Preferences {
    pub show_ui: SavedCell<bool>,
    pub show_trails: SavedCell<bool>,
    pub movement_speed: SavedCell<f64>,
}

impl Preferences {
    pub fn new(store: PrefsStore) -> Self {
        let store = Rc::new(store);
        Self {
            show_ui: SavedCell::new("gravity_sim_demo::show_ui", true, Rc::clone(&store)),
            show_trails: SavedCell::new("gravity_sim_demo::show_trails", true, Rc::clone(&store)),
            movement_speed: SavedCell::new("gravity_sim_demo::movement_speed", 1.0, store),
        }
    }

    /// Preferences stored in the platform config directory.
    pub fn load_default() -> Self {
        Self::new(PrefsStore::from_project_dirs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let prefs = Preferences::new(PrefsStore::in_dir(dir.path()));
        assert!(prefs.show_ui.get());
        prefs.show_ui.set(false).unwrap();
        prefs.movement_speed.set(2.25).unwrap();

        let prefs = Preferences::new(PrefsStore::in_dir(dir.path()));
        assert!(!prefs.show_ui.get());
        assert!(prefs.show_trails.get());
        assert_eq!(prefs.movement_speed.get(), 2.25);
    }

    #[test]
    fn detached_store_keeps_defaults() {
        let prefs = Preferences::new(PrefsStore::detached());
        assert!(prefs.show_trails.get());
        assert!(prefs.show_trails.set(false).is_err());
        // The in-memory value still changes.
        assert!(!prefs.show_trails.get());
    }
}
