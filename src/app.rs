//! Per-run application state and the frame pipeline, independent of the
//! window so it can be driven headlessly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    cfg::{
        Preferences,
        saved_cell::SavedCell,
        storage::SaveError as PrefsSaveError,
        system::{self, SystemConfig},
    },
    control::{CameraController, HoverSource},
    gfx::{
        picking::PointerPicker,
        projection::Projector,
        scene::{OFFSCREEN_MARGIN, Scene},
    },
    keybinds::{Action, HeldKeys},
    sim::Simulation,
};

/// Seconds a status message stays on screen.
pub const STATUS_DURATION: f64 = 4.0;

/// Longer frames are treated as this long by the camera, so a stall does
/// not fling it across the system.
const MAX_FRAME_TIME: f64 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    /// Wall-clock seconds since start.
    pub posted_at: f64,
}

pub struct AppState {
    pub sim: Simulation,
    pub camera: CameraController,
    pub projector: Projector,
    pub picker: PointerPicker,
    pub held: HeldKeys,
    pub show_ui: bool,
    distance_scale: f64,
    snapshot_path: PathBuf,
    status: Option<StatusMessage>,
    prefs: Preferences,
    scene: Scene,
    wall_time: f64,
}

fn persist<T>(cell: &SavedCell<T>, value: T)
where
    T: Serialize + for<'d> Deserialize<'d> + Copy + PartialEq,
{
    match cell.set(value) {
        Ok(()) | Err(PrefsSaveError::NoSaveDirectory) => (),
        Err(e) => tracing::warn!("Failed to save preference: {e}"),
    }
}

impl AppState {
    pub fn new(config: SystemConfig, snapshot_path: PathBuf, prefs: Preferences) -> Self {
        let mut sim = Simulation::new(config.universe, config.params);
        sim.trails.set_enabled(prefs.show_trails.get());

        let mut camera = CameraController::default();
        camera.set_speed_multiplier(prefs.movement_speed.get());

        Self {
            sim,
            camera,
            projector: Projector::default(),
            picker: PointerPicker::default(),
            held: HeldKeys::default(),
            show_ui: prefs.show_ui.get(),
            distance_scale: config.distance_scale,
            snapshot_path,
            status: None,
            prefs,
            scene: Scene::default(),
            wall_time: 0.0,
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    pub fn post_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            posted_at: self.wall_time,
        });
    }

    /// The current status message, if it hasn't expired.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status
            .as_ref()
            .filter(|status| self.wall_time - status.posted_at < STATUS_DURATION)
    }

    /// Applies one discrete action. Returns `true` when the app should quit.
    pub fn apply(&mut self, action: Action) -> bool {
        tracing::debug!("Action: {}", <&'static str>::from(action));

        match action {
            Action::Quit => return true,
            Action::TogglePause => {
                let paused = self.sim.clock.toggle_pause();
                tracing::info!("Simulation {}", if paused { "paused" } else { "resumed" });
            }
            Action::ToggleTrails => {
                let enabled = self.sim.trails.toggle();
                // Start the fresh trails from where the bodies are now.
                self.sim.trails.observe(&self.sim.universe);
                persist(&self.prefs.show_trails, enabled);
            }
            Action::ToggleUi => {
                self.show_ui ^= true;
                persist(&self.prefs.show_ui, self.show_ui);
            }
            Action::ToggleLock => {
                self.camera.toggle_lock(&self.picker, &self.sim.universe);
            }
            Action::ToggleAnchor => {
                self.camera.toggle_anchor(&self.picker, &self.sim.universe);
            }
            Action::Reset => {
                self.sim.reset();
                self.camera.set_speed_multiplier(1.0);
                persist(&self.prefs.movement_speed, 1.0);
                tracing::info!("Simulation reset");
                self.post_status("Simulation reset");
            }
            Action::TimeFaster => self.sim.clock.speed_up(),
            Action::TimeSlower => self.sim.clock.slow_down(),
            Action::MoveFaster => {
                self.camera.speed_up();
                persist(&self.prefs.movement_speed, self.camera.speed_multiplier());
            }
            Action::MoveSlower => {
                self.camera.slow_down();
                persist(&self.prefs.movement_speed, self.camera.speed_multiplier());
            }
            Action::SaveSnapshot => self.save_snapshot(),
            Action::LoadSnapshot => self.load_snapshot(),
        }

        false
    }

    fn save_snapshot(&mut self) {
        let path = self.snapshot_path.display().to_string();
        match system::save_system(&self.sim, self.distance_scale, &self.snapshot_path) {
            Ok(()) => self.post_status(format!("Saved to {path}")),
            Err(e) => {
                tracing::error!("Failed to save {path}: {e}");
                self.post_status(format!("Could not save {path}: {e}"));
            }
        }
    }

    fn load_snapshot(&mut self) {
        let path = self.snapshot_path.display().to_string();
        match system::load_system(&self.snapshot_path) {
            Ok(config) => {
                let count = config.universe.len();
                self.sim.load(config.universe, config.params);
                self.distance_scale = config.distance_scale;
                self.camera.release();
                tracing::info!("Loaded {count} bodies from {path}");
                self.post_status(format!("Loaded {count} bodies from {path}"));
            }
            Err(e) => {
                tracing::warn!("Failed to load {path}: {e}");
                self.post_status(format!("Could not load {path}: {e}"));
            }
        }
    }

    /// Runs one frame: hover picking, one simulation tick, camera motion
    /// and scene projection. `width` and `height` are in logical pixels.
    pub fn frame(&mut self, dt: f64, width: f64, height: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.wall_time += dt;
        self.projector.resize(width, height);

        self.picker.update(
            &self.sim.universe,
            &self.camera.view(),
            &self.projector,
            OFFSCREEN_MARGIN,
        );

        self.sim.step();

        self.camera.update(
            &self.held.camera_input(),
            dt.min(MAX_FRAME_TIME),
            &self.sim.universe,
        );

        self.scene = Scene::build(
            &self.sim,
            &self.camera.view(),
            &self.projector,
            self.sim.trails.is_enabled(),
            self.picker.current_hover_target(),
        );
    }
}
