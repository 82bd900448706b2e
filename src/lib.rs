use std::path::{Path, PathBuf};

use three_d::{
    ClearState, FrameInput, FrameOutput, GUI,
    window::{Window, WindowSettings},
};

use self::{
    app::AppState,
    cfg::{
        Preferences,
        system::{self, DEFAULT_SNAPSHOT_PATH},
    },
};

pub mod app;
pub mod camera;
pub mod cfg;
pub mod control;
pub mod gfx;
mod gui;
pub mod keybinds;
pub mod sim;
pub mod units;

pub(crate) struct Program {
    window: Option<Window>,
    gui: GUI,
    state: AppState,
}

impl Program {
    fn new_window() -> Window {
        let res = Window::new(WindowSettings {
            title: "Gravity Simulation Demo".into(),
            min_size: (64, 64),
            ..Default::default()
        });
        match res {
            Ok(w) => w,
            Err(e) => {
                tracing::error!("Error when creating window: {e}");
                std::process::exit(1);
            }
        }
    }

    pub(crate) fn new(state: AppState) -> Self {
        let window = Self::new_window();
        let gui = gui::create(&window.gl());

        Self {
            window: Some(window),
            gui,
            state,
        }
    }

    pub(crate) fn run(mut self) {
        if let Some(window) = self.window.take() {
            window.render_loop(move |frame_input| self.tick(frame_input));
        }
    }

    fn tick(&mut self, mut frame_input: FrameInput) -> FrameOutput {
        let wants_keyboard_input = self.gui.context().wants_keyboard_input();
        let actions = keybinds::handle_keybinds(
            &mut self.state.held,
            &mut frame_input.events,
            wants_keyboard_input,
        );
        for action in actions {
            if self.state.apply(action) {
                tracing::info!("Exiting");
                return FrameOutput {
                    exit: true,
                    ..Default::default()
                };
            }
        }

        let dpr = f64::from(frame_input.device_pixel_ratio);
        self.state.frame(
            frame_input.elapsed_time / 1000.0,
            f64::from(frame_input.viewport.width) / dpr,
            f64::from(frame_input.viewport.height) / dpr,
        );

        gui::update(
            &mut self.gui,
            &mut self.state,
            &mut frame_input.events,
            frame_input.accumulated_time,
            frame_input.viewport,
            frame_input.device_pixel_ratio,
        );

        let screen = frame_input.screen();
        let res = screen
            .clear(ClearState::color_and_depth(0.0, 0.0, 0.0, 1.0, 1.0))
            .write(|| self.gui.render());
        if let Err(e) = res {
            tracing::error!("Failed to draw frame: {e}");
        }

        FrameOutput::default()
    }
}

/// Opens the window and runs until the user quits.
///
/// `system_path` is read at startup and is where snapshots are saved and loaded.
/// Without it, `system.json` in the working directory plays that role. A file
/// that is missing or invalid at startup is replaced by the built-in solar system.
pub fn run(system_path: Option<&Path>) {
    let (config, message) = system::load_or_default(system_path);
    let snapshot_path =
        system_path.map_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH), Path::to_path_buf);

    let mut state = AppState::new(config, snapshot_path, Preferences::load_default());
    if let Some(message) = message {
        state.post_status(message);
    }

    tracing::info!(
        bodies = state.sim.universe.len(),
        snapshot = %state.snapshot_path().display(),
        "Starting simulation"
    );
    Program::new(state).run();
}
