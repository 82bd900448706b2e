use float_pretty_print::PrettyPrintFloat;
use three_d::egui::{
    Align2, Area, Color32, Context, FontId, Label, RichText, TextWrapMode, Ui,
};

use crate::{
    app::{AppState, STATUS_DURATION},
    control::HoverSource,
    gui::declare_id,
    sim::universe::Id,
    units::format_duration,
};

declare_id!(HELP_AREA, b"HelpText");
declare_id!(STATUS_AREA, b"StatusLn");

const MARGIN: f32 = 10.0;
const FONT_SIZE: f32 = 14.0;
const BACKGROUND_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 128);

/// Seconds over which an expiring status message fades out.
const FADE_TIME: f64 = 1.0;

const INSTRUCTIONS: &[&str] = &[
    "ESC: Exit | SPACE: Pause/Resume",
    "T: Toggle Trails | R: Reset | C: Toggle UI",
    "+/-: Speed Up/Slow Down Time (0.01x - 100x)",
    "./,: Faster/Slower Movement (0.1x - 10x)",
    "Arrow Keys: Rotate View",
    "WASD: Move Camera (relative to view)",
    "Q/E: Move Backward/Forward",
    "L: Lock onto Hovered Body | G: Land on Hovered Body",
    "Ctrl+S: Save System | Ctrl+O: Load System",
];

fn body_name(app: &AppState, id: Id) -> &str {
    app.sim
        .universe
        .get_body(id)
        .map_or("?", |body| body.name.as_str())
}

fn status_lines(app: &AppState) -> Vec<String> {
    let clock = &app.sim.clock;
    let camera = &app.camera;
    let position = camera.position() / 1e11;
    let (yaw, pitch) = camera.angles();

    let mut lines = vec![
        format!(
            "Trails: {}",
            if app.sim.trails.is_enabled() { "ON" } else { "OFF" }
        ),
        format!(
            "Time: {:.2}x{}",
            clock.multiplier(),
            if clock.is_paused() { " (PAUSED)" } else { "" }
        ),
        format!("Elapsed: {}", format_duration(clock.elapsed())),
        format!("Move Speed: {:.2}x", camera.speed_multiplier()),
        format!(
            "Position: ({:.1}, {:.1}, {:.1}) ×10¹¹ m",
            position.x, position.y, position.z
        ),
        format!(
            "Rotation: (Pitch: {:.1}°, Yaw: {:.1}°)",
            pitch.to_degrees().rem_euclid(360.0),
            yaw.to_degrees().rem_euclid(360.0)
        ),
    ];

    let mode = camera.mode();
    lines.push(match mode.target() {
        Some(id) => format!("Camera: {} ({})", mode.name(), body_name(app, id)),
        None => format!("Camera: {}", mode.name()),
    });

    if let Some(id) = app.picker.current_hover_target()
        && let Some(body) = app.sim.universe.get_body(id)
    {
        let distance = body.position.distance(camera.position());
        lines.push(format!(
            "Hovered: {} ({:.3} m away)",
            body.name,
            PrettyPrintFloat(distance)
        ));
    }

    lines
}

fn text_label(string: String, color: Color32) -> Label {
    let text = RichText::new(string)
        .background_color(BACKGROUND_COLOR.gamma_multiply(color.a() as f32 / 255.0))
        .color(color)
        .font(FontId::monospace(FONT_SIZE));
    Label::new(text)
        .wrap_mode(TextWrapMode::Extend)
        .selectable(false)
}

fn help_inner(ui: &mut Ui, app: &AppState) {
    let lines = INSTRUCTIONS
        .iter()
        .map(|&line| line.to_owned())
        .chain(status_lines(app));
    for line in lines {
        ui.add(text_label(line, Color32::WHITE));
    }
}

pub(super) fn draw_help(ctx: &Context, app: &AppState) {
    Area::new(*HELP_AREA_ID)
        .constrain_to(ctx.screen_rect())
        .fixed_pos((MARGIN, MARGIN))
        .interactable(false)
        .show(ctx, |ui| help_inner(ui, app));
}

/// Opacity of a status message `age` seconds after it was posted.
fn status_alpha(age: f64) -> f32 {
    let remaining = STATUS_DURATION - age;
    (remaining / FADE_TIME).clamp(0.0, 1.0) as f32
}

pub(super) fn draw_status(ctx: &Context, app: &AppState) {
    let Some(status) = app.status() else {
        return;
    };
    let alpha = status_alpha(app.wall_time() - status.posted_at);
    let color = Color32::WHITE.gamma_multiply(alpha);

    Area::new(*STATUS_AREA_ID)
        .constrain_to(ctx.screen_rect())
        .anchor(Align2::LEFT_BOTTOM, (MARGIN, -MARGIN))
        .interactable(false)
        .show(ctx, |ui| {
            ui.add(text_label(status.text.clone(), color));
        });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cfg::{Preferences, storage::PrefsStore, system::SystemConfig};
    use crate::keybinds::Action;

    fn state() -> AppState {
        AppState::new(
            SystemConfig::default_system(),
            PathBuf::from("unused.json"),
            Preferences::new(PrefsStore::detached()),
        )
    }

    #[test]
    fn status_lines_describe_the_state() {
        let mut app = state();
        let lines = status_lines(&app);
        assert_eq!(lines[0], "Trails: ON");
        assert_eq!(lines[1], "Time: 1.00x");
        assert_eq!(lines[4], "Position: (0.0, 0.0, -11.0) ×10¹¹ m");
        assert_eq!(lines[5], "Rotation: (Pitch: 0.0°, Yaw: 0.0°)");
        assert_eq!(lines[6], "Camera: Normal");

        app.apply(Action::TogglePause);
        app.apply(Action::ToggleTrails);
        let lines = status_lines(&app);
        assert_eq!(lines[0], "Trails: OFF");
        assert_eq!(lines[1], "Time: 1.00x (PAUSED)");
    }

    #[test]
    fn status_fades_at_the_end() {
        assert_eq!(status_alpha(0.0), 1.0);
        assert_eq!(status_alpha(STATUS_DURATION), 0.0);
        let mid = status_alpha(STATUS_DURATION - FADE_TIME / 2.0);
        assert!((mid - 0.5).abs() < 1e-6);
    }
}
