//! The egui layer: the painted scene underneath, text overlays on top.

use glam::DVec2;
use three_d::{
    Context as ThreeDContext, Event as ThreeDEvent, GUI, Srgba, Viewport,
    egui::{Color32, Context as EguiContext},
};

use crate::app::AppState;

mod overlay;
mod painter;

macro_rules! declare_id {
    ($name:ident, $val:expr) => {
        ::pastey::paste! {
            const [<$name _SALT>]: ::core::num::NonZeroU64 =
                ::core::num::NonZeroU64::new(u64::from_be_bytes(*$val)).unwrap();
            static [<$name _ID>]: ::std::sync::LazyLock<::three_d::egui::Id> =
                ::std::sync::LazyLock::new(|| ::three_d::egui::Id::new([<$name _SALT>]));
        }
    };
}
use declare_id;

pub(crate) fn create(context: &ThreeDContext) -> GUI {
    GUI::new(context)
}

#[inline]
pub(crate) fn color32(color: Srgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub(crate) fn update(
    gui: &mut GUI,
    app: &mut AppState,
    events: &mut Vec<ThreeDEvent>,
    accumulated_time_ms: f64,
    viewport: Viewport,
    device_pixel_ratio: f32,
) -> bool {
    gui.update(
        events,
        accumulated_time_ms,
        viewport,
        device_pixel_ratio,
        |ctx| handle_ui(ctx, app),
    )
}

fn handle_ui(ctx: &EguiContext, app: &mut AppState) {
    // Read back for next frame's hover picking.
    let pointer = ctx
        .input(|input| input.pointer.hover_pos())
        .map(|pos| DVec2::new(pos.x as f64, pos.y as f64));
    app.picker.set_pointer(pointer);

    painter::paint_scene(ctx, app.scene());

    if app.show_ui {
        overlay::draw_help(ctx, app);
    }
    overlay::draw_status(ctx, app);
}
