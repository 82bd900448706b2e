use glam::{DVec2, DVec3};
use strum_macros::IntoStaticStr;
use three_d::{Event, Key, Modifiers};

use super::control::CameraInput;

/// A discrete command triggered by a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum Action {
    Quit,
    TogglePause,
    ToggleTrails,
    ToggleUi,
    ToggleLock,
    ToggleAnchor,
    Reset,
    TimeFaster,
    TimeSlower,
    MoveFaster,
    MoveSlower,
    SaveSnapshot,
    LoadSnapshot,
}

pub(crate) fn action_for_key(key: Key, modifiers: &Modifiers) -> Option<Action> {
    if modifiers.ctrl || modifiers.command {
        return match key {
            Key::S => Some(Action::SaveSnapshot),
            Key::O => Some(Action::LoadSnapshot),
            _ => None,
        };
    }

    match key {
        Key::Escape => Some(Action::Quit),
        Key::Space => Some(Action::TogglePause),
        Key::T => Some(Action::ToggleTrails),
        Key::C => Some(Action::ToggleUi),
        Key::L => Some(Action::ToggleLock),
        Key::G => Some(Action::ToggleAnchor),
        Key::R => Some(Action::Reset),
        _ => None,
    }
}

/// Symbol keys go through text input so they work on any layout.
pub(crate) fn action_for_char(char: char) -> Option<Action> {
    match char {
        '+' | '=' => Some(Action::TimeFaster),
        '-' => Some(Action::TimeSlower),
        '.' => Some(Action::MoveFaster),
        ',' => Some(Action::MoveSlower),
        _ => None,
    }
}

/// Movement and rotation keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    turn_left: bool,
    turn_right: bool,
    look_up: bool,
    look_down: bool,
}

impl HeldKeys {
    /// Returns whether the key is a movement key.
    pub fn set(&mut self, key: Key, pressed: bool) -> bool {
        let slot = match key {
            Key::W => &mut self.up,
            Key::S => &mut self.down,
            Key::A => &mut self.left,
            Key::D => &mut self.right,
            Key::Q => &mut self.backward,
            Key::E => &mut self.forward,
            Key::ArrowLeft => &mut self.turn_left,
            Key::ArrowRight => &mut self.turn_right,
            Key::ArrowUp => &mut self.look_up,
            Key::ArrowDown => &mut self.look_down,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    pub fn camera_input(&self) -> CameraInput {
        let axis = |positive: bool, negative: bool| f64::from(positive) - f64::from(negative);
        CameraInput {
            movement: DVec3::new(
                axis(self.right, self.left),
                axis(self.up, self.down),
                axis(self.forward, self.backward),
            ),
            rotation: DVec2::new(
                axis(self.turn_right, self.turn_left),
                axis(self.look_up, self.look_down),
            ),
        }
    }
}

/// Drains key events into held-key state and a list of actions, in the
/// order they happened.
pub(crate) fn handle_keybinds(
    held: &mut HeldKeys,
    events: &mut [Event],
    wants_keyboard_input: bool,
) -> Vec<Action> {
    let mut actions = Vec::new();

    for event in events {
        match event {
            Event::KeyPress {
                kind,
                modifiers,
                handled,
            } => {
                if *handled {
                    continue;
                }
                if let Some(action) = action_for_key(*kind, modifiers) {
                    actions.push(action);
                    *handled = true;
                } else if !modifiers.ctrl && !modifiers.command && held.set(*kind, true) {
                    *handled = true;
                }
            }
            Event::KeyRelease { kind, .. } => {
                held.set(*kind, false);
            }
            Event::Text(text) => {
                if wants_keyboard_input {
                    continue;
                }
                actions.extend(text.chars().filter_map(action_for_char));
            }
            _ => (),
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key) -> Event {
        Event::KeyPress {
            kind: key,
            modifiers: Modifiers::default(),
            handled: false,
        }
    }

    fn release(key: Key) -> Event {
        Event::KeyRelease {
            kind: key,
            modifiers: Modifiers::default(),
            handled: false,
        }
    }

    #[test]
    fn ctrl_selects_snapshot_actions() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert_eq!(action_for_key(Key::S, &ctrl), Some(Action::SaveSnapshot));
        assert_eq!(action_for_key(Key::O, &ctrl), Some(Action::LoadSnapshot));
        assert_eq!(action_for_key(Key::S, &Modifiers::default()), None);
        assert_eq!(action_for_key(Key::T, &ctrl), None);
    }

    #[test]
    fn events_become_actions_in_order() {
        let mut held = HeldKeys::default();
        let mut events = vec![
            press(Key::Space),
            Event::Text("+-.,x".into()),
            press(Key::Escape),
        ];
        let actions = handle_keybinds(&mut held, &mut events, false);
        assert_eq!(
            actions,
            [
                Action::TogglePause,
                Action::TimeFaster,
                Action::TimeSlower,
                Action::MoveFaster,
                Action::MoveSlower,
                Action::Quit,
            ]
        );

        let mut events = vec![Event::Text("+".into())];
        assert!(handle_keybinds(&mut held, &mut events, true).is_empty());
    }

    #[test]
    fn held_keys_drive_camera_input() {
        let mut held = HeldKeys::default();
        let mut events = vec![press(Key::W), press(Key::D), press(Key::ArrowLeft), press(Key::E)];
        handle_keybinds(&mut held, &mut events, false);

        let input = held.camera_input();
        assert_eq!(input.movement, DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(input.rotation, DVec2::new(-1.0, 0.0));

        let mut events = vec![release(Key::W), press(Key::S)];
        handle_keybinds(&mut held, &mut events, false);
        assert_eq!(held.camera_input().movement.y, -1.0);

        let mut events = vec![
            release(Key::S),
            release(Key::D),
            release(Key::ArrowLeft),
            release(Key::E),
        ];
        handle_keybinds(&mut held, &mut events, false);
        assert_eq!(held.camera_input(), CameraInput::default());
    }
}
