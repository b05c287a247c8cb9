use crate::ControlAction;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Rotate,
    Pan,
    Dolly,
}

/// Tracks the active drag gesture and turns pointer motion into
/// [`ControlAction`]s.
///
/// Primary drag rotates (pans while the pan modifier is held), secondary drag
/// pans and middle drag dollies. The gesture is fixed when its button goes
/// down and ends when that button is released.
#[derive(Debug, Default)]
pub struct PointerState {
    gesture: Option<(PointerButton, Gesture)>,
    last: Option<Vec2>,
    pan_modifier: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift, Ctrl or Meta held: primary drag pans.
    pub fn set_pan_modifier(&mut self, held: bool) {
        self.pan_modifier = held;
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        match (pressed, self.gesture) {
            (true, None) => {
                let gesture = match button {
                    PointerButton::Primary if self.pan_modifier => Gesture::Pan,
                    PointerButton::Primary => Gesture::Rotate,
                    PointerButton::Secondary => Gesture::Pan,
                    PointerButton::Middle => Gesture::Dolly,
                };
                tracing::trace!(?button, ?gesture, "pointer gesture started");
                self.gesture = Some((button, gesture));
            }
            (false, Some((active, _))) if active == button => {
                self.gesture = None;
            }
            _ => {}
        }
    }

    /// A button event the UI overlay claimed. Presses start nothing, but a
    /// release still ends the drag its button began.
    pub fn ui_button(&mut self, button: PointerButton, pressed: bool) {
        if !pressed {
            self.button(button, false);
        }
    }

    /// Record a new pointer position (physical pixels). Returns the action
    /// for the active gesture, if any.
    pub fn moved(&mut self, position: Vec2) -> Option<ControlAction> {
        let previous = self.last.replace(position)?;
        let (_, gesture) = self.gesture?;
        let delta = position - previous;
        if delta == Vec2::ZERO {
            return None;
        }
        Some(match gesture {
            Gesture::Rotate => ControlAction::Rotate(delta),
            Gesture::Pan => ControlAction::Pan(delta),
            Gesture::Dolly => {
                if delta.y == 0.0 {
                    return None;
                }
                ControlAction::Dolly(delta.y.signum())
            }
        })
    }

    /// Wheel motion with positive `delta_y` meaning scroll down (toward the
    /// user). One dolly step per event regardless of magnitude.
    pub fn wheel(&mut self, delta_y: f32) -> Option<ControlAction> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return None;
        }
        Some(ControlAction::Dolly(delta_y.signum()))
    }

    /// The pointer left the window; the next motion starts fresh.
    pub fn left(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(state: &mut PointerState, button: PointerButton, from: Vec2, to: Vec2) -> Option<ControlAction> {
        state.moved(from);
        state.button(button, true);
        let action = state.moved(to);
        state.button(button, false);
        action
    }

    #[test]
    fn motion_without_button_does_nothing() {
        let mut state = PointerState::new();
        assert_eq!(state.moved(Vec2::ZERO), None);
        assert_eq!(state.moved(Vec2::new(5.0, 5.0)), None);
    }

    #[test]
    fn buttons_map_to_gestures() {
        let mut state = PointerState::new();
        let (a, b) = (Vec2::new(10.0, 10.0), Vec2::new(13.0, 6.0));
        assert_eq!(
            drag(&mut state, PointerButton::Primary, a, b),
            Some(ControlAction::Rotate(Vec2::new(3.0, -4.0)))
        );
        assert_eq!(
            drag(&mut state, PointerButton::Secondary, b, a),
            Some(ControlAction::Pan(Vec2::new(-3.0, 4.0)))
        );
        assert_eq!(
            drag(&mut state, PointerButton::Middle, a, b),
            Some(ControlAction::Dolly(-1.0))
        );
        assert!(!state.is_dragging());
    }

    #[test]
    fn release_over_ui_ends_drag() {
        let mut state = PointerState::new();
        state.moved(Vec2::ZERO);
        state.button(PointerButton::Primary, true);
        state.ui_button(PointerButton::Primary, false);
        assert!(!state.is_dragging());
        assert_eq!(state.moved(Vec2::X), None);

        state.ui_button(PointerButton::Secondary, true);
        assert!(!state.is_dragging());
    }

    #[test]
    fn modifier_turns_primary_drag_into_pan() {
        let mut state = PointerState::new();
        state.set_pan_modifier(true);
        let action = drag(&mut state, PointerButton::Primary, Vec2::ZERO, Vec2::X);
        assert_eq!(action, Some(ControlAction::Pan(Vec2::X)));
    }

    #[test]
    fn second_button_does_not_steal_gesture() {
        let mut state = PointerState::new();
        state.moved(Vec2::ZERO);
        state.button(PointerButton::Primary, true);
        state.button(PointerButton::Secondary, true);
        assert_eq!(state.moved(Vec2::X), Some(ControlAction::Rotate(Vec2::X)));
        state.button(PointerButton::Secondary, false);
        assert!(state.is_dragging());
        state.button(PointerButton::Primary, false);
        assert!(!state.is_dragging());
    }

    #[test]
    fn wheel_emits_single_signed_step() {
        let mut state = PointerState::new();
        assert_eq!(state.wheel(120.0), Some(ControlAction::Dolly(1.0)));
        assert_eq!(state.wheel(-3.0), Some(ControlAction::Dolly(-1.0)));
        assert_eq!(state.wheel(0.0), None);
    }

    #[test]
    fn leaving_window_resets_motion_origin() {
        let mut state = PointerState::new();
        state.moved(Vec2::ZERO);
        state.button(PointerButton::Primary, true);
        state.left();
        assert_eq!(state.moved(Vec2::new(50.0, 0.0)), None);
        assert_eq!(
            state.moved(Vec2::new(51.0, 0.0)),
            Some(ControlAction::Rotate(Vec2::X))
        );
    }
}
