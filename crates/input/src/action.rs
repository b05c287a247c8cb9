use glam::Vec2;

/// A camera gesture for orbit controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Orbit by a pointer delta in physical pixels.
    Rotate(Vec2),
    /// Slide the target by a pointer delta in physical pixels.
    Pan(Vec2),
    /// Signed dolly steps; positive moves the camera away from the target.
    Dolly(f32),
}

/// A high-level action produced from input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Orbit(ControlAction),
    /// Show or hide the debug panel.
    TogglePanel,
    Noop,
}

/// Map a logical key name to an action. `h` toggles the debug panel.
pub fn key_action(key: &str) -> Action {
    if key.eq_ignore_ascii_case("h") {
        Action::TogglePanel
    } else {
        Action::Noop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h_toggles_panel_in_either_case() {
        assert_eq!(key_action("h"), Action::TogglePanel);
        assert_eq!(key_action("H"), Action::TogglePanel);
        assert_eq!(key_action("j"), Action::Noop);
        assert_eq!(key_action("hh"), Action::Noop);
    }

    #[test]
    fn orbit_wraps_control_action() {
        let a = Action::Orbit(ControlAction::Dolly(1.0));
        assert!(matches!(a, Action::Orbit(ControlAction::Dolly(s)) if s > 0.0));
    }
}
