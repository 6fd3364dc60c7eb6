//! Editing modes and major modes.
//!
//! A [`Mode`] is the simplest lifecycle entity: active or inactive, with
//! overridable hooks on each transition. A [`MajorMode`] additionally
//! configures the workspace — it names the ordered set of activities
//! that must be active while it is current, and may claim exclusivity so
//! that switching to it deactivates everything unrelated.
//!
//! As with activities, the flag transition is owned by the blanket
//! [`ModeExt`] entry points, never by the hooks.

use vermilion_core::view::ViewInteraction;

use crate::activity::{ActiveState, AsAny};

/// Simple active/inactive lifecycle entity.
pub trait Mode: AsAny {
    /// Stable display name; also the registry key under which the mode
    /// was registered.
    fn name(&self) -> &str;

    /// Shared activation flag storage.
    fn state(&self) -> &ActiveState;

    /// Mutable access to the activation flag storage.
    fn state_mut(&mut self) -> &mut ActiveState;

    /// Whether the mode is currently active.
    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Hook invoked after the mode has been marked active.
    fn on_activate(&mut self) {}

    /// Hook invoked after the mode has been marked inactive.
    fn on_deactivate(&mut self) {}
}

/// Non-overridable activation entry points for [`Mode`] objects.
///
/// Blanket-implemented for every `Mode`, so the flag transition always
/// happens regardless of what the hooks do.
pub trait ModeExt {
    /// Marks the mode active, then runs [`Mode::on_activate`].
    fn activate(&mut self);

    /// Marks the mode inactive, then runs [`Mode::on_deactivate`].
    fn deactivate(&mut self);
}

impl<M: Mode + ?Sized> ModeExt for M {
    fn activate(&mut self) {
        self.state_mut().set_active(true);
        self.on_activate();
    }

    fn deactivate(&mut self) {
        self.state_mut().set_active(false);
        self.on_deactivate();
    }
}

/// A mode that configures the workspace.
///
/// While a major mode is current, the activities named by
/// [`mode_configuration`](Self::mode_configuration) are kept active. At
/// most one major mode is current at a time; switching is always deferred
/// to the next queue-drain tick (see
/// [`ModeManager::activate_major_mode`](crate::ModeManager::activate_major_mode)).
pub trait MajorMode: Mode {
    /// Ordered names of the activities this mode requires active while
    /// it is current.
    fn mode_configuration(&self) -> &[&str];

    /// Whether switching to this mode deactivates every activity outside
    /// its configuration. Defaults to `true`.
    fn must_deactivate_unrelated(&self) -> bool {
        true
    }

    /// Per-frame logic update. Default: no-op.
    fn update(&mut self) {}

    /// Renders into the main viewport. Default: no-op.
    fn render(&mut self, _interaction: &ViewInteraction) {}

    /// Runs the mode's UI (panels, overlays). Default: no-op.
    fn run_ui(&mut self, _interaction: &ViewInteraction) {}

    /// Contributes to the main menu. Default: no-op.
    fn main_menu(&mut self) {}

    /// Contributes to the toolbar. Default: no-op.
    fn tool_bar(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sculpt {
        state: ActiveState,
        transitions: Vec<&'static str>,
    }

    impl Mode for Sculpt {
        fn name(&self) -> &str {
            "sculpt"
        }

        fn state(&self) -> &ActiveState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ActiveState {
            &mut self.state
        }

        fn on_activate(&mut self) {
            self.transitions.push("activate");
        }

        fn on_deactivate(&mut self) {
            self.transitions.push("deactivate");
        }
    }

    impl MajorMode for Sculpt {
        fn mode_configuration(&self) -> &[&str] {
            &["brush", "symmetry"]
        }
    }

    #[test]
    fn lifecycle_flag_and_hooks() {
        let mut mode = Sculpt::default();
        assert!(!mode.is_active());
        mode.activate();
        assert!(mode.is_active());
        mode.deactivate();
        assert!(!mode.is_active());
        assert_eq!(mode.transitions, ["activate", "deactivate"]);
    }

    #[test]
    fn major_mode_defaults_to_exclusive() {
        let mode = Sculpt::default();
        assert!(mode.must_deactivate_unrelated());
        assert_eq!(mode.mode_configuration(), ["brush", "symmetry"]);
    }
}
