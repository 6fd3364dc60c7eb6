//! Composable editing activities.
//!
//! An [`Activity`] is a unit of editing behavior that the
//! [`ModeManager`](crate::ModeManager) can activate independently, drive
//! every frame, and let compete for viewport input. Every capability has
//! a default no-op body, so concrete activities override only what they
//! need — a manipulator gizmo might implement only the bid and drag
//! methods, a stats overlay only `run_ui`.
//!
//! Activation goes through [`ActivityExt::activate`] /
//! [`ActivityExt::deactivate`]: blanket-implemented entry points that set
//! the active flag before invoking the overridable
//! [`on_activate`](Activity::on_activate) /
//! [`on_deactivate`](Activity::on_deactivate) hooks, so the flag stays
//! consistent even when a hook does nothing.
//!
//! # Bidding for viewport input
//!
//! Hover and drag ownership are contended: each active activity returns a
//! priority from [`viewport_hover_bid`](Activity::viewport_hover_bid) /
//! [`viewport_drag_bid`](Activity::viewport_drag_bid), where a negative
//! value abstains. A manipulator hovering under the cursor would outbid
//! the model part behind it, which in turn outbids the sky background.

use std::any::Any;

use vermilion_core::view::ViewInteraction;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Used by the typed
/// manager lookups ([`ModeManager::with_activity`]) to check that a named
/// entity actually is the requested concrete type.
///
/// [`ModeManager::with_activity`]: crate::ModeManager::with_activity
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Activation flag shared by activities and modes.
///
/// The flag is only mutated by the [`ActivityExt`] /
/// [`ModeExt`](crate::ModeExt) entry points; hooks observe the already
/// updated value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveState {
    active: bool,
}

impl ActiveState {
    /// Whether the owner is currently active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Composable unit of editing behavior.
///
/// Required methods supply the identity ([`name`](Self::name)) and the
/// shared flag storage ([`state`](Self::state)); everything else is an
/// optional capability with a documented default no-op. Unimplemented
/// capabilities are silently skipped by the dispatcher.
pub trait Activity: AsAny {
    /// Stable display name; also the registry key under which the
    /// activity was registered.
    fn name(&self) -> &str;

    /// Shared activation flag storage.
    fn state(&self) -> &ActiveState;

    /// Mutable access to the activation flag storage.
    fn state_mut(&mut self) -> &mut ActiveState;

    /// Whether the activity is currently active.
    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Hook invoked after the activity has been marked active.
    fn on_activate(&mut self) {}

    /// Hook invoked after the activity has been marked inactive.
    fn on_deactivate(&mut self) {}

    /// Per-frame logic update. Default: no-op.
    fn update(&mut self) {}

    /// Renders into the main viewport. Default: no-op.
    fn render(&mut self, _interaction: &ViewInteraction) {}

    /// Runs the activity's UI (panels, overlays). Default: no-op.
    fn run_ui(&mut self, _interaction: &ViewInteraction) {}

    /// Contributes to the main menu. Default: no-op.
    fn main_menu(&mut self) {}

    /// Contributes to the toolbar. Default: no-op.
    fn tool_bar(&mut self) {}

    /// Bid for ownership of the current hover interaction.
    ///
    /// Negative means the activity is not bidding. Default: `-1`.
    fn viewport_hover_bid(&self, _interaction: &ViewInteraction) -> i32 {
        -1
    }

    /// Called while this activity owns the hover interaction.
    fn viewport_hovering(&mut self, _interaction: &ViewInteraction) {}

    /// Bid for ownership of a starting drag gesture.
    ///
    /// Negative means the activity is not bidding. Default: `-1`.
    fn viewport_drag_bid(&self, _interaction: &ViewInteraction) -> i32 {
        -1
    }

    /// Called for every frame of a drag gesture this activity owns.
    fn viewport_dragging(&mut self, _interaction: &ViewInteraction) {}
}

/// Non-overridable activation entry points for [`Activity`] objects.
///
/// Blanket-implemented for every `Activity`, so the flag transition
/// always happens regardless of what the hooks do.
pub trait ActivityExt {
    /// Marks the activity active, then runs [`Activity::on_activate`].
    fn activate(&mut self);

    /// Marks the activity inactive, then runs [`Activity::on_deactivate`].
    fn deactivate(&mut self);
}

impl<A: Activity + ?Sized> ActivityExt for A {
    fn activate(&mut self) {
        self.state_mut().set_active(true);
        self.on_activate();
    }

    fn deactivate(&mut self) {
        self.state_mut().set_active(false);
        self.on_deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        state: ActiveState,
        hook_saw_active: Option<bool>,
    }

    impl Activity for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn state(&self) -> &ActiveState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ActiveState {
            &mut self.state
        }

        fn on_activate(&mut self) {
            self.hook_saw_active = Some(self.state.is_active());
        }

        fn on_deactivate(&mut self) {
            self.hook_saw_active = Some(self.state.is_active());
        }
    }

    #[test]
    fn flag_is_set_before_hooks_run() {
        let mut probe = Probe::default();
        probe.activate();
        assert!(probe.is_active());
        assert_eq!(probe.hook_saw_active, Some(true));

        probe.deactivate();
        assert!(!probe.is_active());
        assert_eq!(probe.hook_saw_active, Some(false));
    }

    #[test]
    fn entry_points_work_through_trait_objects() {
        let mut boxed: Box<dyn Activity> = Box::new(Probe::default());
        boxed.activate();
        assert!(boxed.is_active());
        boxed.deactivate();
        assert!(!boxed.is_active());
    }

    #[test]
    fn default_capabilities_are_inert() {
        let mut probe = Probe::default();
        let interaction = ViewInteraction::default();
        probe.update();
        probe.render(&interaction);
        probe.run_ui(&interaction);
        probe.main_menu();
        probe.tool_bar();
        probe.viewport_hovering(&interaction);
        probe.viewport_dragging(&interaction);
        assert_eq!(probe.viewport_hover_bid(&interaction), -1);
        assert_eq!(probe.viewport_drag_bid(&interaction), -1);
    }

    #[test]
    fn downcast_through_as_any() {
        let mut boxed: Box<dyn Activity> = Box::new(Probe::default());
        assert!(boxed.as_any().downcast_ref::<Probe>().is_some());
        assert!(boxed.as_any_mut().downcast_mut::<Probe>().is_some());
    }
}
