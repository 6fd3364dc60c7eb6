//! C ABI plugin boundary.
//!
//! A dynamically loaded plugin exposes an activity to the host as a
//! fixed-layout table of optional function slots bound to an opaque
//! instance pointer. The host fills a [`PluginActivityTable`] once per
//! loaded plugin and wraps it in a [`PluginActivity`], which adapts the
//! table to the [`Activity`] trait so the
//! [`ModeManager`](crate::ModeManager) can drive it like any native
//! activity.
//!
//! Unset slots are silent no-ops; unset bid slots abstain. Allocation
//! ownership never crosses the boundary: the plugin allocates and frees
//! its own instance, and the name string is borrowed from the plugin for
//! the table's whole lifetime.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

use vermilion_core::view::ViewInteraction;

use crate::activity::{ActiveState, Activity};

/// Slot taking only the instance pointer.
pub type PluginHook = Option<unsafe extern "C" fn(*mut c_void)>;

/// Slot taking the instance pointer and the current interaction.
pub type PluginViewHook = Option<unsafe extern "C" fn(*mut c_void, *const ViewInteraction)>;

/// Bid slot: returns the priority, negative to abstain.
pub type PluginBidHook = Option<unsafe extern "C" fn(*mut c_void, *const ViewInteraction) -> c_int>;

/// Fixed-layout capability table a plugin fills in.
///
/// Every function slot is optional; a `None` slot is skipped when the
/// host dispatches. The `name` string is borrowed from the plugin and
/// must outlive the table. The `active` flag mirrors the host-side
/// activation state so the plugin can observe it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PluginActivityTable {
    pub activate: PluginHook,
    pub deactivate: PluginHook,
    pub update: PluginHook,
    pub render: PluginViewHook,
    pub run_ui: PluginViewHook,
    pub menu: PluginHook,
    pub tool_bar: PluginHook,
    pub hover_bid: PluginBidHook,
    pub hovering: PluginViewHook,
    pub drag_bid: PluginBidHook,
    pub dragging: PluginViewHook,
    /// Display name; not owned by the table.
    pub name: *const c_char,
    /// Mirrors the host-side activation flag.
    pub active: bool,
}

impl Default for PluginActivityTable {
    /// An empty table: every slot unset, no name, inactive.
    fn default() -> Self {
        Self {
            activate: None,
            deactivate: None,
            update: None,
            render: None,
            run_ui: None,
            menu: None,
            tool_bar: None,
            hover_bid: None,
            hovering: None,
            drag_bid: None,
            dragging: None,
            name: ptr::null(),
            active: false,
        }
    }
}

/// Adapter driving a plugin-provided capability table as an [`Activity`].
pub struct PluginActivity {
    table: PluginActivityTable,
    instance: *mut c_void,
    name: String,
    state: ActiveState,
}

impl PluginActivity {
    /// Wraps a plugin capability table around its instance pointer.
    ///
    /// The name is copied out of the table at construction so later
    /// lookups need no FFI access.
    ///
    /// # Safety
    ///
    /// - `instance` must remain valid for every slot call for the
    ///   adapter's whole lifetime, and the slots must tolerate being
    ///   called from the host's main thread.
    /// - `table.name`, when non-null, must point to a NUL-terminated
    ///   string that is valid at construction time.
    pub unsafe fn new(table: PluginActivityTable, instance: *mut c_void) -> Self {
        let name = if table.name.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(table.name) }
                .to_string_lossy()
                .into_owned()
        };
        Self {
            table,
            instance,
            name,
            state: ActiveState::default(),
        }
    }

    /// The capability table, with `active` reflecting the current state.
    pub fn table(&self) -> &PluginActivityTable {
        &self.table
    }

    fn call(&self, slot: PluginHook) {
        if let Some(f) = slot {
            unsafe { f(self.instance) };
        }
    }

    fn call_view(&self, slot: PluginViewHook, interaction: &ViewInteraction) {
        if let Some(f) = slot {
            unsafe { f(self.instance, interaction) };
        }
    }

    fn bid(&self, slot: PluginBidHook, interaction: &ViewInteraction) -> i32 {
        match slot {
            Some(f) => unsafe { f(self.instance, interaction) },
            None => -1,
        }
    }
}

impl Activity for PluginActivity {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &ActiveState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActiveState {
        &mut self.state
    }

    fn on_activate(&mut self) {
        self.table.active = true;
        self.call(self.table.activate);
    }

    fn on_deactivate(&mut self) {
        self.table.active = false;
        self.call(self.table.deactivate);
    }

    fn update(&mut self) {
        self.call(self.table.update);
    }

    fn render(&mut self, interaction: &ViewInteraction) {
        self.call_view(self.table.render, interaction);
    }

    fn run_ui(&mut self, interaction: &ViewInteraction) {
        self.call_view(self.table.run_ui, interaction);
    }

    fn main_menu(&mut self) {
        self.call(self.table.menu);
    }

    fn tool_bar(&mut self) {
        self.call(self.table.tool_bar);
    }

    fn viewport_hover_bid(&self, interaction: &ViewInteraction) -> i32 {
        self.bid(self.table.hover_bid, interaction)
    }

    fn viewport_hovering(&mut self, interaction: &ViewInteraction) {
        self.call_view(self.table.hovering, interaction);
    }

    fn viewport_drag_bid(&self, interaction: &ViewInteraction) -> i32 {
        self.bid(self.table.drag_bid, interaction)
    }

    fn viewport_dragging(&mut self, interaction: &ViewInteraction) {
        self.call_view(self.table.dragging, interaction);
    }
}
