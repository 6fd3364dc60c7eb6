//! # Vermilion Modes
//!
//! Mode and activity orchestration for the Vermilion editor.
//!
//! ## Core Types
//!
//! - [`Activity`] — composable editing behavior with optional per-frame
//!   and viewport-input capabilities
//! - [`Mode`] / [`MajorMode`] — simple active/inactive entities; a major
//!   mode declares the ordered set of activities it requires
//! - [`ModeManager`] — registry, per-frame dispatcher, and viewport-input
//!   arbitrator; owns the journal and the pending-transaction queue
//! - [`PluginActivityTable`] / [`PluginActivity`] — C ABI boundary for
//!   activities provided by dynamically loaded plugins
//!
//! The transaction journal itself lives in `vermilion-core`.
//!
//! ## Frame protocol
//!
//! The host drives a [`ModeManager`] once per frame from its main thread:
//! drain the transaction queue and apply deferred mode switches, dispatch
//! update/render/UI to everything active, then arbitrate hover and drag
//! ownership of the viewport. [`ModeManager::run_frame`] composes the
//! whole sequence; the individual `run_*` methods are available when the
//! host needs to interleave its own work.

pub mod activity;
pub mod manager;
pub mod mode;
pub mod plugin;

pub use activity::{ActiveState, Activity, ActivityExt, AsAny};
pub use manager::{ActivityCache, ActivityHandle, ModeHandle, ModeManager};
pub use mode::{MajorMode, Mode, ModeExt};
pub use plugin::{PluginActivity, PluginActivityTable};
