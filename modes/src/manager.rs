//! Activity and mode orchestration.
//!
//! [`ModeManager`] owns every activity and major-mode instance, the
//! transaction [`Journal`], and the pending-transaction queue. The host
//! drives it once per frame from the main thread:
//!
//! 1. [`update_transaction_queue_and_modes`] drains queued transactions
//!    into the journal and applies a deferred major-mode switch;
//! 2. the `run_*` dispatchers forward update/render/UI work to the active
//!    activities and the current major mode, in registration order;
//! 3. [`run_viewport_hovering`] and [`run_viewport_dragging`] arbitrate
//!    contended viewport input.
//!
//! Activity and mode callbacks execute only inside these methods, on the
//! calling thread. The only cross-thread surface is the transaction
//! queue: any thread may push through the handle returned by
//! [`transaction_queue`], and long-running work communicates its results
//! back exclusively that way.
//!
//! [`update_transaction_queue_and_modes`]: ModeManager::update_transaction_queue_and_modes
//! [`run_viewport_hovering`]: ModeManager::run_viewport_hovering
//! [`run_viewport_dragging`]: ModeManager::run_viewport_dragging
//! [`transaction_queue`]: ModeManager::transaction_queue

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use vermilion_core::journal::{Journal, Transaction, TransactionQueue};
use vermilion_core::view::ViewInteraction;

use crate::activity::{Activity, ActivityExt};
use crate::mode::{MajorMode, ModeExt};

/// Shared handle to an activity instance.
pub type ActivityHandle = Arc<RwLock<dyn Activity>>;

/// Shared handle to a major-mode instance.
pub type ModeHandle = Arc<RwLock<dyn MajorMode>>;

type ActivityFactory = Box<dyn Fn() -> ActivityHandle>;
type ModeFactory = Box<dyn Fn() -> ModeHandle>;

/// Registry and per-frame coordinator for activities and modes.
///
/// Instances are constructed lazily from registered factories on first
/// use and reused thereafter; the manager owns them for its whole
/// lifetime. There is no global instance — the host constructs one
/// manager and passes it to whoever needs it.
pub struct ModeManager {
    activity_factories: HashMap<String, ActivityFactory>,
    mode_factories: HashMap<String, ModeFactory>,
    /// Activity registration order; drives dispatch order and
    /// arbitration tie-breaks.
    activity_order: Vec<String>,
    mode_order: Vec<String>,
    activities: HashMap<String, ActivityHandle>,
    modes: HashMap<String, ModeHandle>,
    /// Names of currently active activities, in registration order.
    active_set: Vec<String>,
    current_mode: Option<String>,
    /// Deferred major-mode switch, applied on the next drain tick.
    pending_mode: Option<String>,
    journal: Journal,
    queue: Arc<TransactionQueue>,
    /// Activity owning the in-flight drag gesture.
    drag_owner: Option<String>,
}

impl ModeManager {
    /// Creates an empty manager with a fresh journal and queue.
    pub fn new() -> Self {
        Self {
            activity_factories: HashMap::new(),
            mode_factories: HashMap::new(),
            activity_order: Vec::new(),
            mode_order: Vec::new(),
            activities: HashMap::new(),
            modes: HashMap::new(),
            active_set: Vec::new(),
            current_mode: None,
            pending_mode: None,
            journal: Journal::new(),
            queue: Arc::new(TransactionQueue::new()),
            drag_owner: None,
        }
    }

    // ---- Registration ----

    /// Registers a named activity factory.
    ///
    /// The instance is constructed on first lookup and reused thereafter.
    /// Registering a name twice intentionally replaces the factory (last
    /// write wins); an already-constructed instance is not replaced.
    pub fn register_activity(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> ActivityHandle + 'static,
    ) {
        let name = name.into();
        if !self.activity_factories.contains_key(&name) {
            self.activity_order.push(name.clone());
        }
        log::debug!("registered activity '{name}'");
        self.activity_factories.insert(name, Box::new(factory));
    }

    /// Registers a named major-mode factory.
    ///
    /// Same replacement semantics as
    /// [`register_activity`](Self::register_activity).
    pub fn register_major_mode(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> ModeHandle + 'static,
    ) {
        let name = name.into();
        if !self.mode_factories.contains_key(&name) {
            self.mode_order.push(name.clone());
        }
        log::debug!("registered major mode '{name}'");
        self.mode_factories.insert(name, Box::new(factory));
    }

    /// Registered activity names, in registration order.
    pub fn activity_names(&self) -> &[String] {
        &self.activity_order
    }

    /// Registered major-mode names, in registration order.
    pub fn major_mode_names(&self) -> &[String] {
        &self.mode_order
    }

    // ---- Lookup ----

    /// Looks up the named activity, constructing it on first use.
    ///
    /// Returns `None` for names that were never registered.
    pub fn find_activity(&mut self, name: &str) -> Option<ActivityHandle> {
        if let Some(handle) = self.activities.get(name) {
            return Some(handle.clone());
        }
        let factory = self.activity_factories.get(name)?;
        let handle = factory();
        self.activities.insert(name.to_string(), handle.clone());
        Some(handle)
    }

    /// Looks up the named major mode, constructing it on first use.
    ///
    /// Returns `None` for names that were never registered.
    pub fn find_mode(&mut self, name: &str) -> Option<ModeHandle> {
        if let Some(handle) = self.modes.get(name) {
            return Some(handle.clone());
        }
        let factory = self.mode_factories.get(name)?;
        let handle = factory();
        self.modes.insert(name.to_string(), handle.clone());
        Some(handle)
    }

    /// Typed activity lookup.
    ///
    /// Runs `f` against the concrete activity type. Returns `None` when
    /// the name is unknown or the instance is not a `T`.
    pub fn with_activity<T, R>(&mut self, name: &str, f: impl FnOnce(&mut T) -> R) -> Option<R>
    where
        T: Activity,
    {
        let handle = self.find_activity(name)?;
        let mut guard = handle.write();
        let concrete = guard.as_any_mut().downcast_mut::<T>()?;
        Some(f(concrete))
    }

    /// Typed major-mode lookup.
    ///
    /// Runs `f` against the concrete mode type. Returns `None` when the
    /// name is unknown or the instance is not a `T`.
    pub fn with_mode<T, R>(&mut self, name: &str, f: impl FnOnce(&mut T) -> R) -> Option<R>
    where
        T: MajorMode,
    {
        let handle = self.find_mode(name)?;
        let mut guard = handle.write();
        let concrete = guard.as_any_mut().downcast_mut::<T>()?;
        Some(f(concrete))
    }

    /// The currently active major mode, or `None` before the first
    /// applied switch.
    pub fn current_major_mode(&self) -> Option<ModeHandle> {
        self.current_mode
            .as_ref()
            .and_then(|name| self.modes.get(name))
            .cloned()
    }

    /// Name of the currently active major mode.
    pub fn current_major_mode_name(&self) -> Option<&str> {
        self.current_mode.as_deref()
    }

    /// Names of currently active activities, in registration order.
    pub fn active_activities(&self) -> &[String] {
        &self.active_set
    }

    // ---- Activation ----

    /// Requests a switch to the named major mode.
    ///
    /// The name is validated here, but the switch is applied on the next
    /// [`update_transaction_queue_and_modes`](Self::update_transaction_queue_and_modes)
    /// tick — never synchronously, so a switch requested from inside a
    /// dispatch callback cannot re-enter activation. Unknown names are
    /// logged and ignored.
    pub fn activate_major_mode(&mut self, name: &str) {
        if self.mode_factories.contains_key(name) {
            self.pending_mode = Some(name.to_string());
        } else {
            log::warn!("cannot activate unknown major mode '{name}'");
        }
    }

    /// Immediately activates the named activity, constructing it on
    /// first use. Unknown names are logged and ignored.
    pub fn activate_activity(&mut self, name: &str) {
        match self.find_activity(name) {
            Some(handle) => {
                handle.write().activate();
                self.rebuild_active_set();
            }
            None => log::warn!("cannot activate unknown activity '{name}'"),
        }
    }

    /// Immediately deactivates the named activity. Unknown names are
    /// logged and ignored.
    pub fn deactivate_activity(&mut self, name: &str) {
        match self.find_activity(name) {
            Some(handle) => {
                handle.write().deactivate();
                self.rebuild_active_set();
            }
            None => log::warn!("cannot deactivate unknown activity '{name}'"),
        }
    }

    // ---- Transactions ----

    /// The shared queue handle, for producers on other threads.
    pub fn transaction_queue(&self) -> Arc<TransactionQueue> {
        self.queue.clone()
    }

    /// Queues a transaction for the next drain tick.
    ///
    /// Convenience forwarding to the shared queue; background producers
    /// should hold their own [`transaction_queue`](Self::transaction_queue)
    /// handle instead.
    pub fn enqueue_transaction(&self, transaction: Transaction) {
        self.queue.push(transaction);
    }

    /// The transaction journal.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Mutable access to the journal, for undo/redo navigation.
    pub fn journal_mut(&mut self) -> &mut Journal {
        &mut self.journal
    }

    /// Drains the pending-transaction queue into the journal, then
    /// applies a deferred major-mode switch.
    ///
    /// Single consumer: the host calls this exactly once per frame from
    /// its main thread. Taking `&mut self` makes a reentrant call a
    /// compile error rather than a data race.
    pub fn update_transaction_queue_and_modes(&mut self) {
        for transaction in self.queue.drain() {
            self.journal.append(transaction);
        }
        self.apply_pending_mode();
    }

    // ---- Per-frame dispatch ----

    /// Runs `update` on every active activity and the current major
    /// mode, in registration order.
    pub fn run_updates(&self) {
        for handle in self.active_handles() {
            handle.write().update();
        }
        if let Some(mode) = self.current_major_mode() {
            mode.write().update();
        }
    }

    /// Runs `render` on every active activity and the current major mode.
    pub fn run_mode_rendering(&self, interaction: &ViewInteraction) {
        for handle in self.active_handles() {
            handle.write().render(interaction);
        }
        if let Some(mode) = self.current_major_mode() {
            mode.write().render(interaction);
        }
    }

    /// Runs `run_ui` on every active activity and the current major mode.
    pub fn run_mode_uis(&self, interaction: &ViewInteraction) {
        for handle in self.active_handles() {
            handle.write().run_ui(interaction);
        }
        if let Some(mode) = self.current_major_mode() {
            mode.write().run_ui(interaction);
        }
    }

    /// Runs `main_menu` on every active activity and the current major
    /// mode.
    pub fn run_main_menu(&self) {
        for handle in self.active_handles() {
            handle.write().main_menu();
        }
        if let Some(mode) = self.current_major_mode() {
            mode.write().main_menu();
        }
    }

    /// Runs `tool_bar` on every active activity and the current major
    /// mode.
    pub fn run_tool_bars(&self) {
        for handle in self.active_handles() {
            handle.write().tool_bar();
        }
        if let Some(mode) = self.current_major_mode() {
            mode.write().tool_bar();
        }
    }

    /// Arbitrates hover ownership and forwards the interaction to the
    /// winner.
    ///
    /// Every active activity bids each frame; negative bids abstain. The
    /// highest bid wins, ties going to the earlier-registered activity.
    /// No winner means no call, and the winner may change from frame to
    /// frame as bids change.
    pub fn run_viewport_hovering(&self, interaction: &ViewInteraction) {
        if let Some((_, handle)) =
            self.highest_bidder(interaction, |activity, i| activity.viewport_hover_bid(i))
        {
            handle.write().viewport_hovering(interaction);
        }
    }

    /// Forwards drag interactions to the gesture owner.
    ///
    /// Ownership is arbitrated only on a frame with
    /// [`start`](ViewInteraction::start) set, by the same rules as
    /// hovering. The winner then receives every frame of the gesture
    /// regardless of later bids — even if it is deactivated mid-gesture —
    /// until the frame with [`end`](ViewInteraction::end) set has been
    /// delivered, which releases ownership.
    ///
    /// A gesture that never ends keeps ownership indefinitely; closing
    /// every gesture is the host's contract. A new `start` frame always
    /// re-opens arbitration.
    pub fn run_viewport_dragging(&mut self, interaction: &ViewInteraction) {
        if interaction.start {
            self.drag_owner = self
                .highest_bidder(interaction, |activity, i| activity.viewport_drag_bid(i))
                .map(|(name, _)| name);
        }
        if let Some(owner) = &self.drag_owner
            && let Some(handle) = self.activities.get(owner)
        {
            handle.write().viewport_dragging(interaction);
        }
        if interaction.end {
            self.drag_owner = None;
        }
    }

    /// One full host tick in canonical order: queue drain and deferred
    /// mode switch, then update/render/UI dispatch, then viewport
    /// arbitration.
    pub fn run_frame(&mut self, interaction: &ViewInteraction) {
        self.update_transaction_queue_and_modes();
        self.run_updates();
        self.run_mode_rendering(interaction);
        self.run_mode_uis(interaction);
        self.run_viewport_hovering(interaction);
        self.run_viewport_dragging(interaction);
    }

    // ---- Internals ----

    fn apply_pending_mode(&mut self) {
        let Some(name) = self.pending_mode.take() else {
            return;
        };
        if let Some(previous) = self.current_mode.take()
            && let Some(handle) = self.modes.get(&previous)
        {
            handle.write().deactivate();
        }
        let Some(mode) = self.find_mode(&name) else {
            log::warn!("major mode '{name}' disappeared before activation");
            return;
        };
        let (configuration, exclusive) = {
            let guard = mode.read();
            let configuration: Vec<String> = guard
                .mode_configuration()
                .iter()
                .map(|s| s.to_string())
                .collect();
            (configuration, guard.must_deactivate_unrelated())
        };
        if exclusive {
            for active in self.active_set.clone() {
                if !configuration.contains(&active) {
                    self.deactivate_activity(&active);
                }
            }
        }
        for activity in &configuration {
            let already_active = self
                .activities
                .get(activity)
                .is_some_and(|handle| handle.read().is_active());
            if !already_active {
                self.activate_activity(activity);
            }
        }
        mode.write().activate();
        log::info!("switched to major mode '{name}'");
        self.current_mode = Some(name);
    }

    fn rebuild_active_set(&mut self) {
        self.active_set = self
            .activity_order
            .iter()
            .filter(|name| {
                self.activities
                    .get(*name)
                    .is_some_and(|handle| handle.read().is_active())
            })
            .cloned()
            .collect();
    }

    fn active_handles(&self) -> Vec<ActivityHandle> {
        self.active_set
            .iter()
            .filter_map(|name| self.activities.get(name))
            .cloned()
            .collect()
    }

    /// Highest non-negative bidder among active activities, ties going
    /// to the earlier-registered one.
    fn highest_bidder<F>(
        &self,
        interaction: &ViewInteraction,
        bid: F,
    ) -> Option<(String, ActivityHandle)>
    where
        F: Fn(&dyn Activity, &ViewInteraction) -> i32,
    {
        let mut winner: Option<(i32, String, ActivityHandle)> = None;
        for name in &self.active_set {
            let Some(handle) = self.activities.get(name) else {
                continue;
            };
            let value = bid(&*handle.read(), interaction);
            if value >= 0 && winner.as_ref().is_none_or(|(best, _, _)| value > *best) {
                winner = Some((value, name.clone(), handle.clone()));
            }
        }
        winner.map(|(_, name, handle)| (name, handle))
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeManager")
            .field("activities", &self.activity_order.len())
            .field("major_modes", &self.mode_order.len())
            .field("active_set", &self.active_set)
            .field("current_mode", &self.current_mode)
            .field("pending_mode", &self.pending_mode)
            .field("drag_owner", &self.drag_owner)
            .finish_non_exhaustive()
    }
}

/// Cached handle to a named activity.
///
/// The weak handle is only a hint: when it no longer upgrades, `resolve`
/// falls back to a registry lookup and refreshes the hint. The cache
/// never keeps an activity alive and never constructs one on its own —
/// construction, if needed, happens inside the manager's registry.
pub struct ActivityCache {
    name: String,
    handle: Option<Weak<RwLock<dyn Activity>>>,
}

impl ActivityCache {
    /// Creates an unresolved cache for the named activity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: None,
        }
    }

    /// The cached activity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a strong handle, re-resolving through the registry when
    /// the cached hint is gone. `None` when the name is not registered.
    pub fn resolve(&mut self, manager: &mut ModeManager) -> Option<ActivityHandle> {
        if let Some(weak) = &self.handle
            && let Some(strong) = weak.upgrade()
        {
            return Some(strong);
        }
        let handle = manager.find_activity(&self.name)?;
        self.handle = Some(Arc::downgrade(&handle));
        Some(handle)
    }
}

impl fmt::Debug for ActivityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self
            .handle
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0);
        f.debug_struct("ActivityCache")
            .field("name", &self.name)
            .field("resolved", &resolved)
            .finish()
    }
}
