use std::time::Instant;

use tracing::trace;

use super::replay::Record;
use crate::common::config::{Config, DockingSettings, NotchSettings};
use crate::layout_engine::dock::{self, DockResolver, NotchTarget};
use crate::model::registry::WindowRegistry;
use crate::model::window::{WindowId, WindowState};
use crate::sys::screen::{DisplayDescriptor, DisplayId};

/// Manages window state and lifecycle
#[derive(Default)]
pub struct WindowManager {
    pub registry: WindowRegistry,
}

impl WindowManager {
    pub fn window(&self, id: WindowId) -> Option<&WindowState> { self.registry.get(id) }
}

/// Manages the known displays and their notch targets
pub struct DisplayManager {
    /// Primary display first.
    pub displays: Vec<DisplayDescriptor>,
    pub resolver: DockResolver,
}

impl DisplayManager {
    pub fn new(settings: &DockingSettings) -> Self {
        DisplayManager {
            displays: Vec::new(),
            resolver: DockResolver::new(settings),
        }
    }

    pub fn set_displays(&mut self, displays: Vec<DisplayDescriptor>, notch: &NotchSettings) {
        self.displays = displays;
        self.refresh_targets(notch);
    }

    pub fn refresh_targets(&mut self, notch: &NotchSettings) {
        self.resolver.set_targets(dock::notch_targets(&self.displays, notch));
    }

    pub fn is_known(&self, id: DisplayId) -> bool { self.displays.iter().any(|d| d.id == id) }

    pub fn get(&self, id: DisplayId) -> Option<&DisplayDescriptor> {
        self.displays.iter().find(|d| d.id == id)
    }

    pub fn primary(&self) -> Option<&DisplayDescriptor> { self.displays.first() }

    /// `id` if it is still known, otherwise the primary display.
    pub fn resolve(&self, id: Option<DisplayId>) -> Option<&DisplayDescriptor> {
        id.and_then(|id| self.get(id)).or_else(|| self.primary())
    }

    pub fn notch_target(&self, id: DisplayId) -> Option<NotchTarget> {
        let display = self.resolve(Some(id))?;
        self.resolver.target_for_display(display.id)
    }
}

/// Manages content refreshes scheduled after a restore
#[derive(Default, Debug)]
pub struct RefreshManager {
    pending: Vec<(WindowId, Instant)>,
}

impl RefreshManager {
    pub fn schedule(&mut self, window: WindowId, at: Instant) {
        self.cancel(window);
        trace!(?window, "scheduling content refresh");
        self.pending.push((window, at));
    }

    pub fn cancel(&mut self, window: WindowId) { self.pending.retain(|(w, _)| *w != window); }

    pub fn take_due(&mut self, now: Instant) -> Vec<WindowId> {
        let mut due = Vec::new();
        self.pending.retain(|&(window, at)| {
            if at <= now {
                due.push(window);
                false
            } else {
                true
            }
        });
        due
    }
}

/// Manages recording state
pub struct RecordingManager {
    pub record: Record,
}

/// Manages configuration state
pub struct ConfigManager {
    pub config: Config,
}
