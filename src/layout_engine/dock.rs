use serde::{Deserialize, Serialize};
use tracing::trace;

use super::frames;
use crate::common::config::{DockingSettings, NotchSettings};
use crate::sys::geometry::{Rect, RectExt};
use crate::sys::screen::{DisplayDescriptor, DisplayId};

/// The anchor a docked window collapses toward. There is one per display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotchTarget {
    pub display_id: DisplayId,
    /// The closed notch rectangle. The expanded overlay is deliberately not
    /// used here: it can be far larger than the anchor itself.
    pub frame: Rect,
}

pub fn notch_targets(displays: &[DisplayDescriptor], notch: &NotchSettings) -> Vec<NotchTarget> {
    displays
        .iter()
        .map(|display| NotchTarget {
            display_id: display.id,
            frame: frames::closed_notch_rect(display, notch),
        })
        .collect()
}

/// Finds the notch a window is being dragged (or minimized) toward.
#[derive(Debug, Clone)]
pub struct DockResolver {
    targets: Vec<NotchTarget>,
    sensitivity: f64,
    vertical_ratio: f64,
}

impl DockResolver {
    pub fn new(settings: &DockingSettings) -> Self {
        DockResolver {
            targets: Vec::new(),
            sensitivity: settings.sensitivity,
            vertical_ratio: settings.vertical_ratio,
        }
    }

    pub fn update_settings(&mut self, settings: &DockingSettings) {
        self.sensitivity = settings.sensitivity;
        self.vertical_ratio = settings.vertical_ratio;
    }

    pub fn set_targets(&mut self, targets: Vec<NotchTarget>) { self.targets = targets; }

    pub fn targets(&self) -> &[NotchTarget] { &self.targets }

    pub fn target_for_display(&self, display: DisplayId) -> Option<NotchTarget> {
        self.targets.iter().find(|t| t.display_id == display).copied()
    }

    /// The proximity zone of a target: its closed rect grown by the
    /// sensitivity, less vertically than horizontally.
    pub fn zone(&self, target: &NotchTarget) -> Rect {
        target.frame.inflate(self.sensitivity, self.sensitivity * self.vertical_ratio)
    }

    /// Returns the target whose zone contains the window's top-center point.
    /// When zones overlap, the target whose center is nearest wins.
    pub fn resolve(&self, window_frame: Rect) -> Option<NotchTarget> {
        let point = window_frame.top_center();
        let best = self
            .targets
            .iter()
            .filter(|target| self.zone(target).contains(point))
            .map(|target| (target, target.frame.mid().distance_squared(point)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(target, _)| *target);
        trace!(?point, target = ?best.map(|t| t.display_id), "resolved dock target");
        best
    }
}
