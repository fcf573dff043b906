//! Decides, per display, whether the notch overlay is expanded.
//!
//! Expanding is immediate when the cursor enters the activation rect.
//! Collapsing is debounced: leaving the rect schedules a collapse that is
//! cancelled if the cursor comes back first, and it is suppressed entirely
//! while the user types, hovers an item, or has disabled closing on leave.

use std::time::Instant;

use tracing::{debug, trace};

use crate::common::collections::HashMap;
use crate::common::config::{HoverSettings, NotchSettings};
use crate::layout_engine::frames;
use crate::sys::geometry::{Point, Rect, RectExt};
use crate::sys::screen::{DisplayDescriptor, DisplayId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange {
    Expanded(DisplayId),
    Collapsed(DisplayId),
}

#[derive(Debug, Default, Clone)]
struct DisplayHover {
    expanded: bool,
    pending_collapse: Option<Instant>,
    /// The pointer is over a preview or window item inside the overlay.
    hovering_item: bool,
    content_width: Option<f64>,
}

pub struct HoverController {
    settings: HoverSettings,
    notch: NotchSettings,
    displays: Vec<DisplayDescriptor>,
    state: HashMap<DisplayId, DisplayHover>,
    last_cursor: Option<Point>,
    previewed_this_session: bool,
    last_typing: Option<Instant>,
}

impl HoverController {
    pub fn new(settings: HoverSettings, notch: NotchSettings) -> Self {
        HoverController {
            settings,
            notch,
            displays: Vec::new(),
            state: HashMap::default(),
            last_cursor: None,
            previewed_this_session: false,
            last_typing: None,
        }
    }

    pub fn update_settings(&mut self, settings: HoverSettings, notch: NotchSettings) {
        self.settings = settings;
        self.notch = notch;
        self.last_cursor = None;
    }

    /// Replaces the display set. State for displays that vanished is dropped.
    /// Returns the displays that were expanded when they vanished.
    pub fn set_displays(&mut self, displays: &[DisplayDescriptor]) -> Vec<DisplayId> {
        let mut dropped = Vec::new();
        self.state.retain(|id, hover| {
            let keep = displays.iter().any(|d| d.id == *id);
            if !keep && hover.expanded {
                dropped.push(*id);
            }
            keep
        });
        for display in displays {
            self.state.entry(display.id).or_default();
        }
        self.displays = displays.to_vec();
        self.last_cursor = None;
        dropped
    }

    pub fn is_expanded(&self, display: DisplayId) -> bool {
        self.state.get(&display).is_some_and(|s| s.expanded)
    }

    pub fn pending_collapse(&self, display: DisplayId) -> Option<Instant> {
        self.state.get(&display).and_then(|s| s.pending_collapse)
    }

    pub fn is_hovering_item(&self, display: DisplayId) -> bool {
        self.state.get(&display).is_some_and(|s| s.hovering_item)
    }

    pub fn content_width(&self, display: DisplayId) -> Option<f64> {
        self.state.get(&display).and_then(|s| s.content_width)
    }

    pub fn set_content_width(&mut self, display: DisplayId, width: f64) {
        if let Some(state) = self.state.get_mut(&display) {
            state.content_width = Some(width);
            self.last_cursor = None;
        }
    }

    pub fn set_hovering_item(&mut self, display: DisplayId, hovering: bool) {
        if let Some(state) = self.state.get_mut(&display) {
            state.hovering_item = hovering;
            if hovering {
                state.pending_collapse = None;
            }
            self.last_cursor = None;
        }
    }

    pub fn note_preview_shown(&mut self) { self.previewed_this_session = true; }

    pub fn note_typing(&mut self, now: Instant) { self.last_typing = Some(now); }

    fn typing_locked(&self, now: Instant) -> bool {
        self.settings.typing_lock_enabled
            && self
                .last_typing
                .is_some_and(|at| now.saturating_duration_since(at) < self.settings.typing_lock)
    }

    fn collapse_suppressed(&self, hover: &DisplayHover, now: Instant) -> bool {
        self.settings.prevent_close_on_leave || hover.hovering_item || self.typing_locked(now)
    }

    fn activation_rect(&self, display: &DisplayDescriptor, hover: &DisplayHover) -> Rect {
        frames::activation_rect(
            display,
            &self.notch,
            &self.settings,
            hover.expanded,
            hover.content_width,
        )
    }

    /// Evaluates a cursor sample.
    pub fn poll(&mut self, cursor: Point, now: Instant) -> Vec<HoverChange> {
        let mut changes = self.fire_due(now);

        if self.last_typing.is_some() && !self.typing_locked(now) {
            // A lapsed lock may unblock a collapse under a still cursor.
            self.last_typing = None;
            self.last_cursor = None;
        }

        if let Some(last) = self.last_cursor {
            let threshold = self.settings.move_threshold;
            if last.distance_squared(cursor) < threshold * threshold {
                return changes;
            }
        }
        self.last_cursor = Some(cursor);

        let collapse_delay = if self.previewed_this_session {
            self.settings.previewed_collapse_delay
        } else {
            self.settings.collapse_delay
        };

        for disp in &self.displays {
            let Some(hover) = self.state.get(&disp.id) else { continue };
            let mut hover = hover.clone();
            let rect = self.activation_rect(disp, &hover);

            if rect.contains(cursor) {
                if hover.pending_collapse.take().is_some() {
                    trace!(display = %disp.id, "cursor returned, collapse cancelled");
                }
                if !hover.expanded && self.settings.auto_expand_on_hover {
                    debug!(display = %disp.id, "expanding");
                    hover.expanded = true;
                    changes.push(HoverChange::Expanded(disp.id));
                }
            } else {
                let far = self.settings.far_away_distance;
                if hover.hovering_item && !rect.inflate(far, far).contains(cursor) {
                    debug!(display = %disp.id, "cursor far away, clearing item hover");
                    hover.hovering_item = false;
                }
                if hover.expanded
                    && hover.pending_collapse.is_none()
                    && !self.collapse_suppressed(&hover, now)
                {
                    trace!(display = %disp.id, ?collapse_delay, "scheduling collapse");
                    hover.pending_collapse = Some(now + collapse_delay);
                }
            }

            self.state.insert(disp.id, hover);
        }

        changes
    }

    /// Runs collapse timers that are due. A timer only collapses the overlay
    /// if the cursor is still outside and nothing suppresses the collapse.
    pub fn fire_due(&mut self, now: Instant) -> Vec<HoverChange> {
        let mut changes = Vec::new();
        let mut fired = false;
        for disp in &self.displays {
            let Some(hover) = self.state.get(&disp.id) else { continue };
            if !hover.pending_collapse.is_some_and(|at| at <= now) {
                continue;
            }
            fired = true;
            let mut hover = hover.clone();
            hover.pending_collapse = None;
            let inside = self
                .last_cursor
                .is_some_and(|cursor| self.activation_rect(disp, &hover).contains(cursor));
            if hover.expanded && !inside && !self.collapse_suppressed(&hover, now) {
                debug!(display = %disp.id, "collapsing");
                hover.expanded = false;
                changes.push(HoverChange::Collapsed(disp.id));
            }
            self.state.insert(disp.id, hover);
        }
        if fired {
            // Re-evaluate on the next sample even if the cursor is still.
            self.last_cursor = None;
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::geometry::Size;

    const D1: DisplayId = DisplayId::new(1);

    fn display() -> DisplayDescriptor {
        DisplayDescriptor {
            id: D1,
            frame: Rect::from_xywh(0.0, 0.0, 1000.0, 800.0),
            visible_frame: Rect::from_xywh(0.0, 30.0, 1000.0, 770.0),
            notch: Some(Size::new(200.0, 30.0)),
            name: None,
        }
    }

    fn controller(settings: HoverSettings) -> HoverController {
        let mut hover = HoverController::new(settings, NotchSettings::default());
        hover.set_displays(&[display()]);
        hover
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    const ON_NOTCH: Point = Point::new(500.0, 10.0);
    const OUTSIDE: Point = Point::new(500.0, 500.0);

    #[test]
    fn expands_immediately_and_collapses_after_delay() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();

        assert_eq!(hover.poll(ON_NOTCH, t0), vec![HoverChange::Expanded(D1)]);
        assert!(hover.is_expanded(D1));

        assert!(hover.poll(OUTSIDE, t0).is_empty());
        assert_eq!(hover.pending_collapse(D1), Some(t0 + settings.collapse_delay));

        assert!(hover.fire_due(t0 + settings.collapse_delay - ms(1)).is_empty());
        assert_eq!(
            hover.fire_due(t0 + settings.collapse_delay),
            vec![HoverChange::Collapsed(D1)]
        );
        assert!(!hover.is_expanded(D1));
    }

    #[test]
    fn reentry_cancels_pending_collapse() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();
        hover.poll(ON_NOTCH, t0);
        hover.poll(OUTSIDE, t0 + ms(10));
        assert!(hover.pending_collapse(D1).is_some());

        hover.poll(ON_NOTCH, t0 + ms(20));
        assert_eq!(hover.pending_collapse(D1), None);
        assert!(hover.fire_due(t0 + ms(10_000)).is_empty());
        assert!(hover.is_expanded(D1));
    }

    #[test]
    fn prevent_close_never_schedules_collapse_but_still_expands() {
        let mut hover = controller(HoverSettings {
            prevent_close_on_leave: true,
            ..HoverSettings::default()
        });
        let t0 = Instant::now();
        assert_eq!(hover.poll(ON_NOTCH, t0), vec![HoverChange::Expanded(D1)]);
        hover.poll(OUTSIDE, t0 + ms(5));
        assert_eq!(hover.pending_collapse(D1), None);
        assert!(hover.fire_due(t0 + ms(60_000)).is_empty());
        assert!(hover.is_expanded(D1));
    }

    #[test]
    fn auto_expand_off_does_not_expand() {
        let mut hover = controller(HoverSettings {
            auto_expand_on_hover: false,
            ..HoverSettings::default()
        });
        assert!(hover.poll(ON_NOTCH, Instant::now()).is_empty());
        assert!(!hover.is_expanded(D1));
    }

    #[test]
    fn typing_lock_suppresses_collapse() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();
        hover.poll(ON_NOTCH, t0);
        hover.note_typing(t0);
        hover.poll(OUTSIDE, t0 + ms(10));
        assert_eq!(hover.pending_collapse(D1), None);

        let after_lock = t0 + settings.typing_lock + ms(1);
        hover.poll(Point::new(520.0, 520.0), after_lock);
        assert_eq!(hover.pending_collapse(D1), Some(after_lock + settings.collapse_delay));
    }

    #[test]
    fn lapsed_typing_lock_collapses_under_a_still_cursor() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();
        hover.poll(ON_NOTCH, t0);
        hover.note_typing(t0);
        hover.poll(OUTSIDE, t0 + ms(10));
        assert_eq!(hover.pending_collapse(D1), None);

        let after_lock = t0 + settings.typing_lock + ms(1);
        hover.poll(OUTSIDE, after_lock);
        assert_eq!(hover.pending_collapse(D1), Some(after_lock + settings.collapse_delay));
        assert_eq!(
            hover.fire_due(after_lock + settings.collapse_delay),
            vec![HoverChange::Collapsed(D1)]
        );
    }

    #[test]
    fn suppressed_timer_is_rescheduled_once_the_lock_lapses() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();
        hover.poll(ON_NOTCH, t0);
        hover.poll(OUTSIDE, t0);
        hover.note_typing(t0 + ms(100));

        assert!(hover.poll(OUTSIDE, t0 + settings.collapse_delay).is_empty());
        assert!(hover.is_expanded(D1));
        assert_eq!(hover.pending_collapse(D1), None);

        let after_lock = t0 + ms(100) + settings.typing_lock + ms(1);
        hover.poll(OUTSIDE, after_lock);
        assert_eq!(hover.pending_collapse(D1), Some(after_lock + settings.collapse_delay));
        assert_eq!(
            hover.fire_due(after_lock + settings.collapse_delay),
            vec![HoverChange::Collapsed(D1)]
        );
    }

    #[test]
    fn previewed_session_uses_longer_delay() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();
        hover.note_preview_shown();
        hover.poll(ON_NOTCH, t0);
        hover.poll(OUTSIDE, t0);
        assert_eq!(hover.pending_collapse(D1), Some(t0 + settings.previewed_collapse_delay));
    }

    #[test]
    fn small_moves_are_ignored() {
        let mut hover = controller(HoverSettings::default());
        let t0 = Instant::now();
        hover.poll(Point::new(490.0, 10.0), t0);
        hover.set_hovering_item(D1, false);
        hover.poll(OUTSIDE, t0);
        let pending = hover.pending_collapse(D1);
        assert!(pending.is_some());
        // Sub-threshold jitter neither reschedules nor cancels.
        hover.poll(Point::new(500.1, 500.1), t0 + ms(50));
        assert_eq!(hover.pending_collapse(D1), pending);
    }

    #[test]
    fn far_away_cursor_clears_latched_item_hover() {
        let settings = HoverSettings::default();
        let mut hover = controller(settings);
        let t0 = Instant::now();
        hover.poll(ON_NOTCH, t0);
        hover.set_hovering_item(D1, true);

        // Just outside the activation rect: the latch holds and blocks collapse.
        hover.poll(Point::new(500.0, 260.0), t0 + ms(10));
        assert!(hover.is_hovering_item(D1));
        assert_eq!(hover.pending_collapse(D1), None);

        hover.poll(Point::new(500.0, 700.0), t0 + ms(20));
        assert!(!hover.is_hovering_item(D1));
        assert_eq!(hover.pending_collapse(D1), Some(t0 + ms(20) + settings.collapse_delay));
    }

    #[test]
    fn vanished_displays_are_pruned() {
        let mut hover = controller(HoverSettings::default());
        hover.poll(ON_NOTCH, Instant::now());
        assert_eq!(hover.set_displays(&[]), vec![D1]);
        assert!(!hover.is_expanded(D1));
    }
}
