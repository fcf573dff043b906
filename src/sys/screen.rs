use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::geometry::{Point, Rect, Size};

/// Identifier the host windowing system assigns to a display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DisplayId(u32);

impl DisplayId {
    pub const fn new(id: u32) -> DisplayId { DisplayId(id) }

    pub fn as_u32(&self) -> u32 { self.0 }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "display-{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub id: DisplayId,
    /// Full bounds of the display.
    pub frame: Rect,
    /// The area windows may occupy: `frame` minus the menu bar strip.
    pub visible_frame: Rect,
    /// Size of the physical camera housing, if the display has one.
    pub notch: Option<Size>,
    pub name: Option<String>,
}

/// Enumerates displays. Implemented by the host platform layer and by test
/// stubs.
pub trait DisplayProvider {
    fn displays(&self) -> Vec<DisplayDescriptor>;
    fn primary_display(&self) -> Option<DisplayId>;
}

/// Caches the last display snapshot and rebuilds it only after a topology
/// change has been signalled.
pub struct ScreenCache<S: DisplayProvider> {
    system: S,
    state: Option<Vec<DisplayDescriptor>>,
    pending_generation: u64,
    processed_generation: u64,
}

impl<S: DisplayProvider> ScreenCache<S> {
    pub fn new(system: S) -> ScreenCache<S> {
        ScreenCache {
            system,
            state: None,
            pending_generation: 0,
            processed_generation: 0,
        }
    }

    pub fn mark_dirty(&mut self) { self.pending_generation = self.pending_generation.wrapping_add(1); }

    pub fn is_dirty(&self) -> bool {
        self.state.is_none() || self.pending_generation != self.processed_generation
    }

    /// Returns the display list, primary display first, followed by the rest
    /// ordered left to right then top to bottom.
    pub fn refresh(&mut self) -> Vec<DisplayDescriptor> {
        if !self.is_dirty() {
            return self.state.clone().unwrap_or_default();
        }

        let mut displays = self.system.displays();
        debug!(count = displays.len(), "refreshing display list");

        displays.sort_by(|a, b| {
            let x_order = a.frame.origin.x.total_cmp(&b.frame.origin.x);
            if x_order == Ordering::Equal {
                a.frame.origin.y.total_cmp(&b.frame.origin.y)
            } else {
                x_order
            }
        });

        if let Some(primary) = self.system.primary_display() {
            if let Some(idx) = displays.iter().position(|d| d.id == primary) {
                let main = displays.remove(idx);
                displays.insert(0, main);
            } else if !displays.is_empty() {
                warn!(?primary, "primary display is not in the display list");
            }
        }

        self.processed_generation = self.pending_generation;
        self.state = Some(displays.clone());
        displays
    }
}

/// Returns the display whose frame contains `point`, or the one whose center
/// is closest to it.
pub fn display_for_point(displays: &[DisplayDescriptor], point: Point) -> Option<DisplayId> {
    use super::geometry::RectExt;

    displays.iter().find(|d| d.frame.contains(point)).map(|d| d.id).or_else(|| {
        displays
            .iter()
            .min_by(|a, b| {
                a.frame
                    .mid()
                    .distance_squared(point)
                    .total_cmp(&b.frame.mid().distance_squared(point))
            })
            .map(|d| d.id)
    })
}
