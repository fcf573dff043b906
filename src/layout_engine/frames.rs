//! Pure frame computations. Nothing here holds state; every function derives
//! a rectangle from a display descriptor, the relevant settings and the
//! window's current geometry.

use crate::common::config::{HoverSettings, NotchSettings, WindowSettings};
use crate::sys::geometry::{Point, Rect, RectExt, Size};
use crate::sys::screen::DisplayDescriptor;

/// The notch in its collapsed state: the physical camera housing if the
/// display has one, otherwise the configured virtual notch, centered on the
/// top edge of the display.
pub fn closed_notch_rect(display: &DisplayDescriptor, notch: &NotchSettings) -> Rect {
    let size = display
        .notch
        .unwrap_or_else(|| Size::new(notch.virtual_width, notch.virtual_height));
    Rect::anchored_top_center(display.frame.top_center(), size)
}

/// Bounds of the overlay while it is expanded. The width follows the last
/// measured content width, never narrower than `min_expanded_width` and never
/// wider than the display.
pub fn expanded_overlay_rect(
    display: &DisplayDescriptor,
    notch: &NotchSettings,
    content_width: Option<f64>,
) -> Rect {
    let closed = closed_notch_rect(display, notch);
    let width = content_width
        .map(|w| w + 2.0 * notch.expanded_padding)
        .unwrap_or(0.0)
        .max(notch.min_expanded_width)
        .max(closed.size.width)
        .min(display.frame.size.width);
    let height = notch.expanded_height.max(closed.size.height);
    Rect::anchored_top_center(display.frame.top_center(), Size::new(width, height))
}

/// The region in which the cursor keeps (or makes) the overlay expanded.
pub fn activation_rect(
    display: &DisplayDescriptor,
    notch: &NotchSettings,
    hover: &HoverSettings,
    expanded: bool,
    content_width: Option<f64>,
) -> Rect {
    if expanded {
        let inflate = hover.expanded_inflate;
        expanded_overlay_rect(display, notch, content_width).inflate(inflate, inflate)
    } else {
        let inflate = hover.collapsed_inflate;
        closed_notch_rect(display, notch).inflate(inflate, inflate)
    }
}

/// The small square a docked window collapses into, hanging from the top
/// center of `target`.
pub fn dock_square(target: Rect, side: f64) -> Rect {
    Rect::anchored_top_center(target.top_center(), Size::new(side, side))
}

/// Where a freshly created window goes: default size, hanging below the notch,
/// shifted diagonally by its number so consecutive windows do not stack.
pub fn default_window_frame(
    display: &DisplayDescriptor,
    notch: &NotchSettings,
    windows: &WindowSettings,
    number: usize,
) -> Rect {
    let closed = closed_notch_rect(display, notch);
    let anchor = Point::new(closed.mid().x, closed.max().y + windows.top_offset);
    let size = Size::new(windows.default_width, windows.default_height);
    let offset = number.saturating_sub(1) as f64 * windows.cascade_step;
    let frame = Rect::anchored_top_center(anchor, size);
    frame
        .with_origin(Point::new(frame.origin.x + offset, frame.origin.y + offset))
        .clamped_to(&display.visible_frame)
}

/// The frame a docked window is restored to. If the saved frame sits under
/// the notch it is pushed down to leave at least `gap` below it, then kept
/// inside the display's usable area.
pub fn restore_frame(expanded: Rect, notch: Rect, gap: f64, visible: &Rect) -> Rect {
    let overlaps_horizontally =
        expanded.min().x < notch.max().x && expanded.max().x > notch.min().x;
    let lowest_allowed = notch.max().y + gap;
    let frame = if overlaps_horizontally && expanded.min().y < lowest_allowed {
        expanded.with_origin(Point::new(expanded.origin.x, lowest_allowed))
    } else {
        expanded
    };
    frame.clamped_to(visible)
}

/// `frame` resized to `size`, keeping its top-center fixed.
pub fn resized_from_top_center(frame: Rect, size: Size) -> Rect {
    Rect::anchored_top_center(frame.top_center(), size)
}

/// The shrunken frame shown while a dragged window hovers a dock target.
pub fn preview_frame(original: Rect, scale: f64) -> Rect {
    resized_from_top_center(original, original.size.scaled(scale))
}

/// `frame` moved to the middle of `display`'s usable area, size preserved
/// where it fits.
pub fn recentered_on(frame: Rect, display: &DisplayDescriptor) -> Rect {
    Rect::centered_at(display.visible_frame.mid(), frame.size).clamped_to(&display.visible_frame)
}
