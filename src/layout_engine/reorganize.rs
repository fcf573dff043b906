//! Row-flow packing of visible windows on one display.
//!
//! Windows are placed right to left starting at the top-right corner of the
//! usable area, wrapping to a new row below the tallest window of the
//! previous one. Anything that does not fit is cascaded diagonally from the
//! bottom-left corner instead.

use tracing::debug;

use crate::common::config::LayoutSettings;
use crate::sys::geometry::{Point, Rect, RectExt, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct ReorganizedLayout<K> {
    /// Row-flow placements. These never overlap each other.
    pub placed: Vec<(K, Rect)>,
    /// Cascaded placements for windows that did not fit the flow.
    pub overflow: Vec<(K, Rect)>,
}

impl<K: Copy> ReorganizedLayout<K> {
    pub fn frames(&self) -> impl Iterator<Item = (K, Rect)> + '_ {
        self.placed.iter().chain(self.overflow.iter()).copied()
    }
}

pub fn reorganize<K: Copy>(
    visible: Rect,
    windows: &[(K, Size)],
    settings: &LayoutSettings,
) -> ReorganizedLayout<K> {
    let area = visible.inflate(-settings.margin, -settings.margin);
    let (left, right) = (area.min().x, area.max().x);
    let (top, bottom) = (area.min().y, area.max().y);

    let mut placed = Vec::with_capacity(windows.len());
    let mut deferred = Vec::new();

    let mut cursor_x = right;
    let mut cursor_y = top;
    let mut row_height: f64 = 0.0;

    for &(key, size) in windows {
        if size.width > area.size.width || size.height > area.size.height {
            deferred.push((key, size));
            continue;
        }
        if cursor_x - size.width < left {
            cursor_y += row_height + settings.spacing;
            cursor_x = right;
            row_height = 0.0;
        }
        if cursor_y + size.height > bottom {
            deferred.push((key, size));
            continue;
        }
        placed.push((key, Rect::new(Point::new(cursor_x - size.width, cursor_y), size)));
        cursor_x -= size.width + settings.spacing;
        row_height = row_height.max(size.height);
    }

    let columns = settings.overflow_columns.max(1);
    let overflow: Vec<(K, Rect)> = deferred
        .into_iter()
        .enumerate()
        .map(|(k, (key, size))| {
            let column = (k % columns) as f64;
            let depth = (k / columns) as f64;
            let x = left + column * settings.overflow_column_spacing + depth * settings.overflow_step;
            let y = bottom - size.height - depth * settings.overflow_step;
            (key, Rect::new(Point::new(x, y), size).clamped_to(&area))
        })
        .collect();

    if !overflow.is_empty() {
        debug!(placed = placed.len(), overflow = overflow.len(), "windows overflowed row flow");
    }

    ReorganizedLayout { placed, overflow }
}
