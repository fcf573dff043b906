use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::actor::reactor::transition::PendingTransition;
use crate::sys::geometry::Rect;
use crate::sys::screen::DisplayId;

slotmap::new_key_type! {
    /// Stable identity of a managed window for its whole lifetime.
    pub struct WindowId;
}

pub const DEFAULT_ICON: &str = "terminal";

/// A rasterized copy of a window's contents, shown while it is docked.
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PreviewImage({}x{})", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub title: String,
    pub icon: String,
}

/// Stacking level requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WindowLevel {
    Floating,
    AlwaysOnTop,
    /// Above the notch overlay, used while a drag hovers a dock target.
    AboveOverlay,
}

#[derive(Debug, Clone)]
pub struct WindowState {
    pub id: WindowId,
    /// Position in the contiguous `1..=N` sequence.
    pub number: usize,
    pub display_id: DisplayId,
    pub original_display_id: DisplayId,
    /// The last frame written to or reported by the host.
    pub frame: Rect,
    /// Last known frame while neither minimized nor compact. Restore target.
    pub expanded_frame: Rect,
    /// Only set while `is_maximized`.
    pub pre_maximize_frame: Option<Rect>,
    pub is_minimized: bool,
    pub is_compact: bool,
    pub is_always_on_top: bool,
    pub is_maximized: bool,
    pub transition: Option<PendingTransition>,
    pub preview_snapshot: Option<PreviewImage>,
    pub display_title: String,
    pub display_icon: String,
    pub current_working_path: Option<PathBuf>,
}

impl WindowState {
    pub fn new(id: WindowId, number: usize, display_id: DisplayId, frame: Rect) -> Self {
        WindowState {
            id,
            number,
            display_id,
            original_display_id: display_id,
            frame,
            expanded_frame: frame,
            pre_maximize_frame: None,
            is_minimized: false,
            is_compact: false,
            is_always_on_top: false,
            is_maximized: false,
            transition: None,
            preview_snapshot: None,
            display_title: default_title(number),
            display_icon: DEFAULT_ICON.to_string(),
            current_working_path: None,
        }
    }

    pub fn is_animating_transition(&self) -> bool { self.transition.is_some() }

    /// Whether the window is, or is about to be, docked. An in-flight
    /// minimize counts; an in-flight restore does not.
    pub fn appears_minimized(&self) -> bool {
        match &self.transition {
            Some(t) if t.kind.is_minimize() => true,
            Some(_) => false,
            None => self.is_minimized,
        }
    }

    pub fn has_default_branding(&self) -> bool {
        self.display_title == default_title(self.number) && self.display_icon == DEFAULT_ICON
    }

    pub fn reset_branding(&mut self) {
        self.display_title = default_title(self.number);
        self.display_icon = DEFAULT_ICON.to_string();
    }

    /// Moves the window to `frame`, keeping `expanded_frame` in step: a
    /// compact window's expanded frame follows its top-center, a maximized
    /// window's is left alone.
    pub fn place(&mut self, frame: Rect) {
        if self.is_compact {
            self.expanded_frame =
                Rect::anchored_top_center(frame.top_center(), self.expanded_frame.size);
        } else if !self.is_maximized {
            self.expanded_frame = frame;
        }
        self.frame = frame;
    }

    pub fn level(&self) -> WindowLevel {
        if self.is_always_on_top {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Floating
        }
    }

    pub fn summary(&self) -> WindowSummary {
        WindowSummary {
            id: self.id,
            number: self.number,
            display_id: self.display_id,
            title: self.display_title.clone(),
            icon: self.display_icon.clone(),
            preview_image: self.preview_snapshot.clone(),
            is_minimized: self.appears_minimized(),
            is_always_on_top: self.is_always_on_top,
        }
    }
}

pub fn default_title(number: usize) -> String { format!("Terminal {number}") }

/// What the presentation layer sees of a window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    pub id: WindowId,
    pub number: usize,
    pub display_id: DisplayId,
    pub title: String,
    pub icon: String,
    pub preview_image: Option<PreviewImage>,
    pub is_minimized: bool,
    pub is_always_on_top: bool,
}

impl Serialize for WindowSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("WindowSummary", 7)?;
        s.serialize_field("number", &self.number)?;
        s.serialize_field("display_id", &self.display_id)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("icon", &self.icon)?;
        s.serialize_field("has_preview", &self.preview_image.is_some())?;
        s.serialize_field("is_minimized", &self.is_minimized)?;
        s.serialize_field("is_always_on_top", &self.is_always_on_top)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::reactor::transition::{TransitionId, TransitionKind};

    fn state() -> WindowState {
        let mut map = slotmap::DenseSlotMap::<WindowId, ()>::with_key();
        let id = map.insert(());
        WindowState::new(id, 2, DisplayId::new(1), Rect::from_xywh(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn summary_is_optimistic_about_minimize() {
        let mut window = state();
        assert!(!window.summary().is_minimized);

        window.transition = Some(PendingTransition {
            id: TransitionId::default().next(),
            kind: TransitionKind::Minimize { target: DisplayId::new(1) },
        });
        assert!(window.summary().is_minimized);

        window.is_minimized = true;
        window.transition = Some(PendingTransition {
            id: TransitionId::default().next(),
            kind: TransitionKind::Restore,
        });
        assert!(!window.summary().is_minimized);
    }

    #[test]
    fn branding_resets_to_numbered_title() {
        let mut window = state();
        assert!(window.has_default_branding());
        window.display_title = "vim".into();
        window.display_icon = "vim".into();
        window.number = 1;
        window.reset_branding();
        assert_eq!(window.display_title, "Terminal 1");
        assert_eq!(window.display_icon, DEFAULT_ICON);
    }
}
