//! Seams to the collaborators the window core drives but does not own: the
//! host window system, the terminal sessions, the presentation layer and
//! haptic feedback.

use std::path::PathBuf;

use crate::common::config::HapticPattern;
use crate::model::window::{Branding, PreviewImage, WindowId, WindowLevel, WindowState, WindowSummary};
use crate::sys::geometry::{Point, Rect};
use crate::sys::screen::DisplayId;

/// Handle for an installed global pointer-release listener.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// Frame, visibility and stacking control over native window handles.
pub trait WindowHost: Send {
    fn create_window(&mut self, id: WindowId, frame: Rect);
    fn destroy_window(&mut self, id: WindowId);
    fn set_frame(&mut self, id: WindowId, frame: Rect);
    fn set_alpha(&mut self, id: WindowId, alpha: f64);
    fn set_visible(&mut self, id: WindowId, visible: bool);
    fn set_level(&mut self, id: WindowId, level: WindowLevel);
    fn activate(&mut self, id: WindowId);
    /// Rasterizes the window. Returns `None` when the window cannot be
    /// captured, for example because it is too small.
    fn capture_snapshot(&mut self, id: WindowId) -> Option<PreviewImage>;
    fn install_release_listener(&mut self) -> ListenerToken;
    fn remove_release_listener(&mut self, token: ListenerToken);
}

/// The terminal sessions hosted inside each window.
pub trait TerminalHost: Send {
    fn terminate(&mut self, id: WindowId);
    fn refresh_layout(&mut self, id: WindowId);
    fn current_working_path(&self, id: WindowId) -> Option<PathBuf>;
    /// Maps a submitted command line to a title and icon, if it is a
    /// recognized tool.
    fn branding_for_command(&self, command: &str) -> Option<Branding>;
}

pub trait Presenter: Send {
    fn render_window(&mut self, window: &WindowState);
    fn publish_windows(&mut self, windows: &[WindowSummary]);
    fn expansion_changed(&mut self, display: DisplayId, expanded: bool);
}

pub trait Feedback: Send {
    fn perform_haptic(&mut self, pattern: HapticPattern);
}

pub trait CursorSource: Send {
    fn cursor_location(&self) -> Point;
}

pub struct Collaborators {
    pub windows: Box<dyn WindowHost>,
    pub terminal: Box<dyn TerminalHost>,
    pub presenter: Box<dyn Presenter>,
    pub feedback: Box<dyn Feedback>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Collaborators(...)")
    }
}
