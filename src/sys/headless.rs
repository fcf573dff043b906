//! An in-memory host. Every collaborator call is applied to shared state that
//! can be inspected afterwards, which makes it usable both for headless runs
//! and as a test double.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

use super::geometry::{Point, Rect};
use super::host::{
    Collaborators, CursorSource, Feedback, ListenerToken, Presenter, TerminalHost, WindowHost,
};
use super::screen::{DisplayDescriptor, DisplayId, DisplayProvider};
use crate::common::collections::{HashMap, HashSet};
use crate::common::config::HapticPattern;
use crate::model::window::{Branding, PreviewImage, WindowId, WindowLevel, WindowState, WindowSummary};

/// Windows smaller than this in either dimension cannot be captured.
const MIN_SNAPSHOT_EDGE: f64 = 8.0;
const SNAPSHOT_SCALE: f64 = 0.125;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostWindow {
    pub frame: Rect,
    pub alpha: f64,
    pub visible: bool,
    pub level: WindowLevel,
}

#[derive(Default)]
pub struct HeadlessState {
    pub windows: HashMap<WindowId, HostWindow>,
    pub destroyed: Vec<WindowId>,
    pub activated: Vec<WindowId>,
    pub terminated: Vec<WindowId>,
    pub refreshed: Vec<WindowId>,
    pub working_paths: HashMap<WindowId, PathBuf>,
    pub brandings: HashMap<String, Branding>,
    pub rendered: Vec<(WindowId, usize)>,
    pub published: Vec<Vec<WindowSummary>>,
    pub expansions: Vec<(DisplayId, bool)>,
    pub haptics: Vec<HapticPattern>,
    pub listeners_installed: u64,
    pub listeners_removed: u64,
    pub active_listeners: HashSet<u64>,
    pub cursor: Point,
    pub displays: Vec<DisplayDescriptor>,
    pub primary: Option<DisplayId>,
}

impl HeadlessState {
    pub fn last_published(&self) -> Option<&[WindowSummary]> {
        self.published.last().map(Vec::as_slice)
    }
}

#[derive(Clone, Default)]
pub struct HeadlessHost(Arc<Mutex<HeadlessState>>);

impl HeadlessHost {
    pub fn new() -> Self { Self::default() }

    pub fn with_displays(displays: Vec<DisplayDescriptor>) -> Self {
        let host = Self::new();
        {
            let mut state = host.state();
            state.primary = displays.first().map(|d| d.id);
            state.displays = displays;
        }
        host
    }

    pub fn state(&self) -> MutexGuard<'_, HeadlessState> { self.0.lock() }

    pub fn window(&self, id: WindowId) -> Option<HostWindow> { self.state().windows.get(&id).copied() }

    pub fn set_cursor(&self, point: Point) { self.state().cursor = point; }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            windows: Box::new(self.clone()),
            terminal: Box::new(self.clone()),
            presenter: Box::new(self.clone()),
            feedback: Box::new(self.clone()),
        }
    }

    fn with_window(&self, id: WindowId, f: impl FnOnce(&mut HostWindow)) {
        if let Some(window) = self.state().windows.get_mut(&id) {
            f(window);
        } else {
            trace!(?id, "host call for unknown window");
        }
    }
}

impl WindowHost for HeadlessHost {
    fn create_window(&mut self, id: WindowId, frame: Rect) {
        self.state().windows.insert(id, HostWindow {
            frame,
            alpha: 1.0,
            visible: false,
            level: WindowLevel::Floating,
        });
    }

    fn destroy_window(&mut self, id: WindowId) {
        let mut state = self.state();
        state.windows.remove(&id);
        state.destroyed.push(id);
    }

    fn set_frame(&mut self, id: WindowId, frame: Rect) { self.with_window(id, |w| w.frame = frame); }

    fn set_alpha(&mut self, id: WindowId, alpha: f64) { self.with_window(id, |w| w.alpha = alpha); }

    fn set_visible(&mut self, id: WindowId, visible: bool) {
        self.with_window(id, |w| w.visible = visible);
    }

    fn set_level(&mut self, id: WindowId, level: WindowLevel) {
        self.with_window(id, |w| w.level = level);
    }

    fn activate(&mut self, id: WindowId) { self.state().activated.push(id); }

    fn capture_snapshot(&mut self, id: WindowId) -> Option<PreviewImage> {
        let frame = self.window(id)?.frame;
        if frame.size.width < MIN_SNAPSHOT_EDGE || frame.size.height < MIN_SNAPSHOT_EDGE {
            return None;
        }
        let width = (frame.size.width * SNAPSHOT_SCALE).max(1.0) as u32;
        let height = (frame.size.height * SNAPSHOT_SCALE).max(1.0) as u32;
        Some(PreviewImage {
            width,
            height,
            rgba: Arc::from(vec![0u8; (width * height * 4) as usize]),
        })
    }

    fn install_release_listener(&mut self) -> ListenerToken {
        let mut state = self.state();
        state.listeners_installed += 1;
        let token = state.listeners_installed;
        state.active_listeners.insert(token);
        ListenerToken(token)
    }

    fn remove_release_listener(&mut self, token: ListenerToken) {
        let mut state = self.state();
        if state.active_listeners.remove(&token.0) {
            state.listeners_removed += 1;
        }
    }
}

impl TerminalHost for HeadlessHost {
    fn terminate(&mut self, id: WindowId) { self.state().terminated.push(id); }

    fn refresh_layout(&mut self, id: WindowId) { self.state().refreshed.push(id); }

    fn current_working_path(&self, id: WindowId) -> Option<PathBuf> {
        self.state().working_paths.get(&id).cloned()
    }

    fn branding_for_command(&self, command: &str) -> Option<Branding> {
        let program = command.split_whitespace().next()?;
        self.state().brandings.get(program).cloned()
    }
}

impl Presenter for HeadlessHost {
    fn render_window(&mut self, window: &WindowState) {
        self.state().rendered.push((window.id, window.number));
    }

    fn publish_windows(&mut self, windows: &[WindowSummary]) {
        self.state().published.push(windows.to_vec());
    }

    fn expansion_changed(&mut self, display: DisplayId, expanded: bool) {
        self.state().expansions.push((display, expanded));
    }
}

impl Feedback for HeadlessHost {
    fn perform_haptic(&mut self, pattern: HapticPattern) { self.state().haptics.push(pattern); }
}

impl CursorSource for HeadlessHost {
    fn cursor_location(&self) -> Point { self.state().cursor }
}

impl DisplayProvider for HeadlessHost {
    fn displays(&self) -> Vec<DisplayDescriptor> { self.state().displays.clone() }

    fn primary_display(&self) -> Option<DisplayId> { self.state().primary }
}
