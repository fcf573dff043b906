//! Tracks windows being dragged toward a notch. A window near a dock target
//! is shown shrunken as a preview of docking; releasing the pointer either
//! commits the dock or puts every previewing window back.

use tracing::{debug, trace};

use crate::common::collections::HashMap;
use crate::model::window::WindowId;
use crate::sys::geometry::Rect;
use crate::sys::host::ListenerToken;
use crate::sys::screen::DisplayId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockPreview {
    /// The frame the window had before it was shrunk.
    pub original_frame: Rect,
    pub target: DisplayId,
}

/// What the reactor should do in response to a drag move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragAction {
    /// The window entered a dock zone: shrink it and raise it above the
    /// overlay.
    EnterPreview(DockPreview),
    /// The window left the zone: restore `original_frame`.
    LeavePreview(DockPreview),
    /// Moved between two zones without leaving either.
    Retarget(DockPreview),
    None,
}

/// Outcome of a pointer release for one previewing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    Commit { window: WindowId, preview: DockPreview },
    Cancel { window: WindowId, preview: DockPreview },
}

#[derive(Debug, Default)]
pub struct DragDockManager {
    previews: HashMap<WindowId, DockPreview>,
    listener: Option<ListenerToken>,
}

impl DragDockManager {
    pub fn new() -> Self { Self::default() }

    /// Whether the pointer-release listener for the current drag still has
    /// to be installed.
    pub fn needs_listener(&self) -> bool { self.listener.is_none() }

    pub fn set_listener(&mut self, token: ListenerToken) {
        debug_assert!(self.listener.is_none(), "release listener installed twice");
        trace!(?token, "release listener installed");
        self.listener = Some(token);
    }

    /// Takes the installed listener. Returns `None` if there is none, so a
    /// second release cannot remove it twice.
    pub fn take_listener(&mut self) -> Option<ListenerToken> { self.listener.take() }

    pub fn preview(&self, window: WindowId) -> Option<DockPreview> {
        self.previews.get(&window).copied()
    }

    pub fn is_previewing(&self, window: WindowId) -> bool { self.previews.contains_key(&window) }

    /// Feeds a drag move. `frame` is the window's current frame and `target`
    /// the dock target it resolves to, if any.
    pub fn on_move(
        &mut self,
        window: WindowId,
        frame: Rect,
        target: Option<DisplayId>,
    ) -> DragAction {
        match (self.previews.get(&window).copied(), target) {
            (None, Some(target)) => {
                let preview = DockPreview { original_frame: frame, target };
                debug!(?window, %target, "entering dock preview");
                self.previews.insert(window, preview);
                DragAction::EnterPreview(preview)
            }
            (Some(preview), None) => {
                debug!(?window, "leaving dock preview");
                self.previews.remove(&window);
                DragAction::LeavePreview(preview)
            }
            (Some(preview), Some(target)) if preview.target != target => {
                let preview = DockPreview { target, ..preview };
                self.previews.insert(window, preview);
                DragAction::Retarget(preview)
            }
            _ => DragAction::None,
        }
    }

    /// Ends the drag. `resolve` re-resolves each previewing window against
    /// its current frame. All preview state is cleared regardless of outcome.
    pub fn on_release(
        &mut self,
        mut resolve: impl FnMut(WindowId) -> Option<DisplayId>,
    ) -> Vec<ReleaseOutcome> {
        let mut previews: Vec<(WindowId, DockPreview)> = self.previews.drain().collect();
        previews.sort_by_key(|(window, _)| *window);
        previews
            .into_iter()
            .map(|(window, preview)| {
                if resolve(window) == Some(preview.target) {
                    ReleaseOutcome::Commit { window, preview }
                } else {
                    ReleaseOutcome::Cancel { window, preview }
                }
            })
            .collect()
    }

    pub fn forget(&mut self, window: WindowId) { self.previews.remove(&window); }
}
