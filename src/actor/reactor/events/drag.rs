use tracing::{debug, trace};

use super::window::WindowEventHandler;
use crate::actor::drag_dock::{DragAction, ReleaseOutcome};
use crate::actor::reactor::Reactor;
use crate::actor::reactor::animation::Animation;
use crate::actor::reactor::error::ReactorError;
use crate::layout_engine::frames;
use crate::model::window::{WindowId, WindowLevel};
use crate::sys::event::MouseState;
use crate::sys::geometry::Rect;
use crate::sys::screen::display_for_point;

pub struct DragEventHandler;

impl DragEventHandler {
    pub fn handle_window_moved(
        reactor: &mut Reactor,
        id: WindowId,
        frame: Rect,
        mouse: MouseState,
    ) -> Result<(), ReactorError> {
        let window = reactor.window_or_err(id)?;
        if window.is_minimized || window.is_animating_transition() {
            trace!(?id, "ignoring move of a docked or transitioning window");
            return Ok(());
        }
        let display = display_for_point(&reactor.display_manager.displays, frame.top_center())
            .unwrap_or(window.display_id);
        let previewing = reactor.drag_manager.is_previewing(id);
        reactor.window_manager.registry.update(id, |w| {
            // A shrunken preview frame must not leak into the restore frame.
            if previewing {
                w.frame = frame;
            } else {
                w.place(frame);
            }
            w.display_id = display;
        });

        if !mouse.is_down() {
            return Ok(());
        }

        if reactor.drag_manager.needs_listener() {
            let token = reactor.collaborators.windows.install_release_listener();
            reactor.drag_manager.set_listener(token);
        }

        let target = reactor.display_manager.resolver.resolve(frame).map(|t| t.display_id);
        let duration = reactor.config().settings.animation.preview;
        match reactor.drag_manager.on_move(id, frame, target) {
            DragAction::EnterPreview(preview) => {
                let shrunk =
                    frames::preview_frame(preview.original_frame, reactor.config().docking.preview_scale);
                reactor.window_manager.registry.update(id, |w| w.frame = shrunk);
                reactor.collaborators.windows.set_level(id, WindowLevel::AboveOverlay);
                reactor.animate(Animation::new(id, reactor.now(), duration, frame, shrunk));
            }
            DragAction::LeavePreview(preview) => {
                Self::restore_original(reactor, id, frame, preview.original_frame);
            }
            DragAction::Retarget(preview) => {
                debug!(?id, target = %preview.target, "dock target changed");
            }
            DragAction::None => {}
        }
        Ok(())
    }

    pub fn handle_pointer_released(reactor: &mut Reactor) -> Result<(), ReactorError> {
        let Some(token) = reactor.drag_manager.take_listener() else {
            trace!("pointer released without an active drag");
            return Ok(());
        };
        reactor.collaborators.windows.remove_release_listener(token);

        let registry = &reactor.window_manager.registry;
        let resolver = &reactor.display_manager.resolver;
        let outcomes = reactor.drag_manager.on_release(|window| {
            let frame = registry.get(window)?.frame;
            resolver.resolve(frame).map(|t| t.display_id)
        });

        for outcome in outcomes {
            match outcome {
                ReleaseOutcome::Commit { window, preview } => {
                    debug!(?window, target = %preview.target, "committing dock");
                    let target = Some(preview.target);
                    if let Err(err) = WindowEventHandler::handle_minimize(reactor, window, target) {
                        debug!(%err, "dock commit failed");
                    }
                }
                ReleaseOutcome::Cancel { window, preview } => {
                    let Some(current) = reactor.window_manager.registry.get(window) else {
                        continue;
                    };
                    let current = current.frame;
                    debug!(?window, "cancelling dock preview");
                    Self::restore_original(reactor, window, current, preview.original_frame);
                }
            }
        }
        Ok(())
    }

    fn restore_original(reactor: &mut Reactor, id: WindowId, from: Rect, original: Rect) {
        let Some(level) = reactor.window_manager.registry.update(id, |w| {
            w.place(original);
            w.level()
        }) else {
            return;
        };
        reactor.collaborators.windows.set_level(id, level);
        let duration = reactor.config().settings.animation.preview;
        reactor.animate(Animation::new(id, reactor.now(), duration, from, original));
    }
}
