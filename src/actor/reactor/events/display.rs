use tracing::{debug, info, warn};

use super::window::WindowEventHandler;
use crate::actor::reactor::Reactor;
use crate::actor::reactor::error::ReactorError;
use crate::layout_engine::frames;
use crate::model::window::WindowId;
use crate::sys::screen::{DisplayDescriptor, DisplayId};

pub struct DisplayEventHandler;

impl DisplayEventHandler {
    /// Re-homes windows after a topology change. Windows go back to the
    /// display they were created on when it is present again, and windows
    /// on a vanished display move to the primary one.
    pub fn handle_displays_changed(
        reactor: &mut Reactor,
        displays: Vec<DisplayDescriptor>,
    ) -> Result<(), ReactorError> {
        info!(count = displays.len(), "displays changed");
        let notch = reactor.config().notch;
        reactor.display_manager.set_displays(displays, &notch);
        let dropped = reactor.hover_controller.set_displays(&reactor.display_manager.displays);
        if !dropped.is_empty() {
            debug!(?dropped, "dropped hover state for vanished displays");
        }

        let Some(primary) = reactor.display_manager.primary().map(|d| d.id) else {
            warn!("no displays left; windows stay where they are");
            return Err(ReactorError::NoDisplays);
        };

        for id in reactor.window_manager.registry.ids() {
            let Some(window) = reactor.window_manager.registry.get(id) else { continue };
            let target = if reactor.display_manager.is_known(window.original_display_id) {
                if window.display_id == window.original_display_id {
                    continue;
                }
                window.original_display_id
            } else if !reactor.display_manager.is_known(window.display_id) {
                primary
            } else {
                continue;
            };
            Self::move_to_display(reactor, id, target);
        }

        reactor.publish();
        Ok(())
    }

    fn move_to_display(reactor: &mut Reactor, id: WindowId, target: DisplayId) {
        // A transition in flight is finished on the spot so that its commit
        // cannot land on the old display afterwards.
        if let Some(animation) = reactor.animation_manager.cancel(id) {
            if let Some(token) = animation.transition {
                WindowEventHandler::commit_transition(reactor, id, token, animation.target());
            }
        }

        let Some(display) = reactor.display_manager.get(target).cloned() else { return };
        let notch = reactor.display_manager.resolver.target_for_display(target);
        let square = reactor.config().docking.dock_square_size;

        let frame = reactor.window_manager.registry.update(id, |w| {
            debug!(?id, from = %w.display_id, to = %target, "re-homing window");
            w.display_id = target;
            if w.is_minimized {
                w.expanded_frame = frames::recentered_on(w.expanded_frame, &display);
                if let Some(notch) = notch {
                    w.frame = frames::dock_square(notch.frame, square);
                }
            } else if w.is_maximized {
                w.pre_maximize_frame = w.pre_maximize_frame.map(|f| frames::recentered_on(f, &display));
                w.place(display.visible_frame);
            } else {
                w.place(frames::recentered_on(w.frame, &display));
            }
            w.frame
        });

        if let Some(frame) = frame {
            reactor.collaborators.windows.set_frame(id, frame);
            reactor.render(id);
        }
    }
}
