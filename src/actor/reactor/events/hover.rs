use tracing::{debug, trace};

use crate::actor::hover::HoverChange;
use crate::actor::reactor::Reactor;
use crate::actor::reactor::error::ReactorError;
use crate::sys::geometry::Point;
use crate::sys::screen::DisplayId;

pub struct HoverEventHandler;

impl HoverEventHandler {
    pub fn handle_poll(reactor: &mut Reactor, cursor: Point) -> Result<(), ReactorError> {
        let now = reactor.now();
        let changes = reactor.hover_controller.poll(cursor, now);
        Self::apply_changes(reactor, changes);
        Ok(())
    }

    pub fn apply_changes(reactor: &mut Reactor, changes: Vec<HoverChange>) {
        let hover = reactor.config().hover;
        for change in changes {
            match change {
                HoverChange::Expanded(display) => {
                    reactor.collaborators.presenter.expansion_changed(display, true);
                    if hover.haptics {
                        reactor.collaborators.feedback.perform_haptic(hover.haptic_pattern);
                    }
                }
                HoverChange::Collapsed(display) => {
                    reactor.collaborators.presenter.expansion_changed(display, false);
                }
            }
        }
    }

    pub fn handle_preview_hover_changed(
        reactor: &mut Reactor,
        display_id: DisplayId,
        hovering: bool,
    ) -> Result<(), ReactorError> {
        trace!(display = %display_id, hovering, "item hover changed");
        reactor.hover_controller.set_hovering_item(display_id, hovering);
        Ok(())
    }

    pub fn handle_preview_shown(reactor: &mut Reactor, display_id: DisplayId) -> Result<(), ReactorError> {
        debug!(display = %display_id, "preview shown, using the longer collapse delay from now on");
        reactor.hover_controller.note_preview_shown();
        Ok(())
    }

    pub fn handle_typing(reactor: &mut Reactor) -> Result<(), ReactorError> {
        let now = reactor.now();
        reactor.hover_controller.note_typing(now);
        Ok(())
    }

    pub fn handle_content_width(
        reactor: &mut Reactor,
        display_id: DisplayId,
        width: f64,
    ) -> Result<(), ReactorError> {
        trace!(display = %display_id, width, "content width measured");
        reactor.hover_controller.set_content_width(display_id, width);
        Ok(())
    }
}
