use tracing::{debug, info, trace};

use crate::actor::reactor::Reactor;
use crate::actor::reactor::animation::Animation;
use crate::actor::reactor::error::ReactorError;
use crate::actor::reactor::transition::{TransitionId, TransitionKind};
use crate::common::config::CloseMode;
use crate::layout_engine::frames;
use crate::model::window::{WindowId, WindowState};
use crate::sys::geometry::{Rect, RectExt, Size};
use crate::sys::screen::DisplayId;

pub struct WindowEventHandler;

impl WindowEventHandler {
    pub fn handle_create(
        reactor: &mut Reactor,
        display: Option<DisplayId>,
        anchor: Option<DisplayId>,
    ) -> Result<WindowId, ReactorError> {
        let host_display = reactor.display_manager.resolve(display).ok_or(ReactorError::NoDisplays)?;
        let host_id = host_display.id;
        let anchor_display = anchor
            .and_then(|id| reactor.display_manager.get(id))
            .unwrap_or(host_display);

        let number = reactor.window_manager.registry.next_number();
        let config = &reactor.config_manager.config;
        let frame = frames::default_window_frame(anchor_display, &config.notch, &config.windows, number);

        let id = reactor
            .window_manager
            .registry
            .insert_with(|id| WindowState::new(id, number, host_id, frame));
        let cwd = reactor.collaborators.terminal.current_working_path(id);
        reactor.window_manager.registry.update(id, |w| w.current_working_path = cwd);
        info!(?id, number, display = %host_id, "created window");

        let windows = reactor.collaborators.windows.as_mut();
        windows.create_window(id, frame);
        windows.set_level(id, crate::model::window::WindowLevel::Floating);
        windows.set_visible(id, true);
        windows.activate(id);

        reactor.render(id);
        reactor.publish();
        Ok(id)
    }

    /// Docks `id`. A drag commit passes the notch it was released over as
    /// `dock_target`; otherwise the nearest notch is resolved from the frame.
    pub fn handle_minimize(
        reactor: &mut Reactor,
        id: WindowId,
        dock_target: Option<DisplayId>,
    ) -> Result<(), ReactorError> {
        let window = reactor.window_or_err(id)?;
        if window.is_minimized {
            trace!(?id, "already minimized");
            return Ok(());
        }
        if window.is_animating_transition() {
            return Err(ReactorError::TransitionInFlight(id));
        }

        let from = window.frame;
        // While a drag preview is showing, `frame` is the shrunken preview and
        // `expanded_frame` already holds the pre-drag size.
        let expanded_frame = if window.is_maximized {
            window.pre_maximize_frame.unwrap_or(window.expanded_frame)
        } else if window.is_compact || dock_target.is_some() {
            window.expanded_frame
        } else {
            window.frame
        };
        let target = dock_target
            .or_else(|| reactor.display_manager.resolver.resolve(from).map(|t| t.display_id))
            .unwrap_or(window.display_id);
        let target = reactor.display_manager.notch_target(target).ok_or(ReactorError::NoDisplays)?;

        let snapshot = reactor.collaborators.windows.capture_snapshot(id);
        if snapshot.is_none() {
            debug!(?id, "snapshot unavailable, docking without preview");
        }
        let square = frames::dock_square(target.frame, reactor.config().docking.dock_square_size);
        let pending = reactor
            .transition_manager
            .begin(TransitionKind::Minimize { target: target.display_id });

        reactor.window_manager.registry.update(id, |w| {
            w.expanded_frame = expanded_frame;
            w.pre_maximize_frame = None;
            w.is_maximized = false;
            w.is_compact = false;
            w.preview_snapshot = snapshot;
            w.transition = Some(pending);
            w.frame = square;
        });
        info!(?id, target = %target.display_id, "minimizing");

        // Published before the animation so the dock shows the window at once.
        reactor.publish();

        let duration = reactor.config().settings.animation.minimize;
        let animation = Animation::new(id, reactor.now(), duration, from, square)
            .with_alpha(1.0, 0.0)
            .with_transition(pending.id);
        reactor.animate(animation);
        Ok(())
    }

    pub fn handle_restore(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        let window = reactor.window_or_err(id)?;
        if window.is_animating_transition() {
            reactor.collaborators.windows.activate(id);
            return Err(ReactorError::TransitionInFlight(id));
        }
        if !window.is_minimized {
            reactor.collaborators.windows.activate(id);
            return Ok(());
        }

        let display = reactor
            .display_manager
            .resolve(Some(window.display_id))
            .ok_or(ReactorError::NoDisplays)?;
        let display_id = display.id;
        let visible = display.visible_frame;
        let notch = reactor
            .display_manager
            .resolver
            .target_for_display(display_id)
            .ok_or(ReactorError::NoNotchTarget(display_id))?;
        let docking = reactor.config().docking;
        let to = frames::restore_frame(window.expanded_frame, notch.frame, docking.restore_gap, &visible);
        let from = frames::dock_square(notch.frame, docking.dock_square_size);
        let level = window.level();

        let pending = reactor.transition_manager.begin(TransitionKind::Restore);
        reactor.window_manager.registry.update(id, |w| {
            w.transition = Some(pending);
            w.display_id = display_id;
            w.expanded_frame = to;
            w.frame = to;
        });
        info!(?id, display = %display_id, "restoring");

        let windows = reactor.collaborators.windows.as_mut();
        windows.set_frame(id, from);
        windows.set_alpha(id, 0.0);
        windows.set_level(id, level);
        windows.set_visible(id, true);
        windows.activate(id);
        reactor.publish();

        let duration = reactor.config().settings.animation.restore;
        let animation = Animation::new(id, reactor.now(), duration, from, to)
            .with_alpha(0.0, 1.0)
            .with_transition(pending.id);
        reactor.animate(animation);
        Ok(())
    }

    /// Applies the end state of a minimize or restore, if `token` is still
    /// the window's current transition.
    pub fn commit_transition(reactor: &mut Reactor, id: WindowId, token: TransitionId, frame: Rect) {
        let Some(window) = reactor.window_manager.registry.get(id) else {
            debug!(?id, "transition finished for a closed window");
            return;
        };
        let Some(pending) = window.transition.filter(|t| t.id == token) else {
            debug!(?id, ?token, "dropping stale transition");
            return;
        };

        match pending.kind {
            TransitionKind::Minimize { target } => {
                let display_id = reactor
                    .display_manager
                    .resolve(Some(target))
                    .map_or(target, |d| d.id);
                reactor.window_manager.registry.update(id, |w| {
                    w.transition = None;
                    w.is_minimized = true;
                    w.display_id = display_id;
                    w.frame = frame;
                });
                let windows = reactor.collaborators.windows.as_mut();
                windows.set_visible(id, false);
                windows.set_alpha(id, 1.0);
                debug!(?id, display = %display_id, "minimized");
            }
            TransitionKind::Restore => {
                reactor.window_manager.registry.update(id, |w| {
                    w.transition = None;
                    w.is_minimized = false;
                    w.preview_snapshot = None;
                });
                let at = reactor.now() + reactor.config().settings.refresh_delay;
                reactor.refresh_manager.schedule(id, at);
                debug!(?id, "restored");
            }
        }
        reactor.render(id);
        reactor.publish();
    }

    pub fn handle_close(
        reactor: &mut Reactor,
        id: WindowId,
        mode: Option<CloseMode>,
    ) -> Result<(), ReactorError> {
        reactor.window_or_err(id)?;
        let mode = mode.unwrap_or(reactor.config().settings.default_close_mode);
        info!(?id, %mode, "closing window");
        if mode == CloseMode::TerminateAndClose {
            reactor.collaborators.terminal.terminate(id);
        }
        let windows = reactor.collaborators.windows.as_mut();
        windows.set_visible(id, false);
        windows.destroy_window(id);
        Self::remove_window(reactor, id)
    }

    /// The host reports that a window is gone. Its handle is already
    /// destroyed, so only our state is cleaned up.
    pub fn handle_closed_by_host(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        reactor.window_or_err(id)?;
        info!(?id, "window closed by host");
        Self::remove_window(reactor, id)
    }

    fn remove_window(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        reactor.animation_manager.cancel(id);
        reactor.refresh_manager.cancel(id);
        reactor.drag_manager.forget(id);
        let (_, renumbered) = reactor
            .window_manager
            .registry
            .remove(id)
            .ok_or(ReactorError::WindowNotFound(id))?;
        for other in renumbered {
            reactor.render(other);
        }
        reactor.publish();
        Ok(())
    }

    pub fn handle_toggle_maximize(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        let window = reactor.window_or_err(id)?;
        if window.is_animating_transition() {
            return Err(ReactorError::TransitionInFlight(id));
        }
        if window.is_minimized {
            trace!(?id, "ignoring maximize of a minimized window");
            return Ok(());
        }
        let visible = reactor
            .display_manager
            .resolve(Some(window.display_id))
            .ok_or(ReactorError::NoDisplays)?
            .visible_frame;
        let from = window.frame;

        let to = reactor
            .window_manager
            .registry
            .update(id, |w| {
                if w.is_maximized {
                    let restored = w.pre_maximize_frame.take().unwrap_or(w.expanded_frame);
                    w.is_maximized = false;
                    w.place(restored);
                } else {
                    let previous = if w.is_compact {
                        Rect::anchored_top_center(w.frame.top_center(), w.expanded_frame.size)
                            .clamped_to(&visible)
                    } else {
                        w.frame
                    };
                    w.is_compact = false;
                    w.expanded_frame = previous;
                    w.pre_maximize_frame = Some(previous);
                    w.is_maximized = true;
                    w.place(visible);
                }
                w.frame
            })
            .ok_or(ReactorError::WindowNotFound(id))?;

        let duration = reactor.config().settings.animation.maximize;
        reactor.animate(Animation::new(id, reactor.now(), duration, from, to));
        reactor.render(id);
        reactor.publish();
        Ok(())
    }

    pub fn handle_toggle_compact(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        let window = reactor.window_or_err(id)?;
        if window.is_animating_transition() {
            return Err(ReactorError::TransitionInFlight(id));
        }
        if window.is_minimized {
            trace!(?id, "ignoring compact toggle of a minimized window");
            return Ok(());
        }
        let visible = reactor
            .display_manager
            .resolve(Some(window.display_id))
            .ok_or(ReactorError::NoDisplays)?
            .visible_frame;
        let windows = reactor.config().windows;
        let compact_size = Size::new(windows.compact_width, windows.compact_height);
        let from = window.frame;

        let to = reactor
            .window_manager
            .registry
            .update(id, |w| {
                if w.is_compact {
                    let expanded = frames::resized_from_top_center(w.frame, w.expanded_frame.size)
                        .clamped_to(&visible);
                    w.is_compact = false;
                    w.place(expanded);
                } else {
                    if w.is_maximized {
                        w.expanded_frame = w.pre_maximize_frame.take().unwrap_or(w.frame);
                        w.is_maximized = false;
                    } else {
                        w.expanded_frame = w.frame;
                    }
                    w.is_compact = true;
                    w.place(frames::resized_from_top_center(w.frame, compact_size));
                }
                w.frame
            })
            .ok_or(ReactorError::WindowNotFound(id))?;

        let duration = reactor.config().settings.animation.compact;
        reactor.animate(Animation::new(id, reactor.now(), duration, from, to));
        reactor.render(id);
        reactor.publish();
        Ok(())
    }

    pub fn handle_toggle_always_on_top(
        reactor: &mut Reactor,
        id: WindowId,
    ) -> Result<(), ReactorError> {
        let level = reactor
            .window_manager
            .registry
            .update(id, |w| {
                w.is_always_on_top = !w.is_always_on_top;
                w.level()
            })
            .ok_or(ReactorError::WindowNotFound(id))?;
        debug!(?id, %level, "stacking level changed");
        reactor.collaborators.windows.set_level(id, level);
        reactor.render(id);
        reactor.publish();
        Ok(())
    }

    /// Captures a preview of a visible window on demand.
    pub fn handle_capture_preview(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        let window = reactor.window_or_err(id)?;
        if window.appears_minimized() {
            trace!(?id, "docked windows keep the preview taken when docking");
            return Ok(());
        }
        let snapshot = reactor.collaborators.windows.capture_snapshot(id);
        reactor.window_manager.registry.update(id, |w| w.preview_snapshot = snapshot);
        reactor.publish();
        Ok(())
    }
}
