use std::path::PathBuf;

use tracing::{debug, info, trace, warn};

use super::window::WindowEventHandler;
use crate::actor::reactor::Reactor;
use crate::actor::reactor::animation::Animation;
use crate::actor::reactor::error::ReactorError;
use crate::common::config::{CloseMode, Config};
use crate::layout_engine::reorganize;
use crate::model::window::WindowId;
use crate::sys::geometry::Size;
use crate::sys::screen::DisplayId;

pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_restore_all(reactor: &mut Reactor) -> Result<(), ReactorError> {
        for id in reactor.window_manager.registry.ids() {
            if reactor.window_manager.window(id).is_some_and(|w| w.is_minimized) {
                Self::log_failure(WindowEventHandler::handle_restore(reactor, id));
            }
        }
        Ok(())
    }

    pub fn handle_minimize_all(reactor: &mut Reactor) -> Result<(), ReactorError> {
        for id in reactor.window_manager.registry.ids() {
            if reactor.window_manager.window(id).is_some_and(|w| !w.appears_minimized()) {
                Self::log_failure(WindowEventHandler::handle_minimize(reactor, id, None));
            }
        }
        Ok(())
    }

    /// Closes every window, or only those on `display`.
    pub fn handle_close_all(
        reactor: &mut Reactor,
        display_id: Option<DisplayId>,
        mode: Option<CloseMode>,
    ) -> Result<(), ReactorError> {
        let ids = match display_id {
            Some(display) => reactor.window_manager.registry.ids_on_display(display),
            None => reactor.window_manager.registry.ids(),
        };
        info!(count = ids.len(), display = ?display_id, "closing windows");
        for id in ids {
            Self::log_failure(WindowEventHandler::handle_close(reactor, id, mode));
        }
        Ok(())
    }

    pub fn handle_reorganize(reactor: &mut Reactor, display: DisplayId) -> Result<(), ReactorError> {
        let display = reactor
            .display_manager
            .resolve(Some(display))
            .ok_or(ReactorError::NoDisplays)?;
        let display_id = display.id;
        let visible = display.visible_frame;

        let windows: Vec<(WindowId, Size)> = reactor
            .window_manager
            .registry
            .all()
            .into_iter()
            .filter(|w| w.display_id == display_id)
            .filter(|w| !w.is_minimized && !w.is_animating_transition())
            .map(|w| {
                // Maximized windows are laid out at the size they return to.
                let size = match w.pre_maximize_frame {
                    Some(frame) if w.is_maximized => frame.size,
                    _ => w.frame.size,
                };
                (w.id, size)
            })
            .collect();
        let layout = reorganize(visible, &windows, &reactor.config().layout);
        debug!(
            display = %display_id,
            placed = layout.placed.len(),
            overflow = layout.overflow.len(),
            "reorganizing"
        );

        let now = reactor.now();
        let duration = reactor.config().settings.animation.reorganize;
        for (id, frame) in layout.frames() {
            let Some(from) = reactor.window_manager.registry.update(id, |w| {
                let from = w.frame;
                w.is_maximized = false;
                w.pre_maximize_frame = None;
                w.place(frame);
                from
            }) else {
                continue;
            };
            reactor.animate(Animation::new(id, now, duration, from, frame));
            reactor.render(id);
        }
        reactor.publish();
        Ok(())
    }

    pub fn handle_command_submitted(
        reactor: &mut Reactor,
        id: WindowId,
        command: &str,
    ) -> Result<(), ReactorError> {
        reactor.window_or_err(id)?;
        let Some(branding) = reactor.collaborators.terminal.branding_for_command(command) else {
            trace!(?id, "no branding for command");
            return Ok(());
        };
        debug!(?id, title = %branding.title, "branding window");
        reactor.window_manager.registry.update(id, |w| {
            w.display_title = branding.title;
            w.display_icon = branding.icon;
        });
        reactor.render(id);
        reactor.publish();
        Ok(())
    }

    pub fn handle_session_reset(reactor: &mut Reactor, id: WindowId) -> Result<(), ReactorError> {
        reactor
            .window_manager
            .registry
            .update(id, |w| w.reset_branding())
            .ok_or(ReactorError::WindowNotFound(id))?;
        reactor.render(id);
        reactor.publish();
        Ok(())
    }

    pub fn handle_working_path_changed(
        reactor: &mut Reactor,
        id: WindowId,
        path: PathBuf,
    ) -> Result<(), ReactorError> {
        reactor
            .window_manager
            .registry
            .update(id, |w| w.current_working_path = Some(path))
            .ok_or(ReactorError::WindowNotFound(id))
    }

    pub fn handle_config_updated(reactor: &mut Reactor, config: Config) {
        for issue in config.validate() {
            warn!("config: {issue}");
        }
        reactor.display_manager.resolver.update_settings(&config.docking);
        reactor.display_manager.refresh_targets(&config.notch);
        reactor.hover_controller.update_settings(config.hover, config.notch);
        reactor.config_manager.config = config;
        info!("config updated");
    }

    fn log_failure(result: Result<(), ReactorError>) {
        if let Err(err) = result {
            debug!(%err, "skipped window in bulk operation");
        }
    }
}
