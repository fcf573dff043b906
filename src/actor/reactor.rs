//! The reactor owns every window and applies all lifecycle operations. It
//! runs on a single thread and processes [`Event`]s one at a time, so no
//! state here needs locking.

pub mod animation;
pub mod error;
mod events;
pub mod managers;
pub mod replay;
pub mod transition;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use animation::{Animation, AnimationManager, Finished};
use error::ReactorError;
pub use events::command::CommandEventHandler;
pub use events::display::DisplayEventHandler;
pub use events::drag::DragEventHandler;
pub use events::hover::HoverEventHandler;
pub use events::window::WindowEventHandler;
use managers::{ConfigManager, DisplayManager, RecordingManager, RefreshManager, WindowManager};
use replay::Record;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, error, instrument, trace};
use transition::TransitionManager;

use crate::actor::drag_dock::DragDockManager;
use crate::actor::hover::HoverController;
use crate::actor::{self};
use crate::common::config::{CloseMode, Config};
use crate::model::window::{WindowId, WindowSummary};
use crate::sys::event::MouseState;
use crate::sys::geometry::{Point, Rect};
use crate::sys::host::Collaborators;
use crate::sys::screen::{DisplayDescriptor, DisplayId};
use crate::sys::timer::{Clock, SystemClock};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Serialize, Deserialize, Debug, strum::IntoStaticStr)]
pub enum Event {
    /// Opens a new window on `display` (the primary display if unknown),
    /// placed under the notch of `anchor` if given.
    CreateWindow {
        display: Option<DisplayId>,
        anchor: Option<DisplayId>,
    },
    Minimize(WindowId),
    Restore(WindowId),
    /// Closes a window. Without a mode, `settings.default_close_mode` applies.
    Close(WindowId, Option<CloseMode>),
    Maximize(WindowId),
    ToggleCompact(WindowId),
    ToggleAlwaysOnTop(WindowId),
    RestoreAll,
    MinimizeAll,
    CloseAll(Option<CloseMode>),
    CloseAllOnDisplay(DisplayId, Option<CloseMode>),
    ReorganizeVisibleWindows(DisplayId),
    CapturePreview(WindowId),

    DisplaysChanged(Vec<DisplayDescriptor>),
    WindowMoved {
        id: WindowId,
        frame: Rect,
        mouse: MouseState,
    },
    PointerReleased,
    WindowClosedByHost(WindowId),

    CommandSubmitted(WindowId, String),
    WorkingPathChanged(WindowId, PathBuf),
    SessionReset(WindowId),
    ContentWidthMeasured(DisplayId, f64),

    HoverPoll(Point),
    PreviewHoverChanged {
        display: DisplayId,
        hovering: bool,
    },
    PreviewShown(DisplayId),
    TypingActivity,

    /// Advances animations and runs anything scheduled.
    Tick,
    ConfigUpdated(Config),

    #[serde(skip)]
    QuerySummaries(oneshot::Sender<Vec<WindowSummary>>),
}

impl Event {
    /// Events that arrive at poll rate. These are logged at trace level and
    /// not recorded.
    pub fn is_high_rate(&self) -> bool {
        matches!(self, Event::HoverPoll(_) | Event::Tick | Event::WindowMoved { .. })
    }

    fn is_recorded(&self) -> bool {
        !matches!(self, Event::HoverPoll(_) | Event::Tick | Event::QuerySummaries(_))
    }

    pub fn name(&self) -> &'static str { self.into() }
}

pub struct Reactor {
    pub config_manager: ConfigManager,
    pub window_manager: WindowManager,
    pub display_manager: DisplayManager,
    pub drag_manager: DragDockManager,
    pub hover_controller: HoverController,
    pub animation_manager: AnimationManager,
    pub transition_manager: TransitionManager,
    pub refresh_manager: RefreshManager,
    pub recording_manager: RecordingManager,
    pub collaborators: Collaborators,
    clock: Box<dyn Clock>,
}

impl Reactor {
    pub fn spawn(
        config: Config,
        collaborators: Collaborators,
        record: Record,
    ) -> std::io::Result<(Sender, thread::JoinHandle<()>)> {
        let (events_tx, events) = actor::channel();
        let handle = thread::Builder::new().name("reactor".to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("failed to start reactor runtime: {e}");
                    return;
                }
            };
            let reactor = Reactor::new(config, collaborators, Box::new(SystemClock), record);
            runtime.block_on(reactor.run(events));
        })?;
        Ok((events_tx, handle))
    }

    pub fn new(
        config: Config,
        collaborators: Collaborators,
        clock: Box<dyn Clock>,
        mut record: Record,
    ) -> Reactor {
        record.start(&config);
        Reactor {
            display_manager: DisplayManager::new(&config.docking),
            hover_controller: HoverController::new(config.hover, config.notch),
            config_manager: ConfigManager { config },
            window_manager: WindowManager::default(),
            drag_manager: DragDockManager::new(),
            animation_manager: AnimationManager::new(),
            transition_manager: TransitionManager::new(),
            refresh_manager: RefreshManager::default(),
            recording_manager: RecordingManager { record },
            collaborators,
            clock,
        }
    }

    pub async fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
        debug!("event channel closed, reactor exiting");
    }

    #[instrument(name = "reactor::handle_event", level = "debug", skip_all, fields(event = event.name()))]
    pub fn handle_event(&mut self, event: Event) {
        if event.is_high_rate() {
            trace!(?event, "Event");
        } else {
            debug!(?event, "Event");
        }
        if event.is_recorded() {
            self.recording_manager.record.on_event(&event);
        }

        let result = match event {
            Event::CreateWindow { display, anchor } => {
                WindowEventHandler::handle_create(self, display, anchor).map(drop)
            }
            Event::Minimize(id) => WindowEventHandler::handle_minimize(self, id, None),
            Event::Restore(id) => WindowEventHandler::handle_restore(self, id),
            Event::Close(id, mode) => WindowEventHandler::handle_close(self, id, mode),
            Event::Maximize(id) => WindowEventHandler::handle_toggle_maximize(self, id),
            Event::ToggleCompact(id) => WindowEventHandler::handle_toggle_compact(self, id),
            Event::ToggleAlwaysOnTop(id) => {
                WindowEventHandler::handle_toggle_always_on_top(self, id)
            }
            Event::CapturePreview(id) => WindowEventHandler::handle_capture_preview(self, id),
            Event::RestoreAll => CommandEventHandler::handle_restore_all(self),
            Event::MinimizeAll => CommandEventHandler::handle_minimize_all(self),
            Event::CloseAll(mode) => CommandEventHandler::handle_close_all(self, None, mode),
            Event::CloseAllOnDisplay(display, mode) => {
                CommandEventHandler::handle_close_all(self, Some(display), mode)
            }
            Event::ReorganizeVisibleWindows(display) => {
                CommandEventHandler::handle_reorganize(self, display)
            }
            Event::DisplaysChanged(displays) => {
                DisplayEventHandler::handle_displays_changed(self, displays)
            }
            Event::WindowMoved { id, frame, mouse } => {
                DragEventHandler::handle_window_moved(self, id, frame, mouse)
            }
            Event::PointerReleased => DragEventHandler::handle_pointer_released(self),
            Event::WindowClosedByHost(id) => WindowEventHandler::handle_closed_by_host(self, id),
            Event::CommandSubmitted(id, text) => {
                CommandEventHandler::handle_command_submitted(self, id, &text)
            }
            Event::WorkingPathChanged(id, path) => {
                CommandEventHandler::handle_working_path_changed(self, id, path)
            }
            Event::SessionReset(id) => CommandEventHandler::handle_session_reset(self, id),
            Event::ContentWidthMeasured(display, width) => {
                HoverEventHandler::handle_content_width(self, display, width)
            }
            Event::HoverPoll(cursor) => HoverEventHandler::handle_poll(self, cursor),
            Event::PreviewHoverChanged { display, hovering } => {
                HoverEventHandler::handle_preview_hover_changed(self, display, hovering)
            }
            Event::PreviewShown(display) => HoverEventHandler::handle_preview_shown(self, display),
            Event::TypingActivity => HoverEventHandler::handle_typing(self),
            Event::Tick => {
                self.handle_tick();
                Ok(())
            }
            Event::ConfigUpdated(config) => {
                CommandEventHandler::handle_config_updated(self, config);
                Ok(())
            }
            Event::QuerySummaries(response) => {
                _ = response.send(self.summaries());
                Ok(())
            }
        };

        if let Err(err) = result {
            debug!(%err, "event had no effect");
        }
    }

    pub fn now(&self) -> Instant { self.clock.now() }

    pub fn config(&self) -> &Config { &self.config_manager.config }

    pub fn summaries(&self) -> Vec<WindowSummary> {
        self.window_manager.registry.all().into_iter().map(|w| w.summary()).collect()
    }

    /// Sends the current summary list to the presentation layer.
    pub(crate) fn publish(&mut self) {
        let summaries = self.summaries();
        self.collaborators.presenter.publish_windows(&summaries);
    }

    pub(crate) fn render(&mut self, id: WindowId) {
        if let Some(window) = self.window_manager.registry.get(id) {
            self.collaborators.presenter.render_window(window);
        }
    }

    /// Starts an animation, committing it right away if animations are off.
    pub(crate) fn animate(&mut self, animation: Animation) {
        let animate = self.config_manager.config.settings.animate;
        if let Some(finished) =
            self.animation_manager.start(animation, self.collaborators.windows.as_mut(), animate)
        {
            self.finish_animation(finished);
        }
    }

    fn finish_animation(&mut self, finished: Finished) {
        if let Some(token) = finished.transition {
            WindowEventHandler::commit_transition(self, finished.window, token, finished.frame);
        }
    }

    fn handle_tick(&mut self) {
        let now = self.now();
        let finished = self.animation_manager.tick(now, self.collaborators.windows.as_mut());
        for finished in finished {
            self.finish_animation(finished);
        }

        for id in self.refresh_manager.take_due(now) {
            if self.window_manager.registry.contains(id) {
                trace!(?id, "refreshing terminal layout");
                self.collaborators.terminal.refresh_layout(id);
            }
        }

        let changes = self.hover_controller.fire_due(now);
        HoverEventHandler::apply_changes(self, changes);
    }

    pub(crate) fn window_or_err(
        &self,
        id: WindowId,
    ) -> Result<&crate::model::window::WindowState, ReactorError> {
        self.window_manager.registry.get(id).ok_or(ReactorError::WindowNotFound(id))
    }
}
