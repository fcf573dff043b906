use std::time::Duration;

use super::replay::Record;
use super::{Event, Reactor, WindowEventHandler};
use crate::common::config::Config;
use crate::model::window::{WindowId, WindowState, WindowSummary};
use crate::sys::event::MouseState;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::headless::HeadlessHost;
use crate::sys::screen::{DisplayDescriptor, DisplayId};
use crate::sys::timer::ManualClock;

pub const D1: DisplayId = DisplayId::new(1);
pub const D2: DisplayId = DisplayId::new(2);

/// A laptop panel with a camera housing.
pub fn notched_display() -> DisplayDescriptor {
    DisplayDescriptor {
        id: D1,
        frame: Rect::from_xywh(0.0, 0.0, 1512.0, 982.0),
        visible_frame: Rect::from_xywh(0.0, 32.0, 1512.0, 950.0),
        notch: Some(Size::new(200.0, 32.0)),
        name: Some("Built-in".to_string()),
    }
}

/// An external monitor to the right of the panel, without a notch.
pub fn external_display() -> DisplayDescriptor {
    DisplayDescriptor {
        id: D2,
        frame: Rect::from_xywh(1512.0, 0.0, 1920.0, 1080.0),
        visible_frame: Rect::from_xywh(1512.0, 25.0, 1920.0, 1055.0),
        notch: None,
        name: Some("External".to_string()),
    }
}

pub fn test_config(animate: bool) -> Config {
    let mut config = Config::default();
    config.settings.animate = animate;
    config
}

impl Reactor {
    pub fn new_for_test(config: Config, host: &HeadlessHost, clock: ManualClock) -> Reactor {
        Reactor::new(config, host.collaborators(), Box::new(clock), Record::none())
    }
}

pub struct Harness {
    pub reactor: Reactor,
    pub host: HeadlessHost,
    pub clock: ManualClock,
}

impl Harness {
    /// Two displays, animations off.
    pub fn new() -> Self { Self::with_config(test_config(false)) }

    /// Two displays, animations driven by [`Harness::advance`].
    pub fn animated() -> Self { Self::with_config(test_config(true)) }

    pub fn with_config(config: Config) -> Self {
        Self::with_record(config, Record::none())
    }

    pub fn with_record(config: Config, record: Record) -> Self {
        let host = HeadlessHost::new();
        let clock = ManualClock::new();
        let reactor = Reactor::new(config, host.collaborators(), Box::new(clock.clone()), record);
        let mut harness = Harness { reactor, host, clock };
        harness.send(Event::DisplaysChanged(vec![notched_display(), external_display()]));
        harness
    }

    pub fn send(&mut self, event: Event) { self.reactor.handle_event(event); }

    pub fn create(&mut self) -> WindowId { self.create_on(D1) }

    pub fn create_on(&mut self, display: DisplayId) -> WindowId {
        WindowEventHandler::handle_create(&mut self.reactor, Some(display), None).unwrap()
    }

    pub fn window(&self, id: WindowId) -> &WindowState {
        self.reactor.window_manager.window(id).unwrap()
    }

    pub fn numbers(&self) -> Vec<(WindowId, usize)> {
        self.reactor.window_manager.registry.all().into_iter().map(|w| (w.id, w.number)).collect()
    }

    pub fn advance(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        self.send(Event::Tick);
    }

    /// Runs every animation to completion.
    pub fn settle(&mut self) { self.advance(5_000); }

    pub fn drag(&mut self, id: WindowId, frame: Rect) {
        self.send(Event::WindowMoved { id, frame, mouse: MouseState::Down });
    }

    pub fn release(&mut self) { self.send(Event::PointerReleased); }

    /// `id`'s current frame moved so that its top edge sits just under the
    /// notch of `display`.
    pub fn frame_near_notch(&self, id: WindowId, display: DisplayId) -> Rect {
        let target = self.reactor.display_manager.resolver.target_for_display(display).unwrap();
        let anchor = Point::new(target.frame.mid().x, target.frame.max().y + 8.0);
        Rect::anchored_top_center(anchor, self.window(id).frame.size)
    }

    pub fn last_published(&self) -> Vec<WindowSummary> {
        self.host.state().last_published().map(<[_]>::to_vec).unwrap_or_default()
    }
}
