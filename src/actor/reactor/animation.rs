use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::transition::TransitionId;
use crate::model::window::WindowId;
use crate::sys::geometry::{Point, Rect, Round, SameAs, Size};
use crate::sys::host::WindowHost;

/// A frame and opacity interpolation for a single window.
#[derive(Debug, Clone)]
pub struct Animation {
    pub window: WindowId,
    start: Instant,
    duration: Duration,
    from: Rect,
    to: Rect,
    from_alpha: f64,
    to_alpha: f64,
    /// Set for minimize and restore. The animation's completion is what
    /// commits the transition.
    pub transition: Option<TransitionId>,
}

/// What is left to do once an animation reaches its end state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finished {
    pub window: WindowId,
    pub frame: Rect,
    pub transition: Option<TransitionId>,
}

impl Animation {
    pub fn new(window: WindowId, start: Instant, duration: Duration, from: Rect, to: Rect) -> Self {
        Animation {
            window,
            start,
            duration,
            from,
            to,
            from_alpha: 1.0,
            to_alpha: 1.0,
            transition: None,
        }
    }

    pub fn with_alpha(mut self, from: f64, to: f64) -> Self {
        self.from_alpha = from;
        self.to_alpha = to;
        self
    }

    pub fn with_transition(mut self, transition: TransitionId) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn target(&self) -> Rect { self.to }

    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (now.saturating_duration_since(self.start).as_secs_f64() / self.duration.as_secs_f64())
            .clamp(0.0, 1.0)
    }

    fn fades(&self) -> bool { self.from_alpha != self.to_alpha }

    fn apply(&self, host: &mut dyn WindowHost, t: f64) {
        let s = ease(t);
        host.set_frame(self.window, get_frame(self.from, self.to, s).round());
        if self.fades() {
            host.set_alpha(self.window, blend(self.from_alpha, self.to_alpha, s));
        }
    }

    fn skip_to_end(&self, host: &mut dyn WindowHost) -> Finished {
        host.set_frame(self.window, self.to);
        if self.fades() {
            host.set_alpha(self.window, self.to_alpha);
        }
        Finished {
            window: self.window,
            frame: self.to,
            transition: self.transition,
        }
    }
}

fn get_frame(a: Rect, b: Rect, s: f64) -> Rect {
    Rect::new(
        Point::new(blend(a.origin.x, b.origin.x, s), blend(a.origin.y, b.origin.y, s)),
        Size::new(
            blend(a.size.width, b.size.width, s),
            blend(a.size.height, b.size.height, s),
        ),
    )
}

// https://notes.yvt.jp/Graphics/Easing-Functions/
fn ease(t: f64) -> f64 {
    if t < 0.5 {
        (1.0 - f64::sqrt(1.0 - f64::powi(2.0 * t, 2))) / 2.0
    } else {
        (f64::sqrt(1.0 - f64::powi(-2.0 * t + 2.0, 2)) + 1.0) / 2.0
    }
}

fn blend(a: f64, b: f64, s: f64) -> f64 { (1.0 - s) * a + s * b }

/// Running animations, at most one per window.
#[derive(Debug, Default)]
pub struct AnimationManager {
    running: Vec<Animation>,
}

impl AnimationManager {
    pub fn new() -> Self { Self::default() }

    /// Starts `animation`. With `animate` off, or when there is nothing to
    /// animate, the window jumps to the end state and the finished animation
    /// is returned for the caller to commit.
    ///
    /// A running animation for the same window is replaced, unless it carries
    /// a transition, in which case the new animation is dropped.
    pub fn start(
        &mut self,
        animation: Animation,
        host: &mut dyn WindowHost,
        animate: bool,
    ) -> Option<Finished> {
        if let Some(existing) = self.running.iter().position(|a| a.window == animation.window) {
            if self.running[existing].transition.is_some() {
                debug!(window = ?animation.window, "window is mid-transition, dropping animation");
                return None;
            }
            self.running.swap_remove(existing);
        }

        let trivial = animation.from.same_as(animation.to) && !animation.fades();
        if !animate || animation.duration.is_zero() || trivial {
            return Some(animation.skip_to_end(host));
        }

        trace!(window = ?animation.window, from = ?animation.from, to = ?animation.to, "animating");
        animation.apply(host, 0.0);
        self.running.push(animation);
        None
    }

    /// Advances every animation to `now` and returns the ones that finished.
    pub fn tick(&mut self, now: Instant, host: &mut dyn WindowHost) -> Vec<Finished> {
        let mut finished = Vec::new();
        self.running.retain(|animation| {
            let t = animation.progress(now);
            if t >= 1.0 {
                finished.push(animation.skip_to_end(host));
                false
            } else {
                animation.apply(host, t);
                true
            }
        });
        finished
    }

    /// Drops the animation for `window`, if any, without applying its end
    /// state.
    pub fn cancel(&mut self, window: WindowId) -> Option<Animation> {
        let idx = self.running.iter().position(|a| a.window == window)?;
        Some(self.running.swap_remove(idx))
    }

    pub fn is_empty(&self) -> bool { self.running.is_empty() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use slotmap::DenseSlotMap;

    use super::*;
    use crate::sys::headless::HeadlessHost;

    fn ids(n: usize) -> Vec<WindowId> {
        let mut map = DenseSlotMap::<WindowId, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn host_with(ids: &[WindowId], frame: Rect) -> HeadlessHost {
        let mut host = HeadlessHost::new();
        for &id in ids {
            host.create_window(id, frame);
        }
        host
    }

    #[test]
    fn easing_is_monotonic_and_hits_the_ends() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        let mut prev = 0.0;
        for i in 1..=20 {
            let s = ease(f64::from(i) / 20.0);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn interpolates_over_time_and_finishes() {
        let ids = ids(1);
        let from = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let to = Rect::from_xywh(100.0, 100.0, 10.0, 10.0);
        let mut host = host_with(&ids, from);
        let mut manager = AnimationManager::new();
        let start = Instant::now();

        let animation = Animation::new(ids[0], start, Duration::from_millis(100), from, to)
            .with_alpha(1.0, 0.0);
        assert_eq!(manager.start(animation, &mut host, true), None);

        assert!(manager.tick(start + Duration::from_millis(50), &mut host).is_empty());
        let mid = host.window(ids[0]).unwrap();
        assert_eq!(mid.frame.origin, Point::new(50.0, 50.0));
        assert_eq!(mid.alpha, 0.5);

        let finished = manager.tick(start + Duration::from_millis(150), &mut host);
        assert_eq!(finished, vec![Finished { window: ids[0], frame: to, transition: None }]);
        assert_eq!(host.window(ids[0]).unwrap().frame, to);
        assert_eq!(host.window(ids[0]).unwrap().alpha, 0.0);
        assert!(manager.is_empty());
    }

    #[test]
    fn disabled_animation_finishes_immediately() {
        let ids = ids(1);
        let from = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let to = Rect::from_xywh(10.0, 10.0, 100.0, 100.0);
        let mut host = host_with(&ids, from);
        let mut manager = AnimationManager::new();

        let animation = Animation::new(ids[0], Instant::now(), Duration::from_secs(1), from, to)
            .with_transition(TransitionId::default().next());
        let finished = manager.start(animation, &mut host, false).unwrap();
        assert_eq!(finished.transition, Some(TransitionId::default().next()));
        assert_eq!(host.window(ids[0]).unwrap().frame, to);
        assert!(manager.is_empty());
    }

    #[test]
    fn transition_animations_are_not_replaced() {
        let ids = ids(2);
        let frame = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let other = Rect::from_xywh(50.0, 0.0, 100.0, 100.0);
        let mut host = host_with(&ids, frame);
        let mut manager = AnimationManager::new();
        let now = Instant::now();
        let duration = Duration::from_millis(100);

        let docking = Animation::new(ids[0], now, duration, frame, other)
            .with_transition(TransitionId::default().next());
        manager.start(docking, &mut host, true);
        manager.start(Animation::new(ids[0], now, duration, frame, frame.inflate(5.0, 5.0)), &mut host, true);

        manager.start(Animation::new(ids[1], now, duration, frame, other), &mut host, true);
        manager.start(Animation::new(ids[1], now, duration, frame, frame.inflate(5.0, 5.0)), &mut host, true);

        let finished = manager.tick(now + duration, &mut host);
        assert_eq!(finished.len(), 2);
        let first = finished.iter().find(|f| f.window == ids[0]).unwrap();
        assert_eq!(first.frame, other);
        let second = finished.iter().find(|f| f.window == ids[1]).unwrap();
        assert_eq!(second.frame, frame.inflate(5.0, 5.0));
    }

    #[test]
    fn cancel_leaves_the_window_where_it_is() {
        let ids = ids(1);
        let frame = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let mut host = host_with(&ids, frame);
        let mut manager = AnimationManager::new();
        let animation = Animation::new(
            ids[0],
            Instant::now(),
            Duration::from_millis(100),
            frame,
            frame.inflate(-10.0, -10.0),
        )
        .with_transition(TransitionId::default().next());
        manager.start(animation, &mut host, true);
        let cancelled = manager.cancel(ids[0]).unwrap();
        assert_eq!(cancelled.transition, Some(TransitionId::default().next()));
        assert!(manager.is_empty());
        assert!(manager.tick(Instant::now() + Duration::from_secs(1), &mut host).is_empty());
        assert_eq!(host.window(ids[0]).unwrap().frame, frame);
    }
}
