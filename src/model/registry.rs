use slotmap::DenseSlotMap;
use tracing::trace;

use super::window::{WindowId, WindowState};
use crate::sys::screen::DisplayId;

/// Owns every [`WindowState`]. States live in a dense arena keyed by
/// [`WindowId`], so iteration is cheap and ids stay valid across removals.
#[derive(Default)]
pub struct WindowRegistry {
    windows: DenseSlotMap<WindowId, WindowState>,
}

impl WindowRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    /// The number the next inserted window should receive.
    pub fn next_number(&self) -> usize { self.windows.len() + 1 }

    pub fn insert_with(&mut self, make: impl FnOnce(WindowId) -> WindowState) -> WindowId {
        self.windows.insert_with_key(make)
    }

    pub fn contains(&self, id: WindowId) -> bool { self.windows.contains_key(id) }

    pub fn get(&self, id: WindowId) -> Option<&WindowState> { self.windows.get(id) }

    pub fn update<R>(&mut self, id: WindowId, f: impl FnOnce(&mut WindowState) -> R) -> Option<R> {
        self.windows.get_mut(id).map(f)
    }

    /// Removes a window and renumbers the rest. Returns the removed state and
    /// the ids whose number changed.
    pub fn remove(&mut self, id: WindowId) -> Option<(WindowState, Vec<WindowId>)> {
        let removed = self.windows.remove(id)?;
        let renumbered = self.renumber();
        Some((removed, renumbered))
    }

    /// All windows ordered by number.
    pub fn all(&self) -> Vec<&WindowState> {
        let mut all: Vec<&WindowState> = self.windows.values().collect();
        all.sort_by_key(|w| w.number);
        all
    }

    /// A snapshot of ids ordered by number, safe to iterate while mutating.
    pub fn ids(&self) -> Vec<WindowId> { self.all().into_iter().map(|w| w.id).collect() }

    pub fn ids_on_display(&self, display: DisplayId) -> Vec<WindowId> {
        self.all().into_iter().filter(|w| w.display_id == display).map(|w| w.id).collect()
    }

    fn renumber(&mut self) -> Vec<WindowId> {
        let order = self.ids();
        let mut changed = Vec::new();
        for (idx, id) in order.into_iter().enumerate() {
            let number = idx + 1;
            let Some(window) = self.windows.get_mut(id) else { continue };
            if window.number == number {
                continue;
            }
            let default_branding = window.has_default_branding();
            trace!(?id, from = window.number, to = number, "renumbering window");
            window.number = number;
            if default_branding {
                window.reset_branding();
            }
            changed.push(id);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::geometry::Rect;

    fn add(registry: &mut WindowRegistry) -> WindowId {
        let number = registry.next_number();
        registry.insert_with(|id| {
            WindowState::new(id, number, DisplayId::new(1), Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
        })
    }

    fn numbers(registry: &WindowRegistry) -> Vec<usize> {
        registry.all().iter().map(|w| w.number).collect()
    }

    #[test]
    fn assigns_sequential_numbers() {
        let mut registry = WindowRegistry::new();
        let a = add(&mut registry);
        let b = add(&mut registry);
        assert_eq!(registry.get(a).unwrap().number, 1);
        assert_eq!(registry.get(b).unwrap().number, 2);
        assert_eq!(registry.ids(), vec![a, b]);
    }

    #[test]
    fn renumbers_contiguously_after_any_removal() {
        let mut registry = WindowRegistry::new();
        let ids: Vec<WindowId> = (0..6).map(|_| add(&mut registry)).collect();

        let (_, changed) = registry.remove(ids[1]).unwrap();
        assert_eq!(numbers(&registry), vec![1, 2, 3, 4, 5]);
        assert_eq!(changed, vec![ids[2], ids[3], ids[4], ids[5]]);

        registry.remove(ids[5]).unwrap();
        registry.remove(ids[0]).unwrap();
        assert_eq!(numbers(&registry), vec![1, 2, 3]);
        assert_eq!(registry.ids(), vec![ids[2], ids[3], ids[4]]);

        let late = add(&mut registry);
        assert_eq!(registry.get(late).unwrap().number, 4);
        registry.remove(ids[3]).unwrap();
        assert_eq!(registry.ids(), vec![ids[2], ids[4], late]);
        assert_eq!(numbers(&registry), vec![1, 2, 3]);
    }

    #[test]
    fn removing_unknown_id_is_a_noop() {
        let mut registry = WindowRegistry::new();
        let a = add(&mut registry);
        registry.remove(a).unwrap();
        assert!(registry.remove(a).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn renumbering_updates_default_titles_only() {
        let mut registry = WindowRegistry::new();
        let a = add(&mut registry);
        let b = add(&mut registry);
        let c = add(&mut registry);
        registry.update(c, |w| w.display_title = "htop".into());

        registry.remove(a).unwrap();
        assert_eq!(registry.get(b).unwrap().display_title, "Terminal 1");
        assert_eq!(registry.get(c).unwrap().display_title, "htop");
        assert_eq!(registry.get(c).unwrap().number, 2);
    }
}
