//! Active selection tracking.

use crate::canvas::SceneEvent;
use crate::layers::LayerId;

/// The single "last selected" layer.
///
/// Holds an ID only; the layer itself stays owned by the scene. Kept in
/// sync by feeding it the canvas's [`SceneEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active: Option<LayerId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from a scene event.
    pub fn apply(&mut self, event: &SceneEvent) {
        match *event {
            SceneEvent::Selected(id) => self.active = Some(id),
            SceneEvent::Removed(id) if self.active == Some(id) => self.active = None,
            _ => {}
        }
    }

    /// The active layer, if any.
    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    pub fn is_active(&self, id: LayerId) -> bool {
        self.active == Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_last_selected_wins() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.apply(&SceneEvent::Selected(a));
        selection.apply(&SceneEvent::Selected(b));
        assert_eq!(selection.active(), Some(b));
    }

    #[test]
    fn test_removal_clears_only_active() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.apply(&SceneEvent::Selected(a));
        selection.apply(&SceneEvent::Removed(b));
        assert!(selection.is_active(a));
        selection.apply(&SceneEvent::Removed(a));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_other_events_ignored() {
        let a = Uuid::new_v4();
        let mut selection = Selection::new();
        selection.apply(&SceneEvent::Added(a));
        selection.apply(&SceneEvent::Reordered(a));
        assert!(selection.is_empty());
    }
}
